//! Exercises `DelugeClient` against an in-process imitation of the Deluge
//! Web UI `/json` endpoint.

use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use deluge_rpc::{AuthError, DelugeApi, DelugeClient, FetchError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PASSWORD: &str = "deluge";

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Normal,
    LoginWithoutCookie,
    RemoteError,
    Garbage,
    Stall,
}

struct Seen {
    method: String,
    cookie: Option<String>,
}

struct Daemon {
    mode: Mode,
    session_ids: Vec<&'static str>,
    logins: usize,
    active_session: Option<String>,
    seen: Vec<Seen>,
}

type Shared = Arc<Mutex<Daemon>>;

enum Action {
    Reply(Response),
    Stall,
}

fn snapshot_result() -> Value {
    json!({
        "connected": true,
        "torrents": {
            "t1": {
                "name": "foo",
                "state": "Seeding",
                "tracker_host": "tracker.example",
                "total_size": 2048,
                "total_done": 2048,
                "total_uploaded": 3072,
                "ratio": 1.5,
                "progress": 100.0,
                "time_added": 1700000000.5
            }
        },
        "filters": {
            "state": [["All", 1], ["Seeding", 1]],
            "tracker_host": [["All", 1], ["tracker.example", 1]]
        },
        "stats": {
            "max_download": 1000.0,
            "max_upload": 500.0,
            "max_num_connections": 200,
            "num_connections": 12,
            "upload_rate": 10.0,
            "download_rate": 20.0,
            "download_protocol_rate": 1.0,
            "upload_protocol_rate": 2.0,
            "dht_nodes": 80
        }
    })
}

async fn json_handler(
    State(daemon): State<Shared>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let action = {
        let mut daemon = daemon.lock().unwrap();
        let method = body["method"].as_str().unwrap_or_default().to_string();
        let cookie = headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        daemon.seen.push(Seen {
            method: method.clone(),
            cookie: cookie.clone(),
        });
        handle(&mut daemon, &method, &body, cookie)
    };

    match action {
        Action::Reply(response) => response,
        Action::Stall => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "result": null, "error": null, "id": 1 })).into_response()
        }
    }
}

fn handle(daemon: &mut Daemon, method: &str, body: &Value, cookie: Option<String>) -> Action {
    if daemon.mode == Mode::Stall {
        return Action::Stall;
    }
    if daemon.mode == Mode::Garbage {
        return Action::Reply("<html>502 Bad Gateway</html>".into_response());
    }

    let reply = match method {
        "auth.login" => {
            if body["params"][0] != PASSWORD {
                return Action::Reply(
                    Json(json!({ "result": false, "error": null, "id": 1 })).into_response(),
                );
            }
            let ok = Json(json!({ "result": true, "error": null, "id": 1 }));
            if daemon.mode == Mode::LoginWithoutCookie {
                return Action::Reply(ok.into_response());
            }
            let session = daemon.session_ids[daemon.logins % daemon.session_ids.len()];
            daemon.logins += 1;
            daemon.active_session = Some(session.to_string());
            (
                [(SET_COOKIE, format!("_session_id={session}; Path=/json"))],
                ok,
            )
                .into_response()
        }
        "web.update_ui" => {
            let authenticated = match (&daemon.active_session, &cookie) {
                (Some(session), Some(cookie)) => cookie == &format!("_session_id={session}"),
                _ => false,
            };
            if !authenticated {
                Json(json!({
                    "result": null,
                    "error": { "message": "Not authenticated", "code": 1 },
                    "id": 1
                }))
                .into_response()
            } else if daemon.mode == Mode::RemoteError {
                Json(json!({
                    "result": null,
                    "error": { "message": "Unknown method", "code": 5 },
                    "id": 1
                }))
                .into_response()
            } else {
                Json(json!({ "result": snapshot_result(), "error": null, "id": 1 })).into_response()
            }
        }
        _ => Json(json!({
            "result": null,
            "error": { "message": "Unknown method", "code": 2 },
            "id": 1
        }))
        .into_response(),
    };
    Action::Reply(reply)
}

async fn spawn_daemon(mode: Mode, session_ids: Vec<&'static str>) -> (String, Shared) {
    let daemon = Arc::new(Mutex::new(Daemon {
        mode,
        session_ids,
        logins: 0,
        active_session: None,
        seen: Vec::new(),
    }));
    let app = Router::new()
        .route("/json", post(json_handler))
        .with_state(daemon.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), daemon)
}

fn client(host: &str, password: &str) -> DelugeClient {
    DelugeClient::new(host, password, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn login_then_fetch_attaches_session_cookie() {
    let (host, daemon) = spawn_daemon(Mode::Normal, vec!["abc123"]).await;
    let mut client = client(&host, PASSWORD);

    client.authenticate().await.expect("login");
    assert!(client.has_session());

    let snapshot = client.fetch_snapshot().await.expect("fetch");
    assert!(snapshot.connected);
    assert_eq!(snapshot.torrents["t1"].name, "foo");
    assert_eq!(snapshot.stats.max_download, 1000.0);

    let daemon = daemon.lock().unwrap();
    assert_eq!(daemon.seen.len(), 2);
    assert_eq!(daemon.seen[0].method, "auth.login");
    assert!(daemon.seen[0].cookie.is_none());
    assert_eq!(daemon.seen[1].method, "web.update_ui");
    assert!(daemon.seen[1].cookie.as_deref().unwrap().contains("abc123"));
}

#[tokio::test]
async fn relogin_replaces_token_and_sends_old_one_on_login() {
    let (host, daemon) = spawn_daemon(Mode::Normal, vec!["first", "second"]).await;
    let mut client = client(&host, PASSWORD);

    client.authenticate().await.expect("first login");
    client.authenticate().await.expect("second login");
    client.fetch_snapshot().await.expect("fetch");

    let daemon = daemon.lock().unwrap();
    assert_eq!(daemon.seen[1].cookie.as_deref(), Some("_session_id=first"));
    assert_eq!(daemon.seen[2].cookie.as_deref(), Some("_session_id=second"));
}

#[tokio::test]
async fn fetch_without_login_is_unauthenticated() {
    let (host, _daemon) = spawn_daemon(Mode::Normal, vec!["abc123"]).await;
    let mut client = client(&host, PASSWORD);

    let err = client.fetch_snapshot().await.unwrap_err();
    assert!(matches!(err, FetchError::Unauthenticated));
    assert!(err.is_unauthenticated());
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let (host, _daemon) = spawn_daemon(Mode::Normal, vec!["abc123"]).await;
    let mut client = client(&host, "not-the-password");

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected));
    assert!(!client.has_session());
}

#[tokio::test]
async fn login_without_cookie_is_missing_token() {
    let (host, _daemon) = spawn_daemon(Mode::LoginWithoutCookie, vec!["abc123"]).await;
    let mut client = client(&host, PASSWORD);

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
    assert!(!client.has_session());
}

#[tokio::test]
async fn other_error_codes_are_remote() {
    let (host, _daemon) = spawn_daemon(Mode::RemoteError, vec!["abc123"]).await;
    let mut client = client(&host, PASSWORD);

    client.authenticate().await.expect("login");
    let err = client.fetch_snapshot().await.unwrap_err();
    match err {
        FetchError::Remote { code, message } => {
            assert_eq!(code, 5);
            assert_eq!(message, "Unknown method");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (host, _daemon) = spawn_daemon(Mode::Garbage, vec!["abc123"]).await;
    let mut client = client(&host, PASSWORD);

    assert!(matches!(
        client.fetch_snapshot().await,
        Err(FetchError::Decode(_))
    ));
    assert!(matches!(
        client.authenticate().await,
        Err(AuthError::Decode(_))
    ));
}

#[tokio::test]
async fn stalled_daemon_times_out_as_transport_error() {
    let (host, _daemon) = spawn_daemon(Mode::Stall, vec!["abc123"]).await;
    let mut client = DelugeClient::new(&host, PASSWORD, Duration::from_millis(200)).unwrap();

    match client.fetch_snapshot().await {
        Err(FetchError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

/// Returns the address of a port nothing is listening on.
async fn closed_port() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn transport_error_strips_credentials_from_url() {
    let addr = closed_port().await;
    let host = format!("http://admin:hunter2@{addr}/?password=hunter2");
    let mut client = client(&host, PASSWORD);

    let err = match client.fetch_snapshot().await {
        Err(FetchError::Transport(e)) => e,
        other => panic!("expected transport error, got {other:?}"),
    };
    let url = err.url().expect("url is kept");
    assert_eq!(url.path(), "/json");
    assert!(url.query().is_none());
    assert!(url.password().is_none());
    assert_eq!(url.host_str(), Some("127.0.0.1"));
    assert!(!err.to_string().contains("hunter2"));
    assert!(!format!("{err:?}").contains("hunter2"));

    let auth_err = client.authenticate().await.unwrap_err();
    assert!(matches!(auth_err, AuthError::Transport(_)));
    assert!(!auth_err.to_string().contains("hunter2"));
}
