use crate::envelope::{RpcRequest, RpcResponse};
use crate::errors::{AuthError, ClientError, FetchError, TransportError};
use reqwest::header::COOKIE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Name of the cookie Deluge's Web UI uses to carry the session id.
pub(crate) const SESSION_COOKIE: &str = "_session_id";

/// Builds the single JSON-RPC endpoint, `<host>/json`, from a configured host.
/// Any query string or fragment on the host is dropped, so `/json` always
/// ends up in the path.
pub(crate) fn json_endpoint(host: &str) -> Result<Url, ClientError> {
    let mut endpoint =
        Url::parse(host.trim()).map_err(|e| ClientError::InvalidHost(e.to_string()))?;
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    let path = format!("{}/json", endpoint.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    Ok(endpoint)
}

/// Strips everything from a URL that could carry a secret: the query
/// string, the fragment and any userinfo password.
pub(crate) fn sanitize_url(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    // Only fails for cannot-be-a-base URLs, which have no password anyway.
    let _ = clean.set_password(None);
    clean
}

/// One decoded reply from the daemon, plus the session cookie if the
/// response set one.
pub(crate) struct Reply<R> {
    pub(crate) envelope: RpcResponse<R>,
    pub(crate) session_cookie: Option<String>,
}

pub(crate) enum ExchangeError {
    Transport(TransportError),
    Decode(serde_json::Error),
}

impl From<ExchangeError> for AuthError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Transport(e) => AuthError::Transport(e),
            ExchangeError::Decode(e) => AuthError::Decode(e),
        }
    }
}

impl From<ExchangeError> for FetchError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Transport(e) => FetchError::Transport(e),
            ExchangeError::Decode(e) => FetchError::Decode(e),
        }
    }
}

/// POSTs one envelope to the endpoint and decodes the reply envelope.
/// The session token, if any, rides along as a cookie.
pub(crate) async fn post_envelope<P, R>(
    http: &reqwest::Client,
    endpoint: &Url,
    auth_token: Option<&str>,
    request: &RpcRequest<'_, P>,
) -> Result<Reply<R>, ExchangeError>
where
    P: Serialize,
    R: DeserializeOwned,
{
    let mut builder = http.post(endpoint.clone()).json(request);
    if let Some(token) = auth_token {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE}={token}"));
    }

    let response = builder
        .send()
        .await
        .map_err(|e| ExchangeError::Transport(e.into()))?;

    let session_cookie = response
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string());

    let body = response
        .bytes()
        .await
        .map_err(|e| ExchangeError::Transport(e.into()))?;
    let envelope = serde_json::from_slice(&body).map_err(ExchangeError::Decode)?;

    Ok(Reply {
        envelope,
        session_cookie,
    })
}
