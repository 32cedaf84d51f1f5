//! Destinations for emitted records.

use crate::records::{FieldValue, Fields, Record, Tags};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Write-only metric accumulator. Nothing is acknowledged back.
pub trait Accumulator {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags);
}

/// Keeps every record in memory. Used to batch one poll's output and by
/// `--once --json`.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<Record>,
}

impl MemorySink {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Moves every held record into `acc`, leaving this sink empty.
    pub fn drain_into<A: Accumulator + ?Sized>(&mut self, acc: &mut A) {
        for record in self.records.drain(..) {
            acc.add_fields(&record.measurement, record.fields, record.tags);
        }
    }
}

impl Accumulator for MemorySink {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.records.push(Record {
            measurement: measurement.to_string(),
            fields,
            tags,
        });
    }
}

/// Writes InfluxDB line protocol, one line per record.
pub struct LineProtocolSink<W: Write> {
    writer: W,
}

impl LineProtocolSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> LineProtocolSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Accumulator for LineProtocolSink<W> {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        let Some(line) = format_line(measurement, &fields, &tags, now_nanos()) else {
            return;
        };
        if let Err(e) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            warn!("Unable to write {measurement} record: {e:?}");
        }
    }
}

/// Shares one sink between several pollers. A whole batch is written
/// under a single lock so lines from different daemons never interleave.
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Accumulator> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    pub fn flush(&self, batch: &mut MemorySink) {
        self.with(|sink| batch.drain_into(sink));
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        // A panic elsewhere can't leave a half-written record behind, so
        // carry on with the poisoned value.
        let mut lock = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *lock)
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

fn escape(raw: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn format_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Integer(i) => Some(format!("{i}i")),
        FieldValue::Float(f) if f.is_finite() => Some(format!("{f}")),
        // Line protocol has no representation for NaN or infinity.
        FieldValue::Float(_) => None,
    }
}

/// Formats one record as a line protocol line. Returns `None` when no
/// field survives, since a line without fields is invalid.
pub fn format_line(measurement: &str, fields: &Fields, tags: &Tags, timestamp_ns: i64) -> Option<String> {
    const KEY_SPECIALS: &[char] = &[',', '=', ' '];

    let field_set: Vec<String> = fields
        .iter()
        .filter_map(|(k, v)| format_value(v).map(|v| format!("{}={v}", escape(k, KEY_SPECIALS))))
        .collect();
    if field_set.is_empty() {
        return None;
    }

    let mut line = escape(measurement, &[',', ' ']);
    for (k, v) in tags.iter().filter(|(_, v)| !v.is_empty()) {
        line.push(',');
        line.push_str(&escape(k, KEY_SPECIALS));
        line.push('=');
        line.push_str(&escape(v, KEY_SPECIALS));
    }
    line.push(' ');
    line.push_str(&field_set.join(","));
    line.push(' ');
    line.push_str(&timestamp_ns.to_string());
    Some(line)
}
