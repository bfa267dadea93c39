//! Structured logging for the dashboard client.
//!
//! Log lines are JSONL written to a per-run directory. Nothing is echoed to
//! stdout: stdout is the dashboard surface and must stay clean. Diagnostic
//! entries (failed fetches, detail misses) land here instead of the screen.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("debug") => Level::Debug,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Domain tags for filtering via LOG_DOMAINS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Api,      // HTTP requests and responses
    History,  // History pages, detail lookups
    Render,   // Redraw cycles
    Download, // CSV export saves
    Notify,   // Notice lifecycle
    System,   // Startup, shutdown
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Api => "api",
            Domain::History => "history",
            Domain::Render => "render",
            Domain::Download => "download",
            Domain::Notify => "notify",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

struct RunContext {
    run_id: String,
    events: Mutex<BufWriter<File>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }

        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        let events = File::create(run_dir.join("events.jsonl")).unwrap_or_else(|err| {
            eprintln!("[log] failed to create events log: {}", err);
            File::create("/tmp/riskdash-events.jsonl").expect("events fallback")
        });

        RunContext {
            run_id,
            events: Mutex::new(BufWriter::new(events)),
        }
    })
}

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }

    let ctx = ensure_run_context();
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("data".to_string(), Value::Object(fields));

    let line = Value::Object(entry).to_string();
    if let Ok(mut w) = ctx.events.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// Field helpers: obj(&[("key", v_str("value"))])

pub fn obj(fields: &[(&str, Value)]) -> Map<String, Value> {
    let mut m = Map::new();
    for (k, v) in fields {
        m.insert(k.to_string(), v.clone());
    }
    m
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_domain_tags_are_stable() {
        assert_eq!(Domain::Api.as_str(), "api");
        assert_eq!(Domain::Download.as_str(), "download");
    }
}
