//! rxportal RPC Server: JSON-RPC over stdin/stdout for the portal front-end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.toggle", "params":{"resource_id":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::io::{self, Write};
use std::time::Instant;

use rxportal::app::App;
use rxportal::rpc_handler::handle_method;
use rxportal::services::logging;
use rxportal::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Simple rate limiter: max requests per one-second window.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// Writes one response line. A closed stdout means the front-end is gone.
fn emit(value: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", value)?;
    out.flush()
}

#[tokio::main]
async fn main() {
    let config_path = std::env::var("RXPORTAL_CONFIG").ok();
    let mut settings_engine = SettingsEngine::new(config_path);
    let load_error = settings_engine.load().err();
    settings_engine.apply_env_overrides();

    logging::init(&settings_engine.get_settings().logging);
    if let Some(e) = load_error {
        warn!(error = %e, "settings file unreadable, using defaults");
    }

    let app = match App::from_settings(settings_engine) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to start portal session");
            let _ = emit(&json!({"event": "fatal", "error": e.to_string()}));
            std::process::exit(1);
        }
    };
    let _listener = app.spawn_profile_listener();

    if emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")})).is_err() {
        return;
    }
    info!("rpc server ready");

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                if emit(&json!({"id": null, "error": format!("parse error: {}", e)})).is_err() {
                    break;
                }
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        let response = if !rate_limiter.check() {
            json!({"id": id, "error": "rate limit exceeded"})
        } else {
            let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
            let params = req.get("params").cloned().unwrap_or(json!({}));
            match handle_method(&app, method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            }
        };

        if emit(&response).is_err() {
            break;
        }
    }

    info!("stdin closed, shutting down");
}
