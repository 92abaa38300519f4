use std::sync::OnceLock;

static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// `--json`: final plan/result goes to stdout as one JSON envelope.
pub fn set_json_mode(v: bool) {
    let _ = JSON_MODE.set(v);
}

pub fn json_mode() -> bool {
    *JSON_MODE.get().unwrap_or(&false)
}

pub fn logs_are_json() -> bool {
    matches!(std::env::var("JOBFEED_LOG_FORMAT").as_deref(), Ok("json"))
}

/// Initialize tracing/logging according to RUST_LOG and JOBFEED_LOG_FORMAT.
/// - Defaults to `info` if `RUST_LOG` is unset
/// - Supports `JOBFEED_LOG_FORMAT=json` for JSON logs
/// - Always writes to stderr so stdout stays clean for the result envelope
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    use tracing_subscriber::prelude::*; // for .with()

    // Default filter if RUST_LOG unset
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    if logs_are_json() {
        let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
    } else {
        // human-friendly compact text
        let _ = builder.with(fmt_layer.compact()).try_init();
    }
}
