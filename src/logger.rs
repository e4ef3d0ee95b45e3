use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber with the default `info` filter.
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `default_filter`.
///
/// When the active filter lets debug events through, the `frame` and `concatenate`
/// spans report their durations on close. Returns false if a subscriber was already set.
pub fn init_with_filter(default_filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let span_events = if reports_span_timings(&env_filter) {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

fn reports_span_timings(filter: &EnvFilter) -> bool {
    filter
        .max_level_hint()
        .is_some_and(|level| level >= LevelFilter::DEBUG)
}
