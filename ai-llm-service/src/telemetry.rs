use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Crate target prefix, used to raise verbosity for completion calls only.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Compact single-line formatting layer.
///
/// - RFC3339 UTC timestamps
/// - target and `file:line`
/// - ANSI colors only when stderr is a terminal
///
/// Writes to stderr so the interactive console keeps stdout for answers.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stderr().is_terminal())
        .event_format(fmt::format().compact().with_source_location(true))
}

/// Directive like `ai_llm_service=debug`.
pub fn level_directive(level: Level) -> Result<Directive, ParseError> {
    format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase()).parse()
}

/// `RUST_LOG` if set, else `default`, with this crate raised to `level`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match level_directive(level) {
        Ok(d) => base.add_directive(d),
        Err(_) => base,
    }
}

/// Installs the global subscriber: env filter plus [`layer`].
///
/// # Errors
/// Fails if a global subscriber is already set.
pub fn init(default: &str, level: Level) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter_with_level(default, level))
        .with(layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_targets_this_crate() {
        let d = level_directive(Level::DEBUG).unwrap();
        assert_eq!(d.to_string(), "ai_llm_service=debug");
    }
}
