//! Logging setup on top of `tracing-subscriber`.
//!
//! Everything goes to stderr. stdout carries nothing but the `COUNT:` line
//! and result lines, so it can be piped straight into other tools.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Pick the filter directive: `-v` forces at least debug, otherwise the
/// configured level is used when it is a known level name.
fn default_directive(configured: &str, verbose: bool) -> &'static str {
    let configured = configured.trim().to_ascii_lowercase();
    let level = LEVELS
        .iter()
        .copied()
        .find(|l| *l == configured)
        .unwrap_or("info");
    if verbose && level != "trace" {
        "debug"
    } else {
        level
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the computed directive entirely.
pub fn init(directive: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// `-v` and `--json-logs` win over the config file.
pub fn init_from_config(
    config: &tomte_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let directive = default_directive(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format.eq_ignore_ascii_case("json");
    init(directive, json_format);
}
