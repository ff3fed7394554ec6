//! Log output for the lookup engine and the CLI.
//!
//! Filtering comes from `DICT_AGGREGATOR_LOG` when set, in `EnvFilter`
//! syntax. Otherwise other crates log warnings only and this crate logs at
//! info, or debug when verbose.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, util::SubscriberInitExt};

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "DICT_AGGREGATOR_LOG";

static INIT: Once = Once::new();

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,dict_aggregator=debug"
    } else {
        "warn,dict_aggregator=info"
    }
}

/// Builds the filter from `spec` (the value of [`LOG_ENV`]). A spec that
/// fails to parse is reported and replaced by the defaults.
fn filter(spec: Option<&str>, verbose: bool) -> EnvFilter {
    let defaults = || EnvFilter::new(default_directives(verbose));
    match spec.map(str::trim).filter(|spec| !spec.is_empty()) {
        Some(spec) => EnvFilter::try_new(spec).unwrap_or_else(|e| {
            eprintln!("Ignoring {LOG_ENV}={spec:?}: {e}");
            defaults()
        }),
        None => defaults(),
    }
}

/// Installs the subscriber. Only the first call has an effect.
///
/// Logs go to stderr; stdout is reserved for the lookup document. Under the
/// test harness the output goes through the captured test writer at debug.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let is_test =
            std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok();
        let spec = std::env::var(LOG_ENV).ok();

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter(spec.as_deref(), verbose || is_test))
            .with_ansi(false)
            .with_target(is_test || verbose)
            .with_span_events(FmtSpan::NONE)
            .compact();

        if is_test {
            std::mem::forget(builder.with_test_writer().finish().set_default());
        } else if let Err(e) = builder.with_writer(std::io::stderr).try_init() {
            eprintln!("Failed to initialize logging: {e}");
        }
    });
}
