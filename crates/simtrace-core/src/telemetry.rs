//! Tracing setup for the simtrace binary.
//!
//! Call [`init_tracing`] once at program start. It installs a global
//! subscriber with an `EnvFilter` and either plain or JSON formatting.
//!
//! Log output goes to stderr in both formats, so `simtrace replay` and
//! `simtrace best` can print their JSON reports on stdout and stay
//! pipeable. `SIM_TRACE_LOG:` step lines are emitted at `debug`; they only
//! appear with `--verbose` or a matching `RUST_LOG`.
//!
//! Later calls are ignored; the global subscriber can only be set once per
//! process, which also keeps repeated calls from tests harmless.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// * `json`: emit newline-delimited JSON events, one per line, for log
///   collectors. Session and episode fields from `obs` become JSON keys.
/// * `level`: default verbosity when `RUST_LOG` is not set.
///
/// `RUST_LOG` takes precedence, e.g. `RUST_LOG=simtrace_core=debug` to see
/// per-step trace lines without the rest of the debug output.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
