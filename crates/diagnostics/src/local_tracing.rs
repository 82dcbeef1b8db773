use crate::LogLevel;
use std::{io, sync::atomic::AtomicBool};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, Layer};

static IS_TRACING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Install the global subscriber once, at process start.
///
/// `TRACE` takes precedence over `level` and is parsed as an [`EnvFilter`] directive.
pub fn enable_tracing(level: LogLevel) {
    if IS_TRACING_ENABLED.swap(true, std::sync::atomic::Ordering::SeqCst) {
        return;
    }

    use tracing_subscriber::{fmt, prelude::*};
    let filter = std::env::var("TRACE").ok().map_or_else(
        || LevelFilter::from(level).boxed(),
        |trace_var| env_filter_layer(&trace_var),
    );

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_target(false).with_writer(io::stderr))
        .try_init();
}

fn env_filter_layer(
    trace_var: &str,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> {
    match EnvFilter::builder().parse(trace_var) {
        Ok(filter) => filter.boxed(),
        Err(error) => {
            eprintln!("ignoring invalid TRACE directive {trace_var:?}: {error}");
            LevelFilter::TRACE.boxed()
        }
    }
}
