use std::{fs::File, path::Path};

use eyre::{Context, Result};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Directives used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "warn,iris=info,iris_gl=info,iris_platform=info,gl=warn";

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install `color-eyre` and the global subscriber.
///
/// Console output follows `RUST_LOG`. When `log_file` is given, every event and frame span is
/// also written there as JSON lines, unfiltered.
pub fn enable(log_file: Option<&Path>) -> Result<()> {
    color_eyre::install()?;
    let json_layer = log_file
        .map(|path| -> Result<_> {
            let file = File::create(path)
                .with_context(|| format!("Cannot create log file {}", path.display()))?;
            Ok(tracing_subscriber::fmt::layer()
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file))
        })
        .transpose()?;

    let registry = tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_filter(console_filter()))
        .with(json_layer);
    #[cfg(feature = "tracy")]
    let registry = registry.with(tracing_tracy::TracyLayer::new());
    registry
        .try_init()
        .context("Cannot install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }
}
