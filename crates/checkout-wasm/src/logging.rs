//! Console logging for `tracing`.
//!
//! Events go to the browser console through `tracing-wasm`, filtered by the
//! page's `logLevel` directive.

use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};
use tracing_wasm::{WASMLayer, WASMLayerConfigBuilder};

fn filter_for(directive: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .parse_lossy(directive)
}

/// Install the console subscriber. Later calls leave the first one in place.
pub fn init_logging(directive: &str) {
    // No performance marks, console output only
    let config = WASMLayerConfigBuilder::new()
        .set_report_logs_in_timings(false)
        .build();

    let installed = tracing_subscriber::registry()
        .with(WASMLayer::new(config))
        .with(filter_for(directive))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(directive, "console logging initialized");
    }
}
