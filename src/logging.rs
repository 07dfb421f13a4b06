//! Log output for the command-line tool.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary (or to an embedding application).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a `-v` count: warnings, then info, then debug.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "link_grammar=warn",
        1 => "link_grammar=info",
        _ => "link_grammar=debug",
    }
}

/// Install a stderr subscriber. `RUST_LOG` overrides the verbosity default.
/// Does nothing if a subscriber is already installed.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
