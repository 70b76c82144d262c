//! Log subscriber setup

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset
pub fn fallback_filter(verbose: bool) -> &'static str {
    if verbose {
        "mcportal=debug,tower_http=debug"
    } else {
        "mcportal=info,tower_http=info"
    }
}

/// Install a stderr fmt subscriber filtered by `RUST_LOG`
pub fn init(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_filter(verbose)))?;
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {}", err))
}
