use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map `-v` repetitions onto a default filter directive.
pub fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose` when set.
///
/// stdout is reserved for the report line, so nothing is ever logged there.
/// A subscriber that is already installed is left in place.
pub fn init_logging(verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(verbosity_directive(verbose)))
        .map_err(|e| anyhow!("invalid log filter: {e}"))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
    {
        if !e.to_string().contains("already been set") {
            return Err(anyhow!(e));
        }
    }
    Ok(())
}
