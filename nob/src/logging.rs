//! Tracing subscriber setup for applications embedding the Coordinator

use eyre::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Parse a level name, falling back to INFO for anything unknown
pub fn parse_level(level: &str) -> Level {
    match level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", level);
            Level::INFO
        }
    }
}

/// Install a stderr fmt subscriber
///
/// Level priority: explicit `cli_log_level` > `config_log_level` > INFO.
/// `RUST_LOG` directives are layered on top. Calling this again once a global
/// subscriber exists is a no-op.
pub fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let level = cli_log_level.or(config_log_level).map(parse_level).unwrap_or(Level::INFO);

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("setup_logging: subscriber already installed");
        return Ok(());
    }

    tracing::info!(%level, "Logging initialized");
    Ok(())
}
