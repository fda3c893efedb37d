use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Picks the default level from the console flags. Quiet wins over verbose.
pub fn default_level(verbose: bool, quiet: bool) -> Level {
    if quiet {
        Level::WARN
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Installs the global stderr subscriber. `RUST_LOG`, when set, overrides the flags.
pub fn init(verbose: bool, quiet: bool) {
    let level = default_level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("img_squeeze={}", level.as_str().to_lowercase()))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Failed to install logger: {}", e);
    }
}
