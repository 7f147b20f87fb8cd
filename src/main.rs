use std::process::ExitCode;

use tracing::{error, info, warn};

use clubchat::Config;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    let override_warnings = config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = clubchat::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        clubchat::logging::init_console_only(&config.logging.level);
    }

    for warning in &override_warnings {
        warn!("{}", warning);
    }

    info!(
        "Chat server running on {}:{}.",
        config.server.host, config.server.port
    );

    match clubchat::serve(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
