use std::process::ExitCode;
use std::sync::Arc;

use prometrics::config::{load_config, print_schema};
use prometrics::startup;
use prometrics::utils::logger::init_logging;
use tracing::error;

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

// -- Entrypoint
//
// Usage: prometrics [--schema] [CONFIG_PATH]

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--schema") {
        return match print_schema() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error printing schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match startup::run(Arc::new(config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server terminated");
            ExitCode::FAILURE
        }
    }
}
