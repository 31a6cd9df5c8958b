use std::process::ExitCode;

use clap::Parser;
use horizon_websso::cli::configure::ConfigureCommandOutput;
use horizon_websso::cli::render::RenderCommandOutput;
use horizon_websso::cli::{Cli, Commands};
use horizon_websso::error::WebssoError;
use serde::Serialize;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match run() {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("{error}");
            let serialized = serde_json::to_string_pretty(&error.to_error_response()).unwrap_or_else(
                |_| {
                    "{\"error\":{\"type\":\"serialization_error\",\"message\":\"Failed to serialize error response\"}}"
                        .to_string()
                },
            );
            println!("{serialized}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<String, WebssoError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Configure(args) => {
            match horizon_websso::cli::configure::run_configure_command(args)? {
                ConfigureCommandOutput::Text(output) => Ok(output),
                ConfigureCommandOutput::Json(response) => to_json(&response),
            }
        }
        Commands::Locate(args) => to_json(&horizon_websso::cli::locate::run_locate(args)?),
        Commands::Ensure(args) => to_json(&horizon_websso::cli::ensure::run_ensure(args)?),
        Commands::Remove(args) => to_json(&horizon_websso::cli::remove::run_remove(args)?),
        Commands::Replace(args) => to_json(&horizon_websso::cli::replace::run_replace(args)?),
        Commands::Render(args) => match horizon_websso::cli::render::run_render(args)? {
            RenderCommandOutput::Text(output) => Ok(output),
            RenderCommandOutput::Json(response) => to_json(&response),
        },
    }
}

fn to_json<T: Serialize>(response: &T) -> Result<String, WebssoError> {
    serde_json::to_string_pretty(response)
        .map_err(|source| WebssoError::ResponseSerialization { source })
}
