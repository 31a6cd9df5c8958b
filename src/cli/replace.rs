use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use super::remove::EditResponse;
use crate::editor::SettingsFile;
use crate::error::WebssoError;

#[derive(Debug, Args)]
pub struct ReplaceArgs {
    #[arg(value_name = "NAME", help = "Entry name, e.g. WEBSSO_CHOICES")]
    pub name: String,
    #[arg(
        value_name = "VALUE",
        help = "Literal text of the new value; '-' reads it from stdin"
    )]
    pub value: String,
    #[arg(value_name = "FILE", help = "Settings file to edit")]
    pub file: PathBuf,
}

pub fn run_replace(args: ReplaceArgs) -> Result<EditResponse, WebssoError> {
    let value = if args.value == "-" {
        read_value_from_stdin()?
    } else {
        args.value
    };
    if value.trim().is_empty() {
        return Err(WebssoError::InvalidRequest {
            message: format!("Refusing to write an empty value for '{}'", args.name),
        });
    }

    let outcome = SettingsFile::new(&args.file).replace_block(&args.name, &value)?;

    Ok(EditResponse {
        file: args.file.display().to_string(),
        outcome,
    })
}

fn read_value_from_stdin() -> Result<String, WebssoError> {
    let mut value = String::new();
    std::io::stdin()
        .read_to_string(&mut value)
        .map_err(|error| WebssoError::StdinRead { source: error })?;
    Ok(value.trim_end_matches(['\r', '\n']).to_string())
}
