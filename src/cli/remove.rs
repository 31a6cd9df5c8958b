use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::editor::{EditOutcome, SettingsFile};
use crate::error::WebssoError;

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[arg(value_name = "NAME", help = "Entry name, e.g. WEBSSO_IDP_MAPPING")]
    pub name: String,
    #[arg(value_name = "FILE", help = "Settings file to edit")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub file: String,
    #[serde(flatten)]
    pub outcome: EditOutcome,
}

pub fn run_remove(args: RemoveArgs) -> Result<EditResponse, WebssoError> {
    let outcome = SettingsFile::new(&args.file).remove_block(&args.name)?;

    Ok(EditResponse {
        file: args.file.display().to_string(),
        outcome,
    })
}
