use std::path::PathBuf;

use clap::Args;

use super::remove::EditResponse;
use crate::editor::SettingsFile;
use crate::error::WebssoError;

#[derive(Debug, Args)]
pub struct EnsureArgs {
    #[arg(value_name = "NAME", help = "Entry name, e.g. WEBSSO_ENABLED")]
    pub name: String,
    #[arg(value_name = "VALUE", help = "Value written verbatim unless --quote is given")]
    pub value: String,
    #[arg(value_name = "FILE", help = "Settings file to edit")]
    pub file: PathBuf,
    #[arg(long, help = "Write the value as a double-quoted string")]
    pub quote: bool,
}

pub fn run_ensure(args: EnsureArgs) -> Result<EditResponse, WebssoError> {
    let quoted_names = if args.quote {
        vec![args.name.clone()]
    } else {
        Vec::new()
    };
    let outcome =
        SettingsFile::new(&args.file).ensure_scalar(&args.name, &args.value, &quoted_names)?;

    Ok(EditResponse {
        file: args.file.display().to_string(),
        outcome,
    })
}
