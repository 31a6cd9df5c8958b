use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::editor::SettingsFile;
use crate::error::WebssoError;

#[derive(Debug, Args)]
pub struct LocateArgs {
    #[arg(value_name = "NAME", help = "Entry name, e.g. WEBSSO_CHOICES")]
    pub name: String,
    #[arg(value_name = "FILE", help = "Settings file to scan")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct LocateResponse {
    pub file: String,
    pub entry: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Line numbers in the response are 1-based.
pub fn run_locate(args: LocateArgs) -> Result<LocateResponse, WebssoError> {
    let settings = SettingsFile::new(&args.file);
    let span = settings.locate(&args.name)?;
    let text = match span {
        Some(span) => Some(settings.read_lines()?[span.start..=span.end].concat()),
        None => None,
    };

    Ok(LocateResponse {
        file: args.file.display().to_string(),
        entry: args.name,
        found: span.is_some(),
        start_line: span.map(|span| span.start + 1),
        end_line: span.map(|span| span.end + 1),
        text,
    })
}
