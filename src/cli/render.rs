use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::configure::DEFAULT_IDP_TABLE;
use crate::error::WebssoError;
use crate::idp::{IdentityProviderRecord, read_idp_table};
use crate::render::{render_choices, render_idp_mapping};

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[arg(
        long = "idp-table",
        value_name = "PATH",
        env = "WEBSSO_IDP_TABLE",
        default_value = DEFAULT_IDP_TABLE,
        help = "Delimited identity-provider table"
    )]
    pub idp_table: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "TOML profile overriding entry names and constants"
    )]
    pub profile: Option<PathBuf>,
    #[arg(long, value_name = "CHAR", help = "Table delimiter (default ';')")]
    pub delimiter: Option<char>,
    #[arg(long, help = "Emit structured JSON output")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub records: Vec<IdentityProviderRecord>,
    pub choices: String,
    pub mapping: String,
}

pub enum RenderCommandOutput {
    Text(String),
    Json(RenderResponse),
}

pub fn run_render(args: RenderArgs) -> Result<RenderCommandOutput, WebssoError> {
    let profile = super::load_profile(args.profile.as_deref(), args.delimiter)?;
    let records = read_idp_table(&args.idp_table, profile.delimiter)?;
    let choices = render_choices(&records, &profile);
    let mapping = render_idp_mapping(&records, &profile);

    if args.json {
        return Ok(RenderCommandOutput::Json(RenderResponse {
            records,
            choices,
            mapping,
        }));
    }

    Ok(RenderCommandOutput::Text(format!(
        "{} = {choices}\n\n{} = {mapping}",
        profile.choices_entry, profile.mapping_entry
    )))
}
