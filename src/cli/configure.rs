use std::path::PathBuf;

use clap::Args;

use crate::configure::{ConfigureOptions, ConfigureResponse, run_configure};
use crate::error::WebssoError;

pub const DEFAULT_SETTINGS_PATH: &str =
    "/opt/stack/horizon/openstack_dashboard/local/local_settings.py";
pub const DEFAULT_IDP_TABLE: &str = "sp3_supporting_files/idp_list.csv";

#[derive(Debug, Args)]
pub struct ConfigureArgs {
    #[arg(
        long,
        value_name = "PATH",
        env = "WEBSSO_SETTINGS_PATH",
        default_value = DEFAULT_SETTINGS_PATH,
        help = "Horizon local_settings.py to edit"
    )]
    pub settings: PathBuf,
    #[arg(
        long = "idp-table",
        value_name = "PATH",
        env = "WEBSSO_IDP_TABLE",
        default_value = DEFAULT_IDP_TABLE,
        help = "Delimited table with idp_horizon_name, idp_keystone_name and fqdn columns"
    )]
    pub idp_table: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "TOML profile overriding entry names and constants"
    )]
    pub profile: Option<PathBuf>,
    #[arg(
        long,
        value_name = "CHAR",
        help = "Table delimiter (overrides the profile; default ';')"
    )]
    pub delimiter: Option<char>,
    #[arg(long, help = "Report the edits without writing the settings file")]
    pub dry_run: bool,
    #[arg(long, help = "Emit structured JSON output")]
    pub json: bool,
}

pub enum ConfigureCommandOutput {
    Text(String),
    Json(ConfigureResponse),
}

pub fn run_configure_command(args: ConfigureArgs) -> Result<ConfigureCommandOutput, WebssoError> {
    let profile = super::load_profile(args.profile.as_deref(), args.delimiter)?;
    let response = run_configure(&ConfigureOptions {
        settings_path: args.settings,
        idp_table: args.idp_table,
        profile,
        dry_run: args.dry_run,
    })?;

    if args.json {
        Ok(ConfigureCommandOutput::Json(response))
    } else {
        Ok(ConfigureCommandOutput::Text(response.to_text()))
    }
}
