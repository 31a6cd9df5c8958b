use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::WebssoError;
use crate::idp::delimiter_byte;
use crate::profile::SsoProfile;

pub mod configure;
pub mod ensure;
pub mod locate;
pub mod remove;
pub mod render;
pub mod replace;

#[derive(Debug, Parser)]
#[command(name = "horizon-websso")]
#[command(about = "Enable Horizon web single sign-on in local_settings.py")]
#[command(
    long_about = "Edits Horizon's local_settings.py in place to enable web SSO. 'configure' runs the full sequence from an identity-provider table; the other commands expose the individual block edits."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Write WEBSSO_* settings from the identity-provider table")]
    Configure(configure::ConfigureArgs),
    #[command(about = "Show the line range of a bracketed entry")]
    Locate(locate::LocateArgs),
    #[command(about = "Append a NAME = VALUE line if NAME is not assigned yet")]
    Ensure(ensure::EnsureArgs),
    #[command(about = "Delete a bracketed entry")]
    Remove(remove::RemoveArgs),
    #[command(about = "Delete a bracketed entry and append a new definition at end of file")]
    Replace(replace::ReplaceArgs),
    #[command(about = "Print the literals generated from the identity-provider table")]
    Render(render::RenderArgs),
}

pub(crate) fn load_profile(
    profile: Option<&Path>,
    delimiter: Option<char>,
) -> Result<SsoProfile, WebssoError> {
    let mut profile = SsoProfile::load_or_default(profile)?;
    if let Some(delimiter) = delimiter {
        delimiter_byte(delimiter)?;
        profile.delimiter = delimiter;
    }
    Ok(profile)
}
