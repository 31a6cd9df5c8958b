use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::editor::validate_entry_name;
use crate::error::WebssoError;
use crate::idp::{DEFAULT_DELIMITER, delimiter_byte};

/// Entry names and constants written into the settings file.
///
/// Every field defaults to the stock Horizon values, so an empty TOML file is a
/// valid profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SsoProfile {
    pub enabled_entry: String,
    pub enabled_value: String,
    pub choices_entry: String,
    pub mapping_entry: String,
    pub initial_choice_entry: String,
    pub initial_choice: String,
    pub protocol: String,
    pub credentials_label: String,
    /// Wrap the credentials label in gettext `_()`.
    pub translate_credentials_label: bool,
    /// Scalar entries whose values are written as double-quoted strings.
    pub quoted_entries: Vec<String>,
    pub delimiter: char,
}

impl Default for SsoProfile {
    fn default() -> Self {
        Self {
            enabled_entry: "WEBSSO_ENABLED".to_string(),
            enabled_value: "True".to_string(),
            choices_entry: "WEBSSO_CHOICES".to_string(),
            mapping_entry: "WEBSSO_IDP_MAPPING".to_string(),
            initial_choice_entry: "WEBSSO_INITIAL_CHOICE".to_string(),
            initial_choice: "credentials".to_string(),
            protocol: "saml2".to_string(),
            credentials_label: "Keystone Credentials".to_string(),
            translate_credentials_label: true,
            quoted_entries: vec!["WEBSSO_INITIAL_CHOICE".to_string()],
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SsoProfile {
    pub fn load(path: &Path) -> Result<Self, WebssoError> {
        let text = fs::read_to_string(path).map_err(|error| WebssoError::io(path, error))?;
        let profile: Self = toml::from_str(&text).map_err(|error| WebssoError::InvalidProfile {
            path: path.display().to_string(),
            message: error.message().to_string(),
        })?;
        profile.validate().map_err(|error| WebssoError::InvalidProfile {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        Ok(profile)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, WebssoError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), WebssoError> {
        for name in [
            &self.enabled_entry,
            &self.choices_entry,
            &self.mapping_entry,
            &self.initial_choice_entry,
        ] {
            validate_entry_name(name)?;
        }
        delimiter_byte(self.delimiter)?;
        Ok(())
    }
}
