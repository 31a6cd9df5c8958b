use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::WebssoError;

pub const DEFAULT_DELIMITER: char = ';';

pub const REQUIRED_COLUMNS: [&str; 3] = ["idp_horizon_name", "idp_keystone_name", "fqdn"];

/// One row of the identity-provider table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProviderRecord {
    /// Key used in the generated choices tuple and mapping dict.
    #[serde(rename = "idp_horizon_name")]
    pub horizon_name: String,
    #[serde(rename = "idp_keystone_name")]
    pub keystone_name: String,
    /// Label shown on the login form.
    #[serde(rename = "fqdn")]
    pub display_name: String,
}

impl IdentityProviderRecord {
    pub fn new(
        horizon_name: impl Into<String>,
        keystone_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            horizon_name: horizon_name.into(),
            keystone_name: keystone_name.into(),
            display_name: display_name.into(),
        }
    }
}

pub fn read_idp_table(
    path: &Path,
    delimiter: char,
) -> Result<Vec<IdentityProviderRecord>, WebssoError> {
    let delimiter = delimiter_byte(delimiter)?;
    let file = File::open(path).map_err(|error| WebssoError::io(path, error))?;
    let records = parse_idp_records(file, delimiter, path)?;
    debug!(
        "loaded {} identity provider record(s) from '{}'",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parses a header-led delimited table. Any bad row rejects the whole table.
pub fn parse_idp_records<R: Read>(
    reader: R,
    delimiter: u8,
    source: &Path,
) -> Result<Vec<IdentityProviderRecord>, WebssoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|error| record_error(source, error))?
        .clone();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(WebssoError::MalformedRecord {
            path: source.display().to_string(),
            line: 1,
            message: format!("header is missing required column(s): {}", missing.join(", ")),
        });
    }

    reader
        .deserialize::<IdentityProviderRecord>()
        .map(|row| row.map_err(|error| record_error(source, error)))
        .collect()
}

pub fn delimiter_byte(delimiter: char) -> Result<u8, WebssoError> {
    if delimiter.is_ascii() && !matches!(delimiter, '"' | '\n' | '\r') {
        Ok(delimiter as u8)
    } else {
        Err(WebssoError::InvalidRequest {
            message: format!("Table delimiter must be a single ASCII character, got {delimiter:?}"),
        })
    }
}

fn record_error(path: &Path, error: csv::Error) -> WebssoError {
    let line = error.position().map_or(0, |position| position.line());
    let message = error.to_string();
    match error.into_kind() {
        csv::ErrorKind::Io(source) => WebssoError::io(path, source),
        _ => WebssoError::MalformedRecord {
            path: path.display().to_string(),
            line,
            message,
        },
    }
}
