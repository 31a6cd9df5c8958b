use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum WebssoError {
    #[error("Failed to access file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File '{path}' does not exist")]
    MissingFile { path: String },

    #[error("Malformed record in '{path}' at line {line}: {message}")]
    MalformedRecord {
        path: String,
        line: u64,
        message: String,
    },

    #[error("Failed to read stdin: {source}")]
    StdinRead {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize response JSON: {source}")]
    ResponseSerialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid entry name '{name}'")]
    InvalidEntryName { name: String },

    #[error("Invalid profile '{path}': {message}")]
    InvalidProfile { path: String, message: String },

    #[error("File '{path}' is busy: another edit is in progress")]
    ResourceBusy { path: String },

    #[error("File '{path}' was replaced during the edit")]
    PathChanged { path: String },

    #[error(
        "File content changed during the edit. Expected hash '{expected_hash}', got '{actual_hash}'"
    )]
    PreconditionFailed {
        expected_hash: String,
        actual_hash: String,
    },
}

impl WebssoError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::MissingFile {
                path: path.display().to_string(),
            };
        }

        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::MissingFile { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "missing_file".to_string(),
                    message: self.to_string(),
                    suggestion: Some(
                        "Check --settings / --idp-table or the WEBSSO_SETTINGS_PATH and WEBSSO_IDP_TABLE variables".to_string(),
                    ),
                },
            },
            Self::MalformedRecord { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "malformed_record".to_string(),
                    message: self.to_string(),
                    suggestion: Some(
                        "The table needs a header row with idp_horizon_name, idp_keystone_name and fqdn columns".to_string(),
                    ),
                },
            },
            Self::InvalidRequest { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "invalid_request".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
            Self::InvalidEntryName { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "invalid_entry_name".to_string(),
                    message: self.to_string(),
                    suggestion: Some(
                        "Entry names are Python identifiers such as 'WEBSSO_CHOICES'".to_string(),
                    ),
                },
            },
            Self::InvalidProfile { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "invalid_profile".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
            Self::ResourceBusy { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "resource_busy".to_string(),
                    message: self.to_string(),
                    suggestion: Some("Retry after the current edit completes".to_string()),
                },
            },
            Self::PathChanged { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "path_changed".to_string(),
                    message: self.to_string(),
                    suggestion: Some("Re-run the command against the current file".to_string()),
                },
            },
            Self::PreconditionFailed { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "precondition_failed".to_string(),
                    message: self.to_string(),
                    suggestion: Some(
                        "Another process modified the file; re-run the command".to_string(),
                    ),
                },
            },
            Self::Io { .. } | Self::StdinRead { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "io_error".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
            Self::ResponseSerialization { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "serialization_error".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub r#type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
