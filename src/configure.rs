use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::editor::{
    EditAction, EditOutcome, SettingsFile, ensure_scalar_lines, replace_block_lines,
    validate_entry_name,
};
use crate::error::WebssoError;
use crate::hash::lines_hash;
use crate::idp::{IdentityProviderRecord, read_idp_table};
use crate::profile::SsoProfile;
use crate::render::{render_choices, render_idp_mapping};

pub const SUCCESS_MESSAGE: &str = "Horizon SSO configuration updated successfully.";
pub const DRY_RUN_MESSAGE: &str = "Dry run: Horizon SSO configuration was not written.";

#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    pub settings_path: PathBuf,
    pub idp_table: PathBuf,
    pub profile: SsoProfile,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedEdit {
    EnsureScalar { name: String, value: String },
    ReplaceBlock { name: String, value: String },
}

impl PlannedEdit {
    pub fn name(&self) -> &str {
        match self {
            Self::EnsureScalar { name, .. } | Self::ReplaceBlock { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigureResponse {
    pub settings_file: String,
    pub idp_table: String,
    pub providers_loaded: usize,
    pub dry_run: bool,
    pub steps: Vec<EditOutcome>,
    pub content_hash: String,
    pub message: String,
}

impl ConfigureResponse {
    pub fn to_text(&self) -> String {
        let mut lines = self
            .steps
            .iter()
            .map(|step| match (step.action, step.previous_span) {
                (EditAction::Replaced, Some(span)) => format!(
                    "{}: replaced (previous definition at lines {}-{})",
                    step.entry,
                    span.start + 1,
                    span.end + 1
                ),
                (EditAction::Added, _) => format!("{}: added", step.entry),
                (EditAction::AlreadyPresent, _) => format!("{}: already present", step.entry),
                (EditAction::Appended, _) => format!("{}: appended", step.entry),
                (action, _) => format!("{}: {action:?}", step.entry),
            })
            .collect::<Vec<_>>();
        lines.push(self.message.clone());
        lines.join("\n")
    }
}

/// The edits of one run, in the order they are applied. Replacing moves each
/// block to end of file, so the mapping lands after the choices.
pub fn plan_edits(records: &[IdentityProviderRecord], profile: &SsoProfile) -> Vec<PlannedEdit> {
    let mut plan = vec![
        PlannedEdit::EnsureScalar {
            name: profile.enabled_entry.clone(),
            value: profile.enabled_value.clone(),
        },
        PlannedEdit::ReplaceBlock {
            name: profile.choices_entry.clone(),
            value: render_choices(records, profile),
        },
        PlannedEdit::ReplaceBlock {
            name: profile.mapping_entry.clone(),
            value: render_idp_mapping(records, profile),
        },
    ];

    if !records.is_empty() {
        plan.push(PlannedEdit::EnsureScalar {
            name: profile.initial_choice_entry.clone(),
            value: profile.initial_choice.clone(),
        });
    }

    plan
}

/// Loads the table, then applies every planned edit as its own locked,
/// atomic rewrite. A failure stops the run; edits already committed stay.
pub fn run_configure(options: &ConfigureOptions) -> Result<ConfigureResponse, WebssoError> {
    options.profile.validate()?;
    let records = read_idp_table(&options.idp_table, options.profile.delimiter)?;
    let plan = plan_edits(&records, &options.profile);
    let settings = SettingsFile::new(&options.settings_path);

    let (steps, content_hash) = if options.dry_run {
        preview_plan(&settings, &plan, &options.profile)?
    } else {
        apply_plan(&settings, &plan, &options.profile)?
    };

    let message = if options.dry_run {
        DRY_RUN_MESSAGE
    } else {
        SUCCESS_MESSAGE
    };
    info!("{message}");

    Ok(ConfigureResponse {
        settings_file: options.settings_path.display().to_string(),
        idp_table: options.idp_table.display().to_string(),
        providers_loaded: records.len(),
        dry_run: options.dry_run,
        steps,
        content_hash,
        message: message.to_string(),
    })
}

fn apply_plan(
    settings: &SettingsFile,
    plan: &[PlannedEdit],
    profile: &SsoProfile,
) -> Result<(Vec<EditOutcome>, String), WebssoError> {
    let mut steps = Vec::with_capacity(plan.len());
    for edit in plan {
        let outcome = match edit {
            PlannedEdit::EnsureScalar { name, value } => {
                settings.ensure_scalar(name, value, &profile.quoted_entries)?
            }
            PlannedEdit::ReplaceBlock { name, value } => settings.replace_block(name, value)?,
        };
        steps.push(outcome);
    }

    let content_hash = match steps.last() {
        Some(step) => step.content_hash.clone(),
        None => lines_hash(&settings.read_lines()?),
    };
    Ok((steps, content_hash))
}

fn preview_plan(
    settings: &SettingsFile,
    plan: &[PlannedEdit],
    profile: &SsoProfile,
) -> Result<(Vec<EditOutcome>, String), WebssoError> {
    let mut lines = settings.read_lines()?;
    let mut steps = Vec::with_capacity(plan.len());

    for edit in plan {
        validate_entry_name(edit.name())?;
        let (action, previous_span) = match edit {
            PlannedEdit::EnsureScalar { name, value } => (
                ensure_scalar_lines(&mut lines, name, value, &profile.quoted_entries),
                None,
            ),
            PlannedEdit::ReplaceBlock { name, value } => {
                match replace_block_lines(&mut lines, name, value) {
                    Some(span) => (EditAction::Replaced, Some(span)),
                    None => (EditAction::Appended, None),
                }
            }
        };
        steps.push(EditOutcome {
            entry: edit.name().to_string(),
            action,
            previous_span,
            written: false,
            content_hash: lines_hash(&lines),
        });
    }

    Ok((steps, lines_hash(&lines)))
}
