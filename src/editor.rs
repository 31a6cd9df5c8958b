use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;

use crate::error::WebssoError;
use crate::hash::lines_hash;
use crate::locator::{BlockSpan, find_start, has_scalar, locate, split_lines};
use crate::render::python_str;

mod io;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Added,
    AlreadyPresent,
    Removed,
    NotFound,
    Replaced,
    /// Written at end of file without a previous balanced definition to remove.
    Appended,
}

impl EditAction {
    pub fn changes_file(self) -> bool {
        !matches!(self, Self::AlreadyPresent | Self::NotFound)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EditOutcome {
    pub entry: String,
    pub action: EditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_span: Option<BlockSpan>,
    pub written: bool,
    pub content_hash: String,
}

impl EditOutcome {
    pub fn removed(&self) -> bool {
        self.previous_span.is_some()
    }
}

pub fn validate_entry_name(name: &str) -> Result<(), WebssoError> {
    static ENTRY_NAME: OnceLock<Regex> = OnceLock::new();
    let pattern = ENTRY_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("entry name regex should compile")
    });

    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(WebssoError::InvalidEntryName {
            name: name.to_string(),
        })
    }
}

pub fn should_quote(name: &str, quoted_names: &[String]) -> bool {
    quoted_names
        .iter()
        .any(|quoted| quoted.eq_ignore_ascii_case(name))
}

/// Appends `name = value` unless a `name =` line already exists. Never updates
/// an existing assignment.
pub fn ensure_scalar_lines(
    lines: &mut Vec<String>,
    name: &str,
    value: &str,
    quoted_names: &[String],
) -> EditAction {
    if has_scalar(name, lines.as_slice()) {
        return EditAction::AlreadyPresent;
    }

    if should_quote(name, quoted_names) {
        append_assignment(lines, name, &python_str(value));
    } else {
        append_assignment(lines, name, value);
    }
    EditAction::Added
}

pub fn remove_block_lines(lines: &mut Vec<String>, name: &str) -> Option<BlockSpan> {
    let span = locate(name, lines.as_slice())?;
    lines.drain(span.start..=span.end);
    Some(span)
}

/// Removes the located block, if any, and appends a fresh definition at end of
/// file. The entry does not keep its previous position.
pub fn replace_block_lines(lines: &mut Vec<String>, name: &str, value: &str) -> Option<BlockSpan> {
    let previous = remove_block_lines(lines, name);
    append_assignment(lines, name, value);
    previous
}

// Re-splitting keeps a final line without terminator joined to the leading
// newline of the appended text.
fn append_assignment(lines: &mut Vec<String>, name: &str, value: &str) {
    let mut text = lines.concat();
    text.push_str(&format!("\n{name} = {value}\n"));
    *lines = split_lines(&text);
}

/// A settings file on disk. Every operation locks the file, reads it in full,
/// applies one in-memory edit and, if anything changed, commits it with a
/// single atomic rewrite.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_lines(&self) -> Result<Vec<String>, WebssoError> {
        let (text, _) = io::read_guarded(&self.path)?;
        Ok(split_lines(&text))
    }

    pub fn locate(&self, name: &str) -> Result<Option<BlockSpan>, WebssoError> {
        validate_entry_name(name)?;
        let lines = self.read_lines()?;
        Ok(locate(name, &lines))
    }

    pub fn ensure_scalar(
        &self,
        name: &str,
        value: &str,
        quoted_names: &[String],
    ) -> Result<EditOutcome, WebssoError> {
        let outcome = self.edit(name, |lines| {
            (ensure_scalar_lines(lines, name, value, quoted_names), None)
        })?;
        match outcome.action {
            EditAction::Added => info!("added {name} to '{}'", self.path.display()),
            _ => info!("{name} already present in '{}'", self.path.display()),
        }
        Ok(outcome)
    }

    pub fn remove_block(&self, name: &str) -> Result<EditOutcome, WebssoError> {
        let outcome = self.edit(name, |lines| match remove_block_lines(lines, name) {
            Some(span) => (EditAction::Removed, Some(span)),
            None => (EditAction::NotFound, None),
        })?;
        match outcome.previous_span {
            Some(span) => info!(
                "removed {name} (lines {}-{}) from '{}'",
                span.start + 1,
                span.end + 1,
                self.path.display()
            ),
            None => info!(
                "{name} not found or not properly closed in '{}'",
                self.path.display()
            ),
        }
        Ok(outcome)
    }

    pub fn replace_block(&self, name: &str, value: &str) -> Result<EditOutcome, WebssoError> {
        self.replace_block_with_hook(name, value, |_| Ok(()))
    }

    fn replace_block_with_hook<H>(
        &self,
        name: &str,
        value: &str,
        before_write: H,
    ) -> Result<EditOutcome, WebssoError>
    where
        H: FnMut(&Path) -> Result<(), WebssoError>,
    {
        let mut dangling_start = None;
        let outcome = self.edit_with_hook(
            name,
            |lines| {
                if locate(name, lines.as_slice()).is_none() {
                    dangling_start = find_start(name, lines.as_slice());
                }
                match replace_block_lines(lines, name, value) {
                    Some(span) => (EditAction::Replaced, Some(span)),
                    None => (EditAction::Appended, None),
                }
            },
            before_write,
        )?;

        if let Some(line) = dangling_start {
            warn!(
                "{name} at line {} of '{}' has unbalanced brackets and was left in place; a second definition was appended",
                line + 1,
                self.path.display()
            );
        }
        info!("wrote {name} at end of '{}'", self.path.display());
        Ok(outcome)
    }

    fn edit<F>(&self, name: &str, mutate: F) -> Result<EditOutcome, WebssoError>
    where
        F: FnOnce(&mut Vec<String>) -> (EditAction, Option<BlockSpan>),
    {
        self.edit_with_hook(name, mutate, |_| Ok(()))
    }

    fn edit_with_hook<F, H>(
        &self,
        name: &str,
        mutate: F,
        mut before_write: H,
    ) -> Result<EditOutcome, WebssoError>
    where
        F: FnOnce(&mut Vec<String>) -> (EditAction, Option<BlockSpan>),
        H: FnMut(&Path) -> Result<(), WebssoError>,
    {
        validate_entry_name(name)?;
        let _lock = io::acquire_edit_lock(&self.path)?;
        let (text, guard) = io::read_guarded(&self.path)?;
        let mut lines = split_lines(&text);

        let (action, previous_span) = mutate(&mut lines);
        if let Some(span) = previous_span {
            debug!(
                "{name} spans lines {}-{} of '{}'",
                span.start + 1,
                span.end + 1,
                self.path.display()
            );
        }

        let written = action.changes_file();
        if written {
            before_write(&self.path)?;
            io::write_text_atomically(&self.path, &lines.concat(), Some(&guard))?;
        }

        Ok(EditOutcome {
            entry: name.to_string(),
            action,
            previous_span,
            written,
            content_hash: lines_hash(&lines),
        })
    }
}

#[cfg(test)]
mod tests;
