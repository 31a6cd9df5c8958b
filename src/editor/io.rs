use std::fs::{self, File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use log::debug;

use crate::error::WebssoError;
use crate::hash::content_hash;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) const TEMP_FILE_MARKER: &str = ".websso-tmp-";

/// Advisory exclusive lock held for the duration of one edit.
#[derive(Debug)]
pub(crate) struct EditLock {
    _file: File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtomicWritePhase {
    TempWritten,
    TempSynced,
    Renamed,
}

/// What the file looked like when it was read, re-checked right before the
/// rename so a concurrent writer is detected instead of silently overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GuardState {
    pub(crate) path_fingerprint: PathFingerprint,
    pub(crate) content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathFingerprint {
    #[cfg(unix)]
    device: u64,
    #[cfg(unix)]
    inode: u64,
    length: u64,
    modified_nanos: Option<u128>,
}

pub(crate) fn acquire_edit_lock(path: &Path) -> Result<EditLock, WebssoError> {
    let file = OpenOptions::new()
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .map_err(|error| WebssoError::io(path, error))?;

    file.try_lock_exclusive().map_err(|error| {
        if error.kind() == std::io::ErrorKind::WouldBlock {
            WebssoError::ResourceBusy {
                path: path.display().to_string(),
            }
        } else {
            WebssoError::io(path, error)
        }
    })?;

    Ok(EditLock { _file: file })
}

pub(crate) fn capture_path_fingerprint(path: &Path) -> Result<PathFingerprint, WebssoError> {
    let metadata = fs::symlink_metadata(path).map_err(|error| WebssoError::io(path, error))?;

    if metadata.file_type().is_symlink() {
        return Err(WebssoError::InvalidRequest {
            message: format!(
                "Refusing to rewrite '{}' through a symbolic link; pass the real path",
                path.display()
            ),
        });
    }

    let modified_nanos = metadata
        .modified()
        .ok()
        .and_then(|timestamp| timestamp.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_nanos());

    Ok(PathFingerprint {
        #[cfg(unix)]
        device: metadata.dev(),
        #[cfg(unix)]
        inode: metadata.ino(),
        length: metadata.len(),
        modified_nanos,
    })
}

/// Reads the whole file as UTF-8 text together with the guard needed to
/// rewrite it safely.
pub(crate) fn read_guarded(path: &Path) -> Result<(String, GuardState), WebssoError> {
    let path_fingerprint = capture_path_fingerprint(path)?;
    let bytes = fs::read(path).map_err(|error| WebssoError::io(path, error))?;
    let guard = GuardState {
        path_fingerprint,
        content_hash: content_hash(&bytes),
    };
    let text = String::from_utf8(bytes).map_err(|error| {
        WebssoError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, error),
        )
    })?;

    Ok((text, guard))
}

pub(crate) fn verify_guard_state(path: &Path, expected: &GuardState) -> Result<(), WebssoError> {
    let current_fingerprint = capture_path_fingerprint(path)?;
    if current_fingerprint != expected.path_fingerprint {
        return Err(WebssoError::PathChanged {
            path: path.display().to_string(),
        });
    }

    let current_bytes = fs::read(path).map_err(|error| WebssoError::io(path, error))?;
    let current_hash = content_hash(&current_bytes);
    if current_hash != expected.content_hash {
        return Err(WebssoError::PreconditionFailed {
            expected_hash: expected.content_hash.clone(),
            actual_hash: current_hash,
        });
    }

    Ok(())
}

pub(crate) fn write_text_atomically(
    path: &Path,
    contents: &str,
    expected_guard: Option<&GuardState>,
) -> Result<(), WebssoError> {
    write_text_atomically_with_hook_and_rename(
        path,
        contents,
        expected_guard,
        |_| Ok(()),
        |from, to| fs::rename(from, to),
    )
}

#[cfg(test)]
pub(crate) fn write_text_atomically_with_hook<F>(
    path: &Path,
    contents: &str,
    phase_hook: F,
) -> Result<(), WebssoError>
where
    F: FnMut(AtomicWritePhase) -> std::io::Result<()>,
{
    write_text_atomically_with_hook_and_rename(path, contents, None, phase_hook, |from, to| {
        fs::rename(from, to)
    })
}

pub(crate) fn write_text_atomically_with_hook_and_rename<F, R>(
    path: &Path,
    contents: &str,
    expected_guard: Option<&GuardState>,
    mut phase_hook: F,
    mut rename_file: R,
) -> Result<(), WebssoError>
where
    F: FnMut(AtomicWritePhase) -> std::io::Result<()>,
    R: FnMut(&Path, &Path) -> std::io::Result<()>,
{
    let target_permissions = fs::metadata(path)
        .map_err(|error| WebssoError::io(path, error))?
        .permissions();
    let (temp_path, mut temp_file) = create_temp_file_adjacent(path)?;
    debug!(
        "writing {} bytes to '{}' via '{}'",
        contents.len(),
        path.display(),
        temp_path.display()
    );

    let result = (|| {
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|error| WebssoError::io(&temp_path, error))?;
        phase_hook(AtomicWritePhase::TempWritten).map_err(|error| WebssoError::io(path, error))?;

        temp_file
            .sync_all()
            .map_err(|error| WebssoError::io(&temp_path, error))?;
        phase_hook(AtomicWritePhase::TempSynced).map_err(|error| WebssoError::io(path, error))?;

        if let Some(guard_state) = expected_guard {
            verify_guard_state(path, guard_state)?;
        }

        fs::set_permissions(&temp_path, target_permissions.clone())
            .map_err(|error| WebssoError::io(&temp_path, error))?;
        drop(temp_file);

        rename_file(&temp_path, path).map_err(|error| WebssoError::io(path, error))?;
        phase_hook(AtomicWritePhase::Renamed).map_err(|error| WebssoError::io(path, error))?;

        sync_parent_directory(path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn create_temp_file_adjacent(path: &Path) -> Result<(PathBuf, File), WebssoError> {
    let parent = resolve_parent_directory(path);
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("local_settings.py");

    for _ in 0..64 {
        let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let temp_name = format!(".{file_name}{TEMP_FILE_MARKER}{nanos}-{counter}");
        let temp_path = parent.join(temp_name);

        match OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((temp_path, file)),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(error) => return Err(WebssoError::io(&temp_path, error)),
        }
    }

    Err(WebssoError::InvalidRequest {
        message: format!(
            "Failed to allocate an adjacent temporary file for '{}'",
            path.display()
        ),
    })
}

fn resolve_parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn sync_parent_directory(path: &Path) -> Result<(), WebssoError> {
    #[cfg(unix)]
    {
        let parent = resolve_parent_directory(path);
        let directory_handle =
            File::open(&parent).map_err(|error| WebssoError::io(&parent, error))?;
        directory_handle
            .sync_all()
            .map_err(|error| WebssoError::io(&parent, error))
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
