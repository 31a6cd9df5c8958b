use std::io;
use std::path::{Path, PathBuf};

use super::io::{AtomicWritePhase, TEMP_FILE_MARKER};


const SETTINGS_FIXTURE: &str = "import os\n\nfrom django.utils.translation import gettext_lazy as _\n\nDEBUG = False\n\nWEBSSO_CHOICES = (\n    (\"credentials\", _(\"Keystone Credentials\")),\n    (\"old\", \"old.example.org\")\n)\n\nTIME_ZONE = \"UTC\"\n";

fn fail_on_phase(target_phase: AtomicWritePhase) -> impl FnMut(AtomicWritePhase) -> io::Result<()> {
    move |phase| {
        if phase == target_phase {
            Err(io::Error::other("injected atomic-write failure"))
        } else {
            Ok(())
        }
    }
}

fn create_settings_target(directory: &Path, contents: &str) -> PathBuf {
    let file_path = directory.join("local_settings.py");
    std::fs::write(&file_path, contents).expect("fixture write should succeed");
    file_path
}

fn temp_entries(directory: &Path) -> Vec<String> {
    std::fs::read_dir(directory)
        .expect("directory should be readable")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.contains(TEMP_FILE_MARKER))
        .collect()
}
