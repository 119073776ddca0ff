// inventory/mod.rs
//
// Locates and reads object documents under `<inventoryPath>/<kind>/`.
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryFile {
    /// File stem, the name operators address the object by.
    pub name: String,
    pub path: PathBuf,
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Finds every `*.yaml` below `dir` (recursively) whose stem equals
/// `filespec` or matches it as a shell glob. Results are sorted by path.
/// Only the file-spec is a pattern; `dir` is matched literally.
pub fn get_files(dir: &Path, filespec: &str) -> Result<Vec<InventoryFile>> {
    let pattern = format!("{}/**/*.yaml", Pattern::escape(&dir.to_string_lossy()));
    let spec = Pattern::new(filespec).ok();

    let entries = glob::glob(&pattern)
        .map_err(|e| Error::Inventory(format!("glob pattern {pattern}: {e}")))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "skipping unreadable inventory entry");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let matched = name == filespec || spec.as_ref().is_some_and(|p| p.matches(&name));
        if matched {
            files.push(InventoryFile { name, path });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(dir = %dir.display(), filespec, count = files.len(), "inventory lookup");
    Ok(files)
}

pub fn read_file(path: &Path) -> Result<String> {
    let expanded = expand_home(&path.to_string_lossy());
    fs::read_to_string(&expanded)
        .map_err(|e| Error::Inventory(format!("error reading file {}: {e}", expanded.display())))
}
