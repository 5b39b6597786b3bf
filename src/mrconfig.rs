use crate::clone::task::CloneTask;
use crate::error::Result;
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = ".mrconfig";

/// One repository block of a myrepos config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigEntry {
    pub directory: String,
    pub url: String,
}

pub fn entries(tasks: &[CloneTask]) -> Vec<ConfigEntry> {
    tasks
        .iter()
        .map(|t| ConfigEntry {
            directory: t.local_directory.clone(),
            url: t.source_url.clone(),
        })
        .collect()
}

pub fn render(entries: &[ConfigEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "[{dir}]\ncheckout = git clone {url} {dir}\n",
                dir = e.directory,
                url = e.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `<base_dir>/.mrconfig`. Returns the path written (or that would be).
pub fn write(base_dir: &Path, entries: &[ConfigEntry], dry_run: bool) -> Result<Option<PathBuf>> {
    if entries.is_empty() {
        tracing::debug!("no repositories, skipping {FILE_NAME}");
        return Ok(None);
    }

    let path = base_dir.join(FILE_NAME);
    if dry_run {
        println!("would write {}", path.display());
        return Ok(Some(path));
    }

    std::fs::create_dir_all(base_dir)?;
    std::fs::write(&path, render(entries))?;
    tracing::info!(path = %path.display(), entries = entries.len(), "wrote mrconfig");
    Ok(Some(path))
}
