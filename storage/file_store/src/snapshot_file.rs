use anyhow::Context;
use notifications::snapshot::{NotificationSnapshot, SnapshotStore};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// The previous cycle's snapshot as a JSON object of phone number to messages.
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn load(&self) -> anyhow::Result<NotificationSnapshot> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No previous snapshot, starting from scratch");
            return Ok(NotificationSnapshot::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(NotificationSnapshot::new());
        }

        let snapshot = serde_json::from_str::<NotificationSnapshot>(&contents)
            .with_context(|| format!("{} is not a valid snapshot", self.path.display()))?;
        debug!(recipients = snapshot.len(), "Loaded previous snapshot");
        Ok(snapshot)
    }

    /// Replaces the file in one step: the snapshot is written to a sibling
    /// temporary file which is then renamed over the previous one.
    fn save(&self, snapshot: &NotificationSnapshot) -> anyhow::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let contents =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize the snapshot")?;
        stage(parent, &contents)?
            .persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!(recipients = snapshot.len(), path = %self.path.display(), "Saved snapshot");
        Ok(())
    }
}

/// Writes `contents` to a temporary file in `dir`. The file is removed when
/// dropped unless persisted.
fn stage(dir: &Path, contents: &str) -> anyhow::Result<NamedTempFile> {
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to stage a snapshot in {}", dir.display()))?;
    staged
        .write_all(contents.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write a staged snapshot in {}", dir.display()))?;
    Ok(staged)
}
