use anyhow::Context;
use bus_schedule::contracts::archive_schedule::ScheduleArchive;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

const LOG_EXTENSION: &str = "html";

/// Raw schedule pages written to `{dir}/{DD-MM-YYYY-HH-MM-SS}-logs.html`.
/// Once `threshold` pages exist the oldest one is removed.
pub struct ScheduleLogs {
    dir: PathBuf,
    threshold: usize,
}

impl ScheduleLogs {
    pub fn new(dir: impl Into<PathBuf>, threshold: usize) -> Self {
        Self {
            dir: dir.into(),
            threshold,
        }
    }

    fn logs(&self) -> anyhow::Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?;

        let mut logs = vec![];
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list {}", self.dir.display()))?
                .path();
            let is_log = path
                .extension()
                .map_or(false, |extension| extension == LOG_EXTENSION);
            if is_log && path.is_file() {
                logs.push(path);
            }
        }
        Ok(logs)
    }

    fn rotate(&self) -> anyhow::Result<()> {
        let logs = self.logs()?;
        if logs.len() < self.threshold {
            return Ok(());
        }

        let oldest = logs
            .into_iter()
            .map(|path| (age_of(&path), path))
            .min();
        if let Some((_, path)) = oldest {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            info!(path = %path.display(), "Removed oldest schedule log");
        }
        Ok(())
    }
}

/// Creation time where the platform records it, modification time otherwise.
fn age_of(path: &Path) -> Option<SystemTime> {
    let metadata = fs::metadata(path).ok()?;
    metadata.created().or_else(|_| metadata.modified()).ok()
}

impl ScheduleArchive for ScheduleLogs {
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()), level = "debug")]
    fn archive(&self, raw_document: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let file_name = format!("{}-logs.{LOG_EXTENSION}", Local::now().format("%d-%m-%Y-%H-%M-%S"));
        let path = self.dir.join(file_name);
        let contents = raw_document.trim().replace('\r', "");
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Archived schedule page");

        if let Err(err) = self.rotate() {
            warn!(error = ?err, "Failed to rotate schedule logs");
        }
        Ok(())
    }
}
