use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub recipients_file: PathBuf,
    pub snapshot_file: PathBuf,
    pub logs_dir: PathBuf,
    /// Number of archived pages at which the oldest one is removed.
    pub log_threshold: usize,
}
