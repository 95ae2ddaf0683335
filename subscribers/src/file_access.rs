use crate::contracts::load_recipients::RecipientStore;
use crate::recipient::Recipient;
use anyhow::Context;
use itertools::Itertools;
use std::path::PathBuf;
use tracing::{debug, info};

/// Pipe delimited recipient list. The first line is a header.
pub struct RecipientsFile {
    path: PathBuf,
}

impl RecipientsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecipientStore for RecipientsFile {
    fn load(&self) -> anyhow::Result<Vec<Recipient>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No recipients file, nobody to notify");
            return Ok(vec![]);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut recipients = vec![];
        for record in reader.records() {
            let record = record
                .with_context(|| format!("Failed to read a record from {}", self.path.display()))?;
            let fields = record.iter().collect_vec();
            match Recipient::from_fields(&fields) {
                Some(recipient) => recipients.push(recipient),
                None => debug!(?fields, "Skipping incomplete recipient record"),
            }
        }
        Ok(recipients)
    }
}
