use crate::extraction::{extract_rows, ExtractionError};
use crate::outage_index::OutageIndex;
use crate::schema::{validate, ColumnMap};
use async_trait::async_trait;
use itertools::Itertools;
use tracing::{info, warn};

/// Supplies the raw schedule document for the current cycle.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Published(OutageIndex),
    /// The page did not carry every required column. Holds whatever columns
    /// were discovered so they can be reported.
    InvalidSchema(ColumnMap),
}

pub struct ScheduleReader;

impl ScheduleReader {
    pub fn read(raw_document: &str) -> Result<Schedule, ExtractionError> {
        let validation = validate(raw_document);
        if !validation.is_valid {
            warn!(
                columns = %validation.columns.keys().join(", "),
                "Schedule table does not have the expected columns"
            );
            return Ok(Schedule::InvalidSchema(validation.columns));
        }

        let rows = extract_rows(raw_document, &validation.columns)?;
        let index = OutageIndex::build(&rows);
        info!(
            rows = rows.len(),
            buses = index.bus_count(),
            "Schedule read"
        );
        Ok(Schedule::Published(index))
    }
}
