use crate::outage::OutageRow;
use crate::schema::ColumnMap;
use serde_json::Value;
use thiserror::Error as ThisError;

const DATA_ARRAY_MARKER: &str = "var dataArray";

#[derive(ThisError, Debug)]
pub enum ExtractionError {
    #[error("the schedule page has no `var dataArray` assignment")]
    MissingDataArray,
    #[error("the schedule data array could not be parsed: {0}")]
    MalformedDataArray(#[from] serde_json::Error),
    #[error("column `{0}` is missing from the column map")]
    MissingColumn(&'static str),
    #[error("row {row} has {cells} cells but column `{column}` is at index {index}")]
    ShortRow {
        row: usize,
        cells: usize,
        column: &'static str,
        index: usize,
    },
}

/// Pulls the `var dataArray = [[...], ...];` literal out of the schedule page
/// and converts every row into an [`OutageRow`] through `columns`.
pub fn extract_rows(
    raw_document: &str,
    columns: &ColumnMap,
) -> Result<Vec<OutageRow>, ExtractionError> {
    let literal = raw_document
        .lines()
        .find_map(|line| {
            line.split_once(DATA_ARRAY_MARKER)
                .and_then(|(_, assignment)| assignment.split_once('='))
                .map(|(_, literal)| literal)
        })
        .ok_or(ExtractionError::MissingDataArray)?;

    // The page writes the array as a javascript literal with single quotes.
    let literal = literal.trim().trim_end_matches(';').trim().replace('\'', "\"");
    let rows = serde_json::from_str::<Vec<Vec<Value>>>(&literal)?;

    rows.into_iter()
        .enumerate()
        .map(|(row, cells)| {
            let cells = cells.into_iter().map(cell_text).collect::<Vec<_>>();
            OutageRow::try_from_cells(row, &cells, columns)
        })
        .collect()
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
