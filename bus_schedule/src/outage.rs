use crate::extraction::ExtractionError;
use crate::schema::{column, ColumnMap};
use shared_kernel::string_key;

string_key!(BusNumber);

/// One row of the published outage table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageRow {
    pub bus: BusNumber,
    pub school: String,
    /// Empty when no substitute bus has been assigned.
    pub sub_bus: String,
    pub schedule: String,
    pub impact: String,
}

impl OutageRow {
    pub fn try_from_cells(
        row: usize,
        cells: &[String],
        columns: &ColumnMap,
    ) -> Result<Self, ExtractionError> {
        let cell = |column: &'static str| -> Result<String, ExtractionError> {
            let index = columns
                .index_of(column)
                .ok_or(ExtractionError::MissingColumn(column))?;
            cells
                .get(index)
                .cloned()
                .ok_or(ExtractionError::ShortRow {
                    row,
                    cells: cells.len(),
                    column,
                    index,
                })
        };

        Ok(OutageRow {
            bus: BusNumber::from(cell(column::BUS)?),
            school: cell(column::SCHOOLS)?,
            sub_bus: cell(column::SUB_BUS)?,
            schedule: cell(column::SCHEDULES)?,
            impact: cell(column::IMPACT)?,
        })
    }
}
