use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

pub mod column {
    pub const BUS: &str = "bus";
    pub const SUB_BUS: &str = "sub bus";
    pub const SCHOOLS: &str = "schools";
    pub const SCHEDULES: &str = "schedules";
    pub const IMPACT: &str = "impact";
}

pub const REQUIRED_COLUMNS: [&str; 5] = [
    column::BUS,
    column::SUB_BUS,
    column::SCHOOLS,
    column::SCHEDULES,
    column::IMPACT,
];

/// Lower-cased column title to its position in a data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    titles: Vec<String>,
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    /// The first occurrence of a repeated title wins.
    pub fn from_titles(titles: impl IntoIterator<Item = String>) -> Self {
        let mut map = ColumnMap::default();
        for (index, title) in titles.into_iter().enumerate() {
            if map.indices.contains_key(&title) {
                continue;
            }
            map.indices.insert(title.clone(), index);
            map.titles.push(title);
        }
        map
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.indices.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.indices.contains_key(column)
    }

    /// Known titles in column order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidation {
    pub columns: ColumnMap,
    pub is_valid: bool,
}

#[derive(Deserialize)]
struct ColumnDefinition {
    title: String,
}

/// Reads the `columns: [...]` blocks embedded in the schedule page and checks
/// that every column the notifier reads is present. A missing or malformed
/// block is reported as an invalid schema rather than an error.
pub fn validate(raw_document: &str) -> SchemaValidation {
    lazy_static! {
        static ref COLUMNS_REGEX: Regex =
            Regex::new(r"columns: \[(.*?)\]").expect("COLUMNS_REGEX to compile");
    }

    let flattened = raw_document.replace(|c| matches!(c, '\n' | '\r' | '\t'), "");
    let definitions = COLUMNS_REGEX
        .captures_iter(&flattened)
        .filter_map(|captures| captures.get(1))
        .map(|definition| definition.as_str())
        .join(", ");
    let definitions = format!("[{definitions}]").to_lowercase();

    let columns = match serde_json::from_str::<Vec<ColumnDefinition>>(&definitions) {
        Ok(definitions) => ColumnMap::from_titles(
            definitions
                .into_iter()
                .map(|definition| definition.title.trim().to_owned()),
        ),
        Err(err) => {
            warn!(error = %err, "Column definitions could not be parsed");
            ColumnMap::default()
        }
    };

    let is_valid = REQUIRED_COLUMNS
        .iter()
        .all(|required| columns.contains(required));

    SchemaValidation { columns, is_valid }
}
