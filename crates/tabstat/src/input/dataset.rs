//! Imported dataset: encoded columns plus import history.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::factor::{ColumnOptions, make_column};
use crate::schema::Column;

/// Trailing whitespace and punctuation, trimmed from display labels.
static TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\p{P}]+$").expect("valid regex"));

/// A set of imported columns plus the history of files they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub history: Vec<ImportRecord>,
}

/// One import event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub file: String,
    pub rows: usize,
    pub imported_at: DateTime<Utc>,
}

impl Dataset {
    /// Build a dataset from header names and row-wise string data.
    ///
    /// Each column gets inferred type and encoding, a display label with
    /// trailing punctuation trimmed, and a stable name hash.
    pub fn from_rows(headers: &[String], rows: Vec<Vec<String>>, file: &str) -> Self {
        let row_count = rows.len();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let values: Vec<String> = rows
                    .iter()
                    .map(|row| row.get(index).cloned().unwrap_or_default())
                    .collect();
                make_column(
                    &values,
                    ColumnOptions {
                        col_name: Some(name.clone()),
                        col_label: Some(trim_label(name)),
                        col_hash: Some(hash_name(name)),
                        col_index: Some(index + 1),
                        include_base_variant: false,
                        ..Default::default()
                    },
                )
            })
            .collect();
        Self {
            columns,
            history: vec![ImportRecord {
                file: file.to_string(),
                rows: row_count,
                imported_at: Utc::now(),
            }],
        }
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.col_name.as_deref() == Some(name))
    }

    pub fn column_by_hash(&self, hash: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.col_hash.as_deref() == Some(hash))
    }

    /// Columns not marked as soft-deleted.
    pub fn active_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.col_del)
    }
}

/// Display label: trailing whitespace and punctuation removed.
pub fn trim_label(name: &str) -> String {
    TRAILING_PUNCT.replace(name, "").trim().to_string()
}

/// Hex SHA-256 of a column name, used as a stable identifier.
pub fn hash_name(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}
