//! CLI command implementations.

pub mod columns;
pub mod compare;
pub mod crosstab;

use std::path::Path;

use tabstat::factor::decode_to_strings;
use tabstat::{Column, Dataset, Parser};

/// Parse a data file, with a friendly error on failure.
pub fn load_dataset(file: &Path) -> Result<Dataset, Box<dyn std::error::Error>> {
    Ok(Parser::new().parse_file(file)?)
}

/// Look up a column by name, listing the available names on a miss.
pub fn find_column<'a>(
    dataset: &'a Dataset,
    name: &str,
) -> Result<&'a Column, Box<dyn std::error::Error>> {
    dataset.column_by_name(name).ok_or_else(|| {
        let available: Vec<&str> = dataset
            .columns
            .iter()
            .filter_map(|c| c.col_name.as_deref())
            .collect();
        format!(
            "Column not found: {}\nAvailable columns: {}",
            name,
            available.join(", ")
        )
        .into()
    })
}

/// Decode a column back to its row-wise string values.
pub fn decoded(column: &Column) -> Vec<String> {
    decode_to_strings(&column.col_values, column.col_type, column.effective_sep())
}
