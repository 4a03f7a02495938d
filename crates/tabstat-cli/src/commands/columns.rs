//! Columns command - list columns with types and level counts.

use std::path::PathBuf;

use colored::Colorize;
use tabstat::factor::{individual_items_with_count, ItemCountOptions};
use tabstat::schema::ColType;

use super::load_dataset;

pub fn run(file: PathBuf, levels: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(&file)?;

    println!(
        "{} {} ({} columns, {} rows)",
        "Columns in".cyan().bold(),
        file.display().to_string().white(),
        dataset.columns.len(),
        dataset.history.first().map(|h| h.rows).unwrap_or(0)
    );
    println!();

    for column in dataset.active_columns() {
        let type_tag = match column.col_type {
            ColType::Qualitative => "qual".yellow(),
            ColType::Numeric => "num".green(),
            ColType::List => "list".blue(),
        };
        println!(
            "{:>4}  {:<6} {}",
            column.col_index.unwrap_or(0),
            type_tag,
            column
                .col_label
                .as_deref()
                .or(column.col_name.as_deref())
                .unwrap_or("?")
                .white()
                .bold()
        );

        if levels {
            let counts = individual_items_with_count(column, &ItemCountOptions::default());
            for item in counts.iter().take(15) {
                println!("        {:<24} {}", item.value, item.count);
            }
            if counts.len() > 15 {
                println!("        ... {} more levels", counts.len() - 15);
            }
        }
    }
    Ok(())
}
