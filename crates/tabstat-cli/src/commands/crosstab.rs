//! Crosstab command - cross-tabulate two columns and test independence.

use std::path::PathBuf;

use colored::Colorize;
use tabstat::assoc::{AssociationEngine, CrosstabOptions, PercentBy};
use tabstat::format::format_p_value;
use tabstat::Language;

use super::{decoded, find_column, load_dataset};
use crate::cli::PercentChoice;

pub fn run(
    file: PathBuf,
    row: String,
    col: String,
    percent_by: PercentChoice,
    json: bool,
    lang: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let lang = Language::from_tag(lang);
    let dataset = load_dataset(&file)?;
    let predictor = decoded(find_column(&dataset, &row)?);
    let response = decoded(find_column(&dataset, &col)?);

    let options = CrosstabOptions {
        percent_by: match percent_by {
            PercentChoice::Row => PercentBy::Row,
            PercentChoice::Col => PercentBy::Col,
        },
        lang,
        ..Default::default()
    };
    let engine = AssociationEngine::default();
    let table = engine.summarize_q_q(&predictor, &response, &options, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!(
        "{} {} {} {}",
        row.white().bold(),
        "×".cyan(),
        col.white().bold(),
        format!("({})", table.test_used).cyan()
    );
    println!();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .filter_map(|r| {
                    // Column 0 is the group label.
                    if i == 0 {
                        Some(r.group.len())
                    } else {
                        r.cells.get(i - 1).map(|c| c.len())
                    }
                })
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<width$}", name, width = *w))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in &table.rows {
        let mut cells = vec![format!("{:<width$}", row.group, width = widths[0])];
        for (i, cell) in row.cells.iter().enumerate() {
            cells.push(format!("{:<width$}", cell, width = widths[i + 1]));
        }
        println!("{}", cells.join("  "));
    }

    if let Some(p) = table.p_value {
        println!();
        let formatted = format_p_value(p, 4, 0.0001, lang);
        if p < 0.05 {
            println!("p = {}", formatted.green().bold());
        } else {
            println!("p = {}", formatted);
        }
    }
    Ok(())
}
