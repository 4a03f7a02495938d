//! Compare command - numeric column summarized by a qualitative group.

use std::path::PathBuf;

use colored::Colorize;
use tabstat::assoc::{AssociationEngine, GroupCompareOptions, StatOption};
use tabstat::format::format_p_value;
use tabstat::Language;

use super::{decoded, find_column, load_dataset};
use crate::cli::StatChoice;

pub fn run(
    file: PathBuf,
    values: String,
    group: String,
    stats: Vec<StatChoice>,
    json: bool,
    lang: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let lang = Language::from_tag(lang);
    let dataset = load_dataset(&file)?;
    let numeric = decoded(find_column(&dataset, &values)?);
    let groups = decoded(find_column(&dataset, &group)?);

    let options = GroupCompareOptions {
        stat_options: stats.iter().map(|s| stat_option(*s)).collect(),
        lang,
        ..Default::default()
    };
    let engine = AssociationEngine::default();
    let result = engine.summarize_n_q(&numeric, &groups, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        values.white().bold(),
        "by".cyan(),
        group.white().bold()
    );
    println!();

    println!("{}", result.columns.join("  ").bold());
    for row in &result.rows {
        let mut cells = vec![row.label.clone()];
        cells.extend(row.cells.iter().cloned());
        println!("{}", cells.join("  "));
    }

    if let Some(test) = &result.test_used {
        println!();
        match result.p_value {
            Some(p) => {
                let formatted = format_p_value(p, 4, 0.0001, lang);
                if p < 0.05 {
                    println!("{}: p = {}", test, formatted.green().bold());
                } else {
                    println!("{}: p = {}", test, formatted);
                }
            }
            None => println!("{}", test),
        }
    }

    if !result.posthoc.is_empty() {
        println!();
        println!("{}", "Pairwise comparisons:".cyan().bold());
        for pair in &result.posthoc {
            println!(
                "  {} vs {}: p = {}",
                pair.group_a,
                pair.group_b,
                format_p_value(pair.p_value, 4, 0.0001, lang)
            );
        }
    }

    Ok(())
}

fn stat_option(choice: StatChoice) -> StatOption {
    match choice {
        StatChoice::Min => StatOption::Min,
        StatChoice::Max => StatOption::Max,
        StatChoice::Range => StatOption::Range,
        StatChoice::MeanSd => StatOption::MeanSd,
        StatChoice::MedianIqr => StatOption::MedianIqr,
        StatChoice::Mode => StatOption::Mode,
        StatChoice::N => StatOption::N,
    }
}
