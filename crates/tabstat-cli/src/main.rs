//! Tabstat CLI - survey dataset analysis from the command line.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Columns { file, levels } => commands::columns::run(file, levels),

        Commands::Crosstab {
            file,
            row,
            col,
            percent_by,
            json,
        } => commands::crosstab::run(file, row, col, percent_by, json, &cli.lang),

        Commands::Compare {
            file,
            values,
            group,
            stats,
            json,
        } => commands::compare::run(file, values, group, stats, json, &cli.lang),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
