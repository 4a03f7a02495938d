//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tabstat: column-oriented survey dataset analysis
#[derive(Parser)]
#[command(name = "tabstat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Interface language for labels and test names (en, pt, es)
    #[arg(short, long, global = true, default_value = "en")]
    pub lang: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the columns of a data file with inferred types
    Columns {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also show each column's levels with counts
        #[arg(long)]
        levels: bool,
    },

    /// Cross-tabulate two qualitative columns and test independence
    Crosstab {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column shown as rows (predictor)
        #[arg(short, long)]
        row: String,

        /// Column shown as columns (response)
        #[arg(short, long)]
        col: String,

        /// Percentage base for each cell
        #[arg(long, default_value = "row")]
        percent_by: PercentChoice,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a numeric column across the levels of a qualitative column
    Compare {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Numeric column to summarize
        #[arg(short, long)]
        values: String,

        /// Qualitative grouping column
        #[arg(short, long)]
        group: String,

        /// Descriptive statistics to show per group
        #[arg(short, long, value_delimiter = ',', default_values_t = vec![StatChoice::N, StatChoice::MeanSd])]
        stats: Vec<StatChoice>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PercentChoice {
    Row,
    Col,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatChoice {
    Min,
    Max,
    Range,
    MeanSd,
    MedianIqr,
    Mode,
    N,
}

impl std::fmt::Display for StatChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatChoice::Min => "min",
            StatChoice::Max => "max",
            StatChoice::Range => "range",
            StatChoice::MeanSd => "mean-sd",
            StatChoice::MedianIqr => "median-iqr",
            StatChoice::Mode => "mode",
            StatChoice::N => "n",
        };
        f.write_str(name)
    }
}
