//! Data import: delimited-file parsing into encoded datasets.

mod dataset;
mod parser;

pub use dataset::{Dataset, ImportRecord, hash_name, trim_label};
pub use parser::{Parser, ParserConfig};
