//! Tabstat: column-oriented analysis engine for survey datasets.
//!
//! Tabstat keeps every variable as a compact encoded factor (distinct
//! labels plus integer codes), derives alternative representations of a
//! variable through a provenance-tracked transformation pipeline, and
//! tests associations between variables with automatic test selection.
//!
//! # Core Principles
//!
//! - **Non-destructive**: a column's encoded values are never modified;
//!   every reshaping lands in a new variant with its provenance recorded
//! - **Order-preserving**: factor labels keep first-appearance order, so
//!   decode always reproduces the original strings
//! - **Graceful degradation**: statistical backends are injected; when
//!   one is missing or fails, results mark the test unavailable instead
//!   of erroring
//!
//! # Example
//!
//! ```no_run
//! use tabstat::input::Parser;
//! use tabstat::factor::decode_to_strings;
//! use tabstat::assoc::AssociationEngine;
//!
//! let dataset = Parser::new().parse_file("survey.csv").unwrap();
//! let decode = |name: &str| {
//!     let col = dataset.column_by_name(name).unwrap();
//!     decode_to_strings(&col.col_values, col.col_type, col.effective_sep())
//! };
//! let sex = decode("sex");
//! let outcome = decode("outcome");
//!
//! let engine = AssociationEngine::default();
//! let table = engine.summarize_q_q(&sex, &outcome, &Default::default(), None);
//! println!("{} p = {:?}", table.test_used, table.p_value);
//! ```

pub mod assoc;
pub mod error;
pub mod factor;
pub mod format;
pub mod input;
pub mod locale;
pub mod schema;
pub mod variant;

pub use assoc::{AssociationEngine, StatsProvider, StatrsProvider};
pub use error::{Result, TabstatError};
pub use factor::{make_column, ColumnOptions};
pub use input::{Dataset, Parser};
pub use locale::{Language, Messages, Translator};
pub use schema::{Column, ColType, ColValues, Variant};
pub use variant::{VariantConfig, VariantPipeline};
