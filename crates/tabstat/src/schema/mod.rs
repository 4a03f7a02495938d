//! Persisted column data model: types, encoded payloads, variants.

mod column;
mod types;

pub use column::{Column, Variant, VariantAction, VariantMeta};
pub use types::{Codes, ColType, ColValues, DEFAULT_LIST_SEP};
