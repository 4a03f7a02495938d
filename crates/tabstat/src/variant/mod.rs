//! Variant pipeline: derive new encoded representations of a column
//! through a fixed-order transformation pipeline with full provenance.

mod config;
mod pipeline;
mod warnings;

pub use config::{
    CutConfig, MergeRule, ReplaceRule, TransformConfig, TransformFn, VariantConfig,
};
pub use pipeline::VariantPipeline;
pub use warnings::{MAX_WARNING_EXAMPLES, WarningCollector};
