//! Declarative configuration for the variant pipeline.
//!
//! Every stage has its own fully-enumerated struct; a stage runs only
//! when its field is present on [`VariantConfig`].

use serde::{Deserialize, Serialize};

use crate::locale::Language;
use crate::schema::ColType;

/// One search-and-replace rule over discrete levels.
///
/// An empty `replace` clears the matched value (or drops the matched
/// list item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub search: String,
    pub replace: String,
}

impl ReplaceRule {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }
}

/// Map several source levels onto one target label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRule {
    /// Target label the levels collapse into.
    pub label: String,
    /// Source levels to merge.
    pub levels: Vec<String>,
}

/// Numeric transformation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformFn {
    Log,
    Log10,
    Log2,
    Sqrt,
    Square,
}

impl TransformFn {
    /// Wire name of the function ("log", "sqrt", ...).
    pub fn name(&self) -> &'static str {
        match self {
            TransformFn::Log => "log",
            TransformFn::Log10 => "log10",
            TransformFn::Log2 => "log2",
            TransformFn::Sqrt => "sqrt",
            TransformFn::Square => "square",
        }
    }
}

/// Configuration for the numeric transform stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(rename = "fn")]
    pub func: TransformFn,
    /// Base for [`TransformFn::Log`]; defaults to e. Must be > 0 and != 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
}

/// Configuration for the cut (binning) stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutConfig {
    /// Explicit break points; deduplicated and sorted before use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaks: Vec<f64>,
    /// Equal-interval width used when no explicit breaks are given. Must be > 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Starting point for width-based breaks; defaults to the observed minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<f64>,
    /// Closed-right intervals `(lower, upper]` when true (the default).
    #[serde(default = "default_true")]
    pub right: bool,
    /// Make the boundary interval's outer bound inclusive (default true).
    #[serde(default = "default_true")]
    pub include_lowest: bool,
    /// Explicit interval labels; auto-formatted bound text otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            breaks: Vec::new(),
            width: None,
            origin: None,
            right: true,
            include_lowest: true,
            labels: Vec::new(),
        }
    }
}

/// Full pipeline configuration for one `create_variant` call.
///
/// Stage order is fixed regardless of field order: fill, search/replace,
/// merge, subset, numeric coercion, transform, cut, sort-by-frequency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Derive from this variant of the base column instead of the column itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_var_index: Option<usize>,
    /// Kind tag recorded in the provenance metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Label for the resulting variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_label: Option<String>,
    /// Replace empty/whitespace-only entries with this literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_empty: Option<String>,
    /// Search-and-replace rules over discrete levels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<ReplaceRule>,
    /// Merge groups of levels into single labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<MergeRule>,
    /// Keep only these values/items; everything else becomes empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subset_levels: Vec<String>,
    /// Coerce values to numeric text (the column becomes numeric).
    #[serde(default)]
    pub force_numeric: bool,
    /// Numeric transformation to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformConfig>,
    /// Bin numeric values into labelled intervals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut: Option<CutConfig>,
    /// Force the final column type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_type: Option<ColType>,
    /// Force the final column separator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_sep: Option<String>,
    /// Reorder labels by descending observed frequency.
    #[serde(default)]
    pub sort_by_frequency: bool,
    /// Free-form note stored on the variant metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Language used to render warnings.
    #[serde(default)]
    pub lang: Language,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_fn_serde() {
        let t: TransformFn = serde_json::from_str("\"log10\"").unwrap();
        assert_eq!(t, TransformFn::Log10);
        assert_eq!(t.name(), "log10");
    }

    #[test]
    fn test_cut_defaults() {
        let cut = CutConfig::default();
        assert!(cut.right);
        assert!(cut.include_lowest);
        assert!(cut.breaks.is_empty());
    }

    #[test]
    fn test_cut_json_omitted_flags_use_defaults() {
        let config: VariantConfig =
            serde_json::from_str(r#"{"cut": {"width": 5.0, "origin": 0.0}}"#).unwrap();
        let cut = config.cut.unwrap();
        assert!(cut.right);
        assert!(cut.include_lowest);
        assert_eq!(cut.width, Some(5.0));

        let config: VariantConfig =
            serde_json::from_str(r#"{"cut": {"breaks": [0.0, 10.0], "right": false}}"#).unwrap();
        let cut = config.cut.unwrap();
        assert!(!cut.right);
        assert!(cut.include_lowest);
    }

    #[test]
    fn test_config_json_shape() {
        let json = r#"{
            "source_var_index": 0,
            "kind": "numeric",
            "force_numeric": true,
            "transform": {"fn": "sqrt"}
        }"#;
        let config: VariantConfig = serde_json::from_str(json).unwrap();
        assert!(config.force_numeric);
        assert_eq!(config.transform.unwrap().func, TransformFn::Sqrt);
    }
}
