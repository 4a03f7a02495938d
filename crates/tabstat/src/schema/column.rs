//! Column and variant records.

use serde::{Deserialize, Serialize};

use crate::locale::Language;

use super::types::{ColType, ColValues};

/// One dataset variable: its encoded values plus derived variants.
///
/// `col_vars` keeps insertion order; index 0 conventionally holds the
/// unmodified "original" snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub col_type: ColType,
    #[serde(default)]
    pub col_sep: String,
    pub col_values: ColValues,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub col_vars: Vec<Variant>,

    /// Source column name (set by the dataset importer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_name: Option<String>,
    /// Display label (name with trailing punctuation trimmed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_label: Option<String>,
    /// Stable content-independent hash of the column name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_hash: Option<String>,
    /// One-based position in the imported file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_index: Option<usize>,
    /// Soft-delete marker.
    #[serde(default)]
    pub col_del: bool,
}

impl Column {
    /// Separator in effect for this column (list default applied).
    pub fn effective_sep(&self) -> &str {
        self.col_type.effective_sep(&self.col_sep)
    }

    /// Look up a variant by index.
    pub fn variant(&self, index: usize) -> Option<&Variant> {
        self.col_vars.get(index)
    }
}

/// A named, provenance-tracked alternative encoding of a column.
///
/// A variant is a fully independent encoded column sharing the decode
/// contract of [`Column`]; its `col_values` are never aliased to another
/// variant's values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub var_label: String,
    pub col_type: ColType,
    #[serde(default)]
    pub col_sep: String,
    pub col_values: ColValues,
    pub meta: VariantMeta,
}

impl Variant {
    pub fn effective_sep(&self) -> &str {
        self.col_type.effective_sep(&self.col_sep)
    }
}

/// Provenance record for one variant. Append-only during a single
/// pipeline run; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantMeta {
    /// Free-form kind tag ("original", "numeric", "custom", ...).
    pub kind: String,
    /// Index of the source variant, or `None` when derived from the base column.
    pub source_var_index: Option<usize>,
    /// Column type of the source at derivation time.
    pub source_type: ColType,
    /// Transformation stages that actually ran, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<VariantAction>,
    /// Bounded human-readable data-quality warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Language the warnings were rendered in.
    #[serde(default)]
    pub lang: Language,
    /// Interval bounds produced by a cut stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breaks: Option<Vec<(f64, f64)>>,
    /// Interval labels produced by a cut stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Caller-supplied note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl VariantMeta {
    /// Fresh metadata for the "original" snapshot variant.
    pub fn original() -> Self {
        Self {
            kind: "original".to_string(),
            source_var_index: None,
            source_type: ColType::default(),
            actions: Vec::new(),
            warnings: Vec::new(),
            lang: Language::default(),
            breaks: None,
            labels: None,
            note: None,
        }
    }
}

/// One executed pipeline stage, recorded for provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariantAction {
    FillMissing { value: String },
    SearchReplace { count: usize },
    MergeLevels { groups: usize },
    SubsetLevels { count: usize },
    CoerceNumeric,
    Transform {
        #[serde(rename = "fn")]
        func: String,
    },
    Cut { breaks: Vec<(f64, f64)> },
    SortByFrequency,
}
