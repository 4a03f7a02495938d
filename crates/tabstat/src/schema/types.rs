//! Column type tags and the encoded value payload.

use serde::{Deserialize, Serialize};

/// Default separator assumed for list columns when none is stored.
pub const DEFAULT_LIST_SEP: &str = ";";

/// Kind of a dataset variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColType {
    /// Qualitative / categorical.
    #[default]
    #[serde(rename = "q")]
    Qualitative,
    /// Numeric.
    #[serde(rename = "n")]
    Numeric,
    /// Multi-valued list, items joined by the column separator.
    #[serde(rename = "l")]
    List,
}

impl ColType {
    pub fn is_list(&self) -> bool {
        matches!(self, ColType::List)
    }

    /// Separator to use when `stored` is empty: lists fall back to the
    /// default list separator, other types carry no separator.
    pub fn effective_sep<'a>(&self, stored: &'a str) -> &'a str {
        if stored.is_empty() && self.is_list() {
            DEFAULT_LIST_SEP
        } else if self.is_list() {
            stored
        } else {
            ""
        }
    }
}

/// Codes for a compact column: plain 1-indexed references for scalar
/// types, or separator-joined reference lists for list columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Codes {
    Plain(Vec<u32>),
    Joined(Vec<String>),
}

impl Codes {
    pub fn len(&self) -> usize {
        match self {
            Codes::Plain(v) => v.len(),
            Codes::Joined(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encoded value payload of a column: either a compact factor encoding
/// (`labels` + `codes`) or the raw values verbatim.
///
/// Invariants: `labels` holds no duplicates and is ordered by first
/// observed occurrence; code `0` means missing for non-list types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColValues {
    pub col_compact: bool,
    pub labels: Option<Vec<String>>,
    pub codes: Option<Codes>,
    pub raw_values: Option<Vec<Option<String>>>,
}

impl ColValues {
    /// Compact payload from labels and codes.
    pub fn compact(labels: Vec<String>, codes: Codes) -> Self {
        Self {
            col_compact: true,
            labels: Some(labels),
            codes: Some(codes),
            raw_values: None,
        }
    }

    /// Raw payload keeping the values verbatim.
    pub fn raw(values: Vec<Option<String>>) -> Self {
        Self {
            col_compact: false,
            labels: None,
            codes: None,
            raw_values: Some(values),
        }
    }

    /// Number of rows in the payload.
    pub fn len(&self) -> usize {
        if self.col_compact {
            self.codes.as_ref().map_or(0, |c| c.len())
        } else {
            self.raw_values.as_ref().map_or(0, |v| v.len())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_type_serde_tags() {
        assert_eq!(serde_json::to_string(&ColType::Qualitative).unwrap(), "\"q\"");
        assert_eq!(serde_json::to_string(&ColType::List).unwrap(), "\"l\"");
        let t: ColType = serde_json::from_str("\"n\"").unwrap();
        assert_eq!(t, ColType::Numeric);
    }

    #[test]
    fn test_effective_sep() {
        assert_eq!(ColType::List.effective_sep(""), ";");
        assert_eq!(ColType::List.effective_sep(","), ",");
        assert_eq!(ColType::Numeric.effective_sep(";"), "");
    }

    #[test]
    fn test_codes_untagged_serde() {
        let plain: Codes = serde_json::from_str("[1, 0, 2]").unwrap();
        assert_eq!(plain, Codes::Plain(vec![1, 0, 2]));
        let joined: Codes = serde_json::from_str("[\"1;2\", \"\"]").unwrap();
        assert_eq!(joined, Codes::Joined(vec!["1;2".into(), "".into()]));
    }
}
