//! Level enumeration and frequency counting over columns and variants.

use indexmap::IndexMap;

use crate::locale::{Language, MessageKey, Messages, Translator};
use crate::schema::{ColType, Column};

use super::codec::{decode_col_values, decode_to_strings};

/// Distinct values present in a column, splitting list columns into
/// individual items. First-seen order.
pub fn individual_items(column: &Column) -> Vec<String> {
    let values = decode_to_strings(&column.col_values, column.col_type, column.effective_sep());
    let mut seen: IndexMap<String, ()> = IndexMap::new();
    if column.col_type.is_list() {
        let sep = column.effective_sep().to_string();
        for value in &values {
            for item in value.split(&sep) {
                let trimmed = item.trim();
                if !trimmed.is_empty() {
                    seen.entry(trimmed.to_string()).or_insert(());
                }
            }
        }
    } else {
        for value in &values {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                seen.entry(trimmed.to_string()).or_insert(());
            }
        }
    }
    seen.into_keys().collect()
}

/// Sort direction for [`individual_items_with_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSort {
    Asc,
    Desc,
}

/// Options for [`individual_items_with_count`].
#[derive(Debug, Clone, Default)]
pub struct ItemCountOptions {
    /// Variant index to inspect; `None` reads the base column.
    pub variant_index: Option<usize>,
    /// Split list values by the column separator (defaults to true for lists).
    pub split_list: Option<bool>,
    /// Include empty / missing values in the output.
    pub include_empty: bool,
    /// Order by count; when `None` the value sort applies.
    pub sort_by_count: Option<CountSort>,
    /// Alphabetical order used when not sorting by count.
    pub sort_by_value: Option<CountSort>,
}

/// One level and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ItemCount {
    pub value: String,
    pub count: usize,
}

/// Frequency count of individual values for a column or one of its variants.
pub fn individual_items_with_count(column: &Column, options: &ItemCountOptions) -> Vec<ItemCount> {
    let variant = options.variant_index.and_then(|i| column.variant(i));
    let (col_type, sep, col_values) = match variant {
        Some(v) => (v.col_type, v.effective_sep().to_string(), &v.col_values),
        None => (
            column.col_type,
            column.effective_sep().to_string(),
            &column.col_values,
        ),
    };

    let values = decode_col_values(col_values, col_type, &sep);
    if values.is_empty() {
        return Vec::new();
    }

    let should_split = col_type.is_list() && options.split_list.unwrap_or(true);
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    let mut add = |raw: &str| {
        let key = raw.trim();
        if key.is_empty() && !options.include_empty {
            return;
        }
        *counts.entry(key.to_string()).or_insert(0) += 1;
    };

    for value in &values {
        let text = value.as_deref().unwrap_or("");
        if should_split {
            let pieces: Vec<&str> = text
                .split(&sep)
                .map(str::trim)
                .filter(|p| options.include_empty || !p.is_empty())
                .collect();
            if pieces.is_empty() && options.include_empty {
                add("");
            } else {
                for piece in pieces {
                    add(piece);
                }
            }
        } else {
            add(text);
        }
    }

    let mut result: Vec<ItemCount> = counts
        .into_iter()
        .map(|(value, count)| ItemCount { value, count })
        .collect();

    match (options.sort_by_count, options.sort_by_value) {
        (Some(CountSort::Asc), _) => {
            result.sort_by(|a, b| a.count.cmp(&b.count).then(a.value.cmp(&b.value)));
        }
        (Some(CountSort::Desc), _) => {
            result.sort_by(|a, b| b.count.cmp(&a.count).then(a.value.cmp(&b.value)));
        }
        (None, Some(CountSort::Desc)) => result.sort_by(|a, b| b.value.cmp(&a.value)),
        _ => result.sort_by(|a, b| a.value.cmp(&b.value)),
    }
    result
}

/// Options for [`decompose_list_as_binary`].
#[derive(Debug, Clone)]
pub struct BinaryDecomposeOptions {
    pub lang: Language,
    /// Override for the "present" label.
    pub yes_label: Option<String>,
    /// Override for the "absent" label.
    pub no_label: Option<String>,
    /// Items occurring fewer times than this are dropped.
    pub min_count: usize,
}

impl Default for BinaryDecomposeOptions {
    fn default() -> Self {
        Self {
            lang: Language::default(),
            yes_label: None,
            no_label: None,
            min_count: 1,
        }
    }
}

/// Decompose list-like values (e.g. "A;B") into per-item yes/no columns.
///
/// Output items are ordered by descending frequency; rows whose source
/// value was empty stay empty in every derived column.
pub fn decompose_list_as_binary(
    values: &[String],
    sep: &str,
    options: &BinaryDecomposeOptions,
) -> IndexMap<String, Vec<String>> {
    let messages = Messages::new();
    let yes = options
        .yes_label
        .clone()
        .unwrap_or_else(|| messages.translate(MessageKey::BinaryYes, options.lang, &[]));
    let no = options
        .no_label
        .clone()
        .unwrap_or_else(|| messages.translate(MessageKey::BinaryNo, options.lang, &[]));

    let mut count_map: IndexMap<String, usize> = IndexMap::new();
    let mut row_items: Vec<Option<Vec<String>>> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            row_items.push(None);
            continue;
        }
        let items: Vec<String> = trimmed
            .split(sep)
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();
        for item in &items {
            *count_map.entry(item.clone()).or_insert(0) += 1;
        }
        row_items.push(Some(items));
    }

    let mut ordered: Vec<(String, usize)> = count_map
        .into_iter()
        .filter(|(_, count)| *count >= options.min_count)
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let mut result: IndexMap<String, Vec<String>> = IndexMap::new();
    for (item, _) in ordered {
        let column: Vec<String> = row_items
            .iter()
            .map(|entry| match entry {
                None => String::new(),
                Some(items) => {
                    if items.contains(&item) {
                        yes.clone()
                    } else {
                        no.clone()
                    }
                }
            })
            .collect();
        result.insert(item, column);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::codec::{ColumnOptions, make_column};

    fn strs(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_counts_split_list_desc() {
        let values = strs(&[
            "fever,headache",
            "headache",
            "headache",
            "fever,headache,anemia",
            "anemia",
            "",
        ]);
        let column = make_column(
            &values,
            ColumnOptions {
                col_type: Some(ColType::List),
                col_sep: Some(",".into()),
                ..Default::default()
            },
        );
        let counts = individual_items_with_count(
            &column,
            &ItemCountOptions {
                split_list: Some(true),
                include_empty: true,
                sort_by_count: Some(CountSort::Desc),
                ..Default::default()
            },
        );
        let expected = vec![
            ("headache", 4),
            ("anemia", 2),
            ("fever", 2),
            ("", 1),
        ];
        let got: Vec<(&str, usize)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_counts_reads_variant() {
        let values = strs(&["a", "a", "b"]);
        let column = make_column(&values, ColumnOptions::default());
        let counts = individual_items_with_count(
            &column,
            &ItemCountOptions {
                variant_index: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].value, "a");
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_individual_items_first_seen() {
        let values = strs(&["b;a", "c", "a"]);
        let column = make_column(
            &values,
            ColumnOptions {
                col_type: Some(ColType::List),
                col_sep: Some(";".into()),
                ..Default::default()
            },
        );
        assert_eq!(individual_items(&column), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_decompose_list_as_binary() {
        let values = strs(&["a;b", "b", "", "a"]);
        let result = decompose_list_as_binary(&values, ";", &BinaryDecomposeOptions::default());
        let a = result.get("a").unwrap();
        let b = result.get("b").unwrap();
        assert_eq!(a, &vec!["Yes", "No", "", "Yes"]);
        assert_eq!(b, &vec!["Yes", "Yes", "", "No"]);
    }
}
