//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{Result, TabstatError};

use super::dataset::Dataset;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses tabular data files into a [`Dataset`] of encoded columns.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a delimited file into a dataset, inferring each column's
    /// type and encoding it.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| TabstatError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| TabstatError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (headers, rows) = self.parse_bytes(&contents)?;
        Ok(Dataset::from_rows(&headers, rows, &file_name))
    }

    /// Parse raw bytes into headers plus data rows.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(TabstatError::EmptyData("No data rows found".to_string())),
            }
        };
        if headers.is_empty() {
            return Err(TabstatError::EmptyData("No columns found".to_string()));
        }

        // Re-create the reader; header probing may have consumed records.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            while row.len() < expected_cols {
                row.push(String::new());
            }
            row.truncate(expected_cols);
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(TabstatError::EmptyData("No data rows found".to_string()));
        }
        Ok((headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines: the
/// candidate with the most consistent per-line count wins.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return Err(TabstatError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;
    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();
        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            first_count
        };
        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }
    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColType;

    #[test]
    fn test_detect_delimiter_csv() {
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n4,5,6").unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3").unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_respects_quotes() {
        assert_eq!(
            detect_delimiter(b"name\tnote\nx\t\"a,b,c\"\ny\t\"d,e\"").unwrap(),
            b'\t'
        );
    }

    #[test]
    fn test_parse_bytes_pads_short_rows() {
        let parser = Parser::new();
        let (headers, rows) = parser.parse_bytes(b"a,b,c\n1,2\n4,5,6").unwrap();
        assert_eq!(headers, vec!["a", "b", "c"]);
        assert_eq!(rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_parse_bytes_without_header() {
        let parser = Parser::with_config(ParserConfig {
            has_header: false,
            delimiter: Some(b','),
            ..Default::default()
        });
        let (headers, rows) = parser.parse_bytes(b"1,2\n3,4").unwrap();
        assert_eq!(headers, vec!["column_1", "column_2"]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_parse_empty_is_error() {
        let parser = Parser::new();
        assert!(matches!(
            parser.parse_bytes(b""),
            Err(TabstatError::EmptyData(_))
        ));
    }

    #[test]
    fn test_parse_file_builds_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        std::fs::write(&path, "age,sex\n34,m\n41,f\n29,m\n").unwrap();
        let dataset = Parser::new().parse_file(&path).unwrap();
        assert_eq!(dataset.columns.len(), 2);
        assert_eq!(dataset.columns[0].col_type, ColType::Numeric);
        assert_eq!(dataset.columns[1].col_type, ColType::Qualitative);
        assert_eq!(dataset.history.len(), 1);
        assert_eq!(dataset.history[0].file, "survey.csv");
    }
}
