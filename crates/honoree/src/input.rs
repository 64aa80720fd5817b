//! Where input names come from.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Column read from CSV input unless told otherwise.
pub const DEFAULT_COLUMN: &str = "name";

/// A source of raw names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// One name given on the command line.
    Literal(String),
    /// One name per line.
    TextFile(PathBuf),
    /// A named column of a CSV file.
    Table { path: PathBuf, column: String },
}

impl InputSource {
    /// Pick the reader from the file extension: `.csv` is a table, anything
    /// else is read line by line.
    pub fn from_path(path: impl Into<PathBuf>, column: Option<&str>) -> Self {
        let path = path.into();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv {
            InputSource::Table {
                path,
                column: column.unwrap_or(DEFAULT_COLUMN).to_string(),
            }
        } else {
            InputSource::TextFile(path)
        }
    }

    /// The input file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::Literal(_) => None,
            InputSource::TextFile(path) | InputSource::Table { path, .. } => Some(path),
        }
    }

    /// Every non-blank name, in input order.
    pub fn load_names(&self) -> Result<Vec<String>> {
        let names = match self {
            InputSource::Literal(name) => vec![name.clone()],
            InputSource::TextFile(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                content
                    .trim_start_matches('\u{feff}')
                    .lines()
                    .map(str::to_string)
                    .collect()
            }
            InputSource::Table { path, column } => read_column(path, column)?,
        };

        Ok(names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect())
    }
}

fn read_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let index = headers
        .iter()
        .position(|h| h == column)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(column)));
    let Some(index) = index else {
        bail!(
            "column '{}' not found in {}. Available columns: {}",
            column,
            path.display(),
            headers.join(", ")
        );
    };

    let mut names = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV row {} in {}", line + 2, path.display()))?;
        names.push(record.get(index).unwrap_or_default().to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_extension_picks_reader() {
        assert!(matches!(
            InputSource::from_path("names.CSV", None),
            InputSource::Table { ref column, .. } if column == "name"
        ));
        assert!(matches!(InputSource::from_path("names.txt", None), InputSource::TextFile(_)));
        assert!(matches!(InputSource::from_path("names", Some("x")), InputSource::TextFile(_)));
    }

    #[test]
    fn test_text_file_skips_blank_lines() {
        let file = write_temp(".txt", "John Smith\n\n   \nJane Doe Memorial Highway\n");
        let names = InputSource::TextFile(file.path().to_path_buf()).load_names().unwrap();
        assert_eq!(names, vec!["John Smith", "Jane Doe Memorial Highway"]);
    }

    #[test]
    fn test_text_file_strips_bom() {
        let file = write_temp(".txt", "\u{feff}Jane Doe\nJohn Roe\n");
        let names = InputSource::TextFile(file.path().to_path_buf()).load_names().unwrap();
        assert_eq!(names, vec!["Jane Doe", "John Roe"]);
    }

    #[test]
    fn test_table_reads_named_column() {
        let file = write_temp(".csv", "\u{feff}id,Name,county\n1,John Smith,Travis\n2,,Harris\n3,\"Doe, Jane\",Bexar\n");
        let source = InputSource::from_path(file.path(), Some("name"));
        assert_eq!(source.load_names().unwrap(), vec!["John Smith", "Doe, Jane"]);
    }

    #[test]
    fn test_missing_column_lists_available() {
        let file = write_temp(".csv", "id,honoree\n1,John Smith\n");
        let err = InputSource::from_path(file.path(), None).load_names().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("column 'name' not found"), "{msg}");
        assert!(msg.contains("id, honoree"), "{msg}");
    }

    #[test]
    fn test_literal_name() {
        let names = InputSource::Literal("  Albert Einstein ".into()).load_names().unwrap();
        assert_eq!(names, vec!["Albert Einstein"]);
    }
}
