//! Delimited table input and output.
//!
//! Input rows are time samples and columns are sequences; the loader
//! transposes them into one `Vec<f64>` per column. An optional first line
//! of non-numeric labels is accepted as a header.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use dxcorr_core::Table;
use thiserror::Error;

/// Errors raised while reading or writing tables.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("i/o error when writing data on '{path}': {source}. Please check permissions")]
    Write { path: PathBuf, source: io::Error },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("inconsistent sequence sizes found, or only one sequence detected ({message})")]
    Shape { message: String },
}

/// Column separator, selected on the command line by `t`, `s` or `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Tab,
    Space,
    Comma,
}

impl Separator {
    /// Map a command-line code to a separator; anything unknown means tab.
    pub fn from_code(code: &str) -> Self {
        match code {
            "s" => Self::Space,
            "c" => Self::Comma,
            _ => Self::Tab,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Tab => '\t',
            Self::Space => ' ',
            Self::Comma => ',',
        }
    }

    fn fields(self, line: &str) -> Vec<&str> {
        match self {
            Self::Space => line.split_whitespace().collect(),
            Self::Tab | Self::Comma => {
                let sep = self.as_char();
                if line.trim().is_empty() {
                    return Vec::new();
                }
                let line = line.trim_end_matches(|c: char| c != sep && c.is_whitespace());
                let line = line.strip_suffix(sep).unwrap_or(line);
                line.split(sep).map(str::trim).collect()
            }
        }
    }
}

/// Sequences loaded from a delimited table.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMatrix {
    /// Column labels, if the input had a header line.
    pub labels: Option<Vec<String>>,
    /// One entry per column, in column order.
    pub sequences: Vec<Vec<f64>>,
}

/// Parse a delimited table from `reader`.
pub fn load_sequences<R: BufRead>(reader: R, separator: Separator) -> Result<LoadedMatrix, IoError> {
    let mut labels: Option<Vec<String>> = None;
    let mut sequences: Vec<Vec<f64>> = Vec::new();
    let mut seen_data = false;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| IoError::Parse {
            line: line_no,
            message: e.to_string(),
        })?;
        let fields = separator.fields(&line);
        if fields.is_empty() {
            continue;
        }

        let parsed: Result<Vec<f64>, _> = fields.iter().map(|f| f.parse::<f64>()).collect();
        let values = match parsed {
            Ok(values) => values,
            Err(_) if !seen_data && labels.is_none() && fields.iter().all(|f| !f.is_empty()) => {
                labels = Some(fields.iter().map(|f| f.to_string()).collect());
                continue;
            }
            Err(e) => {
                return Err(IoError::Parse {
                    line: line_no,
                    message: format!("not a number ({e})"),
                });
            }
        };

        if !seen_data {
            sequences = vec![Vec::new(); values.len()];
            seen_data = true;
        }
        if values.len() != sequences.len() {
            return Err(IoError::Shape {
                message: format!(
                    "line {line_no} has {} columns, expected {}",
                    values.len(),
                    sequences.len()
                ),
            });
        }
        for (column, value) in sequences.iter_mut().zip(values) {
            column.push(value);
        }
    }

    if sequences.len() < 2 {
        return Err(IoError::Shape {
            message: format!("{} column(s) loaded", sequences.len()),
        });
    }
    if let Some(l) = &labels {
        if l.len() != sequences.len() {
            return Err(IoError::Shape {
                message: format!("header has {} labels for {} columns", l.len(), sequences.len()),
            });
        }
    }

    Ok(LoadedMatrix { labels, sequences })
}

/// Load from `path`, or from standard input when `path` is `None`.
pub fn read_input(path: Option<&Path>, separator: Separator) -> Result<LoadedMatrix, IoError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| IoError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            load_sequences(BufReader::new(file), separator)
        }
        None => load_sequences(io::stdin().lock(), separator),
    }
}

/// Render a table: one line per row, values joined by the separator.
pub fn format_table(table: &Table, separator: Separator) -> String {
    let sep = separator.as_char().to_string();
    let mut out = String::new();
    for row in table.iter_rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&line.join(&sep));
        out.push('\n');
    }
    out
}

/// Write `contents` to `path`, or to standard output when `path` is `None`.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<(), IoError> {
    match path {
        Some(path) => std::fs::write(path, contents).map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| IoError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
    }
}
