//! delimited observation files
//!
//! ATS writes observations (`water_balance.dat`, `obs.dat`, ...) as plain
//! delimited text: a block of `#` comment lines, a header row naming every
//! column (often with units, `"time [d]"`), then one row of numbers per
//! observation time.

use ndarray::{Array2, ArrayView1};
use std::io::BufRead;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("file has no header line")]
    MissingHeader,
    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: could not parse `{value}` as a number")]
    InvalidNumber { line: usize, value: String },
    #[error("no column named {0:?}")]
    MissingColumn(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
/// How to split the lines of a delimited file
pub struct ReadOptions {
    pub delimiter: char,
    /// lines starting with this character are skipped
    pub comment: char,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            comment: '#',
        }
    }
}

/// Count the number of lines starting with `#`
pub fn count_comment_lines<R: BufRead>(reader: R) -> Result<usize, TableError> {
    let mut count = 0;
    for line in reader.lines() {
        if line?.starts_with('#') {
            count += 1;
        }
    }
    Ok(count)
}

/// Read the header of an observation file.
///
/// Returns the 1-based line number of the header together with its column names.
/// The header is the first line after the `#` comment block.
pub fn read_header<R: BufRead>(
    reader: R,
    options: &ReadOptions,
) -> Result<(usize, Vec<String>), TableError> {
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with(options.comment) {
            continue;
        }

        return Ok((index + 1, split_header(&line, options.delimiter)));
    }

    Err(TableError::MissingHeader)
}

/// Split a header line into its column names.
///
/// Quoted headers (`"time [d]","runoff [mol d^-1]"`) are split on the quotes, and
/// fragments of a single character (the separators between quoted names) are
/// dropped. Unquoted headers are split on the delimiter.
pub fn split_header(line: &str, delimiter: char) -> Vec<String> {
    if line.contains('"') {
        line.split('"')
            .filter(|fragment| fragment.chars().count() > 1)
            .map(str::to_string)
            .collect()
    } else {
        line.split(delimiter)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A delimited file read into memory, one column per header name
pub struct DelimitedTable {
    columns: Vec<String>,
    /// `(rows, columns)`
    data: Array2<f64>,
}

impl DelimitedTable {
    pub fn new(columns: Vec<String>, data: Array2<f64>) -> Self {
        Self { columns, data }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// values of the column with exactly this name
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>, TableError> {
        self.column_any(&[name])
    }

    /// values of the first of `names` present in the table
    pub fn column_any(&self, names: &[&str]) -> Result<ArrayView1<'_, f64>, TableError> {
        names
            .iter()
            .find_map(|name| self.columns.iter().position(|c| c == name))
            .map(|index| self.data.column(index))
            .ok_or_else(|| TableError::MissingColumn(names.iter().map(|n| n.to_string()).collect()))
    }
}

/// Read a delimited file, skipping comment lines.
///
/// The first line that is not a comment is the header, every following
/// non-empty line must have one value per header column.
pub fn read_table<R: BufRead>(reader: R, options: &ReadOptions) -> Result<DelimitedTable, TableError> {
    let mut columns: Option<Vec<String>> = None;
    let mut values = Vec::new();
    let mut rows = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        if line.starts_with(options.comment) || line.trim().is_empty() {
            continue;
        }

        let expected = match &columns {
            None => {
                columns = Some(split_header(&line, options.delimiter));
                continue;
            }
            Some(columns) => columns.len(),
        };

        let before = values.len();
        for field in line.split(options.delimiter) {
            let field = field.trim();
            let value = field.parse::<f64>().map_err(|_| TableError::InvalidNumber {
                line: line_number,
                value: field.to_string(),
            })?;
            values.push(value);
        }

        let found = values.len() - before;
        if found != expected {
            return Err(TableError::RaggedRow {
                line: line_number,
                expected,
                found,
            });
        }

        rows += 1;
    }

    let columns = columns.ok_or(TableError::MissingHeader)?;
    let width = columns.len();

    let data = Array2::from_shape_vec((rows, width), values).map_err(|_| TableError::RaggedRow {
        line: 0,
        expected: width,
        found: 0,
    })?;

    Ok(DelimitedTable { columns, data })
}
