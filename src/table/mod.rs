/// Schema-less tables parsed from kubectl's human-readable output
pub mod render;

use anyhow::Result;
use regex::Regex;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Parse failures for tabular kubectl output.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("output has no header line")]
    MissingHeader,

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A single table value: a normalized number or the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: &str) -> Self {
        Cell::Text(value.to_string())
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) => serializer.serialize_f64(*v),
            Cell::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// An ordered set of named columns over the rows of one kubectl run.
///
/// Columns are dynamic: whatever the header line named, downcased. Every row
/// holds exactly one cell per column; that width invariant is enforced at
/// construction. Tables are built fresh per invocation and never cached.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from prepared columns and rows, rejecting any row whose
    /// width differs from the header's.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::ColumnCount {
                    line: idx + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parse `kubectl get` style output.
    ///
    /// Columns are separated by runs of two or more whitespace characters so
    /// single-space values like "2 hours ago" survive intact. Blank lines are
    /// skipped; a data line whose width differs from the header is rejected
    /// as malformed rather than padded or truncated.
    pub fn parse_wide(text: &str) -> Result<Self> {
        let splitter = Regex::new(r"\s{2,}")?;

        let mut lines = non_blank_lines(text);
        let (_, header) = lines.next().ok_or(TableError::MissingHeader)?;
        let columns: Vec<String> = splitter
            .split(header.to_lowercase().trim())
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let fields: Vec<&str> = splitter.split(line.trim()).collect();
            if fields.len() != columns.len() {
                return Err(TableError::ColumnCount {
                    line: line_no,
                    expected: columns.len(),
                    found: fields.len(),
                }
                .into());
            }
            rows.push(fields.into_iter().map(Cell::text).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Parse `kubectl top` style output.
    ///
    /// Every field is a single token, so a plain whitespace split is enough.
    /// Rows with the wrong width are dropped whole rather than rejected.
    pub fn parse_packed(text: &str) -> Result<Self> {
        let mut lines = non_blank_lines(text);
        let (_, header) = lines.next().ok_or(TableError::MissingHeader)?;
        let columns: Vec<String> = header
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let rows = lines
            .filter_map(|(_, line)| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                (fields.len() == columns.len())
                    .then(|| fields.into_iter().map(Cell::text).collect())
            })
            .collect();

        Ok(Self::new(columns, rows)?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at a row index and column name.
    #[allow(dead_code)]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Rename a column in place. No-op when the column is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column(from) {
            self.columns[idx] = to.to_string();
        }
    }

    /// Append a copy of an existing column under a new name.
    pub fn duplicate_column(&mut self, name: &str, copy: &str) {
        if let Some(idx) = self.column(name) {
            self.columns.push(copy.to_string());
            for row in &mut self.rows {
                let cell = row[idx].clone();
                row.push(cell);
            }
        }
    }

    /// Rewrite every value in a column.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&Cell) -> Cell) {
        if let Some(idx) = self.column(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// Rewrite a column, dropping the rows the rewrite rejects.
    pub fn filter_map_column(&mut self, name: &str, f: impl Fn(&Cell) -> Option<Cell>) {
        if let Some(idx) = self.column(name) {
            self.rows.retain_mut(|row| match f(&row[idx]) {
                Some(cell) => {
                    row[idx] = cell;
                    true
                }
                None => false,
            });
        }
    }

    /// Drop rows whose value in the given column is empty text. No-op when
    /// the column is absent.
    pub fn drop_rows_missing(&mut self, name: &str) {
        if let Some(idx) = self.column(name) {
            self.rows
                .retain(|row| !matches!(&row[idx], Cell::Text(s) if s.is_empty()));
        }
    }

    /// Stable sort by a column, descending. Rows with a non-numeric value in
    /// the column sort last; ties keep their original relative order.
    pub fn sort_desc_by(&mut self, name: &str) {
        if let Some(idx) = self.column(name) {
            self.rows.sort_by(|a, b| {
                let ka = a[idx].as_f64().unwrap_or(f64::NEG_INFINITY);
                let kb = b[idx].as_f64().unwrap_or(f64::NEG_INFINITY);
                kb.total_cmp(&ka)
            });
        }
    }
}

/// Serializes as an array of row objects keyed by column name.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    columns: &'a [String],
    row: &'a [Cell],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in self.columns.iter().zip(self.row.iter()) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}
