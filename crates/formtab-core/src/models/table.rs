//! Tabular dataset produced by extraction.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Ordered columns with ordered rows of optional values.
///
/// `None` marks a cell with no value (a slot no source cell filled, or a
/// column this row's table did not have before concatenation).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl DataTable {
    /// Create a table from columns and rows.
    ///
    /// Row widths are not checked against the column count; see [`DataTable::malformed_rows`].
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` in column `column`, `None` if absent or empty.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Vec<Option<&str>> {
        match self.column_index(column) {
            Some(index) => self
                .rows
                .iter()
                .map(|row| row.get(index).and_then(|v| v.as_deref()))
                .collect(),
            None => vec![None; self.rows.len()],
        }
    }

    /// Set `column` to `value` on every row, appending the column if it is new.
    ///
    /// A new column lands after the existing ones. Short rows are padded with
    /// `None` up to it; values a long row holds past the known columns move
    /// right, so the row stays as much longer than the header as before.
    pub fn assign(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();

        if let Some(index) = self.column_index(column) {
            for row in &mut self.rows {
                if row.len() <= index {
                    row.resize(index + 1, None);
                }
                row[index] = Some(value.clone());
            }
            return;
        }

        let index = self.columns.len();
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            if row.len() < index {
                row.resize(index, None);
            }
            row.insert(index, Some(value.clone()));
        }
    }

    /// Append `other` below `self`.
    ///
    /// Columns are the union of both tables by name, in order of first
    /// appearance. Rows keep their order; a row gets `None` for columns its
    /// table lacked. Values past a row's known columns stay past them.
    pub fn concat(&mut self, other: DataTable) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }

        let known = self.columns.len();
        let mut mapping = Vec::with_capacity(other.columns.len());
        for column in &other.columns {
            let index = match self.column_index(column) {
                Some(index) => index,
                None => {
                    self.columns.push(column.clone());
                    self.columns.len() - 1
                }
            };
            mapping.push(index);
        }

        let width = self.columns.len();
        for row in &mut self.rows {
            if row.len() < known {
                row.resize(known, None);
            }
            row.splice(known..known, std::iter::repeat_n(None, width - known));
        }

        for row in other.rows {
            let mut merged = vec![None; width];
            for (position, value) in row.into_iter().enumerate() {
                match mapping.get(position) {
                    Some(&index) => merged[index] = value,
                    None => merged.push(value),
                }
            }
            self.rows.push(merged);
        }
    }

    /// Indices of rows whose width differs from the column count.
    pub fn malformed_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() != self.columns.len())
            .map(|(i, _)| i)
            .collect()
    }

    /// Rows as column-to-value records.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record {
            columns: &self.columns,
            row,
        })
    }
}

/// A borrowed view of one row keyed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    row: &'a [Option<String>],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.row.get(index)?.as_deref()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (index, column) in self.columns.iter().enumerate() {
            let value = self.row.get(index).and_then(|v| v.as_deref());
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Serializes as an array of records.
impl Serialize for DataTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for record in self.records() {
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}
