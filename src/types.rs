//! Tabular types shared by the parser and the concatenator

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SchemaError};

/// Prefix the site's renderer gives to synthetic column labels ("Unnamed: 3").
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Returns true if a group or name is a renderer-generated placeholder
pub fn is_placeholder(label: &str) -> bool {
    label.trim_start().starts_with(PLACEHOLDER_PREFIX)
}

/// A two-level column label. Flat columns have an empty group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnLabel {
    pub group: String,
    pub name: String,
}

impl ColumnLabel {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    pub fn flat(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    pub fn is_flat(&self) -> bool {
        self.group.is_empty()
    }

    /// True if the group carries meaning (not empty, not a placeholder)
    pub fn has_real_group(&self) -> bool {
        !self.group.is_empty() && !is_placeholder(&self.group)
    }

    /// Drop placeholder parts of the label.
    ///
    /// A placeholder group is erased. A placeholder (or empty) name under a
    /// real group means the renderer pushed a flat column into the upper
    /// level, so the group text becomes the name.
    pub fn normalized(&self) -> ColumnLabel {
        let name_real = !self.name.is_empty() && !is_placeholder(&self.name);
        match (self.has_real_group(), name_real) {
            (true, true) => self.clone(),
            (true, false) => ColumnLabel::flat(self.group.clone()),
            (false, _) => ColumnLabel::flat(self.name.clone()),
        }
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_flat() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.group, self.name)
        }
    }
}

/// One table row, one cell per column. `None` marks a missing value.
pub type Row = Vec<Option<String>>;

/// A parsed or concatenated table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<ColumnLabel>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<ColumnLabel>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from rows, checking every row has one cell per column
    pub fn from_rows(columns: Vec<ColumnLabel>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub(crate) fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SchemaError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            }
            .into());
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this exact label
    pub fn column_index(&self, label: &ColumnLabel) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Position of the first column whose name matches, ignoring the group
    pub fn column_index_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All values of the first column named `name`, in row order
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index_by_name(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// A single cell by row position and column name
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index_by_name(name)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn into_parts(self) -> (Vec<ColumnLabel>, Vec<Row>) {
        (self.columns, self.rows)
    }
}
