//! Output column set, resolved once per run from the first flushed batch

use crate::transform::FlatRecord;

/// How rows carrying columns outside the resolved schema are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaDrift {
    /// Extra fields are dropped at write time, missing ones become empty cells
    #[default]
    Lenient,
    /// Any row with a field outside the schema aborts the run
    Strict,
}

/// Ordered, immutable column set for the whole export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    columns: Vec<String>,
}

impl OutputSchema {
    /// Take the key order of the batch's first non-empty row. `None` for an
    /// empty batch; a batch of only empty rows yields an empty schema.
    pub fn resolve(batch: &[FlatRecord]) -> Option<Self> {
        if batch.is_empty() {
            return None;
        }
        let Some(first) = batch.iter().find(|row| !row.is_empty()) else {
            log::warn!(
                "All {} records in the first batch are empty, output has no columns",
                batch.len()
            );
            return Some(Self {
                columns: Vec::new(),
            });
        };
        Some(Self {
            columns: first.keys().map(str::to_string).collect(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// One cell per schema column; columns the row lacks are empty.
    pub fn project<'a>(&'a self, row: &'a FlatRecord) -> impl Iterator<Item = &'a str> + 'a {
        self.columns.iter().map(|c| row.get(c).unwrap_or(""))
    }

    /// Fields of `row` that the schema has no column for.
    pub fn unknown_fields<'a>(&'a self, row: &'a FlatRecord) -> impl Iterator<Item = &'a str> + 'a {
        row.keys().filter(|k| !self.contains(k))
    }
}
