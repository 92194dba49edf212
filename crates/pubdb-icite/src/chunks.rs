//! Fixed-size row chunks over a CSV file, with per-column type inference

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{Reader, StringRecord, StringRecordsIntoIter};

/// Reads a CSV header, then yields up to `chunk_size` rows at a time.
pub struct CsvChunks {
    header: Vec<String>,
    records: StringRecordsIntoIter<File>,
    chunk_size: usize,
}

impl CsvChunks {
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        let mut reader = Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV: {}", path.display()))?;
        let header = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Self {
            header,
            records: reader.into_records(),
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }
}

impl Iterator for CsvChunks {
    type Item = Result<Vec<StringRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.records.next() {
                Some(Ok(rec)) => chunk.push(rec),
                Some(Err(e)) => return Some(Err(e).context("Failed to read CSV row")),
                None => break,
            }
        }
        if chunk.is_empty() { None } else { Some(Ok(chunk)) }
    }
}

/// Column type inferred from sample values, ordered narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnType {
    BigInt,
    Double,
    Varchar,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Double => "DOUBLE",
            Self::Varchar => "VARCHAR",
        }
    }

    /// Narrowest type that holds every non-empty value in column `idx`.
    /// A column with no values at all is `Varchar`.
    pub fn infer(rows: &[StringRecord], idx: usize) -> Self {
        Self::observed(rows, idx).unwrap_or(Self::Varchar)
    }

    /// Like [`infer`](Self::infer), but `None` when every value is empty.
    pub fn observed(rows: &[StringRecord], idx: usize) -> Option<Self> {
        let mut ty = None;
        for value in rows.iter().filter_map(|r| r.get(idx)).filter(|v| !v.is_empty()) {
            let mut t = ty.unwrap_or(Self::BigInt);
            if t == Self::BigInt && value.parse::<i64>().is_err() {
                t = Self::Double;
            }
            if t == Self::Double && value.parse::<f64>().is_err() {
                return Some(Self::Varchar);
            }
            ty = Some(t);
        }
        ty
    }

    /// Smallest type holding values of both `self` and `other`.
    pub fn widen(self, other: Self) -> Self {
        self.max(other)
    }
}
