use std::path::PathBuf;

/// Default rows per bulk-load chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Configuration for the iCite import.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// iCite CSV file (header row + one paper per line)
    pub csv_path: PathBuf,
    /// Target DuckDB database file (created if missing)
    pub db_path: PathBuf,
    /// Target table name
    pub table: String,
    /// Rows per appended chunk
    pub chunk_size: usize,
}

impl ImportConfig {
    pub fn new(csv_path: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            db_path: db_path.into(),
            table: "papers".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
