//! Error types for the export pipeline

/// Failure while reading from the record source (connection, cursor, decode).
#[derive(Debug)]
pub struct SourceError {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl SourceError {
    pub fn new(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { inner: e.into() }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Error that aborts an export run.
///
/// Nothing is retried or rolled back: rows flushed before the failure stay
/// in the output.
#[derive(Debug)]
pub enum ExportError {
    Source(SourceError),
    Sink(std::io::Error),
    /// A row carried fields outside the resolved schema (strict mode only)
    SchemaDrift { batch: usize, unknown: Vec<String> },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(e) => write!(f, "source: {e}"),
            Self::Sink(e) => write!(f, "sink: {e}"),
            Self::SchemaDrift { batch, unknown } => write!(
                f,
                "schema drift in batch {batch}: unknown columns {}",
                unknown.join(", ")
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Sink(e) => Some(e),
            Self::SchemaDrift { .. } => None,
        }
    }
}

impl From<SourceError> for ExportError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Sink(e)
    }
}
