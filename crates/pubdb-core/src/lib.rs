//! pubdb core - streaming export of publication records to flat TSV
//!
//! Leaf-first: [`transform`] flattens one document, [`accumulator`] buffers
//! rows, [`schema`] fixes the column set, [`sink`] writes rows, and
//! [`export`] drives a [`RecordSource`] through all of them.

pub mod accumulator;
pub mod error;
pub mod export;
pub mod logging;
pub mod progress;
pub mod schema;
pub mod sink;
pub mod transform;

// Re-exports for convenience
pub use accumulator::{BatchAccumulator, DEFAULT_BATCH_SIZE};
pub use error::{ExportError, SourceError};
pub use export::{ExportOptions, ExportSummary, RecordSource, export};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, fmt_num};
pub use schema::{OutputSchema, SchemaDrift};
pub use sink::{RowSink, TsvSink};
pub use transform::{FlatRecord, LIST_DELIMITER, RawRecord, TransformRules, transform};
