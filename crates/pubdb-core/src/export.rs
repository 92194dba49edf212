//! Streaming export: record source → transform → batch → TSV sink
//!
//! The output schema is resolved from the first flushed batch and passed
//! explicitly to every later write. Records are written in source order.

use indicatif::ProgressBar;

use crate::accumulator::{BatchAccumulator, DEFAULT_BATCH_SIZE};
use crate::error::{ExportError, SourceError};
use crate::progress::fmt_num;
use crate::schema::{OutputSchema, SchemaDrift};
use crate::sink::RowSink;
use crate::transform::{FlatRecord, RawRecord, TransformRules, transform};

/// A single-pass, read-once sequence of raw records.
///
/// Consumers must not assume a known length; [`estimated_count`] is for
/// progress display only.
///
/// [`estimated_count`]: RecordSource::estimated_count
pub trait RecordSource {
    type Records<'a>: Iterator<Item = Result<RawRecord, SourceError>>
    where
        Self: 'a;

    /// Iterate all records from the start, skipping the named fields at the source
    fn records(&mut self, exclude: &[&str]) -> Result<Self::Records<'_>, SourceError>;

    /// Approximate total record count, if cheaply available
    fn estimated_count(&self) -> Option<u64>;
}

/// Export tuning
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Rows buffered per flush
    pub batch_size: usize,
    pub schema_drift: SchemaDrift,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            schema_drift: SchemaDrift::Lenient,
        }
    }
}

/// Statistics from one export run
#[derive(Debug)]
pub struct ExportSummary {
    pub records_written: usize,
    pub batches: usize,
    /// `None` when the source was empty and nothing was written
    pub schema: Option<OutputSchema>,
}

/// Drive `source` to exhaustion, writing every record through `sink`.
///
/// The header is written exactly once, on the first flush (a lone partial
/// batch included). An empty source writes nothing.
pub fn export<S: RecordSource, K: RowSink>(
    source: &mut S,
    rules: &TransformRules,
    sink: &mut K,
    options: &ExportOptions,
    pb: &ProgressBar,
) -> Result<ExportSummary, ExportError> {
    let mut writer = BatchWriter {
        sink,
        schema: None,
        drift: options.schema_drift,
        records_written: 0,
        batches: 0,
        pb,
    };
    let mut acc = BatchAccumulator::with_threshold(options.batch_size);

    for raw in source.records(rules.excluded_fields())? {
        acc.push(transform(&raw?, rules));
        if acc.should_flush() {
            writer.flush(acc.drain())?;
        }
    }
    if !acc.is_empty() {
        writer.flush(acc.drain())?;
    }

    pb.set_position(writer.records_written as u64);
    log::info!("Exported {} records", fmt_num(writer.records_written));

    Ok(ExportSummary {
        records_written: writer.records_written,
        batches: writer.batches,
        schema: writer.schema,
    })
}

/// Owns the resolved schema and the running counts between flushes.
struct BatchWriter<'a, K: RowSink> {
    sink: &'a mut K,
    schema: Option<OutputSchema>,
    drift: SchemaDrift,
    records_written: usize,
    batches: usize,
    pb: &'a ProgressBar,
}

impl<K: RowSink> BatchWriter<'_, K> {
    fn flush(&mut self, batch: Vec<FlatRecord>) -> Result<(), ExportError> {
        let schema = match self.schema.take() {
            Some(schema) => schema,
            None => {
                let Some(schema) = OutputSchema::resolve(&batch) else {
                    return Ok(());
                };
                log::debug!("Output schema: {}", schema.columns().join(", "));
                self.sink.write_header(&schema)?;
                schema
            }
        };
        let result = self.write(&schema, &batch);
        self.schema = Some(schema);
        result
    }

    fn write(&mut self, schema: &OutputSchema, batch: &[FlatRecord]) -> Result<(), ExportError> {
        let mut unknown: Vec<String> = Vec::new();
        for row in batch {
            for field in schema.unknown_fields(row) {
                if !unknown.iter().any(|u| u == field) {
                    unknown.push(field.to_string());
                }
            }
        }
        if !unknown.is_empty() {
            match self.drift {
                SchemaDrift::Strict => {
                    return Err(ExportError::SchemaDrift {
                        batch: self.batches,
                        unknown,
                    });
                }
                SchemaDrift::Lenient => log::debug!(
                    "Batch {}: dropping columns outside schema: {}",
                    self.batches,
                    unknown.join(", ")
                ),
            }
        }

        self.records_written += self.sink.write_rows(schema, batch)?;
        self.batches += 1;
        self.pb.set_position(self.records_written as u64);
        log::info!("  - wrote {} records...", fmt_num(self.records_written));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::io;

    /// In-memory source over a fixed record list
    struct VecSource {
        records: Vec<Result<RawRecord, String>>,
    }

    impl VecSource {
        fn new(values: Vec<Value>) -> Self {
            Self {
                records: values
                    .into_iter()
                    .map(|v| match v {
                        Value::Object(m) => Ok(m),
                        _ => panic!("expected object"),
                    })
                    .collect(),
            }
        }
    }

    impl RecordSource for VecSource {
        type Records<'a>
            = Box<dyn Iterator<Item = Result<RawRecord, SourceError>> + 'a>
        where
            Self: 'a;

        fn records(&mut self, _exclude: &[&str]) -> Result<Self::Records<'_>, SourceError> {
            Ok(Box::new(self.records.iter().map(|r| match r {
                Ok(m) => Ok(m.clone()),
                Err(e) => Err(SourceError::new(e.clone())),
            })))
        }

        fn estimated_count(&self) -> Option<u64> {
            Some(self.records.len() as u64)
        }
    }

    /// Records every sink call
    #[derive(Default)]
    struct RecordingSink {
        headers: Vec<Vec<String>>,
        flushes: Vec<usize>,
        rows: Vec<Vec<String>>,
        fail_on_flush: Option<usize>,
    }

    impl RowSink for RecordingSink {
        fn write_header(&mut self, schema: &OutputSchema) -> io::Result<()> {
            self.headers.push(schema.columns().to_vec());
            Ok(())
        }

        fn write_rows(&mut self, schema: &OutputSchema, rows: &[FlatRecord]) -> io::Result<usize> {
            if self.fail_on_flush == Some(self.flushes.len()) {
                return Err(io::Error::other("disk gone"));
            }
            self.flushes.push(rows.len());
            for row in rows {
                self.rows
                    .push(schema.project(row).map(str::to_string).collect());
            }
            Ok(rows.len())
        }

        fn finish(self) -> io::Result<usize> {
            Ok(self.rows.len())
        }
    }

    fn run(
        source: &mut VecSource,
        sink: &mut RecordingSink,
        batch_size: usize,
        drift: SchemaDrift,
    ) -> Result<ExportSummary, ExportError> {
        let options = ExportOptions {
            batch_size,
            schema_drift: drift,
        };
        export(
            source,
            &TransformRules::default(),
            sink,
            &options,
            &ProgressBar::hidden(),
        )
    }

    #[test]
    fn small_source_single_partial_flush() {
        let mut source = VecSource::new(vec![
            json!({"id": 1, "tags": ["x", "y"]}),
            json!({"id": 2, "tags": ["z"]}),
            json!({"id": 3, "tags": []}),
        ]);
        let mut sink = RecordingSink::default();
        let summary = run(&mut source, &mut sink, 10, SchemaDrift::Lenient).unwrap();

        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.batches, 1);
        assert_eq!(sink.headers, vec![vec!["id", "tags"]]);
        assert_eq!(sink.rows[0], vec!["1", "x;y"]);
        assert_eq!(sink.rows[1], vec!["2", "z"]);
        assert_eq!(sink.rows[2], vec!["3", ""]);
    }

    #[test]
    fn full_batches_then_remainder() {
        let records = (0..25_000).map(|i| json!({"id": i, "year": 2000})).collect();
        let mut source = VecSource::new(records);
        let mut sink = RecordingSink::default();
        let summary = run(&mut source, &mut sink, 10_000, SchemaDrift::Lenient).unwrap();

        assert_eq!(sink.flushes, vec![10_000, 10_000, 5_000]);
        assert_eq!(sink.headers.len(), 1);
        assert_eq!(summary.records_written, 25_000);
        assert_eq!(summary.batches, 3);
    }

    #[test]
    fn header_fixed_by_first_batch() {
        let mut source = VecSource::new(vec![
            json!({"a": 1, "b": 2}),
            json!({"a": 3, "b": 4}),
            json!({"c": 5, "a": 6}),
        ]);
        let mut sink = RecordingSink::default();
        let summary = run(&mut source, &mut sink, 2, SchemaDrift::Lenient).unwrap();

        assert_eq!(sink.headers, vec![vec!["a", "b"]]);
        assert_eq!(sink.rows[2], vec!["6", ""]);
        assert_eq!(summary.schema.unwrap().columns(), &["a", "b"]);
    }

    #[test]
    fn strict_drift_aborts() {
        let mut source = VecSource::new(vec![json!({"a": 1}), json!({"a": 2, "extra": 3})]);
        let mut sink = RecordingSink::default();
        let err = run(&mut source, &mut sink, 1, SchemaDrift::Strict).unwrap_err();

        match err {
            ExportError::SchemaDrift { batch, unknown } => {
                assert_eq!(batch, 1);
                assert_eq!(unknown, vec!["extra"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.flushes, vec![1]);
    }

    #[test]
    fn empty_source_writes_nothing() {
        let mut source = VecSource::new(vec![]);
        let mut sink = RecordingSink::default();
        let summary = run(&mut source, &mut sink, 10, SchemaDrift::Lenient).unwrap();

        assert_eq!(summary.records_written, 0);
        assert!(summary.schema.is_none());
        assert!(sink.headers.is_empty());
    }

    #[test]
    fn source_error_keeps_flushed_rows() {
        let mut source = VecSource::new(vec![json!({"a": 1}), json!({"a": 2})]);
        source.records.push(Err("cursor killed".to_string()));
        let mut sink = RecordingSink::default();
        let err = run(&mut source, &mut sink, 2, SchemaDrift::Lenient).unwrap_err();

        assert!(matches!(err, ExportError::Source(_)));
        assert_eq!(sink.flushes, vec![2]);
    }

    #[test]
    fn sink_error_propagates() {
        let records = (0..5).map(|i| json!({"id": i})).collect();
        let mut source = VecSource::new(records);
        let mut sink = RecordingSink {
            fail_on_flush: Some(1),
            ..Default::default()
        };
        let err = run(&mut source, &mut sink, 2, SchemaDrift::Lenient).unwrap_err();

        assert!(matches!(err, ExportError::Sink(_)));
        assert_eq!(sink.flushes, vec![2]);
        assert_eq!(sink.headers.len(), 1);
    }
}
