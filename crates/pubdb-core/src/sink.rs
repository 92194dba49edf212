//! Output sinks — tab-separated file writer

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::schema::OutputSchema;
use crate::transform::FlatRecord;

/// Appends rows under a fixed column schema.
pub trait RowSink {
    /// Write the header row. Fails if a header was already written.
    fn write_header(&mut self, schema: &OutputSchema) -> io::Result<()>;

    /// Write rows projected through `schema`, returning the count written
    fn write_rows(&mut self, schema: &OutputSchema, rows: &[FlatRecord]) -> io::Result<usize>;

    /// Flush buffered output and return total data rows written
    fn finish(self) -> io::Result<usize>
    where
        Self: Sized;
}

/// Tab-separated writer: one record per line, quoting only where needed.
pub struct TsvSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
    row_count: usize,
}

impl<W: Write> std::fmt::Debug for TsvSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsvSink")
            .field("header_written", &self.header_written)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl TsvSink<BufWriter<File>> {
    /// Create (truncate) the output file
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(inner);
        Self {
            writer,
            header_written: false,
            row_count: 0,
        }
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> io::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::new(e.error().kind(), e.to_string()))
    }
}

impl<W: Write> RowSink for TsvSink<W> {
    fn write_header(&mut self, schema: &OutputSchema) -> io::Result<()> {
        if self.header_written {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "header already written",
            ));
        }
        self.writer.write_record(schema.columns())?;
        self.header_written = true;
        Ok(())
    }

    fn write_rows(&mut self, schema: &OutputSchema, rows: &[FlatRecord]) -> io::Result<usize> {
        for row in rows {
            self.writer.write_record(schema.project(row))?;
        }
        self.writer.flush()?;
        self.row_count += rows.len();
        Ok(rows.len())
    }

    fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        Ok(self.row_count)
    }
}
