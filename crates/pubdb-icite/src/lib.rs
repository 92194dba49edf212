//! pubdb-icite: bulk-load an iCite CSV into an indexed DuckDB table
//!
//! The CSV is read in fixed-size chunks; each chunk is appended to the
//! target table (created from the first chunk's inferred types, widened
//! when a later chunk needs it). Indexes are built in one transaction once
//! every chunk is loaded.

mod chunks;
mod config;
mod sql;

pub use chunks::{ColumnType, CsvChunks};
pub use config::{DEFAULT_CHUNK_SIZE, ImportConfig};
pub use sql::INDEXES;

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use duckdb::types::Value;
use duckdb::{Connection, appender_params_from_iter};
use indicatif::ProgressBar;

/// Summary statistics from the import.
#[derive(Debug)]
pub struct ImportSummary {
    pub rows: u64,
    pub chunks: usize,
    pub indexes: usize,
}

/// Run the import. `pb` receives per-stage status messages.
///
/// Chunks are committed as they are appended; a failure during index
/// creation leaves the loaded rows in place and no index durable.
pub fn run(config: &ImportConfig, pb: &ProgressBar) -> Result<ImportSummary> {
    let mut conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open DuckDB: {}", config.db_path.display()))?;

    log::info!(
        "Creating the iCite db with chunk size {}",
        config.chunk_size
    );
    let chunks = CsvChunks::open(&config.csv_path, config.chunk_size)?;
    let header = chunks.header().to_vec();

    let mut columns: Option<Vec<ColumnType>> = None;
    let mut rows = 0u64;
    let mut n_chunks = 0usize;

    for chunk in chunks {
        let chunk = chunk?;
        let types = match columns.take() {
            Some(mut types) => {
                widen_columns(&conn, &config.table, &header, &mut types, &chunk)
                    .with_context(|| format!("Failed to widen columns for chunk {n_chunks}"))?;
                types
            }
            None => {
                let inferred: Vec<ColumnType> = (0..header.len())
                    .map(|i| ColumnType::infer(&chunk, i))
                    .collect();
                create_table(&conn, &config.table, &header, &inferred)?;
                inferred
            }
        };

        append_chunk(&conn, &config.table, &types, &chunk)
            .with_context(|| format!("Failed to append chunk {n_chunks}"))?;
        columns = Some(types);
        rows += chunk.len() as u64;
        n_chunks += 1;
        pb.set_message(format!("{} rows loaded", pubdb_core::fmt_num(rows as usize)));
        log::debug!("Chunk {n_chunks}: {} rows", chunk.len());
    }

    if columns.is_none() {
        log::warn!("{}: no data rows", config.csv_path.display());
        let types = vec![ColumnType::Varchar; header.len()];
        create_table(&conn, &config.table, &header, &types)?;
    }
    log::info!("Inserted all {} records", pubdb_core::fmt_num(rows as usize));

    let tx = conn
        .transaction()
        .context("Failed to begin index transaction")?;
    let index_stmts = sql::create_indexes(&config.table);
    for stmt in &index_stmts {
        log::info!("Executing query: {stmt}");
        pb.set_message(stmt.clone());
        tx.execute_batch(stmt)
            .with_context(|| format!("Failed to create index: {stmt}"))?;
    }
    tx.commit().context("Failed to commit indexes")?;

    let loaded: i64 = conn
        .query_row(&sql::count_rows(&config.table), [], |row| row.get(0))
        .context("Failed to count table rows")?;
    log::info!(
        "Done: {} rows in {}",
        pubdb_core::fmt_num(loaded as usize),
        config.table
    );

    Ok(ImportSummary {
        rows,
        chunks: n_chunks,
        indexes: index_stmts.len(),
    })
}

fn create_table(
    conn: &Connection,
    table: &str,
    header: &[String],
    types: &[ColumnType],
) -> Result<()> {
    let columns: Vec<(String, ColumnType)> = header.iter().cloned().zip(types.iter().copied()).collect();
    let ddl = sql::create_table(table, &columns);
    log::debug!("{ddl}");
    conn.execute_batch(&ddl)
        .with_context(|| format!("Failed to create table {table}"))
}

/// Widen any column whose values in `chunk` no longer fit its current type
/// (BIGINT → DOUBLE → VARCHAR). Rows already loaded are cast by the engine.
fn widen_columns(
    conn: &Connection,
    table: &str,
    header: &[String],
    types: &mut [ColumnType],
    chunk: &[StringRecord],
) -> Result<()> {
    for (i, (name, ty)) in header.iter().zip(types.iter_mut()).enumerate() {
        let Some(seen) = ColumnType::observed(chunk, i) else {
            continue;
        };
        let wider = ty.widen(seen);
        if wider == *ty {
            continue;
        }
        log::info!("Widening column {name}: {} -> {}", ty.sql(), wider.sql());
        conn.execute_batch(&sql::alter_column_type(table, name, wider))?;
        *ty = wider;
    }
    Ok(())
}

fn append_chunk(
    conn: &Connection,
    table: &str,
    types: &[ColumnType],
    chunk: &[StringRecord],
) -> Result<()> {
    let mut appender = conn.appender(table)?;
    for (i, record) in chunk.iter().enumerate() {
        if record.len() != types.len() {
            bail!(
                "row {i} has {} fields, table has {} columns",
                record.len(),
                types.len()
            );
        }
        let values = record
            .iter()
            .zip(types)
            .map(|(raw, ty)| to_value(raw, *ty))
            .collect::<Result<Vec<Value>>>()
            .with_context(|| format!("row {i}"))?;
        appender.append_row(appender_params_from_iter(values))?;
    }
    appender.flush()?;
    Ok(())
}

/// Typed cell for the appender; empty cells are NULL.
fn to_value(raw: &str, ty: ColumnType) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    Ok(match ty {
        ColumnType::BigInt => Value::BigInt(
            raw.parse()
                .with_context(|| format!("'{raw}' is not an integer"))?,
        ),
        ColumnType::Double => Value::Double(
            raw.parse()
                .with_context(|| format!("'{raw}' is not a number"))?,
        ),
        ColumnType::Varchar => Value::Text(raw.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_value_empty_is_null() {
        assert_eq!(to_value("", ColumnType::BigInt).unwrap(), Value::Null);
    }

    #[test]
    fn to_value_typed() {
        assert_eq!(to_value("42", ColumnType::BigInt).unwrap(), Value::BigInt(42));
        assert_eq!(to_value("1.25", ColumnType::Double).unwrap(), Value::Double(1.25));
        assert_eq!(
            to_value("Yes", ColumnType::Varchar).unwrap(),
            Value::Text("Yes".to_string())
        );
    }

    #[test]
    fn to_value_rejects_mismatch() {
        assert!(to_value("n/a", ColumnType::BigInt).is_err());
    }
}
