use std::str::Utf8Error;

use csv::ReaderBuilder;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::db;
use crate::rows::{CsvRow, InsertRow, JsonRow, RowError};
use crate::schema::{Table, UnknownTableError};

/// Smallest number of rows a batch request may carry.
pub const MIN_BATCH_SIZE: usize = 1;

/// Largest number of rows a batch request may carry.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Errors aborting an ingestion request. Nothing is committed when one occurs.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    UnknownTable(#[from] UnknownTableError),

    #[error("Batch size must be between {MIN_BATCH_SIZE} and {MAX_BATCH_SIZE}, got {0}")]
    BatchSize(usize),

    #[error("file is not valid UTF-8: {0}")]
    Decode(#[from] Utf8Error),

    #[error("malformed CSV at row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: RowError,
    },

    #[error("failed to insert row {row}: {source}")]
    Insert {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Inserts every line of a headerless CSV file into `table_name`.
///
/// The first line is data like every other one. Blank lines are skipped and
/// quoted fields follow the usual CSV rules. All rows are inserted in one
/// transaction; returns how many were inserted.
pub async fn ingest_file(
    pool: &PgPool,
    table_name: &str,
    contents: &[u8],
) -> Result<usize, IngestError> {
    let table: Table = table_name.parse()?;
    let rows = parse_file(table, contents)?;

    insert_rows(pool, table, &rows).await
}

/// Inserts a batch of JSON objects into `table_name` in one transaction.
///
/// `hire_date` values are not parsed here; the database decides whether they
/// are acceptable timestamps.
pub async fn ingest_batch(
    pool: &PgPool,
    table_name: &str,
    batch: &[Map<String, Value>],
) -> Result<usize, IngestError> {
    let table: Table = table_name.parse()?;
    check_batch_size(batch.len())?;
    let rows = map_batch(table, batch)?;

    insert_rows(pool, table, &rows).await
}

pub fn check_batch_size(size: usize) -> Result<(), IngestError> {
    if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&size) {
        return Err(IngestError::BatchSize(size));
    }

    Ok(())
}

/// Decodes and maps a whole file before any row reaches the database.
pub fn parse_file(table: Table, contents: &[u8]) -> Result<Vec<InsertRow>, IngestError> {
    let text = std::str::from_utf8(contents)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = record.map_err(|source| IngestError::Csv { row, source })?;
        let mapped = CsvRow::new(table.columns(), &record)
            .and_then(|csv_row| table.map_row(&csv_row))
            .map_err(|source| IngestError::Row { row, source })?;
        rows.push(mapped);
    }

    Ok(rows)
}

pub fn map_batch(table: Table, batch: &[Map<String, Value>]) -> Result<Vec<InsertRow>, IngestError> {
    batch
        .iter()
        .enumerate()
        .map(|(index, object)| {
            table
                .map_row(&JsonRow(object))
                .map_err(|source| IngestError::Row {
                    row: index + 1,
                    source,
                })
        })
        .collect()
}

/// Inserts `rows` in a single transaction.
///
/// Returning early drops the transaction, which rolls every insert back.
async fn insert_rows(pool: &PgPool, table: Table, rows: &[InsertRow]) -> Result<usize, IngestError> {
    let mut tx = pool.begin().await?;

    for (index, row) in rows.iter().enumerate() {
        db::rows::insert_row(&mut *tx, row)
            .await
            .map_err(|source| IngestError::Insert {
                row: index + 1,
                source,
            })?;
    }

    tx.commit().await?;

    info!(%table, rows = rows.len(), "rows ingested");

    Ok(rows.len())
}
