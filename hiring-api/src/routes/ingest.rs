use actix_web::{
    HttpResponse, Responder, ResponseError,
    http::StatusCode,
    post,
    web::{Bytes, Data, Json, Path},
};
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;

use crate::ingest::{self, IngestError};
use crate::routes::{ErrorMessage, MessageResponse};

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Error processing file: {0}")]
    File(#[source] IngestError),

    #[error("Error processing batch: {0}")]
    Batch(#[source] IngestError),
}

impl IngestionError {
    pub fn to_message(&self) -> String {
        match self {
            // Rejections of the request itself are reported as they are
            IngestionError::File(e) | IngestionError::Batch(e)
                if matches!(e, IngestError::UnknownTable(_) | IngestError::BatchSize(_)) =>
            {
                e.to_string()
            }
            e => e.to_string(),
        }
    }
}

impl ResponseError for IngestionError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorMessage {
            error: self.to_message(),
        })
    }
}

#[utoipa::path(
    summary = "Upload a CSV file",
    description = "Inserts every line of a headerless CSV file into the table, in one transaction. \
        Columns follow the table order: departments (id, name), jobs (id, title), \
        employees (id, name, hire_date, department_id, job_id).",
    request_body(
        content = String,
        description = "Headerless CSV rows",
        content_type = "text/csv"
    ),
    params(
        ("table_name" = String, Path, description = "One of departments, jobs or employees")
    ),
    responses(
        (status = 200, description = "File inserted", body = MessageResponse),
        (status = 400, description = "Unknown table or invalid file, nothing was inserted", body = ErrorMessage)
    ),
    tag = "Ingestion"
)]
#[post("/upload/{table_name}")]
pub async fn upload_file(
    pool: Data<PgPool>,
    table_name: Path<String>,
    contents: Bytes,
) -> Result<impl Responder, IngestionError> {
    let table_name = table_name.into_inner();

    ingest::ingest_file(&pool, &table_name, &contents)
        .await
        .map_err(IngestionError::File)?;

    let response = MessageResponse {
        message: format!("Data successfully uploaded to the {table_name} table."),
    };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "Insert a batch of rows",
    description = "Inserts between 1 and 1000 JSON objects into the table, in one transaction. \
        Objects are keyed by column name.",
    params(
        ("table_name" = String, Path, description = "One of departments, jobs or employees")
    ),
    responses(
        (status = 200, description = "Batch inserted", body = MessageResponse),
        (status = 400, description = "Unknown table, bad batch size or invalid row, nothing was inserted", body = ErrorMessage)
    ),
    tag = "Ingestion"
)]
#[post("/batch-insert/{table_name}")]
pub async fn batch_insert(
    pool: Data<PgPool>,
    table_name: Path<String>,
    batch: Json<Vec<Map<String, Value>>>,
) -> Result<impl Responder, IngestionError> {
    let table_name = table_name.into_inner();
    let batch = batch.into_inner();

    ingest::ingest_batch(&pool, &table_name, &batch)
        .await
        .map_err(IngestionError::Batch)?;

    let response = MessageResponse {
        message: format!("Batch successfully inserted into the {table_name} table."),
    };

    Ok(Json(response))
}
