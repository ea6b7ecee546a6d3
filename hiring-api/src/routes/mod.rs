use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api_docs;
pub mod health_check;
pub mod ingest;
pub mod metrics;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    #[schema(example = "Invalid table name: employee")]
    pub error: String,
}

/// Body of acknowledgement responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Data successfully uploaded to the jobs table.")]
    pub message: String,
}
