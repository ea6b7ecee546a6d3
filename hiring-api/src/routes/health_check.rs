use actix_web::{Responder, get, web::Json};

use crate::routes::MessageResponse;

#[utoipa::path(
    summary = "Liveness probe",
    responses(
        (status = 200, description = "The API is up", body = MessageResponse)
    ),
    tag = "Health"
)]
#[get("/")]
pub async fn health_check() -> impl Responder {
    Json(MessageResponse {
        message: "API is working!".to_string(),
    })
}
