use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json},
};
use sqlx::PgPool;
use thiserror::Error;

use crate::reports::{self, DepartmentHires, HireQuarters, ReportError};
use crate::routes::ErrorMessage;

#[derive(Debug, Error)]
#[error("Error retrieving data: {0}")]
pub struct MetricsError(#[from] ReportError);

impl ResponseError for MetricsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorMessage {
            error: self.to_string(),
        })
    }
}

#[utoipa::path(
    summary = "Hires per quarter",
    description = "Number of employees hired in 2021 for each department and job, \
        split by quarter and ordered by department then job.",
    responses(
        (status = 200, description = "Report computed", body = Vec<HireQuarters>),
        (status = 400, description = "The report could not be computed", body = ErrorMessage)
    ),
    tag = "Metrics"
)]
#[get("/metrics/employee-hire-quarters")]
pub async fn employee_hire_quarters(pool: Data<PgPool>) -> Result<impl Responder, MetricsError> {
    let report = reports::hire_quarters(&pool).await?;

    Ok(Json(report))
}

#[utoipa::path(
    summary = "Departments hiring above the mean",
    description = "Departments that hired more employees in 2021 than the mean over all \
        departments that hired at least one, ordered by hires descending.",
    responses(
        (status = 200, description = "Report computed", body = Vec<DepartmentHires>),
        (status = 400, description = "No hires in 2021 or the report could not be computed", body = ErrorMessage)
    ),
    tag = "Metrics"
)]
#[get("/metrics/departments-hired-above-average")]
pub async fn departments_hired_above_average(
    pool: Data<PgPool>,
) -> Result<impl Responder, MetricsError> {
    let report = reports::above_average_departments(&pool).await?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregate_is_a_bad_request() {
        let err = MetricsError::from(ReportError::EmptyAggregate(2021));

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Error retrieving data: no department hired employees in 2021, the average is undefined"
        );
    }
}
