use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

use crate::db;

/// Calendar year both reports are computed for.
pub const REPORT_YEAR: i32 = 2021;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no department hired employees in {0}, the average is undefined")]
    EmptyAggregate(i32),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Hires of one department and job pair, per quarter of the report year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct HireQuarters {
    #[schema(example = "Staff")]
    pub department: String,
    #[schema(example = "Recruiter")]
    pub job: String,
    #[serde(rename = "Q1")]
    pub q1: i64,
    #[serde(rename = "Q2")]
    pub q2: i64,
    #[serde(rename = "Q3")]
    pub q3: i64,
    #[serde(rename = "Q4")]
    pub q4: i64,
}

/// Number of employees a department hired in the report year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DepartmentHires {
    #[schema(example = 7)]
    pub id: i64,
    #[schema(example = "Staff")]
    pub department: String,
    #[schema(example = 45)]
    pub hired: i64,
}

/// Hires of [`REPORT_YEAR`] per department and job, ordered by department then job.
pub async fn hire_quarters(pool: &PgPool) -> Result<Vec<HireQuarters>, ReportError> {
    let report = db::reports::read_hire_quarters(pool, REPORT_YEAR).await?;
    info!(year = REPORT_YEAR, rows = report.len(), "computed hire quarters report");

    Ok(report)
}

/// Departments that hired more than the mean in [`REPORT_YEAR`], most hires first.
pub async fn above_average_departments(
    pool: &PgPool,
) -> Result<Vec<DepartmentHires>, ReportError> {
    let hires = db::reports::read_department_hires(pool, REPORT_YEAR).await?;
    let departments = hires.len();
    let above_average = select_above_average(hires, REPORT_YEAR)?;
    info!(
        year = REPORT_YEAR,
        departments,
        above_average = above_average.len(),
        "computed above average hiring report"
    );

    Ok(above_average)
}

/// Keeps departments whose hire count strictly exceeds the mean of `hires`.
///
/// The mean is taken over the given departments only, so departments without
/// hires must not be part of `hires`. The result is sorted by descending hire
/// count; the sort is stable, equal counts keep their input order.
pub fn select_above_average(
    hires: Vec<DepartmentHires>,
    year: i32,
) -> Result<Vec<DepartmentHires>, ReportError> {
    if hires.is_empty() {
        return Err(ReportError::EmptyAggregate(year));
    }

    // hired > total / n  <=>  hired * n > total, which avoids float rounding.
    let departments = hires.len() as i128;
    let total: i128 = hires.iter().map(|d| i128::from(d.hired)).sum();

    let mut above_average: Vec<DepartmentHires> = hires
        .into_iter()
        .filter(|d| i128::from(d.hired) * departments > total)
        .collect();
    above_average.sort_by(|a, b| b.hired.cmp(&a.hired));

    Ok(above_average)
}
