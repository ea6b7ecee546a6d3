use sqlx::PgExecutor;

use crate::rows::{Department, Employee, HireDate, InsertRow, Job};

pub async fn insert_row<'c, E>(executor: E, row: &InsertRow) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'c>,
{
    match row {
        InsertRow::Department(department) => insert_department(executor, department).await,
        InsertRow::Job(job) => insert_job(executor, job).await,
        InsertRow::Employee(employee) => insert_employee(executor, employee).await,
    }
}

async fn insert_department<'c, E>(executor: E, department: &Department) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query(
        r#"
        insert into app.departments (id, name)
        values ($1, $2)
        "#,
    )
    .bind(department.id)
    .bind(department.name.as_str())
    .execute(executor)
    .await?;

    Ok(())
}

async fn insert_job<'c, E>(executor: E, job: &Job) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query(
        r#"
        insert into app.jobs (id, title)
        values ($1, $2)
        "#,
    )
    .bind(job.id)
    .bind(job.title.as_str())
    .execute(executor)
    .await?;

    Ok(())
}

async fn insert_employee<'c, E>(executor: E, employee: &Employee) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'c>,
{
    // Statements are cached by text, so each bound hire_date type has its own.
    let query = match &employee.hire_date {
        HireDate::Timestamp(timestamp) => sqlx::query(
            r#"
            insert into app.employees (id, name, hire_date, department_id, job_id)
            values ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(employee.id)
        .bind(employee.name.as_str())
        .bind(*timestamp),
        // Unvalidated hire dates are bound as text and cast by Postgres.
        HireDate::Unvalidated(raw) => sqlx::query(
            r#"
            insert into app.employees (id, name, hire_date, department_id, job_id)
            values ($1, $2, $3::text::timestamp, $4, $5)
            "#,
        )
        .bind(employee.id)
        .bind(employee.name.as_str())
        .bind(raw.as_deref()),
    };

    query
        .bind(employee.department_id)
        .bind(employee.job_id)
        .execute(executor)
        .await?;

    Ok(())
}
