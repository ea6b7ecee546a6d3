use sqlx::PgExecutor;

use crate::reports::{DepartmentHires, HireQuarters};

/// Counts hires in `year` per department and job, bucketed by quarter.
///
/// Employees whose department or job does not exist are dropped by the joins.
pub async fn read_hire_quarters<'c, E>(executor: E, year: i32) -> Result<Vec<HireQuarters>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, HireQuarters>(
        r#"
        select d.name as department,
               j.title as job,
               count(*) filter (where extract(quarter from e.hire_date) = 1) as q1,
               count(*) filter (where extract(quarter from e.hire_date) = 2) as q2,
               count(*) filter (where extract(quarter from e.hire_date) = 3) as q3,
               count(*) filter (where extract(quarter from e.hire_date) = 4) as q4
        from app.employees e
        join app.departments d on e.department_id = d.id
        join app.jobs j on e.job_id = j.id
        where extract(year from e.hire_date) = $1
        group by d.name, j.title
        order by d.name, j.title
        "#,
    )
    .bind(year)
    .fetch_all(executor)
    .await
}

/// Counts hires in `year` per department id that hired at least once that year.
///
/// Ids are not unique: rows sharing an id form one department named after the
/// smallest of their names, and each employee is counted once.
pub async fn read_department_hires<'c, E>(
    executor: E,
    year: i32,
) -> Result<Vec<DepartmentHires>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, DepartmentHires>(
        r#"
        select d.id,
               d.department,
               h.hired
        from (
            select department_id, count(*) as hired
            from app.employees
            where extract(year from hire_date) = $1
            group by department_id
        ) h
        join (
            select id, min(name) as department
            from app.departments
            group by id
        ) d on d.id = h.department_id
        order by d.id
        "#,
    )
    .bind(year)
    .fetch_all(executor)
    .await
}
