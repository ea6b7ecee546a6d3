use chrono::NaiveDateTime;
use csv::StringRecord;
use serde_json::{Map, Value};
use thiserror::Error;

/// Format accepted for `hire_date` in uploaded files, e.g. `2021-07-27T16:02:08Z`.
pub const HIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid integer {value:?} for field `{column}`")]
    InvalidInteger { column: &'static str, value: String },

    #[error("expected a string for field `{column}`, got {value}")]
    InvalidText { column: &'static str, value: String },

    #[error("invalid hire_date {value:?}, expected the format YYYY-MM-DDTHH:MM:SSZ")]
    InvalidHireDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("expected {expected} fields, found {found}")]
    UnexpectedFieldCount { expected: usize, found: usize },
}

/// A single row of raw values addressed by column name.
pub trait RowSource {
    fn integer(&self, column: &'static str) -> Result<i64, RowError>;

    fn text(&self, column: &'static str) -> Result<String, RowError>;

    fn hire_date(&self, column: &'static str) -> Result<HireDate, RowError>;
}

/// Value written into `employees.hire_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HireDate {
    /// Parsed from an uploaded file. `None` for an empty field.
    Timestamp(Option<NaiveDateTime>),
    /// Handed over by a batch request as is, the database casts it.
    Unvalidated(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub hire_date: HireDate,
    pub department_id: i64,
    pub job_id: i64,
}

/// A validated row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertRow {
    Department(Department),
    Job(Job),
    Employee(Employee),
}

pub fn map_department(row: &dyn RowSource) -> Result<InsertRow, RowError> {
    Ok(InsertRow::Department(Department {
        id: row.integer("id")?,
        name: row.text("name")?,
    }))
}

pub fn map_job(row: &dyn RowSource) -> Result<InsertRow, RowError> {
    Ok(InsertRow::Job(Job {
        id: row.integer("id")?,
        title: row.text("title")?,
    }))
}

pub fn map_employee(row: &dyn RowSource) -> Result<InsertRow, RowError> {
    Ok(InsertRow::Employee(Employee {
        id: row.integer("id")?,
        name: row.text("name")?,
        hire_date: row.hire_date("hire_date")?,
        department_id: row.integer("department_id")?,
        job_id: row.integer("job_id")?,
    }))
}

/// A headerless CSV record whose fields follow the table's column order.
///
/// Integer fields are trimmed before parsing while text fields are stored
/// exactly as written, surrounding whitespace included.
pub struct CsvRow<'a> {
    columns: &'static [&'static str],
    record: &'a StringRecord,
}

impl<'a> CsvRow<'a> {
    /// Wraps `record`, rejecting records with more fields than `columns`.
    ///
    /// Short records are accepted here and fail on the first absent column.
    pub fn new(
        columns: &'static [&'static str],
        record: &'a StringRecord,
    ) -> Result<Self, RowError> {
        if record.len() > columns.len() {
            return Err(RowError::UnexpectedFieldCount {
                expected: columns.len(),
                found: record.len(),
            });
        }

        Ok(Self { columns, record })
    }

    fn field(&self, column: &'static str) -> Result<&'a str, RowError> {
        self.columns
            .iter()
            .position(|candidate| *candidate == column)
            .and_then(|index| self.record.get(index))
            .ok_or(RowError::MissingField(column))
    }
}

impl RowSource for CsvRow<'_> {
    fn integer(&self, column: &'static str) -> Result<i64, RowError> {
        parse_integer(column, self.field(column)?)
    }

    fn text(&self, column: &'static str) -> Result<String, RowError> {
        self.field(column).map(str::to_string)
    }

    fn hire_date(&self, column: &'static str) -> Result<HireDate, RowError> {
        let value = self.field(column)?;
        if value.is_empty() {
            return Ok(HireDate::Timestamp(None));
        }

        NaiveDateTime::parse_from_str(value, HIRE_DATE_FORMAT)
            .map(|timestamp| HireDate::Timestamp(Some(timestamp)))
            .map_err(|source| RowError::InvalidHireDate {
                value: value.to_string(),
                source,
            })
    }
}

/// A JSON object from a batch request, fields addressed by key.
pub struct JsonRow<'a>(pub &'a Map<String, Value>);

impl JsonRow<'_> {
    /// Returns the value of `column`, treating `null` as absent.
    fn required(&self, column: &'static str) -> Result<&Value, RowError> {
        match self.0.get(column) {
            None | Some(Value::Null) => Err(RowError::MissingField(column)),
            Some(value) => Ok(value),
        }
    }
}

impl RowSource for JsonRow<'_> {
    fn integer(&self, column: &'static str) -> Result<i64, RowError> {
        match self.required(column)? {
            Value::Number(number) => number.as_i64().ok_or_else(|| RowError::InvalidInteger {
                column,
                value: number.to_string(),
            }),
            Value::String(value) => parse_integer(column, value),
            other => Err(RowError::InvalidInteger {
                column,
                value: other.to_string(),
            }),
        }
    }

    fn text(&self, column: &'static str) -> Result<String, RowError> {
        match self.required(column)? {
            Value::String(value) => Ok(value.clone()),
            other => Err(RowError::InvalidText {
                column,
                value: other.to_string(),
            }),
        }
    }

    fn hire_date(&self, column: &'static str) -> Result<HireDate, RowError> {
        let raw = match self.0.get(column) {
            None => return Err(RowError::MissingField(column)),
            Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(other) => Some(other.to_string()),
        };

        Ok(HireDate::Unvalidated(raw))
    }
}

fn parse_integer(column: &'static str, value: &str) -> Result<i64, RowError> {
    value
        .trim()
        .parse()
        .map_err(|_| RowError::InvalidInteger {
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::schema::Table;

    fn map_csv(table: Table, fields: &[&str]) -> Result<InsertRow, RowError> {
        let record = StringRecord::from(fields.to_vec());
        let row = CsvRow::new(table.columns(), &record)?;
        table.map_row(&row)
    }

    fn map_json(table: Table, value: Value) -> Result<InsertRow, RowError> {
        let Value::Object(object) = value else {
            panic!("expected a json object");
        };
        table.map_row(&JsonRow(&object))
    }

    #[test]
    fn csv_employee_parses_hire_date() {
        let row = map_csv(
            Table::Employees,
            &["4535", "Marcelo Gonzalez", "2021-07-27T16:02:08Z", "1", "2"],
        )
        .unwrap();

        let expected_hire_date = NaiveDate::from_ymd_opt(2021, 7, 27)
            .unwrap()
            .and_hms_opt(16, 2, 8)
            .unwrap();
        assert_eq!(
            row,
            InsertRow::Employee(Employee {
                id: 4535,
                name: "Marcelo Gonzalez".to_string(),
                hire_date: HireDate::Timestamp(Some(expected_hire_date)),
                department_id: 1,
                job_id: 2,
            })
        );
    }

    #[test]
    fn csv_empty_hire_date_maps_to_null() {
        let row = map_csv(Table::Employees, &["1", "Ana", "", "1", "2"]).unwrap();

        let InsertRow::Employee(employee) = row else {
            panic!("expected an employee row");
        };
        assert_eq!(employee.hire_date, HireDate::Timestamp(None));
    }

    #[test]
    fn csv_malformed_hire_date_is_rejected() {
        for hire_date in ["2021-07-27", "2021-07-27 16:02:08", "2021-13-01T00:00:00Z", "yesterday"] {
            let err = map_csv(Table::Employees, &["1", "Ana", hire_date, "1", "2"]).unwrap_err();
            assert!(
                matches!(&err, RowError::InvalidHireDate { value, .. } if value == hire_date),
                "unexpected error for {hire_date}: {err}"
            );
        }
    }

    #[test]
    fn csv_short_record_reports_first_missing_column() {
        let err = map_csv(Table::Employees, &["1", "Ana", "2021-01-01T00:00:00Z", "1"]).unwrap_err();
        assert!(matches!(err, RowError::MissingField("job_id")));

        let err = map_csv(Table::Jobs, &["7"]).unwrap_err();
        assert!(matches!(err, RowError::MissingField("title")));
    }

    #[test]
    fn csv_long_record_is_rejected() {
        let err = map_csv(Table::Departments, &["1", "Sales", "extra"]).unwrap_err();
        assert!(matches!(
            err,
            RowError::UnexpectedFieldCount {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn csv_header_line_is_not_skipped() {
        // The first line of an upload is data, so a header fails to parse.
        let err = map_csv(Table::Departments, &["id", "name"]).unwrap_err();
        assert!(matches!(err, RowError::InvalidInteger { column: "id", .. }));
    }

    #[test]
    fn csv_departments_and_jobs_pass_text_through() {
        assert_eq!(
            map_csv(Table::Departments, &["1", " Supply Chain "]).unwrap(),
            InsertRow::Department(Department {
                id: 1,
                name: " Supply Chain ".to_string(),
            })
        );
        assert_eq!(
            map_csv(Table::Jobs, &[" 12 ", "Recruiter"]).unwrap(),
            InsertRow::Job(Job {
                id: 12,
                title: "Recruiter".to_string(),
            })
        );
    }

    #[test]
    fn json_rows_accept_integers_as_numbers_or_strings() {
        let row = map_json(Table::Jobs, json!({"id": "3", "title": "Analyst"})).unwrap();
        assert_eq!(
            row,
            InsertRow::Job(Job {
                id: 3,
                title: "Analyst".to_string(),
            })
        );

        let err = map_json(Table::Jobs, json!({"id": 3.5, "title": "Analyst"})).unwrap_err();
        assert!(matches!(err, RowError::InvalidInteger { column: "id", .. }));

        let err = map_json(Table::Departments, json!({"id": 1, "name": 42})).unwrap_err();
        assert!(matches!(err, RowError::InvalidText { column: "name", .. }));
    }

    #[test]
    fn json_hire_date_is_passed_through_unvalidated() {
        let row = map_json(
            Table::Employees,
            json!({
                "id": 1,
                "name": "Ana",
                "hire_date": "not a date",
                "department_id": 1,
                "job_id": 2
            }),
        )
        .unwrap();

        let InsertRow::Employee(employee) = row else {
            panic!("expected an employee row");
        };
        assert_eq!(
            employee.hire_date,
            HireDate::Unvalidated(Some("not a date".to_string()))
        );
    }

    #[test]
    fn json_missing_or_null_fields_are_missing() {
        let err = map_json(
            Table::Employees,
            json!({
                "id": 1,
                "name": "Ana",
                "hire_date": "2021-05-15T00:00:00Z",
                "department_id": 1
            }),
        )
        .unwrap_err();
        assert!(matches!(err, RowError::MissingField("job_id")));

        let err = map_json(Table::Departments, json!({"id": null, "name": "Sales"})).unwrap_err();
        assert!(matches!(err, RowError::MissingField("id")));

        let err = map_json(
            Table::Employees,
            json!({"id": 1, "name": "Ana", "department_id": 1, "job_id": 2}),
        )
        .unwrap_err();
        assert!(matches!(err, RowError::MissingField("hire_date")));
    }
}
