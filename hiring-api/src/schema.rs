use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::rows::{InsertRow, RowError, RowSource, map_department, map_employee, map_job};

/// One of the three tables rows can be ingested into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Departments,
    Jobs,
    Employees,
}

/// Registry entry describing how a [`Table`] is addressed and populated.
struct TableSchema {
    table: Table,
    name: &'static str,
    /// Column order, also the positional field order of CSV uploads.
    columns: &'static [&'static str],
    map_row: fn(&dyn RowSource) -> Result<InsertRow, RowError>,
}

/// Ordered by [`Table`] discriminant so a variant indexes its own entry.
static SCHEMAS: [TableSchema; 3] = [
    TableSchema {
        table: Table::Departments,
        name: "departments",
        columns: &["id", "name"],
        map_row: map_department,
    },
    TableSchema {
        table: Table::Jobs,
        name: "jobs",
        columns: &["id", "title"],
        map_row: map_job,
    },
    TableSchema {
        table: Table::Employees,
        name: "employees",
        columns: &["id", "name", "hire_date", "department_id", "job_id"],
        map_row: map_employee,
    },
];

#[derive(Debug, Error)]
#[error("Invalid table name: {0}")]
pub struct UnknownTableError(pub String);

impl Table {
    pub const ALL: [Table; 3] = [Table::Departments, Table::Jobs, Table::Employees];

    /// Looks a table up by the name used in request paths.
    pub fn from_name(name: &str) -> Option<Table> {
        SCHEMAS
            .iter()
            .find(|schema| schema.name == name)
            .map(|schema| schema.table)
    }

    pub fn name(self) -> &'static str {
        self.schema().name
    }

    pub fn columns(self) -> &'static [&'static str] {
        self.schema().columns
    }

    /// Maps one raw row into the insert payload of this table.
    pub fn map_row(self, row: &dyn RowSource) -> Result<InsertRow, RowError> {
        (self.schema().map_row)(row)
    }

    fn schema(self) -> &'static TableSchema {
        &SCHEMAS[self as usize]
    }
}

impl FromStr for Table {
    type Err = UnknownTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::from_name(s).ok_or_else(|| UnknownTableError(s.to_string()))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the ordered columns of the table called `table_name`, if it exists.
pub fn columns_for(table_name: &str) -> Option<&'static [&'static str]> {
    Table::from_name(table_name).map(Table::columns)
}
