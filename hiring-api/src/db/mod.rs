pub mod reports;
pub mod rows;
