pub mod config;
pub mod db;
pub mod ingest;
pub mod reports;
pub mod routes;
pub mod rows;
pub mod schema;
pub mod startup;
