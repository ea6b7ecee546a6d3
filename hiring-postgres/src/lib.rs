//! Postgres helpers shared by the hiring service and its tests.

pub mod sqlx;
