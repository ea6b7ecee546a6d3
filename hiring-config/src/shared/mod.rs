//! Configuration types shared by the service and its tests.

mod connection;

pub use connection::{
    API_CONNECTION_OPTIONS, IntoConnectOptions, MIGRATION_CONNECTION_OPTIONS, PgConnectionConfig,
    PgConnectionOptions, TlsConfig,
};
