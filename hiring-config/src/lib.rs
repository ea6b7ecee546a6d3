//! Configuration loading and shared configuration types for the hiring service.

mod environment;
mod load;
pub mod shared;

pub use environment::{Environment, UnknownEnvironmentError};
pub use load::{LoadConfigError, load_config};
