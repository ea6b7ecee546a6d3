use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("unsupported environment `{0}`, expected `dev` or `prod`")]
pub struct UnknownEnvironmentError(pub String);

/// Deployment the service runs in, read from `APP_ENVIRONMENT`.
///
/// Picks the configuration file layered over `base` and the log format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    pub const VARIABLE: &'static str = "APP_ENVIRONMENT";

    /// Environment of the current process. An unset variable means [`Environment::Dev`].
    pub fn current() -> Result<Environment, UnknownEnvironmentError> {
        std::env::var(Self::VARIABLE).map_or(Ok(Environment::default()), |name| name.parse())
    }

    /// Stem of the configuration file holding this environment's overrides.
    pub fn file_stem(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    pub fn emits_json_logs(self) -> bool {
        matches!(self, Environment::Prod)
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironmentError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        [Environment::Dev, Environment::Prod]
            .into_iter()
            .find(|environment| environment.file_stem().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownEnvironmentError(name.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}
