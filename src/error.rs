use thiserror::Error;

/// Every failure the tune command can surface. Driver and HTTP errors are
/// flattened into their message at the boundary; nothing here is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TuneError {
    #[error("Failed to resolve connection settings: {0}")]
    ConfigResolution(String),

    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Missing index query failed: {0}")]
    Query(String),

    #[error("Failed to execute CREATE INDEX statements: {0}")]
    Apply(String),
}

impl TuneError {
    pub fn exit_code(&self) -> i32 {
        match self {
            TuneError::ConfigResolution(_) => 2,
            TuneError::Connection(_) => 3,
            TuneError::Query(_) => 4,
            TuneError::Apply(_) => 5,
        }
    }
}
