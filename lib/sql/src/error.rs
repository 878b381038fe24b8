use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    /// Whether this error was caused by a UNIQUE constraint violation.
    ///
    /// Services translate these into "already exists" outcomes instead of
    /// surfacing a raw storage failure.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            SQLError::Query(m) | SQLError::Execution(m) | SQLError::Connection(m) => {
                m.contains("UNIQUE constraint")
            }
        }
    }
}
