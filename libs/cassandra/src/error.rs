use scylla::errors::{ExecutionError, NewSessionError, UseKeyspaceError};
use scylla::response::query_result::{FirstRowError, IntoRowsResultError};

/// Error type for Cassandra operations
///
/// Driver errors are carried unchanged; nothing here retries or reclassifies them.
#[derive(Debug, thiserror::Error)]
pub enum CassandraError {
    #[error("Session error: {0}")]
    Session(#[from] NewSessionError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Result is not a rows result: {0}")]
    IntoRows(#[from] IntoRowsResultError),

    #[error("Failed to read first row: {0}")]
    FirstRow(#[from] FirstRowError),

    #[error("Keyspace error: {0}")]
    UseKeyspace(#[from] UseKeyspaceError),

    #[error("Invalid CQL identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Result type alias for Cassandra operations
pub type CassandraResult<T> = Result<T, CassandraError>;
