//! Cassandra/ScyllaDB schema helpers
//!
//! Thin helpers over the `scylla` driver (compatible with both Apache
//! Cassandra and ScyllaDB):
//!
//! - building a configured session ([`create_session`]),
//! - table and secondary index existence checks,
//! - creating secondary indexes when they are missing,
//! - truncating tables.
//!
//! Driver errors are returned unchanged inside [`CassandraError`].
//!
//! # Features
//!
//! - `config` - Load [`CassandraConfig`] with `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use cassandra_utils::{CassandraConfig, create_indexes, create_session, has_table};
//!
//! let config = CassandraConfig::with_keyspace(vec!["127.0.0.1"], "app")
//!     .with_request_timeout(10)
//!     .with_retries(3);
//! let session = create_session(&config).await?;
//!
//! if has_table(&session, "app", "users").await? {
//!     create_indexes(&session, "app", "users", &["email", "country"]).await?;
//! }
//! ```

mod config;
mod connector;
mod error;
mod identifier;
mod index;
mod retry;
mod table;

pub use config::{CassandraConfig, DEFAULT_CQL_PORT};
pub use connector::{CassandraSession, create_keyspace_if_not_exists, create_session, use_keyspace};
pub use error::{CassandraError, CassandraResult};
pub use identifier::{
    MAX_IDENTIFIER_LEN, validate_identifier, validate_schema_name, validate_table_ref,
};
pub use index::{
    create_index_if_not_exists, create_indexes, default_index_name, has_index, has_index_by_name,
};
pub use retry::{BoundedRetryPolicy, BoundedRetrySession, is_retryable};
pub use table::{has_table, truncate_table};

// Re-export scylla types for convenience
pub use scylla::client::session::Session;
