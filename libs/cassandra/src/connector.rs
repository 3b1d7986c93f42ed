use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::{Consistency, Statement};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::CassandraConfig;
use crate::error::CassandraResult;
use crate::identifier::validate_schema_name;
use crate::retry::BoundedRetryPolicy;

/// Shared driver session
pub type CassandraSession = Arc<Session>;

/// Build a driver session from a [`CassandraConfig`]
///
/// Every request made through the session defaults to consistency `ONE`,
/// the configured request timeout and a [`BoundedRetryPolicy`] with the
/// configured number of retries.
///
/// # Example
/// ```ignore
/// use cassandra_utils::{CassandraConfig, create_session};
///
/// let config = CassandraConfig::with_keyspace(vec!["127.0.0.1"], "app");
/// let session = create_session(&config).await?;
/// ```
#[instrument(skip_all, fields(keyspace = config.keyspace()))]
pub async fn create_session(config: &CassandraConfig) -> CassandraResult<CassandraSession> {
    let nodes = config.known_nodes();
    info!("Attempting to connect to Cassandra at {:?}", nodes);

    let profile = ExecutionProfile::builder()
        .consistency(Consistency::One)
        .request_timeout(Some(Duration::from_secs(config.request_timeout_secs)))
        .retry_policy(Arc::new(BoundedRetryPolicy::new(config.retries)))
        .build();

    let mut builder = SessionBuilder::new()
        .known_nodes(&nodes)
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .default_execution_profile_handle(profile.into_handle());

    if let Some((username, password)) = config.credentials() {
        builder = builder.user(username, password);
    }

    if let Some(keyspace) = config.keyspace() {
        builder = builder.use_keyspace(keyspace, true);
    }

    let session: Session = builder.build().await?;

    info!("Successfully connected to Cassandra");
    Ok(Arc::new(session))
}

/// Create a keyspace with `SimpleStrategy` replication if it doesn't exist
#[instrument(skip(session))]
pub async fn create_keyspace_if_not_exists(
    session: &Session,
    keyspace: &str,
    replication_factor: u32,
) -> CassandraResult<()> {
    let stmt = create_keyspace_statement(keyspace, replication_factor)?;
    session.query_unpaged(stmt, &[]).await?;

    info!("Keyspace '{}' ready", keyspace);
    Ok(())
}

/// Switch the session to another keyspace
#[instrument(skip(session))]
pub async fn use_keyspace(session: &Session, keyspace: &str) -> CassandraResult<()> {
    session.use_keyspace(keyspace, true).await?;

    info!("Using keyspace '{}'", keyspace);
    Ok(())
}

/// Unprepared statement marked idempotent, so the retry policy may resend it
pub(crate) fn idempotent_statement(cql: &str) -> Statement {
    let mut statement = Statement::new(cql);
    statement.set_is_idempotent(true);
    statement
}

pub(crate) fn create_keyspace_statement(
    keyspace: &str,
    replication_factor: u32,
) -> CassandraResult<String> {
    let keyspace = validate_schema_name(keyspace)?;
    Ok(format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    ))
}
