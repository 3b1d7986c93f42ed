//! Secondary index helpers
//!
//! Index presence is looked up by name in `system."IndexInfo"`. Indexes are
//! created unnamed, so Cassandra names them `{table}_{column}_idx`, which is
//! what [`default_index_name`] returns.

use scylla::client::session::Session;
use tracing::{debug, info, instrument};

use crate::connector::idempotent_statement;
use crate::error::CassandraResult;
use crate::identifier::{validate_identifier, validate_schema_name};

const HAS_INDEX_QUERY: &str =
    r#"SELECT COUNT(*) FROM system."IndexInfo" WHERE table_name = ? AND index_name = ? LIMIT 1"#;

/// Name Cassandra gives an unnamed index on `table(column)`
///
/// ```
/// assert_eq!(cassandra_utils::default_index_name("table", "column"), "table_column_idx");
/// ```
pub fn default_index_name(table: &str, column: &str) -> String {
    format!("{}_{}_idx", table, column)
}

/// Check whether an index named `index_name` exists in `keyspace`
#[instrument(skip(session))]
pub async fn has_index_by_name(
    session: &Session,
    keyspace: &str,
    index_name: &str,
) -> CassandraResult<bool> {
    let (count,) = session
        .query_unpaged(idempotent_statement(HAS_INDEX_QUERY), (keyspace, index_name))
        .await?
        .into_rows_result()?
        .first_row::<(i64,)>()?;

    debug!(count, "Index lookup");
    Ok(count > 0)
}

/// Check whether the default-named index on `table(column)` exists
pub async fn has_index(
    session: &Session,
    keyspace: &str,
    table: &str,
    column: &str,
) -> CassandraResult<bool> {
    has_index_by_name(session, keyspace, &default_index_name(table, column)).await
}

/// Create an index on `keyspace.table(column)` unless it already exists
///
/// Returns `true` when the index was created, `false` when it was already
/// there. The check and the `CREATE INDEX` are separate requests, so two
/// callers racing on the same column can both see it missing; the loser then
/// gets the driver's "index already exists" error.
#[instrument(skip(session))]
pub async fn create_index_if_not_exists(
    session: &Session,
    keyspace: &str,
    table: &str,
    column: &str,
) -> CassandraResult<bool> {
    let stmt = create_index_statement(keyspace, table, column)?;

    if has_index(session, keyspace, table, column).await? {
        debug!("Index already exists");
        return Ok(false);
    }

    session.query_unpaged(stmt, &[]).await?;

    info!(
        index = %default_index_name(table, column),
        "Created index on {}.{}({})", keyspace, table, column
    );
    Ok(true)
}

/// Create indexes on each of `columns`, in order
///
/// Stops at the first failure and returns it. Columns that already have an
/// index are skipped. Returns `true` once every column has been handled.
pub async fn create_indexes<S: AsRef<str>>(
    session: &Session,
    keyspace: &str,
    table: &str,
    columns: &[S],
) -> CassandraResult<bool> {
    for column in columns {
        create_index_if_not_exists(session, keyspace, table, column.as_ref()).await?;
    }
    Ok(true)
}

pub(crate) fn create_index_statement(
    keyspace: &str,
    table: &str,
    column: &str,
) -> CassandraResult<String> {
    Ok(format!(
        "CREATE INDEX ON {}.{}({})",
        validate_schema_name(keyspace)?,
        validate_schema_name(table)?,
        validate_identifier(column)?
    ))
}
