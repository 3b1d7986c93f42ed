//! Table helpers

use scylla::client::session::Session;
use tracing::{debug, info, instrument};

use crate::connector::idempotent_statement;
use crate::error::CassandraResult;
use crate::identifier::validate_table_ref;

const HAS_TABLE_QUERY: &str =
    "SELECT COUNT(table_name) FROM system_schema.tables WHERE keyspace_name = ? AND table_name = ?";

/// Check whether `keyspace.table` exists
///
/// A missing keyspace is not an error; the table is simply reported absent.
#[instrument(skip(session))]
pub async fn has_table(session: &Session, keyspace: &str, table: &str) -> CassandraResult<bool> {
    let (count,) = session
        .query_unpaged(idempotent_statement(HAS_TABLE_QUERY), (keyspace, table))
        .await?
        .into_rows_result()?
        .first_row::<(i64,)>()?;

    debug!(count, "Table lookup");
    Ok(count > 0)
}

/// Remove every row from `table`
///
/// `table` may be qualified (`keyspace.table`); otherwise the session's
/// current keyspace is used.
#[instrument(skip(session))]
pub async fn truncate_table(session: &Session, table: &str) -> CassandraResult<()> {
    let stmt = truncate_statement(table)?;
    session.query_unpaged(stmt, &[]).await?;

    info!("Truncated table '{}'", table);
    Ok(())
}

pub(crate) fn truncate_statement(table: &str) -> CassandraResult<String> {
    Ok(format!("TRUNCATE TABLE {}", validate_table_ref(table)?))
}
