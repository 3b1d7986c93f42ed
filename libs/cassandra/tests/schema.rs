//! Schema helper tests against a real ScyllaDB container.
//!
//! One container is shared by all checks; each check works on its own
//! tables so they do not interfere.
//!
//! Run with `cargo test -p cassandra_utils -- --ignored` (requires docker).

use std::time::Duration;

use cassandra_utils::{
    CassandraConfig, CassandraError, Session, create_index_if_not_exists, create_indexes,
    create_keyspace_if_not_exists, create_session, default_index_name, has_index,
    has_index_by_name, has_table, truncate_table, use_keyspace,
};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use test_utils::{TestCassandra, TestDataBuilder};

async fn exec(session: &Session, stmt: String) {
    session
        .query_unpaged(stmt.clone(), &[])
        .await
        .unwrap_or_else(|e| panic!("{stmt} failed: {e}"));
}

async fn count_rows(session: &Session, table: &str) -> i64 {
    let (count,) = session
        .query_unpaged(format!("SELECT COUNT(id) FROM {table}"), &[])
        .await
        .unwrap()
        .into_rows_result()
        .unwrap()
        .first_row::<(i64,)>()
        .unwrap();
    count
}

/// Indexes show up in `system."IndexInfo"` once built, which is asynchronous.
async fn wait_for_index(session: &Session, keyspace: &str, table: &str, column: &str) -> bool {
    for _ in 0..60 {
        if has_index(session, keyspace, table, column).await.unwrap() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    false
}

async fn check_has_table(session: &Session, keyspace: &str, builder: &TestDataBuilder) {
    let table = builder.table_name("has_table");
    exec(session, format!("DROP TABLE IF EXISTS {table}")).await;
    exec(
        session,
        format!("CREATE TABLE {table} (id int PRIMARY KEY, name text)"),
    )
    .await;

    assert!(has_table(session, keyspace, &table).await.unwrap());
    assert!(!has_table(session, keyspace, "no_exists_table").await.unwrap());
    assert!(
        !has_table(session, "no_exists_keyspace", "no_exists_table")
            .await
            .unwrap()
    );

    exec(session, format!("DROP TABLE {table}")).await;
    assert!(!has_table(session, keyspace, &table).await.unwrap());
}

async fn check_missing_index(session: &Session, keyspace: &str) {
    let by_name = has_index_by_name(session, keyspace, &default_index_name("test", "test"))
        .await
        .unwrap();
    assert!(!by_name);

    assert!(!has_index(session, keyspace, "test", "test").await.unwrap());
}

async fn check_create_index_if_not_exists(
    session: &Session,
    keyspace: &str,
    builder: &TestDataBuilder,
) {
    let table = builder.table_name("create_index");
    exec(session, format!("DROP TABLE IF EXISTS {table}")).await;
    exec(
        session,
        format!("CREATE TABLE {table} (id int PRIMARY KEY, name text)"),
    )
    .await;

    let created = create_index_if_not_exists(session, keyspace, &table, "name")
        .await
        .unwrap();
    assert!(created);
    assert!(wait_for_index(session, keyspace, &table, "name").await);

    let created_again = create_index_if_not_exists(session, keyspace, &table, "name")
        .await
        .unwrap();
    assert!(!created_again);

    let invalid = create_index_if_not_exists(session, keyspace, &table, "non-exists").await;
    assert!(matches!(invalid, Err(CassandraError::InvalidIdentifier(_))));

    exec(session, format!("DROP TABLE {table}")).await;
}

async fn check_create_indexes(session: &Session, keyspace: &str, builder: &TestDataBuilder) {
    let table = builder.table_name("create_indexes");
    exec(session, format!("DROP TABLE IF EXISTS {table}")).await;
    exec(
        session,
        format!("CREATE TABLE {table} (id int PRIMARY KEY, name text, age int)"),
    )
    .await;

    let created = create_indexes(session, keyspace, &table, &["name", "age"])
        .await
        .unwrap();
    assert!(created);

    assert!(wait_for_index(session, keyspace, &table, "name").await);
    assert!(wait_for_index(session, keyspace, &table, "age").await);
    assert!(!has_index(session, keyspace, &table, "non-exists").await.unwrap());

    // Every index already exists; nothing to do but still reports success
    let again = create_indexes(session, keyspace, &table, &["name", "age"])
        .await
        .unwrap();
    assert!(again);

    // Unknown column: the driver error comes back unchanged
    let result = create_indexes(session, keyspace, &table, &["missing_column"]).await;
    assert!(matches!(result, Err(CassandraError::Execution(_))));

    exec(session, format!("DROP TABLE {table}")).await;
}

async fn check_create_indexes_stops_at_first_error(
    session: &Session,
    keyspace: &str,
    builder: &TestDataBuilder,
) {
    let table = builder.table_name("indexes_first_error");
    exec(session, format!("DROP TABLE IF EXISTS {table}")).await;
    exec(
        session,
        format!("CREATE TABLE {table} (id int PRIMARY KEY, name text)"),
    )
    .await;

    let result = create_indexes(session, keyspace, &table, &["missing_column", "name"]).await;
    assert!(matches!(result, Err(CassandraError::Execution(_))));

    // Index builds are asynchronous; wait before asserting absence
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!has_index(session, keyspace, &table, "name").await.unwrap());

    exec(session, format!("DROP TABLE {table}")).await;
}

async fn check_truncate_table(session: &Session, builder: &TestDataBuilder) {
    let n: i32 = 10;
    let table = builder.table_name("truncate");
    exec(session, format!("DROP TABLE IF EXISTS {table}")).await;
    exec(session, format!("CREATE TABLE {table} (id int PRIMARY KEY)")).await;

    for i in 0..n {
        session
            .query_unpaged(format!("INSERT INTO {table}(id) VALUES (?)"), (i,))
            .await
            .unwrap();
    }
    assert_eq!(count_rows(session, &table).await, i64::from(n));

    truncate_table(session, &table).await.unwrap();
    assert_eq!(count_rows(session, &table).await, 0);

    let missing = truncate_table(session, "no_exists_table").await;
    assert!(matches!(missing, Err(CassandraError::Execution(_))));

    exec(session, format!("DROP TABLE {table}")).await;
}

#[tokio::test]
#[ignore] // Requires docker
async fn test_schema_helpers() {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cassandra = TestCassandra::new().await;
    let builder = TestDataBuilder::from_test_name("test_schema_helpers");
    let keyspace = builder.keyspace_name();

    let admin = create_session(&CassandraConfig::new(vec![cassandra.contact_point()]))
        .await
        .expect("Failed to connect");
    create_keyspace_if_not_exists(&admin, &keyspace, 1)
        .await
        .unwrap();

    let config = CassandraConfig::with_keyspace(vec![cassandra.contact_point()], &keyspace)
        .with_request_timeout(30)
        .with_retries(3);
    let session = create_session(&config).await.expect("Failed to connect");

    check_has_table(&session, &keyspace, &builder).await;
    check_missing_index(&session, &keyspace).await;
    check_create_index_if_not_exists(&session, &keyspace, &builder).await;
    check_create_indexes(&session, &keyspace, &builder).await;
    check_create_indexes_stops_at_first_error(&session, &keyspace, &builder).await;
    check_truncate_table(&session, &builder).await;

    // A session without a keyspace can be switched to one
    use_keyspace(&admin, &keyspace).await.unwrap();
    let table = builder.table_name("switched");
    exec(&admin, format!("CREATE TABLE {table} (id int PRIMARY KEY)")).await;
    assert!(has_table(&session, &keyspace, &table).await.unwrap());
    exec(&admin, format!("DROP TABLE {table}")).await;
}

#[tokio::test]
#[ignore] // Requires docker
async fn test_create_session_with_unknown_keyspace_fails() {
    let cassandra = TestCassandra::new().await;
    let config = CassandraConfig::with_keyspace(vec![cassandra.contact_point()], "no_such_keyspace")
        .with_retries(0);

    let result = create_session(&config).await;
    assert!(matches!(result, Err(CassandraError::Session(_))));
}
