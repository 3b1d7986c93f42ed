//! ScyllaDB test infrastructure
//!
//! Provides a `TestCassandra` helper that starts a ScyllaDB container for testing.
//! ScyllaDB speaks the same CQL protocol and exposes the same system tables as
//! Apache Cassandra, and starts considerably faster.

use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::scylladb::ScyllaDB;

/// Native CQL port inside the container
const CQL_PORT: u16 = 9042;

/// Test ScyllaDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestCassandra;
///
/// # async fn example() {
/// let cassandra = TestCassandra::new().await;
/// let contact_point = cassandra.contact_point();
/// // Build a session against `contact_point`
/// # }
/// ```
pub struct TestCassandra {
    #[allow(dead_code)]
    container: ContainerAsync<ScyllaDB>,
    pub contact_point: String,
}

impl TestCassandra {
    /// Start a new ScyllaDB container and wait until CQL is being served
    pub async fn new() -> Self {
        let container = ScyllaDB::default()
            .start()
            .await
            .expect("Failed to start ScyllaDB container");

        let host_port = container
            .get_host_port_ipv4(CQL_PORT)
            .await
            .expect("Failed to get ScyllaDB port");

        let contact_point = format!("127.0.0.1:{}", host_port);

        tracing::info!(port = host_port, "Test ScyllaDB ready");

        Self {
            container,
            contact_point,
        }
    }

    /// `host:port` to use as the session's contact point
    pub fn contact_point(&self) -> &str {
        &self.contact_point
    }
}

// Container is automatically cleaned up when TestCassandra is dropped
impl Drop for TestCassandra {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test ScyllaDB container");
    }
}
