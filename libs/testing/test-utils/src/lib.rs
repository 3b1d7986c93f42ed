//! Shared test utilities
//!
//! - `TestCassandra`: ScyllaDB container with automatic cleanup (feature: "cassandra")
//! - `TestDataBuilder`: deterministic, CQL-safe names for per-test tables (always available)
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{TestCassandra, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_cassandra_test() {
//!     let cassandra = TestCassandra::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_cassandra_test");
//!
//!     let table = builder.table_name("users");
//!     // CREATE TABLE {table} ... against cassandra.contact_point()
//! }
//! ```

#[cfg(feature = "cassandra")]
mod cassandra;

#[cfg(feature = "cassandra")]
pub use cassandra::TestCassandra;

/// Builder for test data with deterministic names
///
/// Tests sharing one database get distinct tables and keyspaces, and reruns of
/// the same test reuse the same names.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_truncate_table");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Table name unique to this builder's seed
    ///
    /// Always a valid unquoted CQL identifier for suffixes of up to 29
    /// alphanumeric/underscore characters.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let name = TestDataBuilder::new(255).table_name("users");
    /// assert_eq!(name, "t_00000000000000ff_users");
    /// ```
    pub fn table_name(&self, suffix: &str) -> String {
        format!("t_{:016x}_{}", self.seed, suffix)
    }

    /// Keyspace name unique to this builder's seed
    pub fn keyspace_name(&self) -> String {
        format!("ks_{:016x}", self.seed)
    }
}
