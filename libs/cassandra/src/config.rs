#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_list, env_optional, env_parse};

/// Port appended to contact points given without one
pub const DEFAULT_CQL_PORT: u16 = 9042;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRIES: usize = 3;

/// Cassandra/ScyllaDB session configuration
///
/// Can be constructed manually or loaded from environment variables (with
/// the `config` feature).
///
/// # Example
///
/// ```ignore
/// use cassandra_utils::CassandraConfig;
///
/// let config = CassandraConfig::with_keyspace(vec!["127.0.0.1"], "app")
///     .with_credentials("cassandra", "cassandra")
///     .with_request_timeout(10)
///     .with_retries(3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CassandraConfig {
    /// Node addresses, `host` or `host:port`
    pub contact_points: Vec<String>,

    /// Keyspace the session starts in
    pub keyspace: Option<String>,

    /// Username for the password authenticator. Authentication is skipped
    /// when this is `None` or empty.
    pub username: Option<String>,

    /// Password for the password authenticator, sent only with a username
    pub password: Option<String>,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// How many times the driver retries a failed request
    pub retries: usize,
}

impl CassandraConfig {
    /// Create a config for the given contact points, no keyspace
    pub fn new<S: Into<String>>(contact_points: Vec<S>) -> Self {
        Self {
            contact_points: contact_points.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create a config whose sessions start in `keyspace`
    pub fn with_keyspace<S: Into<String>>(
        contact_points: Vec<S>,
        keyspace: impl Into<String>,
    ) -> Self {
        Self {
            keyspace: Some(keyspace.into()),
            ..Self::new(contact_points)
        }
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set per-request timeout
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set how many times a failed request may be retried
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Get the contact points as configured
    pub fn contact_points(&self) -> &[String] {
        &self.contact_points
    }

    /// Get the keyspace
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// Credentials to present, if any. An empty username means no
    /// authentication.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match self.username.as_deref() {
            Some(user) if !user.is_empty() => {
                Some((user, self.password.as_deref().unwrap_or_default()))
            }
            _ => None,
        }
    }

    /// Contact points with [`DEFAULT_CQL_PORT`] appended where missing
    pub fn known_nodes(&self) -> Vec<String> {
        self.contact_points
            .iter()
            .map(|point| with_default_port(point))
            .collect()
    }
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            contact_points: vec![format!("127.0.0.1:{DEFAULT_CQL_PORT}")],
            keyspace: None,
            username: None,
            password: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
        }
    }
}

fn with_default_port(point: &str) -> String {
    let has_port = if let Some(rest) = point.strip_prefix('[') {
        // [ipv6]:port
        rest.contains("]:")
    } else {
        // A bare IPv6 address has several colons and no port
        point.matches(':').count() == 1
    };

    if has_port {
        point.to_string()
    } else if point.contains(':') && !point.starts_with('[') {
        format!("[{point}]:{DEFAULT_CQL_PORT}")
    } else {
        format!("{point}:{DEFAULT_CQL_PORT}")
    }
}

/// Load CassandraConfig from environment variables
///
/// - `CASSANDRA_CONTACT_POINTS` (required) - comma separated, e.g. "10.0.0.1,10.0.0.2:9043"
/// - `CASSANDRA_KEYSPACE` (optional)
/// - `CASSANDRA_USERNAME` / `CASSANDRA_PASSWORD` (optional)
/// - `CASSANDRA_CONNECT_TIMEOUT_SECS` (optional, default: 10)
/// - `CASSANDRA_REQUEST_TIMEOUT_SECS` (optional, default: 10)
/// - `CASSANDRA_RETRIES` (optional, default: 3)
#[cfg(feature = "config")]
impl FromEnv for CassandraConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            contact_points: env_list("CASSANDRA_CONTACT_POINTS")?,
            keyspace: env_optional("CASSANDRA_KEYSPACE"),
            username: env_optional("CASSANDRA_USERNAME"),
            password: env_optional("CASSANDRA_PASSWORD"),
            connect_timeout_secs: env_parse(
                "CASSANDRA_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
            request_timeout_secs: env_parse(
                "CASSANDRA_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            retries: env_parse("CASSANDRA_RETRIES", DEFAULT_RETRIES)?,
        })
    }
}
