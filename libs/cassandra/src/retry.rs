use scylla::errors::{DbError, RequestAttemptError};
use scylla::policies::retry::{RequestInfo, RetryDecision, RetryPolicy, RetrySession};
use tracing::debug;

/// Driver retry policy that retries transient failures on the next node, up to
/// a fixed number of times.
///
/// Errors the server reports deterministically (syntax, invalid request,
/// already exists, ...) are never retried. Failures after which the request
/// may already have been applied are retried only for idempotent statements.
/// Consistency is never downgraded. A request that used up its retries fails
/// with the last driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedRetryPolicy {
    max_retries: usize,
}

impl BoundedRetryPolicy {
    /// Policy allowing at most `max_retries` retries per request
    pub fn new(max_retries: usize) -> Self {
        Self { max_retries }
    }

    /// Retry budget given to each request
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }
}

impl RetryPolicy for BoundedRetryPolicy {
    fn new_session(&self) -> Box<dyn RetrySession> {
        Box::new(BoundedRetrySession::new(self.max_retries))
    }
}

/// Whether a failed attempt may be sent again.
///
/// Anything that could have reached the server and been applied (broken
/// connection, overload, server error, timeouts) is only safe to repeat when
/// the statement is idempotent. Failures where the request was never executed
/// (unavailable replicas, bootstrapping coordinator, no free stream id) are
/// always retryable.
pub fn is_retryable(error: &RequestAttemptError, is_idempotent: bool) -> bool {
    match error {
        RequestAttemptError::BrokenConnectionError(_) => is_idempotent,
        RequestAttemptError::UnableToAllocStreamId => true,
        RequestAttemptError::DbError(db_error, _) => match db_error {
            DbError::Unavailable { .. } | DbError::IsBootstrapping => true,
            DbError::Overloaded
            | DbError::ServerError
            | DbError::TruncateError
            | DbError::ReadTimeout { .. }
            | DbError::WriteTimeout { .. } => is_idempotent,
            _ => false,
        },
        _ => false,
    }
}

/// Per-request retry state
#[derive(Debug)]
pub struct BoundedRetrySession {
    max_retries: usize,
    attempted: usize,
}

impl BoundedRetrySession {
    fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            attempted: 0,
        }
    }

    fn decide(&mut self, error: &RequestAttemptError, is_idempotent: bool) -> RetryDecision {
        if !is_retryable(error, is_idempotent) || self.attempted >= self.max_retries {
            return RetryDecision::DontRetry;
        }
        self.attempted += 1;
        RetryDecision::RetryNextTarget(None)
    }
}

impl RetrySession for BoundedRetrySession {
    fn decide_should_retry(&mut self, request_info: RequestInfo) -> RetryDecision {
        let decision = if request_info.consistency.is_serial() {
            RetryDecision::DontRetry
        } else {
            self.decide(request_info.error, request_info.is_idempotent)
        };

        debug!(
            error = %request_info.error,
            idempotent = request_info.is_idempotent,
            attempt = self.attempted,
            max_retries = self.max_retries,
            ?decision,
            "Request failed"
        );
        decision
    }

    fn reset(&mut self) {
        self.attempted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scylla::errors::BrokenConnectionErrorKind;

    fn db_error(error: DbError) -> RequestAttemptError {
        RequestAttemptError::DbError(error, String::new())
    }

    fn broken_connection() -> RequestAttemptError {
        RequestAttemptError::BrokenConnectionError(BrokenConnectionErrorKind::ChannelError.into())
    }

    #[test]
    fn test_deterministic_errors_are_never_retried() {
        let already_exists = DbError::AlreadyExists {
            keyspace: "app".to_string(),
            table: "tests".to_string(),
        };

        for error in [
            db_error(DbError::Invalid),
            db_error(DbError::SyntaxError),
            db_error(DbError::Unauthorized),
            db_error(already_exists),
        ] {
            assert!(!is_retryable(&error, true), "{error} should not be retried");
            assert!(!is_retryable(&error, false), "{error} should not be retried");
        }
    }

    #[test]
    fn test_possibly_applied_errors_need_idempotence() {
        for error in [
            broken_connection(),
            db_error(DbError::Overloaded),
            db_error(DbError::ServerError),
            db_error(DbError::TruncateError),
        ] {
            assert!(is_retryable(&error, true), "{error} should be retried");
            assert!(!is_retryable(&error, false), "{error} should not be retried");
        }
    }

    #[test]
    fn test_unexecuted_requests_are_always_retried() {
        for error in [
            db_error(DbError::IsBootstrapping),
            RequestAttemptError::UnableToAllocStreamId,
        ] {
            assert!(is_retryable(&error, false), "{error} should be retried");
        }
    }

    #[test]
    fn test_non_idempotent_ddl_is_sent_once() {
        let mut session = BoundedRetrySession::new(3);

        assert_eq!(
            session.decide(&db_error(DbError::Overloaded), false),
            RetryDecision::DontRetry
        );
        assert_eq!(
            session.decide(&db_error(DbError::Invalid), false),
            RetryDecision::DontRetry
        );
    }

    #[test]
    fn test_retries_exactly_max_times() {
        let mut session = BoundedRetrySession::new(3);
        let error = db_error(DbError::Overloaded);

        for _ in 0..3 {
            assert_eq!(session.decide(&error, true), RetryDecision::RetryNextTarget(None));
        }
        assert_eq!(session.decide(&error, true), RetryDecision::DontRetry);
        assert_eq!(session.decide(&error, true), RetryDecision::DontRetry);
    }

    #[test]
    fn test_zero_retries_never_retries() {
        let mut session = BoundedRetrySession::new(0);
        assert_eq!(
            session.decide(&db_error(DbError::IsBootstrapping), true),
            RetryDecision::DontRetry
        );
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut session = BoundedRetrySession::new(1);
        let error = broken_connection();

        assert_eq!(session.decide(&error, true), RetryDecision::RetryNextTarget(None));
        assert_eq!(session.decide(&error, true), RetryDecision::DontRetry);

        session.reset();
        assert_eq!(session.decide(&error, true), RetryDecision::RetryNextTarget(None));
    }

    #[test]
    fn test_sessions_do_not_share_budget() {
        let policy = BoundedRetryPolicy::new(1);
        assert_eq!(policy.max_retries(), 1);

        let error = db_error(DbError::IsBootstrapping);
        let mut first = BoundedRetrySession::new(policy.max_retries());
        let mut second = BoundedRetrySession::new(policy.max_retries());
        assert_eq!(first.decide(&error, true), RetryDecision::RetryNextTarget(None));
        assert_eq!(first.decide(&error, true), RetryDecision::DontRetry);
        assert_eq!(second.decide(&error, true), RetryDecision::RetryNextTarget(None));
    }
}
