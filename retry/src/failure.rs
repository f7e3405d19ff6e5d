use std::fmt::{self, Display, Formatter};

/// What went wrong with a single attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Failure {
    /// No response arrived before the attempt's deadline.
    Timeout,
    /// The connection couldn't be established or broke mid-flight.
    Connection,
    /// The service answered with this HTTP status.
    Status(u16),
}

/// Whether a failure is worth another attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Transport failures and retryable service errors.
    Transient,
    /// Client logic errors, surfaced as they are.
    NonRetryable,
}

impl Classification {
    /// Whether another attempt may succeed.
    pub fn is_retryable(self) -> bool {
        self == Classification::Transient
    }
}

impl Failure {
    /// Classify the failure.
    ///
    /// Timeouts, connection failures, `408`, `429` and every `5xx` except
    /// `501` and `505` are transient. Any other status, including ones this
    /// function doesn't know, is non-retryable.
    pub fn classify(&self) -> Classification {
        match *self {
            Failure::Timeout | Failure::Connection => Classification::Transient,
            Failure::Status(408 | 429) => Classification::Transient,
            Failure::Status(501 | 505) => Classification::NonRetryable,
            Failure::Status(500..=599) => Classification::Transient,
            Failure::Status(_) => Classification::NonRetryable,
        }
    }

    /// The HTTP status, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match *self {
            Failure::Status(status) => Some(status),
            _ => None,
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Timeout => write!(f, "timeout"),
            Failure::Connection => write!(f, "connection failure"),
            Failure::Status(status) => write!(f, "status {status}"),
        }
    }
}

/// Errors that can tell the retry policy what went wrong.
pub trait Classify {
    /// Describe the failure of the attempt that produced `self`.
    fn failure(&self) -> Failure;
}

impl Classify for Failure {
    fn failure(&self) -> Failure {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Failure::Timeout => Classification::Transient; "timeout")]
    #[test_case(Failure::Connection => Classification::Transient; "connection")]
    #[test_case(Failure::Status(408) => Classification::Transient; "request timeout")]
    #[test_case(Failure::Status(429) => Classification::Transient; "too many requests")]
    #[test_case(Failure::Status(500) => Classification::Transient; "internal error")]
    #[test_case(Failure::Status(503) => Classification::Transient; "server busy")]
    #[test_case(Failure::Status(501) => Classification::NonRetryable; "not implemented")]
    #[test_case(Failure::Status(505) => Classification::NonRetryable; "version not supported")]
    #[test_case(Failure::Status(403) => Classification::NonRetryable; "auth failure")]
    #[test_case(Failure::Status(404) => Classification::NonRetryable; "not found")]
    #[test_case(Failure::Status(999) => Classification::NonRetryable; "unknown status")]
    fn test_classify(failure: Failure) -> Classification {
        failure.classify()
    }
}
