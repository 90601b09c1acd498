//! Classified result of one live request
//!
//! The executor never throws: every attempt ends in exactly one
//! [`RequestOutcome`] variant, and orchestration pattern-matches on it.

#![allow(missing_docs)]

use crate::connectivity::Connectivity;
use crate::error::FetchError;
use std::fmt;
use std::time::Duration;

/// Outcome kind, for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// 2xx with a decodable body
    Success,
    /// No response within the bound
    Timeout,
    /// Transport failure
    NetworkError,
    /// Non-2xx status
    HttpError,
    /// 2xx whose body does not match the expected payload type
    InvalidBody,
}

impl OutcomeKind {
    /// Snake-case label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::HttpError => "http_error",
            Self::InvalidBody => "invalid_body",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one live attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T> {
    /// 2xx, body parsed as `T`
    Success { status: u16, body: T },
    /// Bound exceeded; the in-flight request was dropped
    Timeout { after: Duration },
    /// DNS, refused connection, reset, aborted body
    NetworkError { message: String },
    /// Non-2xx; body captured as diagnostic text
    HttpError { status: u16, body: String },
    /// 2xx whose body failed to decode
    InvalidBody { status: u16, message: String },
}

impl<T> RequestOutcome<T> {
    /// Outcome kind
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::Timeout { .. } => OutcomeKind::Timeout,
            Self::NetworkError { .. } => OutcomeKind::NetworkError,
            Self::HttpError { .. } => OutcomeKind::HttpError,
            Self::InvalidBody { .. } => OutcomeKind::InvalidBody,
        }
    }

    /// Check if outcome is a success
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// HTTP status when a response was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. }
            | Self::HttpError { status, .. }
            | Self::InvalidBody { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::NetworkError { .. } => None,
        }
    }

    /// Whether the live backend answered with a 2xx
    ///
    /// True for `InvalidBody` too: the backend is healthy even when its body
    /// is not the payload the caller asked for.
    #[inline]
    #[must_use]
    pub fn reached_live(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::InvalidBody { .. })
    }

    /// Connectivity implied by this outcome
    #[inline]
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        if self.reached_live() {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    /// Convert into the body or the caller-facing error
    ///
    /// # Errors
    /// The `FetchError` matching the failure variant; `InvalidBody` becomes
    /// `FetchError::Decode` carrying the 2xx status.
    pub fn into_result(self, url: &str) -> Result<T, FetchError> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::Timeout { after } => Err(FetchError::Timeout {
                url: url.to_string(),
                after,
            }),
            Self::NetworkError { message } => Err(FetchError::Network {
                url: url.to_string(),
                message,
            }),
            Self::HttpError { status, body } => Err(FetchError::Http { status, body }),
            Self::InvalidBody { status, message } => Err(FetchError::Decode {
                url: url.to_string(),
                status,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_2xx_answer_is_online() {
        let ok: RequestOutcome<()> = RequestOutcome::Success { status: 200, body: () };
        assert_eq!(ok.connectivity(), Connectivity::Online);

        // Backend answered; only the payload is unusable
        let foreign_shape: RequestOutcome<()> =
            RequestOutcome::InvalidBody { status: 200, message: "missing field".to_string() };
        assert!(foreign_shape.reached_live());
        assert!(!foreign_shape.is_success());
        assert_eq!(foreign_shape.connectivity(), Connectivity::Online);

        let failures: [RequestOutcome<()>; 3] = [
            RequestOutcome::Timeout { after: Duration::from_secs(5) },
            RequestOutcome::NetworkError { message: "refused".to_string() },
            RequestOutcome::HttpError { status: 500, body: String::new() },
        ];
        for outcome in failures {
            assert!(!outcome.reached_live());
            assert_eq!(outcome.connectivity(), Connectivity::Offline, "{}", outcome.kind());
        }
    }

    #[test]
    fn into_result_maps_each_variant() {
        let url = "http://localhost:8000/api/partners/optimize";

        let http: RequestOutcome<()> = RequestOutcome::HttpError {
            status: 500,
            body: "internal error".to_string(),
        };
        assert_eq!(
            http.into_result(url),
            Err(FetchError::Http { status: 500, body: "internal error".to_string() })
        );

        let timeout: RequestOutcome<()> = RequestOutcome::Timeout { after: Duration::from_millis(10) };
        assert!(timeout.into_result(url).unwrap_err().is_timeout());

        let invalid: RequestOutcome<()> =
            RequestOutcome::InvalidBody { status: 200, message: "eof".to_string() };
        assert_eq!(invalid.into_result(url).unwrap_err().status(), 200);

        let ok = RequestOutcome::Success { status: 201, body: 7u8 };
        assert_eq!(ok.into_result(url), Ok(7));
    }

    #[test]
    fn status_is_absent_without_response() {
        let outcome: RequestOutcome<()> = RequestOutcome::NetworkError { message: String::new() };
        assert_eq!(outcome.status(), None);
        assert_eq!(outcome.kind().as_str(), "network_error");
    }
}
