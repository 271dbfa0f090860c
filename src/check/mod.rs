//! The check capability.
//!
//! A `Checker` performs one HTTP GET for a `CheckRequest`. The orchestrator
//! only sees this trait, so tests substitute a scripted checker for the
//! network.

pub mod host;

pub use host::HostChecker;

use crate::engine::result::CheckOutcome;
use crate::CheckError;

/// A validated request: the URI to check and where to send it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// The URI to GET; its host stays the logical target
    pub uri: String,
    /// Host the request is actually routed to
    pub dns_override: Option<String>,
}

impl CheckRequest {
    /// Create a request. An empty override counts as no override.
    pub fn new<U, H>(uri: U, dns_override: Option<H>) -> Self
    where
        U: Into<String>,
        H: Into<String>,
    {
        CheckRequest {
            uri: uri.into(),
            dns_override: dns_override
                .map(Into::into)
                .filter(|host: &String| !host.is_empty()),
        }
    }
}

/// Performs the HTTP GET for a check
pub trait Checker {
    fn check(&self, request: &CheckRequest) -> Result<CheckOutcome, CheckError>;
}

impl<C: Checker + ?Sized> Checker for &C {
    fn check(&self, request: &CheckRequest) -> Result<CheckOutcome, CheckError> {
        (**self).check(request)
    }
}

impl<C: Checker + ?Sized> Checker for Box<C> {
    fn check(&self, request: &CheckRequest) -> Result<CheckOutcome, CheckError> {
        (**self).check(request)
    }
}
