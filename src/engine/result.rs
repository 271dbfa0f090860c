//! Check outcomes and their exit codes.
//!
//! The exit code doubles as the observed HTTP status, with 200 collapsed to
//! 0. The two negative sentinels lie outside the HTTP status space.

/// HTTP 200
pub const EXIT_SUCCESS: i32 = 0;
/// Malformed command line
pub const EXIT_BAD_USAGE: i32 = -1;
/// The check could not be performed
pub const EXIT_CHECK_FAILED: i32 = -2;

/// Exit code for an observed HTTP status
pub fn exit_code_for_status(status: u16) -> i32 {
    if status == 200 {
        EXIT_SUCCESS
    } else {
        i32::from(status)
    }
}

/// Result of a completed HTTP check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckOutcome {
    /// HTTP status code; None if no status was obtained
    pub status: Option<u16>,
    /// Reason phrase accompanying the status
    pub reason: String,
    /// Response body
    pub body: String,
    /// TLS/SSL validation warning, if any
    pub warning: Option<String>,
}

impl CheckOutcome {
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        CheckOutcome {
            status: Some(status),
            reason: reason.into(),
            body: body.into(),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Warning text, ignoring empty strings
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref().filter(|w| !w.is_empty())
    }

    pub fn exit_code(&self) -> i32 {
        self.status
            .map_or(EXIT_CHECK_FAILED, exit_code_for_status)
    }
}
