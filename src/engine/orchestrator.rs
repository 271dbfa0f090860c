//! Check orchestrator.
//!
//! Validates the classified command line, runs the check through the
//! injected `Checker` and turns the result into console output and an exit
//! code.
//!
//! # Graceful Degradation
//!
//! - Malformed arguments: usage text and `EXIT_BAD_USAGE`, no network access
//! - Error responses: reported like normal responses, exit code is the status
//! - Unresolvable routing host: dedicated message and `EXIT_CHECK_FAILED`
//! - Any other failure: full description and `EXIT_CHECK_FAILED`
//! - Checker panics: caught via std::panic::catch_unwind, reported as failure
//!
//! No function in this module will panic.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::check::{CheckRequest, Checker};
use crate::cli::args::{ArgumentParser, ParseError, ParseOptions, ParsedArguments};
use crate::cli::output::{Console, Tone};
use crate::engine::result::{
    exit_code_for_status, CheckOutcome, EXIT_BAD_USAGE, EXIT_CHECK_FAILED,
};
use crate::CheckError;

/// Name of the routing option
pub const DNS_OPTION: &str = "d";

/// Why a command line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("expected exactly one URI, got {0}")]
    PositionalCount(usize),
    #[error("expected at most one option, got {0}")]
    TooManyOptions(usize),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Check orchestrator
pub struct CheckOrchestrator<C: Checker> {
    checker: C,
    parser: ArgumentParser,
}

impl<C: Checker> CheckOrchestrator<C> {
    /// Create an orchestrator with the default parser options
    pub fn new(checker: C) -> Self {
        CheckOrchestrator {
            checker,
            parser: ArgumentParser::new(),
        }
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parser = ArgumentParser::with_options(options);
        self
    }

    /// Run a full invocation: banner, validation, check. Returns the exit code.
    pub fn run<I, S, W>(&self, args: I, console: &mut Console<W>) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        W: Write,
    {
        console.banner();

        let request = self
            .parser
            .parse(args)
            .map_err(UsageError::from)
            .and_then(|parsed| self.validate(&parsed));

        match request {
            Ok(request) => self.perform(&request, console),
            Err(e) => {
                debug!(error = %e, "invalid command line");
                console.usage();
                EXIT_BAD_USAGE
            }
        }
    }

    /// Check the shape of the command line and build the request
    pub fn validate(&self, parsed: &ParsedArguments) -> Result<CheckRequest, UsageError> {
        let uri = match parsed.positionals() {
            [uri] => uri.clone(),
            other => return Err(UsageError::PositionalCount(other.len())),
        };

        let options: Vec<(&str, &str)> = parsed.options().collect();
        let dns_override = match options.as_slice() {
            [] => None,
            [(name, value)] if parsed.case().matches(name, DNS_OPTION) => Some(value.to_string()),
            [(name, _)] => return Err(UsageError::UnknownOption(name.to_string())),
            many => return Err(UsageError::TooManyOptions(many.len())),
        };

        Ok(CheckRequest::new(uri, dns_override))
    }

    /// Perform the check and report it. Returns the exit code.
    pub fn perform<W: Write>(&self, request: &CheckRequest, console: &mut Console<W>) -> i32 {
        match self.invoke(request) {
            Ok(outcome) => report_outcome(&outcome, request, console),
            Err(CheckError::ErrorResponse { response, warning }) => {
                info!(status = response.status, "error response");
                console.status(response.status, &response.reason, request, Tone::Error);
                if let Some(warning) = warning.as_deref().filter(|w| !w.is_empty()) {
                    console.warning(warning);
                }
                console.blank();
                console.text(&response.body);
                exit_code_for_status(response.status)
            }
            Err(CheckError::HostNotFound { host }) => {
                warn!(%host, "routing host not found");
                console.host_not_found(&host);
                console.blank();
                console.blank();
                EXIT_CHECK_FAILED
            }
            Err(e) => {
                warn!(error = %e, uri = %request.uri, "check failed");
                console.exception(&request.uri);
                console.blank();
                console.text(&e.describe());
                EXIT_CHECK_FAILED
            }
        }
    }

    fn invoke(&self, request: &CheckRequest) -> Result<CheckOutcome, CheckError> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.checker.check(request)));

        match result {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(CheckError::Other(format!(
                    "Check panicked during execution: {}",
                    message
                )))
            }
        }
    }
}

fn report_outcome<W: Write>(
    outcome: &CheckOutcome,
    request: &CheckRequest,
    console: &mut Console<W>,
) -> i32 {
    if let Some(status) = outcome.status {
        info!(status, "response received");
        console.status(status, &outcome.reason, request, Tone::Normal);
    }

    if let Some(warning) = outcome.warning() {
        console.warning(warning);
    }

    console.blank();
    console.text(&outcome.body);
    outcome.exit_code()
}
