//! check-service library
//!
//! Performs a single HTTP GET against a service endpoint and reports the
//! outcome as console text and a process exit code.
//!
//! The request can be routed to a different host than the one named in the
//! URI. The URI keeps its logical identity (Host header and TLS server name),
//! which allows a check to run directly against one node behind a load
//! balancer or traffic manager.
//!
//! This library provides:
//! - A prefix-based command line classifier (`cli::args`)
//! - The check orchestrator mapping outcomes to exit codes (`engine`)
//! - The `Checker` capability and its HTTP implementation (`check`, `net`)
//!
//! # Example
//!
//! ```no_run
//! use check_service::check::{CheckRequest, Checker, HostChecker};
//!
//! let checker = HostChecker::new();
//! let request = CheckRequest::new("http://service.example.com/status", Some("node1.example.com"));
//! match checker.check(&request) {
//!     Ok(outcome) => println!("status: {:?}", outcome.status),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod engine;
pub mod net;
pub mod telemetry;
pub mod version;

use net::client::HttpResponse;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

// Re-exports for public API
pub use check::{CheckRequest, Checker, HostChecker};
pub use engine::orchestrator::CheckOrchestrator;
pub use engine::result::CheckOutcome;

/// Error types for a check.
///
/// `ErrorResponse` and `HostNotFound` get dedicated handling in the
/// orchestrator; every other variant is reported as an unexpected failure.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The server answered, but with an error status
    #[error("The remote server returned an error: ({}) {}.", .response.status, .response.reason)]
    ErrorResponse {
        response: HttpResponse,
        warning: Option<String>,
    },
    /// The host the request was routed through could not be resolved
    #[error("The host name {host} could not be resolved")]
    HostNotFound { host: String },
    /// The URI's own host could not be resolved
    #[error("Could not resolve {host}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    /// The endpoint is not an absolute URI
    #[error("Unknown endpoint {endpoint}")]
    InvalidEndpoint { endpoint: String },
    /// The URI scheme is neither http nor https
    #[error("Unsupported scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },
    /// TCP connection failed
    #[error("Unable to connect to {address}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },
    /// Read or write failure on an established connection
    #[error("I/O error in {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    /// TLS session setup failed
    #[error("TLS setup failed: {0}")]
    Tls(String),
    /// https requested but TLS support was not compiled in
    #[error("TLS support not enabled. Build with: cargo build --features tls")]
    TlsUnavailable,
    /// The server's reply is not a valid HTTP response
    #[error("Invalid HTTP response: {0}")]
    MalformedResponse(String),
    /// Any other failure raised by a checker
    #[error("{0}")]
    Other(String),
}

impl CheckError {
    /// Full description: the error followed by its chain of causes
    pub fn describe(&self) -> String {
        let mut description = format!("{}", self);
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            description.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        description
    }
}
