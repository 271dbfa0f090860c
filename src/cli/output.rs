//! Console output for check-service.
//!
//! Renders the banner, usage text, status line, warnings and error
//! descriptions to any `Write` sink.
//!
//! # Graceful Degradation
//!
//! - Non-TTY output: color disabled by the caller via NO_COLOR or detection
//! - Write failures: logged at debug level and otherwise ignored, so a
//!   closed stdout never changes the exit code
//!
//! No function in this module will panic.

use std::io::{self, Write};

use tracing::debug;

use crate::check::CheckRequest;
use crate::version::get_build_info;

/// Color of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Response returned normally
    Normal,
    /// Response surfaced as a failure
    Error,
}

/// Format the status line for a response
pub fn format_status_line(status: u16, reason: &str, request: &CheckRequest) -> String {
    match request.dns_override.as_deref() {
        Some(host) => format!(
            "{} {} from HTTP GET to {} on {}",
            status, reason, request.uri, host
        ),
        None => format!("{} {} from HTTP GET to {}", status, reason, request.uri),
    }
}

/// Console writer
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl Console<io::Stdout> {
    /// Console on process stdout
    pub fn stdout(color: bool) -> Self {
        Console::new(io::stdout(), color)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Console { out, color }
    }

    /// Consume the console and return the underlying sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            debug!(error = %e, "console write failed");
        }
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    /// Plain text such as a response body
    pub fn text(&mut self, text: &str) {
        self.line(text);
    }

    pub fn banner(&mut self) {
        let info = get_build_info();
        self.blank();
        self.line(&format!(
            "check-service {}   Checks a REST service.",
            info.version
        ));
        self.blank();
    }

    pub fn usage(&mut self) {
        self.line("Performs an HTTP GET on a given host.");
        self.line("Usage:  check-service http://hostname:port/path -d dnsname");
        self.blank();
        self.line("http://hostname:port/path     The URI to check.");
        self.line("-d dnsname [optional]         The actual host to which the GET should be sent.");
        self.blank();
        self.line("Specifying the dnsname allows a check to be run directly on a host, bypassing");
        self.line("any redirections or pooling performed by local traffic managers and suchlike.");
        self.line("The request keeps the URI's host name in its Host header and TLS handshake.");
        self.blank();
        self.line("EXIT CODES:");
        self.line("    0     HTTP 200");
        self.line("    <n>   Any other HTTP status code n");
        self.line("    -1    Invalid arguments");
        self.line("    -2    The check could not be performed");
    }

    pub fn status(&mut self, status: u16, reason: &str, request: &CheckRequest, tone: Tone) {
        let text = format_status_line(status, reason, request);
        let colored = match tone {
            Tone::Normal => self.colorize(&text, "93"),
            Tone::Error => self.colorize(&text, "31"),
        };
        self.line(&colored);
    }

    pub fn warning(&mut self, text: &str) {
        let colored = self.colorize(text, "33");
        self.line(&colored);
    }

    pub fn host_not_found(&mut self, host: &str) {
        let text = format!("Host {} cannot be contacted or does not exist.", host);
        let colored = self.colorize(&text, "31");
        self.line(&colored);
    }

    pub fn exception(&mut self, uri: &str) {
        let text = format!("Exception thrown during HTTP GET to {}", uri);
        let colored = self.colorize(&text, "31");
        self.line(&colored);
    }
}
