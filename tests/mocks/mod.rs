//! Test doubles for running checks without a real network.
//!
//! - `MockChecker`: scripted `Checker` that records the requests it receives
//! - `MockServer`: canned-response HTTP server on a local port

pub mod checker;

pub use checker::*;
pub use server::*;
