//! CLI module for argument classification and console output.
//!
//! This module provides prefix-based command line classification
//! and the console renderer used by the orchestrator.

pub mod args;
pub mod output;
