//! Check engine module.
//!
//! Provides argument validation, check orchestration and exit code mapping.

pub mod orchestrator;
pub mod result;
