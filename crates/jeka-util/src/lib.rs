//! Shared utilities for the Jeka dependency engine.
//!
//! This crate provides cross-cutting concerns used by all other Jeka crates:
//! the unified error type, filesystem helpers, process spawning for computed
//! dependencies, and terminal status lines.

pub mod errors;
pub mod fs;
pub mod process;
pub mod progress;
