//! Thin wrappers over the external programs the orchestrator drives.
//!
//! Both go through [`Executor`](crate::exec::Executor), so every command
//! line is observable in tests.
pub mod brew;
pub mod git;
