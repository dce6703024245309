//! Shared utilities.

pub mod cmdline;
pub mod process;
