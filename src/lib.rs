//! Slipway - build-command orchestration for cross-compilation workflows.
//!
//! Given a resolved toolchain configuration (platform/board/CPU fragments,
//! per-extension recipe templates) and three categories of source input -
//! platform core, libraries, and user project - slipway renders one shell
//! command per source file and schedules the commands on three concurrent,
//! internally sequential queues, aggregating completion and failure into a
//! single event stream.
//!
//! Board definition loading, library discovery, and source enumeration are
//! collaborators supplied by the caller; command execution goes through the
//! pluggable [`CommandRunner`] seam.

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod util;

pub use crate::builder::{BuildEvent, CommandRunner, LibraryReport, Orchestrator, ShellRunner};
pub use crate::config::{ConfigTree, ConfigValue};
pub use crate::core::{CompileUnit, LibraryMetadata, LibraryResolver, Scope, ToolchainSpec};
pub use crate::error::{Error, Result};
