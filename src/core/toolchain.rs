//! Resolved toolchain inputs for one build.
//!
//! The board/platform/CPU definition files are parsed by an external
//! collaborator; what reaches this crate is a [`ToolchainSpec`] carrying the
//! already-loaded configuration fragments plus the handful of paths and
//! identifiers the orchestrator needs to normalize them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigValue;

/// Inputs for constructing an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainSpec {
    /// Platform identifier, e.g. `arduino/avr`. The segment after the slash
    /// becomes `build.arch` (uppercased).
    pub platform_id: String,

    /// Platform definition fragment (compiler paths, recipe patterns).
    pub platform: ConfigValue,

    /// Board definition fragment (`build.*`, `upload.*`, `bootloader.*`).
    pub board: ConfigValue,

    /// CPU menu-entry fragment; its stage tables override the board's.
    #[serde(default)]
    pub cpu: Option<ConfigValue>,

    /// Root of the platform tree; `cores/` and `variants/` live under it.
    pub platform_root: PathBuf,

    /// IDE/runtime installation directory, exposed as `runtime.ide.path`.
    pub runtime_dir: PathBuf,

    /// Runtime version string, exposed as `runtime.ide.version`.
    pub runtime_version: String,

    /// Directory object files are placed under.
    pub build_dir: PathBuf,
}

impl ToolchainSpec {
    /// Architecture name derived from the platform id suffix, uppercased.
    /// `arduino/avr` yields `AVR`; an id without a slash is used whole.
    pub fn arch(&self) -> String {
        self.platform_id
            .split('/')
            .nth(1)
            .unwrap_or(&self.platform_id)
            .to_uppercase()
    }
}
