//! The external-runner seam.
//!
//! The orchestration core only produces command strings; executing them is
//! delegated to a [`CommandRunner`]. [`ShellRunner`] is the stock
//! implementation backed by a subprocess. Tests substitute their own runner
//! to observe dispatch order or inject failures.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::scope::Scope;
use crate::util::cmdline;
use crate::util::process::ProcessBuilder;

/// Executes one rendered command and reports the outcome.
///
/// `run` is called from a scope's worker thread and blocks until the
/// command's result is known; at most one call per scope is in flight at
/// any time. Implementations own their timeout policy, the core imposes
/// none.
pub trait CommandRunner: Send + Sync {
    /// Run `command` on behalf of `scope`.
    fn run(&self, scope: Scope, command: &str) -> Result<()>;
}

/// Runs commands as subprocesses.
#[derive(Debug, Default)]
pub struct ShellRunner {
    cwd: Option<PathBuf>,
}

impl ShellRunner {
    /// Create a runner inheriting the current working directory.
    pub fn new() -> Self {
        ShellRunner::default()
    }

    /// Create a runner executing commands under `cwd`.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        ShellRunner {
            cwd: Some(cwd.into()),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, scope: Scope, command: &str) -> Result<()> {
        let argv = cmdline::split(command)?;
        let Some((program, args)) = argv.split_first() else {
            bail!("empty command in {scope} scope");
        };

        let mut cmd = ProcessBuilder::new(program).args(args);
        if let Some(ref cwd) = self.cwd {
            cmd = cmd.cwd(cwd);
        }

        tracing::debug!("[{scope}] exec: {command}");
        let output = cmd.exec()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                cmd.display_command(),
                output.status.code(),
                stderr
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_runner_success() {
        let runner = ShellRunner::new();
        runner.run(Scope::Core, "echo compiled").unwrap();
    }

    #[test]
    fn test_shell_runner_empty_command() {
        let runner = ShellRunner::new();
        assert!(runner.run(Scope::Core, "   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_nonzero_exit() {
        let runner = ShellRunner::new();
        let err = runner.run(Scope::Libs, "false").unwrap_err();
        assert!(err.to_string().contains("exit code"));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ShellRunner::with_cwd(dir.path());
        runner.run(Scope::Project, "touch built.o").unwrap();
        assert!(dir.path().join("built.o").exists());
    }
}
