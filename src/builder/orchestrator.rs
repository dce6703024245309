//! Top-level build coordination.
//!
//! The orchestrator owns the merged configuration tree and one
//! [`ScopeQueue`] per scope. External collaborators feed it file lists and
//! library names; it renders one compile command per source file through
//! the scope's recipe pattern and enqueues it. Per-command and per-scope
//! results flow back through the [`BuildMonitor`] as a stream of
//! [`BuildEvent`]s, ending in `build-completed` once core, libs, and
//! project have each drained.

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::builder::events::BuildEvent;
use crate::builder::monitor::BuildMonitor;
use crate::builder::queue::ScopeQueue;
use crate::builder::runner::CommandRunner;
use crate::config::{interpolate, ConfigTree, ConfigValue};
use crate::core::library::LibraryResolver;
use crate::core::scope::Scope;
use crate::core::toolchain::ToolchainSpec;
use crate::core::unit::CompileUnit;
use crate::error::{Error, Result};

/// Board stages a CPU menu entry may override.
const CPU_STAGES: &[&str] = &["build", "upload", "bootloader"];

/// Outcome of library resolution, returned from
/// [`Orchestrator::set_libraries`].
#[derive(Debug, Clone)]
pub struct LibraryReport {
    /// Libraries that resolved and were scheduled for compilation.
    pub resolved: Vec<String>,
    /// Requested names that could not be located and were skipped.
    pub unresolved: Vec<String>,
}

/// Coordinates the core, libs, and project compile queues for one build.
pub struct Orchestrator {
    platform_id: String,
    build_dir: PathBuf,
    config: ConfigTree,
    /// cores/<build.core> and variants/<build.variant> under the platform
    /// root; part of every compile unit's include set.
    core_includes: Vec<PathBuf>,
    /// Roots of resolved libraries. Written only by `set_libraries`,
    /// read-only once `includes-ready` has fired.
    lib_includes: Vec<PathBuf>,
    project_files: Vec<PathBuf>,
    includes_ready: bool,
    /// Project files arrived before the library include set was final and
    /// are waiting for `includes-ready`.
    project_pending: bool,
    resolver: Box<dyn LibraryResolver>,
    core_queue: ScopeQueue,
    libs_queue: ScopeQueue,
    project_queue: ScopeQueue,
    monitor: Arc<BuildMonitor>,
    events: Receiver<BuildEvent>,
}

impl Orchestrator {
    /// Build an orchestrator from resolved toolchain inputs.
    ///
    /// Merges the platform fragment into the configuration tree, injects
    /// `runtime.ide.*`, resolves `compiler.path` against the tree, folds
    /// CPU menu overrides and the board's `build` table in, and derives
    /// `build.arch` plus the core/variant include paths.
    pub fn new(
        spec: ToolchainSpec,
        resolver: Box<dyn LibraryResolver>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let arch = spec.arch();

        // CPU menu entries override the board's stage tables
        let mut board = ConfigTree::from_fragments([&spec.board]);
        if let Some(cpu_table) = spec.cpu.as_ref().and_then(ConfigValue::as_table) {
            for stage in CPU_STAGES {
                if let Some(overrides) = cpu_table.get(*stage) {
                    let fragment = ConfigValue::Table(
                        [(stage.to_string(), overrides.clone())].into_iter().collect(),
                    );
                    board.merge_fragment(&fragment);
                }
            }
        }

        let mut config = ConfigTree::from_fragments([&spec.platform]);
        config.set("runtime.ide.path", spec.runtime_dir.display().to_string());
        config.set("runtime.ide.version", spec.runtime_version);

        // compiler.path may reference runtime.ide.path
        if let Some(template) = config.get_str("compiler.path") {
            let resolved = interpolate::render(&template, &config)?;
            config.set("compiler.path", resolved);
        }

        // board build entries override the platform defaults
        if let Some(build) = board.get("build") {
            let fragment =
                ConfigValue::Table([("build".to_string(), build.clone())].into_iter().collect());
            config.merge_fragment(&fragment);
        }
        config.set("build.arch", arch);

        let core = config
            .get_str("build.core")
            .ok_or_else(|| Error::MissingVariable {
                path: "build.core".to_string(),
            })?;
        let mut core_includes = vec![spec.platform_root.join("cores").join(&core)];
        if let Some(variant) = config.get_str("build.variant") {
            core_includes.push(spec.platform_root.join("variants").join(&variant));
        }

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let monitor = Arc::new(BuildMonitor::new(events_tx));

        Ok(Orchestrator {
            platform_id: spec.platform_id,
            build_dir: spec.build_dir,
            config,
            core_includes,
            lib_includes: Vec::new(),
            project_files: Vec::new(),
            includes_ready: false,
            project_pending: false,
            resolver,
            core_queue: ScopeQueue::new(Scope::Core, Arc::clone(&monitor), Arc::clone(&runner)),
            libs_queue: ScopeQueue::new(Scope::Libs, Arc::clone(&monitor), Arc::clone(&runner)),
            project_queue: ScopeQueue::new(
                Scope::Project,
                Arc::clone(&monitor),
                Arc::clone(&runner),
            ),
            monitor,
            events: events_rx,
        })
    }

    /// The event stream for this build. Receivers are cheap to clone.
    pub fn events(&self) -> Receiver<BuildEvent> {
        self.events.clone()
    }

    /// An independent snapshot of the current configuration tree.
    pub fn config(&self) -> ConfigTree {
        self.config.snapshot()
    }

    /// Core and variant include paths for this board.
    pub fn core_includes(&self) -> &[PathBuf] {
        &self.core_includes
    }

    /// Roots of the libraries resolved so far.
    pub fn lib_includes(&self) -> &[PathBuf] {
        &self.lib_includes
    }

    /// The first command failure observed, if any scope has failed.
    pub fn failure(&self) -> Option<Error> {
        self.monitor.failure()
    }

    /// Schedule compilation of the platform core sources.
    ///
    /// `files` is the enumeration collaborator's result. An enumeration
    /// error is fatal for this build: the core scope is never populated and
    /// the build cannot complete.
    pub fn set_core_files(
        &mut self,
        files: std::result::Result<Vec<PathBuf>, String>,
    ) -> Result<()> {
        let files = match files {
            Ok(files) => files,
            Err(message) => {
                let err = Error::FileList {
                    scope: Scope::Core,
                    message,
                };
                tracing::error!("{err}");
                return Err(err);
            }
        };

        let includes = include_flags(&self.core_includes);
        let mut commands = Vec::with_capacity(files.len());
        for source in files {
            let object_name = format!(
                "{}.o",
                source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            );
            let unit = CompileUnit {
                scope: Scope::Core,
                object_file: self.build_dir.join(object_name),
                source_file: source,
                includes: includes.clone(),
            };
            commands.push(self.render_unit(&unit)?);
            tracing::info!("[core] {}", unit.source_file.display());
        }
        self.core_queue.extend(commands);
        self.core_queue.try_run();
        Ok(())
    }

    /// Resolve libraries by name and schedule their sources.
    ///
    /// A name that cannot be resolved is logged as a warning, reported in
    /// the returned [`LibraryReport`], and skipped; the rest of the build
    /// continues. Ends by firing `includes-ready` and, if project files
    /// were waiting on it, processing them.
    pub fn set_libraries(&mut self, names: &[String]) -> Result<LibraryReport> {
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for name in names {
            match self.resolver.find_library(&self.platform_id, name) {
                Some(meta) => resolved.push(meta),
                None => {
                    let warning = Error::UnresolvedLibrary {
                        name: name.clone(),
                        platform: self.platform_id.clone(),
                    };
                    tracing::warn!("{warning}");
                    unresolved.push(name.clone());
                }
            }
        }

        for meta in &resolved {
            self.lib_includes.push(meta.root.clone());
        }

        let mut commands = Vec::new();
        for meta in &resolved {
            // each library compiles against the shared core includes plus
            // its own root and utility/ subdirectory
            let mut paths = self.core_includes.clone();
            paths.push(meta.root.clone());
            paths.push(meta.root.join("utility"));
            let includes = include_flags(&paths);

            for relative in meta.source_files() {
                let unit = CompileUnit {
                    scope: Scope::Libs,
                    source_file: meta.root.join(relative),
                    object_file: self
                        .build_dir
                        .join(&meta.name)
                        .join(format!("{}.o", relative.display())),
                    includes: includes.clone(),
                };
                commands.push(self.render_unit(&unit)?);
                tracing::info!("[libs] {} > {}", meta.name, relative.display());
            }
        }
        // includes-ready goes on the channel before the libs worker can
        // emit anything, so observers always see it ahead of libs progress
        self.includes_ready = true;
        let resolved_names: Vec<String> = resolved.iter().map(|m| m.name.clone()).collect();
        self.monitor
            .includes_ready(resolved_names.clone(), unresolved.clone());
        self.libs_queue.extend(commands);
        self.libs_queue.try_run();

        if self.project_pending {
            self.project_pending = false;
            self.process_project_files()?;
        }

        Ok(LibraryReport {
            resolved: resolved_names,
            unresolved,
        })
    }

    /// Accumulate project sources and, unless deferred, schedule them.
    ///
    /// With `defer_compile` set, files are only accumulated; a later
    /// non-deferred call (or `includes-ready`, if that arrives first)
    /// triggers processing. Project units need the accumulated library
    /// include paths, so files delivered before `set_libraries` wait for
    /// `includes-ready`.
    pub fn set_project_files(
        &mut self,
        files: std::result::Result<Vec<PathBuf>, String>,
        defer_compile: bool,
    ) -> Result<()> {
        let files = match files {
            Ok(files) => files,
            Err(message) => {
                let err = Error::FileList {
                    scope: Scope::Project,
                    message,
                };
                tracing::error!("{err}");
                return Err(err);
            }
        };

        self.project_files.extend(files);

        if defer_compile {
            return Ok(());
        }

        if self.includes_ready {
            self.process_project_files()
        } else {
            self.project_pending = true;
            Ok(())
        }
    }

    /// Render and enqueue the accumulated project files.
    ///
    /// Drains the accumulator, so files are scheduled once no matter how
    /// many increments delivered them.
    pub fn process_project_files(&mut self) -> Result<()> {
        let mut paths = self.core_includes.clone();
        paths.extend(self.lib_includes.iter().cloned());
        let includes = include_flags(&paths);

        let files = std::mem::take(&mut self.project_files);
        let mut commands = Vec::with_capacity(files.len());
        for source in files {
            let unit = CompileUnit {
                scope: Scope::Project,
                object_file: PathBuf::from(format!("{}.o", source.display())),
                source_file: source,
                includes: includes.clone(),
            };
            commands.push(self.render_unit(&unit)?);
            tracing::info!("[project] {}", unit.source_file.display());
        }
        self.project_queue.extend(commands);
        self.project_queue.try_run();
        Ok(())
    }

    /// Render one compile unit into a command string.
    ///
    /// Works on a fresh snapshot, so the per-file `source_file`,
    /// `object_file`, and `includes` writes never leak into other renders.
    fn render_unit(&self, unit: &CompileUnit) -> Result<String> {
        let mut conf = self.config.snapshot();
        conf.set("source_file", unit.source_file.display().to_string());
        conf.set("object_file", unit.object_file.display().to_string());
        conf.set("includes", unit.includes.clone());

        let pattern_path = format!("recipe.{}.o.pattern", unit.extension());
        let pattern = conf
            .get_str(&pattern_path)
            .ok_or(Error::MissingVariable { path: pattern_path })?;
        interpolate::render(&pattern, &conf)
    }
}

/// Format include directories as `-I` flags.
fn include_flags(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("-I{}", p.display()))
        .collect::<Vec<_>>()
        .join(" ")
}
