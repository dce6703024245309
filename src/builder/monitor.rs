//! Cross-scope completion aggregation.
//!
//! The monitor owns the event channel sender and the per-scope done flags.
//! Queue workers report into it from their own threads; observers read the
//! resulting [`BuildEvent`] stream.

use std::sync::Mutex;

use crossbeam_channel::Sender;

use crate::builder::events::BuildEvent;
use crate::core::scope::Scope;
use crate::error::Error;

/// Aggregates per-scope completion into the overall build outcome.
///
/// `build-completed` fires exactly once, the instant all three scopes are
/// done, and never after any scope has failed.
#[derive(Debug)]
pub struct BuildMonitor {
    events: Sender<BuildEvent>,
    state: Mutex<AggregateState>,
}

#[derive(Debug, Default)]
struct AggregateState {
    core_done: bool,
    libs_done: bool,
    project_done: bool,
    completed_fired: bool,
    /// First failure observed, kept for inspection after the fact.
    failure: Option<(Scope, String)>,
}

impl AggregateState {
    fn mark_done(&mut self, scope: Scope) {
        match scope {
            Scope::Core => self.core_done = true,
            Scope::Libs => self.libs_done = true,
            Scope::Project => self.project_done = true,
        }
    }

    fn all_done(&self) -> bool {
        self.core_done && self.libs_done && self.project_done
    }
}

impl BuildMonitor {
    /// Create a monitor emitting on `events`.
    pub fn new(events: Sender<BuildEvent>) -> Self {
        BuildMonitor {
            events,
            state: Mutex::new(AggregateState::default()),
        }
    }

    fn emit(&self, event: BuildEvent) {
        // observers may have gone away; the build does not care
        let _ = self.events.send(event);
    }

    /// Library include paths are final.
    pub fn includes_ready(&self, libraries: Vec<String>, unresolved: Vec<String>) {
        self.emit(BuildEvent::IncludesReady {
            libraries,
            unresolved,
        });
    }

    /// A command in `scope` finished successfully.
    pub fn scope_progress(&self, scope: Scope, position: usize, length: usize) {
        tracing::debug!("[{scope}] {position}/{length}");
        self.emit(BuildEvent::ScopeProgress {
            scope,
            position,
            length,
        });
    }

    /// `scope` drained its queue.
    pub fn scope_completed(&self, scope: Scope) {
        let fire_build_completed = {
            let mut state = self.state.lock().unwrap();
            state.mark_done(scope);
            let fire = state.all_done() && state.failure.is_none() && !state.completed_fired;
            if fire {
                state.completed_fired = true;
            }
            fire
        };

        tracing::info!("[{scope}] completed");
        self.emit(BuildEvent::ScopeCompleted { scope });

        if fire_build_completed {
            tracing::info!("build completed");
            self.emit(BuildEvent::BuildCompleted);
        }
    }

    /// A command in `scope` failed; the scope has halted.
    pub fn scope_failed(&self, scope: Scope, error: &str) {
        {
            let mut state = self.state.lock().unwrap();
            if state.failure.is_none() {
                state.failure = Some((scope, error.to_string()));
            }
        }

        tracing::error!("[{scope}] failed: {error}");
        self.emit(BuildEvent::ScopeFailed {
            scope,
            error: error.to_string(),
        });
        self.emit(BuildEvent::BuildFailed {
            scope,
            error: error.to_string(),
        });
    }

    /// The first command failure observed, if any.
    pub fn failure(&self) -> Option<Error> {
        let state = self.state.lock().unwrap();
        state
            .failure
            .as_ref()
            .map(|(scope, message)| Error::CommandFailed {
                scope: *scope,
                message: message.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn drain(rx: &crossbeam_channel::Receiver<BuildEvent>) -> Vec<String> {
        rx.try_iter()
            .map(|e| e.to_json())
            .collect()
    }

    #[test]
    fn test_build_completed_fires_once_after_all_scopes() {
        let (tx, rx) = unbounded();
        let monitor = BuildMonitor::new(tx);

        monitor.scope_completed(Scope::Core);
        monitor.scope_completed(Scope::Libs);
        assert!(!drain(&rx).iter().any(|e| e.contains("build-completed")));

        monitor.scope_completed(Scope::Project);
        let events = drain(&rx);
        assert_eq!(
            events
                .iter()
                .filter(|e| e.contains("build-completed"))
                .count(),
            1
        );

        // repeated completion reports never re-fire the aggregate
        monitor.scope_completed(Scope::Project);
        assert!(!drain(&rx).iter().any(|e| e.contains("build-completed")));
    }

    #[test]
    fn test_completion_order_does_not_matter() {
        let (tx, rx) = unbounded();
        let monitor = BuildMonitor::new(tx);

        monitor.scope_completed(Scope::Project);
        monitor.scope_completed(Scope::Core);
        monitor.scope_completed(Scope::Libs);

        let events = drain(&rx);
        assert!(events.last().unwrap().contains("build-completed"));
    }

    #[test]
    fn test_no_build_completed_after_failure() {
        let (tx, rx) = unbounded();
        let monitor = BuildMonitor::new(tx);

        monitor.scope_completed(Scope::Core);
        monitor.scope_failed(Scope::Libs, "avr-gcc: exit code 1");
        monitor.scope_completed(Scope::Libs);
        monitor.scope_completed(Scope::Project);

        let events = drain(&rx);
        assert!(!events.iter().any(|e| e.contains("build-completed")));
        assert!(events.iter().any(|e| e.contains("build-failed")));

        let failure = monitor.failure().unwrap();
        assert!(matches!(
            failure,
            Error::CommandFailed {
                scope: Scope::Libs,
                ..
            }
        ));
    }

    #[test]
    fn test_emit_survives_dropped_receiver() {
        let (tx, rx) = unbounded();
        let monitor = BuildMonitor::new(tx);
        drop(rx);
        monitor.scope_progress(Scope::Core, 1, 3);
        monitor.scope_completed(Scope::Core);
    }
}
