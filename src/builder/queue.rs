//! Per-scope sequential command queues.
//!
//! Each scope owns one queue. Commands execute strictly in enqueue order
//! with at most one in flight; the three queues run concurrently with one
//! another. A queue that drains latches `Completed`; a command failure
//! latches `Failed` and permanently halts the scope. Both states are
//! terminal.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::builder::monitor::BuildMonitor;
use crate::builder::runner::CommandRunner;
use crate::core::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum QueuePhase {
    /// Accepting and running commands.
    #[default]
    Open,
    /// Cursor reached the tail with nothing in flight. Terminal.
    Completed,
    /// A command failed. Terminal.
    Failed,
}

#[derive(Debug, Default)]
struct QueueState {
    commands: Vec<String>,
    /// Number of commands whose result has been observed. The command at
    /// this index is the next to dispatch.
    position: usize,
    /// Whether a worker currently owns the pump.
    running: bool,
    phase: QueuePhase,
}

/// A named, strictly sequential FIFO of pending command strings.
///
/// Enqueueing is non-blocking and unbounded. The pump is a worker thread,
/// spawned lazily when an idle queue gains work, that runs one command at a
/// time through the [`CommandRunner`], advancing only once each result is
/// observed.
pub struct ScopeQueue {
    scope: Scope,
    state: Arc<Mutex<QueueState>>,
    monitor: Arc<BuildMonitor>,
    runner: Arc<dyn CommandRunner>,
}

impl ScopeQueue {
    /// Create an empty queue for `scope`.
    pub fn new(scope: Scope, monitor: Arc<BuildMonitor>, runner: Arc<dyn CommandRunner>) -> Self {
        ScopeQueue {
            scope,
            state: Arc::new(Mutex::new(QueueState::default())),
            monitor,
            runner,
        }
    }

    /// The scope this queue serves.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Number of commands enqueued so far.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().commands.len()
    }

    /// Whether the queue has no commands.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one command to the tail and start the pump if it is idle.
    pub fn enqueue(&self, command: String) {
        self.extend(std::iter::once(command));
    }

    /// Append a batch of commands to the tail and start the pump if it is
    /// idle. The batch is appended under one lock acquisition, so the pump
    /// cannot observe the tail (and latch completion) halfway through it.
    /// Commands arriving after the queue reached a terminal state are
    /// dropped; a completed or failed scope never re-enters `Running`.
    pub fn extend(&self, commands: impl IntoIterator<Item = String>) {
        let mut state = self.state.lock().unwrap();
        if state.phase != QueuePhase::Open {
            tracing::warn!(
                "[{}] queue is {:?}; dropping late commands",
                self.scope,
                state.phase
            );
            return;
        }

        for command in commands {
            tracing::debug!("[{}] queued: {command}", self.scope);
            state.commands.push(command);
        }

        if !state.running && state.position < state.commands.len() {
            state.running = true;
            self.spawn_worker();
        }
    }

    /// Nudge the pump. A no-op while a command is in flight; on an idle
    /// queue whose cursor already sits at the tail (including an empty
    /// queue), latches completion.
    pub fn try_run(&self) {
        let mut state = self.state.lock().unwrap();
        if state.phase != QueuePhase::Open || state.running {
            return;
        }

        if state.position == state.commands.len() {
            state.phase = QueuePhase::Completed;
            drop(state);
            self.monitor.scope_completed(self.scope);
            return;
        }

        state.running = true;
        self.spawn_worker();
    }

    fn spawn_worker(&self) {
        let scope = self.scope;
        let state = Arc::clone(&self.state);
        let monitor = Arc::clone(&self.monitor);
        let runner = Arc::clone(&self.runner);

        thread::spawn(move || pump(scope, state, monitor, runner));
    }
}

/// The worker loop: take the next command, run it, record the result.
///
/// The runner is invoked outside the queue lock, so enqueueing stays
/// non-blocking while a command is in flight.
fn pump(
    scope: Scope,
    state: Arc<Mutex<QueueState>>,
    monitor: Arc<BuildMonitor>,
    runner: Arc<dyn CommandRunner>,
) {
    loop {
        let command = {
            let mut queue = state.lock().unwrap();
            if queue.phase != QueuePhase::Open {
                queue.running = false;
                return;
            }
            if queue.position == queue.commands.len() {
                queue.running = false;
                queue.phase = QueuePhase::Completed;
                drop(queue);
                monitor.scope_completed(scope);
                return;
            }
            queue.commands[queue.position].clone()
        };

        match runner.run(scope, &command) {
            Ok(()) => {
                let (position, length) = {
                    let mut queue = state.lock().unwrap();
                    queue.position += 1;
                    (queue.position, queue.commands.len())
                };
                monitor.scope_progress(scope, position, length);
            }
            Err(err) => {
                {
                    let mut queue = state.lock().unwrap();
                    queue.running = false;
                    queue.phase = QueuePhase::Failed;
                }
                monitor.scope_failed(scope, &format!("{err:#}"));
                return;
            }
        }
    }
}
