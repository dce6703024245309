//! Build orchestration: queues, events, and the top-level coordinator.

pub mod events;
pub mod monitor;
pub mod orchestrator;
pub mod queue;
pub mod runner;

pub use events::BuildEvent;
pub use monitor::BuildMonitor;
pub use orchestrator::{LibraryReport, Orchestrator};
pub use queue::ScopeQueue;
pub use runner::{CommandRunner, ShellRunner};
