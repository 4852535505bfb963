//! Background task execution — the asynchronous state-transition core.
//!
//! A qualifying task (title matches a registered processor prefix) is
//! handed to the dispatch worker at creation time; the worker runs the
//! processor's timeline independently of the request that created it.

pub mod deploy;
pub mod dispatch;
pub mod logger;
pub mod registry;
pub mod runner;
pub mod simulation;
pub mod state;

pub use dispatch::{DispatchJob, Dispatcher};
pub use logger::{LogLevel, TaskLogger};
pub use registry::ProcessorRegistry;
pub use runner::{ProcessorContext, TaskProcessor, execute};
pub use state::{TaskLocks, TaskMutator};
