//! opstrack — task-tracking API with background task execution.

pub mod config;
pub mod error;
pub mod http;
pub mod instances;
pub mod processor;
pub mod store;
pub mod tasks;
pub mod timefmt;
