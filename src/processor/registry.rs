//! Processor registry — static table mapping title prefixes to timelines.

use std::sync::Arc;

use crate::processor::deploy::DeployProcessor;
use crate::processor::runner::TaskProcessor;
use crate::processor::simulation::SimulationProcessor;

/// Registry of available task processors.
///
/// Built once at startup and shared read-only; qualification checks match
/// a task's title against each processor's prefix in registration order.
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn TaskProcessor>>,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Registry with the built-in processors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SimulationProcessor::new()));
        registry.register(Arc::new(DeployProcessor::new()));
        registry
    }

    /// Register a processor.
    pub fn register(&mut self, processor: Arc<dyn TaskProcessor>) {
        tracing::debug!(
            kind = processor.kind(),
            prefix = processor.title_prefix(),
            "Registered processor"
        );
        self.processors.push(processor);
    }

    /// Find the processor whose title prefix matches, if any.
    ///
    /// This is the qualification rule for background execution: a naming
    /// convention on the title, not a separate task field.
    pub fn match_title(&self, title: &str) -> Option<Arc<dyn TaskProcessor>> {
        self.processors
            .iter()
            .find(|p| title.starts_with(p.title_prefix()))
            .cloned()
    }

    /// Look up a processor by its kind identifier.
    pub fn by_kind(&self, kind: &str) -> Option<Arc<dyn TaskProcessor>> {
        self.processors.iter().find(|p| p.kind() == kind).cloned()
    }

    pub fn count(&self) -> usize {
        self.processors.len()
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
