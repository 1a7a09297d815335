use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::DefinitionError;
use crate::core::flow::FlowDefinition;

/// Read-only lookup of flows by name.
///
/// Built once through [`FlowRegistry::builder`]; after that it is only read,
/// so it can be shared across tasks without any locking.
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: HashMap<String, Arc<FlowDefinition>>,
}

impl FlowRegistry {
    pub fn builder() -> FlowRegistryBuilder {
        FlowRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FlowDefinition>> {
        self.flows.get(name)
    }

    /// Registered flow names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.flows.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FlowDefinition>> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FlowRegistryBuilder {
    flows: HashMap<String, Arc<FlowDefinition>>,
}

impl FlowRegistryBuilder {
    /// Adds a flow. Names must be unique.
    pub fn register(mut self, flow: FlowDefinition) -> Result<Self, DefinitionError> {
        if self.flows.contains_key(flow.name()) {
            return Err(DefinitionError::DuplicateFlow(flow.name().to_string()));
        }
        log::debug!("Registered flow '{}'", flow.name());
        self.flows.insert(flow.name().to_string(), Arc::new(flow));
        Ok(self)
    }

    pub fn build(self) -> FlowRegistry {
        FlowRegistry { flows: self.flows }
    }
}
