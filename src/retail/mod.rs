//! The retail dashboard flows.
//!
//! Four flows share the same engine and differ only in their contracts and
//! prompt: product insight mining, placement suggestions, location-based
//! demand analysis and offer optimization. [`actions::RetailActions`] exposes
//! them to callers.

pub mod actions;
pub mod location;
pub mod offers;
pub mod placement;
pub mod product_insights;

use crate::core::error::DefinitionError;
use crate::core::registry::FlowRegistry;

/// Registry holding the four retail flows.
pub fn registry() -> Result<FlowRegistry, DefinitionError> {
    Ok(FlowRegistry::builder()
        .register(product_insights::definition()?)?
        .register(placement::definition()?)?
        .register(location::definition()?)?
        .register(offers::definition()?)?
        .build())
}
