//! # Shelfwise
//!
//! Contract-checked LLM flows for retail analytics.
//!
//! A flow binds a name, an input [`SchemaContract`], an output
//! [`SchemaContract`] and a [`PromptTemplate`]. The [`FlowExecutor`] runs it
//! against any [`ModelService`]: validate the input, render the prompt, call
//! the model, then parse and validate the answer. Every invocation ends with
//! either a contract-conforming value or a typed [`FlowFailure`].
//!
//! ## Features
//!
//! - **Declarative contracts**: nested strings, numbers, arrays, tuples and objects,
//!   validated in declaration order
//! - **Definition-time checks**: templates referring to unknown fields never build
//! - **Strict execution**: no retries, no partial results, a bounded model call
//! - **Retail flows**: product insights, placement, location demand and offer optimization
//! - **Optional HTTP clients**: Gemini and Ollama (feature `llm`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shelfwise::prelude::*;
//! use async_trait::async_trait;
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl ModelService for Canned {
//!     async fn invoke(&self, _prompt: &str, _shape: &str) -> Result<String, ModelError> {
//!         Ok(r#"{"suggestions": "Move dairy next to bakery."}"#.to_string())
//!     }
//! }
//!
//! # async fn demo() -> Result<(), DefinitionError> {
//! let actions = RetailActions::new(FlowExecutor::new(Canned))?;
//! let result = actions
//!     .generate_placement_suggestions(PlacementForm {
//!         sales_data: "[]".into(),
//!         store_layout: "Aisle 1: Produce".into(),
//!         case_studies: "".into(),
//!     })
//!     .await;
//! assert!(result.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`]: contracts, templates, flows, registry, executor and the model seam
//! - [`retail`]: the four retail flows and their actions
//! - [`config`]: runtime configuration
//! - `llm`: HTTP model clients (feature `llm`)
//! - [`prelude`]: commonly used types (import with `use shelfwise::prelude::*`)

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod core;
pub mod retail;

#[cfg(feature = "llm")]
pub mod llm;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use config::{ConfigError, ProviderKind, ShelfwiseConfig};
pub use self::core::contract::{Constraint, FieldSpec, SchemaContract, SemanticType};
pub use self::core::error::{DefinitionError, FailureKind, FlowFailure, RenderError, ValidationError};
pub use self::core::executor::{ExecutionRequest, ExecutionResult, FlowExecutor};
pub use self::core::flow::FlowDefinition;
pub use self::core::model::{ModelError, ModelService};
pub use self::core::registry::FlowRegistry;
pub use self::core::telemetry::{MemoryTelemetry, Telemetry, TraceEntry, TraceOutcome};
pub use self::core::template::PromptTemplate;
pub use retail::actions::{ActionResult, RetailActions};

#[cfg(feature = "llm")]
pub use llm::{Client, LLMError};

// ============================================================================
// Prelude
// ============================================================================

/// Everything needed to define and run flows, plus the retail actions.
///
/// # Example
/// ```rust
/// use shelfwise::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Engine
        ActionResult,
        DefinitionError,
        ExecutionRequest,
        ExecutionResult,
        FailureKind,
        FieldSpec,
        FlowDefinition,
        FlowExecutor,
        FlowFailure,
        FlowRegistry,
        ModelError,
        ModelService,
        PromptTemplate,
        RetailActions,
        SchemaContract,
        SemanticType,
        ShelfwiseConfig,
    };

    // Retail forms and outputs
    pub use crate::retail::location::{DemandLevel, LocationInsights, LocationInsightsForm};
    pub use crate::retail::offers::{OfferOptimization, OfferOptimizationForm};
    pub use crate::retail::placement::{PlacementForm, PlacementSuggestions};
    pub use crate::retail::product_insights::{ProductInsights, ProductInsightsForm};
}

// ============================================================================
// Re-export commonly used external types for convenience
// ============================================================================

pub use serde_json::Value as JsonValue;

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
