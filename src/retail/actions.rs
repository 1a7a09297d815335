//! The boundary the dashboard calls.
//!
//! Each action takes a submitted form, either typed or as the plain field map
//! the dashboard posts, runs the matching flow and returns an [`ActionResult`]:
//! the typed output on success, or `{ "error": "..." }`. Callers only ever see
//! the message; the failure kind stays attached for anyone who wants it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::{DefinitionError, FailureKind, FlowFailure};
use crate::core::executor::{ExecutionRequest, FlowExecutor};
use crate::core::model::ModelService;
use crate::core::registry::FlowRegistry;
use crate::retail::location::{self, LocationInsights, LocationInsightsForm};
use crate::retail::offers::{self, OfferOptimization, OfferOptimizationForm};
use crate::retail::placement::{self, PlacementForm, PlacementSuggestions};
use crate::retail::product_insights::{self, ProductInsights, ProductInsightsForm};

const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Uniform result of an action.
///
/// Serializes untagged: success is the output itself, failure is
/// `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResult<T> {
    Success(T),
    Error {
        error: String,
        #[serde(skip)]
        kind: FailureKind,
    },
}

impl<T> ActionResult<T> {
    fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let error = if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        };
        ActionResult::Error { error, kind }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success(data) => Some(data),
            ActionResult::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Error { error, .. } => Some(error),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Error { kind, .. } => Some(*kind),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ActionResult::Success(data) => Ok(data),
            ActionResult::Error { error, .. } => Err(error),
        }
    }
}

impl<T> From<FlowFailure> for ActionResult<T> {
    fn from(failure: FlowFailure) -> Self {
        ActionResult::failure(failure.kind, failure.message)
    }
}

/// The four retail actions over one executor.
pub struct RetailActions<M: ModelService + ?Sized = dyn ModelService> {
    executor: FlowExecutor<M>,
    registry: Arc<FlowRegistry>,
}

impl<M: ModelService + ?Sized> Clone for RetailActions<M> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<M: ModelService + ?Sized> RetailActions<M> {
    /// Registers the four retail flows.
    pub fn new(executor: FlowExecutor<M>) -> Result<Self, DefinitionError> {
        Ok(Self::with_registry(executor, Arc::new(super::registry()?)))
    }

    pub fn with_registry(executor: FlowExecutor<M>, registry: Arc<FlowRegistry>) -> Self {
        Self { executor, registry }
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    pub async fn generate_product_insights(
        &self,
        form: ProductInsightsForm,
    ) -> ActionResult<ProductInsights> {
        self.run(product_insights::FLOW_NAME, &form).await
    }

    pub async fn generate_placement_suggestions(
        &self,
        form: PlacementForm,
    ) -> ActionResult<PlacementSuggestions> {
        self.run(placement::FLOW_NAME, &form).await
    }

    pub async fn generate_location_insights(
        &self,
        form: LocationInsightsForm,
    ) -> ActionResult<LocationInsights> {
        self.run(location::FLOW_NAME, &form).await
    }

    pub async fn generate_offer_optimization(
        &self,
        form: OfferOptimizationForm,
    ) -> ActionResult<OfferOptimization> {
        self.run(offers::FLOW_NAME, &form).await
    }

    pub async fn generate_product_insights_from_fields(
        &self,
        fields: &HashMap<String, String>,
    ) -> ActionResult<ProductInsights> {
        self.run_request(product_insights::FLOW_NAME, ExecutionRequest::from_fields(fields))
            .await
    }

    pub async fn generate_placement_suggestions_from_fields(
        &self,
        fields: &HashMap<String, String>,
    ) -> ActionResult<PlacementSuggestions> {
        self.run_request(placement::FLOW_NAME, ExecutionRequest::from_fields(fields))
            .await
    }

    pub async fn generate_location_insights_from_fields(
        &self,
        fields: &HashMap<String, String>,
    ) -> ActionResult<LocationInsights> {
        self.run_request(location::FLOW_NAME, ExecutionRequest::from_fields(fields))
            .await
    }

    pub async fn generate_offer_optimization_from_fields(
        &self,
        fields: &HashMap<String, String>,
    ) -> ActionResult<OfferOptimization> {
        self.run_request(offers::FLOW_NAME, ExecutionRequest::from_fields(fields))
            .await
    }

    async fn run<F, T>(&self, flow: &str, form: &F) -> ActionResult<T>
    where
        F: Serialize,
        T: DeserializeOwned,
    {
        match ExecutionRequest::from_serializable(form) {
            Ok(request) => self.run_request(flow, request).await,
            Err(e) => ActionResult::failure(FailureKind::InvalidInput, e.to_string()),
        }
    }

    async fn run_request<T: DeserializeOwned>(
        &self,
        flow: &str,
        request: ExecutionRequest,
    ) -> ActionResult<T> {
        match self.executor.execute_named(&self.registry, flow, request).await {
            Ok(output) => match serde_json::from_value(output) {
                Ok(data) => ActionResult::Success(data),
                Err(e) => ActionResult::failure(
                    FailureKind::MalformedOutput,
                    format!("Model response for '{flow}' could not be read: {e}"),
                ),
            },
            Err(failure) => failure.into(),
        }
    }
}
