//! Location-based demand analysis for a single product.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::contract::{FieldSpec, SchemaContract, SemanticType};
use crate::core::error::DefinitionError;
use crate::core::flow::FlowDefinition;

pub const FLOW_NAME: &str = "locationBasedInsightsFlow";

const PROMPT: &str = r#"Given the following sales data: {{{salesData}}}, and focusing on the product: {{{productOfInterest}}}, identify geographic areas with high, medium, and low demand.

Provide a list of geographic areas with their demand levels and reasoning. Also, provide an overall summary of the insights.

Format the output as a JSON object. Make sure the geographicAreas is an array of objects, where each object has location, demandLevel, and reasoning fields.
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInsightsForm {
    pub sales_data: String,
    pub product_of_interest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInsights {
    pub geographic_areas: Vec<GeographicArea>,
    pub overall_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicArea {
    pub location: String,
    /// One of `High`, `Medium` or `Low`; see [`GeographicArea::demand`].
    pub demand_level: String,
    pub reasoning: String,
}

impl GeographicArea {
    /// The demand level as an enum. Always `Some` for areas that passed the
    /// output contract.
    pub fn demand(&self) -> Option<DemandLevel> {
        self.demand_level.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

impl DemandLevel {
    pub const ALL: [DemandLevel; 3] = [DemandLevel::High, DemandLevel::Medium, DemandLevel::Low];
}

impl FromStr for DemandLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(DemandLevel::High),
            "medium" => Ok(DemandLevel::Medium),
            "low" => Ok(DemandLevel::Low),
            _ => Err(format!("unknown demand level '{s}'")),
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
        })
    }
}

pub fn input_contract() -> Result<SchemaContract, DefinitionError> {
    SchemaContract::builder()
        .string(
            "salesData",
            "Sales data including product, quantity, and geographic location.",
        )
        .string(
            "productOfInterest",
            "The specific product for which location-based insights are needed.",
        )
        .build()
}

pub fn output_contract() -> Result<SchemaContract, DefinitionError> {
    let area = SchemaContract::builder()
        .string("location", "The geographic location.")
        .field(
            FieldSpec::new(
                "demandLevel",
                SemanticType::String,
                "The level of demand (High, Medium, Low).",
            )
            .one_of(DemandLevel::ALL.iter().map(DemandLevel::to_string)),
        )
        .string(
            "reasoning",
            "Explanation of why this location has the given demand level.",
        )
        .build()?;

    SchemaContract::builder()
        .field(
            FieldSpec::new(
                "geographicAreas",
                SemanticType::array_of(SemanticType::Object(area)),
                "List of geographic areas with demand levels for the specified product.",
            )
            .min_items(1),
        )
        .string(
            "overallSummary",
            "An overall summary of location-based insights.",
        )
        .build()
}

pub fn definition() -> Result<FlowDefinition, DefinitionError> {
    FlowDefinition::builder(FLOW_NAME)
        .description("Finds where a product is in high, medium or low demand.")
        .input(input_contract()?)
        .output(output_contract()?)
        .template(PROMPT)
        .build()
}
