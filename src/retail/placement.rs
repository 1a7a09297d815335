//! Product placement suggestions.

use serde::{Deserialize, Serialize};

use crate::core::contract::SchemaContract;
use crate::core::error::DefinitionError;
use crate::core::flow::FlowDefinition;

pub const FLOW_NAME: &str = "productPlacementSuggestionsFlow";

const PROMPT: &str = r#"You are an expert retail consultant specializing in product placement.

You will use the retailer's sales data, store layout, and successful case studies from similar retailers to generate a list of product placement suggestions.

Sales Data: {{{salesData}}}
Store Layout: {{{storeLayout}}}
Case Studies: {{{caseStudies}}}

Consider the following when making your suggestions:

* Maximize cross-selling opportunities
* Increase overall sales
* Optimize inventory
* Improve product placement

Output the suggestions in a clear and concise manner, including the recommended location for each product category and the rationale behind the suggestion.
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementForm {
    pub sales_data: String,
    pub store_layout: String,
    pub case_studies: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSuggestions {
    pub suggestions: String,
}

pub fn input_contract() -> Result<SchemaContract, DefinitionError> {
    SchemaContract::builder()
        .string(
            "salesData",
            "Sales data of the retailer, including product-wise sales, category-wise sales, \
             and location-wise sales.",
        )
        .string(
            "storeLayout",
            "The current layout of the store, including the location of each product category.",
        )
        .string(
            "caseStudies",
            "Successful case studies from similar retailers regarding product placement.",
        )
        .build()
}

pub fn output_contract() -> Result<SchemaContract, DefinitionError> {
    SchemaContract::builder()
        .string(
            "suggestions",
            "A list of product placement suggestions, including the recommended location for \
             each product category and the rationale behind the suggestion.",
        )
        .build()
}

pub fn definition() -> Result<FlowDefinition, DefinitionError> {
    FlowDefinition::builder(FLOW_NAME)
        .description("Suggests product placement from sales, layout and case studies.")
        .input(input_contract()?)
        .output(output_contract()?)
        .template(PROMPT)
        .build()
}
