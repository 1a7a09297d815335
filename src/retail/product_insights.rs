//! Product insight mining: co-purchase pairs, sales trends and bundle ideas.

use serde::{Deserialize, Serialize};

use crate::core::contract::{SchemaContract, SemanticType};
use crate::core::error::DefinitionError;
use crate::core::flow::FlowDefinition;

pub const FLOW_NAME: &str = "productInsightsFlow";

const PROMPT: &str = r#"You are an expert retail sales data analyst.

Analyze the following sales data to identify hidden patterns, sales trends, and suggest product bundles.  Return the results in JSON format.

Sales Data: {{{salesData}}}

Output should include:
- frequentlyPurchasedTogether: An array of product ID tuples that are frequently purchased together. For example [ ["product_A", "product_B"], ["product_C", "product_D"] ].
- salesTrends: Description of sales trends discovered from the sales data, such as seasonal trends or popular products.
- suggestedBundles: Suggested product bundles based on purchase history, represented as an array of product ID tuples. For example: [ ["product_A", "product_B"], ["product_C", "product_D"] ].
"#;

/// Form submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInsightsForm {
    pub sales_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInsights {
    pub frequently_purchased_together: Vec<(String, String)>,
    pub sales_trends: String,
    pub suggested_bundles: Vec<(String, String)>,
}

fn product_pair() -> SemanticType {
    SemanticType::tuple_of([SemanticType::String, SemanticType::String])
}

pub fn input_contract() -> Result<SchemaContract, DefinitionError> {
    SchemaContract::builder()
        .string(
            "salesData",
            "Sales data in JSON format.  Each object should contain fields like product_id, \
             product_name, category, quantity_sold, price, transaction_date.",
        )
        .build()
}

pub fn output_contract() -> Result<SchemaContract, DefinitionError> {
    SchemaContract::builder()
        .array(
            "frequentlyPurchasedTogether",
            product_pair(),
            "An array of product ID tuples that are frequently purchased together.",
        )
        .string(
            "salesTrends",
            "Description of sales trends discovered from the sales data, such as seasonal \
             trends or popular products.",
        )
        .array(
            "suggestedBundles",
            product_pair(),
            "Suggested product bundles based on purchase history, represented as an array of \
             product ID tuples.",
        )
        .build()
}

pub fn definition() -> Result<FlowDefinition, DefinitionError> {
    FlowDefinition::builder(FLOW_NAME)
        .description("Analyzes sales data to identify hidden patterns.")
        .input(input_contract()?)
        .output(output_contract()?)
        .template(PROMPT)
        .build()
}
