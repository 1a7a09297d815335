//! Bundle and combo offer optimization.

use serde::{Deserialize, Serialize};

use crate::core::contract::{FieldSpec, SchemaContract, SemanticType};
use crate::core::error::DefinitionError;
use crate::core::flow::FlowDefinition;

pub const FLOW_NAME: &str = "offerOptimizationFlow";

/// Fewest bundles and fewest combos an answer may carry.
pub const MIN_SUGGESTIONS: usize = 3;

const PROMPT: &str = r#"You are a marketing expert specializing in creating bundle and combo offers for retail businesses.

Based on the provided sales data and frequently purchased together products, generate a list of compelling bundle and combo suggestions to boost sales and increase customer satisfaction.

Sales Data: {{{productSalesData}}}
Frequently Purchased Together Products: {{{frequentlyPurchasedTogether}}}

Consider factors such as product compatibility, purchase frequency, and potential discount percentages when creating the suggestions.

Ensure that the reasoning behind each suggestion is clearly articulated, explaining why the bundle or combo is expected to perform well.

Present at least 3 bundle suggestions and 3 combo suggestions. Focus on offers that provide clear value to customers and are likely to drive incremental sales.

Bundles should contain products typically purchased together, and the suggested price should reflect a discount compared to purchasing the items individually. Combos might require a minimum purchase to be activated.

Format the output as a JSON object with a bundleSuggestions array (bundleName, products, suggestedPrice, estimatedSalesIncrease, reasoning) and a comboSuggestions array (comboName, products, discountPercentage, conditions, estimatedSalesIncrease, reasoning). suggestedPrice and discountPercentage are plain numbers.
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferOptimizationForm {
    pub product_sales_data: String,
    pub frequently_purchased_together: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferOptimization {
    pub bundle_suggestions: Vec<BundleSuggestion>,
    pub combo_suggestions: Vec<ComboSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSuggestion {
    pub bundle_name: String,
    pub products: Vec<String>,
    pub suggested_price: f64,
    pub estimated_sales_increase: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboSuggestion {
    pub combo_name: String,
    pub products: Vec<String>,
    pub discount_percentage: f64,
    pub conditions: String,
    pub estimated_sales_increase: String,
    pub reasoning: String,
}

pub fn input_contract() -> Result<SchemaContract, DefinitionError> {
    SchemaContract::builder()
        .string(
            "productSalesData",
            "Sales data for various products, including product names, quantities sold, and \
             transaction dates. Should be formatted as a JSON string.",
        )
        .string(
            "frequentlyPurchasedTogether",
            "List of products that are frequently purchased together, formatted as a JSON string.",
        )
        .build()
}

pub fn output_contract() -> Result<SchemaContract, DefinitionError> {
    let bundle = SchemaContract::builder()
        .string("bundleName", "A descriptive name for the bundle offer.")
        .field(products("List of products included in the bundle."))
        .field(
            FieldSpec::new(
                "suggestedPrice",
                SemanticType::Number,
                "The suggested price for the bundle.",
            )
            .minimum(0.0),
        )
        .string(
            "estimatedSalesIncrease",
            "The estimated percentage increase in sales from offering this bundle.",
        )
        .string(
            "reasoning",
            "Explanation of why this bundle is expected to perform well, based on \
             co-purchasing patterns and sales data.",
        )
        .build()?;

    let combo = SchemaContract::builder()
        .string("comboName", "A descriptive name for the combo offer.")
        .field(products("List of products included in the combo."))
        .field(
            FieldSpec::new(
                "discountPercentage",
                SemanticType::Number,
                "The percentage discount offered in this combo.",
            )
            .minimum(0.0),
        )
        .string(
            "conditions",
            "Any conditions that apply to the combo offer (e.g., minimum purchase quantity).",
        )
        .string(
            "estimatedSalesIncrease",
            "The estimated percentage increase in sales from offering this combo.",
        )
        .string(
            "reasoning",
            "Explanation of why this combo is expected to perform well, based on \
             co-purchasing patterns and sales data.",
        )
        .build()?;

    SchemaContract::builder()
        .field(
            FieldSpec::new(
                "bundleSuggestions",
                SemanticType::array_of(SemanticType::Object(bundle)),
                "Bundle offers.",
            )
            .min_items(MIN_SUGGESTIONS),
        )
        .field(
            FieldSpec::new(
                "comboSuggestions",
                SemanticType::array_of(SemanticType::Object(combo)),
                "Combo offers.",
            )
            .min_items(MIN_SUGGESTIONS),
        )
        .build()
}

fn products(description: &str) -> FieldSpec {
    FieldSpec::new("products", SemanticType::array_of(SemanticType::String), description)
        .min_items(1)
}

pub fn definition() -> Result<FlowDefinition, DefinitionError> {
    FlowDefinition::builder(FLOW_NAME)
        .description("Suggests bundle and combo offers from co-purchase patterns.")
        .input(input_contract()?)
        .output(output_contract()?)
        .template(PROMPT)
        .build()
}
