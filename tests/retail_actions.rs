mod common;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use common::ScriptedModel;
use serde_json::json;
use shelfwise::prelude::*;

fn actions(model: ScriptedModel) -> RetailActions<ScriptedModel> {
    RetailActions::new(FlowExecutor::new(model)).unwrap()
}

fn offer_form() -> OfferOptimizationForm {
    OfferOptimizationForm {
        product_sales_data: common::sales_data(),
        frequently_purchased_together: common::frequently_purchased_together(),
    }
}

#[tokio::test]
async fn test_offer_optimization_scenario() {
    let result = actions(ScriptedModel::answering(common::offer_response()))
        .generate_offer_optimization(offer_form())
        .await;

    let offers = result.into_result().unwrap();
    assert!(offers.bundle_suggestions.len() >= 3);
    assert!(offers.combo_suggestions.len() >= 3);
    for bundle in &offers.bundle_suggestions {
        assert!(!bundle.products.is_empty());
        assert!(bundle.suggested_price.is_finite() && bundle.suggested_price >= 0.0);
    }
    for combo in &offers.combo_suggestions {
        assert!(!combo.products.is_empty());
        assert!(combo.discount_percentage.is_finite() && combo.discount_percentage >= 0.0);
    }
}

#[tokio::test]
async fn test_offer_prompt_carries_both_inputs() {
    let model = Arc::new(ScriptedModel::answering(common::offer_response()));
    let actions = RetailActions::new(FlowExecutor::from_arc(model.clone())).unwrap();
    actions.generate_offer_optimization(offer_form()).await;

    let prompt = &model.prompts()[0];
    assert!(prompt.contains(&format!("Sales Data: {}", common::sales_data())));
    assert!(prompt.contains(r#"Frequently Purchased Together Products: [["Organic Bananas","Whole Milk"]]"#));
}

#[tokio::test]
async fn test_location_insights_scenario() {
    let model = Arc::new(ScriptedModel::answering(common::location_response()));
    let actions = RetailActions::new(FlowExecutor::from_arc(model.clone())).unwrap();

    let sales = common::sales_data();
    let locations: HashSet<String> = serde_json::from_str::<Vec<serde_json::Value>>(&sales)
        .unwrap()
        .iter()
        .filter_map(|t| t["location"].as_str().map(str::to_string))
        .collect();
    assert!(locations.len() >= 2);

    let insights = actions
        .generate_location_insights(LocationInsightsForm {
            sales_data: sales,
            product_of_interest: "Organic Bananas".to_string(),
        })
        .await
        .into_result()
        .unwrap();

    assert!(!insights.geographic_areas.is_empty());
    for area in &insights.geographic_areas {
        assert!(area.demand().is_some(), "unexpected level {}", area.demand_level);
    }
    assert!(model.prompts()[0].contains("focusing on the product: Organic Bananas,"));
}

#[tokio::test]
async fn test_product_insights_success_passes_through() {
    let response = json!({
        "frequentlyPurchasedTogether": [["P001", "P002"], ["P003", "P004"]],
        "salesTrends": "Fruit and dairy lead weekday mornings.",
        "suggestedBundles": [["P005", "P006"]]
    });
    let result = actions(ScriptedModel::answering(response.to_string()))
        .generate_product_insights(ProductInsightsForm {
            sales_data: common::sales_data(),
        })
        .await;

    assert!(result.is_success());
    assert_eq!(serde_json::to_value(&result).unwrap(), response);
}

#[tokio::test]
async fn test_placement_from_submitted_fields() {
    let fields = HashMap::from([
        ("salesData".to_string(), common::sales_data()),
        ("storeLayout".to_string(), r#"{"entrance":["Fruits","Vegetables"]}"#.to_string()),
        ("caseStudies".to_string(), "Beer and Diapers".to_string()),
    ]);
    let model = Arc::new(ScriptedModel::answering(
        "```json\n{\"suggestions\": \"Move beer next to diapers.\"}\n```",
    ));
    let result = RetailActions::new(FlowExecutor::from_arc(model.clone()))
        .unwrap()
        .generate_placement_suggestions_from_fields(&fields)
        .await;

    assert_eq!(
        result.data().map(|s| s.suggestions.as_str()),
        Some("Move beer next to diapers.")
    );
    assert!(model.prompts()[0].contains("Beer and Diapers"));
}

#[tokio::test]
async fn test_submitted_fields_missing_one_is_invalid_input() {
    let model = Arc::new(ScriptedModel::answering(r#"{"suggestions": "unused"}"#));
    let actions = RetailActions::new(FlowExecutor::from_arc(model.clone())).unwrap();
    let fields = HashMap::from([("salesData".to_string(), common::sales_data())]);

    let result = actions.generate_placement_suggestions_from_fields(&fields).await;

    assert_eq!(result.failure_kind(), Some(FailureKind::InvalidInput));
    assert!(result.error().unwrap().contains("field 'storeLayout'"));
    let serialized = serde_json::to_value(&result).unwrap();
    assert_eq!(serialized.as_object().unwrap().len(), 1);
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_location_answer_outside_demand_levels_is_malformed() {
    let fields = HashMap::from([
        ("salesData".to_string(), common::sales_data()),
        ("productOfInterest".to_string(), "Organic Bananas".to_string()),
    ]);

    let unknown_level = json!({
        "geographicAreas": [{ "location": "New York, NY", "demandLevel": "Very High", "reasoning": "Busy." }],
        "overallSummary": "Strong in NYC."
    });
    let no_areas = json!({ "geographicAreas": [], "overallSummary": "Nothing to report." });

    for (response, path) in [
        (unknown_level, "geographicAreas[0].demandLevel"),
        (no_areas, "geographicAreas"),
    ] {
        let result = actions(ScriptedModel::answering(response.to_string()))
            .generate_location_insights_from_fields(&fields)
            .await;
        assert_eq!(result.failure_kind(), Some(FailureKind::MalformedOutput));
        assert!(result.error().unwrap().contains(&format!("field '{path}'")));
    }
}

#[tokio::test]
async fn test_offer_answer_below_minimums_is_malformed() {
    let good: serde_json::Value = serde_json::from_str(&common::offer_response()).unwrap();

    let mut one_bundle = good.clone();
    one_bundle["bundleSuggestions"].as_array_mut().unwrap().truncate(1);

    let mut no_combos = good.clone();
    no_combos["comboSuggestions"] = json!([]);

    let mut empty_products = good.clone();
    empty_products["bundleSuggestions"][0]["products"] = json!([]);

    let mut negative_price = good.clone();
    negative_price["bundleSuggestions"][1]["suggestedPrice"] = json!(-4.0);

    let mut negative_discount = good;
    negative_discount["comboSuggestions"][2]["discountPercentage"] = json!(-5);

    let cases = [
        (one_bundle, "bundleSuggestions"),
        (no_combos, "comboSuggestions"),
        (empty_products, "bundleSuggestions[0].products"),
        (negative_price, "bundleSuggestions[1].suggestedPrice"),
        (negative_discount, "comboSuggestions[2].discountPercentage"),
    ];

    for (response, path) in cases {
        let result = actions(ScriptedModel::answering(response.to_string()))
            .generate_offer_optimization(offer_form())
            .await;
        assert_eq!(result.failure_kind(), Some(FailureKind::MalformedOutput), "{path}");
        assert!(
            result.error().unwrap().contains(&format!("field '{path}'")),
            "{}",
            result.error().unwrap()
        );
    }
}

#[tokio::test]
async fn test_failures_flatten_to_error_message() {
    let unavailable = actions(ScriptedModel::failing(ModelError::Provider(
        "HTTP 429: quota exceeded".to_string(),
    )))
    .generate_product_insights(ProductInsightsForm {
        sales_data: "[]".to_string(),
    })
    .await;

    let malformed = actions(ScriptedModel::answering("I could not analyze this data."))
        .generate_product_insights(ProductInsightsForm {
            sales_data: "[]".to_string(),
        })
        .await;

    let unknown = RetailActions::with_registry(
        FlowExecutor::new(ScriptedModel::answering("{}")),
        Arc::new(FlowRegistry::default()),
    )
    .generate_product_insights(ProductInsightsForm {
        sales_data: "[]".to_string(),
    })
    .await;

    let render: ActionResult<ProductInsights> =
        FlowFailure::new(FailureKind::RenderFailure, "no value to render for placeholder 'salesData'")
            .into();

    let cases = [
        (unavailable, FailureKind::ModelUnavailable),
        (malformed, FailureKind::MalformedOutput),
        (unknown, FailureKind::InvalidInput),
        (render, FailureKind::RenderFailure),
    ];

    for (result, kind) in cases {
        assert_eq!(result.failure_kind(), Some(kind));
        assert!(result.data().is_none());
        let error = result.error().unwrap();
        assert!(!error.is_empty());

        let serialized = serde_json::to_value(&result).unwrap();
        let object = serialized.as_object().unwrap();
        assert_eq!(object.len(), 1, "{serialized}");
        assert_eq!(object["error"], json!(error));
    }
}

#[tokio::test]
async fn test_provider_message_survives_flattening() {
    let result = actions(ScriptedModel::failing(ModelError::Provider(
        "HTTP 429: quota exceeded".to_string(),
    )))
    .generate_location_insights(LocationInsightsForm {
        sales_data: "[]".to_string(),
        product_of_interest: "Whole Milk".to_string(),
    })
    .await;

    assert!(result.error().unwrap().contains("HTTP 429: quota exceeded"));
}

#[tokio::test]
async fn test_wrong_demand_level_type_is_malformed() {
    let result = actions(ScriptedModel::answering(
        json!({
            "geographicAreas": [{ "location": "Chicago, IL", "demandLevel": 3, "reasoning": "n/a" }],
            "overallSummary": "Mixed."
        })
        .to_string(),
    ))
    .generate_location_insights(LocationInsightsForm {
        sales_data: "[]".to_string(),
        product_of_interest: "Craft Beer 6-Pack".to_string(),
    })
    .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::MalformedOutput));
    assert!(result
        .error()
        .unwrap()
        .contains("geographicAreas[0].demandLevel"));
}
