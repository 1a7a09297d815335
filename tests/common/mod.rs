#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use shelfwise::prelude::*;

type Responder = Box<dyn Fn(&str) -> Result<String, ModelError> + Send + Sync>;

/// In-process model service answering from a closure.
pub struct ScriptedModel {
    respond: Responder,
    delay: Duration,
    prompts: Mutex<Vec<String>>,
    shapes: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<String, ModelError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
            shapes: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn failing(error: ModelError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn shapes(&self) -> Vec<String> {
        self.shapes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelService for ScriptedModel {
    async fn invoke(&self, prompt: &str, output_shape: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.shapes.lock().unwrap().push(output_shape.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.respond)(prompt)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Transactions across five locations, as a JSON string.
pub fn sales_data() -> String {
    json!([
        { "transaction_id": "T001", "product_id": "P001", "product_name": "Organic Bananas", "category": "Fruits", "quantity_sold": 2, "price": 1.5, "transaction_date": "2023-10-01T10:00:00Z", "location": "New York, NY" },
        { "transaction_id": "T001", "product_id": "P002", "product_name": "Whole Milk", "category": "Dairy", "quantity_sold": 1, "price": 3.0, "transaction_date": "2023-10-01T10:00:00Z", "location": "New York, NY" },
        { "transaction_id": "T002", "product_id": "P003", "product_name": "Craft Beer 6-Pack", "category": "Beverages", "quantity_sold": 1, "price": 12.0, "transaction_date": "2023-10-01T12:30:00Z", "location": "Brooklyn, NY" },
        { "transaction_id": "T002", "product_id": "P004", "product_name": "Diapers Size 4", "category": "Baby Care", "quantity_sold": 1, "price": 25.0, "transaction_date": "2023-10-01T12:30:00Z", "location": "Brooklyn, NY" },
        { "transaction_id": "T003", "product_id": "P005", "product_name": "Sourdough Bread", "category": "Bakery", "quantity_sold": 1, "price": 5.5, "transaction_date": "2023-10-02T09:15:00Z", "location": "San Francisco, CA" },
        { "transaction_id": "T004", "product_id": "P001", "product_name": "Organic Bananas", "category": "Fruits", "quantity_sold": 3, "price": 1.5, "transaction_date": "2023-10-02T16:45:00Z", "location": "Los Angeles, CA" }
    ])
    .to_string()
}

pub fn frequently_purchased_together() -> String {
    json!([["Organic Bananas", "Whole Milk"]]).to_string()
}

pub fn offer_response() -> String {
    json!({
        "bundleSuggestions": [
            { "bundleName": "Breakfast Basics", "products": ["Organic Bananas", "Whole Milk"], "suggestedPrice": 4.0, "estimatedSalesIncrease": "12%", "reasoning": "Bought together in T001." },
            { "bundleName": "Weekend Unwind", "products": ["Craft Beer 6-Pack", "Diapers Size 4"], "suggestedPrice": 34.0, "estimatedSalesIncrease": "8%", "reasoning": "Shared basket in Brooklyn." },
            { "bundleName": "Bakery Fresh", "products": ["Sourdough Bread"], "suggestedPrice": 5.0, "estimatedSalesIncrease": "5%", "reasoning": "Morning traffic." }
        ],
        "comboSuggestions": [
            { "comboName": "Fruit Fiesta", "products": ["Organic Bananas"], "discountPercentage": 10, "conditions": "Buy 3 or more", "estimatedSalesIncrease": "6%", "reasoning": "Bulk purchases in LA." },
            { "comboName": "Dairy Duo", "products": ["Whole Milk", "Sourdough Bread"], "discountPercentage": 15, "conditions": "Both items", "estimatedSalesIncrease": "7%", "reasoning": "Breakfast pairing." },
            { "comboName": "Family Run", "products": ["Diapers Size 4", "Whole Milk"], "discountPercentage": 5, "conditions": "Minimum spend $30", "estimatedSalesIncrease": "4%", "reasoning": "Parents shop both." }
        ]
    })
    .to_string()
}

pub fn location_response() -> String {
    json!({
        "geographicAreas": [
            { "location": "New York, NY", "demandLevel": "High", "reasoning": "Bought with milk in a single trip." },
            { "location": "Los Angeles, CA", "demandLevel": "Medium", "reasoning": "One larger purchase." },
            { "location": "San Francisco, CA", "demandLevel": "Low", "reasoning": "No purchases recorded." }
        ],
        "overallSummary": "Demand for Organic Bananas is concentrated on the east coast."
    })
    .to_string()
}
