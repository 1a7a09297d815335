//! Declarative schema contracts.
//!
//! A [`SchemaContract`] is an ordered list of [`FieldSpec`]s. The same contract
//! is used to check a caller's input before a prompt is rendered and to check
//! the model's structured answer before it is handed back. Validation walks the
//! fields in declaration order and stops at the first mismatch, so the reported
//! error is always the same for the same value.

use std::collections::HashSet;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::core::error::{DefinitionError, ValidationError};

/// The semantic type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticType {
    String,
    Number,
    Boolean,
    /// Homogeneous list.
    Array(Box<SemanticType>),
    /// Fixed-arity list, one type per slot.
    Tuple(Vec<SemanticType>),
    /// Nested object with its own contract.
    Object(SchemaContract),
}

impl SemanticType {
    pub fn array_of(item: SemanticType) -> Self {
        SemanticType::Array(Box::new(item))
    }

    pub fn tuple_of(items: impl IntoIterator<Item = SemanticType>) -> Self {
        SemanticType::Tuple(items.into_iter().collect())
    }

    /// Shape of this type, without a description.
    fn shape(&self) -> Value {
        match self {
            SemanticType::String => json!({ "type": "string" }),
            SemanticType::Number => json!({ "type": "number" }),
            SemanticType::Boolean => json!({ "type": "boolean" }),
            SemanticType::Array(item) => json!({ "type": "array", "items": item.shape() }),
            SemanticType::Tuple(items) => json!({
                "type": "array",
                "prefixItems": items.iter().map(SemanticType::shape).collect::<Vec<_>>(),
                "minItems": items.len(),
                "maxItems": items.len(),
            }),
            SemanticType::Object(contract) => contract.shape(),
        }
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match (self, value) {
            (SemanticType::String, Value::String(_))
            | (SemanticType::Number, Value::Number(_))
            | (SemanticType::Boolean, Value::Bool(_)) => Ok(()),
            (SemanticType::Array(item), Value::Array(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    item.check(element, &format!("{path}[{index}]"))?;
                }
                Ok(())
            }
            (SemanticType::Tuple(items), Value::Array(elements)) => {
                if elements.len() != items.len() {
                    return Err(ValidationError::new(
                        path,
                        self.to_string(),
                        format!("array of length {}", elements.len()),
                    ));
                }
                for (index, (item, element)) in items.iter().zip(elements).enumerate() {
                    item.check(element, &format!("{path}[{index}]"))?;
                }
                Ok(())
            }
            (SemanticType::Object(contract), Value::Object(map)) => contract.validate_map(map, path),
            (expected, actual) => Err(ValidationError::new(
                path,
                expected.to_string(),
                json_kind(actual),
            )),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::String => f.write_str("string"),
            SemanticType::Number => f.write_str("number"),
            SemanticType::Boolean => f.write_str("boolean"),
            SemanticType::Array(item) => write!(f, "array<{item}>"),
            SemanticType::Tuple(items) => {
                f.write_str("tuple<")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(">")
            }
            SemanticType::Object(_) => f.write_str("object"),
        }
    }
}

/// The JSON kind of a value, as reported in [`ValidationError::actual`].
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A restriction on a field's value beyond its type.
///
/// Checked after the type matches, in declaration order, and emitted into the
/// shape description as the matching JSON schema keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The string must be one of these values (`enum`).
    OneOf(Vec<String>),
    /// The array must hold at least this many items (`minItems`).
    MinItems(usize),
    /// The number must be at least this value (`minimum`).
    Minimum(f64),
}

impl Constraint {
    /// Whether this constraint can apply to values of `ty`.
    fn applies_to(&self, ty: &SemanticType) -> bool {
        matches!(
            (self, ty),
            (Constraint::OneOf(_), SemanticType::String)
                | (Constraint::MinItems(_), SemanticType::Array(_))
                | (Constraint::Minimum(_), SemanticType::Number)
        )
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match (self, value) {
            (Constraint::OneOf(allowed), Value::String(text)) => {
                if allowed.iter().any(|a| a == text) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        path,
                        format!("one of {}", allowed.join(", ")),
                        format!("\"{text}\""),
                    ))
                }
            }
            (Constraint::MinItems(min), Value::Array(items)) => {
                if items.len() >= *min {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        path,
                        format!("array of at least {min} items"),
                        format!("array of length {}", items.len()),
                    ))
                }
            }
            (Constraint::Minimum(min), Value::Number(number)) => match number.as_f64() {
                Some(n) if n.is_finite() && n >= *min => Ok(()),
                _ => Err(ValidationError::new(
                    path,
                    format!("number >= {min}"),
                    number.to_string(),
                )),
            },
            _ => Ok(()),
        }
    }

    fn annotate(&self, shape: &mut Map<String, Value>) {
        match self {
            Constraint::OneOf(allowed) => {
                shape.insert("enum".to_string(), json!(allowed));
            }
            Constraint::MinItems(min) => {
                shape.insert("minItems".to_string(), json!(min));
            }
            Constraint::Minimum(min) => {
                shape.insert("minimum".to_string(), json!(min));
            }
        }
    }
}

/// A single field of a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub semantic_type: SemanticType,
    /// Free text. Shown to the model in the shape description.
    pub description: String,
    pub required: bool,
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        semantic_type: SemanticType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            description: description.into(),
            required: true,
            constraints: Vec::new(),
        }
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn one_of<I, T>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.constraint(Constraint::OneOf(allowed.into_iter().map(Into::into).collect()))
    }

    pub fn min_items(self, min: usize) -> Self {
        self.constraint(Constraint::MinItems(min))
    }

    pub fn minimum(self, min: f64) -> Self {
        self.constraint(Constraint::Minimum(min))
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        self.semantic_type.check(value, path)?;
        for constraint in &self.constraints {
            constraint.check(value, path)?;
        }
        Ok(())
    }
}

/// Ordered set of fields describing one side of a flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaContract {
    fields: Vec<FieldSpec>,
}

impl SchemaContract {
    pub fn builder() -> SchemaContractBuilder {
        SchemaContractBuilder::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks `value` against this contract.
    ///
    /// `value` must be an object. Required fields must be present and non-null,
    /// present fields must match their type and constraints, and unknown
    /// fields are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Object(map) => self.validate_map(map, ""),
            other => Err(ValidationError::new("$", "object", json_kind(other))),
        }
    }

    fn validate_map(&self, map: &Map<String, Value>, prefix: &str) -> Result<(), ValidationError> {
        for field in &self.fields {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{prefix}.{}", field.name)
            };

            match map.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ValidationError::new(
                        path,
                        field.semantic_type.to_string(),
                        "missing",
                    ));
                }
                None | Some(Value::Null) => {}
                Some(value) => field.check(value, &path)?,
            }
        }
        Ok(())
    }

    /// Machine-readable description of the shape, as compact JSON.
    ///
    /// Property order follows declaration order, so the text is stable.
    pub fn describe(&self) -> String {
        self.shape().to_string()
    }

    fn shape(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut shape = field.semantic_type.shape();
            if let Value::Object(ref mut map) = shape {
                for constraint in &field.constraints {
                    constraint.annotate(map);
                }
                if !field.description.is_empty() {
                    map.insert("description".to_string(), json!(field.description));
                }
            }
            properties.insert(field.name.clone(), shape);
            if field.required {
                required.push(json!(field.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Builder for [`SchemaContract`].
#[derive(Debug, Default)]
pub struct SchemaContractBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaContractBuilder {
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(FieldSpec::new(name, SemanticType::String, description))
    }

    pub fn number(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(FieldSpec::new(name, SemanticType::Number, description))
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(FieldSpec::new(name, SemanticType::Boolean, description))
    }

    pub fn array(
        self,
        name: impl Into<String>,
        item: SemanticType,
        description: impl Into<String>,
    ) -> Self {
        self.field(FieldSpec::new(name, SemanticType::array_of(item), description))
    }

    pub fn object(
        self,
        name: impl Into<String>,
        contract: SchemaContract,
        description: impl Into<String>,
    ) -> Self {
        self.field(FieldSpec::new(name, SemanticType::Object(contract), description))
    }

    /// Rejects duplicate field names and constraints that cannot apply to
    /// their field's type.
    pub fn build(self) -> Result<SchemaContract, DefinitionError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DefinitionError::DuplicateField(field.name.clone()));
            }
            if let Some(constraint) = field
                .constraints
                .iter()
                .find(|c| !c.applies_to(&field.semantic_type))
            {
                return Err(DefinitionError::InvalidConstraint {
                    field: field.name.clone(),
                    reason: format!("{constraint:?} does not apply to {}", field.semantic_type),
                });
            }
        }
        Ok(SchemaContract {
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_contract() -> SchemaContract {
        SchemaContract::builder()
            .string("location", "The geographic location.")
            .string("demandLevel", "High, Medium or Low.")
            .build()
            .unwrap()
    }

    fn sample_contract() -> SchemaContract {
        SchemaContract::builder()
            .string("summary", "A summary.")
            .number("score", "A score.")
            .array(
                "pairs",
                SemanticType::tuple_of([SemanticType::String, SemanticType::String]),
                "Product pairs.",
            )
            .array("areas", SemanticType::Object(area_contract()), "Areas.")
            .field(FieldSpec::new("note", SemanticType::String, "Optional note.").optional())
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let result = SchemaContract::builder()
            .string("a", "")
            .number("a", "")
            .build();
        assert_eq!(result, Err(DefinitionError::DuplicateField("a".to_string())));
    }

    #[test]
    fn test_valid_value_passes_and_extra_fields_ignored() {
        let value = json!({
            "summary": "ok",
            "score": 4.5,
            "pairs": [["P001", "P002"]],
            "areas": [{ "location": "Brooklyn, NY", "demandLevel": "High" }],
            "unexpected": true
        });
        assert_eq!(sample_contract().validate(&value), Ok(()));
    }

    #[test]
    fn test_missing_required_field_named() {
        let value = json!({ "summary": "ok", "pairs": [], "areas": [] });
        let err = sample_contract().validate(&value).unwrap_err();
        assert_eq!(err.field, "score");
        assert_eq!(err.expected, "number");
        assert_eq!(err.actual, "missing");
    }

    #[test]
    fn test_null_counts_as_missing() {
        let value = json!({ "summary": null });
        let err = sample_contract().validate(&value).unwrap_err();
        assert_eq!(err.field, "summary");
        assert_eq!(err.actual, "missing");
    }

    #[test]
    fn test_first_mismatch_in_declaration_order() {
        // Both `score` and `pairs` are wrong; `score` is declared first.
        let value = json!({ "summary": "ok", "score": "4", "pairs": "nope", "areas": [] });
        let err = sample_contract().validate(&value).unwrap_err();
        assert_eq!(err, ValidationError::new("score", "number", "string"));
    }

    #[test]
    fn test_tuple_arity_enforced() {
        let value = json!({ "summary": "ok", "score": 1, "pairs": [["a", "b", "c"]], "areas": [] });
        let err = sample_contract().validate(&value).unwrap_err();
        assert_eq!(err.field, "pairs[0]");
        assert_eq!(err.expected, "tuple<string, string>");
        assert_eq!(err.actual, "array of length 3");
    }

    #[test]
    fn test_nested_object_path() {
        let value = json!({
            "summary": "ok",
            "score": 1,
            "pairs": [],
            "areas": [
                { "location": "Queens, NY", "demandLevel": "Low" },
                { "location": "Austin, TX" }
            ]
        });
        let err = sample_contract().validate(&value).unwrap_err();
        assert_eq!(err.field, "areas[1].demandLevel");
    }

    #[test]
    fn test_optional_field_type_still_checked() {
        let value = json!({ "summary": "ok", "score": 1, "pairs": [], "areas": [], "note": 7 });
        let err = sample_contract().validate(&value).unwrap_err();
        assert_eq!(err.field, "note");
    }

    #[test]
    fn test_non_object_top_level() {
        let err = sample_contract().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err, ValidationError::new("$", "object", "array"));
    }

    #[test]
    fn test_describe_is_ordered_and_stable() {
        let contract = sample_contract();
        let described = contract.describe();
        assert_eq!(described, contract.describe());

        let summary = described.find("\"summary\"").unwrap();
        let score = described.find("\"score\"").unwrap();
        let pairs = described.find("\"pairs\"").unwrap();
        assert!(summary < score && score < pairs);

        let parsed: Value = serde_json::from_str(&described).unwrap();
        assert_eq!(
            parsed["required"],
            json!(["summary", "score", "pairs", "areas"])
        );
        assert_eq!(parsed["properties"]["pairs"]["items"]["minItems"], json!(2));
        assert_eq!(
            parsed["properties"]["areas"]["items"]["properties"]["location"]["type"],
            json!("string")
        );
    }

    fn rated_contract() -> SchemaContract {
        SchemaContract::builder()
            .field(FieldSpec::new("level", SemanticType::String, "").one_of(["High", "Medium", "Low"]))
            .field(
                FieldSpec::new("items", SemanticType::array_of(SemanticType::String), "").min_items(2),
            )
            .field(FieldSpec::new("price", SemanticType::Number, "").minimum(0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_one_of_rejects_other_values() {
        let value = json!({ "level": "Very High", "items": ["a", "b"], "price": 1 });
        let err = rated_contract().validate(&value).unwrap_err();
        assert_eq!(
            err,
            ValidationError::new("level", "one of High, Medium, Low", "\"Very High\"")
        );
    }

    #[test]
    fn test_min_items_enforced() {
        let value = json!({ "level": "Low", "items": ["a"], "price": 1 });
        let err = rated_contract().validate(&value).unwrap_err();
        assert_eq!(err.field, "items");
        assert_eq!(err.actual, "array of length 1");
    }

    #[test]
    fn test_minimum_enforced() {
        let value = json!({ "level": "Low", "items": ["a", "b"], "price": -4.0 });
        let err = rated_contract().validate(&value).unwrap_err();
        assert_eq!(err, ValidationError::new("price", "number >= 0", "-4.0"));

        let ok = json!({ "level": "Medium", "items": ["a", "b"], "price": 0 });
        assert_eq!(rated_contract().validate(&ok), Ok(()));
    }

    #[test]
    fn test_constraints_in_description() {
        let parsed: Value = serde_json::from_str(&rated_contract().describe()).unwrap();
        assert_eq!(parsed["properties"]["level"]["enum"], json!(["High", "Medium", "Low"]));
        assert_eq!(parsed["properties"]["items"]["minItems"], json!(2));
        assert_eq!(parsed["properties"]["price"]["minimum"], json!(0.0));
    }

    #[test]
    fn test_constraint_on_wrong_type_rejected() {
        let result = SchemaContract::builder()
            .field(FieldSpec::new("price", SemanticType::String, "").minimum(0.0))
            .build();
        assert!(matches!(
            result,
            Err(DefinitionError::InvalidConstraint { ref field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_semantic_type_display() {
        let ty = SemanticType::array_of(SemanticType::tuple_of([
            SemanticType::String,
            SemanticType::Number,
        ]));
        assert_eq!(ty.to_string(), "array<tuple<string, number>>");
    }
}
