//! Prompt templates with `{{field}}` / `{{{field}}}` placeholders.
//!
//! Both placeholder forms substitute the raw text of the field; nothing is
//! escaped. Strings are inserted verbatim, everything else as compact JSON.

use std::collections::HashSet;

use serde_json::Value;

use crate::core::contract::SchemaContract;
use crate::core::error::{DefinitionError, RenderError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    /// Placeholders bound to optional input fields; these render as empty text when absent.
    optional: HashSet<String>,
}

impl PromptTemplate {
    /// Parses `text` into literal and placeholder segments.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start..];
            let (open, close) = if after_open.starts_with("{{{") {
                ("{{{", "}}}")
            } else {
                ("{{", "}}")
            };
            let body = &after_open[open.len()..];
            let end = body.find(close).ok_or_else(|| {
                DefinitionError::MalformedTemplate(format!(
                    "unterminated placeholder starting at byte {}",
                    text.len() - rest.len() + start
                ))
            })?;
            let name = body[..end].trim();
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(DefinitionError::MalformedTemplate(format!(
                    "invalid placeholder name '{}'",
                    &body[..end]
                )));
            }
            segments.push(Segment::Placeholder(name.to_string()));
            rest = &body[end + close.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            segments,
            optional: HashSet::new(),
        })
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Binds the template to the input contract of `flow`.
    ///
    /// Every placeholder must name a field of `contract`. Placeholders bound to
    /// optional fields are remembered so that they can render empty.
    pub fn bind(mut self, flow: &str, contract: &SchemaContract) -> Result<Self, DefinitionError> {
        let mut optional = HashSet::new();
        for name in self.placeholders() {
            let field = contract
                .field(name)
                .ok_or_else(|| DefinitionError::UnresolvedPlaceholder {
                    flow: flow.to_string(),
                    placeholder: name.to_string(),
                })?;
            if !field.required {
                optional.insert(name.to_string());
            }
        }
        self.optional = optional;
        Ok(self)
    }

    /// Renders the template against an input object.
    ///
    /// Pure: the same template and input always produce the same text.
    pub fn render(&self, input: &Value) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match input.get(name) {
                    None | Some(Value::Null) if self.optional.contains(name) => {}
                    None | Some(Value::Null) => {
                        return Err(RenderError {
                            field: name.clone(),
                        });
                    }
                    Some(Value::String(text)) => out.push_str(text),
                    Some(other) => out.push_str(&other.to_string()),
                },
            }
        }
        Ok(out)
    }
}
