use crate::core::contract::SchemaContract;
use crate::core::error::DefinitionError;
use crate::core::template::PromptTemplate;

/// A named unit binding an input contract, an output contract and a prompt.
///
/// Built once at startup and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDefinition {
    name: String,
    description: String,
    input: SchemaContract,
    output: SchemaContract,
    template: PromptTemplate,
    output_shape: String,
}

impl FlowDefinition {
    pub fn builder(name: impl Into<String>) -> FlowDefinitionBuilder {
        FlowDefinitionBuilder {
            name: name.into(),
            description: String::new(),
            input: None,
            output: None,
            template: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input(&self) -> &SchemaContract {
        &self.input
    }

    pub fn output(&self) -> &SchemaContract {
        &self.output
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// The output contract's shape description, computed once at build time.
    pub fn output_shape(&self) -> &str {
        &self.output_shape
    }
}

/// Builder for [`FlowDefinition`].
pub struct FlowDefinitionBuilder {
    name: String,
    description: String,
    input: Option<SchemaContract>,
    output: Option<SchemaContract>,
    template: Option<String>,
}

impl FlowDefinitionBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn input(mut self, contract: SchemaContract) -> Self {
        self.input = Some(contract);
        self
    }

    pub fn output(mut self, contract: SchemaContract) -> Self {
        self.output = Some(contract);
        self
    }

    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }

    /// Parses the template and checks every placeholder against the input contract.
    pub fn build(self) -> Result<FlowDefinition, DefinitionError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        let missing = |part| DefinitionError::MissingPart {
            flow: name.clone(),
            part,
        };

        let input = self.input.ok_or_else(|| missing("input contract"))?;
        let output = self.output.ok_or_else(|| missing("output contract"))?;
        let text = self.template.ok_or_else(|| missing("prompt template"))?;
        let template = PromptTemplate::parse(&text)?.bind(&name, &input)?;
        let output_shape = output.describe();

        Ok(FlowDefinition {
            name,
            description: self.description,
            input,
            output,
            template,
            output_shape,
        })
    }
}
