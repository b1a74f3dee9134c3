//! Callable Declarations
//!
//! Schemas advertised to the model through the `functions` request field,
//! and the function-call requests the model sends back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{AgentError, Result};

/// Reserved prefix for declarations that only coerce a structured answer.
pub const DATA_FUNCTION_PREFIX: &str = "__data_";

/// Whether a function name denotes terminal data rather than a capability
pub fn is_data_function(name: &str) -> bool {
    name.starts_with(DATA_FUNCTION_PREFIX)
}

/// Parameter definition for a declaration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Element type when `param_type` is `array`
    #[serde(default)]
    pub items: Option<String>,

    /// Enum of allowed values
    #[serde(default)]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: None,
            required: false,
            items: None,
            enum_values: None,
        }
    }

    pub fn array_of(name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            param_type: "array".into(),
            items: Some(item_type.into()),
            ..Self::string(name)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn one_of(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    fn property(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.param_type));
        if let Some(description) = &self.description {
            prop.insert("description".into(), json!(description));
        }
        if let Some(items) = &self.items {
            prop.insert("items".into(), json!({ "type": items }));
        }
        if let Some(values) = &self.enum_values {
            prop.insert("enum".into(), Value::Array(values.clone()));
        }
        Value::Object(prop)
    }
}

/// A named capability the model may call instead of answering in text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Unique name within one request
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParameterSchema) -> Self {
        self.parameters.push(param);
        self
    }

    /// Render the parameters as a JSON-schema object
    pub fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.property()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Check that every required parameter is present
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<()> {
        for param in &self.parameters {
            if param.required && !arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "{}: missing required parameter '{}'",
                    self.name, param.name
                )));
            }
        }
        Ok(())
    }
}

/// Function-call request returned by the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,

    /// Arguments as a serialized JSON object
    #[serde(default)]
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Decode the serialized arguments; an empty payload is an empty object
    pub fn parse_arguments(&self) -> Result<Map<String, Value>> {
        if self.arguments.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&self.arguments)?)
    }
}
