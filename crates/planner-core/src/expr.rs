//! Expression Evaluator
//!
//! A small interpreter that turns a prompt or a capability application into a
//! terminal response through one or more completion round trips.
//!
//! ```text
//!   Prompt(text) ──complete(outer declarations)──┐
//!                                                ├─► deserialize ─► Response
//!   Apply(f, args) ──complete(f's helpers)───────┘        │
//!        ▲                                                │
//!        └──────────── non-data function call ◄───────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};
use crate::function::{FunctionDeclaration, is_data_function};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};

/// One pending unit of work
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Raw prompt sent with the registry's declarations
    Prompt(String),
    /// Capability application
    Apply {
        function: String,
        arguments: Map<String, Value>,
    },
    /// Terminal value
    Response(ResponseValue),
}

/// Terminal value of an evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Data(DataResponse),
    Text(String),
}

impl ResponseValue {
    pub const fn as_data(&self) -> Option<&DataResponse> {
        match self {
            Self::Data(data) => Some(data),
            Self::Text(_) => None,
        }
    }
}

/// Marker distinguishing structured output from conversational text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMeta {
    #[default]
    Data,
}

/// Structured output produced by a `__data_` function call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    pub meta: DataMeta,
    pub name: String,
    pub data: Map<String, Value>,
}

impl DataResponse {
    pub fn new(name: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            meta: DataMeta::Data,
            name: name.into(),
            data,
        }
    }
}

/// A capability the model may invoke by name.
///
/// Applying it sends a capability-specific prompt together with the
/// capability's own helper declarations, which are usually `__data_`
/// functions coercing the answer into a few canonical shapes.
pub trait LlmFunction: Send + Sync {
    /// Declaration advertised to the model
    fn declaration(&self) -> FunctionDeclaration;

    /// Declarations offered while applying this capability
    fn helper_functions(&self) -> Vec<FunctionDeclaration>;

    /// Prompt built from the call arguments
    fn prompt(&self, arguments: &Map<String, Value>) -> Result<String>;
}

/// Registry of capabilities keyed by declaration name
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn LlmFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability
    pub fn register<F: LlmFunction + 'static>(&mut self, function: F) {
        let name = function.declaration().name;
        self.functions.insert(name, Arc::new(function));
    }

    /// Get a capability by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmFunction>> {
        self.functions.get(name).cloned()
    }

    /// Declarations of every registered capability, ordered by name
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        let mut decls: Vec<_> = self.functions.values().map(|f| f.declaration()).collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        decls
    }
}

/// Evaluates expressions against a provider and a capability registry
pub struct Evaluator {
    provider: Arc<dyn LlmProvider>,
    functions: Arc<FunctionRegistry>,
    options: GenerationOptions,
}

impl Evaluator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        functions: Arc<FunctionRegistry>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            functions,
            options,
        }
    }

    /// Evaluate until a terminal response is reached
    pub async fn eval(&self, expr: Expr) -> Result<ResponseValue> {
        let mut expr = expr;

        loop {
            tracing::debug!(?expr, "eval");

            expr = match expr {
                Expr::Response(value) => return Ok(value),
                Expr::Prompt(text) => {
                    let functions = self.functions.declarations();
                    let completion = self
                        .provider
                        .complete_prompt(&text, &functions, &self.options)
                        .await?;
                    deserialize_completion(&completion.message)?
                }
                Expr::Apply {
                    function,
                    arguments,
                } => {
                    let func = self
                        .functions
                        .get(&function)
                        .ok_or(AgentError::UnknownFunction(function))?;
                    let prompt = func.prompt(&arguments)?;
                    let completion = self
                        .provider
                        .complete_prompt(&prompt, &func.helper_functions(), &self.options)
                        .await?;
                    deserialize_completion(&completion.message)?
                }
            };
        }
    }

    /// Evaluate a raw prompt
    pub async fn eval_prompt(&self, prompt: impl Into<String>) -> Result<ResponseValue> {
        self.eval(Expr::Prompt(prompt.into())).await
    }
}

/// Turn a raw assistant message into the next expression
pub fn deserialize_completion(message: &Message) -> Result<Expr> {
    if let Some(call) = &message.function_call {
        let arguments = call.parse_arguments()?;

        if is_data_function(&call.name) {
            return Ok(Expr::Response(ResponseValue::Data(DataResponse::new(
                call.name.clone(),
                arguments,
            ))));
        }
        return Ok(Expr::Apply {
            function: call.name.clone(),
            arguments,
        });
    }

    if let Some(text) = message.text() {
        return Ok(Expr::Response(ResponseValue::Text(text.to_string())));
    }

    Err(AgentError::Protocol(format!(
        "completion has neither content nor a function call: {}",
        serde_json::to_string(message)?
    )))
}
