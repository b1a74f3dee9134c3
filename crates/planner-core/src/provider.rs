//! LLM Provider Strategy Pattern
//!
//! The completion gateway: a common interface for any chat-completion backend
//! with function calling. The evaluator and the tool loop work exclusively
//! through this trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use planner_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OpenAiProvider::from_env()?;
//! let completion = provider.complete(&messages, &functions, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::FunctionDeclaration;
use crate::message::Message;

/// Default chat model with function-calling support
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: String,

    /// Sampling temperature; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate; provider default when unset
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl GenerationOptions {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The assistant message (content and/or function call)
    pub message: Message,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Whether the model asked to stop
    pub fn halted(&self) -> bool {
        self.finish_reason == Some(FinishReason::Stop)
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    FunctionCall,
    ContentFilter,
    #[serde(other)]
    Other,
}

/// Strategy trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Generate a completion from messages, offering `functions` to the model
    async fn complete(
        &self,
        messages: &[Message],
        functions: &[FunctionDeclaration],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// Complete a single user prompt
    async fn complete_prompt(
        &self,
        prompt: &str,
        functions: &[FunctionDeclaration],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.complete(&[Message::user(prompt)], functions, options)
            .await
    }
}
