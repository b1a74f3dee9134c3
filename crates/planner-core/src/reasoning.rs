//! Reasoning Loop
//!
//! Thought / Action / PAUSE / Observation loop over native function calling.
//! The model picks a tool, the tool's output is appended as a `function`
//! turn, and the loop continues until the model stops without calling
//! anything.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::session::Session;
use crate::tool::{Tool, ToolCall, ToolRegistry};

/// System instruction seeding every session
pub const REACT_PROMPT: &str = r"You run in a loop of Thought, Action, PAUSE, Observation.
At the end of the loop you output an Answer
Use Thought to describe your thoughts about the question you have been asked.
Use Action to run one of the actions available to you - then return PAUSE.
Observation will be the result of running those actions.

Your available actions are given in the 'functions' parameter.

Example session:

Question: What is the capital of France?
Thought: I should look up France on Google
Action: google: France
PAUSE

You will be called again with this:

Observation: France is a country. The capital is Paris.

You then output:

Answer: The capital of France is Paris";

/// The human on the other end of a session
#[async_trait]
pub trait Operator: Send {
    /// Ask a question and wait for a line of input
    async fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Show a line of output
    fn show(&mut self, line: &str);
}

/// Loop configuration
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// System instruction
    pub system_prompt: String,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            system_prompt: REACT_PROMPT.into(),
            generation: GenerationOptions::default(),
        }
    }
}

/// Interactive tool loop
pub struct ToolLoop {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: LoopConfig,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: LoopConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Run one session to completion
    pub async fn run(&self, operator: &mut dyn Operator) -> Result<Session> {
        let mut session = Session::with_system_prompt(self.config.system_prompt.clone());
        tracing::info!(
            session = %session.id,
            provider = self.provider.name(),
            tools = self.tools.len(),
            "session started"
        );
        if self.tools.is_empty() {
            tracing::warn!(session = %session.id, "no tools registered");
        }

        let input = operator.ask("User: ").await?;
        session.push(Message::user(input));

        let functions = self.tools.declarations();

        loop {
            let completion = self
                .provider
                .complete(session.messages(), &functions, &self.config.generation)
                .await?;
            let halted = completion.halted();
            let message = completion.message;

            session.push(message.clone());
            if let Some(content) = message.text() {
                operator.show(&format!("Assistant: {content}"));
            }

            if let Some(call) = &message.function_call {
                operator.show(&format!("[{}]: {}", call.name, call.arguments));
                tracing::info!(session = %session.id, tool = %call.name, "dispatching tool");

                let tool_call = ToolCall::try_from(call)?;
                let result = self.tools.execute(&tool_call).await?;

                operator.show(&format!("Observation: {}", result.output));
                session.push(Message::function(&call.name, result.output));
                continue;
            }

            if halted {
                break;
            }
        }

        session.end();
        tracing::info!(session = %session.id, turns = session.message_count(), "session ended");
        operator.show("End session.");
        Ok(session)
    }
}

/// Builder for the tool loop
#[derive(Default)]
pub struct ToolLoopBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: LoopConfig,
}

impl ToolLoopBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn generation(mut self, options: GenerationOptions) -> Self {
        self.config.generation = options;
        self
    }

    pub fn build(self) -> Result<ToolLoop> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(ToolLoop::new(provider, Arc::new(self.tools), self.config))
    }
}
