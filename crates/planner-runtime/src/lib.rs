//! # planner-runtime
//!
//! Completion providers for the planner and the tool loop.
//!
//! ## Providers
//!
//! - **OpenAI** (default): chat completions with function calling against any
//!   OpenAI-compatible endpoint
//!
//! ## Usage
//!
//! ```rust,ignore
//! use planner_runtime::openai::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env()?;
//! let planner = Planner::new(Arc::new(provider), GenerationOptions::default());
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use planner_core::{
    AgentError, GenerationOptions, LlmProvider, Message, Planner, Result, Role, Session, Tool,
    ToolLoop, ToolRegistry,
};
