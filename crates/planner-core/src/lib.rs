//! # planner-core
//!
//! Structured driving of a function-calling LLM: an expression evaluator, a
//! recursive planner built on it, and an interactive tool loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │   Planner    │────▶│  Evaluator   │──┐
//! └──────────────┘     └──────────────┘  │    ┌──────────────────┐
//!                                        ├───▶│   LlmProvider    │
//! ┌──────────────┐     ┌──────────────┐  │    │   (Strategy)     │
//! │  Tool Loop   │────▶│ ToolRegistry │  │    └──────────────────┘
//! └──────────────┘     └──────────────┘  │
//!        └───────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait is the only point of contact with the remote
//! completion service.

pub mod error;
pub mod expr;
pub mod function;
pub mod message;
pub mod planner;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{AgentError, Result};
pub use expr::{DataResponse, Evaluator, Expr, FunctionRegistry, LlmFunction, ResponseValue};
pub use function::{FunctionCall, FunctionDeclaration, ParameterSchema};
pub use message::{Message, Role};
pub use planner::{PlanStep, Planner};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use reasoning::{Operator, ToolLoop, ToolLoopBuilder};
pub use session::Session;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
