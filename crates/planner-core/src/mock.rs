//! Scripted provider for tests: replays queued completions in order and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::function::{FunctionCall, FunctionDeclaration};
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider};

/// One recorded gateway request
#[derive(Clone, Debug)]
pub struct Request {
    pub messages: Vec<Message>,
    pub functions: Vec<String>,
}

impl Request {
    /// Content of the last message in the request
    pub fn last_text(&self) -> &str {
        self.messages
            .last()
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[Message],
        functions: &[FunctionDeclaration],
        _options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().unwrap().push(Request {
            messages: messages.to_vec(),
            functions: functions.iter().map(|f| f.name.clone()).collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::Provider("script exhausted".into()))
    }
}

fn completion(message: Message, finish_reason: FinishReason) -> Completion {
    Completion {
        message,
        model: "scripted".into(),
        usage: None,
        finish_reason: Some(finish_reason),
    }
}

/// Plain text reply that ends the turn
pub fn stop(content: &str) -> Completion {
    completion(Message::assistant(content), FinishReason::Stop)
}

/// Plain text reply cut off by the token limit
pub fn truncated(content: &str) -> Completion {
    completion(Message::assistant(content), FinishReason::Length)
}

/// Function-call reply
pub fn call(name: &str, arguments: &Value) -> Completion {
    completion(
        Message::function_call(FunctionCall::new(name, arguments.to_string())),
        FinishReason::FunctionCall,
    )
}

/// Function-call reply that also carries the stop signal
pub fn call_with_stop(name: &str, arguments: &Value) -> Completion {
    Completion {
        finish_reason: Some(FinishReason::Stop),
        ..call(name, arguments)
    }
}

/// Reply with neither content nor a function call
pub fn empty() -> Completion {
    let mut message = Message::assistant("");
    message.content = None;
    completion(message, FinishReason::Stop)
}
