//! Scripted port implementations shared by the use case tests.

use crate::ports::completion_provider::{
    CompletionProvider, CompletionRequest, ProviderError, ProviderFactory,
};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::tool_executor::ToolExecutorPort;
use async_trait::async_trait;
use prismatic_domain::{
    AgentSpec, ContentBlock, GenerationParams, Message, StopReason, ToolDefinition, ToolError,
    ToolOutput, TurnResult,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn request() -> CompletionRequest {
    CompletionRequest {
        system: Vec::new(),
        messages: vec![Arc::new(Message::user("hello"))],
        tools: Vec::new(),
        params: GenerationParams::default(),
    }
}

/// A turn that asks for the given tools, in order.
pub fn tool_turn(calls: &[(&str, &str, Value)]) -> TurnResult {
    TurnResult {
        content: calls
            .iter()
            .map(|(id, name, input)| ContentBlock::tool_use(*id, *name, input.clone()))
            .collect(),
        stop_reason: StopReason::ToolUse,
        usage: Default::default(),
        model: None,
    }
}

/// Provider returning pre-recorded results in order.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<TurnResult, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<TurnResult, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(TurnResult::from_text(*t))).collect())
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn generate(&self, request: &CompletionRequest) -> Result<TurnResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Other("script exhausted".to_string())))
    }
}

/// Factory mapping agent names to scripted providers.
#[derive(Default)]
pub struct ScriptedFactory {
    providers: HashMap<String, Arc<ScriptedProvider>>,
}

impl ScriptedFactory {
    pub fn with(mut self, agent: &str, provider: ScriptedProvider) -> Self {
        self.providers.insert(agent.to_string(), Arc::new(provider));
        self
    }

    pub fn provider(&self, agent: &str) -> Arc<ScriptedProvider> {
        Arc::clone(&self.providers[agent])
    }
}

impl ProviderFactory for ScriptedFactory {
    fn create(&self, agent: &AgentSpec) -> Arc<dyn CompletionProvider> {
        match self.providers.get(agent.name()) {
            Some(provider) => provider.clone(),
            None => Arc::new(ScriptedProvider::new(Vec::new())),
        }
    }
}

/// Tool executor recording every invocation.
///
/// Tools named `fail` return an error-flagged output.
pub struct RecordingTools {
    definitions: Vec<ToolDefinition>,
    invocations: Mutex<Vec<(String, Value)>>,
}

impl RecordingTools {
    pub fn new(names: &[&str]) -> Self {
        Self {
            definitions: names
                .iter()
                .map(|n| ToolDefinition::new(*n, format!("{} tool", n)))
                .collect(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutorPort for RecordingTools {
    async fn list_tools(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }

    async fn invoke(&self, name: &str, arguments: &Value) -> ToolOutput {
        self.invocations
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        if name == "fail" {
            ToolOutput::failure(ToolError::execution_failed("boom"))
        } else {
            ToolOutput::success(format!("{} ok", name))
        }
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}
