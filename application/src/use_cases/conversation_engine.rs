//! Conversation engine
//!
//! Drives one agent's multi-turn exchange with a completion provider:
//! request a turn, dispatch any requested tools, send their results back,
//! and repeat until the model stops or the iteration cap is reached.

use crate::ports::completion_provider::{CompletionProvider, CompletionRequest, ProviderError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, kind,
};
use crate::ports::tool_executor::ToolExecutorPort;
use prismatic_domain::util::preview;
use prismatic_domain::{
    AgentSpec, ContentBlock, ConversationState, GenerationParams, Message, StopReason,
    ToolDefinition, ToolError, ToolOutput, TurnResult, Usage, annotate_messages, annotate_system,
    annotate_tools, final_text, full_transcript,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineStop {
    /// The model ended the exchange (end of turn, stop sequence, token cap, ...).
    Completed(StopReason),
    /// `max_iterations` model calls were made.
    IterationLimit,
    /// The provider failed; turns collected so far are kept.
    ProviderFailed(ProviderError),
}

/// Turns produced by one [`ConversationEngine::run`].
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub agent: String,
    pub turns: Vec<TurnResult>,
    pub stop: EngineStop,
}

impl EngineRun {
    pub fn final_text(&self) -> String {
        final_text(&self.turns)
    }

    pub fn transcript(&self) -> String {
        full_transcript(&self.turns)
    }

    pub fn usage(&self) -> Usage {
        Usage::total(&self.turns)
    }

    pub fn failure(&self) -> Option<&ProviderError> {
        match &self.stop {
            EngineStop::ProviderFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Turn a provider failure into an `Err`, dropping partial turns.
    pub fn into_result(self) -> Result<EngineRun, ProviderError> {
        match self.stop {
            EngineStop::ProviderFailed(error) => Err(error),
            _ => Ok(self),
        }
    }
}

/// One agent's conversation with a provider.
///
/// Holds the agent's history between runs when `use_history` is set.
pub struct ConversationEngine {
    agent: Arc<AgentSpec>,
    provider: Arc<dyn CompletionProvider>,
    tools: Arc<dyn ToolExecutorPort>,
    logger: Arc<dyn ConversationLogger>,
    state: ConversationState,
}

impl ConversationEngine {
    pub fn new(
        agent: Arc<AgentSpec>,
        provider: Arc<dyn CompletionProvider>,
        tools: Arc<dyn ToolExecutorPort>,
    ) -> Self {
        Self {
            agent,
            provider,
            tools,
            logger: Arc::new(NoConversationLogger),
            state: ConversationState::new(),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn agent(&self) -> &AgentSpec {
        &self.agent
    }

    /// History retained from the previous run.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Run the conversation seeded with `initial`.
    ///
    /// Never makes more than `params.max_iterations` model calls. A provider
    /// failure ends the run with [`EngineStop::ProviderFailed`] and keeps the
    /// turns gathered before it.
    pub async fn run(&mut self, initial: Message, params: &GenerationParams) -> EngineRun {
        let agent = self.agent.name().to_string();

        let mut history: Vec<Arc<Message>> = if params.use_history {
            self.state.messages().to_vec()
        } else {
            Vec::new()
        };
        history.push(Arc::new(initial));

        let catalog: Vec<Arc<ToolDefinition>> = self
            .tools
            .list_tools()
            .await
            .into_iter()
            .filter(|t| self.agent.allows_tool(&t.name))
            .map(Arc::new)
            .collect();
        let system = self.agent.system_blocks();

        debug!(
            "Agent {} starting with {} tools, {} prior messages",
            agent,
            catalog.len(),
            history.len() - 1
        );

        let mut turns = Vec::new();
        let mut stop = EngineStop::IterationLimit;

        for iteration in 1..=params.max_iterations {
            let request = CompletionRequest {
                system: annotate_system(&system),
                messages: annotate_messages(&history),
                tools: annotate_tools(&catalog),
                params: params.clone(),
            };

            let turn = match self.provider.generate(&request).await {
                Ok(turn) => turn,
                Err(e) => {
                    error!("Agent {} turn {} failed: {}", agent, iteration, e);
                    self.logger.log(ConversationEvent::new(
                        kind::PROVIDER_ERROR,
                        json!({
                            "agent": agent,
                            "turn": iteration,
                            "kind": e.kind(),
                            "error": e.to_string(),
                        }),
                    ));
                    stop = EngineStop::ProviderFailed(e);
                    break;
                }
            };

            debug!(
                "Agent {} turn {} ({}) stopped with {}",
                agent,
                iteration,
                turn.model.as_deref().unwrap_or("default model"),
                turn.stop_reason
            );
            self.logger.log(ConversationEvent::new(
                kind::LLM_TURN,
                json!({
                    "agent": agent,
                    "turn": iteration,
                    "stop_reason": turn.stop_reason.as_str(),
                    "text": turn.last_text().unwrap_or_default(),
                    "tool_calls": turn.tool_uses().count(),
                    "usage": turn.usage,
                }),
            ));

            history.push(Arc::new(turn.to_message()));

            if turn.stop_reason != StopReason::ToolUse || !turn.has_tool_use() {
                stop = EngineStop::Completed(turn.stop_reason.clone());
                turns.push(turn);
                break;
            }

            let results = self.dispatch_tools(&turn).await;
            history.push(Arc::new(Message::user_blocks(results)));
            turns.push(turn);
        }

        if stop == EngineStop::IterationLimit {
            warn!(
                "Agent {} reached the iteration limit ({})",
                agent, params.max_iterations
            );
        }

        if params.use_history {
            self.state.commit(history);
        } else {
            self.state.clear();
        }

        let run = EngineRun { agent, turns, stop };
        let usage = run.usage();
        info!(
            "Agent {} finished after {} turns ({}), tokens in/out {}/{}",
            run.agent,
            run.turns.len(),
            stop_label(&run.stop),
            usage.input_tokens,
            usage.output_tokens
        );
        self.logger.log(ConversationEvent::new(
            kind::AGENT_FINISHED,
            json!({
                "agent": run.agent,
                "turns": run.turns.len(),
                "stop": stop_label(&run.stop),
                "usage": usage,
                "final_text": run.final_text(),
            }),
        ));
        run
    }

    /// Execute every tool call of `turn` in emission order.
    async fn dispatch_tools(&self, turn: &TurnResult) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for (id, name, input) in turn.tool_uses() {
            self.logger.log(ConversationEvent::new(
                kind::TOOL_CALL,
                json!({
                    "agent": self.agent.name(),
                    "tool_use_id": id,
                    "tool": name,
                    "input": input,
                }),
            ));

            let output = if self.agent.allows_tool(name) {
                debug!("Agent {} calling tool {} with {}", self.agent.name(), name, input);
                self.tools.invoke(name, input).await
            } else {
                warn!(
                    "Agent {} requested tool {} outside its permission set",
                    self.agent.name(),
                    name
                );
                ToolOutput::failure(ToolError::not_permitted(name, self.agent.name()))
            };

            self.logger.log(ConversationEvent::new(
                kind::TOOL_RESULT,
                json!({
                    "agent": self.agent.name(),
                    "tool_use_id": id,
                    "tool": name,
                    "is_error": output.is_error,
                    "output_preview": preview(&output.content, 200),
                }),
            ));

            results.push(ContentBlock::tool_result(id, output.content, output.is_error));
        }

        results
    }
}

fn stop_label(stop: &EngineStop) -> String {
    match stop {
        EngineStop::Completed(reason) => reason.as_str().to_string(),
        EngineStop::IterationLimit => "iteration_limit".to_string(),
        EngineStop::ProviderFailed(e) => format!("provider_failed:{}", e.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_executor::NoTools;
    use crate::testing::{RecordingLogger, RecordingTools, ScriptedProvider, tool_turn};
    use prismatic_domain::{CacheControl, Role};

    fn agent() -> Arc<AgentSpec> {
        Arc::new(AgentSpec::new("reviewer", "You review code.").with_tools(["read_file", "fail"]))
    }

    fn engine(provider: Arc<ScriptedProvider>, tools: Arc<dyn ToolExecutorPort>) -> ConversationEngine {
        ConversationEngine::new(agent(), provider, tools)
    }

    #[tokio::test]
    async fn test_stops_on_end_turn() {
        let provider = Arc::new(ScriptedProvider::texts(&["all good"]));
        let mut engine = engine(provider.clone(), Arc::new(NoTools));

        let run = engine
            .run(Message::user("review this"), &GenerationParams::default())
            .await;

        assert_eq!(run.stop, EngineStop::Completed(StopReason::EndTurn));
        assert_eq!(run.final_text(), "all good");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_stops_on_max_tokens_and_stop_sequence() {
        for reason in [StopReason::MaxTokens, StopReason::StopSequence] {
            let mut turn = TurnResult::from_text("partial");
            turn.stop_reason = reason.clone();
            let provider = Arc::new(ScriptedProvider::new(vec![Ok(turn)]));
            let mut engine = engine(provider.clone(), Arc::new(NoTools));

            let run = engine.run(Message::user("x"), &GenerationParams::default()).await;

            assert_eq!(run.stop, EngineStop::Completed(reason));
            assert_eq!(provider.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_dispatches_tools_in_order_and_sends_results_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_turn(&[
                ("t1", "read_file", json!({"path": "a.rs"})),
                ("t2", "fail", json!({})),
            ])),
            Ok(TurnResult::from_text("done")),
        ]));
        let tools = Arc::new(RecordingTools::new(&["read_file", "fail"]));
        let mut engine = engine(provider.clone(), tools.clone());

        let run = engine.run(Message::user("go"), &GenerationParams::default()).await;

        assert_eq!(run.turns.len(), 2);
        let names: Vec<String> = tools.invocations().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["read_file", "fail"]);

        // Second request: user, assistant(tool_use), user(tool_results)
        let second = &provider.requests()[1];
        assert_eq!(second.messages.len(), 3);
        let results = &second.messages[2];
        assert_eq!(results.role, Role::User);
        let parsed: Vec<_> = results
            .content
            .iter()
            .filter_map(ContentBlock::as_tool_result)
            .collect();
        assert_eq!(parsed[0], ("t1", "read_file ok", false));
        assert_eq!(parsed[1].0, "t2");
        assert!(parsed[1].2, "failing tool must be flagged as error");
    }

    #[tokio::test]
    async fn test_unpermitted_tool_is_rejected_without_invocation() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_turn(&[("t1", "delete_everything", json!({}))])),
            Ok(TurnResult::from_text("ok")),
        ]));
        let tools = Arc::new(RecordingTools::new(&["read_file", "delete_everything"]));
        let mut engine = engine(provider.clone(), tools.clone());

        engine.run(Message::user("go"), &GenerationParams::default()).await;

        assert!(tools.invocations().is_empty());
        let request = &provider.requests()[1];
        let (_, content, is_error) = request.messages[2].content[0].as_tool_result().unwrap();
        assert!(is_error);
        assert!(content.contains("not available to agent 'reviewer'"));
        // Catalog only offers permitted tools
        let offered: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(offered, vec!["read_file"]);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_iterations() {
        let provider = Arc::new(ScriptedProvider::new(
            (0..10)
                .map(|i| Ok(tool_turn(&[(&*format!("t{}", i), "read_file", json!({}))])))
                .collect(),
        ));
        let tools = Arc::new(RecordingTools::new(&["read_file"]));
        let mut engine = engine(provider.clone(), tools.clone());
        let params = GenerationParams::default().with_max_iterations(3);

        let run = engine.run(Message::user("loop"), &params).await;

        assert_eq!(provider.calls(), 3);
        assert_eq!(run.turns.len(), 3);
        assert_eq!(run.stop, EngineStop::IterationLimit);
        // Tools of the last turn still ran
        assert_eq!(tools.invocations().len(), 3);
    }

    #[tokio::test]
    async fn test_zero_iterations_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::texts(&["never"]));
        let mut engine = engine(provider.clone(), Arc::new(NoTools));

        let run = engine
            .run(Message::user("x"), &GenerationParams::default().with_max_iterations(0))
            .await;

        assert_eq!(provider.calls(), 0);
        assert!(run.turns.is_empty());
        assert_eq!(run.final_text(), "");
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_partial_turns() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_turn(&[("t1", "read_file", json!({}))])),
            Err(ProviderError::InvalidRequest("too long".to_string())),
        ]));
        let mut engine = engine(provider.clone(), Arc::new(RecordingTools::new(&["read_file"])));

        let run = engine.run(Message::user("x"), &GenerationParams::default()).await;

        assert_eq!(run.turns.len(), 1);
        assert!(matches!(run.failure(), Some(ProviderError::InvalidRequest(_))));
        assert!(run.into_result().is_err());
    }

    #[tokio::test]
    async fn test_history_is_kept_only_with_use_history() {
        let provider = Arc::new(ScriptedProvider::texts(&["first", "second"]));
        let mut engine = engine(provider.clone(), Arc::new(NoTools));
        let params = GenerationParams::default().with_history(true);

        engine.run(Message::user("one"), &params).await;
        assert_eq!(engine.state().len(), 2);
        engine.run(Message::user("two"), &params).await;

        let second = &provider.requests()[1];
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[0].text_content(), "one");
        assert_eq!(engine.state().len(), 4);
    }

    #[tokio::test]
    async fn test_history_is_discarded_without_use_history() {
        let provider = Arc::new(ScriptedProvider::texts(&["first", "second"]));
        let mut engine = engine(provider.clone(), Arc::new(NoTools));
        let params = GenerationParams::default();

        engine.run(Message::user("one"), &params).await;
        engine.run(Message::user("two"), &params).await;

        assert_eq!(provider.requests()[1].messages.len(), 1);
        assert!(engine.state().is_empty());
    }

    #[tokio::test]
    async fn test_requests_carry_cache_markers() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_turn(&[("t1", "read_file", json!({}))])),
            Ok(TurnResult::from_text("done")),
        ]));
        let tools = Arc::new(RecordingTools::new(&["read_file"]));
        let mut engine = engine(provider.clone(), tools);

        engine.run(Message::user("x"), &GenerationParams::default()).await;

        for request in provider.requests() {
            assert_eq!(
                request.system.last().unwrap().cache_control,
                Some(CacheControl::Ephemeral)
            );
            assert!(request.tools.last().unwrap().cache_control.is_some());
            let last = request.messages.last().unwrap();
            assert!(last.last_block().unwrap().cache_control().is_some());
            // Only the final message is marked
            for message in &request.messages[..request.messages.len() - 1] {
                assert!(message.content.iter().all(|b| b.cache_control().is_none()));
            }
        }
    }

    #[tokio::test]
    async fn test_logs_turn_and_tool_events() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_turn(&[("t1", "read_file", json!({}))])),
            Ok(TurnResult::from_text("done")),
        ]));
        let logger = Arc::new(RecordingLogger::default());
        let mut engine = engine(provider, Arc::new(RecordingTools::new(&["read_file"])))
            .with_conversation_logger(logger.clone());

        engine.run(Message::user("x"), &GenerationParams::default()).await;

        assert_eq!(
            logger.event_types(),
            vec!["llm_turn", "tool_call", "tool_result", "llm_turn", "agent_finished"]
        );
    }
}
