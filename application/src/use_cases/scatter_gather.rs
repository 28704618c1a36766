//! Scatter-gather use case
//!
//! Runs every fan-out agent of a [`ScatterGatherJob`] concurrently on the
//! same input, then feeds their labeled outputs to the fan-in agent.

use crate::config::RetryPolicy;
use crate::ports::completion_provider::{ProviderError, ProviderFactory};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, kind,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::conversation_engine::{ConversationEngine, EngineRun};
use crate::use_cases::retrying_provider::RetryingProvider;
use prismatic_domain::{
    AgentOutput, AgentSpec, GenerationParams, Message, Phase, ScatterGatherJob,
    compose_fan_in_message,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a scatter-gather job
#[derive(Error, Debug)]
pub enum ScatterGatherError {
    #[error("Fan-out agent '{agent}' failed: {source}")]
    FanOutFailed {
        agent: String,
        source: ProviderError,
    },

    #[error("Fan-in agent '{agent}' failed: {source}")]
    FanInFailed {
        agent: String,
        source: ProviderError,
    },

    #[error("Agent task failed: {0}")]
    TaskFailed(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result of a completed job.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterGatherOutput {
    /// Final text of the fan-in agent
    pub final_text: String,
    /// Fan-out outputs in declaration order
    pub outputs: Vec<AgentOutput>,
    pub fan_in: AgentOutput,
}

/// Use case for running scatter-gather jobs
pub struct ScatterGatherUseCase {
    providers: Arc<dyn ProviderFactory>,
    tools: Arc<dyn ToolExecutorPort>,
    retry: RetryPolicy,
    logger: Arc<dyn ConversationLogger>,
}

impl ScatterGatherUseCase {
    pub fn new(providers: Arc<dyn ProviderFactory>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            providers,
            tools,
            retry: RetryPolicy::default(),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Build an engine for `agent` whose provider retries transient failures.
    pub fn engine_for(&self, agent: &Arc<AgentSpec>) -> ConversationEngine {
        let provider = Arc::new(RetryingProvider::new(
            self.providers.create(agent),
            self.retry.clone(),
        ));
        ConversationEngine::new(Arc::clone(agent), provider, Arc::clone(&self.tools))
            .with_conversation_logger(Arc::clone(&self.logger))
    }

    /// Execute the job with default (no-op) progress and no cancellation
    pub async fn execute(
        &self,
        job: &ScatterGatherJob,
        input: &str,
    ) -> Result<String, ScatterGatherError> {
        let output = self.execute_with_progress(job, input, &NoProgress, None).await?;
        Ok(output.final_text)
    }

    /// Execute the job with progress callbacks
    ///
    /// A fatal failure of any fan-out agent aborts the remaining agents and
    /// the fan-in agent is never started. Cancelling `cancellation` has the
    /// same effect and returns [`ScatterGatherError::Cancelled`].
    pub async fn execute_with_progress(
        &self,
        job: &ScatterGatherJob,
        input: &str,
        progress: &dyn ProgressNotifier,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ScatterGatherOutput, ScatterGatherError> {
        info!(
            "Starting scatter-gather with {} fan-out agents",
            job.fan_out().len()
        );

        let outputs = self.phase_fan_out(job, input, progress, cancellation).await?;

        if cancellation.is_some_and(|t| t.is_cancelled()) {
            return Err(ScatterGatherError::Cancelled);
        }

        let fan_in = self
            .phase_fan_in(job, &outputs, progress, cancellation)
            .await?;

        Ok(ScatterGatherOutput {
            final_text: fan_in.text.clone(),
            outputs,
            fan_in,
        })
    }

    /// Phase 1: run every fan-out agent in parallel
    async fn phase_fan_out(
        &self,
        job: &ScatterGatherJob,
        input: &str,
        progress: &dyn ProgressNotifier,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Vec<AgentOutput>, ScatterGatherError> {
        info!("Phase: Fan-out");
        progress.on_phase_start(&Phase::FanOut, job.fan_out().len());

        let mut join_set = JoinSet::new();

        for (index, agent) in job.fan_out().iter().enumerate() {
            let mut engine = self.engine_for(agent);
            let params = Arc::clone(job.params());
            let message = Message::user(input);

            join_set.spawn(async move {
                let run = engine.run(message, &params).await;
                (index, run)
            });
        }

        let mut slots: Vec<Option<AgentOutput>> = vec![None; job.fan_out().len()];

        loop {
            let next = match cancellation {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!("Cancelled during fan-out; aborting {} agents", join_set.len());
                        join_set.abort_all();
                        return Err(ScatterGatherError::Cancelled);
                    }
                    next = join_set.join_next() => next,
                },
                None => join_set.join_next().await,
            };

            let Some(joined) = next else { break };

            let (index, run) = match joined {
                Ok(result) => result,
                Err(e) => {
                    join_set.abort_all();
                    return Err(ScatterGatherError::TaskFailed(e.to_string()));
                }
            };
            let agent = job.fan_out()[index].name();

            match run.into_result() {
                Ok(run) => {
                    debug!("Fan-out agent {} finished", agent);
                    progress.on_agent_complete(&Phase::FanOut, agent, true);
                    slots[index] = Some(to_output(run));
                }
                Err(source) => {
                    warn!("Fan-out agent {} failed: {}; aborting job", agent, source);
                    progress.on_agent_complete(&Phase::FanOut, agent, false);
                    join_set.abort_all();
                    return Err(ScatterGatherError::FanOutFailed {
                        agent: agent.to_string(),
                        source,
                    });
                }
            }
        }

        progress.on_phase_complete(&Phase::FanOut);
        Ok(slots.into_iter().flatten().collect())
    }

    /// Phase 2: feed the labeled outputs to the fan-in agent
    async fn phase_fan_in(
        &self,
        job: &ScatterGatherJob,
        outputs: &[AgentOutput],
        progress: &dyn ProgressNotifier,
        cancellation: Option<&CancellationToken>,
    ) -> Result<AgentOutput, ScatterGatherError> {
        info!("Phase: Fan-in");
        progress.on_phase_start(&Phase::FanIn, 1);

        let seed = compose_fan_in_message(outputs);
        self.logger.log(ConversationEvent::new(
            kind::FAN_IN_SEED,
            json!({
                "agent": job.fan_in().name(),
                "sources": outputs.iter().map(|o| o.agent.as_str()).collect::<Vec<_>>(),
                "message": seed,
            }),
        ));

        let mut engine = self.engine_for(job.fan_in());
        let run = run_cancellable(&mut engine, Message::user(seed), job.params(), cancellation)
            .await?;

        let agent = job.fan_in().name();
        match run.into_result() {
            Ok(run) => {
                progress.on_agent_complete(&Phase::FanIn, agent, true);
                progress.on_phase_complete(&Phase::FanIn);
                Ok(to_output(run))
            }
            Err(source) => {
                warn!("Fan-in agent {} failed: {}", agent, source);
                progress.on_agent_complete(&Phase::FanIn, agent, false);
                Err(ScatterGatherError::FanInFailed {
                    agent: agent.to_string(),
                    source,
                })
            }
        }
    }
}

/// Run `engine`, giving up early if `cancellation` fires.
pub(crate) async fn run_cancellable(
    engine: &mut ConversationEngine,
    message: Message,
    params: &GenerationParams,
    cancellation: Option<&CancellationToken>,
) -> Result<EngineRun, ScatterGatherError> {
    match cancellation {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(ScatterGatherError::Cancelled),
            run = engine.run(message, params) => Ok(run),
        },
        None => Ok(engine.run(message, params).await),
    }
}

pub(crate) fn to_output(run: EngineRun) -> AgentOutput {
    let text = run.final_text();
    let usage = run.usage();
    AgentOutput::new(run.agent, text, run.turns.len(), usage)
}
