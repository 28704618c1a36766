//! Run Review use case
//!
//! Optionally summarizes a change with a single agent, then hands the change
//! (and the summary) to a scatter-gather panel of reviewers.

use crate::ports::completion_provider::ProviderError;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::scatter_gather::{
    ScatterGatherError, ScatterGatherUseCase, run_cancellable,
};
use prismatic_domain::{AgentOutput, AgentSpec, Message, Phase, PromptTemplate, ScatterGatherJob};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can occur during a review run
#[derive(Error, Debug)]
pub enum RunReviewError {
    #[error("Summary agent '{agent}' failed: {source}")]
    SummaryFailed {
        agent: String,
        source: ProviderError,
    },

    #[error(transparent)]
    ScatterGather(#[from] ScatterGatherError),
}

impl RunReviewError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            RunReviewError::ScatterGather(ScatterGatherError::Cancelled)
        )
    }
}

/// Input for the RunReview use case
#[derive(Debug, Clone)]
pub struct RunReviewInput {
    /// The change under review (diff, PR description, paths, ...)
    pub context: String,
    /// Agent that summarizes the change before the panel runs
    pub summarizer: Option<AgentSpec>,
    /// Reviewer panel and aggregator
    pub job: ScatterGatherJob,
}

impl RunReviewInput {
    pub fn new(context: impl Into<String>, job: ScatterGatherJob) -> Self {
        Self {
            context: context.into(),
            summarizer: None,
            job,
        }
    }

    pub fn with_summarizer(mut self, summarizer: AgentSpec) -> Self {
        self.summarizer = Some(summarizer);
        self
    }
}

/// Outcome of a review run.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    /// Final text of the summary agent
    pub summary: Option<String>,
    /// Everything the summary agent said, tool calls included
    pub summary_transcript: Option<String>,
    /// The aggregated review
    pub final_text: String,
    /// Individual reviews in panel order
    pub reviews: Vec<AgentOutput>,
    pub aggregator: AgentOutput,
}

/// Use case for running a full review
pub struct RunReviewUseCase {
    scatter_gather: ScatterGatherUseCase,
}

impl RunReviewUseCase {
    pub fn new(scatter_gather: ScatterGatherUseCase) -> Self {
        Self { scatter_gather }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunReviewInput) -> Result<ReviewReport, RunReviewError> {
        self.execute_with_progress(input, &NoProgress, None).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunReviewInput,
        progress: &dyn ProgressNotifier,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ReviewReport, RunReviewError> {
        let (summary, summary_transcript) = match &input.summarizer {
            Some(summarizer) => {
                let (text, transcript) = self
                    .phase_summary(&input, summarizer, progress, cancellation)
                    .await?;
                (Some(text), Some(transcript))
            }
            None => (None, None),
        };

        let review_prompt = PromptTemplate::review_prompt(&input.context, summary.as_deref());
        let output = self
            .scatter_gather
            .execute_with_progress(&input.job, &review_prompt, progress, cancellation)
            .await?;

        info!("Review complete ({} reviews)", output.outputs.len());

        Ok(ReviewReport {
            summary,
            summary_transcript,
            final_text: output.final_text,
            reviews: output.outputs,
            aggregator: output.fan_in,
        })
    }

    /// Summary phase: a single agent explores and describes the change
    async fn phase_summary(
        &self,
        input: &RunReviewInput,
        summarizer: &AgentSpec,
        progress: &dyn ProgressNotifier,
        cancellation: Option<&CancellationToken>,
    ) -> Result<(String, String), RunReviewError> {
        info!("Phase: Summary");
        progress.on_phase_start(&Phase::Summary, 1);

        let agent = Arc::new(summarizer.clone());
        let mut engine = self.scatter_gather.engine_for(&agent);
        let message = Message::user(PromptTemplate::summarizer_prompt(&input.context));
        let run = run_cancellable(&mut engine, message, input.job.params(), cancellation).await?;

        match run.into_result() {
            Ok(run) => {
                progress.on_agent_complete(&Phase::Summary, agent.name(), true);
                progress.on_phase_complete(&Phase::Summary);
                Ok((run.final_text(), run.transcript()))
            }
            Err(source) => {
                warn!("Summary agent {} failed: {}", agent.name(), source);
                progress.on_agent_complete(&Phase::Summary, agent.name(), false);
                Err(RunReviewError::SummaryFailed {
                    agent: agent.name().to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::tool_executor::NoTools;
    use crate::testing::{ScriptedFactory, ScriptedProvider, tool_turn};
    use prismatic_domain::{GenerationParams, ReviewerRole, TurnResult};
    use serde_json::json;

    fn panel_job() -> ScatterGatherJob {
        ScatterGatherJob::new(
            ReviewerRole::Aggregator.agent_spec(Vec::<String>::new()),
            ReviewerRole::FAN_OUT
                .iter()
                .map(|r| r.agent_spec(Vec::<String>::new()))
                .collect(),
            GenerationParams::default(),
        )
        .unwrap()
    }

    fn panel_factory() -> ScriptedFactory {
        let mut factory = ScriptedFactory::default();
        for role in ReviewerRole::FAN_OUT {
            factory = factory.with(role.agent_name(), ScriptedProvider::texts(&["looks fine"]));
        }
        factory.with(
            ReviewerRole::Aggregator.agent_name(),
            ScriptedProvider::texts(&["Approve"]),
        )
    }

    fn use_case(factory: Arc<ScriptedFactory>) -> RunReviewUseCase {
        RunReviewUseCase::new(
            ScatterGatherUseCase::new(factory, Arc::new(NoTools))
                .with_retry_policy(RetryPolicy::none()),
        )
    }

    #[tokio::test]
    async fn test_summary_feeds_every_reviewer() {
        let factory = Arc::new(panel_factory().with(
            ReviewerRole::Summarizer.agent_name(),
            ScriptedProvider::new(vec![
                Ok(tool_turn(&[("t1", "read_file", json!({"path": "src/lib.rs"}))])),
                Ok(TurnResult::from_text("Adds a cache layer.")),
            ]),
        ));
        let input = RunReviewInput::new("diff --git a/src/lib.rs", panel_job())
            .with_summarizer(ReviewerRole::Summarizer.agent_spec(["read_file"]));

        let report = use_case(factory.clone()).execute(input).await.unwrap();

        assert_eq!(report.summary.as_deref(), Some("Adds a cache layer."));
        let transcript = report.summary_transcript.unwrap();
        assert!(transcript.contains("[Calling tool read_file with args"));
        assert!(transcript.ends_with("Adds a cache layer."));
        assert_eq!(report.final_text, "Approve");
        assert_eq!(report.reviews.len(), 4);

        let seed = factory.provider("security_reviewer").requests()[0].messages[0].text_content();
        assert!(seed.contains("diff --git a/src/lib.rs"));
        assert!(seed.ends_with("Change summary:\nAdds a cache layer."));
    }

    #[tokio::test]
    async fn test_runs_without_summarizer() {
        let factory = Arc::new(panel_factory());
        let input = RunReviewInput::new("diff", panel_job());

        let report = use_case(factory.clone()).execute(input).await.unwrap();

        assert!(report.summary.is_none());
        let seed = factory.provider("test_reviewer").requests()[0].messages[0].text_content();
        assert_eq!(seed, "Review the following change:\n\ndiff");
    }

    #[tokio::test]
    async fn test_summary_failure_stops_the_run() {
        let factory = Arc::new(panel_factory().with(
            ReviewerRole::Summarizer.agent_name(),
            ScriptedProvider::new(vec![Err(ProviderError::InvalidRequest("x".to_string()))]),
        ));
        let input = RunReviewInput::new("diff", panel_job())
            .with_summarizer(ReviewerRole::Summarizer.agent_spec(Vec::<String>::new()));

        let err = use_case(factory.clone()).execute(input).await.unwrap_err();

        assert!(matches!(err, RunReviewError::SummaryFailed { .. }));
        assert_eq!(factory.provider("security_reviewer").calls(), 0);
        assert_eq!(factory.provider("review_aggregator").calls(), 0);
    }
}
