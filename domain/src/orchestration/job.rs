//! Scatter-gather job definition.

use crate::agent::spec::AgentSpec;
use crate::conversation::params::GenerationParams;
use crate::core::error::DomainError;
use std::collections::HashSet;
use std::sync::Arc;

/// One fan-in agent, a non-empty ordered list of fan-out agents, and the
/// generation parameters they share.
///
/// All parts are behind `Arc` because they are read concurrently by every
/// fan-out task and never mutated.
#[derive(Debug, Clone)]
pub struct ScatterGatherJob {
    fan_in: Arc<AgentSpec>,
    fan_out: Vec<Arc<AgentSpec>>,
    params: Arc<GenerationParams>,
}

impl ScatterGatherJob {
    /// Build a job, rejecting an empty fan-out set and duplicate agent names.
    pub fn new(
        fan_in: AgentSpec,
        fan_out: Vec<AgentSpec>,
        params: GenerationParams,
    ) -> Result<Self, DomainError> {
        if fan_out.is_empty() {
            return Err(DomainError::EmptyFanOut);
        }

        let mut seen = HashSet::new();
        for spec in fan_out.iter().chain(std::iter::once(&fan_in)) {
            spec.validate()?;
            if !seen.insert(spec.name().to_string()) {
                return Err(DomainError::DuplicateAgentName(spec.name().to_string()));
            }
        }

        Ok(Self {
            fan_in: Arc::new(fan_in),
            fan_out: fan_out.into_iter().map(Arc::new).collect(),
            params: Arc::new(params),
        })
    }

    pub fn fan_in(&self) -> &Arc<AgentSpec> {
        &self.fan_in
    }

    /// Fan-out agents in declaration order.
    pub fn fan_out(&self) -> &[Arc<AgentSpec>] {
        &self.fan_out
    }

    pub fn params(&self) -> &Arc<GenerationParams> {
        &self.params
    }
}
