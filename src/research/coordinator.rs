use crate::crew::{Crew, CrewInputs, RESEARCH_RESULTS};
use crate::research::Researcher;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// How lane failures affect the combined result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// Any failed lane fails the whole request.
    #[default]
    AllOrNothing,
    /// Failed lanes are marked unavailable; fails only when every lane failed.
    Partial,
}

/// A labeled research crew.
#[derive(Clone)]
pub struct Lane {
    pub label: String,
    pub crew: Arc<dyn Crew>,
}

impl Lane {
    pub fn new(label: impl Into<String>, crew: Arc<dyn Crew>) -> Self {
        Self {
            label: label.into(),
            crew,
        }
    }
}

/// Result of one lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneOutcome {
    Completed { label: String, output: String },
    Failed { label: String, error: String },
}

impl LaneOutcome {
    pub fn label(&self) -> &str {
        match self {
            LaneOutcome::Completed { label, .. } | LaneOutcome::Failed { label, .. } => label,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LaneOutcome::Failed { .. })
    }
}

/// Fans a topic out to every lane, combines the outputs in lane order and
/// hands them to the reporter.
pub struct ResearchCoordinator {
    lanes: Vec<Lane>,
    reporter: Arc<dyn Crew>,
    policy: FanOutPolicy,
    lane_timeout: Option<Duration>,
}

impl ResearchCoordinator {
    pub fn new(lanes: Vec<Lane>, reporter: Arc<dyn Crew>) -> Self {
        Self {
            lanes,
            reporter,
            policy: FanOutPolicy::default(),
            lane_timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: FanOutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_lane_timeout(mut self, timeout: Duration) -> Self {
        self.lane_timeout = Some(timeout);
        self
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn policy(&self) -> FanOutPolicy {
        self.policy
    }

    /// Run every lane concurrently and return outcomes in lane order.
    pub async fn fan_out(&self, topic: &str) -> Vec<LaneOutcome> {
        let inputs = CrewInputs::for_topic(topic);
        let mut set = JoinSet::new();

        for (idx, lane) in self.lanes.iter().enumerate() {
            let crew = Arc::clone(&lane.crew);
            let label = lane.label.clone();
            let inputs = inputs.clone();
            let timeout = self.lane_timeout;

            set.spawn(async move {
                let started = Instant::now();
                tracing::info!(lane = %label, "Research lane started");

                let run = AssertUnwindSafe(crew.kickoff(&inputs)).catch_unwind();
                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, run).await {
                        Ok(result) => result,
                        Err(_) => Ok(Err(AppError::Research(format!(
                            "timed out after {}s",
                            limit.as_secs()
                        )))),
                    },
                    None => run.await,
                };

                let outcome = match result {
                    Ok(Ok(output)) => LaneOutcome::Completed {
                        label: label.clone(),
                        output,
                    },
                    Ok(Err(e)) => LaneOutcome::Failed {
                        label: label.clone(),
                        error: e.to_string(),
                    },
                    Err(_) => LaneOutcome::Failed {
                        label: label.clone(),
                        error: "research lane panicked".to_string(),
                    },
                };

                tracing::info!(
                    lane = %label,
                    failed = outcome.is_failed(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Research lane finished"
                );

                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<LaneOutcome>> = vec![None; self.lanes.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => tracing::error!("Research lane task aborted: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(&self.lanes)
            .map(|(slot, lane)| {
                slot.unwrap_or_else(|| LaneOutcome::Failed {
                    label: lane.label.clone(),
                    error: "research lane aborted".to_string(),
                })
            })
            .collect()
    }

    /// Fan out, combine and run the reporter over the combined text.
    pub async fn run(&self, topic: &str) -> Result<String> {
        let outcomes = self.fan_out(topic).await;
        let research_results = combine(&outcomes, self.policy)?;

        tracing::info!(reporter = %self.reporter.name(), "Running report step");

        let inputs = CrewInputs::for_topic(topic).with(RESEARCH_RESULTS, research_results);
        self.reporter.kickoff(&inputs).await
    }
}

#[async_trait]
impl Researcher for ResearchCoordinator {
    async fn research(&self, topic: &str) -> Result<String> {
        self.run(topic).await
    }
}

/// Join lane outcomes into `"{label}:\n{output}"` blocks separated by a blank line.
pub fn combine(outcomes: &[LaneOutcome], policy: FanOutPolicy) -> Result<String> {
    let first_failure = outcomes.iter().find_map(|o| match o {
        LaneOutcome::Failed { label, error } => Some(format!("{}: {}", label, error)),
        LaneOutcome::Completed { .. } => None,
    });

    match policy {
        FanOutPolicy::AllOrNothing => {
            if let Some(failure) = first_failure {
                return Err(AppError::Research(failure));
            }
        }
        FanOutPolicy::Partial => {
            if !outcomes.is_empty() && outcomes.iter().all(LaneOutcome::is_failed) {
                return Err(AppError::Research(format!(
                    "All research lanes failed; first failure: {}",
                    first_failure.unwrap_or_default()
                )));
            }
        }
    }

    let blocks: Vec<String> = outcomes
        .iter()
        .map(|outcome| match outcome {
            LaneOutcome::Completed { label, output } => format!("{}:\n{}", label, output),
            LaneOutcome::Failed { label, error } => {
                format!("{}:\n[unavailable: {}]", label, error)
            }
        })
        .collect();

    Ok(blocks.join("\n\n"))
}
