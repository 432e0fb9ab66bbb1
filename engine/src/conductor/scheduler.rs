//! Scheduler
//!
//! Groups plan steps into dependency levels and runs them level by level.
//! Steps within a level run concurrently; the next level starts once every
//! step of the current one has a result, successful or not.

use futures::future::join_all;
use sdk::ToolExecutor;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::conductor::types::{Plan, PlanStep, StepOutcome, StepResult};
use crate::tools::{BuiltInContext, ToolRegistry, ToolRoute};

/// Partition steps into execution levels, as indices into `steps`.
///
/// A step lands in the first level after all of its dependencies. When no
/// remaining step can be placed (a cycle, or a dependency on an id that is
/// not in the plan) everything left goes into one final level, so every step
/// is scheduled exactly once.
pub fn execution_levels(steps: &[PlanStep]) -> Vec<Vec<usize>> {
    let mut levels = Vec::new();
    let mut completed: HashSet<&str> = HashSet::new();
    let mut remaining: Vec<usize> = (0..steps.len()).collect();

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<usize>, Vec<usize>) = remaining.iter().partition(|&&i| {
            steps[i]
                .depends_on
                .iter()
                .all(|dep| completed.contains(dep.as_str()))
        });

        if ready.is_empty() {
            warn!(
                "{} steps have unsatisfiable dependencies; scheduling them last",
                blocked.len()
            );
            levels.push(blocked);
            break;
        }

        completed.extend(ready.iter().map(|&i| steps[i].id.as_str()));
        levels.push(ready);
        remaining = blocked;
    }

    levels
}

/// Runs plan steps through the built-ins or the executor
pub struct Scheduler {
    registry: Arc<ToolRegistry>,
    executor: Arc<dyn ToolExecutor>,
}

impl Scheduler {
    pub fn new(registry: Arc<ToolRegistry>, executor: Arc<dyn ToolExecutor>) -> Self {
        Self { registry, executor }
    }

    /// Run every step of `plan`, returning results in plan order.
    ///
    /// Failures are recorded in their step's result and never stop other
    /// steps.
    pub async fn synthesize(&self, plan: &Plan, ctx: &BuiltInContext<'_>) -> Vec<StepResult> {
        let levels = execution_levels(&plan.steps);
        info!(
            "Synthesizing {} steps in {} levels",
            plan.steps.len(),
            levels.len()
        );

        let mut slots: Vec<Option<StepResult>> = vec![None; plan.steps.len()];
        for (depth, level) in levels.iter().enumerate() {
            debug!("Level {}: {} steps", depth + 1, level.len());
            let results = join_all(level.iter().map(|&i| self.run_step(&plan.steps[i], ctx))).await;
            for (&i, result) in level.iter().zip(results) {
                slots[i] = Some(result);
            }
        }

        slots.into_iter().flatten().collect()
    }

    async fn run_step(&self, step: &PlanStep, ctx: &BuiltInContext<'_>) -> StepResult {
        let start = Instant::now();
        let result = match self.registry.route(&step.tool_name) {
            ToolRoute::BuiltIn(tool) => tool.run(&step.id, &step.input, ctx).await,
            ToolRoute::Delegate => self.executor.call(&step.tool_name, &step.input).await,
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(output) => {
                debug!("Step {} ({}) finished in {}ms", step.id, step.tool_name, duration_ms);
                StepOutcome::Output(output)
            }
            Err(e) => {
                warn!("Step {} ({}) failed: {}", step.id, step.tool_name, e);
                StepOutcome::Error(e.to_string())
            }
        };

        StepResult {
            step_id: step.id.clone(),
            tool_name: step.tool_name.clone(),
            outcome,
            duration_ms,
        }
    }
}
