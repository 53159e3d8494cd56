use crate::core::config::ScenarioConfig;
use crate::core::execution::replication::ReplicationDriver;
use crate::core::report::{AggregateResult, ReplicationResult};
use log::info;
use rayon::prelude::*;
use serde::Serialize;

/// Terminal state of a replication study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StoppingOutcome {
    /// Every tracked KPI met the target relative error.
    Converged,
    /// The replication cap was reached first; the attached statistics are
    /// the last batch's, reported as-is.
    Exhausted,
}

/// Final report of a study: how it ended, with how many replications, the
/// aggregate statistics, and the last batch's rows.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerReport {
    pub outcome: StoppingOutcome,
    pub replications: u32,
    pub aggregate: AggregateResult,
    pub results: Vec<ReplicationResult>,
}

impl ControllerReport {
    pub fn is_converged(&self) -> bool {
        self.outcome == StoppingOutcome::Converged
    }
}

/// Repeats batches of independent replications until every tracked KPI's
/// 95% confidence-interval half-width is small enough relative to its mean,
/// or the replication cap is hit.
///
/// When a batch misses the target, the whole batch is discarded and a
/// larger one is run from scratch. Extending the existing batch would be
/// cheaper, but re-running is the documented policy of this study and
/// changes its cost and independence properties, so it is kept as-is.
pub struct SequentialController {
    driver: ReplicationDriver,
}

impl SequentialController {
    pub fn new(config: ScenarioConfig) -> Result<Self, String> {
        Ok(Self {
            driver: ReplicationDriver::new(config)?,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        self.driver.config()
    }

    /// Run one batch of independent replications. Replications are fanned
    /// out across threads; each owns its state and its replication-indexed
    /// random streams, and results come back in replication order, so the
    /// parallel path yields the same sequence a sequential loop would.
    pub fn run_batch(&self, count: u32) -> Vec<ReplicationResult> {
        (0..count)
            .into_par_iter()
            .map(|replication| self.driver.run_one(replication))
            .collect()
    }

    /// Drive batches until convergence or exhaustion.
    pub fn run(&self) -> ControllerReport {
        let policy = &self.driver.config().replications;
        let mut batch_size = policy.initial;

        loop {
            let results = self.run_batch(batch_size);
            let aggregate = AggregateResult::summarize(&results);
            let worst = aggregate.max_relative_error(&policy.tracked_kpis);
            info!(
                "batch of {} replications, max tracked relative error {:.4}",
                batch_size, worst
            );

            if worst <= policy.target_relative_error {
                return ControllerReport {
                    outcome: StoppingOutcome::Converged,
                    replications: batch_size,
                    aggregate,
                    results,
                };
            }

            let next = batch_size + policy.increment;
            if next > policy.max {
                return ControllerReport {
                    outcome: StoppingOutcome::Exhausted,
                    replications: batch_size,
                    aggregate,
                    results,
                };
            }

            // The batch that missed is discarded entirely; the next pass
            // re-runs every replication.
            batch_size = next;
        }
    }
}
