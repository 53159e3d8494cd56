use crate::core::config::ScenarioConfig;
use crate::core::execution::state::SimulationState;
use crate::core::report::ReplicationResult;
use log::debug;

/// Runs one bounded-horizon replication to completion.
///
/// Each run builds a fresh `SimulationState`, drains the calendar until it
/// empties or the horizon is reached, and reads the instruments into one
/// `ReplicationResult`. The driver itself is immutable, so batches of
/// replications can share it across threads.
pub struct ReplicationDriver {
    config: ScenarioConfig,
}

impl ReplicationDriver {
    /// Validates the configuration once, up front.
    pub fn new(config: ScenarioConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Run replication `replication` and return its KPI row.
    ///
    /// The loop pops the earliest event, advances the clock to it, and
    /// stops without processing once the clock reaches the horizon. Events
    /// still pending at that point are simply dropped.
    pub fn run_one(&self, replication: u32) -> ReplicationResult {
        let mut state = SimulationState::new(&self.config, replication);
        state.schedule_initial_arrivals(&self.config);

        while let Some(event) = state.pop_next_event() {
            state.advance_to(event.time);
            if event.time >= self.config.horizon {
                break;
            }
            debug!(
                "t={:.3} dispatching {:?} ({} pending)",
                event.time,
                event.kind,
                state.pending_events()
            );
            state.dispatch(&self.config, event.kind);
        }

        state.into_result(&self.config)
    }
}
