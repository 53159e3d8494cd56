pub mod core;

// Re-export commonly used types
pub use crate::core::calendar::EventCalendar;
pub use crate::core::config::{
    ArrivalSource, DurationDistribution, ReplicationPolicy, Routing, ScenarioConfig,
    StationConfig,
};
pub use crate::core::event::{Event, EventKind};
pub use crate::core::execution::controller::{
    ControllerReport, SequentialController, StoppingOutcome,
};
pub use crate::core::execution::replication::ReplicationDriver;
pub use crate::core::report::{AggregateResult, KpiSummary, ReplicationResult};
pub use crate::core::types::CallClass;
