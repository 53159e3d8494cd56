use super::entity::Call;
use super::types::SimTime;

/// The closed set of things that can happen in a call center.
///
/// Dispatch is an exhaustive match on this enum; payloads are owned by the
/// event, so a call in service lives inside its pending completion event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// The next call of an arrival source comes in.
    Arrival { source: usize },
    /// A call finishes service at a station.
    ServiceCompletion { station: usize, call: Call },
}

/// A scheduled occurrence, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
}
