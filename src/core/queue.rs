use super::entity::Call;
use super::stats::TimeWeightedStat;
use super::types::SimTime;
use std::collections::VecDeque;

/// FIFO line of calls waiting for an operator.
///
/// A call only ever waits while its pool is saturated. The queue stamps each
/// call's entry time; the waiting time itself is computed and recorded by
/// the completion handler at dequeue. Occupancy is tracked time-weighted,
/// which is a different quantity from the mean delay per call.
#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    calls: VecDeque<Call>,
    occupancy: TimeWeightedStat,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call at the tail, stamping its queue entry time.
    pub fn enqueue(&mut self, mut call: Call, now: SimTime) {
        call.queued_at = Some(now);
        self.calls.push_back(call);
        self.occupancy.record(self.calls.len() as f64, now);
    }

    /// Remove and return the oldest waiting call.
    pub fn dequeue(&mut self, now: SimTime) -> Call {
        let call = self.calls.pop_front().expect("dequeue on empty queue");
        self.occupancy.record(self.calls.len() as f64, now);
        call
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Time-weighted average queue length over [0, now].
    pub fn mean_occupancy(&self, now: SimTime) -> f64 {
        self.occupancy.mean(now)
    }
}
