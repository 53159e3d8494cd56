use super::stats::TimeWeightedStat;
use super::types::SimTime;

/// A fixed-capacity pool of interchangeable operators.
///
/// Only the arrival and completion handlers seize and release units; the
/// busy count is never touched mid-replication from anywhere else. The
/// busy-unit count is tracked time-weighted for the utilization KPI.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    capacity: u32,
    busy: u32,
    busy_time: TimeWeightedStat,
}

impl ResourcePool {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            busy: 0,
            busy_time: TimeWeightedStat::new(),
        }
    }

    /// Reset to `capacity` units, all idle. Called once at replication start.
    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
        self.busy = 0;
        self.busy_time = TimeWeightedStat::new();
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn busy(&self) -> u32 {
        self.busy
    }

    pub fn has_idle_capacity(&self, units: u32) -> bool {
        self.busy + units <= self.capacity
    }

    pub fn is_saturated(&self) -> bool {
        self.busy == self.capacity
    }

    /// Mark `units` operators busy at time `now`.
    pub fn seize(&mut self, units: u32, now: SimTime) {
        assert!(
            self.busy + units <= self.capacity,
            "seize({}) with {}/{} busy",
            units,
            self.busy,
            self.capacity
        );
        self.busy += units;
        self.busy_time.record(self.busy as f64, now);
    }

    /// Return `units` operators to idle at time `now`.
    pub fn release(&mut self, units: u32, now: SimTime) {
        assert!(
            self.busy >= units,
            "release({}) with only {} busy",
            units,
            self.busy
        );
        self.busy -= units;
        self.busy_time.record(self.busy as f64, now);
    }

    /// Busy integral divided by elapsed time: the time-average number of
    /// busy operators. Divide by capacity for a fraction of the pool.
    pub fn utilization(&self, now: SimTime) -> f64 {
        self.busy_time.mean(now)
    }
}
