use crate::core::calendar::EventCalendar;
use crate::core::config::{Routing, ScenarioConfig};
use crate::core::entity::Call;
use crate::core::event::{Event, EventKind};
use crate::core::queue::WaitingQueue;
use crate::core::random::RandomStreams;
use crate::core::report::ReplicationResult;
use crate::core::resource::ResourcePool;
use crate::core::stats::ObservationStat;
use crate::core::types::{CallClass, SimTime, StreamId};
use std::collections::BTreeMap;

// Stream layout. Arrival gaps, class routing, and service times draw from
// disjoint stream ids so adding draws to one concern never shifts another.
fn arrival_stream(source: usize) -> StreamId {
    source as StreamId
}

fn routing_stream(source: usize) -> StreamId {
    100 + source as StreamId
}

fn service_stream(class: CallClass) -> StreamId {
    200 + class.index() as StreamId
}

/// One operator pool, its waiting line, and its per-replication instruments.
struct Station {
    pool: ResourcePool,
    queue: WaitingQueue,
    time_in_system: ObservationStat,
    within_target: ObservationStat,
    queue_delay: ObservationStat,
}

impl Station {
    fn new(capacity: u32) -> Self {
        Self {
            pool: ResourcePool::new(capacity),
            queue: WaitingQueue::new(),
            time_in_system: ObservationStat::new(),
            within_target: ObservationStat::new(),
            queue_delay: ObservationStat::new(),
        }
    }
}

/// All mutable state of one replication: clock, calendar, stations, random
/// streams, and arrival counters.
///
/// A fresh value is built per replication and owned exclusively by the
/// driver for its duration; nothing here survives into the next
/// replication, which keeps replications independent and lets batches run
/// in parallel.
pub struct SimulationState {
    clock: SimTime,
    calendar: EventCalendar,
    stations: Vec<Station>,
    streams: RandomStreams,
    total_arrivals: u64,
    arrivals_by_class: [u64; 2],
    completed: u64,
}

impl SimulationState {
    /// Fresh state for one replication, with replication-separated streams.
    pub fn new(config: &ScenarioConfig, replication: u32) -> Self {
        Self {
            clock: 0.0,
            calendar: EventCalendar::new(),
            stations: config
                .stations
                .iter()
                .map(|station| Station::new(station.capacity))
                .collect(),
            streams: RandomStreams::for_replication(config.seed, replication),
            total_arrivals: 0,
            arrivals_by_class: [0, 0],
            completed: 0,
        }
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn pending_events(&self) -> usize {
        self.calendar.pending_count()
    }

    /// Schedule the first arrival of every source. A source whose first gap
    /// already overshoots the horizon contributes nothing.
    pub fn schedule_initial_arrivals(&mut self, config: &ScenarioConfig) {
        for (source, arrival) in config.arrivals.iter().enumerate() {
            let gap = arrival
                .interarrival
                .sample(&mut self.streams, arrival_stream(source));
            self.schedule_after(gap, EventKind::Arrival { source }, config.horizon);
        }
    }

    pub fn pop_next_event(&mut self) -> Option<Event> {
        self.calendar.pop_next()
    }

    /// Move the clock to the next event's time. Events come off the
    /// calendar in time order, so the clock never runs backwards.
    pub fn advance_to(&mut self, time: SimTime) {
        debug_assert!(time >= self.clock, "clock moving backwards");
        self.clock = time;
    }

    /// Run the handler matching the event kind.
    pub fn dispatch(&mut self, config: &ScenarioConfig, kind: EventKind) {
        match kind {
            EventKind::Arrival { source } => self.handle_arrival(config, source),
            EventKind::ServiceCompletion { station, call } => {
                self.handle_completion(config, station, call)
            }
        }
    }

    /// A call arrives: reschedule the source, label the call, then either
    /// put it straight into service or into the waiting line.
    fn handle_arrival(&mut self, config: &ScenarioConfig, source: usize) {
        let arrival = &config.arrivals[source];

        let gap = arrival
            .interarrival
            .sample(&mut self.streams, arrival_stream(source));
        self.schedule_after(gap, EventKind::Arrival { source }, config.horizon);

        let (station, class) = match arrival.routing {
            Routing::Fixed { station, class } => (station, class),
            Routing::Split {
                station,
                financial_probability,
            } => {
                let class = if self
                    .streams
                    .bernoulli(financial_probability, routing_stream(source))
                {
                    CallClass::Financial
                } else {
                    CallClass::Contact
                };
                (station, class)
            }
        };

        self.total_arrivals += 1;
        self.arrivals_by_class[class.index()] += 1;
        let call = Call::new(self.clock, class);

        if self.stations[station].pool.has_idle_capacity(1) {
            self.stations[station].pool.seize(1, self.clock);
            self.schedule_completion(config, station, call);
        } else {
            self.stations[station].queue.enqueue(call, self.clock);
        }
    }

    /// A call completes: record its statistics, then hand the freed
    /// operator to the oldest waiting call or release the unit.
    fn handle_completion(&mut self, config: &ScenarioConfig, station: usize, call: Call) {
        let time_in_system = call.time_in_system(self.clock);
        let target = config.stations[station].service_level_target;
        self.stations[station].time_in_system.record(time_in_system);
        self.stations[station]
            .within_target
            .record(if time_in_system < target { 1.0 } else { 0.0 });
        self.completed += 1;

        if self.stations[station].queue.is_empty() {
            self.stations[station].pool.release(1, self.clock);
        } else {
            // A waiting call implies every operator is busy.
            assert!(
                self.stations[station].pool.is_saturated(),
                "call waiting at '{}' while capacity is idle",
                config.stations[station].name
            );
            let next = self.stations[station].queue.dequeue(self.clock);
            let queued_at = next.queued_at.expect("queued call has an entry time");
            self.stations[station]
                .queue_delay
                .record(self.clock - queued_at);
            // The operator moves straight to the next call; the pool stays
            // fully busy, so no release/seize pair is needed.
            self.schedule_completion(config, station, next);
        }
    }

    fn schedule_completion(&mut self, config: &ScenarioConfig, station: usize, call: Call) {
        let service = config
            .service_for(call.class)
            .sample(&mut self.streams, service_stream(call.class));
        self.calendar
            .schedule(self.clock + service, EventKind::ServiceCompletion { station, call });
    }

    /// Schedule an event `delay` from now unless its time would pass the
    /// horizon. Truncation happens here, at scheduling time; the drive loop
    /// never needs to filter stale arrivals.
    fn schedule_after(&mut self, delay: SimTime, kind: EventKind, horizon: SimTime) {
        assert!(delay >= 0.0, "negative delay {}", delay);
        let time = self.clock + delay;
        if time <= horizon {
            self.calendar.schedule(time, kind);
        }
    }

    /// Read the instruments into one immutable replication row.
    pub fn into_result(self, config: &ScenarioConfig) -> ReplicationResult {
        let mut kpis = BTreeMap::new();
        let now = self.clock;
        let mut left_in_queue = 0u64;
        let mut in_service = 0u64;

        for (station, station_config) in self.stations.iter().zip(&config.stations) {
            let name = &station_config.name;
            kpis.insert(
                format!("{}_time_in_system", name),
                station.time_in_system.mean(),
            );
            kpis.insert(
                format!("{}_within_target", name),
                station.within_target.mean(),
            );
            kpis.insert(
                format!("{}_queue_length", name),
                station.queue.mean_occupancy(now),
            );
            kpis.insert(format!("{}_queue_delay", name), station.queue_delay.mean());
            kpis.insert(
                format!("{}_utilization", name),
                station.pool.utilization(now),
            );
            left_in_queue += station.queue.len() as u64;
            in_service += station.pool.busy() as u64;
        }

        ReplicationResult {
            kpis,
            ending_time: now,
            total_arrivals: self.total_arrivals,
            arrivals_by_class: self.arrivals_by_class,
            completed_calls: self.completed,
            left_in_queue,
            in_service_at_end: in_service,
        }
    }
}
