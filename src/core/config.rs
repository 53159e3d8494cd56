use super::random::RandomStreams;
use super::types::{CallClass, SimTime, StreamId};

/// Duration families used for inter-arrival gaps and service times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationDistribution {
    /// Fixed gap, the renewal process the staffing scripts drive arrivals with.
    Deterministic { value: f64 },
    Exponential { mean: f64 },
    /// Sum of `shape` exponential stages with combined mean `mean`.
    Erlang { shape: u32, mean: f64 },
}

impl DurationDistribution {
    pub fn sample(&self, streams: &mut RandomStreams, stream: StreamId) -> f64 {
        match *self {
            DurationDistribution::Deterministic { value } => value,
            DurationDistribution::Exponential { mean } => streams.exponential(mean, stream),
            DurationDistribution::Erlang { shape, mean } => streams.erlang(shape, mean, stream),
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            DurationDistribution::Deterministic { value } => value,
            DurationDistribution::Exponential { mean } => mean,
            DurationDistribution::Erlang { mean, .. } => mean,
        }
    }

    fn validate(&self, context: &str) -> Result<(), String> {
        match *self {
            DurationDistribution::Deterministic { value } if value < 0.0 => Err(format!(
                "{}: deterministic duration must be non-negative, got {}",
                context, value
            )),
            DurationDistribution::Exponential { mean } if mean <= 0.0 => Err(format!(
                "{}: exponential mean must be positive, got {}",
                context, mean
            )),
            DurationDistribution::Erlang { shape, mean } if shape == 0 || mean <= 0.0 => {
                Err(format!(
                    "{}: erlang needs shape >= 1 and positive mean, got shape {} mean {}",
                    context, shape, mean
                ))
            }
            _ => Ok(()),
        }
    }
}

/// One operator pool with its own waiting line.
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub name: String,
    pub capacity: u32,
    /// Window for the service-level KPI: the fraction of calls whose
    /// time in system stays under this many minutes.
    pub service_level_target: f64,
}

impl StationConfig {
    pub fn new(name: &str, capacity: u32, service_level_target: f64) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            service_level_target,
        }
    }
}

/// Where an arrival source sends its calls and how they are classed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routing {
    /// Every call goes to one station with a fixed class label.
    Fixed { station: usize, class: CallClass },
    /// Every call goes to one station; an independent Bernoulli draw with
    /// the given financial probability labels it, which in turn selects
    /// its service-time distribution.
    Split {
        station: usize,
        financial_probability: f64,
    },
}

impl Routing {
    pub fn station(&self) -> usize {
        match *self {
            Routing::Fixed { station, .. } | Routing::Split { station, .. } => station,
        }
    }
}

/// A renewal stream of incoming calls.
#[derive(Debug, Clone)]
pub struct ArrivalSource {
    pub name: String,
    pub interarrival: DurationDistribution,
    pub routing: Routing,
}

impl ArrivalSource {
    pub fn new(name: &str, interarrival: DurationDistribution, routing: Routing) -> Self {
        Self {
            name: name.to_string(),
            interarrival,
            routing,
        }
    }
}

/// How many replications to run and when to stop adding more.
#[derive(Debug, Clone)]
pub struct ReplicationPolicy {
    /// Batch size of the first pass.
    pub initial: u32,
    /// How much the batch grows after a failed precision check.
    pub increment: u32,
    /// Hard cap; exceeding it ends the study as exhausted.
    pub max: u32,
    /// Stop once every tracked KPI's relative error is at or below this.
    pub target_relative_error: f64,
    /// KPI names the stopping rule watches. Empty means all of them.
    pub tracked_kpis: Vec<String>,
}

impl ReplicationPolicy {
    pub fn new() -> Self {
        Self {
            initial: 10,
            increment: 10,
            max: 1000,
            target_relative_error: 0.05,
            tracked_kpis: Vec::new(),
        }
    }

    pub fn with_initial(mut self, initial: u32) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_increment(mut self, increment: u32) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }

    pub fn with_target_relative_error(mut self, target: f64) -> Self {
        self.target_relative_error = target;
        self
    }

    pub fn with_tracked_kpis(mut self, kpis: Vec<String>) -> Self {
        self.tracked_kpis = kpis;
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.initial < 2 {
            return Err(format!(
                "replication policy needs at least 2 initial replications, got {}",
                self.initial
            ));
        }
        if self.increment == 0 {
            return Err("replication increment must be positive".to_string());
        }
        if self.max < self.initial {
            return Err(format!(
                "replication cap {} is below the initial batch size {}",
                self.max, self.initial
            ));
        }
        if self.target_relative_error <= 0.0 {
            return Err(format!(
                "target relative error must be positive, got {}",
                self.target_relative_error
            ));
        }
        Ok(())
    }
}

impl Default for ReplicationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one simulated staffing configuration needs: the horizon,
/// the operator pools, the arrival streams, the per-class service-time
/// distributions, the seed, and the replication policy.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub name: String,
    pub horizon: SimTime,
    pub seed: u64,
    pub stations: Vec<StationConfig>,
    pub arrivals: Vec<ArrivalSource>,
    /// Service-time distribution per call class, indexed by `CallClass::index`.
    pub service_by_class: [DurationDistribution; 2],
    pub replications: ReplicationPolicy,
}

impl ScenarioConfig {
    pub fn new(name: &str, horizon: SimTime) -> Self {
        Self {
            name: name.to_string(),
            horizon,
            seed: 12345,
            stations: Vec::new(),
            arrivals: Vec::new(),
            service_by_class: [
                DurationDistribution::Erlang { shape: 2, mean: 5.0 },
                DurationDistribution::Erlang { shape: 3, mean: 5.0 },
            ],
            replications: ReplicationPolicy::new(),
        }
    }

    /// Dedicated pools: financial and contact calls each with their own
    /// operators and queue, matching the current call-center layout.
    pub fn segregated(finance_operators: u32, contact_operators: u32) -> Self {
        let mut config = Self::new("segregated", 480.0);
        config.stations = vec![
            StationConfig::new("finance", finance_operators, 5.0),
            StationConfig::new("contact", contact_operators, 5.0),
        ];
        config.arrivals = vec![
            ArrivalSource::new(
                "finance_calls",
                // 59% of one call per minute.
                DurationDistribution::Exponential { mean: 1.0 / 0.59 },
                Routing::Fixed {
                    station: 0,
                    class: CallClass::Financial,
                },
            ),
            ArrivalSource::new(
                "contact_calls",
                DurationDistribution::Exponential { mean: 1.0 / 0.41 },
                Routing::Fixed {
                    station: 1,
                    class: CallClass::Contact,
                },
            ),
        ];
        config.replications.tracked_kpis = vec![
            "finance_time_in_system".to_string(),
            "finance_within_target".to_string(),
            "finance_queue_length".to_string(),
            "contact_time_in_system".to_string(),
            "contact_within_target".to_string(),
            "contact_queue_length".to_string(),
        ];
        config
    }

    /// One cross-trained pool serving both classes. Operators shared across
    /// classes are modelled as 10% slower per call, and the service-level
    /// window is relaxed accordingly.
    pub fn pooled_cross_trained(operators: u32) -> Self {
        let mut config = Self::new("pooled", 480.0);
        config.stations = vec![StationConfig::new("cross_trained", operators, 5.5)];
        config.arrivals = vec![ArrivalSource::new(
            "all_calls",
            // One call per minute, unit-rate renewal.
            DurationDistribution::Deterministic { value: 1.0 },
            Routing::Split {
                station: 0,
                financial_probability: 0.59,
            },
        )];
        config.service_by_class = [
            DurationDistribution::Erlang {
                shape: 2,
                mean: 5.0 * 1.1,
            },
            DurationDistribution::Erlang {
                shape: 3,
                mean: 5.0 * 1.1,
            },
        ];
        config.replications.tracked_kpis = vec![
            "cross_trained_time_in_system".to_string(),
            "cross_trained_within_target".to_string(),
            "cross_trained_queue_length".to_string(),
        ];
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_station(mut self, station: StationConfig) -> Self {
        self.stations.push(station);
        self
    }

    pub fn with_arrival(mut self, arrival: ArrivalSource) -> Self {
        self.arrivals.push(arrival);
        self
    }

    pub fn with_service(mut self, class: CallClass, distribution: DurationDistribution) -> Self {
        self.service_by_class[class.index()] = distribution;
        self
    }

    pub fn with_replications(mut self, policy: ReplicationPolicy) -> Self {
        self.replications = policy;
        self
    }

    pub fn service_for(&self, class: CallClass) -> DurationDistribution {
        self.service_by_class[class.index()]
    }

    /// Reject bad configurations before any simulation work starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.horizon <= 0.0 {
            return Err(format!("horizon must be positive, got {}", self.horizon));
        }
        if self.stations.is_empty() {
            return Err("at least one station is required".to_string());
        }
        if self.arrivals.is_empty() {
            return Err("at least one arrival source is required".to_string());
        }
        for station in &self.stations {
            if station.capacity == 0 {
                return Err(format!("station '{}' has zero capacity", station.name));
            }
            if station.service_level_target <= 0.0 {
                return Err(format!(
                    "station '{}' has a non-positive service-level window",
                    station.name
                ));
            }
        }
        for arrival in &self.arrivals {
            arrival
                .interarrival
                .validate(&format!("arrival source '{}'", arrival.name))?;
            let station = arrival.routing.station();
            if station >= self.stations.len() {
                return Err(format!(
                    "arrival source '{}' routes to unknown station index {}",
                    arrival.name, station
                ));
            }
            if let Routing::Split {
                financial_probability,
                ..
            } = arrival.routing
            {
                if !(0.0..=1.0).contains(&financial_probability) {
                    return Err(format!(
                        "arrival source '{}' has split probability {} outside [0, 1]",
                        arrival.name, financial_probability
                    ));
                }
            }
        }
        for class in CallClass::ALL {
            self.service_for(class)
                .validate(&format!("{} service time", class))?;
        }
        self.replications.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(ScenarioConfig::segregated(4, 3).validate().is_ok());
        assert!(ScenarioConfig::pooled_cross_trained(7).validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = ScenarioConfig::segregated(0, 3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_horizon_rejected() {
        let mut config = ScenarioConfig::segregated(4, 3);
        config.horizon = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_split_probability_rejected() {
        let mut config = ScenarioConfig::pooled_cross_trained(7);
        config.arrivals[0].routing = Routing::Split {
            station: 0,
            financial_probability: 1.2,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_station_rejected() {
        let mut config = ScenarioConfig::pooled_cross_trained(7);
        config.arrivals[0].routing = Routing::Split {
            station: 5,
            financial_probability: 0.59,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_erlang_rejected() {
        let mut config = ScenarioConfig::segregated(4, 3);
        config.service_by_class[0] = DurationDistribution::Erlang { shape: 0, mean: 5.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_replication_policy_bounds() {
        let policy = ReplicationPolicy::new().with_initial(1);
        let config = ScenarioConfig::segregated(4, 3).with_replications(policy);
        assert!(config.validate().is_err());

        let policy = ReplicationPolicy::new().with_initial(20).with_max(10);
        let config = ScenarioConfig::segregated(4, 3).with_replications(policy);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = ScenarioConfig::new("single", 100.0)
            .with_seed(9)
            .with_station(StationConfig::new("desk", 1, 5.0))
            .with_arrival(ArrivalSource::new(
                "walk_ins",
                DurationDistribution::Deterministic { value: 2.0 },
                Routing::Fixed {
                    station: 0,
                    class: CallClass::Financial,
                },
            ));
        assert!(config.validate().is_ok());
        assert_eq!(config.seed, 9);
        assert_eq!(config.stations.len(), 1);
    }
}
