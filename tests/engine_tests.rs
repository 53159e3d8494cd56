use callsim::core::report::AggregateResult;
use callsim::{
    ArrivalSource, CallClass, DurationDistribution, ReplicationDriver, ReplicationPolicy,
    Routing, ScenarioConfig, SequentialController, StationConfig,
};

/// Single operator, arrivals every 2 minutes, service of exactly 1 minute.
fn paced_single_desk() -> ScenarioConfig {
    ScenarioConfig::new("paced_desk", 100.0)
        .with_station(StationConfig::new("desk", 1, 5.0))
        .with_arrival(ArrivalSource::new(
            "walk_ins",
            DurationDistribution::Deterministic { value: 2.0 },
            Routing::Fixed {
                station: 0,
                class: CallClass::Financial,
            },
        ))
        .with_service(
            CallClass::Financial,
            DurationDistribution::Deterministic { value: 1.0 },
        )
}

/// Single operator far below the arrival rate: one call per minute against
/// a five-minute mean service time.
fn overloaded_desk() -> ScenarioConfig {
    ScenarioConfig::new("overloaded_desk", 480.0)
        .with_seed(31)
        .with_station(StationConfig::new("desk", 1, 5.0))
        .with_arrival(ArrivalSource::new(
            "calls",
            DurationDistribution::Deterministic { value: 1.0 },
            Routing::Fixed {
                station: 0,
                class: CallClass::Financial,
            },
        ))
        .with_service(
            CallClass::Financial,
            DurationDistribution::Erlang { shape: 2, mean: 5.0 },
        )
}

#[test]
fn paced_desk_sees_no_queueing_and_half_utilization() {
    let driver = ReplicationDriver::new(paced_single_desk()).unwrap();
    let result = driver.run_one(0);

    assert_eq!(result.kpi("desk_queue_length"), Some(0.0));
    assert_eq!(result.kpi("desk_queue_delay"), Some(0.0));
    assert_eq!(result.left_in_queue, 0);
    let utilization = result.kpi("desk_utilization").unwrap();
    assert!(
        (utilization - 0.5).abs() < 0.05,
        "expected ~0.5 utilization, got {}",
        utilization
    );
}

#[test]
fn overloaded_desk_builds_a_backlog() {
    let driver = ReplicationDriver::new(overloaded_desk()).unwrap();
    let result = driver.run_one(0);

    // Work arrives five times faster than it drains, so the line is long,
    // delays are recorded, and calls remain waiting at the horizon.
    assert!(result.kpi("desk_queue_length").unwrap() > 1.0);
    assert!(result.kpi("desk_queue_delay").unwrap() > 0.0);
    assert!(result.left_in_queue > 0);
    // The queue only ever grows while the single operator is busy.
    assert!(result.kpi("desk_utilization").unwrap() > 0.9);
}

#[test]
fn pooled_split_matches_configured_probability() {
    let mut config = ScenarioConfig::pooled_cross_trained(7).with_seed(3);
    // One deterministic arrival per minute: a long day gives >= 10,000 calls.
    config.horizon = 12_000.0;

    let driver = ReplicationDriver::new(config).unwrap();
    let result = driver.run_one(0);

    assert!(result.total_arrivals >= 10_000);
    let financial_fraction =
        result.arrivals_by_class[CallClass::Financial.index()] as f64 / result.total_arrivals as f64;
    assert!(
        (financial_fraction - 0.59).abs() < 0.02,
        "financial fraction {} too far from 0.59",
        financial_fraction
    );
}

#[test]
fn calls_are_conserved_across_scenarios() {
    for config in [
        ScenarioConfig::segregated(4, 3).with_seed(11),
        ScenarioConfig::pooled_cross_trained(7).with_seed(11),
        overloaded_desk(),
    ] {
        let driver = ReplicationDriver::new(config).unwrap();
        for replication in 0..10 {
            let result = driver.run_one(replication);
            assert_eq!(
                result.completed_calls + result.left_in_queue + result.in_service_at_end,
                result.total_arrivals,
                "conservation failed in replication {}",
                replication
            );
        }
    }
}

#[test]
fn identical_seeds_reproduce_the_whole_study() {
    let make = || {
        let config = ScenarioConfig::segregated(4, 3)
            .with_seed(77)
            .with_replications(
                ReplicationPolicy::new()
                    .with_initial(5)
                    .with_increment(5)
                    .with_max(10)
                    .with_target_relative_error(0.5),
            );
        SequentialController::new(config).unwrap()
    };

    let first = make().run();
    let second = make().run();
    assert_eq!(first.replications, second.replications);
    assert_eq!(first.results, second.results);
}

#[test]
fn half_width_tightens_with_more_replications() {
    let driver = ReplicationDriver::new(ScenarioConfig::pooled_cross_trained(7).with_seed(13))
        .unwrap();
    let results: Vec<_> = (0..50).map(|replication| driver.run_one(replication)).collect();

    let narrow = AggregateResult::summarize(&results);
    let wide = AggregateResult::summarize(&results[..10]);
    let kpi = "cross_trained_time_in_system";
    assert!(
        narrow.kpis[kpi].half_width < wide.kpis[kpi].half_width,
        "50-replication half-width should beat the 10-replication one"
    );
}

#[test]
fn degenerate_variance_converges_immediately() {
    let config = paced_single_desk().with_replications(
        ReplicationPolicy::new().with_tracked_kpis(vec![
            "desk_time_in_system".to_string(),
            "desk_within_target".to_string(),
            "desk_utilization".to_string(),
        ]),
    );
    let controller = SequentialController::new(config).unwrap();
    let report = controller.run();

    assert!(report.is_converged());
    assert_eq!(report.replications, 10);
    assert_eq!(report.aggregate.kpis["desk_time_in_system"].relative_error, 0.0);
    assert_eq!(report.aggregate.kpis["desk_within_target"].relative_error, 0.0);
    // Utilization is identical across replications too, but its variance
    // computation can leave rounding residue, so bound it instead.
    assert!(report.aggregate.kpis["desk_utilization"].relative_error < 1e-6);
}

#[test]
fn service_level_counts_fast_calls_only() {
    // Every call takes exactly 6 minutes against a 5-minute window.
    let config = paced_single_desk().with_service(
        CallClass::Financial,
        DurationDistribution::Deterministic { value: 6.0 },
    );
    let driver = ReplicationDriver::new(config).unwrap();
    let result = driver.run_one(0);
    assert_eq!(result.kpi("desk_within_target"), Some(0.0));
}
