use super::stats::ObservationStat;
use serde::Serialize;
use std::collections::BTreeMap;

/// Two-sided 95% normal quantile used for confidence-interval half-widths.
const Z_95: f64 = 1.96;

/// One scalar per KPI from a single finished replication, plus the
/// bookkeeping needed for conservation checks. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationResult {
    pub kpis: BTreeMap<String, f64>,
    /// Clock value when the drive loop stopped.
    pub ending_time: f64,
    pub total_arrivals: u64,
    /// Arrivals per call class, indexed by `CallClass::index`.
    pub arrivals_by_class: [u64; 2],
    pub completed_calls: u64,
    /// Calls still waiting when the horizon was reached.
    pub left_in_queue: u64,
    /// Calls still being served when the horizon was reached.
    pub in_service_at_end: u64,
}

impl ReplicationResult {
    pub fn kpi(&self, name: &str) -> Option<f64> {
        self.kpis.get(name).copied()
    }
}

/// Cross-replication summary for one KPI.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KpiSummary {
    pub mean: f64,
    pub std_dev: f64,
    /// 95% confidence-interval half-width under the normal approximation.
    pub half_width: f64,
    /// Half-width over mean; infinite when the mean is zero, so a
    /// degenerate KPI fails the precision check instead of dividing by zero.
    pub relative_error: f64,
}

/// Mean, spread, and precision per KPI over one batch of replications.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub replications: u32,
    pub kpis: BTreeMap<String, KpiSummary>,
}

impl AggregateResult {
    /// Summarize a batch. Every KPI present in the first result is
    /// aggregated; all results of a batch share the same KPI set.
    pub fn summarize(results: &[ReplicationResult]) -> Self {
        let mut kpis = BTreeMap::new();
        if results.is_empty() {
            return Self {
                replications: 0,
                kpis,
            };
        }

        for name in results[0].kpis.keys() {
            let mut stat = ObservationStat::new();
            for result in results {
                stat.record(result.kpis[name]);
            }
            let mean = stat.mean();
            let half_width = Z_95 * stat.std_dev() / (results.len() as f64).sqrt();
            let relative_error = if mean == 0.0 {
                f64::INFINITY
            } else {
                half_width / mean.abs()
            };
            kpis.insert(
                name.clone(),
                KpiSummary {
                    mean,
                    std_dev: stat.std_dev(),
                    half_width,
                    relative_error,
                },
            );
        }

        Self {
            replications: results.len() as u32,
            kpis,
        }
    }

    /// Largest relative error among the named KPIs, or among all KPIs when
    /// the list is empty. Unknown names count as unbounded error.
    pub fn max_relative_error(&self, tracked: &[String]) -> f64 {
        if tracked.is_empty() {
            return self
                .kpis
                .values()
                .map(|summary| summary.relative_error)
                .fold(0.0, f64::max);
        }
        tracked
            .iter()
            .map(|name| {
                self.kpis
                    .get(name)
                    .map(|summary| summary.relative_error)
                    .unwrap_or(f64::INFINITY)
            })
            .fold(0.0, f64::max)
    }
}

/// Render replication rows as comma-delimited text, one row per
/// replication, KPI columns in name order.
pub fn replication_table(results: &[ReplicationResult]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        return out;
    }

    out.push_str("replication");
    for name in results[0].kpis.keys() {
        out.push_str(&format!(",{}", name));
    }
    out.push_str(",ending_time\n");

    for (index, result) in results.iter().enumerate() {
        out.push_str(&format!("{}", index));
        for value in result.kpis.values() {
            out.push_str(&format!(",{:.6}", value));
        }
        out.push_str(&format!(",{:.6}\n", result.ending_time));
    }
    out
}

/// Console-ready summary of an aggregate: one line per KPI with mean,
/// half-width, and relative error.
pub fn summary_table(aggregate: &AggregateResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("replications: {}\n", aggregate.replications));
    out.push_str(&format!(
        "{:<34} {:>12} {:>12} {:>10}\n",
        "kpi", "mean", "half_width", "rel_err"
    ));
    for (name, summary) in &aggregate.kpis {
        out.push_str(&format!(
            "{:<34} {:>12.4} {:>12.4} {:>10.4}\n",
            name, summary.mean, summary.half_width, summary.relative_error
        ));
    }
    out
}
