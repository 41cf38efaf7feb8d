//! Per-step metrics and run-wide outcome counts.
//!
//! [`StepMetrics`] captures timing, population and environment-fallback
//! data for a single step. [`OutcomeTally`] accumulates deactivations
//! across the whole run.

use indexmap::IndexMap;
use larvae_core::{Deactivation, Outcome};

/// Timing and population metrics collected during a single step.
///
/// All durations are in microseconds. The cumulative counters carry the
/// engine's totals at the end of the step.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Per-propagator execution times: `(name, microseconds)`.
    pub propagator_us: Vec<(String, u64)>,
    /// Active particles when the step started.
    pub active_before: usize,
    /// Active particles when the step finished.
    pub active_after: usize,
    /// Particles deactivated during the step.
    pub deactivations: usize,
    /// Temperature samples that fell back to the configured default.
    pub temperature_fallbacks: u64,
    /// Seafloor depth samples that fell back to the configured default.
    pub seafloor_fallbacks: u64,
    /// Cumulative number of rolled-back steps.
    pub rollback_events: u64,
    /// Cumulative number of transitions into the step-disabled state.
    pub step_disabled_transitions: u64,
}

/// Deactivation counts by outcome, accumulated over a run.
///
/// Every outcome is present (possibly with a zero count) and iteration
/// follows [`Outcome::ALL`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeTally {
    counts: IndexMap<Outcome, u64>,
}

impl Default for OutcomeTally {
    fn default() -> Self {
        Self {
            counts: Outcome::ALL.iter().map(|&o| (o, 0)).collect(),
        }
    }
}

impl OutcomeTally {
    /// An all-zero tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: Outcome) {
        *self.counts.entry(outcome).or_insert(0) += 1;
    }

    /// Count every deactivation in a step report.
    pub fn record_all(&mut self, deactivations: &[Deactivation]) {
        for d in deactivations {
            self.record(d.outcome);
        }
    }

    /// Count for one outcome.
    pub fn get(&self, outcome: Outcome) -> u64 {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Total deactivations.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(outcome, count)` pairs in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = (Outcome, u64)> + '_ {
        self.counts.iter().map(|(&o, &n)| (o, n))
    }

    /// Counts merged by coarse status label (both deaths count as `died`).
    pub fn by_status_label(&self) -> IndexMap<&'static str, u64> {
        let mut labels = IndexMap::new();
        for (outcome, n) in self.iter() {
            *labels.entry(outcome.status_label()).or_insert(0) += n;
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larvae_core::ParticleId;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.propagator_us.is_empty());
        assert_eq!(m.active_before, 0);
        assert_eq!(m.active_after, 0);
        assert_eq!(m.deactivations, 0);
        assert_eq!(m.temperature_fallbacks + m.seafloor_fallbacks, 0);
        assert_eq!(m.rollback_events, 0);
        assert_eq!(m.step_disabled_transitions, 0);
    }

    #[test]
    fn tally_lists_every_outcome_in_order() {
        let tally = OutcomeTally::new();
        let order: Vec<Outcome> = tally.iter().map(|(o, _)| o).collect();
        assert_eq!(order, Outcome::ALL);
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn status_labels_merge_deaths() {
        let mut tally = OutcomeTally::new();
        tally.record_all(&[
            Deactivation {
                id: ParticleId(0),
                outcome: Outcome::DiedCold,
            },
            Deactivation {
                id: ParticleId(1),
                outcome: Outcome::DiedOldAge,
            },
            Deactivation {
                id: ParticleId(2),
                outcome: Outcome::Settled,
            },
        ]);
        assert_eq!(tally.get(Outcome::DiedCold), 1);
        assert_eq!(tally.total(), 3);
        let labels = tally.by_status_label();
        assert_eq!(labels["died"], 2);
        assert_eq!(labels["settled"], 1);
        assert_eq!(labels["spawned"], 0);
    }
}
