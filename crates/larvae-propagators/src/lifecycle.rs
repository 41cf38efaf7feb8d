//! Terminal outcomes: spawning, settlement and death.

use larvae_core::{Column, ColumnSet, Outcome, PropagatorError, TimeDirection};
use larvae_propagator::context::StepContext;
use larvae_propagator::propagator::{Propagator, WriteMode};

use crate::milestones::Milestones;

/// Default lethal cold-water temperature, in degrees Celsius.
pub const DEFAULT_LETHAL_COLD: f64 = 4.0;

/// Deactivates particles that reached a terminal outcome this step.
///
/// Predicates are tried in order and the first match wins:
///
/// 1. Spawned: reverse time, level at or below zero.
/// 2. Settled: forward time, on or below the seafloor and eligible.
/// 3. Died of old age: forward time, level at or above `tmax`.
/// 4. Died of cold: forward time, before the first milestone, in water at
///    or below the lethal temperature.
///
/// A zero-length step evaluates nothing.
#[derive(Clone, Debug)]
pub struct LifecyclePropagator {
    milestones: Milestones,
    lethal_cold: f64,
}

impl LifecyclePropagator {
    /// Create the stage from the run's milestones and lethal temperature.
    pub fn new(milestones: Milestones, lethal_cold: f64) -> Self {
        Self {
            milestones,
            lethal_cold,
        }
    }

    fn forward_outcome(
        &self,
        z: f64,
        floor: f64,
        eligible: bool,
        level: f64,
        t: f64,
    ) -> Option<Outcome> {
        if eligible && z <= -floor {
            Some(Outcome::Settled)
        } else if level >= self.milestones.tmax {
            Some(Outcome::DiedOldAge)
        } else if level < 1.0 && t <= self.lethal_cold {
            Some(Outcome::DiedCold)
        } else {
            None
        }
    }
}

impl Propagator for LifecyclePropagator {
    fn name(&self) -> &str {
        "lifecycle"
    }

    fn reads(&self) -> ColumnSet {
        [
            Column::DevLevel,
            Column::Z,
            Column::SeafloorDepth,
            Column::SettlementEligible,
            Column::Temperature,
        ]
        .into()
    }

    fn writes(&self) -> Vec<(Column, WriteMode)> {
        vec![(Column::Status, WriteMode::Incremental)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let direction = ctx.direction();
        if direction == TimeDirection::Stationary {
            return Ok(());
        }
        let cols = ctx.columns();
        let mut counts = [0usize; 5];
        for i in 0..cols.len() {
            if !cols.is_active(i) {
                continue;
            }
            let outcome = match direction {
                TimeDirection::Backward => (cols.dev_level[i] <= 0.0).then_some(Outcome::Spawned),
                _ => self.forward_outcome(
                    cols.z[i],
                    cols.seafloor_depth[i],
                    cols.settlement_eligible[i],
                    cols.dev_level[i],
                    cols.temperature[i],
                ),
            };
            if let Some(outcome) = outcome {
                if cols.deactivate(i, outcome) {
                    counts[outcome as usize] += 1;
                }
            }
        }
        if counts.iter().any(|&c| c > 0) {
            tracing::debug!(
                spawned = counts[Outcome::Spawned as usize],
                settled = counts[Outcome::Settled as usize],
                died_old_age = counts[Outcome::DiedOldAge as usize],
                died_cold = counts[Outcome::DiedCold as usize],
                "lifecycle outcomes"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_stage, set};
    use larvae_core::{Ensemble, ParticleSeed, Status};
    use larvae_test_utils::MockEnvironment;

    fn gate() -> LifecyclePropagator {
        LifecyclePropagator::new(
            Milestones {
                wsmax: 1.06,
                tmax: 2.2,
            },
            DEFAULT_LETHAL_COLD,
        )
    }

    fn larva(z: f64, dev_level: f64, floor: f64, eligible: bool) -> Ensemble {
        let mut e = Ensemble::new();
        e.seed(ParticleSeed {
            lon: 0.0,
            lat: 0.0,
            z,
            dev_level,
        });
        set(&mut e, |cols| {
            cols.seafloor_depth[0] = floor;
            cols.settlement_eligible[0] = eligible;
        });
        e
    }

    #[test]
    fn old_age_kills_and_freezes() {
        let env = MockEnvironment::uniform(8.0, 100.0);
        let mut e = larva(-50.0, 2.5, 100.0, false);
        let log = run_stage(&gate(), &mut e, &env, 3600.0).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].outcome.reason(), "died (old age)");

        let frozen = e.particle(0).unwrap();
        let again = run_stage(&gate(), &mut e, &env, 3600.0).unwrap();
        assert!(again.is_empty());
        assert_eq!(e.particle(0).unwrap(), frozen);
    }

    #[test]
    fn eligible_on_seafloor_settles_before_old_age() {
        let env = MockEnvironment::uniform(8.0, 100.0);
        let mut e = larva(-100.0, 2.5, 100.0, true);
        let log = run_stage(&gate(), &mut e, &env, 3600.0).unwrap();
        assert_eq!(log[0].outcome, Outcome::Settled);
    }

    #[test]
    fn eligible_above_seafloor_does_not_settle() {
        let env = MockEnvironment::uniform(8.0, 100.0);
        let mut e = larva(-60.0, 2.1, 100.0, true);
        assert!(run_stage(&gate(), &mut e, &env, 3600.0).unwrap().is_empty());
    }

    #[test]
    fn cold_kills_only_before_first_milestone() {
        let env = MockEnvironment::uniform(3.0, 100.0);
        let mut young = larva(-10.0, 0.5, 100.0, false);
        let log = run_stage(&gate(), &mut young, &env, 3600.0).unwrap();
        assert_eq!(log[0].outcome.reason(), "died (cold)");

        let mut ciliated = larva(-10.0, 1.2, 100.0, false);
        assert!(run_stage(&gate(), &mut ciliated, &env, 3600.0).unwrap().is_empty());

        let lethal_boundary = MockEnvironment::uniform(4.0, 100.0);
        let mut at_threshold = larva(-10.0, 0.5, 100.0, false);
        let log = run_stage(&gate(), &mut at_threshold, &lethal_boundary, 3600.0).unwrap();
        assert_eq!(log[0].outcome, Outcome::DiedCold);
    }

    #[test]
    fn spawned_only_in_reverse_time() {
        let env = MockEnvironment::uniform(3.0, 100.0);
        let mut back = larva(-10.0, 0.0, 100.0, false);
        let log = run_stage(&gate(), &mut back, &env, -3600.0).unwrap();
        assert_eq!(log[0].outcome, Outcome::Spawned);

        // Cold water and old age are not evaluated backwards.
        let mut old = larva(-10.0, 2.5, 100.0, false);
        assert!(run_stage(&gate(), &mut old, &env, -3600.0).unwrap().is_empty());
        let mut cold = larva(-10.0, 0.5, 100.0, false);
        assert!(run_stage(&gate(), &mut cold, &env, -3600.0).unwrap().is_empty());

        // Level zero in forward time is not a spawn.
        let mut fwd = larva(-10.0, 0.0, 100.0, false);
        let warm = MockEnvironment::uniform(10.0, 100.0);
        assert!(run_stage(&gate(), &mut fwd, &warm, 3600.0).unwrap().is_empty());
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let env = MockEnvironment::uniform(3.0, 100.0);
        let mut e = larva(-100.0, 2.5, 100.0, true);
        assert!(run_stage(&gate(), &mut e, &env, 0.0).unwrap().is_empty());
        assert_eq!(e.particle(0).unwrap().status, Status::Active);
    }
}
