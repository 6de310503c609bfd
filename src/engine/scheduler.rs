// -----------------------------------------------------------------------------
// Adaptive operator scheduler:
// - Each operator is drawn in proportion to its success ratio
// - A long run of failures (any operator) resets everything to uniform
// -----------------------------------------------------------------------------
use rand::Rng;

use super::MutationOperator;

/// Consecutive failures tolerated before the statistics are thrown away.
pub(crate) const MAX_FAILURE_RUN: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
struct OperatorRecord {
    successes: u64,
    attempts: u64,
    ratio: f64,
}

impl Default for OperatorRecord {
    // 1/1 so no operator starts with zero probability
    fn default() -> Self {
        Self { successes: 1, attempts: 1, ratio: 1.0 }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct AdaptiveMutationScheduler {
    records: [OperatorRecord; MutationOperator::COUNT],
    failure_run: u32,
    resets: u64,
}

impl AdaptiveMutationScheduler {
    pub(crate) fn new() -> Self {
        Self {
            records: [OperatorRecord::default(); MutationOperator::COUNT],
            failure_run: 0,
            resets: 0,
        }
    }

    /// Roulette over normalized success ratios in enumeration order.
    pub(crate) fn sample_operator<R: Rng>(&self, rng: &mut R) -> MutationOperator {
        let total: f64 = self.records.iter().map(|r| r.ratio).sum();
        let mut draw = rng.gen::<f64>();
        for op in MutationOperator::ALL {
            let share = self.records[op.index()].ratio / total;
            if draw < share {
                return op;
            }
            draw -= share;
        }
        // rounding left a sliver
        MutationOperator::CompleteChange
    }

    pub(crate) fn record_outcome(&mut self, op: MutationOperator, succeeded: bool) {
        let rec = &mut self.records[op.index()];
        rec.attempts = rec.attempts.saturating_add(1);
        if succeeded {
            rec.successes = rec.successes.saturating_add(1);
            self.failure_run = 0;
        } else {
            self.failure_run += 1;
        }

        if self.failure_run > MAX_FAILURE_RUN {
            log::debug!(
                "operator stats reset after {} straight failures: {}",
                self.failure_run,
                self.describe()
            );
            self.reset();
        } else {
            rec.ratio = rec.successes as f64 / rec.attempts as f64;
        }
    }

    fn reset(&mut self) {
        self.records = [OperatorRecord::default(); MutationOperator::COUNT];
        self.failure_run = 0;
        self.resets += 1;
    }

    /// Normalized selection probabilities.
    pub(crate) fn current_weights(&self) -> [f64; MutationOperator::COUNT] {
        let total: f64 = self.records.iter().map(|r| r.ratio).sum::<f64>().max(1e-12);
        let mut weights = [0.0; MutationOperator::COUNT];
        for (w, r) in weights.iter_mut().zip(self.records.iter()) {
            *w = r.ratio / total;
        }
        weights
    }

    #[cfg(test)]
    pub(crate) fn success_ratio(&self, op: MutationOperator) -> f64 {
        self.records[op.index()].ratio
    }

    #[cfg(test)]
    pub(crate) fn failure_run(&self) -> u32 {
        self.failure_run
    }

    #[inline]
    pub(crate) fn resets(&self) -> u64 {
        self.resets
    }

    fn describe(&self) -> String {
        MutationOperator::ALL
            .iter()
            .map(|op| {
                let r = &self.records[op.index()];
                format!("{}={}/{}", op.label(), r.successes, r.attempts)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg as PcgRng;

    #[test]
    fn test_starts_uniform() {
        let sched = AdaptiveMutationScheduler::new();
        let expected = 1.0 / MutationOperator::COUNT as f64;
        for w in sched.current_weights() {
            assert!((w - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniform_sampling_reaches_every_operator() {
        let sched = AdaptiveMutationScheduler::new();
        let mut rng = PcgRng::seed_from_u64(5);
        let mut seen = [0usize; MutationOperator::COUNT];
        for _ in 0..20_000 {
            seen[sched.sample_operator(&mut rng).index()] += 1;
        }
        // ~1176 expected per operator
        assert!(seen.iter().all(|&n| n > 800), "{seen:?}");
    }

    #[test]
    fn test_success_biases_sampling() {
        let mut sched = AdaptiveMutationScheduler::new();
        for op in MutationOperator::ALL {
            if op != MutationOperator::ShiftPoly {
                // 1 success / 10 attempts, interleaved so no reset fires
                for _ in 0..9 {
                    sched.record_outcome(op, false);
                }
                sched.record_outcome(MutationOperator::ShiftPoly, true);
            }
        }
        assert!((sched.success_ratio(MutationOperator::ShiftPoly) - 1.0).abs() < 1e-12);
        assert!((sched.success_ratio(MutationOperator::Black) - 0.1).abs() < 1e-12);

        let mut rng = PcgRng::seed_from_u64(9);
        let shift = (0..10_000)
            .filter(|_| sched.sample_operator(&mut rng) == MutationOperator::ShiftPoly)
            .count();
        // 1.0 / (1.0 + 16 * 0.1) ~= 0.38
        assert!(shift > 3_000 && shift < 4_700, "{shift}");
    }

    #[test]
    fn test_failure_run_resets_statistics() {
        let mut sched = AdaptiveMutationScheduler::new();
        sched.record_outcome(MutationOperator::Breed, true);
        for i in 0..MAX_FAILURE_RUN {
            let op = MutationOperator::ALL[i as usize % MutationOperator::COUNT];
            sched.record_outcome(op, false);
        }
        assert_eq!(sched.failure_run(), MAX_FAILURE_RUN);
        assert_eq!(sched.resets(), 0);
        assert!(sched.success_ratio(MutationOperator::AddPolygon) < 1.0);

        sched.record_outcome(MutationOperator::White, false);
        assert_eq!(sched.resets(), 1);
        assert_eq!(sched.failure_run(), 0);
        for op in MutationOperator::ALL {
            assert_eq!(sched.success_ratio(op), 1.0);
        }
    }

    #[test]
    fn test_success_breaks_failure_run() {
        let mut sched = AdaptiveMutationScheduler::new();
        for _ in 0..40 {
            sched.record_outcome(MutationOperator::MovePoint, false);
        }
        sched.record_outcome(MutationOperator::MovePoint, true);
        for _ in 0..40 {
            sched.record_outcome(MutationOperator::MovePoint, false);
        }
        assert_eq!(sched.resets(), 0);
        assert_eq!(sched.failure_run(), 40);
    }
}
