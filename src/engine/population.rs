// -----------------------------------------------------------------------------
// Population: score-ordered generation with elite retention and annealing
// -----------------------------------------------------------------------------

use std::sync::Arc;

use rand::Rng;
use rand_pcg::Pcg64Mcg as PcgRng;

use super::{Candidate, FrameDimensions, Score};
use crate::settings::Settings;

/// Below this temperature annealing substitutions stop.
const ANNEALING_EPSILON: f64 = 0.01;

/// How an inserted candidate ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImprovementResult {
    /// Strictly better than anything seen so far.
    Best,
    /// Strictly better than the current elite cutoff.
    Elite,
    Fail,
}

/// A scored candidate. Immutable once inserted; shared by `Arc`.
#[derive(Debug)]
pub struct GenerationMember {
    pub(crate) score: Score,
    pub(crate) candidate: Candidate,
}

impl GenerationMember {
    pub(crate) fn new(score: Score, candidate: Candidate) -> Self {
        Self { score, candidate }
    }

    #[inline]
    pub fn score(&self) -> &Score {
        &self.score
    }

    #[inline]
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    #[inline]
    fn total(&self) -> u64 {
        self.score.total()
    }
}

pub(crate) struct Population {
    /// Sorted ascending by score total.
    generation: Vec<Arc<GenerationMember>>,
    best: Arc<GenerationMember>,
    elite_cutoff: u64,
    annealing_value: f64,

    generation_number: u64,
    generation_bests: u32,
    generation_elites: u32,

    generation_size: usize,
    elite_size: usize,
    use_annealing: bool,
    cooling_rate: f64,
    rng: PcgRng,
}

impl Population {
    pub(crate) fn new(settings: &Settings, dims: FrameDimensions, rng: PcgRng) -> Self {
        let generation_size = settings.generation_size.max(1);
        Self {
            generation: Vec::with_capacity(generation_size + 1),
            best: Arc::new(GenerationMember::new(Score::worst(), Candidate::default())),
            elite_cutoff: u64::MAX,
            annealing_value: settings.start_temperature
                * settings.start_temperature
                * dims.area() as f64,
            generation_number: 0,
            generation_bests: 0,
            generation_elites: 0,
            generation_size,
            elite_size: settings.elite_size.max(1),
            use_annealing: settings.use_annealing,
            cooling_rate: settings.cooling_rate,
            rng,
        }
    }

    /// Take ownership of a scored candidate and classify it.
    pub(crate) fn insert(&mut self, score: Score, candidate: Candidate) -> ImprovementResult {
        let total = score.total();
        let member = Arc::new(GenerationMember::new(score, candidate));

        // after equal scores, so earlier members keep precedence
        let pos = self.generation.partition_point(|m| m.total() <= total);
        self.generation.insert(pos, Arc::clone(&member));
        if self.generation.len() >= self.generation_size {
            self.transition();
        }

        if member.score < self.best.score {
            self.best = member;
            self.generation_bests += 1;
            ImprovementResult::Best
        } else if total < self.elite_cutoff {
            self.generation_elites += 1;
            ImprovementResult::Elite
        } else {
            ImprovementResult::Fail
        }
    }

    /// Keep the elite prefix, letting near-elite members displace elites while
    /// the temperature allows it.
    fn transition(&mut self) {
        self.generation.sort_by_key(|m| m.total());
        let sz = self.generation.len();
        let elite = self.elite_size.min(sz);

        let mut next: Vec<Arc<GenerationMember>> = Vec::with_capacity(self.generation_size + 1);
        next.extend(self.generation[..elite].iter().cloned());

        let mut replacements = 0usize;
        if self.use_annealing && self.annealing_value > ANNEALING_EPSILON && sz > elite {
            // rank 0 always survives
            for i in 1..elite {
                if Arc::ptr_eq(&next[i], &self.best) {
                    continue;
                }
                let pick = self.rng.gen_range(elite..sz);
                let challenger = &self.generation[pick];
                let delta = challenger.total() as f64 - next[i].total() as f64;
                if delta < self.annealing_value {
                    next[i] = Arc::clone(challenger);
                    replacements += 1;
                }
            }
            next.sort_by_key(|m| m.total());
        }

        self.elite_cutoff = next.last().map_or(u64::MAX, |m| m.total());

        log::debug!(
            "generation {}: {} bests, {} elites, {} annealing replacements (temperature {:.2}), best {}",
            self.generation_number,
            self.generation_bests,
            self.generation_elites,
            replacements,
            self.annealing_value,
            next.first().map_or(u64::MAX, |m| m.total()),
        );

        self.generation = next;
        self.generation_bests = 0;
        self.generation_elites = 0;
        self.generation_number += 1;
        self.annealing_value *= 1.0 - self.cooling_rate;
    }

    /// Quadratically biased pick toward the front of the generation, or of its
    /// elite prefix.
    pub(crate) fn random_member(&mut self, elite_only: bool) -> Option<Arc<GenerationMember>> {
        let len = self.generation.len();
        let size = if elite_only { self.elite_size.min(len) } else { len };
        if size == 0 {
            return None;
        }
        let r = self.rng.gen_range(0..size) as f64;
        let idx = (r * (r / size as f64)) as usize;
        Some(Arc::clone(&self.generation[idx]))
    }

    #[inline]
    pub(crate) fn best(&self) -> &Arc<GenerationMember> {
        &self.best
    }

    /// False until something has been inserted.
    #[inline]
    pub(crate) fn has_best(&self) -> bool {
        self.best.total() != u64::MAX
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.generation.len()
    }

    #[inline]
    pub(crate) fn generation_number(&self) -> u64 {
        self.generation_number
    }

    #[inline]
    pub(crate) fn elite_cutoff(&self) -> u64 {
        self.elite_cutoff
    }

    #[inline]
    pub(crate) fn annealing_value(&self) -> f64 {
        self.annealing_value
    }

    #[cfg(test)]
    fn totals(&self) -> Vec<u64> {
        self.generation.iter().map(|m| m.total()).collect()
    }
}
