// -----------------------------------------------------------------------------
// Progress snapshot exposed to callers
// -----------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionStats {
    pub generation_number: u64,
    pub population_len: usize,

    pub best_error: Option<u64>,
    pub best_polygon_count: usize,
    pub elite_cutoff: Option<u64>,
    pub anneal_temp: f64,

    pub total_proposals: u64,
    pub total_bests: u64,
    pub total_elites: u64,

    /// Operator selection weights of the worker that found the latest best.
    pub operator_weights: Vec<(String, f64)>,
    pub scheduler_resets: u64,

    pub error_history: Vec<u64>,

    pub worker_count: usize,
    pub running: bool,
}

impl EvolutionStats {
    pub fn push_best_error_history(&mut self, v: u64) {
        const MAX: usize = 512;
        self.error_history.push(v);
        if self.error_history.len() > MAX {
            let extra = self.error_history.len() - MAX;
            self.error_history.drain(0..extra);
        }
    }

    /// Share of proposals that entered the elite or beat the best.
    pub fn acceptance_percent(&self) -> f64 {
        if self.total_proposals == 0 {
            return 0.0;
        }
        (self.total_bests + self.total_elites) as f64 * 100.0 / self.total_proposals as f64
    }
}
