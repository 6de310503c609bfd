//! JSON snapshots of a search: the best polygons plus the progress counters at
//! the time of capture. A snapshot can seed a later run on the same target.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{Candidate, EvolutionStats, FrameDimensions, SearchEngine};
use crate::error::SnapshotError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Canvas the polygons were fitted to.
    pub dims: FrameDimensions,
    pub best: Candidate,
    #[serde(default)]
    pub stats: EvolutionStats,
}

impl Snapshot {
    pub fn capture(engine: &SearchEngine) -> Self {
        Self {
            dims: engine.dimensions(),
            best: engine.best_data(),
            stats: engine.stats(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("snapshot with {} polygons written to {}", self.best.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
