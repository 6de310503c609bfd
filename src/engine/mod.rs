// engine/mod.rs
mod engine_core;
mod types;
mod geom;
mod polygon;
mod raster;
mod fitness;
mod mutation;
mod scheduler;
mod population;
mod stats;

pub use engine_core::{ImageGenerated, ImageKind, SearchEngine, EVENT_BUFFER};
pub use types::{FrameDimensions, IntRect};
pub use polygon::{Candidate, Point, Polygon};
pub use fitness::{FitnessEvaluator, Score, DEFAULT_GRID_DIVISIONS};
pub use mutation::MutationOperator;
pub use population::ImprovementResult;
pub use stats::EvolutionStats;
pub use raster::render_candidate;

// Make shared helpers available to submodules
pub(crate) use geom::{clamp_i32, union_rect};
pub(crate) use polygon::polygon_bbox_px;
pub(crate) use scheduler::AdaptiveMutationScheduler;
