//! Polycasso: approximate an image with a stack of semi-transparent polygons.
//!
//! The [`engine::SearchEngine`] runs a pool of workers that mutate, render and
//! score candidates against a shared, annealed population.

pub mod engine;
pub mod error;
pub mod settings;
pub mod snapshot;
pub mod target;

pub use engine::{ImageGenerated, ImageKind, SearchEngine};
pub use error::Error;
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use target::{engine_to_rgba, trim_size, TargetImage};
