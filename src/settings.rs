//! search settings for polycasso
//! loaded from a TOML file; every field is optional and falls back to its default
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // population
    /// candidates collected before a generational transition
    pub generation_size: usize,
    /// members carried over into the next generation
    pub elite_size: usize,
    pub use_annealing: bool,
    /// initial annealing temperature is start_temperature^2 * width * height
    pub start_temperature: f64,
    /// fraction the temperature loses every generation
    pub cooling_rate: f64,

    // canvas
    pub max_image_width: usize,
    pub max_image_height: usize,

    // mutation bounds
    pub max_polygons: usize,
    pub max_points: usize,
    pub max_point_movement: usize,
    pub max_color_change: usize,

    // workers
    /// None = available parallelism + 1
    pub worker_threads: Option<usize>,
    /// crossfade frames emitted by `complete`
    pub completion_steps: usize,
    pub completion_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation_size: 40,
            elite_size: 10,
            use_annealing: true,
            start_temperature: 10.0,
            cooling_rate: 0.01,

            max_image_width: 800,
            max_image_height: 600,

            max_polygons: 100,
            max_points: 7,
            max_point_movement: 20,
            max_color_change: 40,

            worker_threads: None,
            completion_steps: 500,
            completion_delay_ms: 80,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Lower bounds the search engine relies on but does not check itself.
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason: reason.into() })
        }

        if self.elite_size < 1 {
            return invalid("elite_size", "must be at least 1");
        }
        if self.generation_size <= self.elite_size {
            return invalid(
                "generation_size",
                format!("must exceed elite_size ({})", self.elite_size),
            );
        }
        if self.start_temperature.is_nan() || self.start_temperature < 0.0 {
            return invalid("start_temperature", "must be non-negative");
        }
        if !(0.0..1.0).contains(&self.cooling_rate) {
            return invalid("cooling_rate", "must be in [0, 1)");
        }
        if self.max_image_width == 0 || self.max_image_height == 0 {
            return invalid("max_image_width", "maximum image dimensions must be positive");
        }
        if self.max_polygons < 1 {
            return invalid("max_polygons", "must be at least 1");
        }
        if self.max_points < 3 {
            return invalid("max_points", "polygons need at least 3 points");
        }
        if self.worker_threads == Some(0) {
            return invalid("worker_threads", "must be at least 1 when set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.generation_size, 40);
        assert_eq!(s.elite_size, 10);
        assert_eq!(s.max_points, 7);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = Settings::from_toml("generation_size = 60\nuse_annealing = false\n").unwrap();
        assert_eq!(s.generation_size, 60);
        assert!(!s.use_annealing);
        assert_eq!(s.max_polygons, 100);
        assert_eq!(s.worker_threads, None);
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let err = Settings::from_toml("generation_size = \"lots\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_validation_rejects_elite_overflow() {
        let s = Settings { elite_size: 40, ..Settings::default() };
        assert!(matches!(
            s.validate(),
            Err(SettingsError::Invalid { field: "generation_size", .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_points_and_cooling() {
        let s = Settings { max_points: 2, ..Settings::default() };
        assert!(s.validate().is_err());
        let s = Settings { cooling_rate: 1.0, ..Settings::default() };
        assert!(s.validate().is_err());
    }
}
