use thiserror::Error;

/// Caller passed an image that does not match the cached target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitnessError {
    #[error("target image must be at least 1x1, got {width}x{height}")]
    EmptyTarget { width: usize, height: usize },
    #[error("buffer holds {actual} bytes, expected {expected} for a {width}x{height} image")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        width: usize,
        height: usize,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("could not access snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures starting or driving the worker pool.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Fitness(#[from] FitnessError),
    #[error("could not spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Everything the binary can fail with.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fitness(#[from] FitnessError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Target(#[from] TargetError),
}
