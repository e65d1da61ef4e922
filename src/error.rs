use thiserror::Error;

/// Failures surfaced by the engine. Nothing here is fatal to the session:
/// every variant leaves the last known-good dataset in place.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid point {location_id}: {reason}")]
    InvalidPoint { location_id: String, reason: String },

    #[error("baseline data load failed: {0}")]
    DataLoad(String),

    #[error("simulation request failed: {0}")]
    Simulation(String),

    #[error("backend request failed: {0}")]
    Backend(#[from] reqwest::Error),

    #[error("backend returned malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
