use crate::client::Backend;
use crate::error::EngineError;
use crate::render::render_pass;
use crate::types::{Layer, Marker, Point};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Idle,
    Simulating,
}

/// What happened to a dataset-replacing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Response accepted; the snapshot was replaced wholesale.
    Applied,
    /// A newer request already landed; this response was discarded.
    Stale,
    /// Request refused up front (intervention outside simulation mode);
    /// nothing was sent.
    Ignored,
}

struct SessionState {
    mode: SessionMode,
    dataset: Vec<Point>,
    next_seq: u64,
    applied_seq: u64,
}

/// Owns the current dataset snapshot and the simulation-mode state machine.
///
/// There is one logical owner of the dataset, but network completions can
/// interleave, so every dataset-replacing request (baseline load or
/// intervention) draws a ticket from one shared sequence counter and only the
/// highest-numbered completed request may land. A baseline reload issued at
/// sim-off therefore always supersedes any still-in-flight intervention
/// response. The lock is never held across an await; only the gate decides
/// which response wins.
pub struct SessionController<B: Backend> {
    backend: B,
    state: Mutex<SessionState>,
}

impl<B: Backend> SessionController<B> {
    pub fn new(backend: B) -> Self {
        SessionController {
            backend,
            state: Mutex::new(SessionState {
                mode: SessionMode::Idle,
                dataset: Vec::new(),
                next_seq: 0,
                applied_seq: 0,
            }),
        }
    }

    pub async fn mode(&self) -> SessionMode {
        self.state.lock().await.mode
    }

    /// A copy of the current dataset snapshot.
    pub async fn snapshot(&self) -> Vec<Point> {
        self.state.lock().await.dataset.clone()
    }

    /// One render pass over the current snapshot. Classification output is
    /// computed fresh and never stored; switching layers between calls
    /// changes only the markers, not the dataset.
    pub async fn render(&self, layer: Layer) -> Vec<Marker> {
        let state = self.state.lock().await;
        render_pass(&state.dataset, layer)
    }

    /// Fetches the baseline dataset and replaces the snapshot wholesale.
    /// On failure the previous snapshot is retained.
    pub async fn load_baseline(&self) -> Result<Outcome, EngineError> {
        let seq = self.next_ticket().await;
        match self.backend.fetch_points().await {
            Ok(points) => Ok(self.apply(seq, points).await),
            Err(err) => Err(EngineError::DataLoad(err.to_string())),
        }
    }

    /// Idle <-> Simulating transitions. Entering simulation keeps the
    /// baseline visible; leaving it reloads the baseline so no simulated
    /// point survives the toggle. Requesting the current mode is a no-op.
    pub async fn set_simulation_mode(&self, active: bool) -> Result<(), EngineError> {
        {
            let mut state = self.state.lock().await;
            let currently_active = state.mode == SessionMode::Simulating;
            if currently_active == active {
                return Ok(());
            }
            state.mode = if active {
                SessionMode::Simulating
            } else {
                SessionMode::Idle
            };
            info!(simulation_active = active, "simulation mode changed");
            if active {
                return Ok(());
            }
        }
        self.load_baseline().await.map(|_| ())
    }

    /// Submits a hypothetical park at the clicked coordinate. Valid only
    /// while simulating; otherwise no request is issued. On success the
    /// server's full replacement dataset is swapped in, subject to the
    /// last-response-wins gate. No automatic retry on failure.
    pub async fn submit_intervention(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Outcome, EngineError> {
        let seq = {
            let mut state = self.state.lock().await;
            if state.mode != SessionMode::Simulating {
                return Ok(Outcome::Ignored);
            }
            state.next_seq += 1;
            state.next_seq
        };
        match self.backend.simulate_park(latitude, longitude).await {
            Ok(points) => Ok(self.apply(seq, points).await),
            Err(err) => Err(EngineError::Simulation(err.to_string())),
        }
    }

    async fn next_ticket(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        state.next_seq
    }

    async fn apply(&self, seq: u64, points: Vec<Point>) -> Outcome {
        let mut state = self.state.lock().await;
        if seq <= state.applied_seq {
            warn!(seq, applied_seq = state.applied_seq, "discarding stale response");
            return Outcome::Stale;
        }
        state.applied_seq = seq;
        state.dataset = points;
        Outcome::Applied
    }
}
