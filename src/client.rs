use crate::error::EngineError;
use crate::types::Point;
use async_trait::async_trait;
use serde_json::json;

/// The backend contract the session controller depends on. Both calls carry
/// full-collection semantics: the returned array always replaces the whole
/// dataset snapshot, never patches it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/data/points` — the baseline dataset.
    async fn fetch_points(&self) -> Result<Vec<Point>, EngineError>;

    /// `POST /api/simulate/park` — the full replacement dataset for a
    /// hypothetical park at the given coordinate, with affected points
    /// flagged `simulated`.
    async fn simulate_park(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Point>, EngineError>;
}

/// HTTP implementation of [`Backend`].
///
/// No automatic retry: a failed request surfaces to the controller, which
/// keeps the last known-good snapshot and reports the condition.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpBackend {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_points(&self) -> Result<Vec<Point>, EngineError> {
        let url = format!("{}/api/data/points", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn simulate_park(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Point>, EngineError> {
        let url = format!("{}/api/simulate/park", self.base_url);
        let body = json!({ "latitude": latitude, "longitude": longitude });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
