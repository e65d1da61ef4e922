use crate::config::{AppConfig, SimulationConfig};
use crate::types::{Coordinate, Point};
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use geo::HaversineDistance;
use rstar::{RTree, RTreeObject, AABB};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

const METERS_PER_KM: f64 = 1000.0;
const KM_PER_DEGREE_LAT: f64 = 111.0;

// Wrapper for RTree indexing
pub struct PointEntry {
    pub index: usize,
    pub position: [f64; 2],
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

pub struct AppState {
    pub points: Vec<Point>,
    pub tree: RTree<PointEntry>,
    pub simulation: SimulationConfig,
}

/// Spatial index over every point with valid coordinates, keyed [lon, lat]
/// to match the envelope queries below.
pub fn build_index(points: &[Point]) -> RTree<PointEntry> {
    let entries: Vec<PointEntry> = points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let coord = point.coordinate()?;
            Some(PointEntry {
                index,
                position: [coord.longitude, coord.latitude],
            })
        })
        .collect();
    RTree::bulk_load(entries)
}

/// Computes the full replacement dataset for a park placed at `click`.
///
/// Points within the impact radius get a distance- and green-cover-weighted
/// AQI reduction and are flagged `simulated` with the pre-intervention value
/// recorded; everything else is returned byte-for-byte unchanged. Always
/// full-collection semantics.
pub fn apply_intervention(
    points: &[Point],
    tree: &RTree<PointEntry>,
    click: Coordinate,
    config: &SimulationConfig,
) -> Vec<Point> {
    let mut result = points.to_vec();

    // Coarse envelope first, exact haversine check second.
    let lat_delta = config.impact_radius_km / KM_PER_DEGREE_LAT;
    let lon_delta =
        config.impact_radius_km / (KM_PER_DEGREE_LAT * click.latitude.to_radians().cos().abs().max(0.01));
    let envelope = AABB::from_corners(
        [click.longitude - lon_delta, click.latitude - lat_delta],
        [click.longitude + lon_delta, click.latitude + lat_delta],
    );
    let candidates: HashSet<usize> = tree
        .locate_in_envelope_intersecting(&envelope)
        .map(|entry| entry.index)
        .collect();

    let click_point = geo::Point::new(click.longitude, click.latitude);
    for index in candidates {
        let point = &mut result[index];
        let Some(coord) = point.coordinate() else {
            continue;
        };
        let distance_km = click_point
            .haversine_distance(&geo::Point::new(coord.longitude, coord.latitude))
            / METERS_PER_KM;
        if distance_km > config.impact_radius_km {
            continue;
        }
        let Some(aqi) = point.aqi else {
            continue;
        };
        // Dense existing green cover dampens the marginal benefit of a new park.
        let green = point.green_cover_index.unwrap_or(0.3).clamp(0.0, 1.0);
        let reduction =
            config.max_reduction * (1.0 - distance_km / config.impact_radius_km) * (1.0 - green);
        point.original_aqi = Some(aqi);
        point.aqi = Some((aqi as f64 * (1.0 - reduction)).round() as i64);
        point.simulated = true;
    }

    result
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/data/points", get(points_handler))
        .route("/api/simulate/park", post(simulate_handler))
        .route("/_health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, points: Vec<Point>) -> Result<()> {
    info!("Building spatial index for {} points", points.len());
    let tree = build_index(&points);

    let state = Arc::new(AppState {
        points,
        tree,
        simulation: config.simulation.clone(),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn points_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Point>> {
    Json(state.points.clone())
}

async fn simulate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<Vec<Point>>, (StatusCode, Json<Value>)> {
    let (latitude, longitude) = match (request.latitude, request.longitude) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing coordinates" })),
            ))
        }
    };

    let click = Coordinate {
        latitude,
        longitude,
    };
    let simulated = apply_intervention(&state.points, &state.tree, click, &state.simulation);
    Ok(Json(simulated))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
