//! Full session lifecycle against a real server on an ephemeral port.

use green_city_blueprint::client::HttpBackend;
use green_city_blueprint::config::SimulationConfig;
use green_city_blueprint::server::{app, build_index, AppState};
use green_city_blueprint::session::{Outcome, SessionController, SessionMode};
use green_city_blueprint::types::{Layer, Point, RenderCategory};
use std::sync::Arc;

fn seed_point(
    id: &str,
    name: &str,
    latitude: f64,
    longitude: f64,
    aqi: i64,
    traffic: f64,
    green: f64,
) -> Point {
    Point {
        location_id: id.to_string(),
        name: Some(name.to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
        aqi: Some(aqi),
        traffic_density: Some(traffic),
        green_cover_index: Some(green),
        simulated: false,
        original_aqi: None,
    }
}

fn seed_points() -> Vec<Point> {
    vec![
        seed_point("JAL001", "Model Town", 31.3115, 75.5760, 155, 0.85, 0.30),
        seed_point("JAL002", "Rama Mandi", 31.2850, 75.6100, 180, 0.95, 0.15),
        seed_point("JAL003", "Urban Estate Phase 2", 31.3390, 75.5450, 120, 0.30, 0.43),
        seed_point("JAL004", "Jalandhar Cantt", 31.2800, 75.5900, 95, 0.55, 0.55),
    ]
}

async fn spawn_server() -> String {
    let points = seed_points();
    let tree = build_index(&points);
    let state = Arc::new(AppState {
        points,
        tree,
        simulation: SimulationConfig {
            impact_radius_km: 5.0,
            max_reduction: 0.4,
        },
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_session_lifecycle_over_http() {
    let base_url = spawn_server().await;
    let controller = SessionController::new(HttpBackend::new(base_url));

    // Baseline load at session start.
    controller.load_baseline().await.unwrap();
    let baseline = controller.snapshot().await;
    assert_eq!(baseline.len(), 4);
    assert!(baseline.iter().all(|p| !p.simulated));

    // Clicking the map while idle must not issue a request.
    let outcome = controller.submit_intervention(31.3115, 75.5760).await.unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    assert_eq!(controller.mode().await, SessionMode::Idle);

    // Enter simulation mode and place a park at Model Town.
    controller.set_simulation_mode(true).await.unwrap();
    let outcome = controller.submit_intervention(31.3115, 75.5760).await.unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let simulated = controller.snapshot().await;
    assert_eq!(simulated.len(), 4, "always a full replacement collection");
    let flagged: Vec<&Point> = simulated.iter().filter(|p| p.simulated).collect();
    assert!(!flagged.is_empty());
    for point in &flagged {
        let original = point.original_aqi.expect("simulated point keeps original_aqi");
        assert!(point.aqi.unwrap() <= original);
    }

    // The AQI layer renders the simulated override; the traffic layer is
    // untouched by the simulated flag.
    let aqi_markers = controller.render(Layer::Aqi).await;
    assert!(aqi_markers
        .iter()
        .any(|m| m.category == RenderCategory::SimulatedAqi));
    let traffic_markers = controller.render(Layer::Traffic).await;
    assert!(traffic_markers
        .iter()
        .all(|m| m.category != RenderCategory::SimulatedAqi));

    // Leaving simulation mode restores a clean baseline.
    controller.set_simulation_mode(false).await.unwrap();
    assert_eq!(controller.mode().await, SessionMode::Idle);
    let restored = controller.snapshot().await;
    assert!(restored.iter().all(|p| !p.simulated));
    assert_eq!(restored.len(), 4);
}

#[tokio::test]
async fn test_http_backend_surfaces_load_failure() {
    // Nothing is listening here; the controller must keep its (empty)
    // snapshot and surface the condition instead of crashing.
    let controller = SessionController::new(HttpBackend::new("http://127.0.0.1:9"));
    let err = controller.load_baseline().await.unwrap_err();
    assert!(matches!(
        err,
        green_city_blueprint::error::EngineError::DataLoad(_)
    ));
    assert!(controller.snapshot().await.is_empty());
}
