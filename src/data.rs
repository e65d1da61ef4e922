use crate::config::AppConfig;
use crate::types::Point;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use tracing::{info, warn};

/// Loads the seed dataset, JSON or CSV by extension. Rows are kept even with
/// missing metrics (the classifier degrades per layer); only a duplicate
/// `location_id` is rejected outright since it breaks point identity.
pub fn load_points(config: &AppConfig) -> Result<Vec<Point>> {
    let path = &config.input.points_file;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Points file has no extension"))?;

    let points = match extension.as_str() {
        "json" => load_json(config)?,
        "csv" => load_csv(config)?,
        _ => return Err(anyhow!("Unsupported points format: {}", extension)),
    };

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(points.len());
    for point in points {
        if !seen.insert(point.location_id.clone()) {
            warn!(location_id = %point.location_id, "dropping duplicate location_id");
            continue;
        }
        unique.push(point);
    }

    info!("Loaded {} points", unique.len());
    Ok(unique)
}

/// Counts of valid vs coordinate-invalid points, for the `validate` command.
pub fn validation_report(points: &[Point]) -> (usize, usize) {
    let valid = points.iter().filter(|p| p.coordinate().is_some()).count();
    (valid, points.len() - valid)
}

fn load_json(config: &AppConfig) -> Result<Vec<Point>> {
    let file = File::open(&config.input.points_file)
        .with_context(|| format!("Failed to open points file: {:?}", config.input.points_file))?;
    let reader = BufReader::new(file);
    let points: Vec<Point> =
        serde_json::from_reader(reader).context("Failed to parse points JSON")?;
    Ok(points)
}

fn load_csv(config: &AppConfig) -> Result<Vec<Point>> {
    let file = File::open(&config.input.points_file)
        .with_context(|| format!("Failed to open points CSV: {:?}", config.input.points_file))?;
    let mut rdr = ReaderBuilder::new().from_reader(file);
    let headers = rdr.headers()?.clone();

    let col = |name: &str| headers.iter().position(|h| h == name);
    let id_idx = col("location_id").ok_or_else(|| anyhow!("CSV missing location_id column"))?;
    let name_idx = col("name");
    let lat_idx = col("latitude");
    let lon_idx = col("longitude");
    let aqi_idx = col("aqi");
    let traffic_idx = col("traffic_density");
    let green_idx = col("green_cover_index");

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut points = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let id = match record.get(id_idx).map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => continue,
        };
        points.push(Point {
            location_id: id,
            name: field(&record, name_idx),
            latitude: field(&record, lat_idx).and_then(|v| v.parse().ok()),
            longitude: field(&record, lon_idx).and_then(|v| v.parse().ok()),
            aqi: field(&record, aqi_idx).and_then(|v| v.parse().ok()),
            traffic_density: field(&record, traffic_idx).and_then(|v| v.parse().ok()),
            green_cover_index: field(&record, green_idx).and_then(|v| v.parse().ok()),
            simulated: false,
            original_aqi: None,
        });
    }

    Ok(points)
}
