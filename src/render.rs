use crate::classify::classify;
use crate::types::{Layer, Marker, Point};
use tracing::warn;

/// Runs one render pass over a dataset snapshot: drops structurally invalid
/// points (missing or malformed coordinates), classifies the rest under the
/// active layer, and emits the marker records the map widget consumes.
///
/// A bad point never aborts the pass; it is logged and skipped so the rest of
/// the dataset still renders.
pub fn render_pass(points: &[Point], layer: Layer) -> Vec<Marker> {
    points
        .iter()
        .filter_map(|point| {
            let position = match point.validated_coordinate() {
                Ok(position) => position,
                Err(err) => {
                    warn!(%err, "skipping point");
                    return None;
                }
            };
            let decision = classify(point, layer);
            Some(Marker {
                location_id: point.location_id.clone(),
                name: point.display_name().to_string(),
                position,
                category: decision.category,
                summary: decision.summary,
            })
        })
        .collect()
}
