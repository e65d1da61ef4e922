use crate::types::{Emphasis, Layer, Point, RenderCategory, RenderDecision, SummaryLine};

/// Traffic density above this is shown as congested. The category and the
/// qualitative flow label must both come from this cutoff and from
/// `traffic_density` only, never from `aqi`.
pub const HIGH_TRAFFIC_CUTOFF: f64 = 0.75;

/// Green cover index above this counts as high density.
pub const HIGH_GREEN_COVER_CUTOFF: f64 = 0.5;

/// Maps a point plus the active layer to a rendering decision.
///
/// Pure and total over well-formed points: a missing layer metric degrades to
/// the layer's "data missing" summary, it never fails the render pass.
/// Structural validity (coordinates) is the caller's problem; see
/// [`crate::render::render_pass`].
pub fn classify(point: &Point, layer: Layer) -> RenderDecision {
    match layer {
        Layer::Aqi => classify_aqi(point),
        Layer::Traffic => classify_traffic(point),
        Layer::GreenCover => classify_green_cover(point),
    }
}

fn classify_aqi(point: &Point) -> RenderDecision {
    // The simulated override wins regardless of AQI magnitude, but only with
    // both values present; a simulated point missing either value degrades to
    // the standard rendering rather than failing.
    if point.simulated {
        if let (Some(original), Some(current)) = (point.original_aqi, point.aqi) {
            return RenderDecision {
                category: RenderCategory::SimulatedAqi,
                summary: vec![
                    SummaryLine::new("Original AQI", original, Emphasis::Strikethrough),
                    SummaryLine::new("Simulated AQI", current, Emphasis::Strong),
                ],
            };
        }
        return RenderDecision {
            category: RenderCategory::StandardAqi,
            summary: vec![SummaryLine::note("Simulation Data Invalid")],
        };
    }

    let summary = match point.aqi {
        Some(aqi) => vec![SummaryLine::new("Air Quality (AQI)", aqi, Emphasis::Strong)],
        None => vec![SummaryLine::new(
            "Air Quality (AQI)",
            "not available",
            Emphasis::Strong,
        )],
    };
    RenderDecision {
        category: RenderCategory::StandardAqi,
        summary,
    }
}

fn classify_traffic(point: &Point) -> RenderDecision {
    match point.traffic_density {
        Some(density) => {
            let congested = density > HIGH_TRAFFIC_CUTOFF;
            let category = if congested {
                RenderCategory::HighTraffic
            } else {
                RenderCategory::NormalTraffic
            };
            let flow = if congested {
                "High Congestion"
            } else {
                "Moderate Flow"
            };
            RenderDecision {
                category,
                summary: vec![
                    SummaryLine::new("Traffic Density", density, Emphasis::Strong),
                    SummaryLine::new("Current Flow", flow, Emphasis::Normal),
                ],
            }
        }
        None => RenderDecision {
            category: RenderCategory::NormalTraffic,
            summary: vec![SummaryLine::note("Traffic Data Missing")],
        },
    }
}

fn classify_green_cover(point: &Point) -> RenderDecision {
    match point.green_cover_index {
        Some(index) => {
            let dense = index > HIGH_GREEN_COVER_CUTOFF;
            let category = if dense {
                RenderCategory::HighGreenCover
            } else {
                RenderCategory::LowGreenCover
            };
            let density = if dense { "High Density" } else { "Low Density" };
            RenderDecision {
                category,
                summary: vec![
                    SummaryLine::new("Green Cover Index", index, Emphasis::Strong),
                    SummaryLine::new("Density", density, Emphasis::Normal),
                ],
            }
        }
        None => RenderDecision {
            category: RenderCategory::LowGreenCover,
            summary: vec![SummaryLine::note("Green Cover Data Missing")],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(location_id: &str) -> Point {
        Point {
            location_id: location_id.to_string(),
            name: None,
            latitude: Some(10.0),
            longitude: Some(20.0),
            aqi: None,
            traffic_density: None,
            green_cover_index: None,
            simulated: false,
            original_aqi: None,
        }
    }

    #[test]
    fn test_standard_aqi_summary() {
        let mut p = point("A");
        p.aqi = Some(80);
        let decision = classify(&p, Layer::Aqi);
        assert_eq!(decision.category, RenderCategory::StandardAqi);
        let lines: Vec<String> = decision.summary.iter().map(|l| l.to_string()).collect();
        assert_eq!(lines, vec!["Air Quality (AQI): 80"]);
    }

    #[test]
    fn test_missing_aqi_stays_standard() {
        let decision = classify(&point("A"), Layer::Aqi);
        assert_eq!(decision.category, RenderCategory::StandardAqi);
        assert_eq!(
            decision.summary[0].to_string(),
            "Air Quality (AQI): not available"
        );
    }

    #[test]
    fn test_simulated_override_ignores_magnitude() {
        // The override applies whether the simulated AQI went up or down.
        for (original, simulated) in [(90, 180), (180, 90), (50, 50)] {
            let mut p = point("B");
            p.aqi = Some(simulated);
            p.simulated = true;
            p.original_aqi = Some(original);

            let decision = classify(&p, Layer::Aqi);
            assert_eq!(decision.category, RenderCategory::SimulatedAqi);
            assert_eq!(
                decision.summary[0],
                SummaryLine::new("Original AQI", original, Emphasis::Strikethrough)
            );
            assert_eq!(
                decision.summary[1],
                SummaryLine::new("Simulated AQI", simulated, Emphasis::Strong)
            );
        }
    }

    #[test]
    fn test_simulated_without_original_degrades() {
        let mut p = point("B");
        p.aqi = Some(120);
        p.simulated = true;
        let decision = classify(&p, Layer::Aqi);
        assert_eq!(decision.category, RenderCategory::StandardAqi);
        assert_eq!(decision.summary[0].to_string(), "Simulation Data Invalid");
    }

    #[test]
    fn test_traffic_threshold_table() {
        let cases = [
            (0.9, RenderCategory::HighTraffic, "High Congestion"),
            (0.76, RenderCategory::HighTraffic, "High Congestion"),
            (0.75, RenderCategory::NormalTraffic, "Moderate Flow"),
            (0.3, RenderCategory::NormalTraffic, "Moderate Flow"),
            (0.0, RenderCategory::NormalTraffic, "Moderate Flow"),
        ];
        for (density, category, flow) in cases {
            let mut p = point("C");
            p.traffic_density = Some(density);
            let decision = classify(&p, Layer::Traffic);
            assert_eq!(decision.category, category, "density {density}");
            // Category and flow label must agree: both derive from the same cutoff.
            assert_eq!(decision.summary[1].value.as_deref(), Some(flow));
        }
    }

    #[test]
    fn test_traffic_ignores_aqi() {
        // Historical defect: icon selection keyed off aqi instead of
        // traffic_density. An extreme AQI must not change the traffic class.
        let mut p = point("C");
        p.aqi = Some(500);
        p.traffic_density = Some(0.1);
        let decision = classify(&p, Layer::Traffic);
        assert_eq!(decision.category, RenderCategory::NormalTraffic);
    }

    #[test]
    fn test_traffic_missing_falls_back() {
        let decision = classify(&point("C"), Layer::Traffic);
        assert_eq!(decision.category, RenderCategory::NormalTraffic);
        assert_eq!(decision.summary[0].to_string(), "Traffic Data Missing");
    }

    #[test]
    fn test_green_cover_threshold_table() {
        let cases = [
            (0.8, RenderCategory::HighGreenCover, "High Density"),
            (0.51, RenderCategory::HighGreenCover, "High Density"),
            (0.5, RenderCategory::LowGreenCover, "Low Density"),
            (0.15, RenderCategory::LowGreenCover, "Low Density"),
        ];
        for (index, category, density) in cases {
            let mut p = point("D");
            p.green_cover_index = Some(index);
            let decision = classify(&p, Layer::GreenCover);
            assert_eq!(decision.category, category, "index {index}");
            assert_eq!(decision.summary[1].value.as_deref(), Some(density));
        }
    }

    #[test]
    fn test_green_cover_missing_falls_back() {
        let decision = classify(&point("D"), Layer::GreenCover);
        assert_eq!(decision.category, RenderCategory::LowGreenCover);
        assert_eq!(decision.summary[0].to_string(), "Green Cover Data Missing");
    }

    #[test]
    fn test_simulated_flag_inert_outside_aqi_layer() {
        let mut p = point("E");
        p.aqi = Some(180);
        p.simulated = true;
        p.original_aqi = Some(90);
        p.traffic_density = Some(0.9);
        p.green_cover_index = Some(0.2);

        assert_eq!(
            classify(&p, Layer::Traffic).category,
            RenderCategory::HighTraffic
        );
        assert_eq!(
            classify(&p, Layer::GreenCover).category,
            RenderCategory::LowGreenCover
        );
    }
}
