//! Quadrant classification relative to median thresholds on two axes.

use serde::Serialize;

/// Axis semantics: x is a cost-like metric (lower is better), y is a
/// quality-like metric (higher is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    HighQualityLowCost,
    HighQualityHighCost,
    LowQualityLowCost,
    LowQualityHighCost,
}

/// One entity before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPoint {
    pub entity_id: String,
    pub x_metric: f64,
    pub y_metric: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantPoint {
    pub entity_id: String,
    pub x_metric: f64,
    pub y_metric: f64,
    pub volume: f64,
    pub quadrant: Quadrant,
}

/// The reference thresholds every view classifies against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadrantReference {
    pub median_x: f64,
    pub median_y: f64,
}

/// Classify one point against the reference. A point exactly on a median
/// boundary goes to the higher-value quadrant for that axis, so boundary
/// entities never flap between renders. Every view displaying a quadrant
/// must go through this function.
pub fn classify_point(x: f64, y: f64, reference: QuadrantReference) -> Quadrant {
    let high_quality = y >= reference.median_y;
    let high_cost = x >= reference.median_x;

    match (high_quality, high_cost) {
        (true, false) => Quadrant::HighQualityLowCost,
        (true, true) => Quadrant::HighQualityHighCost,
        (false, false) => Quadrant::LowQualityLowCost,
        (false, true) => Quadrant::LowQualityHighCost,
    }
}

/// Medians across the full entity set. `None` when the set is empty.
pub fn reference_for(points: &[EntityPoint]) -> Option<QuadrantReference> {
    if points.is_empty() {
        return None;
    }

    Some(QuadrantReference {
        median_x: median(points.iter().map(|p| p.x_metric)),
        median_y: median(points.iter().map(|p| p.y_metric)),
    })
}

/// Classify every entity against the set-wide medians.
pub fn classify_quadrants(points: &[EntityPoint]) -> Vec<QuadrantPoint> {
    let Some(reference) = reference_for(points) else {
        return Vec::new();
    };

    points
        .iter()
        .map(|point| QuadrantPoint {
            entity_id: point.entity_id.clone(),
            x_metric: point.x_metric,
            y_metric: point.y_metric,
            volume: point.volume,
            quadrant: classify_point(point.x_metric, point.y_metric, reference),
        })
        .collect()
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, x: f64, y: f64) -> EntityPoint {
        EntityPoint {
            entity_id: id.to_string(),
            x_metric: x,
            y_metric: y,
            volume: 100.0,
        }
    }

    #[test]
    fn cheap_and_good_is_high_quality_low_cost() {
        let reference = QuadrantReference {
            median_x: 0.01,
            median_y: 7.0,
        };
        assert_eq!(
            classify_point(0.005, 8.0, reference),
            Quadrant::HighQualityLowCost
        );
    }

    #[test]
    fn boundary_points_go_to_the_higher_value_side() {
        let reference = QuadrantReference {
            median_x: 0.01,
            median_y: 7.0,
        };
        // Exactly on both medians: high quality, high cost.
        assert_eq!(
            classify_point(0.01, 7.0, reference),
            Quadrant::HighQualityHighCost
        );
        assert_eq!(
            classify_point(0.005, 7.0, reference),
            Quadrant::HighQualityLowCost
        );
        assert_eq!(
            classify_point(0.01, 6.0, reference),
            Quadrant::LowQualityHighCost
        );
    }

    #[test]
    fn classification_uses_set_wide_medians() {
        let points = vec![
            point("a", 0.002, 9.0),
            point("b", 0.010, 7.0),
            point("c", 0.020, 5.0),
        ];

        let classified = classify_quadrants(&points);
        assert_eq!(classified[0].quadrant, Quadrant::HighQualityLowCost);
        // The middle entity sits exactly on both medians.
        assert_eq!(classified[1].quadrant, Quadrant::HighQualityHighCost);
        assert_eq!(classified[2].quadrant, Quadrant::LowQualityHighCost);
    }

    #[test]
    fn even_sets_use_midpoint_medians() {
        let points = vec![point("a", 1.0, 1.0), point("b", 3.0, 3.0)];
        let reference = reference_for(&points).unwrap();
        assert_eq!(reference.median_x, 2.0);
        assert_eq!(reference.median_y, 2.0);
    }

    #[test]
    fn empty_set_classifies_nothing() {
        assert!(classify_quadrants(&[]).is_empty());
        assert_eq!(reference_for(&[]), None);
    }
}
