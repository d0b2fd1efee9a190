//! Body-weight trend.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::BodyMetric;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

/// Measurements as chart points, oldest first.
#[must_use]
pub fn weight_series(metrics: &[BodyMetric]) -> Vec<WeightPoint> {
    let mut points: Vec<WeightPoint> = metrics
        .iter()
        .map(|m| WeightPoint {
            date: m.date,
            weight: m.weight,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Change between the first and last measurement, in kilograms.
#[must_use]
pub fn weight_change(points: &[WeightPoint]) -> Option<f64> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => Some(last.weight - first.weight),
        _ => None,
    }
}
