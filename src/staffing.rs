use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{forecast::ForecastPoint, prelude::*, quantity::LaborShare};

/// One hour's staffing decision.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffingEntry {
    pub timestamp: NaiveDateTime,
    pub predicted_truck_arrivals: f64,
    pub recommended_staff: u32,
    /// Shift length in hours, constant across the plan.
    pub shift_length: u32,
}

/// The single staff-count rounding policy: round half away from zero, then
/// floor at zero. Every integer staff count in the plan goes through here.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_staff(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().max(0.0) as u32
}

/// Derive a staffing recommendation for every forecasted hour.
///
/// 1:1 with the forecast, order preserved. The shift length does not feed the
/// computation; it is attached for the downstream cost and display layers.
#[must_use]
pub fn recommend_staffing(
    forecast: &[ForecastPoint],
    avg_labor_share: LaborShare,
    shift_length: u32,
) -> Vec<StaffingEntry> {
    forecast
        .iter()
        .map(|point| StaffingEntry {
            timestamp: point.timestamp,
            predicted_truck_arrivals: point.predicted_truck_arrivals,
            recommended_staff: round_staff(point.predicted_truck_arrivals * avg_labor_share.0),
            shift_length,
        })
        .collect()
}

/// Hours where the recommended staff count does not cover the predicted
/// arrivals.
#[must_use]
pub fn understaffed_hours(plan: &[StaffingEntry]) -> Vec<StaffingEntry> {
    plan.iter()
        .filter(|entry| f64::from(entry.recommended_staff) < entry.predicted_truck_arrivals)
        .copied()
        .collect()
}

/// Headcount needed to clear `volume` units at `per_staffer` units per
/// staffer, rounded up. Shared by the AFE staffing table and the target-PPR
/// dock headcount.
pub fn headcount_for_volume(volume: u32, per_staffer: u32) -> Result<u32> {
    ensure!(per_staffer > 0, "per-staffer productivity must be positive");
    Ok(volume.div_ceil(per_staffer))
}

/// Ratio of actual to recommended headcount, capped at 100%.
#[must_use]
pub fn service_level(actual: u32, recommended: u32) -> f64 {
    if recommended == 0 {
        return 1.0;
    }
    (f64::from(actual) / f64::from(recommended)).min(1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;

    fn forecast_at(predictions: &[f64]) -> Vec<ForecastPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        predictions
            .iter()
            .enumerate()
            .map(|(hour, prediction)| {
                ForecastPoint::new(start + chrono::TimeDelta::hours(hour as i64), *prediction)
            })
            .collect()
    }

    #[test]
    fn test_round_staff_policy() {
        assert_eq!(round_staff(0.4), 0);
        assert_eq!(round_staff(0.5), 1);
        assert_eq!(round_staff(1.5), 2);
        assert_eq!(round_staff(2.4), 2);
        assert_eq!(round_staff(-3.0), 0);
        assert_eq!(round_staff(f64::NAN), 0);
    }

    #[test]
    fn test_recommend_staffing_is_one_to_one() {
        let forecast = forecast_at(&[10.0, 20.0, 15.0]);
        let plan = recommend_staffing(&forecast, LaborShare(0.5), 8);
        assert_eq!(plan.len(), forecast.len());
        for (point, entry) in forecast.iter().zip(&plan) {
            assert_eq!(entry.timestamp, point.timestamp);
            assert_abs_diff_eq!(entry.predicted_truck_arrivals, point.predicted_truck_arrivals);
            assert_eq!(entry.shift_length, 8);
        }
        assert_eq!(plan.iter().map(|entry| entry.recommended_staff).collect::<Vec<_>>(), [
            5, 10, 8
        ]);
    }

    #[test]
    fn test_negative_prediction_floors_to_zero_staff() {
        let plan = recommend_staffing(&forecast_at(&[-12.5]), LaborShare(0.8), 8);
        assert_eq!(plan[0].recommended_staff, 0);
    }

    #[test]
    fn test_understaffed_hours() {
        // Share 0.5 halves the staffing, so every positive hour is understaffed.
        let plan = recommend_staffing(&forecast_at(&[10.0, 0.0, 4.0]), LaborShare(0.5), 8);
        let understaffed = understaffed_hours(&plan);
        assert_eq!(understaffed.len(), 2);
        assert!(understaffed.iter().all(|entry| {
            f64::from(entry.recommended_staff) < entry.predicted_truck_arrivals
        }));
    }

    #[test]
    fn test_headcount_for_volume() -> Result {
        assert_eq!(headcount_for_volume(1500, 400)?, 4);
        assert_eq!(headcount_for_volume(1200, 400)?, 3);
        assert_eq!(headcount_for_volume(0, 400)?, 0);
        assert!(headcount_for_volume(1500, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_service_level_is_capped() {
        assert_abs_diff_eq!(service_level(3, 4), 0.75);
        assert_abs_diff_eq!(service_level(10, 5), 1.0);
        assert_abs_diff_eq!(service_level(0, 0), 1.0);
    }
}
