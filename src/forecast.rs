use chrono::{NaiveDateTime, TimeDelta};
use linfa::{DatasetBase, prelude::*};
use linfa_linear::LinearRegression;
use ndarray::{Array, Array2};
use serde::{Deserialize, Serialize};

use crate::{metrics::MetricsRow, prelude::*};

/// One predicted future hour.
///
/// The prediction is rounded to one decimal and deliberately not clamped:
/// a declining trend is reported as-is, negative values included. Staff
/// derivation floors at zero downstream.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, derive_more::Constructor)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub predicted_truck_arrivals: f64,
}

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Forecast hourly truck arrivals by extrapolating an ordinary least squares
/// fit of arrivals against elapsed hours.
///
/// Returns exactly `future_hours` points, hourly spaced, starting one hour
/// after the last historical timestamp.
#[instrument(skip_all, fields(n_rows = rows.len(), future_hours))]
#[allow(clippy::cast_precision_loss)]
pub fn forecast_truck_arrivals(
    rows: &[MetricsRow],
    future_hours: u32,
) -> Result<Vec<ForecastPoint>> {
    ensure!(
        rows.len() >= 2,
        "insufficient history: cannot forecast from {} row(s)",
        rows.len(),
    );

    let first_timestamp =
        rows.iter().map(|row| row.timestamp).min().context("the history has no timestamps")?;
    let last_timestamp =
        rows.iter().map(|row| row.timestamp).max().context("the history has no timestamps")?;
    let elapsed_hours = |timestamp: NaiveDateTime| {
        (timestamp - first_timestamp).num_seconds() as f64 / SECONDS_PER_HOUR
    };

    let records: Vec<[f64; 1]> =
        rows.iter().map(|row| [elapsed_hours(row.timestamp)]).collect();
    let targets: Vec<f64> = rows.iter().map(|row| f64::from(row.truck_arrivals)).collect();
    let dataset = DatasetBase::new(Array2::from(records), Array::from(targets));
    let model = LinearRegression::default().fit(&dataset)?;
    let slope = model.params()[0];
    let intercept = model.intercept();
    debug!(slope, intercept, "fitted the arrival trend");

    let last_elapsed = elapsed_hours(last_timestamp);
    Ok((1..=future_hours)
        .map(|offset| {
            let prediction = intercept + slope * (last_elapsed + f64::from(offset));
            ForecastPoint {
                timestamp: last_timestamp + TimeDelta::hours(i64::from(offset)),
                predicted_truck_arrivals: round_to_tenth(prediction),
            }
        })
        .collect())
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
