//! The downloadable artifacts of a planning run: one delimited table per
//! derived dataset, plus a TOML summary of the headline numbers.

use std::path::Path;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    afe::AfeEntry,
    cost::{CostSimulation, OptimizedCostSimulation},
    forecast::ForecastPoint,
    metrics::MetricsRow,
    pipeline::{PlanReport, ServiceSummary},
    prelude::*,
    quantity::{Dollars, LaborShare},
    staffing::StaffingEntry,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Write every artifact the report carries into the directory.
#[instrument(skip_all, fields(directory = %directory.display()))]
pub fn write_artifacts(report: &PlanReport, directory: &Path) -> Result {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create `{}`", directory.display()))?;

    write(directory, "filtered_historical_metrics.csv", &historical_csv(&report.history))?;
    write(directory, "forecasted_arrivals.csv", &forecast_csv(&report.forecast))?;
    write(directory, "staffing_recommendations.csv", &staffing_csv(&report.plan))?;
    write(directory, "staffing_cost_simulation.csv", &cost_csv(&report.cost))?;
    if let Some(optimized) = &report.optimized {
        write(directory, "optimized_cost_simulation.csv", &optimized_cost_csv(optimized))?;
    }
    write(directory, "understaffed_alerts.csv", &understaffed_csv(&report.understaffed))?;
    if let Some(afe) = &report.afe {
        write(directory, "afe_staffing.csv", &afe_csv(&afe.entries))?;
    }
    write(directory, "summary.toml", &toml::to_string_pretty(&Summary::from(report))?)?;
    Ok(())
}

fn write(directory: &Path, name: &str, contents: &str) -> Result {
    let path = directory.join(name);
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    info!(artifact = name, "written");
    Ok(())
}

fn csv(header: &str, rows: impl Iterator<Item = String>) -> String {
    let mut contents = String::from(header);
    contents.push('\n');
    for row in rows {
        contents.push_str(&row);
        contents.push('\n');
    }
    contents
}

fn money(value: Dollars) -> String {
    format!("{:.2}", value.0)
}

fn historical_csv(rows: &[MetricsRow]) -> String {
    csv(
        "timestamp,truck_arrivals,labor_share",
        rows.iter().map(|row| {
            format!(
                "{},{},{}",
                row.timestamp.format(TIMESTAMP_FORMAT),
                row.truck_arrivals,
                row.labor_share.0,
            )
        }),
    )
}

fn forecast_csv(forecast: &[ForecastPoint]) -> String {
    csv(
        "timestamp,predicted_truck_arrivals",
        forecast.iter().map(|point| {
            format!(
                "{},{:.1}",
                point.timestamp.format(TIMESTAMP_FORMAT),
                point.predicted_truck_arrivals,
            )
        }),
    )
}

fn staffing_csv(plan: &[StaffingEntry]) -> String {
    csv(
        "timestamp,predicted_truck_arrivals,recommended_staff,shift_length",
        plan.iter().map(|entry| {
            format!(
                "{},{:.1},{},{}",
                entry.timestamp.format(TIMESTAMP_FORMAT),
                entry.predicted_truck_arrivals,
                entry.recommended_staff,
                entry.shift_length,
            )
        }),
    )
}

fn understaffed_csv(understaffed: &[StaffingEntry]) -> String {
    csv(
        "timestamp,predicted_truck_arrivals,recommended_staff",
        understaffed.iter().map(|entry| {
            format!(
                "{},{:.1},{}",
                entry.timestamp.format(TIMESTAMP_FORMAT),
                entry.predicted_truck_arrivals,
                entry.recommended_staff,
            )
        }),
    )
}

fn cost_csv(simulation: &CostSimulation) -> String {
    // The grand total is broadcast onto every row, as in the dashboard export.
    csv(
        "timestamp,recommended_staff,hourly_cost,total_cost",
        simulation.entries.iter().map(|entry| {
            format!(
                "{},{},{},{}",
                entry.timestamp.format(TIMESTAMP_FORMAT),
                entry.recommended_staff,
                money(entry.hourly_cost),
                money(simulation.total_cost),
            )
        }),
    )
}

fn optimized_cost_csv(simulation: &OptimizedCostSimulation) -> String {
    csv(
        "timestamp,recommended_staff,optimized_staff,optimized_cost,savings,total_savings",
        simulation.entries.iter().map(|entry| {
            [
                entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                entry.recommended_staff.to_string(),
                entry.optimized_staff.to_string(),
                money(entry.optimized_cost),
                money(entry.savings),
                money(simulation.total_savings),
            ]
            .into_iter()
            .join(",")
        }),
    )
}

fn afe_csv(entries: &[AfeEntry]) -> String {
    csv(
        "timestamp,volume,recommended_staffers",
        entries.iter().map(|entry| {
            format!(
                "{},{},{}",
                entry.timestamp.format(TIMESTAMP_FORMAT),
                entry.volume,
                entry.recommended_staffers,
            )
        }),
    )
}

/// Headline numbers of the run.
#[derive(Serialize)]
struct Summary {
    n_history_rows: usize,
    avg_labor_share: LaborShare,
    #[serde(skip_serializing_if = "Option::is_none")]
    forecast_start: Option<chrono::NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    forecast_end: Option<chrono::NaiveDateTime>,
    total_cost: Dollars,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_savings: Option<Dollars>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<ServiceSummary>,
}

impl From<&PlanReport> for Summary {
    fn from(report: &PlanReport) -> Self {
        Self {
            n_history_rows: report.history.len(),
            avg_labor_share: report.avg_labor_share,
            forecast_start: report.forecast.first().map(|point| point.timestamp),
            forecast_end: report.forecast.last().map(|point| point.timestamp),
            total_cost: report.cost.total_cost,
            total_savings: report.optimized.as_ref().map(|optimized| optimized.total_savings),
            service: report.service,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};

    use super::*;
    use crate::cost::CostEntry;

    fn timestamp(hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_forecast_csv() {
        let forecast = vec![
            ForecastPoint::new(timestamp(12), 140.0),
            ForecastPoint::new(timestamp(13), 150.0),
        ];
        assert_eq!(
            forecast_csv(&forecast),
            "timestamp,predicted_truck_arrivals\n\
             2025-06-01T12:00:00,140.0\n\
             2025-06-01T13:00:00,150.0\n",
        );
    }

    #[test]
    fn test_cost_csv_broadcasts_the_total() {
        let simulation = CostSimulation {
            entries: vec![
                CostEntry {
                    timestamp: timestamp(12),
                    recommended_staff: 5,
                    hourly_cost: Dollars(125.0),
                },
                CostEntry {
                    timestamp: timestamp(13),
                    recommended_staff: 4,
                    hourly_cost: Dollars(100.0),
                },
            ],
            total_cost: Dollars(225.0),
        };
        assert_eq!(
            cost_csv(&simulation),
            "timestamp,recommended_staff,hourly_cost,total_cost\n\
             2025-06-01T12:00:00,5,125.00,225.00\n\
             2025-06-01T13:00:00,4,100.00,225.00\n",
        );
    }

    #[test]
    fn test_staffing_csv_headers_match_the_artifact_contract() {
        let plan = vec![StaffingEntry {
            timestamp: timestamp(12),
            predicted_truck_arrivals: 140.0,
            recommended_staff: 112,
            shift_length: 8,
        }];
        assert_eq!(
            staffing_csv(&plan),
            "timestamp,predicted_truck_arrivals,recommended_staff,shift_length\n\
             2025-06-01T12:00:00,140.0,112,8\n",
        );
    }

    #[test]
    fn test_historical_csv_keeps_the_raw_share() {
        let rows =
            vec![MetricsRow::new(timestamp(8) + TimeDelta::minutes(30), 100, LaborShare(0.75))];
        assert_eq!(
            historical_csv(&rows),
            "timestamp,truck_arrivals,labor_share\n2025-06-01T08:30:00,100,0.75\n",
        );
    }
}
