//! The single planning pipeline both dashboard variants run through: one
//! config struct in, one report of derived tables out.

use std::{ops::RangeInclusive, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;

use crate::{
    afe::{AfeEntry, CombinedStaffingEntry, combined_staffing, recommend_afe_staffing},
    cost::{
        CostSimulation,
        OptimizedCostSimulation,
        simulate_optimized_cost,
        simulate_staffing_cost,
    },
    forecast::{ForecastPoint, forecast_truck_arrivals},
    metrics::{MetricsRow, filter_from, filter_labor_share, mean_labor_share},
    prelude::*,
    quantity::{Dollars, LaborShare},
    staffing::{
        StaffingEntry,
        headcount_for_volume,
        recommend_staffing,
        service_level,
        understaffed_hours,
    },
};

/// Where the staffing labor share comes from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LaborShareSource {
    /// Mean labor share of the filtered historical window.
    Historical,

    /// Operator-supplied share.
    Manual(LaborShare),

    /// Named optimization preset.
    Preset(OptimizationPreset),
}

impl LaborShareSource {
    pub fn resolve(self, rows: &[MetricsRow]) -> Result<LaborShare> {
        match self {
            Self::Historical => mean_labor_share(rows)
                .context("cannot derive the historical labor share from an empty window"),
            Self::Manual(share) => Ok(share),
            Self::Preset(preset) => Ok(preset.labor_share()),
        }
    }
}

impl FromStr for LaborShareSource {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("historical") {
            return Ok(Self::Historical);
        }
        if let Ok(preset) = OptimizationPreset::from_str(value, true) {
            return Ok(Self::Preset(preset));
        }
        Ok(Self::Manual(value.parse()?))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OptimizationPreset {
    /// Run the dock on 60% of the mean staffing.
    AggressiveSavings,

    /// Run the dock on 80% of the mean staffing.
    BalancedOps,

    /// Keep the full mean staffing.
    HighCoverage,
}

impl OptimizationPreset {
    #[must_use]
    pub const fn labor_share(self) -> LaborShare {
        match self {
            Self::AggressiveSavings => LaborShare(0.6),
            Self::BalancedOps => LaborShare(0.8),
            Self::HighCoverage => LaborShare(1.0),
        }
    }
}

/// Scalar knobs of a planning run. Out-of-domain values are rejected by
/// [`PlanConfig::validate`] rather than clamped.
#[derive(Clone, Debug, bon::Builder)]
pub struct PlanConfig {
    /// Number of future hourly slots to forecast.
    pub future_hours: u32,

    /// Shift length in hours, attached to every staffing row.
    pub shift_length: u32,

    /// Cost per staffer per hour.
    pub hourly_rate: Dollars,

    pub labor_share_source: LaborShareSource,

    /// Labor share of the optimized cost variant; the variant is skipped when
    /// absent.
    pub optimized_labor_share: Option<LaborShare>,

    /// Keep only history on or after this date.
    pub start_date: Option<NaiveDate>,

    /// Keep only history within this labor share band.
    pub labor_share_range: Option<RangeInclusive<LaborShare>>,

    /// Target packages per dock staffer, sizing the reference headcount.
    pub target_ppr: Option<u32>,

    /// AFE units handled per staffer per hour.
    pub afe_productivity: Option<u32>,
}

impl PlanConfig {
    pub fn validate(&self) -> Result {
        ensure!(
            (1..=12).contains(&self.future_hours),
            "future hours must lie in 1..=12, got {}",
            self.future_hours,
        );
        ensure!(
            (4..=12).contains(&self.shift_length),
            "shift length must lie in 4..=12 hours, got {}",
            self.shift_length,
        );
        ensure!(
            (15.0..=50.0).contains(&self.hourly_rate.0),
            "hourly rate must lie in $15..=$50, got {}",
            self.hourly_rate,
        );
        if let LaborShareSource::Manual(share) = self.labor_share_source {
            ensure!(share.is_valid(), "labor share must lie in [0, 1], got {}", share.0);
        }
        if let Some(share) = self.optimized_labor_share {
            ensure!(
                share.0 > 0.0 && share.0 <= 1.0,
                "optimized labor share must lie in (0, 1], got {}",
                share.0,
            );
        }
        if let Some(range) = &self.labor_share_range {
            ensure!(
                range.start() <= range.end(),
                "labor share filter is inverted: {} > {}",
                range.start().0,
                range.end().0,
            );
        }
        if let Some(target_ppr) = self.target_ppr {
            ensure!(
                (50..=500).contains(&target_ppr),
                "target PPR must lie in 50..=500, got {target_ppr}",
            );
        }
        if let Some(afe_productivity) = self.afe_productivity {
            ensure!(
                (50..=400).contains(&afe_productivity),
                "AFE productivity must lie in 50..=400, got {afe_productivity}",
            );
        }
        Ok(())
    }
}

/// AFE staffing tables alongside the dock plan.
#[derive(Clone, Debug, PartialEq)]
pub struct AfeSection {
    pub entries: Vec<AfeEntry>,
    pub combined: Vec<CombinedStaffingEntry>,
}

/// Dock headcount against the target-PPR reference.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize)]
pub struct ServiceSummary {
    pub recommended_dock_headcount: u32,
    pub actual_dock_headcount: u32,
    pub service_level: f64,
}

/// Everything one planning run derives.
#[derive(Clone, Debug)]
pub struct PlanReport {
    pub history: Vec<MetricsRow>,
    pub avg_labor_share: LaborShare,
    pub forecast: Vec<ForecastPoint>,
    pub plan: Vec<StaffingEntry>,
    pub understaffed: Vec<StaffingEntry>,
    pub cost: CostSimulation,
    pub optimized: Option<OptimizedCostSimulation>,
    pub afe: Option<AfeSection>,
    pub service: Option<ServiceSummary>,
}

/// Run the full pipeline: filter → forecast → staffing → cost.
///
/// Pure over its inputs; every table in the report is freshly derived.
#[instrument(skip_all, fields(n_rows = rows.len()))]
pub fn run_plan(
    config: &PlanConfig,
    rows: &[MetricsRow],
    afe_volumes: &[(NaiveDateTime, u32)],
) -> Result<PlanReport> {
    config.validate()?;

    let mut history = rows.to_vec();
    if let Some(start_date) = config.start_date {
        history = filter_from(&history, start_date);
    }
    if let Some(range) = &config.labor_share_range {
        history = filter_labor_share(&history, range);
    }
    ensure!(!history.is_empty(), "no data for the selected filters");
    info!(n_rows = history.len(), "filtered the historical window");

    let forecast = forecast_truck_arrivals(&history, config.future_hours)?;
    let avg_labor_share = config.labor_share_source.resolve(&history)?;
    let plan = recommend_staffing(&forecast, avg_labor_share, config.shift_length);
    let understaffed = understaffed_hours(&plan);
    let cost = simulate_staffing_cost(&plan, config.hourly_rate);
    let optimized = config
        .optimized_labor_share
        .map(|share| simulate_optimized_cost(&plan, config.hourly_rate, share))
        .transpose()?;

    let afe = config
        .afe_productivity
        .filter(|_| !afe_volumes.is_empty())
        .map(|productivity| {
            let entries = recommend_afe_staffing(afe_volumes, productivity)?;
            let combined = combined_staffing(&plan, &entries);
            Ok::<_, Error>(AfeSection { entries, combined })
        })
        .transpose()?;

    let service = config
        .target_ppr
        .filter(|_| !afe_volumes.is_empty())
        .map(|target_ppr| {
            let total_volume = afe_volumes.iter().map(|(_, volume)| volume).sum();
            let recommended = headcount_for_volume(total_volume, target_ppr)?;
            let actual = plan.iter().map(|entry| entry.recommended_staff).sum();
            Ok::<_, Error>(ServiceSummary {
                recommended_dock_headcount: recommended,
                actual_dock_headcount: actual,
                service_level: service_level(actual, recommended),
            })
        })
        .transpose()?;

    info!(
        total_cost = %cost.total_cost,
        avg_labor_share = %avg_labor_share,
        "planned",
    );
    Ok(PlanReport {
        history,
        avg_labor_share,
        forecast,
        plan,
        understaffed,
        cost,
        optimized,
        afe,
        service,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeDelta;

    use super::*;
    use crate::metrics::MetricsRow;

    fn history() -> Vec<MetricsRow> {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        [100, 110, 120, 130]
            .into_iter()
            .enumerate()
            .map(|(hour, arrivals)| {
                MetricsRow::new(
                    start + TimeDelta::hours(hour as i64),
                    arrivals,
                    LaborShare(0.8),
                )
            })
            .collect()
    }

    fn config() -> PlanConfig {
        PlanConfig::builder()
            .future_hours(2)
            .shift_length(8)
            .hourly_rate(Dollars(25.0))
            .labor_share_source(LaborShareSource::Historical)
            .build()
    }

    #[test]
    fn test_run_plan_end_to_end() -> Result {
        let report = run_plan(&config(), &history(), &[])?;
        assert_abs_diff_eq!(report.avg_labor_share.0, 0.8);
        assert_eq!(report.forecast.len(), 2);
        assert_abs_diff_eq!(report.forecast[0].predicted_truck_arrivals, 140.0);
        // round(140 × 0.8) = 112, round(150 × 0.8) = 120.
        assert_eq!(
            report.plan.iter().map(|entry| entry.recommended_staff).collect::<Vec<_>>(),
            [112, 120],
        );
        assert_abs_diff_eq!(report.cost.total_cost.0, f64::from((112 + 120) * 25));
        assert!(report.optimized.is_none());
        assert!(report.understaffed.iter().all(|entry| {
            f64::from(entry.recommended_staff) < entry.predicted_truck_arrivals
        }));
        Ok(())
    }

    #[test]
    fn test_run_plan_halts_on_empty_filter_window() {
        let config = PlanConfig::builder()
            .future_hours(2)
            .shift_length(8)
            .hourly_rate(Dollars(25.0))
            .labor_share_source(LaborShareSource::Historical)
            .start_date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
            .build();
        let error = run_plan(&config, &history(), &[]).unwrap_err().to_string();
        assert!(error.contains("no data for the selected filters"), "unexpected: {error}");
    }

    #[test]
    fn test_run_plan_with_optimization_and_afe() -> Result {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let config = PlanConfig::builder()
            .future_hours(2)
            .shift_length(8)
            .hourly_rate(Dollars(25.0))
            .labor_share_source(LaborShareSource::Manual(LaborShare(0.5)))
            .optimized_labor_share(OptimizationPreset::AggressiveSavings.labor_share())
            .target_ppr(150)
            .afe_productivity(100)
            .build();
        let volumes = vec![(start + TimeDelta::hours(1), 950), (start + TimeDelta::hours(2), 420)];
        let report = run_plan(&config, &history(), &volumes)?;

        let optimized = report.optimized.expect("optimized variant requested");
        assert_eq!(optimized.entries.len(), report.plan.len());

        let afe = report.afe.expect("AFE section requested");
        assert_eq!(afe.entries.len(), 2);
        assert_eq!(afe.entries[0].recommended_staffers, 10);
        assert_eq!(afe.combined.len(), report.plan.len());

        let service = report.service.expect("target PPR requested");
        assert_eq!(service.recommended_dock_headcount, 1370_u32.div_ceil(150));
        assert!(service.service_level <= 1.0);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_out_of_domain_values() {
        let cases: Vec<PlanConfig> = vec![
            PlanConfig { future_hours: 0, ..config() },
            PlanConfig { future_hours: 13, ..config() },
            PlanConfig { shift_length: 3, ..config() },
            PlanConfig { hourly_rate: Dollars(10.0), ..config() },
            PlanConfig { optimized_labor_share: Some(LaborShare(0.0)), ..config() },
            PlanConfig {
                labor_share_range: Some(LaborShare(0.9)..=LaborShare(0.1)),
                ..config()
            },
            PlanConfig { target_ppr: Some(1000), ..config() },
            PlanConfig { afe_productivity: Some(10), ..config() },
        ];
        for case in cases {
            assert!(case.validate().is_err(), "accepted: {case:?}");
        }
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_labor_share_source_parsing() -> Result {
        assert_eq!("historical".parse::<LaborShareSource>()?, LaborShareSource::Historical);
        assert_eq!(
            "balanced-ops".parse::<LaborShareSource>()?,
            LaborShareSource::Preset(OptimizationPreset::BalancedOps),
        );
        assert_eq!(
            "0.65".parse::<LaborShareSource>()?,
            LaborShareSource::Manual(LaborShare(0.65)),
        );
        assert!("1.5".parse::<LaborShareSource>().is_err());
        Ok(())
    }

    #[test]
    fn test_preset_shares() {
        assert_abs_diff_eq!(OptimizationPreset::AggressiveSavings.labor_share().0, 0.6);
        assert_abs_diff_eq!(OptimizationPreset::BalancedOps.labor_share().0, 0.8);
        assert_abs_diff_eq!(OptimizationPreset::HighCoverage.labor_share().0, 1.0);
    }
}
