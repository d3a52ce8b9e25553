use std::{ops::RangeInclusive, path::PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    pipeline::{LaborShareSource, OptimizationPreset, PlanConfig},
    prelude::*,
    quantity::{Dollars, LaborShare},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Forecast arrivals, recommend staffing, and simulate labor cost.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),

    /// Load and display the historical dock metrics.
    #[clap(name = "inspect")]
    Inspect(Box<InspectArgs>),
}

#[derive(Parser)]
pub struct MetricsArgs {
    /// Path to the delimited dock metrics table.
    #[clap(long = "metrics", env = "DOCK_METRICS_PATH", default_value = "data/dock_metrics.csv")]
    pub path: PathBuf,

    /// Keep only rows on or after this date.
    #[clap(long, env = "START_DATE")]
    pub start_date: Option<NaiveDate>,

    /// Lower bound of the labor share filter.
    #[clap(long, env = "MIN_LABOR_SHARE")]
    pub min_labor_share: Option<LaborShare>,

    /// Upper bound of the labor share filter.
    #[clap(long, env = "MAX_LABOR_SHARE")]
    pub max_labor_share: Option<LaborShare>,
}

impl MetricsArgs {
    pub fn labor_share_range(&self) -> Option<RangeInclusive<LaborShare>> {
        if self.min_labor_share.is_none() && self.max_labor_share.is_none() {
            return None;
        }
        Some(
            self.min_labor_share.unwrap_or(LaborShare::ZERO)
                ..=self.max_labor_share.unwrap_or(LaborShare::FULL),
        )
    }
}

#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub metrics: MetricsArgs,

    /// Number of future hourly slots to forecast.
    #[clap(
        long,
        env = "FUTURE_HOURS",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..=12),
    )]
    pub future_hours: u32,

    /// Shift length in hours.
    #[clap(
        long,
        env = "SHIFT_LENGTH",
        default_value = "8",
        value_parser = clap::value_parser!(u32).range(4..=12),
    )]
    pub shift_length: u32,

    /// Cost per staffer per hour in dollars.
    #[clap(long, env = "HOURLY_RATE", default_value = "25.0")]
    pub hourly_rate: Dollars,

    /// Staffing labor share: `historical`, a fraction, or a preset name.
    #[clap(long, env = "LABOR_SHARE", default_value = "historical")]
    pub labor_share: LaborShareSource,

    /// Labor share of the optimized cost variant: a fraction or a preset name.
    #[clap(
        long,
        env = "OPTIMIZED_LABOR_SHARE",
        value_parser = parse_share_or_preset,
    )]
    pub optimized_labor_share: Option<LaborShare>,

    #[clap(flatten)]
    pub afe: AfeArgs,

    /// Write the artifact tables into this directory.
    #[clap(long, env = "EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

impl PlanArgs {
    pub fn to_config(&self) -> PlanConfig {
        PlanConfig::builder()
            .future_hours(self.future_hours)
            .shift_length(self.shift_length)
            .hourly_rate(self.hourly_rate)
            .labor_share_source(self.labor_share)
            .maybe_optimized_labor_share(self.optimized_labor_share)
            .maybe_start_date(self.metrics.start_date)
            .maybe_labor_share_range(self.metrics.labor_share_range())
            .maybe_target_ppr(self.afe.target_ppr)
            .maybe_afe_productivity(self.afe.productivity)
            .build()
    }
}

#[derive(Parser)]
pub struct AfeArgs {
    /// Path to the hourly AFE volume table.
    #[clap(long = "afe-volumes", env = "AFE_VOLUMES_PATH")]
    pub volumes_path: Option<PathBuf>,

    /// AFE units handled per staffer per hour.
    #[clap(
        long = "afe-productivity",
        env = "AFE_PRODUCTIVITY",
        value_parser = clap::value_parser!(u32).range(50..=400),
    )]
    pub productivity: Option<u32>,

    /// Target packages per dock staffer.
    #[clap(
        long = "target-ppr",
        env = "TARGET_PPR",
        value_parser = clap::value_parser!(u32).range(50..=500),
    )]
    pub target_ppr: Option<u32>,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[clap(flatten)]
    pub metrics: MetricsArgs,
}

/// Accept either a bare fraction or an optimization preset name.
fn parse_share_or_preset(value: &str) -> Result<LaborShare> {
    if let Ok(preset) = OptimizationPreset::from_str(value, true) {
        return Ok(preset.labor_share());
    }
    value.parse()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_parse_share_or_preset() -> Result {
        assert_abs_diff_eq!(parse_share_or_preset("aggressive-savings")?.0, 0.6);
        assert_abs_diff_eq!(parse_share_or_preset("0.75")?.0, 0.75);
        assert!(parse_share_or_preset("2.0").is_err());
        Ok(())
    }

    #[test]
    fn test_plan_args_to_config() {
        let args = Args::parse_from([
            "dockhand",
            "plan",
            "--metrics",
            "metrics.csv",
            "--future-hours",
            "6",
            "--labor-share",
            "0.7",
            "--optimized-labor-share",
            "balanced-ops",
        ]);
        let Command::Plan(plan_args) = args.command else {
            panic!("expected the plan subcommand");
        };
        let config = plan_args.to_config();
        assert_eq!(config.future_hours, 6);
        assert_eq!(config.shift_length, 8);
        assert_eq!(config.labor_share_source, LaborShareSource::Manual(LaborShare(0.7)));
        assert_eq!(config.optimized_labor_share, Some(LaborShare(0.8)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_labor_share_range_defaults_the_open_bound() {
        let args = Args::parse_from(["dockhand", "inspect", "--min-labor-share", "0.5"]);
        let Command::Inspect(inspect_args) = args.command else {
            panic!("expected the inspect subcommand");
        };
        let range = inspect_args.metrics.labor_share_range().unwrap();
        assert_abs_diff_eq!(range.start().0, 0.5);
        assert_abs_diff_eq!(range.end().0, 1.0);
    }
}
