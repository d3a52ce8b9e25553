use average::Mean;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    prelude::*,
    quantity::{Dollars, LaborShare},
    staffing::{StaffingEntry, round_staff},
};

/// One hour's baseline labor cost.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub timestamp: NaiveDateTime,
    pub recommended_staff: u32,
    pub hourly_cost: Dollars,
}

/// Baseline cost of the staffing plan. The grand total lives here, in one
/// canonical place; the CSV export broadcasts it onto every row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostSimulation {
    pub entries: Vec<CostEntry>,
    pub total_cost: Dollars,
}

/// One hour of the optimized variant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizedCostEntry {
    pub timestamp: NaiveDateTime,
    pub recommended_staff: u32,
    pub optimized_staff: u32,
    pub optimized_cost: Dollars,
    pub savings: Dollars,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizedCostSimulation {
    pub entries: Vec<OptimizedCostEntry>,
    pub total_savings: Dollars,
}

/// Price the staffing plan at the given hourly rate.
#[must_use]
pub fn simulate_staffing_cost(plan: &[StaffingEntry], hourly_rate: Dollars) -> CostSimulation {
    let entries: Vec<CostEntry> = plan
        .iter()
        .map(|entry| CostEntry {
            timestamp: entry.timestamp,
            recommended_staff: entry.recommended_staff,
            hourly_cost: hourly_rate * f64::from(entry.recommended_staff),
        })
        .collect();
    let total_cost = entries.iter().map(|entry| entry.hourly_cost).sum();
    CostSimulation { entries, total_cost }
}

/// Price a scaled-down staffing variant and the savings against the baseline.
///
/// The scaling factor `optimized_labor_share / mean(recommended_staff)` is
/// computed once per plan and applied to every hour. Fails on a plan whose
/// mean recommended staff is zero instead of dividing through it.
#[instrument(skip_all, fields(n_hours = plan.len(), optimized_labor_share = %optimized_labor_share))]
pub fn simulate_optimized_cost(
    plan: &[StaffingEntry],
    hourly_rate: Dollars,
    optimized_labor_share: LaborShare,
) -> Result<OptimizedCostSimulation> {
    let mean: Mean = plan.iter().map(|entry| f64::from(entry.recommended_staff)).collect();
    let mean_staff = mean.mean();
    ensure!(
        mean_staff > 0.0,
        "mean recommended staff is zero: no baseline to scale the optimized variant from",
    );
    let scaling_factor = optimized_labor_share.0 / mean_staff;

    let entries: Vec<OptimizedCostEntry> = plan
        .iter()
        .map(|entry| {
            let baseline_cost = hourly_rate * f64::from(entry.recommended_staff);
            let optimized_staff = round_staff(f64::from(entry.recommended_staff) * scaling_factor);
            let optimized_cost = hourly_rate * f64::from(optimized_staff);
            OptimizedCostEntry {
                timestamp: entry.timestamp,
                recommended_staff: entry.recommended_staff,
                optimized_staff,
                optimized_cost,
                savings: baseline_cost - optimized_cost,
            }
        })
        .collect();
    let total_savings = entries.iter().map(|entry| entry.savings).sum();
    Ok(OptimizedCostSimulation { entries, total_savings })
}
