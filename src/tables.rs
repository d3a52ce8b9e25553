use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    afe::{AfeEntry, CombinedStaffingEntry},
    cost::{CostSimulation, OptimizedCostSimulation},
    forecast::ForecastPoint,
    metrics::MetricsRow,
    pipeline::PlanReport,
    quantity::Dollars,
    staffing::StaffingEntry,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(header);
    table
}

pub fn build_metrics_table(rows: &[MetricsRow]) -> Table {
    let mut table = new_table(vec!["Time", "Truck arrivals", "Labor share"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.timestamp.format(TIME_FORMAT)),
            Cell::new(row.truck_arrivals).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}%", row.labor_share.0 * 100.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_forecast_table(forecast: &[ForecastPoint]) -> Table {
    let mut table = new_table(vec!["Time", "Predicted arrivals"]);
    for point in forecast {
        table.add_row(vec![
            Cell::new(point.timestamp.format(TIME_FORMAT)),
            Cell::new(format!("{:.1}", point.predicted_truck_arrivals))
                .set_alignment(CellAlignment::Right)
                .fg(if point.predicted_truck_arrivals < 0.0 {
                    Color::Red
                } else {
                    Color::Reset
                }),
        ]);
    }
    table
}

pub fn build_staffing_table(plan: &[StaffingEntry]) -> Table {
    let mut table = new_table(vec!["Time", "Predicted arrivals", "Staff", "Shift"]);
    for entry in plan {
        let understaffed = f64::from(entry.recommended_staff) < entry.predicted_truck_arrivals;
        table.add_row(vec![
            Cell::new(entry.timestamp.format(TIME_FORMAT)),
            Cell::new(format!("{:.1}", entry.predicted_truck_arrivals))
                .set_alignment(CellAlignment::Right),
            Cell::new(entry.recommended_staff).set_alignment(CellAlignment::Right).fg(
                if understaffed { Color::Red } else { Color::Green },
            ),
            Cell::new(format!("{} h", entry.shift_length)).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_understaffed_table(understaffed: &[StaffingEntry]) -> Table {
    let mut table = new_table(vec!["Time", "Predicted arrivals", "Staff"]);
    for entry in understaffed {
        table.add_row(vec![
            Cell::new(entry.timestamp.format(TIME_FORMAT)),
            Cell::new(format!("{:.1}", entry.predicted_truck_arrivals))
                .set_alignment(CellAlignment::Right),
            Cell::new(entry.recommended_staff)
                .set_alignment(CellAlignment::Right)
                .fg(Color::Red),
        ]);
    }
    table
}

pub fn build_cost_table(simulation: &CostSimulation) -> Table {
    let mut table = new_table(vec!["Time", "Staff", "Hourly cost"]);
    for entry in &simulation.entries {
        table.add_row(vec![
            Cell::new(entry.timestamp.format(TIME_FORMAT)),
            Cell::new(entry.recommended_staff).set_alignment(CellAlignment::Right),
            Cell::new(entry.hourly_cost).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(simulation.total_cost)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn build_optimized_cost_table(simulation: &OptimizedCostSimulation) -> Table {
    let mut table =
        new_table(vec!["Time", "Staff", "Optimized staff", "Optimized cost", "Savings"]);
    for entry in &simulation.entries {
        table.add_row(vec![
            Cell::new(entry.timestamp.format(TIME_FORMAT)),
            Cell::new(entry.recommended_staff).set_alignment(CellAlignment::Right),
            Cell::new(entry.optimized_staff).set_alignment(CellAlignment::Right),
            Cell::new(entry.optimized_cost).set_alignment(CellAlignment::Right),
            Cell::new(entry.savings).set_alignment(CellAlignment::Right).fg(
                if entry.savings >= Dollars::ZERO { Color::Green } else { Color::Red },
            ),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(simulation.total_savings)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn build_afe_table(entries: &[AfeEntry]) -> Table {
    let mut table = new_table(vec!["Time", "AFE volume", "Staffers"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.timestamp.format(TIME_FORMAT)),
            Cell::new(entry.volume).set_alignment(CellAlignment::Right),
            Cell::new(entry.recommended_staffers).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_combined_table(combined: &[CombinedStaffingEntry]) -> Table {
    let mut table = new_table(vec!["Time", "Dock", "AFE", "Total"]);
    for entry in combined {
        table.add_row(vec![
            Cell::new(entry.timestamp.format(TIME_FORMAT)),
            Cell::new(entry.dock_staff).set_alignment(CellAlignment::Right),
            match entry.afe_staffers {
                Some(staffers) => Cell::new(staffers).set_alignment(CellAlignment::Right),
                None => Cell::new("–").add_attribute(Attribute::Dim),
            },
            Cell::new(entry.total_staff)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
        ]);
    }
    table
}

pub fn build_summary_table(report: &PlanReport) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Average labor share"),
        Cell::new(format!("{:.0}%", report.avg_labor_share.0 * 100.0))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Total staffing cost"),
        Cell::new(report.cost.total_cost).set_alignment(CellAlignment::Right),
    ]);
    if let Some(optimized) = &report.optimized {
        table.add_row(vec![
            Cell::new("Total savings"),
            Cell::new(optimized.total_savings).set_alignment(CellAlignment::Right).fg(
                if optimized.total_savings >= Dollars::ZERO { Color::Green } else { Color::Red },
            ),
        ]);
    }
    if let Some(service) = &report.service {
        table.add_row(vec![
            Cell::new("Recommended dock headcount"),
            Cell::new(format!("{} staffers", service.recommended_dock_headcount))
                .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new("Actual dock headcount"),
            Cell::new(format!("{} staffers", service.actual_dock_headcount))
                .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new("Estimated service level"),
            Cell::new(format!("{:.2}%", service.service_level * 100.0))
                .set_alignment(CellAlignment::Right)
                .fg(if service.service_level >= 0.9 {
                    Color::Green
                } else if service.service_level >= 0.75 {
                    Color::DarkYellow
                } else {
                    Color::Red
                }),
        ]);
    }
    table.add_row(vec![
        Cell::new("Understaffed hours"),
        Cell::new(report.understaffed.len()).set_alignment(CellAlignment::Right).fg(
            if report.understaffed.is_empty() { Color::Green } else { Color::Red },
        ),
    ]);
    table
}
