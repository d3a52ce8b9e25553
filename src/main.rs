#![doc = include_str!("../README.md")]

mod afe;
mod cli;
mod cost;
mod export;
mod forecast;
mod metrics;
mod pipeline;
mod prelude;
mod quantity;
mod staffing;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, InspectArgs, PlanArgs},
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Plan(args) => plan(&args),
        Command::Inspect(args) => inspect(&args),
    }
}

fn plan(args: &PlanArgs) -> Result {
    let rows = metrics::load_dock_metrics(&args.metrics.path);
    ensure!(!rows.is_empty(), "no dock metrics available, adjust `--metrics`");
    let afe_volumes = match &args.afe.volumes_path {
        Some(path) => afe::load_afe_volumes(path),
        None => Vec::new(),
    };

    let report = pipeline::run_plan(&args.to_config(), &rows, &afe_volumes)?;

    println!("{}", tables::build_metrics_table(&report.history));
    println!("{}", tables::build_forecast_table(&report.forecast));
    println!("{}", tables::build_staffing_table(&report.plan));
    println!("{}", tables::build_cost_table(&report.cost));
    if let Some(optimized) = &report.optimized {
        println!("{}", tables::build_optimized_cost_table(optimized));
    }
    if let Some(afe_section) = &report.afe {
        println!("{}", tables::build_afe_table(&afe_section.entries));
        println!("{}", tables::build_combined_table(&afe_section.combined));
    }
    if report.understaffed.is_empty() {
        info!("all forecasted hours are adequately staffed");
    } else {
        warn!(n_hours = report.understaffed.len(), "understaffed hours in the forecast window");
        println!("{}", tables::build_understaffed_table(&report.understaffed));
    }
    println!("{}", tables::build_summary_table(&report));

    if let Some(directory) = &args.export_dir {
        export::write_artifacts(&report, directory)?;
    }

    info!("done!");
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result {
    let rows = metrics::load_dock_metrics(&args.metrics.path);
    ensure!(!rows.is_empty(), "no dock metrics available, adjust `--metrics`");

    let mut filtered = rows;
    if let Some(start_date) = args.metrics.start_date {
        filtered = metrics::filter_from(&filtered, start_date);
    }
    if let Some(range) = args.metrics.labor_share_range() {
        filtered = metrics::filter_labor_share(&filtered, &range);
    }
    ensure!(!filtered.is_empty(), "no data for the selected filters");

    if let Some(mean) = metrics::mean_labor_share(&filtered) {
        info!(n_rows = filtered.len(), mean_labor_share = %mean, "filtered window");
    }
    println!("{}", tables::build_metrics_table(&filtered));
    Ok(())
}
