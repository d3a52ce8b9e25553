//! AFE staffing: an independently measured hourly volume priced into
//! headcount with the same volume ÷ productivity primitive as the dock.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    metrics::{Header, data_lines, field, parse_timestamp, split_fields},
    prelude::*,
    staffing::{StaffingEntry, headcount_for_volume},
};

/// One hour of AFE volume with its staffing recommendation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, derive_more::Constructor)]
pub struct AfeEntry {
    pub timestamp: NaiveDateTime,
    pub volume: u32,
    pub recommended_staffers: u32,
}

/// Per-hour dock and AFE staffing, matched by timestamp. Hours present only
/// in the dock plan keep the dock count.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedStaffingEntry {
    pub timestamp: NaiveDateTime,
    pub dock_staff: u32,
    pub afe_staffers: Option<u32>,
    pub total_staff: u32,
}

/// Load hourly AFE volumes. Same contract as the dock metrics loader: a
/// failed load is reported and yields an empty table.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_afe_volumes(path: &Path) -> Vec<(NaiveDateTime, u32)> {
    load_fallibly_from(path).unwrap_or_else(|error| {
        error!("failed to load AFE volumes: {error:#}");
        Vec::new()
    })
}

fn load_fallibly_from(path: &Path) -> Result<Vec<(NaiveDateTime, u32)>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let volumes = parse_volumes(&contents)?;
    info!(n_rows = volumes.len(), "loaded AFE volumes");
    Ok(volumes)
}

fn parse_volumes(contents: &str) -> Result<Vec<(NaiveDateTime, u32)>> {
    let mut lines = data_lines(contents);
    let header = Header::parse(lines.next().context("missing header row")?);
    let timestamp = header.position("timestamp")?;
    let volume = header.position("volume")?;
    lines
        .map(|line| {
            let fields = split_fields(line);
            Ok((
                parse_timestamp(field(&fields, timestamp, line)?)?,
                field(&fields, volume, line)?.parse()?,
            ))
        })
        .collect()
}

/// Recommend AFE staffing for every hour of volume.
pub fn recommend_afe_staffing(
    volumes: &[(NaiveDateTime, u32)],
    per_staffer: u32,
) -> Result<Vec<AfeEntry>> {
    volumes
        .iter()
        .map(|(timestamp, volume)| {
            Ok(AfeEntry::new(*timestamp, *volume, headcount_for_volume(*volume, per_staffer)?))
        })
        .collect()
}

/// Merge dock and AFE staffing into per-hour totals.
#[must_use]
pub fn combined_staffing(
    plan: &[StaffingEntry],
    afe: &[AfeEntry],
) -> Vec<CombinedStaffingEntry> {
    plan.iter()
        .map(|entry| {
            let afe_staffers = afe
                .iter()
                .find(|afe_entry| afe_entry.timestamp == entry.timestamp)
                .map(|afe_entry| afe_entry.recommended_staffers);
            CombinedStaffingEntry {
                timestamp: entry.timestamp,
                dock_staff: entry.recommended_staff,
                afe_staffers,
                total_staff: entry.recommended_staff + afe_staffers.unwrap_or_default(),
            }
        })
        .collect()
}
