use std::{ops::RangeInclusive, path::Path};

use average::Mean;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{prelude::*, quantity::LaborShare};

/// One historical dock observation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, derive_more::Constructor)]
pub struct MetricsRow {
    pub timestamp: NaiveDateTime,
    pub truck_arrivals: u32,
    pub labor_share: LaborShare,
}

/// Load the historical dock metrics, sorted ascending by timestamp.
///
/// A failed load is reported and yields an empty table: downstream stages see
/// the same "no data" signal for a missing file and an unparseable one.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_dock_metrics(path: &Path) -> Vec<MetricsRow> {
    load_fallibly_from(path).unwrap_or_else(|error| {
        error!("failed to load dock metrics: {error:#}");
        Vec::new()
    })
}

fn load_fallibly_from(path: &Path) -> Result<Vec<MetricsRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let rows = parse_metrics(&contents)?;
    info!(n_rows = rows.len(), "loaded dock metrics");
    Ok(rows)
}

fn parse_metrics(contents: &str) -> Result<Vec<MetricsRow>> {
    let mut lines = data_lines(contents);
    let header = Header::parse(lines.next().context("missing header row")?);
    let timestamp = header.position("timestamp")?;
    let truck_arrivals = header.position("truck_arrivals")?;
    let labor_share = header.position("labor_share")?;

    let rows = lines
        .map(|line| {
            let fields = split_fields(line);
            Ok(MetricsRow {
                timestamp: parse_timestamp(field(&fields, timestamp, line)?)?,
                truck_arrivals: field(&fields, truck_arrivals, line)?.parse()?,
                labor_share: field(&fields, labor_share, line)?.parse()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rows.into_iter().sorted_by_key(|row| row.timestamp).collect_vec())
}

/// Keep rows observed on or after the given date.
#[must_use]
pub fn filter_from(rows: &[MetricsRow], start_date: NaiveDate) -> Vec<MetricsRow> {
    rows.iter().filter(|row| row.timestamp.date() >= start_date).copied().collect()
}

/// Keep rows whose labor share lies within the given range.
#[must_use]
pub fn filter_labor_share(
    rows: &[MetricsRow],
    range: &RangeInclusive<LaborShare>,
) -> Vec<MetricsRow> {
    rows.iter().filter(|row| range.contains(&row.labor_share)).copied().collect()
}

/// Mean labor share over the window, or [`None`] for an empty window.
#[must_use]
pub fn mean_labor_share(rows: &[MetricsRow]) -> Option<LaborShare> {
    if rows.is_empty() {
        return None;
    }
    let mean: Mean = rows.iter().map(|row| row.labor_share.0).collect();
    Some(LaborShare(mean.mean()))
}

/// Non-empty, non-comment lines of a delimited table.
pub(crate) fn data_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents.lines().map(str::trim).filter(|line| !line.is_empty() && !line.starts_with('#'))
}

pub(crate) fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

pub(crate) fn field<'a>(fields: &[&'a str], index: usize, line: &str) -> Result<&'a str> {
    fields.get(index).copied().with_context(|| format!("row `{line}` is missing column {index}"))
}

/// Header row of a delimited table. Columns are located by name, so extra
/// columns and arbitrary column order are accepted.
pub(crate) struct Header(Vec<String>);

impl Header {
    pub fn parse(line: &str) -> Self {
        Self(split_fields(line).into_iter().map(str::to_lowercase).collect())
    }

    pub fn position(&self, name: &str) -> Result<usize> {
        self.0
            .iter()
            .position(|column| column == name)
            .with_context(|| format!("missing `{name}` column"))
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .with_context(|| format!("unparseable timestamp `{value}`"))
}
