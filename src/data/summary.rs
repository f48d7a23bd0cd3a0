use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;
use chrono::NaiveDate;

use crate::{
    data::{date::format_day, record::PointRecord},
    foundation::error::{GeoFadeError, GeoFadeResult},
};

/// First and last day a year has records for.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct YearRange {
    pub earliest: String,
    pub latest: String,
}

/// Per-year date ranges keyed by the year as a string.
pub type YearRanges = BTreeMap<String, YearRange>;

/// Summarize foreground timestamps into one entry per year present.
pub fn year_ranges(points: &[PointRecord]) -> YearRanges {
    let mut bounds: BTreeMap<i32, (NaiveDate, NaiveDate)> = BTreeMap::new();
    for p in points {
        bounds
            .entry(p.year)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(p.timestamp);
                *hi = (*hi).max(p.timestamp);
            })
            .or_insert((p.timestamp, p.timestamp));
    }

    bounds
        .into_iter()
        .map(|(year, (lo, hi))| {
            (
                year.to_string(),
                YearRange {
                    earliest: format_day(lo),
                    latest: format_day(hi),
                },
            )
        })
        .collect()
}

/// Write the summary as pretty JSON (two-space indent).
pub fn write_year_ranges(path: &Path, ranges: &YearRanges) -> GeoFadeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(ranges)
        .map_err(|e| GeoFadeError::serde(format!("encode year ranges: {e}")))?;
    std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), years = ranges.len(), "wrote year ranges");
    Ok(())
}
