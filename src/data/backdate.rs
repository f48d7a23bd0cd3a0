//! Keep only the oldest coverage record per rounded coordinate.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
    data::{
        date::parse_date_value,
        load::{document_records, read_json, value_text},
    },
    foundation::error::{GeoFadeError, GeoFadeResult},
};

pub const DEFAULT_PRECISION: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackdateReport {
    pub input: usize,
    pub kept: usize,
}

/// `<dir>/<stem>_backdated.<ext>`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_backdated.{}", ext.to_string_lossy()),
        None => format!("{stem}_backdated"),
    };
    input.with_file_name(name)
}

/// Group records by coordinates rounded to `precision` decimals and keep the earliest-dated
/// record of each group. Ties keep the first record loaded; groups keep first-seen order.
pub fn backdate_records(
    path: &Path,
    records: Vec<Map<String, Value>>,
    precision: u32,
) -> GeoFadeResult<Vec<Map<String, Value>>> {
    let scale = 10f64.powi(precision.min(12) as i32);
    let mut slot_of: HashMap<(i64, i64), usize> = HashMap::new();
    let mut kept: Vec<(NaiveDate, Map<String, Value>)> = Vec::new();

    for (row, obj) in records.into_iter().enumerate() {
        let key = (
            round_key(path, row, &obj, "lat", scale)?,
            round_key(path, row, &obj, "lng", scale)?,
        );
        let date = record_date(path, row, &obj)?;

        match slot_of.get(&key) {
            Some(&i) => {
                if date < kept[i].0 {
                    kept[i] = (date, obj);
                }
            }
            None => {
                slot_of.insert(key, kept.len());
                kept.push((date, obj));
            }
        }
    }

    Ok(kept.into_iter().map(|(_, obj)| obj).collect())
}

/// Read `input`, backdate it, and write `{"customCoordinates": [...]}` to `output`.
#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn backdate_file(input: &Path, output: &Path, precision: u32) -> GeoFadeResult<BackdateReport> {
    let records = document_records(input, read_json(input)?)?;
    let input_count = records.len();
    let kept = backdate_records(input, records, precision)?;
    let report = BackdateReport {
        input: input_count,
        kept: kept.len(),
    };

    let mut doc = Map::new();
    doc.insert(
        "customCoordinates".to_string(),
        Value::Array(kept.into_iter().map(Value::Object).collect()),
    );
    let json = serde_json::to_string_pretty(&Value::Object(doc))
        .map_err(|e| GeoFadeError::serde(format!("encode backdated records: {e}")))?;
    std::fs::write(output, json).with_context(|| format!("write '{}'", output.display()))?;

    tracing::info!(input = report.input, kept = report.kept, "backdated");
    Ok(report)
}

/// `extra.panoDate` when an `extra` object is present, otherwise `imageDate`.
fn record_date(path: &Path, row: usize, obj: &Map<String, Value>) -> GeoFadeResult<NaiveDate> {
    let (field, raw) = match obj.get("extra") {
        Some(extra) => ("extra.panoDate", extra.get("panoDate")),
        None => ("imageDate", obj.get("imageDate")),
    };
    let raw = raw.unwrap_or(&Value::Null);
    parse_date_value(raw).ok_or_else(|| GeoFadeError::InvalidDate {
        path: path.to_path_buf(),
        row,
        field: field.to_string(),
        value: value_text(raw),
    })
}

fn round_key(
    path: &Path,
    row: usize,
    obj: &Map<String, Value>,
    name: &str,
    scale: f64,
) -> GeoFadeResult<i64> {
    let v = obj.get(name).and_then(Value::as_f64).ok_or_else(|| {
        GeoFadeError::validation(format!(
            "'{}' row {row}: field '{name}' is missing or not a number",
            path.display()
        ))
    })?;
    Ok((v * scale).round() as i64)
}
