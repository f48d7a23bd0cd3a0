use std::{
    collections::BTreeSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde_json::{Map, Value};

use crate::{
    data::{
        date::{parse_date_str, parse_date_value},
        record::{BackgroundRecord, PointRecord},
    },
    foundation::{
        core::LatLng,
        error::{GeoFadeError, GeoFadeResult},
    },
};

/// Columns every foreground record must provide.
pub const REQUIRED_POINT_COLUMNS: [&str; 3] = ["timestamp", "lat", "lng"];

type JsonObject = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// `.json` (any case) is JSON; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Everything the frame loop needs, loaded once up front.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub points: Vec<PointRecord>,
    pub background: Vec<BackgroundRecord>,
}

impl Dataset {
    /// Load the foreground file and every background file.
    ///
    /// Any failure aborts the whole load; there is no partial dataset.
    #[tracing::instrument(skip_all, fields(input = %input.display(), backgrounds = backgrounds.len()))]
    pub fn load(input: &Path, backgrounds: &[PathBuf]) -> GeoFadeResult<Self> {
        let points = load_points(input)?;
        let mut background = Vec::new();
        for path in backgrounds {
            background.extend(load_background(path)?);
        }
        tracing::info!(
            points = points.len(),
            background = background.len(),
            "dataset loaded"
        );
        Ok(Self { points, background })
    }
}

/// Extract the record list from a parsed JSON document.
///
/// Accepted layouts: a top-level array, or an object holding the array under
/// `customCoordinates` (checked first) or `coordinates`.
pub fn document_records(path: &Path, doc: Value) -> GeoFadeResult<Vec<JsonObject>> {
    let list = match doc {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            let key = ["customCoordinates", "coordinates"]
                .into_iter()
                .find(|k| obj.contains_key(*k))
                .ok_or_else(|| GeoFadeError::UnrecognizedDocumentShape {
                    path: path.to_path_buf(),
                    detail: "object has neither 'customCoordinates' nor 'coordinates'".to_string(),
                })?;
            match obj.remove(key) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(GeoFadeError::UnrecognizedDocumentShape {
                        path: path.to_path_buf(),
                        detail: format!("'{key}' is not an array"),
                    });
                }
            }
        }
        other => {
            return Err(GeoFadeError::UnrecognizedDocumentShape {
                path: path.to_path_buf(),
                detail: format!("top-level {} is neither an array nor an object", kind(&other)),
            });
        }
    };

    list.into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(obj) => Ok(obj),
            other => Err(GeoFadeError::UnrecognizedDocumentShape {
                path: path.to_path_buf(),
                detail: format!("record {i} is a {}, expected an object", kind(&other)),
            }),
        })
        .collect()
}

pub fn read_json(path: &Path) -> GeoFadeResult<Value> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    let doc = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| GeoFadeError::serde(format!("parse JSON '{}': {e}", path.display())))?;
    Ok(doc)
}

/// Load foreground points from CSV or JSON, in file order.
pub fn load_points(path: &Path) -> GeoFadeResult<Vec<PointRecord>> {
    let points = match SourceFormat::from_path(path) {
        SourceFormat::Json => {
            let records = document_records(path, read_json(path)?)?;
            points_from_objects(path, &records)?
        }
        SourceFormat::Csv => load_points_csv(path)?,
    };
    tracing::debug!(path = %path.display(), count = points.len(), "loaded points");
    Ok(points)
}

/// Union of keys across all records.
fn columns_of(records: &[JsonObject]) -> BTreeSet<&str> {
    records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect()
}

pub fn points_from_objects(path: &Path, records: &[JsonObject]) -> GeoFadeResult<Vec<PointRecord>> {
    if !records.is_empty() {
        let columns = columns_of(records);
        check_columns(path, &REQUIRED_POINT_COLUMNS, |c| columns.contains(c))?;
    }

    records
        .iter()
        .enumerate()
        .map(|(row, obj)| {
            let raw = obj.get("timestamp").unwrap_or(&Value::Null);
            let timestamp = parse_date_value(raw).ok_or_else(|| GeoFadeError::InvalidDate {
                path: path.to_path_buf(),
                row,
                field: "timestamp".to_string(),
                value: value_text(raw),
            })?;
            Ok(PointRecord::new(json_position(path, row, obj)?, timestamp))
        })
        .collect()
}

fn load_points_csv(path: &Path) -> GeoFadeResult<Vec<PointRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open CSV '{}'", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("read CSV header of '{}'", path.display()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    check_columns(path, &REQUIRED_POINT_COLUMNS, |c| column(c).is_some())?;
    let (Some(ts_col), Some(lat_col), Some(lng_col)) =
        (column("timestamp"), column("lat"), column("lng"))
    else {
        return Err(GeoFadeError::evaluation("CSV column lookup failed after check"));
    };

    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("read CSV row {row} of '{}'", path.display()))?;
        let field = |i: usize| rec.get(i).unwrap_or("");

        let raw_ts = field(ts_col);
        let timestamp = parse_date_str(raw_ts).ok_or_else(|| GeoFadeError::InvalidDate {
            path: path.to_path_buf(),
            row,
            field: "timestamp".to_string(),
            value: raw_ts.to_string(),
        })?;
        let lat = parse_coord(path, row, "lat", field(lat_col))?;
        let lng = parse_coord(path, row, "lng", field(lng_col))?;
        out.push(PointRecord::new(LatLng::new(lat, lng)?, timestamp));
    }
    Ok(out)
}

/// Load one background coverage file (JSON only).
pub fn load_background(path: &Path) -> GeoFadeResult<Vec<BackgroundRecord>> {
    let records = document_records(path, read_json(path)?)?;
    let out = background_from_objects(path, &records)?;
    tracing::debug!(path = %path.display(), count = out.len(), "loaded background");
    Ok(out)
}

pub fn background_from_objects(
    path: &Path,
    records: &[JsonObject],
) -> GeoFadeResult<Vec<BackgroundRecord>> {
    if !records.is_empty() {
        let columns = columns_of(records);
        check_columns(path, &["lat", "lng"], |c| columns.contains(c))?;
        if !columns.contains("imageDate") && !columns.contains("extra") {
            return Err(GeoFadeError::MissingRequiredColumns {
                path: path.to_path_buf(),
                missing: vec!["imageDate (or extra.panoDate)".to_string()],
            });
        }
    }

    records
        .iter()
        .enumerate()
        .map(|(row, obj)| {
            let (field, raw) = background_date_field(obj);
            let image_date = parse_date_value(raw).ok_or_else(|| GeoFadeError::InvalidDate {
                path: path.to_path_buf(),
                row,
                field: field.to_string(),
                value: value_text(raw),
            })?;
            Ok(BackgroundRecord::new(
                json_position(path, row, obj)?,
                image_date,
            ))
        })
        .collect()
}

/// `imageDate` wins; otherwise the nested `extra.panoDate`.
pub fn background_date_field(obj: &JsonObject) -> (&'static str, &Value) {
    match obj.get("imageDate") {
        Some(v) if !v.is_null() => ("imageDate", v),
        _ => (
            "extra.panoDate",
            obj.get("extra")
                .and_then(|e| e.get("panoDate"))
                .unwrap_or(&Value::Null),
        ),
    }
}

fn check_columns(
    path: &Path,
    required: &[&str],
    present: impl Fn(&str) -> bool,
) -> GeoFadeResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !present(**c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GeoFadeError::MissingRequiredColumns {
            path: path.to_path_buf(),
            missing,
        })
    }
}

fn json_position(path: &Path, row: usize, obj: &JsonObject) -> GeoFadeResult<LatLng> {
    let coord = |name: &str| -> GeoFadeResult<f64> {
        match obj.get(name) {
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| bad_coord(path, row, name, n)),
            Some(Value::String(s)) => parse_coord(path, row, name, s),
            other => Err(bad_coord(
                path,
                row,
                name,
                other.map(value_text).unwrap_or_else(|| "missing".to_string()),
            )),
        }
    };
    LatLng::new(coord("lat")?, coord("lng")?)
}

fn parse_coord(path: &Path, row: usize, name: &str, raw: &str) -> GeoFadeResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| bad_coord(path, row, name, raw))
}

fn bad_coord(path: &Path, row: usize, name: &str, raw: impl std::fmt::Display) -> GeoFadeError {
    GeoFadeError::validation(format!(
        "'{}' row {row}: field '{name}' is not a number ({raw})",
        path.display()
    ))
}

pub(crate) fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
