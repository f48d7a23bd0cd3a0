use std::path::Path;

use serde_json::Value;

use crate::{
    data::load::read_json,
    foundation::{
        core::{LatLng, Point, Rect},
        error::{GeoFadeError, GeoFadeResult},
    },
    geo::projection::AlbersProjection,
};

/// Projected basemap outlines. Opaque to the animation engine: only drawn and used for bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionGeometry {
    pub lines: Vec<Vec<Point>>,
}

impl RegionGeometry {
    /// Load a GeoJSON Feature, FeatureCollection or bare geometry.
    pub fn load(path: &Path, projection: &AlbersProjection) -> GeoFadeResult<Self> {
        let doc = read_json(path)?;
        let region = Self::from_geojson(&doc, projection).map_err(|e| match e {
            GeoFadeError::Validation(msg) => GeoFadeError::UnrecognizedDocumentShape {
                path: path.to_path_buf(),
                detail: msg,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), lines = region.lines.len(), "loaded region");
        Ok(region)
    }

    pub fn from_geojson(doc: &Value, projection: &AlbersProjection) -> GeoFadeResult<Self> {
        let mut out = Self::default();
        collect(doc, projection, &mut out.lines)?;
        Ok(out)
    }

    pub fn bounds(&self) -> Option<Rect> {
        bounds_of(self.lines.iter().flatten().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Axis-aligned bounds of a point cloud, `None` when empty.
pub fn bounds_of(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    points.into_iter().fold(None, |acc: Option<Rect>, p| {
        Some(match acc {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        })
    })
}

fn collect(v: &Value, proj: &AlbersProjection, out: &mut Vec<Vec<Point>>) -> GeoFadeResult<()> {
    let kind = v
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoFadeError::validation("GeoJSON object has no 'type'"))?;

    match kind {
        "FeatureCollection" => {
            let features = v
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| GeoFadeError::validation("FeatureCollection without 'features'"))?;
            for f in features {
                collect(f, proj, out)?;
            }
        }
        "Feature" => match v.get("geometry") {
            Some(Value::Null) | None => {}
            Some(g) => collect(g, proj, out)?,
        },
        "GeometryCollection" => {
            let geoms = v
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| GeoFadeError::validation("GeometryCollection without 'geometries'"))?;
            for g in geoms {
                collect(g, proj, out)?;
            }
        }
        "LineString" => out.push(line(coords(v)?, proj)?),
        "Polygon" | "MultiLineString" => {
            for ring in as_array(coords(v)?)? {
                out.push(line(ring, proj)?);
            }
        }
        "MultiPolygon" => {
            for poly in as_array(coords(v)?)? {
                for ring in as_array(poly)? {
                    out.push(line(ring, proj)?);
                }
            }
        }
        "Point" | "MultiPoint" => {}
        other => {
            return Err(GeoFadeError::validation(format!(
                "unsupported GeoJSON type '{other}'"
            )));
        }
    }
    Ok(())
}

fn coords(v: &Value) -> GeoFadeResult<&Value> {
    v.get("coordinates")
        .ok_or_else(|| GeoFadeError::validation("geometry without 'coordinates'"))
}

fn as_array(v: &Value) -> GeoFadeResult<&Vec<Value>> {
    v.as_array()
        .ok_or_else(|| GeoFadeError::validation("expected a coordinate array"))
}

fn line(v: &Value, proj: &AlbersProjection) -> GeoFadeResult<Vec<Point>> {
    as_array(v)?
        .iter()
        .map(|pos| {
            let pair = as_array(pos)?;
            let (Some(lng), Some(lat)) = (
                pair.first().and_then(Value::as_f64),
                pair.get(1).and_then(Value::as_f64),
            ) else {
                return Err(GeoFadeError::validation("position must be [lng, lat, ...]"));
            };
            Ok(proj.project(LatLng::new(lat, lng)?))
        })
        .collect()
}
