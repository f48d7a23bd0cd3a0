use chrono::{Datelike, NaiveDate};

use crate::{data::date::month_start, foundation::core::LatLng};

/// Anything that contributes a calendar date to the timeline.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// A foreground location, immutable once loaded.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PointRecord {
    pub position: LatLng,
    /// Day the record was taken, floored to UTC.
    pub timestamp: NaiveDate,
    pub year: i32,
}

impl PointRecord {
    pub fn new(position: LatLng, timestamp: NaiveDate) -> Self {
        Self {
            position,
            timestamp,
            year: timestamp.year(),
        }
    }
}

impl Dated for PointRecord {
    fn date(&self) -> NaiveDate {
        self.timestamp
    }
}

/// An imagery-coverage record for the background layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BackgroundRecord {
    pub position: LatLng,
    /// Always the first day of the image month.
    pub image_date: NaiveDate,
    pub year: i32,
}

impl BackgroundRecord {
    /// Truncates `image_date` to its month.
    pub fn new(position: LatLng, image_date: NaiveDate) -> Self {
        let image_date = month_start(image_date);
        Self {
            position,
            image_date,
            year: image_date.year(),
        }
    }
}

impl Dated for BackgroundRecord {
    fn date(&self) -> NaiveDate {
        self.image_date
    }
}
