use chrono::NaiveDate;

use crate::{
    data::record::BackgroundRecord,
    engine::opacity::background_opacity,
    foundation::core::Point,
    geo::projection::AlbersProjection,
};

/// A projected coverage record and its alpha for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CoverageRecord {
    pub position: Point,
    pub year: i32,
    pub image_month: NaiveDate,
    /// Transient; overwritten on every [`BackgroundTracker::update`].
    pub alpha: f64,
}

/// Month-scheduled background layer. Holds no state between frames beyond the transient alpha.
#[derive(Clone, Debug, Default)]
pub struct BackgroundTracker {
    records: Vec<CoverageRecord>,
    visible: usize,
}

impl BackgroundTracker {
    pub fn new(records: &[BackgroundRecord], projection: &AlbersProjection) -> Self {
        let mut records: Vec<CoverageRecord> = records
            .iter()
            .map(|r| CoverageRecord {
                position: projection.project(r.position),
                year: r.year,
                image_month: r.image_date,
                alpha: 0.0,
            })
            .collect();
        records.sort_by_key(|r| r.image_month);
        Self {
            records,
            visible: 0,
        }
    }

    /// True when no background data was supplied; the layer then stays empty on every frame.
    pub fn is_disabled(&self) -> bool {
        self.records.is_empty()
    }

    /// Select records whose month has arrived by `now` and recompute their alpha.
    pub fn update(&mut self, now: NaiveDate) -> &[CoverageRecord] {
        // image_month is the 1st, so "month <= current month" is "image_month <= now".
        self.visible = self.records.partition_point(|r| r.image_month <= now);
        for r in &mut self.records[..self.visible] {
            r.alpha = background_opacity(r.image_month, now).unwrap_or(0.0);
        }
        for r in &mut self.records[self.visible..] {
            r.alpha = 0.0;
        }
        self.visible()
    }

    pub fn visible(&self) -> &[CoverageRecord] {
        &self.records[..self.visible]
    }
}
