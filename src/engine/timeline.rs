use chrono::{NaiveDate, TimeDelta};

use crate::{
    data::record::Dated,
    foundation::{
        core::FrameIndex,
        error::{GeoFadeError, GeoFadeResult},
    },
};

/// One animation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Frame {
    pub index: FrameIndex,
    pub date: NaiveDate,
}

/// Consecutive daily frame dates, `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    start: NaiveDate,
    len: usize,
}

impl Timeline {
    /// Inclusive range; `start == end` yields a single frame.
    pub fn new(start: NaiveDate, end: NaiveDate) -> GeoFadeResult<Self> {
        if end < start {
            return Err(GeoFadeError::validation(format!(
                "timeline end {end} is before start {start}"
            )));
        }
        let len = usize::try_from((end - start).num_days() + 1)
            .map_err(|_| GeoFadeError::validation("timeline is too long"))?;
        Ok(Self { start, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true for a timeline built by [`Timeline::new`].
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + TimeDelta::days(self.len as i64 - 1)
    }

    pub fn get(&self, index: FrameIndex) -> Option<Frame> {
        (index.0 < self.len).then(|| Frame {
            index,
            date: self.start + TimeDelta::days(index.0 as i64),
        })
    }

    pub fn first(&self) -> Frame {
        Frame {
            index: FrameIndex(0),
            date: self.start,
        }
    }

    pub fn terminal(&self) -> Frame {
        Frame {
            index: FrameIndex(self.len - 1),
            date: self.end(),
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (0..self.len).filter_map(|i| self.get(FrameIndex(i)))
    }
}

/// Collects date ranges from any number of record sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimelineBuilder {
    bounds: Option<(NaiveDate, NaiveDate)>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set<T: Dated>(mut self, records: &[T]) -> Self {
        for r in records {
            let d = r.date();
            self.bounds = Some(match self.bounds {
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
                None => (d, d),
            });
        }
        self
    }

    #[tracing::instrument(skip(self))]
    pub fn build(self) -> GeoFadeResult<Timeline> {
        let (lo, hi) = self
            .bounds
            .ok_or_else(|| GeoFadeError::empty_dataset("no records to build a timeline from"))?;
        let timeline = Timeline::new(lo, hi)?;
        tracing::debug!(start = %lo, end = %hi, frames = timeline.len(), "timeline built");
        Ok(timeline)
    }
}
