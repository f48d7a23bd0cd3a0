use chrono::NaiveDate;

use crate::{
    data::record::PointRecord,
    engine::{opacity::AgeDecay, timeline::Frame},
    foundation::{
        core::{FrameIndex, Point},
        error::{GeoFadeError, GeoFadeResult},
    },
    geo::projection::AlbersProjection,
};

/// A revealed foreground point, already projected.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AccumulatedPoint {
    pub position: Point,
    pub year: i32,
    pub first_seen: NaiveDate,
}

/// Append-only foreground state driven frame by frame.
///
/// Records are stably sorted by timestamp once, up front. The accumulated set is always the
/// prefix `source[..consumed]`, so ingestion is a cursor move keyed on the frame date and calling
/// [`advance`](Self::advance) twice for the same frame inserts nothing the second time.
#[derive(Clone, Debug)]
pub struct PointAccumulator {
    source: Vec<AccumulatedPoint>,
    consumed: usize,
    last_frame: Option<FrameIndex>,
    decay: AgeDecay,
    opacities: Vec<f64>,
}

impl PointAccumulator {
    pub fn new(records: &[PointRecord], projection: &AlbersProjection, decay: AgeDecay) -> Self {
        let mut source: Vec<AccumulatedPoint> = records
            .iter()
            .map(|r| AccumulatedPoint {
                position: projection.project(r.position),
                year: r.year,
                first_seen: r.timestamp,
            })
            .collect();
        // Stable: equal timestamps keep load order.
        source.sort_by_key(|p| p.first_seen);

        Self {
            source,
            consumed: 0,
            last_frame: None,
            decay,
            opacities: Vec::new(),
        }
    }

    /// Reveal every record dated on or before `frame.date`, then recompute all opacities.
    ///
    /// Returns how many records were newly revealed. Frames must not move backwards.
    pub fn advance(&mut self, frame: Frame) -> GeoFadeResult<usize> {
        if let Some(last) = self.last_frame
            && frame.index < last
        {
            return Err(GeoFadeError::evaluation(format!(
                "accumulator cannot move back from frame {} to {}",
                last.0, frame.index.0
            )));
        }

        let added = self.source[self.consumed..].partition_point(|p| p.first_seen <= frame.date);
        self.consumed += added;
        self.last_frame = Some(frame.index);

        self.decay.fill(
            self.source[..self.consumed].iter().map(|p| p.first_seen),
            frame.date,
            &mut self.opacities,
        );
        Ok(added)
    }

    pub fn points(&self) -> &[AccumulatedPoint] {
        &self.source[..self.consumed]
    }

    /// Opacities for [`points`](Self::points) as of the last advanced frame.
    pub fn opacities(&self) -> &[f64] {
        &self.opacities
    }

    pub fn len(&self) -> usize {
        self.consumed
    }

    pub fn is_empty(&self) -> bool {
        self.consumed == 0
    }

    pub fn is_complete(&self) -> bool {
        self.consumed == self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::LatLng;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn frame(i: usize, date: NaiveDate) -> Frame {
        Frame {
            index: FrameIndex(i),
            date,
        }
    }

    fn acc(records: &[(f64, NaiveDate)]) -> PointAccumulator {
        let recs: Vec<PointRecord> = records
            .iter()
            .map(|(lat, d)| PointRecord::new(LatLng::new(*lat, -150.0).unwrap(), *d))
            .collect();
        PointAccumulator::new(&recs, &AlbersProjection::alaska(), AgeDecay::default())
    }

    #[test]
    fn reveals_records_on_or_before_frame_date() {
        let mut a = acc(&[(60.0, ymd(2015, 6, 3)), (61.0, ymd(2015, 6, 1))]);
        assert_eq!(a.advance(frame(0, ymd(2015, 6, 1))).unwrap(), 1);
        assert_eq!(a.advance(frame(1, ymd(2015, 6, 2))).unwrap(), 0);
        assert_eq!(a.len(), 1);
        assert_eq!(a.advance(frame(2, ymd(2015, 6, 3))).unwrap(), 1);
        assert!(a.is_complete());
        assert_eq!(a.points()[0].first_seen, ymd(2015, 6, 1));
    }

    #[test]
    fn same_frame_twice_is_idempotent() {
        let mut a = acc(&[(60.0, ymd(2015, 6, 1)), (61.0, ymd(2015, 6, 2))]);
        a.advance(frame(1, ymd(2015, 6, 2))).unwrap();
        let once = a.len();
        assert_eq!(a.advance(frame(1, ymd(2015, 6, 2))).unwrap(), 0);
        assert_eq!(a.len(), once);
        assert_eq!(a.opacities().len(), once);
    }

    #[test]
    fn moving_backwards_is_an_error() {
        let mut a = acc(&[(60.0, ymd(2015, 6, 1))]);
        a.advance(frame(3, ymd(2015, 6, 4))).unwrap();
        assert!(a.advance(frame(2, ymd(2015, 6, 3))).is_err());
    }

    #[test]
    fn equal_timestamps_keep_load_order() {
        let d = ymd(2016, 1, 1);
        let mut a = acc(&[(60.0, ymd(2016, 1, 5)), (61.0, d), (62.0, d), (63.0, d)]);
        a.advance(frame(0, d)).unwrap();
        let ys: Vec<f64> = a.points().iter().map(|p| p.position.y).collect();
        assert_eq!(ys.len(), 3);
        assert!(ys[0] < ys[1] && ys[1] < ys[2]);
    }

    #[test]
    fn opacities_are_recomputed_for_every_point() {
        let mut a = acc(&[(60.0, ymd(2015, 1, 1)), (61.0, ymd(2016, 1, 1))]);
        a.advance(frame(0, ymd(2016, 1, 1))).unwrap();
        let early = a.opacities().to_vec();
        a.advance(frame(400, ymd(2017, 1, 1))).unwrap();
        let late = a.opacities();
        assert_eq!(early.len(), late.len());
        assert!(late[0] < early[0]);
        assert!(late[1] < early[1]);
        let d = AgeDecay::default();
        assert_eq!(late[0], d.opacity_at(ymd(2015, 1, 1), ymd(2017, 1, 1)));
    }
}
