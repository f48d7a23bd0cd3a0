use crate::{
    data::load::Dataset,
    engine::{
        accumulator::PointAccumulator,
        background::BackgroundTracker,
        color::{ColorScale, Gradient},
        frame::{FramePayload, FrameRenderer},
        opacity::AgeDecay,
        timeline::{Timeline, TimelineBuilder},
    },
    foundation::{
        core::FrameIndex,
        error::{GeoFadeError, GeoFadeResult},
    },
    geo::projection::AlbersProjection,
};

/// Engine parameters that shape opacity and color.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineSettings {
    pub decay: AgeDecay,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub gradient: Gradient,
}

/// Which frames a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Only the terminal frame, as a static preview.
    FinalFrame,
    /// Every frame in order.
    #[default]
    Animation,
}

/// Lazy, finite, non-restartable sequence of frame payloads.
///
/// Each payload depends on the accumulated state of the previous one, so frames are produced
/// strictly in order. Restarting means building a new sequence.
pub struct FrameSequence {
    timeline: Timeline,
    points: PointAccumulator,
    background: BackgroundTracker,
    renderer: FrameRenderer,
    next: usize,
}

impl FrameSequence {
    /// Build the timeline, color scale and per-layer state from a loaded dataset.
    #[tracing::instrument(skip_all, fields(points = dataset.points.len(), background = dataset.background.len()))]
    pub fn new(
        dataset: &Dataset,
        projection: &AlbersProjection,
        settings: &EngineSettings,
    ) -> GeoFadeResult<Self> {
        settings.decay.validate()?;

        let timeline = TimelineBuilder::new()
            .with_set(&dataset.points)
            .with_set(&dataset.background)
            .build()?;

        let years = dataset
            .points
            .iter()
            .map(|p| p.year)
            .chain(dataset.background.iter().map(|b| b.year));
        let scale = ColorScale::from_years(years, settings.min_year, settings.max_year)?
            .with_gradient(settings.gradient);

        tracing::info!(
            frames = timeline.len(),
            start = %timeline.start(),
            end = %timeline.end(),
            min_year = scale.min_year,
            max_year = scale.max_year,
            "frame sequence ready"
        );

        Ok(Self {
            timeline,
            points: PointAccumulator::new(&dataset.points, projection, settings.decay),
            background: BackgroundTracker::new(&dataset.background, projection),
            renderer: FrameRenderer::new(scale),
            next: 0,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn scale(&self) -> &ColorScale {
        self.renderer.scale()
    }

    /// Compute the payload for `index`.
    ///
    /// Indices may repeat (idempotent) or skip ahead, but never move backwards.
    pub fn frame_at(&mut self, index: FrameIndex) -> GeoFadeResult<FramePayload> {
        let frame = self.timeline.get(index).ok_or_else(|| {
            GeoFadeError::evaluation(format!(
                "frame {} is outside the timeline (len {})",
                index.0,
                self.timeline.len()
            ))
        })?;

        let added = self.points.advance(frame)?;
        let visible = self.background.update(frame.date);
        tracing::trace!(
            frame = index.0,
            added,
            points = self.points.len(),
            background = visible.len(),
            "frame"
        );
        let payload = self.renderer.render(frame, &self.points, visible)?;
        self.next = self.next.max(index.0 + 1);
        Ok(payload)
    }

    /// Consume the sequence and produce only the terminal frame.
    pub fn terminal(mut self) -> GeoFadeResult<FramePayload> {
        let last = self.timeline.terminal().index;
        self.frame_at(last)
    }

    pub fn remaining(&self) -> usize {
        self.timeline.len().saturating_sub(self.next)
    }
}

impl Iterator for FrameSequence {
    type Item = GeoFadeResult<FramePayload>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.timeline.len() {
            return None;
        }
        let result = self.frame_at(FrameIndex(self.next));
        if result.is_err() {
            // Accumulated state is unusable past a failed frame.
            self.next = self.timeline.len();
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for FrameSequence {}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        data::record::{BackgroundRecord, PointRecord},
        foundation::core::LatLng,
    };

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(points: &[NaiveDate], background: &[NaiveDate]) -> Dataset {
        let pos = LatLng::new(61.0, -150.0).unwrap();
        Dataset {
            points: points.iter().map(|d| PointRecord::new(pos, *d)).collect(),
            background: background
                .iter()
                .map(|d| BackgroundRecord::new(pos, *d))
                .collect(),
        }
    }

    fn seq(ds: &Dataset) -> FrameSequence {
        FrameSequence::new(ds, &AlbersProjection::alaska(), &EngineSettings::default()).unwrap()
    }

    #[test]
    fn iterates_every_frame_once_then_stops() {
        let ds = dataset(&[ymd(2015, 6, 1), ymd(2015, 6, 3)], &[]);
        let mut s = seq(&ds);
        assert_eq!(s.len(), 3);
        let sizes: Vec<usize> = s.by_ref().map(|p| p.unwrap().foreground.len()).collect();
        assert_eq!(sizes, vec![1, 1, 2]);
        assert!(s.next().is_none());
        assert!(s.next().is_none());
    }

    #[test]
    fn a_failed_frame_ends_the_iteration() {
        let ds = dataset(&[ymd(2015, 6, 1), ymd(2015, 6, 5)], &[]);
        let mut s = seq(&ds);
        let ahead = s.timeline().terminal();
        s.points.advance(ahead).unwrap();

        assert!(s.next().unwrap().is_err());
        assert_eq!(s.len(), 0);
        assert!(s.next().is_none());
        assert!(s.next().is_none());
    }

    #[test]
    fn terminal_matches_last_streamed_frame() {
        let ds = dataset(
            &[ymd(2015, 6, 1), ymd(2015, 6, 20), ymd(2015, 8, 3)],
            &[ymd(2015, 7, 4)],
        );
        let streamed = seq(&ds).last().unwrap().unwrap();
        let terminal = seq(&ds).terminal().unwrap();
        assert_eq!(streamed, terminal);
        assert_eq!(terminal.foreground.len(), 3);
        assert_eq!(terminal.background.len(), 1);
    }

    #[test]
    fn background_shifts_timeline_start() {
        let ds = dataset(&[ymd(2015, 6, 1)], &[ymd(2015, 5, 20)]);
        let mut s = seq(&ds);
        assert_eq!(s.timeline().start(), ymd(2015, 5, 1));
        let first = s.next().unwrap().unwrap();
        assert!(first.foreground.is_empty());
        assert_eq!(first.background.len(), 1);
        assert_eq!(first.background.opacities[0], 0.0);
    }

    #[test]
    fn year_overrides_reach_the_scale() {
        let ds = dataset(&[ymd(2015, 6, 1)], &[]);
        let settings = EngineSettings {
            min_year: Some(2000),
            max_year: Some(2030),
            ..EngineSettings::default()
        };
        let s = FrameSequence::new(&ds, &AlbersProjection::alaska(), &settings).unwrap();
        assert_eq!((s.scale().min_year, s.scale().max_year), (2000, 2030));
    }

    #[test]
    fn empty_dataset_fails_to_build() {
        let ds = dataset(&[], &[]);
        let err = FrameSequence::new(&ds, &AlbersProjection::alaska(), &EngineSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, GeoFadeError::EmptyDataset(_)));
    }
}
