use crate::{
    data::date::format_day,
    engine::{
        accumulator::PointAccumulator, background::CoverageRecord, color::ColorScale,
        timeline::Frame,
    },
    foundation::{
        core::{Point, Rgb8},
        error::{GeoFadeError, GeoFadeResult},
    },
};

/// Parallel per-record arrays for one layer. All four always have the same length.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LayerPayload {
    pub positions: Vec<Point>,
    /// Record year, the value fed into the color scale.
    pub color_values: Vec<i32>,
    /// `color_values` resolved through the scale.
    pub colors: Vec<Rgb8>,
    pub opacities: Vec<f64>,
}

impl LayerPayload {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push(&mut self, position: Point, year: i32, scale: &ColorScale, opacity: f64) {
        self.positions.push(position);
        self.color_values.push(year);
        self.colors.push(scale.color(year));
        self.opacities.push(opacity);
    }

    fn check_lengths(&self, layer: &str) -> GeoFadeResult<()> {
        let n = self.positions.len();
        if self.color_values.len() != n || self.colors.len() != n || self.opacities.len() != n {
            return Err(GeoFadeError::evaluation(format!(
                "{layer} layer arrays disagree in length"
            )));
        }
        Ok(())
    }
}

/// Everything a drawing surface needs for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FramePayload {
    pub frame: Frame,
    pub foreground: LayerPayload,
    /// Empty (never absent) when no background data is loaded.
    pub background: LayerPayload,
    /// `YYYY-MM-DD`.
    pub label: String,
}

/// Packages accumulated state into a [`FramePayload`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRenderer {
    scale: ColorScale,
}

impl FrameRenderer {
    pub fn new(scale: ColorScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn render(
        &self,
        frame: Frame,
        points: &PointAccumulator,
        background: &[CoverageRecord],
    ) -> GeoFadeResult<FramePayload> {
        let mut foreground = LayerPayload::default();
        if points.points().len() != points.opacities().len() {
            return Err(GeoFadeError::evaluation(
                "accumulator opacities are stale; advance it before rendering",
            ));
        }
        for (p, &opacity) in points.points().iter().zip(points.opacities()) {
            foreground.push(p.position, p.year, &self.scale, opacity);
        }

        let mut bg = LayerPayload::default();
        for r in background {
            bg.push(r.position, r.year, &self.scale, r.alpha);
        }

        foreground.check_lengths("foreground")?;
        bg.check_lengths("background")?;

        Ok(FramePayload {
            frame,
            foreground,
            background: bg,
            label: format_day(frame.date),
        })
    }
}
