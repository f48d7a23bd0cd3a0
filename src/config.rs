use std::path::Path;

use anyhow::Context as _;

use crate::{
    engine::{
        color::Gradient,
        opacity::{AgeDecay, DEFAULT_DECAY_YEARS, DEFAULT_MIN_OPACITY},
        sequence::EngineSettings,
    },
    foundation::{
        core::Canvas,
        error::{GeoFadeError, GeoFadeResult},
    },
    geo::viewport::Margins,
    render::raster::RasterStyle,
};

pub const DEFAULT_FPS: u32 = 15;

/// Everything a render run needs besides its input paths.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub canvas: Canvas,
    pub fps: u32,
    /// Hold each date on screen this long. Unset means one encoded frame per date.
    pub interval_ms: Option<u32>,
    pub decay_years: f64,
    pub min_opacity: f64,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub gradient: Gradient,
    pub margins: Margins,
    pub style: RasterStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1000,
                height: 600,
            },
            fps: DEFAULT_FPS,
            interval_ms: None,
            decay_years: DEFAULT_DECAY_YEARS,
            min_opacity: DEFAULT_MIN_OPACITY,
            min_year: None,
            max_year: None,
            gradient: Gradient::default(),
            margins: Margins::default(),
            style: RasterStyle::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_path(path: &Path) -> GeoFadeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text).map_err(|e| {
            GeoFadeError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> GeoFadeResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(GeoFadeError::validation("canvas width/height must be > 0"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(GeoFadeError::validation(format!(
                "canvas {width}x{height} must have even dimensions"
            )));
        }
        if self.fps == 0 {
            return Err(GeoFadeError::validation("fps must be > 0"));
        }
        if self.interval_ms == Some(0) {
            return Err(GeoFadeError::validation("interval_ms must be > 0 when set"));
        }
        self.decay().validate()?;
        if let (Some(lo), Some(hi)) = (self.min_year, self.max_year)
            && lo > hi
        {
            return Err(GeoFadeError::validation(format!(
                "min_year {lo} is after max_year {hi}"
            )));
        }
        let m = self.margins;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(GeoFadeError::validation("margins must be finite and >= 0"));
        }
        let s = &self.style;
        if s.foreground_radius <= 0.0 || s.background_radius <= 0.0 {
            return Err(GeoFadeError::validation("point radii must be > 0"));
        }
        if s.label.font_size <= 0.0 {
            return Err(GeoFadeError::validation("label font size must be > 0"));
        }
        Ok(())
    }

    pub fn decay(&self) -> AgeDecay {
        AgeDecay {
            decay_years: self.decay_years,
            min_opacity: self.min_opacity,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            decay: self.decay(),
            min_year: self.min_year,
            max_year: self.max_year,
            gradient: self.gradient,
        }
    }

    /// Encoded frames per date: `round(interval_ms * fps / 1000)`, at least 1.
    pub fn frame_hold(&self) -> u32 {
        match self.interval_ms {
            None => 1,
            Some(ms) => {
                let held = (f64::from(ms) * f64::from(self.fps) / 1000.0).round();
                (held as u32).max(1)
            }
        }
    }
}
