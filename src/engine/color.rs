use crate::foundation::{
    core::Rgb8,
    error::{GeoFadeError, GeoFadeResult},
};

/// Gradient the normalized scale position is looked up in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gradient {
    /// matplotlib's `rainbow`: purple through red.
    #[default]
    Rainbow,
    Grayscale,
}

impl Gradient {
    /// Sample at `t` in `[0, 1]` (clamped).
    pub fn sample(self, t: f64) -> Rgb8 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Rainbow => Rgb8::from_unit(
                (2.0 * t - 0.5).abs(),
                (t * std::f64::consts::PI).sin(),
                (t * std::f64::consts::FRAC_PI_2).cos(),
            ),
            Self::Grayscale => Rgb8::from_unit(t, t, t),
        }
    }
}

/// Linear year → color mapping shared by both layers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorScale {
    pub min_year: i32,
    pub max_year: i32,
    pub gradient: Gradient,
}

impl ColorScale {
    pub fn new(min_year: i32, max_year: i32) -> GeoFadeResult<Self> {
        if min_year > max_year {
            return Err(GeoFadeError::validation(format!(
                "color scale min year {min_year} is after max year {max_year}"
            )));
        }
        Ok(Self {
            min_year,
            max_year,
            gradient: Gradient::default(),
        })
    }

    /// Domain from the union of `years`, with optional explicit bounds taking precedence.
    pub fn from_years(
        years: impl IntoIterator<Item = i32>,
        min_override: Option<i32>,
        max_override: Option<i32>,
    ) -> GeoFadeResult<Self> {
        let (lo, hi) = years
            .into_iter()
            .fold((None, None), |(lo, hi): (Option<i32>, Option<i32>), y| {
                (
                    Some(lo.map_or(y, |l| l.min(y))),
                    Some(hi.map_or(y, |h| h.max(y))),
                )
            });
        let min_year = min_override.or(lo).ok_or_else(|| {
            GeoFadeError::empty_dataset("no years to derive the color scale from")
        })?;
        let max_year = max_override.or(hi).ok_or_else(|| {
            GeoFadeError::empty_dataset("no years to derive the color scale from")
        })?;
        Self::new(min_year, max_year)
    }

    pub fn with_gradient(mut self, gradient: Gradient) -> Self {
        self.gradient = gradient;
        self
    }

    /// Position of `year` within the domain, clamped to `[0, 1]`; a one-year domain maps to 0.
    pub fn normalize(&self, year: i32) -> f64 {
        if self.max_year == self.min_year {
            return 0.0;
        }
        let span = f64::from(self.max_year - self.min_year);
        (f64::from(year - self.min_year) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, year: i32) -> Rgb8 {
        self.gradient.sample(self.normalize(year))
    }
}
