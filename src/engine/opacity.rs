//! Pure opacity functions.
//!
//! Foreground points decay exponentially with age down to a floor. Background coverage records
//! follow a month schedule: a linear fade-in during their image month, then a linear fade-out over
//! the following six months down to its own floor, all under a fixed 50% ceiling.

use chrono::{Datelike, NaiveDate};

use crate::{
    data::date::{days_in_month, month_ordinal},
    foundation::error::{GeoFadeError, GeoFadeResult},
};

pub const DEFAULT_DECAY_YEARS: f64 = 5.0;
pub const DEFAULT_MIN_OPACITY: f64 = 0.2;

pub const FADE_OUT_MONTHS: f64 = 6.0;
pub const FADE_OUT_FLOOR: f64 = 0.1;
pub const BACKGROUND_CEILING: f64 = 0.5;

/// Exponential age decay with a visibility floor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AgeDecay {
    pub decay_years: f64,
    pub min_opacity: f64,
}

impl Default for AgeDecay {
    fn default() -> Self {
        Self {
            decay_years: DEFAULT_DECAY_YEARS,
            min_opacity: DEFAULT_MIN_OPACITY,
        }
    }
}

impl AgeDecay {
    pub fn new(decay_years: f64, min_opacity: f64) -> GeoFadeResult<Self> {
        let d = Self {
            decay_years,
            min_opacity,
        };
        d.validate()?;
        Ok(d)
    }

    pub fn validate(&self) -> GeoFadeResult<()> {
        if !self.decay_years.is_finite() || self.decay_years <= 0.0 {
            return Err(GeoFadeError::validation("decay years must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.min_opacity) {
            return Err(GeoFadeError::validation("min opacity must be within [0, 1]"));
        }
        Ok(())
    }

    fn decay_days(&self) -> f64 {
        self.decay_years * 365.0
    }

    /// `max(exp(-age / (D*365)), floor)`, capped at 1 for negative ages.
    pub fn opacity(&self, age_days: f64) -> f64 {
        (-age_days / self.decay_days())
            .exp()
            .clamp(self.min_opacity, 1.0)
    }

    pub fn opacity_at(&self, seen: NaiveDate, now: NaiveDate) -> f64 {
        self.opacity((now - seen).num_days() as f64)
    }

    /// Recompute opacities for every date into `out` (cleared first).
    pub fn fill(&self, dates: impl IntoIterator<Item = NaiveDate>, now: NaiveDate, out: &mut Vec<f64>) {
        out.clear();
        out.extend(dates.into_iter().map(|d| self.opacity_at(d, now)));
    }
}

/// Fade-in factor of a background record, or `None` while its month is still in the future.
///
/// During the image month the factor is `(now - month_start) / days_in_month`; afterwards it is 1.
pub fn month_fade_in(image_month: NaiveDate, now: NaiveDate) -> Option<f64> {
    let elapsed = month_ordinal(now) - month_ordinal(image_month);
    match elapsed {
        e if e < 0 => None,
        0 => Some(f64::from(now.day0()) / f64::from(days_in_month(now))),
        _ => Some(1.0),
    }
}

/// Linear fade over six whole calendar months, clamped to `[0.1, 1.0]`.
pub fn month_fade_out(image_month: NaiveDate, now: NaiveDate) -> f64 {
    let months = (month_ordinal(now) - month_ordinal(image_month)).max(0) as f64;
    (1.0 - months / FADE_OUT_MONTHS).clamp(FADE_OUT_FLOOR, 1.0)
}

/// `fade_in * fade_out * 0.5`, or `None` when the record is not yet visible.
pub fn background_opacity(image_month: NaiveDate, now: NaiveDate) -> Option<f64> {
    month_fade_in(image_month, now)
        .map(|fade_in| fade_in * month_fade_out(image_month, now) * BACKGROUND_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_decay_is_monotonic_and_floored() {
        let d = AgeDecay::default();
        let mut prev = f64::INFINITY;
        for age in (0..20_000).step_by(37) {
            let o = d.opacity(age as f64);
            assert!(o <= prev);
            assert!(o >= DEFAULT_MIN_OPACITY);
            prev = o;
        }
        assert_eq!(d.opacity(0.0), 1.0);
        assert_eq!(d.opacity(1e9), DEFAULT_MIN_OPACITY);
    }

    #[test]
    fn age_decay_matches_exponential_before_floor() {
        let d = AgeDecay::default();
        let expected = (-365.0f64 / (5.0 * 365.0)).exp();
        assert!((d.opacity(365.0) - expected).abs() < 1e-12);
        assert!((d.opacity_at(ymd(2020, 1, 1), ymd(2020, 12, 31)) - expected).abs() < 1e-12);
    }

    #[test]
    fn fill_recomputes_all_entries() {
        let d = AgeDecay::default();
        let mut out = vec![9.0; 5];
        d.fill([ymd(2020, 1, 1), ymd(2020, 1, 2)], ymd(2020, 1, 2), &mut out);
        assert_eq!(out.len(), 2);
        assert!(out[0] < out[1]);
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn invalid_decay_parameters_are_rejected() {
        assert!(AgeDecay::new(0.0, 0.2).is_err());
        assert!(AgeDecay::new(5.0, 1.5).is_err());
        assert!(AgeDecay::new(5.0, 0.0).is_ok());
    }

    #[test]
    fn fade_in_within_image_month() {
        let month = ymd(2019, 7, 1);
        assert_eq!(month_fade_in(month, ymd(2019, 7, 1)), Some(0.0));
        let mid = month_fade_in(month, ymd(2019, 7, 15)).unwrap();
        assert!((mid - 14.0 / 31.0).abs() < 1e-12);
        let last = month_fade_in(month, ymd(2019, 7, 31)).unwrap();
        assert!((last - 30.0 / 31.0).abs() < 1e-12);
        assert_eq!(month_fade_in(month, ymd(2019, 8, 1)), Some(1.0));
        assert_eq!(month_fade_in(month, ymd(2019, 6, 30)), None);
    }

    #[test]
    fn fade_out_steps_by_whole_months_to_floor() {
        let month = ymd(2019, 7, 1);
        assert_eq!(month_fade_out(month, ymd(2019, 7, 31)), 1.0);
        let mut prev = 1.0;
        for m in 0..12u32 {
            let now = ymd(2019 + ((6 + m) / 12) as i32, (6 + m) % 12 + 1, 10);
            let f = month_fade_out(month, now);
            assert!(f <= prev);
            assert!((FADE_OUT_FLOOR..=1.0).contains(&f));
            if m >= 6 {
                assert_eq!(f, FADE_OUT_FLOOR);
            }
            prev = f;
        }
        assert!((month_fade_out(month, ymd(2019, 10, 2)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn background_blend_has_half_ceiling() {
        let month = ymd(2019, 7, 1);
        assert_eq!(background_opacity(month, ymd(2019, 8, 3)), Some(0.5 * (1.0 - 1.0 / 6.0)));
        assert_eq!(background_opacity(month, ymd(2021, 1, 1)), Some(0.05));
        assert_eq!(background_opacity(month, ymd(2019, 6, 30)), None);
    }
}
