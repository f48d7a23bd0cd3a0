use crate::foundation::error::{GeoFadeError, GeoFadeResult};

pub use kurbo::{Point, Rect};

/// 0-based position of a frame within the timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub usize);

/// Geographic position in WGS84 degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> GeoFadeResult<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeoFadeError::validation(format!(
                "coordinates must be finite (lat={lat}, lng={lng})"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoFadeError::validation(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Straight (non-premultiplied) RGB8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
        }
    }

    /// `#rrggbb`, for SVG attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlng_rejects_out_of_range_latitude() {
        assert!(LatLng::new(61.2, -149.9).is_ok());
        assert!(LatLng::new(91.0, 0.0).is_err());
        assert!(LatLng::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rgb_from_unit_clamps_and_rounds() {
        assert_eq!(Rgb8::from_unit(1.5, 0.5, -1.0), Rgb8 { r: 255, g: 128, b: 0 });
        assert_eq!(Rgb8::WHITE.to_hex(), "#ffffff");
    }
}
