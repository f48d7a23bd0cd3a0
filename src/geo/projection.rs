//! Alaska Albers Equal Area Conic (ESRI:102006) on the GRS80 ellipsoid.
//!
//! Forward projection only; input is WGS84/NAD83 degrees (the datums are treated as identical at
//! map scale), output is meters.

use crate::foundation::core::{LatLng, Point};

const GRS80_A: f64 = 6_378_137.0;
const GRS80_E2: f64 = 0.006_694_380_022_90;

/// Precomputed Albers cone constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlbersProjection {
    a: f64,
    e: f64,
    e2: f64,
    n: f64,
    c: f64,
    rho0: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AlbersProjection {
    /// Generic constructor from standard parallels and origin (degrees).
    pub fn new(lat0: f64, lon0: f64, lat1: f64, lat2: f64) -> Self {
        let a = GRS80_A;
        let e2 = GRS80_E2;
        let e = e2.sqrt();

        let (phi0, phi1, phi2) = (lat0.to_radians(), lat1.to_radians(), lat2.to_radians());
        let m1 = m(phi1, e2);
        let m2 = m(phi2, e2);
        let q0 = q(phi0, e, e2);
        let q1 = q(phi1, e, e2);
        let q2 = q(phi2, e, e2);

        let n = if (phi1 - phi2).abs() < 1e-12 {
            phi1.sin()
        } else {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };
        let c = m1 * m1 + n * q1;
        let rho0 = a * (c - n * q0).max(0.0).sqrt() / n;

        Self {
            a,
            e,
            e2,
            n,
            c,
            rho0,
            lon0: lon0.to_radians(),
            false_easting: 0.0,
            false_northing: 0.0,
        }
    }

    /// ESRI:102006, the output CRS of every map.
    pub fn alaska() -> Self {
        Self::new(50.0, -154.0, 55.0, 65.0)
    }

    pub fn project(&self, p: LatLng) -> Point {
        let phi = p.lat.to_radians();
        let mut dlon = p.lng.to_radians() - self.lon0;
        dlon = (dlon + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU) - std::f64::consts::PI;

        let q = q(phi, self.e, self.e2);
        let rho = self.a * (self.c - self.n * q).max(0.0).sqrt() / self.n;
        let theta = self.n * dlon;

        Point::new(
            self.false_easting + rho * theta.sin(),
            self.false_northing + self.rho0 - rho * theta.cos(),
        )
    }
}

impl Default for AlbersProjection {
    fn default() -> Self {
        Self::alaska()
    }
}

fn m(phi: f64, e2: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e2 * s * s).sqrt()
}

fn q(phi: f64, e: f64, e2: f64) -> f64 {
    let s = phi.sin();
    let es = e * s;
    (1.0 - e2) * (s / (1.0 - e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}
