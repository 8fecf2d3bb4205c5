//! Fixed-point geographic coordinate.
//!
//! Latitude and longitude are stored as `i32` in units of 1e-6 degree.  The
//! preprocessing stage writes them in this form, so the server never converts
//! through floating point on the load path and coordinates compare exactly.

/// Number of fixed-point units per degree.
pub const COORDINATE_PRECISION: f64 = 1_000_000.0;

/// A WGS-84 coordinate in fixed-point micro-degrees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedPointCoordinate {
    pub lat: i32,
    pub lon: i32,
}

impl FixedPointCoordinate {
    #[inline]
    pub const fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Round a floating-point degree pair to the nearest micro-degree.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat: (lat * COORDINATE_PRECISION).round() as i32,
            lon: (lon * COORDINATE_PRECISION).round() as i32,
        }
    }

    #[inline]
    pub fn lat_degrees(self) -> f64 {
        f64::from(self.lat) / COORDINATE_PRECISION
    }

    #[inline]
    pub fn lon_degrees(self) -> f64 {
        f64::from(self.lon) / COORDINATE_PRECISION
    }

    /// `true` if the coordinate lies inside the WGS-84 value range.
    pub fn is_valid(self) -> bool {
        let max_lat = (90.0 * COORDINATE_PRECISION) as i32;
        let max_lon = (180.0 * COORDINATE_PRECISION) as i32;
        (-max_lat..=max_lat).contains(&self.lat) && (-max_lon..=max_lon).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: FixedPointCoordinate) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat_degrees() - self.lat_degrees()).to_radians();
        let d_lon = (other.lon_degrees() - self.lon_degrees()).to_radians();

        let lat1 = self.lat_degrees().to_radians();
        let lat2 = other.lat_degrees().to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Initial bearing from `self` towards `other`, degrees clockwise from
    /// north in `[0, 360)`.
    pub fn bearing_to(self, other: FixedPointCoordinate) -> f64 {
        let lat1 = self.lat_degrees().to_radians();
        let lat2 = other.lat_degrees().to_radians();
        let d_lon = (other.lon_degrees() - self.lon_degrees()).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        let deg = y.atan2(x).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// `[lat, lon]` as `f64` fixed-point units.  This is the planar space the
    /// spatial index works in.
    #[inline]
    pub fn to_plane(self) -> [f64; 2] {
        [f64::from(self.lat), f64::from(self.lon)]
    }
}

impl std::fmt::Display for FixedPointCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat_degrees(), self.lon_degrees())
    }
}
