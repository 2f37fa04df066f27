//! Geographic positions and great-circle distance.

/// Mean Earth radius in meters, used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A position on the Earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    /// Great-circle distance to `other`, in meters.
    ///
    /// Spherical model; accurate to well under a percent, which is plenty
    /// for route-length statistics.
    pub fn distance_m(self, other: Point) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let lon_delta = (self.longitude - other.longitude).abs().to_radians();

        let cosine = lat_a.sin() * lat_b.sin() + lat_a.cos() * lat_b.cos() * lon_delta.cos();
        // Rounding can push the cosine a hair outside [-1, 1].
        cosine.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M
    }
}
