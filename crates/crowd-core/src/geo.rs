//! Continuous venue-space geometry and lat/lng projection.
//!
//! Venue coordinates are measured in tiles: the tile `(x, y)` covers the
//! half-open square `[x, x+1) × [y, y+1)`.  The y axis grows downward (image
//! rows), so "north" is `-y` and an angle of `-π/2` points north.

use std::f64::consts::PI;

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A point or displacement in continuous venue space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `theta` (radians, `atan2` convention).
    #[inline]
    pub fn from_angle(theta: f64) -> Self {
        Self { x: theta.cos(), y: theta.sin() }
    }

    #[inline]
    pub fn distance_sq(self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Angle of the straight line from `self` to `target`.
    #[inline]
    pub fn angle_to(self, target: Vec2) -> f64 {
        (target.y - self.y).atan2(target.x - self.x)
    }

    /// `self + dir * distance` where `dir` is the unit vector along `theta`.
    #[inline]
    pub fn step(self, theta: f64, distance: f64) -> Vec2 {
        Vec2 {
            x: self.x + distance * theta.cos(),
            y: self.y + distance * theta.sin(),
        }
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Integer tile coordinates containing this point.
    #[inline]
    pub fn tile(self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Centre point of tile `(x, y)`.
    #[inline]
    pub fn tile_center(x: i64, y: i64) -> Vec2 {
        Vec2 { x: x as f64 + 0.5, y: y as f64 + 0.5 }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Circle ────────────────────────────────────────────────────────────────────

/// A circular area in venue space: destination regions, geofences and
/// entrances are all circles.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Strict containment: points exactly on the rim are outside.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance_sq(p) < self.radius * self.radius
    }

    /// `true` if tile `(x, y)` belongs to this circle's interior: its centre
    /// lies inside the circle, or it holds the circle's centre point.
    pub fn covers_tile(&self, x: i64, y: i64) -> bool {
        self.contains(Vec2::tile_center(x, y)) || self.center.tile() == (x, y)
    }

    /// Inclusive tile bounding box `(min_x, min_y, max_x, max_y)`.
    pub fn tile_bounds(&self) -> (i64, i64, i64, i64) {
        (
            (self.center.x - self.radius).floor() as i64,
            (self.center.y - self.radius).floor() as i64,
            (self.center.x + self.radius).floor() as i64,
            (self.center.y + self.radius).floor() as i64,
        )
    }
}

// ── Angles ────────────────────────────────────────────────────────────────────

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(theta: f64) -> f64 {
    let mut t = theta % (2.0 * PI);
    if t <= -PI {
        t += 2.0 * PI;
    } else if t > PI {
        t -= 2.0 * PI;
    }
    t
}

/// Smallest absolute difference between two headings, in `[0, π]`.
pub fn angle_between(a: f64, b: f64) -> f64 {
    wrap_angle(a - b).abs()
}

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate used by geofence files.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Metres per degree of latitude (evaluated at 45°).
    pub const METRES_PER_LAT: f64 = 111_034.605_288_349_06;
    /// Metres per degree of longitude at the equator.
    pub const METRES_PER_LNG_AT_EQUATOR: f64 = 111_319.458;

    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Equirectangular projection to local venue coordinates anchored at
    /// `origin`.  Accurate to well under a metre across a festival site.
    pub fn to_local(self, origin: GeoPoint) -> Vec2 {
        let d_lat = self.lat - origin.lat;
        let d_lng = self.lng - origin.lng;
        let y = d_lat * Self::METRES_PER_LAT;
        let x = d_lng * d_lat.to_radians().cos() * Self::METRES_PER_LNG_AT_EQUATOR;
        Vec2 { x, y }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
