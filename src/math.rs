//! Types, aliases and helper operations for doing math with `ultraviolet`.
use std::f32::consts::PI;
pub use ultraviolet as uv;

/// The vector type used everywhere in the physics core.
///
/// Single precision; screen-like coordinates are assumed by the world types
/// (origin in the top left corner, y pointing down), but nothing in here depends on that.
pub type Vec2 = uv::Vec2;

/// An angle in either degrees or radians.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum Angle {
    Rad(f32),
    Deg(f32),
}
impl Angle {
    /// Get the angle as degrees.
    #[inline]
    pub fn deg(&self) -> f32 {
        match self {
            Angle::Rad(rad) => rad * 180.0 / PI,
            Angle::Deg(deg) => *deg,
        }
    }

    /// Get the angle as radians.
    #[inline]
    pub fn rad(&self) -> f32 {
        match self {
            Angle::Rad(rad) => *rad,
            Angle::Deg(deg) => deg * PI / 180.0,
        }
    }
}
impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}
impl From<f32> for Angle {
    /// Plain floats are radians, matching body orientations.
    #[inline]
    fn from(rad: f32) -> Self {
        Angle::Rad(rad)
    }
}

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    /// Normalize a vector. The vector must not be zero.
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(v.normalized())
    }

    /// Normalize a vector if it's longer than `min_length`, otherwise return `None`.
    pub fn try_new_normalize(v: Vec2, min_length: f32) -> Option<Self> {
        let mag = v.mag();
        if mag > min_length {
            Some(Unit(v / mag))
        } else {
            None
        }
    }

    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec2::unit_x())
    }

    pub fn unit_y() -> Self {
        Unit(Vec2::unit_y())
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

// Vec2 utils

/// Rotate a vector 90 degrees counterclockwise, i.e. `(x, y) -> (-y, x)`.
#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
#[inline]
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}
#[inline]
pub fn unit_left_normal(u: Unit<Vec2>) -> Unit<Vec2> {
    Unit::new_unchecked(left_normal(*u))
}

/// The scalar 2D cross product `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.wedge(b).xy
}

/// Rotate a vector by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).mag()
}

/// Normalize a vector, returning zero instead of NaN for the zero vector.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let mag = v.mag();
    if mag > 0.0 {
        v / mag
    } else {
        Vec2::zero()
    }
}

/// In-place version of [`normalize_or_zero`][self::normalize_or_zero].
#[inline]
pub fn normalize_in_place(v: &mut Vec2) {
    let mag = v.mag();
    if mag > 0.0 {
        *v /= mag;
    }
}

#[cfg(test)]
pub(crate) fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
