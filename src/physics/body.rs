use crate::math::{self as m, Vec2};

/// Mass or moment of inertia of a body, which can be infinite.
///
/// This stores both a mass value and its inverse, because calculating inverse mass
/// is expensive and needed a lot in physics calculations.
///
/// Any mass that isn't strictly positive and finite is treated as infinite,
/// which is how static objects are expressed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mass {
    Finite { mass: f32, inverse: f32 },
    Infinite,
}

impl From<f32> for Mass {
    #[inline]
    fn from(mass: f32) -> Self {
        // written this way so that NaN also ends up infinite
        if !(mass > 0.0) || mass == f32::INFINITY {
            return Mass::Infinite;
        }
        Mass::Finite {
            mass,
            inverse: 1.0 / mass,
        }
    }
}

impl Mass {
    /// Get the inverse of the mass, which is zero if the mass is infinite.
    #[inline]
    pub fn inv(&self) -> f32 {
        match self {
            Mass::Finite { inverse, .. } => *inverse,
            Mass::Infinite => 0.0,
        }
    }

    /// Get the mass value, which is zero for infinite mass
    /// (the same sentinel that was used to create it).
    #[inline]
    pub fn value(&self) -> f32 {
        match self {
            Mass::Finite { mass, .. } => *mass,
            Mass::Infinite => 0.0,
        }
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Mass::Infinite)
    }
}

/// Velocity of a rigid body.
///
// Equivalent to a Vec3 but with names for the translational and rotational part.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity {
    /// Linear velocity in world units per second.
    pub linear: Vec2,
    /// Angular velocity in radians per second.
    pub angular: f32,
}

impl Velocity {
    pub fn new(linear: Vec2, angular: f32) -> Self {
        Self { linear, angular }
    }

    /// Get the linear velocity of a point offset from the center of mass.
    #[inline]
    pub fn point_velocity(&self, offset: Vec2) -> Vec2 {
        let tangent = m::left_normal(offset) * self.angular;
        self.linear + tangent
    }
}

impl std::ops::Add for Velocity {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }
}
impl std::ops::AddAssign for Velocity {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
impl std::ops::Mul<f32> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f32) -> Self::Output {
        Velocity {
            linear: self.linear * rhs,
            angular: self.angular * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonpositive_mass_is_infinite() {
        assert_eq!(Mass::from(0.0), Mass::Infinite);
        assert_eq!(Mass::from(-3.0), Mass::Infinite);
        assert_eq!(Mass::from(f32::NAN), Mass::Infinite);
        assert_eq!(Mass::from(f32::INFINITY), Mass::Infinite);
        assert_eq!(Mass::Infinite.inv(), 0.0);
        assert_eq!(Mass::Infinite.value(), 0.0);

        let m = Mass::from(4.0);
        assert_eq!(m.inv(), 0.25);
        assert_eq!(m.value(), 4.0);
        assert!(!m.is_infinite());
    }

    #[test]
    fn point_velocity_includes_rotation() {
        let vel = Velocity::new(Vec2::new(1.0, 0.0), 2.0);
        // perp((0, 3)) = (-3, 0), times 2 rad/s
        assert_eq!(vel.point_velocity(Vec2::new(0.0, 3.0)), Vec2::new(-5.0, 0.0));
        assert_eq!((vel * 0.5).angular, 1.0);
    }
}
