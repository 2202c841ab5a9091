use super::Mass;
use crate::math::Vec2;

/// Default collision radius of a particle.
pub const DEFAULT_PARTICLE_RADIUS: f32 = 5.0;

/// A point mass with a circular collision extent.
///
/// Particles don't rotate. Forces are accumulated with [`add_force`][Self::add_force]
/// and consumed by [`integrate`][Self::integrate], which also clears them,
/// so forces need to be reapplied every step.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Acceleration computed during the last integration.
    pub acceleration: Vec2,
    pub force_accumulator: Vec2,
    pub mass: Mass,
    pub radius: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec2::zero(), 1.0, DEFAULT_PARTICLE_RADIUS)
    }
}

impl Particle {
    /// Create a particle at rest. A mass of zero or less makes the particle immovable.
    pub fn new(position: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::zero(),
            acceleration: Vec2::zero(),
            force_accumulator: Vec2::zero(),
            mass: Mass::from(mass),
            radius,
        }
    }

    /// Set the velocity of the particle in a builder-like chain.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn add_force(&mut self, force: Vec2) {
        self.force_accumulator += force;
    }

    #[inline]
    pub fn clear_forces(&mut self) {
        self.force_accumulator = Vec2::zero();
    }

    #[inline]
    pub fn has_infinite_mass(&self) -> bool {
        self.mass.is_infinite()
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        self.mass.inv()
    }

    /// Semi-implicit Euler step. Infinite-mass particles are left untouched.
    pub fn integrate(&mut self, dt: f32) {
        if self.has_infinite_mass() {
            return;
        }

        self.acceleration = self.force_accumulator * self.mass.inv();
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;

        self.clear_forces();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn semi_implicit_euler_uses_new_velocity() {
        let mut p = Particle::new(Vec2::zero(), 2.0, 1.0);
        p.add_force(Vec2::new(4.0, 0.0));
        p.integrate(0.5);
        // a = 2, v = 1, x = v * dt = 0.5
        assert_eq!(p.acceleration, Vec2::new(2.0, 0.0));
        assert_eq!(p.velocity, Vec2::new(1.0, 0.0));
        assert!(approx_eq(p.position.x, 0.5, 1e-6));
        assert_eq!(p.force_accumulator, Vec2::zero());
    }

    #[test]
    fn infinite_mass_is_never_integrated() {
        let mut p = Particle::new(Vec2::new(3.0, 3.0), 0.0, 1.0).with_velocity(Vec2::new(1.0, 1.0));
        p.add_force(Vec2::new(100.0, 0.0));
        for _ in 0..10 {
            p.integrate(0.1);
        }
        assert_eq!(p.position, Vec2::new(3.0, 3.0));
        assert_eq!(p.velocity, Vec2::new(1.0, 1.0));
    }
}
