//! Forces applied to every particle of a world each step.

use super::Particle;
use crate::math::{self as m, Vec2};

/// Default floor for the distance used by [`ForceGenerator::Attractor`].
pub const DEFAULT_ATTRACTOR_MIN_DISTANCE: f32 = 10.0;

/// A force contributor that is fed to the particle world
/// and applied to every particle each step.
///
/// Generators only add to a particle's force accumulator.
/// They never touch position or velocity directly
/// and have no effect on infinite-mass particles.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum ForceGenerator {
    /// Constant gravitational acceleration. Applied as `g * mass`,
    /// so every particle accelerates by `g` regardless of mass.
    Gravity { g: Vec2 },
    /// Drag with a linear and a quadratic coefficient.
    Drag { k1: f32, k2: f32 },
    /// A constant push independent of the particle's own velocity.
    Wind { velocity: Vec2, strength: f32 },
    /// Inverse-square pull towards a point in space.
    ///
    /// With a negative `strength` value this can also be a repulsive force.
    Attractor {
        position: Vec2,
        strength: f32,
        /// Distances below this are treated as this to avoid the singularity at the source.
        min_distance: f32,
    },
    /// Linear drag used as a simplified kinetic friction.
    Friction { coefficient: f32 },
}

impl ForceGenerator {
    pub fn gravity(g: Vec2) -> Self {
        ForceGenerator::Gravity { g }
    }

    pub fn drag(k1: f32, k2: f32) -> Self {
        ForceGenerator::Drag { k1, k2 }
    }

    pub fn wind(velocity: Vec2, strength: f32) -> Self {
        ForceGenerator::Wind { velocity, strength }
    }

    /// An attractor with the default minimum distance.
    pub fn attractor(position: Vec2, strength: f32) -> Self {
        ForceGenerator::Attractor {
            position,
            strength,
            min_distance: DEFAULT_ATTRACTOR_MIN_DISTANCE,
        }
    }

    pub fn friction(coefficient: f32) -> Self {
        ForceGenerator::Friction { coefficient }
    }

    /// Add this generator's force to the particle's accumulator.
    ///
    /// `dt` is accepted for symmetry with the rest of the step pipeline;
    /// none of the current generators depend on it.
    pub fn apply(&self, particle: &mut Particle, _dt: f32) {
        if particle.has_infinite_mass() {
            return;
        }

        match *self {
            ForceGenerator::Gravity { g } => {
                particle.add_force(g * particle.mass.value());
            }
            ForceGenerator::Drag { k1, k2 } => {
                let speed = particle.velocity.mag();
                if speed > 0.0 {
                    let drag = k1 * speed + k2 * speed * speed;
                    particle.add_force(particle.velocity / speed * -drag);
                }
            }
            ForceGenerator::Wind { velocity, strength } => {
                particle.add_force(velocity * strength);
            }
            ForceGenerator::Attractor {
                position,
                strength,
                min_distance,
            } => {
                let dir = position - particle.position;
                let dist = dir.mag().max(min_distance);
                let magnitude = strength / (dist * dist);
                particle.add_force(m::normalize_or_zero(dir) * magnitude);
            }
            ForceGenerator::Friction { coefficient } => {
                let speed = particle.velocity.mag();
                if speed > 0.0 {
                    particle.add_force(particle.velocity / speed * (-coefficient * speed));
                }
            }
        }
    }

    /// Replace the acceleration of a gravity generator. No effect on other kinds.
    pub fn set_gravity(&mut self, new_g: Vec2) {
        if let ForceGenerator::Gravity { g } = self {
            *g = new_g;
        }
    }

    /// Replace the parameters of a wind generator. No effect on other kinds.
    pub fn set_wind(&mut self, new_velocity: Vec2, new_strength: f32) {
        if let ForceGenerator::Wind { velocity, strength } = self {
            *velocity = new_velocity;
            *strength = new_strength;
        }
    }

    /// Move an attractor. No effect on other kinds.
    pub fn set_position(&mut self, new_position: Vec2) {
        if let ForceGenerator::Attractor { position, .. } = self {
            *position = new_position;
        }
    }

    /// Change the strength of an attractor or wind. No effect on other kinds.
    pub fn set_strength(&mut self, new_strength: f32) {
        match self {
            ForceGenerator::Attractor { strength, .. } | ForceGenerator::Wind { strength, .. } => {
                *strength = new_strength
            }
            _ => {}
        }
    }

    #[inline]
    pub fn is_gravity(&self) -> bool {
        matches!(self, ForceGenerator::Gravity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn moving(vel: Vec2, mass: f32) -> Particle {
        Particle::new(Vec2::zero(), mass, 1.0).with_velocity(vel)
    }

    #[test]
    fn gravity_scales_with_mass() {
        let mut p = moving(Vec2::zero(), 3.0);
        ForceGenerator::gravity(Vec2::new(0.0, 10.0)).apply(&mut p, 0.1);
        assert_eq!(p.force_accumulator, Vec2::new(0.0, 30.0));
        p.integrate(1.0);
        assert_eq!(p.acceleration, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn drag_opposes_motion() {
        let mut p = moving(Vec2::new(2.0, 0.0), 1.0);
        ForceGenerator::drag(0.5, 0.25).apply(&mut p, 0.1);
        // 0.5 * 2 + 0.25 * 4 = 2
        assert_eq!(p.force_accumulator, Vec2::new(-2.0, 0.0));

        let mut still = moving(Vec2::zero(), 1.0);
        ForceGenerator::drag(0.5, 0.25).apply(&mut still, 0.1);
        ForceGenerator::friction(3.0).apply(&mut still, 0.1);
        assert_eq!(still.force_accumulator, Vec2::zero());
    }

    #[test]
    fn wind_ignores_particle_velocity() {
        let mut a = moving(Vec2::new(-50.0, 3.0), 1.0);
        let mut b = moving(Vec2::zero(), 5.0);
        let wind = ForceGenerator::wind(Vec2::new(1.0, 2.0), 3.0);
        wind.apply(&mut a, 0.1);
        wind.apply(&mut b, 0.1);
        assert_eq!(a.force_accumulator, Vec2::new(3.0, 6.0));
        assert_eq!(a.force_accumulator, b.force_accumulator);
    }

    #[test]
    fn attractor_distance_is_floored() {
        let mut near = Particle::new(Vec2::new(1.0, 0.0), 1.0, 1.0);
        let mut far = Particle::new(Vec2::new(20.0, 0.0), 1.0, 1.0);
        let attr = ForceGenerator::attractor(Vec2::zero(), 400.0);
        attr.apply(&mut near, 0.1);
        attr.apply(&mut far, 0.1);
        // near particle uses the 10 unit floor
        assert!(approx_eq(near.force_accumulator.x, -4.0, 1e-5));
        assert!(approx_eq(far.force_accumulator.x, -1.0, 1e-5));
    }

    #[test]
    fn friction_is_linear_in_speed() {
        let mut p = moving(Vec2::new(0.0, -4.0), 1.0);
        ForceGenerator::friction(0.5).apply(&mut p, 0.1);
        assert_eq!(p.force_accumulator, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn infinite_mass_receives_nothing() {
        let mut p = moving(Vec2::new(1.0, 1.0), 0.0);
        for gen in [
            ForceGenerator::gravity(Vec2::new(0.0, 400.0)),
            ForceGenerator::drag(1.0, 1.0),
            ForceGenerator::wind(Vec2::new(1.0, 0.0), 1.0),
            ForceGenerator::attractor(Vec2::new(100.0, 0.0), 1000.0),
            ForceGenerator::friction(1.0),
        ] {
            gen.apply(&mut p, 0.1);
        }
        assert_eq!(p.force_accumulator, Vec2::zero());
    }

    #[test]
    fn setters_only_touch_matching_kind() {
        let mut g = ForceGenerator::gravity(Vec2::zero());
        g.set_wind(Vec2::new(1.0, 1.0), 5.0);
        g.set_gravity(Vec2::new(0.0, 9.8));
        assert_eq!(g, ForceGenerator::gravity(Vec2::new(0.0, 9.8)));

        let mut a = ForceGenerator::attractor(Vec2::zero(), 1.0);
        a.set_position(Vec2::new(2.0, 2.0));
        a.set_strength(-3.0);
        assert_eq!(
            a,
            ForceGenerator::Attractor {
                position: Vec2::new(2.0, 2.0),
                strength: -3.0,
                min_distance: DEFAULT_ATTRACTOR_MIN_DISTANCE,
            }
        );
    }
}
