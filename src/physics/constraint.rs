//! Persistent relations between particles, solved iteratively every step.

use super::{Particle, ParticleKey};
use crate::math::{self as m, Angle, Vec2};

use std::f32::consts::FRAC_PI_2;

use thunderdome as td;

/// Default damping of spring constraints.
pub const DEFAULT_SPRING_DAMPING: f32 = 0.1;
/// Default stiffness of distance and pin constraints.
pub const DEFAULT_STIFFNESS: f32 = 1.0;
/// Default stiffness of angle constraints.
pub const DEFAULT_ANGLE_STIFFNESS: f32 = 0.5;
/// Arms of an angle constraint whose unit directions have a cross product
/// smaller than this are treated as collinear.
pub const COLLINEAR_EPSILON: f32 = 1e-4;

/// A constraint restricts the motion of one or more particles.
///
/// Constraints refer to particles by key and don't own them.
/// Solving a constraint whose particles no longer exist does nothing,
/// and the particle world drops such constraints at the start of its next step.
///
/// Springs and angle constraints act through forces,
/// which take effect at the next integration.
/// Distance and pin constraints move particles directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Constraint {
    /// Hooke's law spring with damping along the spring axis.
    Spring {
        a: ParticleKey,
        b: ParticleKey,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
    /// Keeps two particles at a fixed distance from each other.
    Distance {
        a: ParticleKey,
        b: ParticleKey,
        distance: f32,
        stiffness: f32,
    },
    /// Pulls a particle towards a fixed point in the world.
    Pin {
        particle: ParticleKey,
        anchor: Vec2,
        stiffness: f32,
    },
    /// Pushes the angle at `b` between `b -> a` and `b -> c` towards a target in radians.
    Angle {
        a: ParticleKey,
        b: ParticleKey,
        c: ParticleKey,
        angle: f32,
        stiffness: f32,
    },
}

impl Constraint {
    /// A spring with the default damping.
    pub fn spring(a: ParticleKey, b: ParticleKey, rest_length: f32, stiffness: f32) -> Self {
        Constraint::Spring {
            a,
            b,
            rest_length,
            stiffness,
            damping: DEFAULT_SPRING_DAMPING,
        }
    }

    /// A fully rigid distance constraint. Use [`with_stiffness`][Self::with_stiffness] to soften it.
    pub fn distance(a: ParticleKey, b: ParticleKey, distance: f32) -> Self {
        Constraint::Distance {
            a,
            b,
            distance,
            stiffness: DEFAULT_STIFFNESS,
        }
    }

    pub fn pin(particle: ParticleKey, anchor: Vec2) -> Self {
        Constraint::Pin {
            particle,
            anchor,
            stiffness: DEFAULT_STIFFNESS,
        }
    }

    /// An angle constraint. Plain floats are taken as radians.
    pub fn angle(a: ParticleKey, b: ParticleKey, c: ParticleKey, angle: impl Into<Angle>) -> Self {
        Constraint::Angle {
            a,
            b,
            c,
            angle: angle.into().rad(),
            stiffness: DEFAULT_ANGLE_STIFFNESS,
        }
    }

    /// Set the stiffness of any kind of constraint in a builder-like chain.
    pub fn with_stiffness(mut self, new_stiffness: f32) -> Self {
        self.set_stiffness(new_stiffness);
        self
    }

    /// Set the damping of a spring. No effect on other kinds.
    pub fn with_damping(mut self, new_damping: f32) -> Self {
        self.set_damping(new_damping);
        self
    }

    pub fn set_stiffness(&mut self, new_stiffness: f32) {
        match self {
            Constraint::Spring { stiffness, .. }
            | Constraint::Distance { stiffness, .. }
            | Constraint::Pin { stiffness, .. }
            | Constraint::Angle { stiffness, .. } => *stiffness = new_stiffness,
        }
    }

    pub fn set_damping(&mut self, new_damping: f32) {
        if let Constraint::Spring { damping, .. } = self {
            *damping = new_damping;
        }
    }

    /// Keys of every particle this constraint refers to.
    pub fn particles(&self) -> impl Iterator<Item = ParticleKey> {
        let keys = match *self {
            Constraint::Spring { a, b, .. } | Constraint::Distance { a, b, .. } => {
                [Some(a), Some(b), None]
            }
            Constraint::Pin { particle, .. } => [Some(particle), None, None],
            Constraint::Angle { a, b, c, .. } => [Some(a), Some(b), Some(c)],
        };
        keys.into_iter().flatten()
    }

    /// Check whether the constraint refers to the given particle.
    #[inline]
    pub fn involves(&self, key: ParticleKey) -> bool {
        self.particles().any(|k| k == key)
    }

    /// Apply the constraint once.
    pub fn solve(&self, particles: &mut td::Arena<Particle>) {
        match *self {
            Constraint::Spring {
                a,
                b,
                rest_length,
                stiffness,
                damping,
            } => solve_spring(particles, [a, b], rest_length, stiffness, damping),
            Constraint::Distance {
                a,
                b,
                distance,
                stiffness,
            } => solve_distance(particles, [a, b], distance, stiffness),
            Constraint::Pin {
                particle,
                anchor,
                stiffness,
            } => {
                if let Some(p) = particles.get_mut(particle.0) {
                    if !p.has_infinite_mass() {
                        p.position += (anchor - p.position) * stiffness;
                    }
                }
            }
            Constraint::Angle {
                a,
                b,
                c,
                angle,
                stiffness,
            } => solve_angle(particles, [a, b, c], angle, stiffness),
        }
    }
}

/// Copies of the particles so that they can be read together and written back one by one.
fn fetch<const N: usize>(
    particles: &td::Arena<Particle>,
    keys: [ParticleKey; N],
) -> Option<[Particle; N]> {
    let mut out = [Particle::default(); N];
    for (slot, key) in out.iter_mut().zip(keys) {
        *slot = *particles.get(key.0)?;
    }
    Some(out)
}

fn add_force(particles: &mut td::Arena<Particle>, key: ParticleKey, force: Vec2) {
    if let Some(p) = particles.get_mut(key.0) {
        if !p.has_infinite_mass() {
            p.add_force(force);
        }
    }
}

fn solve_spring(
    particles: &mut td::Arena<Particle>,
    keys: [ParticleKey; 2],
    rest_length: f32,
    stiffness: f32,
    damping: f32,
) {
    let Some([pa, pb]) = fetch(particles, keys) else {
        return;
    };
    let delta = pb.position - pa.position;
    let len = delta.mag();
    if len == 0.0 {
        return;
    }
    let dir = delta / len;

    let spring_force = -stiffness * (len - rest_length);
    let damping_force = -damping * (pb.velocity - pa.velocity).dot(dir);
    let force = dir * (spring_force + damping_force);

    add_force(particles, keys[0], -force);
    add_force(particles, keys[1], force);
}

fn solve_distance(
    particles: &mut td::Arena<Particle>,
    keys: [ParticleKey; 2],
    distance: f32,
    stiffness: f32,
) {
    let Some([pa, pb]) = fetch(particles, keys) else {
        return;
    };
    let delta = pb.position - pa.position;
    let len = delta.mag();
    if len == 0.0 {
        return;
    }

    // each side covers half of the error
    let correction = delta * ((len - distance) / len * 0.5 * stiffness);
    if let Some(a) = particles.get_mut(keys[0].0) {
        if !a.has_infinite_mass() {
            a.position += correction;
        }
    }
    if let Some(b) = particles.get_mut(keys[1].0) {
        if !b.has_infinite_mass() {
            b.position -= correction;
        }
    }
}

/// Push A and C along the perpendiculars of their arms so that the angle at B
/// moves towards `target`. B itself is left alone.
///
/// When the arms are collinear there is no "away from the other arm" side,
/// so both get the same perpendicular of `B -> A`. For a straight angle this bends
/// the chain towards one side and for a folded one it splits the arms apart;
/// either way the pair doesn't just spin around B.
fn solve_angle(
    particles: &mut td::Arena<Particle>,
    keys: [ParticleKey; 3],
    target: f32,
    stiffness: f32,
) {
    let Some([pa, pb, pc]) = fetch(particles, keys) else {
        return;
    };
    let Some(current) = angle_between(pa.position, pb.position, pc.position) else {
        return;
    };
    let dir_ba = m::normalize_or_zero(pa.position - pb.position);
    let dir_bc = m::normalize_or_zero(pc.position - pb.position);
    let magnitude = (target - current) * stiffness;

    let side = m::left_normal(dir_ba);
    let (dir_a, dir_c) = if m::cross(dir_ba, dir_bc).abs() < COLLINEAR_EPSILON {
        if current > FRAC_PI_2 {
            (side, side)
        } else {
            (side, -side)
        }
    } else {
        // perpendicular to each arm, facing away from the other arm,
        // so that a positive magnitude opens the angle
        let away_from = |arm: Vec2, other: Vec2| {
            let perp = m::left_normal(arm);
            if perp.dot(other) > 0.0 {
                -perp
            } else {
                perp
            }
        };
        (away_from(dir_ba, dir_bc), away_from(dir_bc, dir_ba))
    };

    add_force(particles, keys[0], dir_a * magnitude);
    add_force(particles, keys[2], dir_c * magnitude);
}

/// Current angle in radians at the middle particle of an angle constraint.
pub fn angle_between(a: Vec2, b: Vec2, c: Vec2) -> Option<f32> {
    let ba = a - b;
    let bc = c - b;
    let lens = ba.mag() * bc.mag();
    if lens == 0.0 {
        return None;
    }
    Some((ba.dot(bc) / lens).clamp(-1.0, 1.0).acos())
}
