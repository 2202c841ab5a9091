//! Sequential impulse contact resolution for particles and rigid bodies.
//!
//! Contacts are resolved one at a time in the order given,
//! each borrowing its two bodies mutably only while it's being resolved.

use super::{
    collision::{Contact, RigidContact},
    Particle, RigidBody,
};
use crate::math::{self as m, Vec2};

use thunderdome as td;

/// Default restitution of particle contacts.
pub const DEFAULT_PARTICLE_RESTITUTION: f32 = 0.7;

/// Contacts closing slower than this get zero restitution so that resting bodies don't jitter.
pub const RESTING_CONTACT_THRESHOLD: f32 = 1.0;
/// Contacts with an effective mass denominator below this are skipped.
pub const MIN_DENOMINATOR: f32 = 0.0001;
/// Limit for the magnitude of a normal impulse.
pub const MAX_IMPULSE: f32 = 1000.0;
/// Limit for the angular velocity change one contact can cause in one body.
pub const MAX_ANGULAR_IMPULSE: f32 = 10.0;
/// Tangential speeds below this don't get friction.
pub const MIN_TANGENT_SPEED: f32 = 0.001;
/// Scale of the angular part of friction impulses.
pub const FRICTION_ANGULAR_FACTOR: f32 = 0.5;
/// Penetration allowed to remain after positional correction.
pub const PENETRATION_SLOP: f32 = 0.01;
/// Fraction of penetration beyond the slop corrected per contact.
pub const CORRECTION_PERCENT: f32 = 0.8;

//
// Particles
//

/// Resolves particle contacts with a single restitution coefficient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleResolver {
    pub restitution: f32,
}

impl Default for ParticleResolver {
    fn default() -> Self {
        Self {
            restitution: DEFAULT_PARTICLE_RESTITUTION,
        }
    }
}

impl ParticleResolver {
    pub fn new(restitution: f32) -> Self {
        Self { restitution }
    }

    /// Apply an impulse along the contact normal so that the particles separate
    /// with `restitution` times their closing velocity.
    /// Nothing happens if they're already separating.
    pub fn resolve_velocity(&self, a: &mut Particle, b: &mut Particle, contact: &Contact) {
        let normal = *contact.normal;
        let separating_vel = (b.velocity - a.velocity).dot(normal);
        if separating_vel > 0.0 {
            return;
        }

        let total_inv_mass = a.inverse_mass() + b.inverse_mass();
        if total_inv_mass <= 0.0 {
            return;
        }

        let target_vel = -separating_vel * self.restitution;
        let impulse = (target_vel - separating_vel) / total_inv_mass;
        a.velocity -= normal * (impulse * a.inverse_mass());
        b.velocity += normal * (impulse * b.inverse_mass());
    }

    /// Move the particles apart along the normal by the full penetration depth,
    /// split by their inverse masses.
    pub fn resolve_interpenetration(&self, a: &mut Particle, b: &mut Particle, contact: &Contact) {
        if contact.penetration <= 0.0 {
            return;
        }

        let total_inv_mass = a.inverse_mass() + b.inverse_mass();
        if total_inv_mass <= 0.0 {
            return;
        }

        let move_per_inv_mass = *contact.normal * (contact.penetration / total_inv_mass);
        a.position -= move_per_inv_mass * a.inverse_mass();
        b.position += move_per_inv_mass * b.inverse_mass();
    }

    pub fn resolve_contact(&self, a: &mut Particle, b: &mut Particle, contact: &Contact) {
        self.resolve_velocity(a, b, contact);
        self.resolve_interpenetration(a, b, contact);
    }

    /// Resolve contacts in order. Contacts referring to removed particles are skipped.
    pub fn resolve_contacts(&self, particles: &mut td::Arena<Particle>, contacts: &[Contact]) {
        for contact in contacts {
            let [k1, k2] = contact.keys;
            if k1 == k2 {
                continue;
            }
            if let (Some(a), Some(b)) = particles.get2_mut(k1.0, k2.0) {
                self.resolve_contact(a, b, contact);
            }
        }
    }
}

//
// Rigid bodies
//

/// Offsets from the centers of mass of both bodies to the contact point.
#[inline]
fn lever_arms(a: &RigidBody, b: &RigidBody, contact: &RigidContact) -> (Vec2, Vec2) {
    (contact.point - a.position, contact.point - b.position)
}

#[inline]
fn relative_velocity(a: &RigidBody, b: &RigidBody, r_a: Vec2, r_b: Vec2) -> Vec2 {
    b.velocity.point_velocity(r_b) - a.velocity.point_velocity(r_a)
}

/// Apply a normal impulse with restitution followed by a friction impulse
/// to two rigid bodies at the contact point.
pub fn resolve_rigid_velocity(a: &mut RigidBody, b: &mut RigidBody, contact: &RigidContact) {
    let normal = *contact.normal;
    let (r_a, r_b) = lever_arms(a, b, contact);

    let separating_vel = relative_velocity(a, b, r_a, r_b).dot(normal);
    if separating_vel > 0.0 {
        return;
    }

    let restitution = if separating_vel.abs() < RESTING_CONTACT_THRESHOLD {
        0.0
    } else {
        a.material.restitution_with(&b.material)
    };

    let r_a_cross_n = m::cross(r_a, normal);
    let r_b_cross_n = m::cross(r_b, normal);
    let denominator = a.inverse_mass()
        + b.inverse_mass()
        + r_a_cross_n * r_a_cross_n * a.inverse_inertia()
        + r_b_cross_n * r_b_cross_n * b.inverse_inertia();
    if denominator < MIN_DENOMINATOR {
        return;
    }

    let impulse =
        (-(1.0 + restitution) * separating_vel / denominator).clamp(-MAX_IMPULSE, MAX_IMPULSE);
    let impulse_vec = normal * impulse;

    a.velocity.linear -= impulse_vec * a.inverse_mass();
    b.velocity.linear += impulse_vec * b.inverse_mass();
    let ang_a = (m::cross(r_a, impulse_vec) * a.inverse_inertia())
        .clamp(-MAX_ANGULAR_IMPULSE, MAX_ANGULAR_IMPULSE);
    let ang_b = (m::cross(r_b, impulse_vec) * b.inverse_inertia())
        .clamp(-MAX_ANGULAR_IMPULSE, MAX_ANGULAR_IMPULSE);
    a.velocity.angular -= ang_a;
    b.velocity.angular += ang_b;

    // friction with velocities after the normal impulse

    let tangent = m::left_normal(normal);
    let tangent_vel = relative_velocity(a, b, r_a, r_b).dot(tangent);
    if tangent_vel.abs() < MIN_TANGENT_SPEED {
        return;
    }

    let max_friction = a.material.friction_with(&b.material) * impulse.abs();
    let friction_impulse = (-tangent_vel / denominator).clamp(-max_friction, max_friction);
    let friction_vec = tangent * friction_impulse;

    a.velocity.linear -= friction_vec * a.inverse_mass();
    b.velocity.linear += friction_vec * b.inverse_mass();
    a.velocity.angular -=
        m::cross(r_a, friction_vec) * a.inverse_inertia() * FRICTION_ANGULAR_FACTOR;
    b.velocity.angular +=
        m::cross(r_b, friction_vec) * b.inverse_inertia() * FRICTION_ANGULAR_FACTOR;
}

/// Push two rigid bodies apart along the contact normal,
/// leaving a small amount of penetration for contact stability.
pub fn resolve_rigid_interpenetration(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &RigidContact,
) {
    let correction = (contact.penetration - PENETRATION_SLOP).max(0.0) * CORRECTION_PERCENT;
    if correction <= 0.0 {
        return;
    }

    let total_inv_mass = a.inverse_mass() + b.inverse_mass();
    if total_inv_mass <= 0.0 {
        return;
    }

    let correction_vec = *contact.normal * (correction / total_inv_mass);
    a.position -= correction_vec * a.inverse_mass();
    b.position += correction_vec * b.inverse_mass();
}

pub fn resolve_rigid_contact(a: &mut RigidBody, b: &mut RigidBody, contact: &RigidContact) {
    resolve_rigid_velocity(a, b, contact);
    resolve_rigid_interpenetration(a, b, contact);
}

/// Resolve contacts in order. Contacts referring to removed bodies are skipped.
pub fn resolve_rigid_contacts(bodies: &mut td::Arena<RigidBody>, contacts: &[RigidContact]) {
    for contact in contacts {
        let [k1, k2] = contact.keys;
        if k1 == k2 {
            continue;
        }
        if let (Some(a), Some(b)) = bodies.get2_mut(k1.0, k2.0) {
            resolve_rigid_contact(a, b, contact);
        }
    }
}
