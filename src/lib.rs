//! A 2D physics core with two pipelines:
//! point-mass particles driven by force generators and constraints ([`ParticleWorld`]),
//! and oriented circle and rect bodies driven by contact impulses ([`RigidWorld`]).
//!
//! Neither world installs a logger or owns a clock.
//! The caller supplies the timestep, optionally through [`clamp_timestep`].

// profiling spans that compile to nothing unless the `tracy` feature is on
macro_rules! tracy_span {
    ($name:literal, $fn_name:literal) => {
        tracy_client::Client::running()
            .map(|client| client.span_alloc(Some($name), $fn_name, file!(), line!(), 0))
    };
}

pub mod math;
pub use math::{uv, Angle, Unit, Vec2};

pub mod config;
pub use config::{
    clamp_timestep, ConfigError, ParticleWorldParams, RigidWorldParams, MAX_TIMESTEP,
};

pub mod physics;
pub use physics::{
    body::{Mass, Velocity},
    collision::{self, BoxBoxMode, BroadPhaseMethod, Contact, RigidContact, AABB},
    constraint::Constraint,
    forcefield::ForceGenerator,
    particle::Particle,
    rigidbody::{Material, RigidBody, Shape},
    spawn::{ShapeKind, SpawnError, SpawnRequest},
    BodyKey, ConstraintKey, ParticleKey, ParticleWorld, RigidWorld,
};
