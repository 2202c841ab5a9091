//! Body models, collision detection, contact resolution and the two simulation worlds.

pub mod body;
pub use body::{Mass, Velocity};

pub mod particle;
pub use particle::Particle;

pub mod rigidbody;
pub use rigidbody::{Material, RigidBody, Shape};

mod keys;
pub use keys::{BodyKey, ConstraintKey, ParticleKey};

pub mod forcefield;
pub use forcefield::ForceGenerator;

pub mod collision;

pub mod solver;
pub use solver::ParticleResolver;

pub mod constraint;
pub use constraint::Constraint;

pub mod boundary;

pub mod spawn;
pub use spawn::{ShapeKind, SpawnError, SpawnRequest};

mod world;
pub use world::ParticleWorld;

mod rigid_world;
pub use rigid_world::RigidWorld;
