//! Collision detection for both particles and rigid bodies.

mod aabb;
pub use aabb::AABB;

pub mod grid;
pub use grid::SpatialGrid;

pub mod broadphase;
pub use broadphase::{AabbOverlap, BroadPhase, BroadPhaseMethod, BruteForce};

pub mod narrowphase;
pub use narrowphase::{
    check_circle_rect_collision, check_collision, check_rect_rect_collision,
    check_rigid_collision, intersection_check, particle_contact, BoxBoxMode, Contact,
    RigidContact,
};
