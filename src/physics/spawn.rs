//! Requests for adding bodies to a world, checked before anything is inserted.

use super::{Particle, RigidBody};
use crate::math::Vec2;

/// Error when a spawn request can't be turned into a body.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum SpawnError {
    #[error("`{0}` must be finite")]
    NonFinite(&'static str),
    #[error("`{0}` must be greater than zero")]
    NonPositiveSize(&'static str),
    #[error("`{name}` must be finite and not negative, got {value}")]
    InvalidCoefficient { name: &'static str, value: f32 },
    #[error("Particle worlds can only hold circles")]
    UnsupportedShape,
}

/// Shape and size of a body to spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum ShapeKind {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

/// Description of a body to be added to a world.
///
/// Created with [`circle`][Self::circle] or [`rect`][Self::rect]
/// and refined with the `with_` methods.
/// Restitution and friction left unset use the [`Material`][super::Material] defaults.
/// Particles have no rotation or surface material,
/// so those fields are ignored when spawning into a particle world.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub struct SpawnRequest {
    pub shape: ShapeKind,
    pub position: Vec2,
    /// Zero or less spawns a static body.
    pub mass: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub restitution: Option<f32>,
    pub friction: Option<f32>,
}

impl SpawnRequest {
    pub fn circle(position: Vec2, radius: f32, mass: f32) -> Self {
        Self::new(ShapeKind::Circle { radius }, position, mass)
    }

    pub fn rect(position: Vec2, width: f32, height: f32, mass: f32) -> Self {
        Self::new(ShapeKind::Rect { width, height }, position, mass)
    }

    fn new(shape: ShapeKind, position: Vec2, mass: f32) -> Self {
        Self {
            shape,
            position,
            mass,
            velocity: Vec2::zero(),
            angular_velocity: 0.0,
            restitution: None,
            friction: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Check that every value of the request is usable.
    pub fn validate(&self) -> Result<(), SpawnError> {
        let finite = |name: &'static str, v: f32| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(SpawnError::NonFinite(name))
            }
        };
        let positive = |name: &'static str, v: f32| -> Result<(), SpawnError> {
            finite(name, v)?;
            if v > 0.0 {
                Ok(())
            } else {
                Err(SpawnError::NonPositiveSize(name))
            }
        };
        let coefficient = |name: &'static str, v: Option<f32>| match v {
            Some(value) if !(value.is_finite() && value >= 0.0) => {
                Err(SpawnError::InvalidCoefficient { name, value })
            }
            _ => Ok(()),
        };

        finite("position.x", self.position.x)?;
        finite("position.y", self.position.y)?;
        finite("velocity.x", self.velocity.x)?;
        finite("velocity.y", self.velocity.y)?;
        finite("angular_velocity", self.angular_velocity)?;
        if self.mass.is_nan() {
            return Err(SpawnError::NonFinite("mass"));
        }
        match self.shape {
            ShapeKind::Circle { radius } => positive("radius", radius)?,
            ShapeKind::Rect { width, height } => {
                positive("width", width)?;
                positive("height", height)?;
            }
        }
        coefficient("restitution", self.restitution)?;
        coefficient("friction", self.friction)?;
        Ok(())
    }

    /// Validate the request and build a rigid body from it.
    pub fn to_rigid_body(self) -> Result<RigidBody, SpawnError> {
        self.validate()?;
        let body = match self.shape {
            ShapeKind::Circle { radius } => RigidBody::new_circle(self.position, radius, self.mass),
            ShapeKind::Rect { width, height } => {
                RigidBody::new_rect(self.position, width, height, self.mass)
            }
        };
        let mut body = body
            .with_velocity(self.velocity)
            .with_angular_velocity(self.angular_velocity);
        if let Some(restitution) = self.restitution {
            body.material.restitution = restitution;
        }
        if let Some(friction) = self.friction {
            body.material.friction = friction;
        }
        Ok(body)
    }

    /// Validate the request and build a particle from it. Only circles can become particles.
    pub fn to_particle(self) -> Result<Particle, SpawnError> {
        self.validate()?;
        let ShapeKind::Circle { radius } = self.shape else {
            return Err(SpawnError::UnsupportedShape);
        };
        Ok(Particle::new(self.position, self.mass, radius).with_velocity(self.velocity))
    }
}
