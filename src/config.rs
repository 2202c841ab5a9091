//! Parameters for creating worlds, with validation and optional loading from RON.

use crate::{
    math::Vec2,
    physics::collision::{BoxBoxMode, BroadPhaseMethod, SpatialGrid},
};

/// Largest timestep [`clamp_timestep`] lets through, in seconds.
pub const MAX_TIMESTEP: f32 = 0.02;

/// Clamp a frame time to `[0, MAX_TIMESTEP]`.
///
/// Long frames (e.g. after the window was dragged) would otherwise
/// make bodies tunnel through each other. NaN becomes zero.
#[inline]
pub fn clamp_timestep(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, MAX_TIMESTEP)
}

/// Error when world parameters are invalid or can't be loaded.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for `{name}`: {reason}")]
    InvalidParam {
        name: &'static str,
        reason: &'static str,
    },
    #[error("Failed to read the config file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse RON: {0}")]
    Parse(String),
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam {
            name,
            reason: "must be finite and greater than zero",
        })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam {
            name,
            reason: "must be finite and not negative",
        })
    }
}

fn check_iterations(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam {
            name,
            reason: "must be at least one",
        })
    }
}

#[cfg(feature = "serde-types")]
fn parse_ron<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, ConfigError> {
    ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
}

/// Parameters for a [`ParticleWorld`][crate::physics::ParticleWorld].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct ParticleWorldParams {
    /// Width of the simulation area starting from x = 0.
    pub width: f32,
    /// Height of the simulation area starting from y = 0.
    pub height: f32,
    /// Side length of spatial grid cells. Should be at least the diameter of the largest particle.
    pub cell_size: f32,
    /// How many times every constraint is solved per step.
    pub constraint_iterations: usize,
    /// Restitution of particle-particle contacts.
    pub restitution: f32,
    /// Fraction of velocity kept when bouncing off the edges of the area.
    pub boundary_restitution: f32,
    /// Collisions between particles are off by default; constraint systems usually don't want them.
    pub collisions_enabled: bool,
    /// Whether gravity generators are applied.
    pub gravity_enabled: bool,
    pub broad_phase: BroadPhaseMethod,
}

impl Default for ParticleWorldParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            cell_size: 50.0,
            constraint_iterations: 3,
            restitution: 0.7,
            boundary_restitution: 0.6,
            collisions_enabled: false,
            gravity_enabled: true,
            broad_phase: BroadPhaseMethod::Grid,
        }
    }
}

impl ParticleWorldParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("width", self.width)?;
        check_positive("height", self.height)?;
        check_positive("cell_size", self.cell_size)?;
        if SpatialGrid::dimensions(self.width, self.height, self.cell_size).is_none() {
            return Err(ConfigError::InvalidParam {
                name: "cell_size",
                reason: "too small for the area, the spatial grid would have too many cells",
            });
        }
        check_iterations("constraint_iterations", self.constraint_iterations)?;
        check_non_negative("restitution", self.restitution)?;
        check_non_negative("boundary_restitution", self.boundary_restitution)?;
        Ok(())
    }

    /// Parse parameters from RON text. Missing fields get their default values.
    #[cfg(feature = "serde-types")]
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let params: Self = parse_ron(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a RON file. Missing fields get their default values.
    #[cfg(feature = "serde-types")]
    pub fn read_ron_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

/// Parameters for a [`RigidWorld`][crate::physics::RigidWorld].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct RigidWorldParams {
    pub width: f32,
    pub height: f32,
    /// Gravitational acceleration. Positive y is down.
    pub gravity: Vec2,
    pub gravity_enabled: bool,
    pub collisions_enabled: bool,
    /// How many detect and resolve passes over all pairs are done per step.
    pub collision_iterations: usize,
    /// Fraction of velocity kept when bouncing off the edges of the area.
    pub boundary_restitution: f32,
    /// Multiplier for horizontal and angular velocity when a body hits the floor.
    pub floor_friction: f32,
    /// Rects are kept in bounds as if they were circles
    /// with radius `max(width, height) * box_extent_factor`.
    pub box_extent_factor: f32,
    /// Bodies further than this below the floor are removed by
    /// [`cull_out_of_bounds`][crate::physics::RigidWorld::cull_out_of_bounds].
    pub cull_margin: f32,
    pub box_mode: BoxBoxMode,
}

impl Default for RigidWorldParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            gravity: Vec2::new(0.0, 400.0),
            gravity_enabled: true,
            collisions_enabled: true,
            collision_iterations: 2,
            boundary_restitution: 0.5,
            floor_friction: 0.95,
            box_extent_factor: 0.7,
            cull_margin: 200.0,
            box_mode: BoxBoxMode::default(),
        }
    }
}

impl RigidWorldParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("width", self.width)?;
        check_positive("height", self.height)?;
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(ConfigError::InvalidParam {
                name: "gravity",
                reason: "must be finite",
            });
        }
        check_iterations("collision_iterations", self.collision_iterations)?;
        check_non_negative("boundary_restitution", self.boundary_restitution)?;
        check_non_negative("floor_friction", self.floor_friction)?;
        check_positive("box_extent_factor", self.box_extent_factor)?;
        check_non_negative("cull_margin", self.cull_margin)?;
        if let BoxBoxMode::BoundingCircle { radius_factor } = self.box_mode {
            check_positive("box_mode.radius_factor", radius_factor)?;
        }
        Ok(())
    }

    /// Parse parameters from RON text. Missing fields get their default values.
    #[cfg(feature = "serde-types")]
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let params: Self = parse_ron(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a RON file. Missing fields get their default values.
    #[cfg(feature = "serde-types")]
    pub fn read_ron_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestep_is_clamped() {
        assert_eq!(clamp_timestep(0.5), MAX_TIMESTEP);
        assert_eq!(clamp_timestep(0.016), 0.016);
        assert_eq!(clamp_timestep(-1.0), 0.0);
        assert_eq!(clamp_timestep(f32::NAN), 0.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ParticleWorldParams::default().validate().is_ok());
        assert!(RigidWorldParams::default().validate().is_ok());
    }

    #[test]
    fn invalid_values_are_named() {
        let params = ParticleWorldParams {
            cell_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidParam {
                name: "cell_size",
                ..
            })
        ));

        for cell_size in [1e-30, 0.01] {
            let params = ParticleWorldParams {
                cell_size,
                ..Default::default()
            };
            assert!(matches!(
                params.validate(),
                Err(ConfigError::InvalidParam {
                    name: "cell_size",
                    ..
                })
            ));
        }

        let params = RigidWorldParams {
            collision_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidParam {
                name: "collision_iterations",
                ..
            })
        ));

        let params = RigidWorldParams {
            gravity: Vec2::new(0.0, f32::INFINITY),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[cfg(feature = "serde-types")]
    #[test]
    fn ron_fills_in_defaults() {
        let params = ParticleWorldParams::from_ron_str(
            "(width: 1024.0, constraint_iterations: 8, broad_phase: Aabb)",
        )
        .unwrap();
        assert_eq!(params.width, 1024.0);
        assert_eq!(params.constraint_iterations, 8);
        assert_eq!(params.broad_phase, BroadPhaseMethod::Aabb);
        assert_eq!(params.height, 600.0);

        let params = RigidWorldParams::from_ron_str(
            "(collision_iterations: 4, box_mode: SeparatingAxis)",
        )
        .unwrap();
        assert_eq!(params.collision_iterations, 4);
        assert_eq!(params.box_mode, BoxBoxMode::SeparatingAxis);
        assert_eq!(params.gravity, Vec2::new(0.0, 400.0));
    }

    #[cfg(feature = "serde-types")]
    #[test]
    fn ron_errors() {
        assert!(matches!(
            ParticleWorldParams::from_ron_str("(width: "),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ParticleWorldParams::from_ron_str("(height: -5.0)"),
            Err(ConfigError::InvalidParam { name: "height", .. })
        ));
        assert!(matches!(
            RigidWorldParams::read_ron_file("this/file/does/not/exist.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
