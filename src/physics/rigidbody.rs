use super::{Mass, Velocity};
use crate::math::{self as m, Unit, Vec2};

/// Fraction of linear velocity kept after every integration step.
pub const LINEAR_DAMPING: f32 = 0.995;
/// Fraction of angular velocity kept after every integration step.
pub const ANGULAR_DAMPING: f32 = 0.95;
/// Linear velocities with a squared magnitude below this are snapped to zero.
pub const LINEAR_REST_THRESHOLD_SQ: f32 = 0.01;
/// Angular velocities with a magnitude below this are snapped to zero.
pub const ANGULAR_REST_THRESHOLD: f32 = 0.05;
/// Hard limit for angular velocity in radians per second.
pub const MAX_ANGULAR_VELOCITY: f32 = 15.0;

/// The physical shape of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle {
        r: f32,
    },
    /// The rect (box) shape stores its side lengths halved because this makes
    /// intersection tests easier.
    Rect {
        hw: f32,
        hh: f32,
    },
}

impl Shape {
    /// Create a rect shape from full side lengths.
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            hw: width / 2.0,
            hh: height / 2.0,
        }
    }

    /// Full width of the shape's local bounding box.
    pub fn width(&self) -> f32 {
        match *self {
            Shape::Circle { r } => 2.0 * r,
            Shape::Rect { hw, .. } => 2.0 * hw,
        }
    }

    /// Full height of the shape's local bounding box.
    pub fn height(&self) -> f32 {
        match *self {
            Shape::Circle { r } => 2.0 * r,
            Shape::Rect { hh, .. } => 2.0 * hh,
        }
    }

    /// Moment of inertia per unit of mass.
    pub fn moment_of_inertia_coef(&self) -> f32 {
        // from https://en.wikipedia.org/wiki/List_of_moments_of_inertia
        match *self {
            Shape::Circle { r } => r * r / 2.0,
            Shape::Rect { hw, hh } => (hw * hw + hh * hh) / 3.0,
        }
    }

    /// Radius of the circle used to approximate this shape,
    /// which for rects is the longer side scaled by `rect_factor`.
    pub fn bounding_radius(&self, rect_factor: f32) -> f32 {
        match *self {
            Shape::Circle { r } => r,
            Shape::Rect { hw, hh } => 2.0 * hw.max(hh) * rect_factor,
        }
    }
}

/// Determines how the surface of a body responds to collisions.
///
/// Each body has its own coefficients and pairs combine them
/// with [`restitution_with`][Self::restitution_with] and [`friction_with`][Self::friction_with].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            restitution: 0.5,
            friction: 0.3,
        }
    }
}

impl Material {
    /// Restitution between two materials, the smaller of the two.
    #[inline]
    pub fn restitution_with(&self, other: &Self) -> f32 {
        self.restitution.min(other.restitution)
    }

    /// Friction coefficient between two materials, the geometric mean of the two.
    #[inline]
    pub fn friction_with(&self, other: &Self) -> f32 {
        (self.friction * other.friction).sqrt()
    }
}

/// An oriented body with a circle or rect shape.
#[derive(Clone, Copy, Debug)]
pub struct RigidBody {
    pub position: Vec2,
    /// Orientation in radians, counterclockwise in a y-up frame.
    pub orientation: f32,
    pub velocity: Velocity,
    pub acceleration: Vec2,
    pub angular_acceleration: f32,
    pub force_accumulator: Vec2,
    pub torque_accumulator: f32,
    pub mass: Mass,
    pub moment_of_inertia: Mass,
    pub material: Material,
    pub shape: Shape,
}

impl RigidBody {
    fn new(position: Vec2, shape: Shape, mass: f32) -> Self {
        let mass = Mass::from(mass);
        let moment_of_inertia = match mass {
            Mass::Finite { mass, .. } => Mass::from(shape.moment_of_inertia_coef() * mass),
            Mass::Infinite => Mass::Infinite,
        };
        Self {
            position,
            orientation: 0.0,
            velocity: Velocity::default(),
            acceleration: Vec2::zero(),
            angular_acceleration: 0.0,
            force_accumulator: Vec2::zero(),
            torque_accumulator: 0.0,
            mass,
            moment_of_inertia,
            material: Material::default(),
            shape,
        }
    }

    /// Create a circle body. Mass of zero or less makes it static.
    /// Moment of inertia is `0.5 * mass * radius²`.
    pub fn new_circle(position: Vec2, radius: f32, mass: f32) -> Self {
        Self::new(position, Shape::Circle { r: radius }, mass)
    }

    /// Create a box body. Mass of zero or less makes it static.
    /// Moment of inertia is `mass * (width² + height²) / 12`.
    pub fn new_rect(position: Vec2, width: f32, height: f32, mass: f32) -> Self {
        Self::new(position, Shape::rect(width, height), mass)
    }

    /// Set the linear velocity of the body in a builder-like chain.
    pub fn with_velocity(mut self, linear: Vec2) -> Self {
        self.velocity.linear = linear;
        self
    }

    pub fn with_angular_velocity(mut self, angular: f32) -> Self {
        self.velocity.angular = angular;
        self
    }

    pub fn with_orientation(mut self, orientation: f32) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.material.friction = friction;
        self
    }

    // accessors

    #[inline]
    pub fn has_infinite_mass(&self) -> bool {
        self.mass.is_infinite()
    }

    #[inline]
    pub fn has_infinite_inertia(&self) -> bool {
        self.moment_of_inertia.is_infinite()
    }

    /// Returns the inverse mass of the body, which is zero if the mass is infinite.
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        self.mass.inv()
    }

    /// Returns the inverse moment of inertia, which is zero if it's infinite.
    #[inline]
    pub fn inverse_inertia(&self) -> f32 {
        self.moment_of_inertia.inv()
    }

    // forces

    #[inline]
    pub fn add_force(&mut self, force: Vec2) {
        self.force_accumulator += force;
    }

    /// Add a force applied at a world-space point, which also produces torque
    /// around the center of mass.
    pub fn add_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force_accumulator += force;
        self.add_torque(m::cross(point - self.position, force));
    }

    #[inline]
    pub fn add_torque(&mut self, torque: f32) {
        self.torque_accumulator += torque;
    }

    #[inline]
    pub fn clear_forces(&mut self) {
        self.force_accumulator = Vec2::zero();
        self.torque_accumulator = 0.0;
    }

    /// Semi-implicit Euler step with damping and rest snapping.
    ///
    /// Infinite-mass bodies aren't integrated at all,
    /// and infinite-inertia bodies skip the angular part.
    pub fn integrate(&mut self, dt: f32) {
        if self.has_infinite_mass() {
            return;
        }

        self.acceleration = self.force_accumulator * self.mass.inv();
        let vel = &mut self.velocity;
        vel.linear += self.acceleration * dt;
        vel.linear *= LINEAR_DAMPING;
        if vel.linear.mag_sq() < LINEAR_REST_THRESHOLD_SQ {
            vel.linear = Vec2::zero();
        }
        self.position += vel.linear * dt;

        if !self.moment_of_inertia.is_infinite() {
            self.angular_acceleration = self.torque_accumulator * self.moment_of_inertia.inv();
            vel.angular += self.angular_acceleration * dt;
            vel.angular *= ANGULAR_DAMPING;
            if vel.angular.abs() < ANGULAR_REST_THRESHOLD {
                vel.angular = 0.0;
            }
            vel.angular = vel
                .angular
                .clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);
            self.orientation += vel.angular * dt;
        }

        self.clear_forces();
    }

    // geometry

    /// World-space corners of a rect body in counterclockwise order
    /// starting from local `(-w/2, -h/2)`. `None` for circles.
    pub fn vertices(&self) -> Option<[Vec2; 4]> {
        let Shape::Rect { hw, hh } = self.shape else {
            return None;
        };
        let local = [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ];
        Some(local.map(|v| m::rotate(v, self.orientation) + self.position))
    }

    /// The rotated local X and Y axes of a rect body. `None` for circles.
    pub fn axes(&self) -> Option<[Unit<Vec2>; 2]> {
        if !matches!(self.shape, Shape::Rect { .. }) {
            return None;
        }
        let x = Unit::new_unchecked(m::rotate(Vec2::unit_x(), self.orientation));
        Some([x, m::unit_left_normal(x)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;
    use std::f32::consts::PI;

    #[test]
    fn circle_mass_properties() {
        let c = RigidBody::new_circle(Vec2::zero(), 10.0, 2.0);
        assert_eq!(c.inverse_mass(), 0.5);
        assert!(approx_eq(c.moment_of_inertia.value(), 100.0, 1e-4));
        assert!(approx_eq(c.inverse_inertia(), 0.01, 1e-7));
    }

    #[test]
    fn rect_mass_properties() {
        let b = RigidBody::new_rect(Vec2::zero(), 30.0, 40.0, 3.0);
        assert!(approx_eq(
            b.moment_of_inertia.value(),
            3.0 * (900.0 + 1600.0) / 12.0,
            1e-3
        ));
        assert_eq!(b.shape.width(), 30.0);
        assert_eq!(b.shape.height(), 40.0);

        let s = RigidBody::new_rect(Vec2::zero(), 30.0, 40.0, 0.0);
        assert!(s.has_infinite_mass());
        assert!(s.has_infinite_inertia());
        assert_eq!(s.inverse_mass(), 0.0);
        assert_eq!(s.inverse_inertia(), 0.0);
    }

    #[test]
    fn integration_applies_damping_and_clamps() {
        let mut b = RigidBody::new_circle(Vec2::zero(), 1.0, 1.0)
            .with_velocity(Vec2::new(10.0, 0.0))
            .with_angular_velocity(100.0);
        b.integrate(0.1);
        assert!(approx_eq(b.velocity.linear.x, 10.0 * LINEAR_DAMPING, 1e-5));
        assert_eq!(b.velocity.angular, MAX_ANGULAR_VELOCITY);
        assert!(approx_eq(b.orientation, MAX_ANGULAR_VELOCITY * 0.1, 1e-5));

        let mut slow = RigidBody::new_circle(Vec2::zero(), 1.0, 1.0)
            .with_velocity(Vec2::new(0.05, 0.05))
            .with_angular_velocity(0.04);
        slow.integrate(0.1);
        assert_eq!(slow.velocity.linear, Vec2::zero());
        assert_eq!(slow.velocity.angular, 0.0);
        assert_eq!(slow.position, Vec2::zero());
    }

    #[test]
    fn force_at_point_produces_torque() {
        let mut b = RigidBody::new_rect(Vec2::new(1.0, 1.0), 2.0, 2.0, 1.0);
        b.add_force_at_point(Vec2::new(0.0, 2.0), Vec2::new(2.0, 1.0));
        assert_eq!(b.force_accumulator, Vec2::new(0.0, 2.0));
        assert!(approx_eq(b.torque_accumulator, 2.0, 1e-6));
        b.integrate(0.01);
        assert_eq!(b.force_accumulator, Vec2::zero());
        assert_eq!(b.torque_accumulator, 0.0);
    }

    #[test]
    fn rotated_rect_geometry() {
        let b = RigidBody::new_rect(Vec2::new(5.0, 5.0), 4.0, 2.0, 1.0).with_orientation(PI / 2.0);
        let verts = b.vertices().unwrap();
        // local (-2, -1) rotated a quarter turn is (1, -2)
        assert!(approx_eq(verts[0].x, 6.0, 1e-5));
        assert!(approx_eq(verts[0].y, 3.0, 1e-5));
        let [x, y] = b.axes().unwrap();
        assert!(approx_eq(x.y, 1.0, 1e-6));
        assert!(approx_eq(y.x, -1.0, 1e-6));

        let c = RigidBody::new_circle(Vec2::zero(), 1.0, 1.0);
        assert!(c.vertices().is_none());
        assert!(c.axes().is_none());
    }

    #[test]
    fn material_combination() {
        let a = Material {
            restitution: 0.2,
            friction: 0.25,
        };
        let b = Material {
            restitution: 0.9,
            friction: 1.0,
        };
        assert_eq!(a.restitution_with(&b), 0.2);
        assert!(approx_eq(a.friction_with(&b), 0.5, 1e-6));
    }
}
