use super::{
    boundary::keep_in_bounds,
    collision::{intersection_check, BoxBoxMode, RigidContact},
    solver::resolve_rigid_contacts,
    BodyKey, RigidBody, Shape, SpawnError, SpawnRequest,
};
use crate::{
    config::{ConfigError, RigidWorldParams},
    math::Vec2,
};

use thunderdome as td;

/// A collection of circle and rect bodies under uniform gravity,
/// colliding with each other and with the edges of the area.
pub struct RigidWorld {
    bodies: td::Arena<RigidBody>,
    params: RigidWorldParams,
    contacts: Vec<RigidContact>,
    // keys in arena order, rebuilt every step
    keys: Vec<td::Index>,
}

impl RigidWorld {
    /// Create an empty world. Fails if the parameters don't pass validation.
    pub fn new(params: RigidWorldParams) -> Result<Self, ConfigError> {
        params.validate()?;
        log::debug!(
            "Creating rigid body world of size {}x{} with gravity {:?}",
            params.width,
            params.height,
            params.gravity
        );
        Ok(Self {
            bodies: td::Arena::new(),
            params,
            contacts: Vec::new(),
            keys: Vec::new(),
        })
    }

    #[inline]
    pub fn params(&self) -> &RigidWorldParams {
        &self.params
    }

    /// Validate a spawn request and add the resulting body.
    pub fn spawn(&mut self, request: SpawnRequest) -> Result<BodyKey, SpawnError> {
        match request.to_rigid_body() {
            Ok(body) => Ok(self.insert(body)),
            Err(err) => {
                log::warn!("Rejected rigid body spawn: {err}");
                Err(err)
            }
        }
    }

    /// Add a body without validation.
    pub fn insert(&mut self, body: RigidBody) -> BodyKey {
        BodyKey(self.bodies.insert(body))
    }

    pub fn remove(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key.0)
    }

    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key.0)
    }

    #[inline]
    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &RigidBody)> {
        self.bodies.iter().map(|(k, b)| (BodyKey(k), b))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyKey, &mut RigidBody)> {
        self.bodies.iter_mut().map(|(k, b)| (BodyKey(k), b))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn clear(&mut self) {
        log::debug!("Clearing {} rigid bodies", self.bodies.len());
        self.bodies.clear();
        self.contacts.clear();
    }

    /// Keep only the bodies for which the predicate returns true.
    pub fn retain(&mut self, mut pred: impl FnMut(BodyKey, &mut RigidBody) -> bool) {
        self.bodies.retain(|k, b| pred(BodyKey(k), b));
    }

    /// Remove bodies that have fallen more than `cull_margin` below the floor.
    /// Returns the number of bodies removed.
    pub fn cull_out_of_bounds(&mut self) -> usize {
        let limit = self.params.height + self.params.cull_margin;
        let before = self.bodies.len();
        self.bodies.retain(|_, b| b.position.y <= limit);
        let culled = before - self.bodies.len();
        if culled > 0 {
            log::debug!("Culled {culled} bodies below y = {limit}");
        }
        culled
    }

    //
    // settings
    //

    #[inline]
    pub fn gravity(&self) -> Vec2 {
        self.params.gravity
    }

    /// Set the gravitational acceleration. Non-finite values are ignored.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        if !(gravity.x.is_finite() && gravity.y.is_finite()) {
            log::warn!("Ignoring non-finite gravity {gravity:?}");
            return;
        }
        self.params.gravity = gravity;
    }

    #[inline]
    pub fn gravity_enabled(&self) -> bool {
        self.params.gravity_enabled
    }

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.params.gravity_enabled = enabled;
    }

    #[inline]
    pub fn collisions_enabled(&self) -> bool {
        self.params.collisions_enabled
    }

    pub fn set_collisions_enabled(&mut self, enabled: bool) {
        self.params.collisions_enabled = enabled;
    }

    pub fn set_box_mode(&mut self, mode: BoxBoxMode) {
        self.params.box_mode = mode;
    }

    //
    // simulation
    //

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let _span = tracy_span!("rigid step", "step");

        if self.params.gravity_enabled {
            let gravity = self.params.gravity;
            for (_, body) in self.bodies.iter_mut() {
                if !body.has_infinite_mass() {
                    body.add_force(gravity * body.mass.value());
                }
            }
        }

        {
            let _span = tracy_span!("integrate", "step");
            for (_, body) in self.bodies.iter_mut() {
                body.integrate(dt);
            }
        }

        if self.params.collisions_enabled && self.bodies.len() >= 2 {
            let _span = tracy_span!("rigid collisions", "step");
            self.keys.clear();
            self.keys.extend(self.bodies.iter().map(|(k, _)| k));
            for _ in 0..self.params.collision_iterations {
                self.detect_contacts();
                resolve_rigid_contacts(&mut self.bodies, &self.contacts);
            }
        }

        {
            let _span = tracy_span!("boundary", "step");
            self.apply_boundary();
        }
    }

    /// Check every pair of bodies, filling `self.contacts`.
    fn detect_contacts(&mut self) {
        self.contacts.clear();
        let box_mode = self.params.box_mode;
        for (i, &k1) in self.keys.iter().enumerate() {
            for &k2 in &self.keys[i + 1..] {
                let (Some(a), Some(b)) = (self.bodies.get(k1), self.bodies.get(k2)) else {
                    continue;
                };
                // two static bodies can't respond to each other
                if a.has_infinite_mass() && b.has_infinite_mass() {
                    continue;
                }
                let keys = [BodyKey(k1), BodyKey(k2)];
                if let Some(contact) = intersection_check(keys, a, b, box_mode) {
                    self.contacts.push(contact);
                }
            }
        }
        log::trace!("{} rigid contacts", self.contacts.len());
    }

    fn apply_boundary(&mut self) {
        let size = Vec2::new(self.params.width, self.params.height);
        let restitution = self.params.boundary_restitution;
        let floor_friction = self.params.floor_friction;
        let box_extent_factor = self.params.box_extent_factor;

        for (_, body) in self.bodies.iter_mut() {
            if body.has_infinite_mass() {
                continue;
            }
            let extent = match body.shape {
                Shape::Circle { r } => r,
                Shape::Rect { .. } => {
                    body.shape.width().max(body.shape.height()) * box_extent_factor
                }
            };
            let hits = keep_in_bounds(
                &mut body.position,
                &mut body.velocity.linear,
                extent,
                size,
                restitution,
            );
            if hits.bottom {
                body.velocity.linear.x *= floor_friction;
                body.velocity.angular *= floor_friction;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn world() -> RigidWorld {
        RigidWorld::new(RigidWorldParams::default()).unwrap()
    }

    #[test]
    fn circle_comes_to_rest_on_static_box() {
        let mut w = world();
        let ball = w
            .spawn(
                SpawnRequest::circle(Vec2::new(400.0, 400.0), 10.0, 1.0).with_restitution(0.0),
            )
            .unwrap();
        let floor = w
            .spawn(SpawnRequest::rect(Vec2::new(400.0, 500.0), 200.0, 20.0, 0.0))
            .unwrap();

        for _ in 0..240 {
            w.step(1.0 / 60.0);
        }

        let ball = w.get(ball).unwrap();
        assert!(ball.velocity.linear.mag() < 0.1);
        // top surface of the floor is at y = 490
        assert!(ball.position.y + 10.0 <= 491.0);
        assert!(ball.position.y + 10.0 >= 485.0);
        assert_eq!(w.get(floor).unwrap().position, Vec2::new(400.0, 500.0));
    }

    #[test]
    fn static_bodies_never_move() {
        let mut w = world();
        let a = w
            .spawn(SpawnRequest::rect(Vec2::new(300.0, 300.0), 50.0, 50.0, 0.0))
            .unwrap();
        let b = w
            .spawn(SpawnRequest::circle(Vec2::new(320.0, 300.0), 20.0, -1.0))
            .unwrap();
        w.spawn(
            SpawnRequest::circle(Vec2::new(300.0, 250.0), 10.0, 1.0)
                .with_velocity(Vec2::new(0.0, 200.0)),
        )
        .unwrap();

        for _ in 0..60 {
            w.step(1.0 / 60.0);
        }

        assert_eq!(w.get(a).unwrap().position, Vec2::new(300.0, 300.0));
        assert_eq!(w.get(a).unwrap().orientation, 0.0);
        assert_eq!(w.get(b).unwrap().position, Vec2::new(320.0, 300.0));
    }

    #[test]
    fn spawned_circle_has_expected_mass_properties() {
        let mut w = world();
        let key = w
            .spawn(SpawnRequest::circle(Vec2::new(100.0, 100.0), 10.0, 2.0))
            .unwrap();
        let body = w.get(key).unwrap();
        assert_eq!(body.inverse_mass(), 0.5);
        assert!(approx_eq(body.moment_of_inertia.value(), 100.0, 1e-4));
        assert!(approx_eq(body.inverse_inertia(), 0.01, 1e-6));
    }

    #[test]
    fn floor_reflects_and_slows_bodies() {
        let mut w = RigidWorld::new(RigidWorldParams {
            gravity_enabled: false,
            ..Default::default()
        })
        .unwrap();
        let key = w
            .spawn(
                SpawnRequest::rect(Vec2::new(400.0, 585.0), 20.0, 10.0, 1.0)
                    .with_velocity(Vec2::new(100.0, 300.0)),
            )
            .unwrap();

        w.step(0.01);

        let body = w.get(key).unwrap();
        // rects are kept in by max(w, h) * 0.7
        assert!(approx_eq(body.position.y, 586.0, 1e-3));
        assert!(body.velocity.linear.y < 0.0);
        assert!(body.velocity.linear.x < 100.0 * 0.995);
    }

    #[test]
    fn culling_removes_fallen_bodies() {
        let mut w = world();
        let low = w.insert(RigidBody::new_circle(Vec2::new(100.0, 801.0), 5.0, 1.0));
        let high = w.insert(RigidBody::new_circle(Vec2::new(100.0, 799.0), 5.0, 1.0));

        assert_eq!(w.cull_out_of_bounds(), 1);
        assert!(w.get(low).is_none());
        assert!(w.get(high).is_some());
        assert_eq!(w.len(), 1);

        w.retain(|_, b| b.position.x > 1000.0);
        assert!(w.is_empty());
    }

    #[test]
    fn toggles_and_removal() {
        let mut w = world();
        w.set_gravity_enabled(false);
        w.set_gravity(Vec2::new(f32::NAN, 0.0));
        assert_eq!(w.gravity(), Vec2::new(0.0, 400.0));

        let key = w
            .spawn(SpawnRequest::circle(Vec2::new(100.0, 100.0), 5.0, 1.0))
            .unwrap();
        w.step(0.016);
        assert_eq!(w.get(key).unwrap().position, Vec2::new(100.0, 100.0));

        assert!(w.remove(key).is_some());
        assert!(w.remove(key).is_none());
        assert!(w
            .spawn(SpawnRequest::rect(Vec2::zero(), 0.0, 1.0, 1.0))
            .is_err());
        assert!(w.is_empty());
    }
}
