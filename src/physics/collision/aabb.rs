use crate::{math::Vec2, physics::Particle};

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub struct AABB {
    pub min: Vec2,
    pub max: Vec2,
}

impl AABB {
    #[inline]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// The smallest AABB containing a circle.
    #[inline]
    pub fn around_circle(center: Vec2, r: f32) -> Self {
        let extent = Vec2::new(r, r);
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    #[inline]
    pub fn from_particle(particle: &Particle) -> Self {
        Self::around_circle(particle.position, particle.radius)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether two boxes overlap. Boxes that only touch at the edge count as overlapping.
    #[inline]
    pub fn intersects(&self, other: &AABB) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    /// Check whether a point is inside the box, edges included.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = AABB::new(Vec2::zero(), Vec2::new(1.0, 1.0));
        let b = AABB::new(Vec2::new(1.0, 0.5), Vec2::new(2.0, 2.0));
        let c = AABB::new(Vec2::new(1.01, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn particle_box() {
        let p = Particle::new(Vec2::new(10.0, 20.0), 1.0, 5.0);
        let aabb = AABB::from_particle(&p);
        assert_eq!(aabb.min, Vec2::new(5.0, 15.0));
        assert_eq!(aabb.width(), 10.0);
        assert_eq!(aabb.height(), 10.0);
        assert!(aabb.contains(Vec2::new(15.0, 25.0)));
        assert!(!aabb.contains(Vec2::new(15.1, 25.0)));
    }
}
