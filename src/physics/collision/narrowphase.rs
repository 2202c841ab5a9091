use crate::{
    math::{self as m, Unit, Vec2},
    physics::{BodyKey, Particle, ParticleKey, RigidBody, Shape},
};

/// Centers closer than this are considered coincident
/// and get a fixed normal instead of a normalized offset.
pub const COINCIDENT_DISTANCE: f32 = 0.001;
/// Rect edges shorter than this are ignored by circle-rect tests.
pub const MIN_EDGE_LENGTH: f32 = 0.001;
/// Default scale applied to the longer side of a rect
/// to get the radius of the circle approximating it.
pub const DEFAULT_RECT_RADIUS_FACTOR: f32 = 0.5;

/// Normal used for particles in the exact same position.
const COINCIDENT_PARTICLE_NORMAL: Unit<Vec2> = Unit::new_unchecked(Vec2 { x: 1.0, y: 0.0 });
/// Normal used for rigid bodies in (almost) the same position, straight down the y axis.
const COINCIDENT_BODY_NORMAL: Unit<Vec2> = Unit::new_unchecked(Vec2 { x: 0.0, y: -1.0 });

/// An intersection between two particles.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub keys: [ParticleKey; 2],
    /// The normal, facing away from the first particle
    pub normal: Unit<Vec2>,
    /// Penetration depth
    pub penetration: f32,
}

/// An intersection between two rigid bodies.
#[derive(Clone, Copy, Debug)]
pub struct RigidContact {
    pub keys: [BodyKey; 2],
    /// Point of contact in world space, used to compute lever arms
    pub point: Vec2,
    /// The normal, facing away from the first body
    pub normal: Unit<Vec2>,
    /// Penetration depth
    pub penetration: f32,
}

/// How rect-rect pairs are tested.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum BoxBoxMode {
    /// Treat both rects as circles with radius `max(width, height) * radius_factor`.
    /// Cheap and stable for stacks but ignores orientation.
    BoundingCircle { radius_factor: f32 },
    /// Exact test on the four face axes of the two rects.
    SeparatingAxis,
}

impl Default for BoxBoxMode {
    fn default() -> Self {
        BoxBoxMode::BoundingCircle {
            radius_factor: DEFAULT_RECT_RADIUS_FACTOR,
        }
    }
}

impl BoxBoxMode {
    fn radius_factor(&self) -> f32 {
        match self {
            BoxBoxMode::BoundingCircle { radius_factor } => *radius_factor,
            BoxBoxMode::SeparatingAxis => DEFAULT_RECT_RADIUS_FACTOR,
        }
    }
}

//
// particles
//

/// Check whether two particles overlap.
#[inline]
pub fn check_collision(a: &Particle, b: &Particle) -> bool {
    m::distance(a.position, b.position) < a.radius + b.radius
}

/// Generate a contact between two particles if they overlap.
pub fn particle_contact(keys: [ParticleKey; 2], a: &Particle, b: &Particle) -> Option<Contact> {
    let delta = b.position - a.position;
    let dist = delta.mag();
    let r_sum = a.radius + b.radius;
    if dist >= r_sum {
        return None;
    }

    let normal = if dist == 0.0 {
        COINCIDENT_PARTICLE_NORMAL
    } else {
        Unit::new_unchecked(delta / dist)
    };

    Some(Contact {
        keys,
        normal,
        penetration: r_sum - dist,
    })
}

//
// rigid bodies
//

// Intermediate structure without keys so the shape functions don't have to carry them around
struct Contact_ {
    normal: Unit<Vec2>,
    penetration: f32,
    point: Vec2,
}

/// Check two rigid bodies for intersection and generate a contact if they overlap.
///
/// The contact normal always points from the first body to the second.
pub fn intersection_check(
    keys: [BodyKey; 2],
    a: &RigidBody,
    b: &RigidBody,
    box_mode: BoxBoxMode,
) -> Option<RigidContact> {
    let complete = |c: Contact_| RigidContact {
        keys,
        point: c.point,
        normal: c.normal,
        penetration: c.penetration,
    };

    use Shape::*;
    let contact = match (a.shape, b.shape) {
        (Circle { r: r1 }, Circle { r: r2 }) => circle_circle(a.position, r1, b.position, r2),
        (Circle { r }, Rect { .. }) => circle_rect(a.position, r, b).map(flip_contact),
        (Rect { .. }, Circle { r }) => circle_rect(b.position, r, a),
        (Rect { .. }, Rect { .. }) => match box_mode {
            BoxBoxMode::BoundingCircle { radius_factor } => circle_circle(
                a.position,
                a.shape.bounding_radius(radius_factor),
                b.position,
                b.shape.bounding_radius(radius_factor),
            ),
            BoxBoxMode::SeparatingAxis => rect_rect(a, b),
        },
    }?;

    Some(complete(contact))
}

/// Check whether two rigid bodies overlap without generating a contact.
pub fn check_rigid_collision(a: &RigidBody, b: &RigidBody, box_mode: BoxBoxMode) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { r: r1 }, Shape::Circle { r: r2 }) => {
            m::distance(a.position, b.position) < r1 + r2
        }
        (Shape::Circle { .. }, Shape::Rect { .. }) => check_circle_rect_collision(a, b),
        (Shape::Rect { .. }, Shape::Circle { .. }) => check_circle_rect_collision(b, a),
        (Shape::Rect { .. }, Shape::Rect { .. }) => match box_mode {
            BoxBoxMode::SeparatingAxis => rect_rect(a, b).is_some(),
            _ => check_rect_rect_collision(a, b, box_mode.radius_factor()),
        },
    }
}

/// Check whether a circle body is within its radius of any edge of a rect body.
///
/// Like the contact generation, this only looks at the edges,
/// so a small circle entirely inside a big rect is not detected.
/// Returns false if the shapes aren't a circle and a rect.
pub fn check_circle_rect_collision(circle: &RigidBody, rect: &RigidBody) -> bool {
    let (Shape::Circle { r }, Some(verts)) = (circle.shape, rect.vertices()) else {
        return false;
    };
    let hit = edges(&verts).any(|(p1, p2)| {
        closest_on_segment(circle.position, p1, p2)
            .map_or(false, |c| m::distance(circle.position, c) < r)
    });
    hit
}

/// Bounding circle test between two rects with the given radius factor.
/// Returns false if either body is not a rect.
pub fn check_rect_rect_collision(a: &RigidBody, b: &RigidBody, radius_factor: f32) -> bool {
    if !matches!((a.shape, b.shape), (Shape::Rect { .. }, Shape::Rect { .. })) {
        return false;
    }
    let r_sum = a.shape.bounding_radius(radius_factor) + b.shape.bounding_radius(radius_factor);
    m::distance(a.position, b.position) < r_sum
}

fn flip_contact(c: Contact_) -> Contact_ {
    Contact_ {
        normal: -c.normal,
        ..c
    }
}

fn circle_circle(pos1: Vec2, r1: f32, pos2: Vec2, r2: f32) -> Option<Contact_> {
    let delta = pos2 - pos1;
    let dist = delta.mag();
    let r_sum = r1 + r2;
    if dist >= r_sum {
        return None;
    }

    let normal =
        Unit::try_new_normalize(delta, COINCIDENT_DISTANCE).unwrap_or(COINCIDENT_BODY_NORMAL);

    Some(Contact_ {
        normal,
        penetration: r_sum - dist,
        point: pos1 + *normal * r1,
    })
}

/// Edges of a rect as pairs of consecutive vertices.
fn edges(verts: &[Vec2; 4]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    (0..4).map(move |i| (verts[i], verts[(i + 1) % 4]))
}

/// Closest point to `point` on the segment from `p1` to `p2`,
/// or `None` if the segment is degenerate.
fn closest_on_segment(point: Vec2, p1: Vec2, p2: Vec2) -> Option<Vec2> {
    let edge = p2 - p1;
    let len_sq = edge.mag_sq();
    if len_sq < MIN_EDGE_LENGTH * MIN_EDGE_LENGTH {
        return None;
    }
    let t = ((point - p1).dot(edge) / len_sq).clamp(0.0, 1.0);
    Some(p1 + edge * t)
}

/// Contact between a circle and a rect body with the normal pointing from the rect to the circle.
fn circle_rect(circle_pos: Vec2, r: f32, rect: &RigidBody) -> Option<Contact_> {
    let verts = rect.vertices()?;

    // closest edge point, its distance and the outward normal of its edge
    let mut best: Option<(Vec2, f32, Vec2)> = None;
    for (p1, p2) in edges(&verts) {
        let Some(closest) = closest_on_segment(circle_pos, p1, p2) else {
            continue;
        };
        let dist = m::distance(circle_pos, closest);
        if best.map_or(true, |(_, best_dist, _)| dist < best_dist) {
            // vertices are counterclockwise so the right normal points out of the rect
            best = Some((closest, dist, m::right_normal(p2 - p1)));
        }
    }
    let (point, dist, edge_normal) = best?;

    let inside = {
        let local = m::rotate(circle_pos - rect.position, -rect.orientation);
        let Shape::Rect { hw, hh } = rect.shape else {
            return None;
        };
        local.x.abs() < hw && local.y.abs() < hh
    };

    let (normal, penetration) = if inside {
        // the center is past the edge, push the circle all the way back out
        (Unit::new_normalize(edge_normal), r + dist)
    } else {
        if dist >= r {
            return None;
        }
        let normal = Unit::try_new_normalize(circle_pos - point, COINCIDENT_DISTANCE)
            .unwrap_or_else(|| Unit::new_normalize(edge_normal));
        (normal, r - dist)
    };

    Some(Contact_ {
        normal,
        penetration,
        point,
    })
}

/// Separating axis test between two rects, producing the single deepest contact.
fn rect_rect(a: &RigidBody, b: &RigidBody) -> Option<Contact_> {
    let (Shape::Rect { hw: hw1, hh: hh1 }, Shape::Rect { hw: hw2, hh: hh2 }) = (a.shape, b.shape)
    else {
        return None;
    };
    let [x1, y1] = a.axes()?;
    let [x2, y2] = b.axes()?;
    let dist = b.position - a.position;

    // half extents as vectors
    let hw1_v = *x1 * hw1;
    let hh1_v = *y1 * hh1;
    let hw2_v = *x2 * hw2;
    let hh2_v = *y2 * hh2;

    let axes = [x1, y1, x2, y2];
    let mut deepest: Option<(usize, f32)> = None;
    for (axis_i, axis) in axes.iter().enumerate() {
        let r1 = hw1_v.dot(**axis).abs() + hh1_v.dot(**axis).abs();
        let r2 = hw2_v.dot(**axis).abs() + hh2_v.dot(**axis).abs();
        let pen = r1 + r2 - dist.dot(**axis).abs();
        if pen <= 0.0 {
            return None;
        }
        if deepest.map_or(true, |(_, d)| pen < d) {
            deepest = Some((axis_i, pen));
        }
    }
    let (axis_i, penetration) = deepest?;

    // orient axis of penetration towards the second body
    let axis = axes[axis_i];
    let normal = if axis.dot(dist) < 0.0 { -axis } else { axis };

    // the point lies on the surface of the first rect in both cases,
    // same as for circle pairs
    let point = if axis_i <= 1 {
        // axis is on the first rect: deepest corner of the second,
        // moved out onto the first rect's face
        let corner = b.position
            - hw2_v * normal.dot(hw2_v).signum()
            - hh2_v * normal.dot(hh2_v).signum();
        corner + *normal * penetration
    } else {
        // axis is on the second rect: deepest corner of the first
        a.position + hw1_v * normal.dot(hw1_v).signum() + hh1_v * normal.dot(hh1_v).signum()
    };

    Some(Contact_ {
        normal,
        penetration,
        point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;
    use std::f32::consts::PI;
    use thunderdome as td;

    fn particle_keys() -> [ParticleKey; 2] {
        let mut arena = td::Arena::new();
        [ParticleKey(arena.insert(())), ParticleKey(arena.insert(()))]
    }

    fn body_keys() -> [BodyKey; 2] {
        let mut arena = td::Arena::new();
        [BodyKey(arena.insert(())), BodyKey(arena.insert(()))]
    }

    #[test]
    fn particle_contact_normal_and_depth() {
        let a = Particle::new(Vec2::new(0.0, 0.0), 1.0, 5.0);
        let b = Particle::new(Vec2::new(0.0, 8.0), 1.0, 5.0);
        let c = particle_contact(particle_keys(), &a, &b).unwrap();
        assert_eq!(*c.normal, Vec2::new(0.0, 1.0));
        assert!(approx_eq(c.penetration, 2.0, 1e-6));
        assert!(check_collision(&a, &b));

        let far = Particle::new(Vec2::new(10.0, 0.0), 1.0, 5.0);
        assert!(particle_contact(particle_keys(), &a, &far).is_none());
        assert!(!check_collision(&a, &far));
    }

    #[test]
    fn coincident_particles_use_x_axis() {
        let a = Particle::new(Vec2::new(3.0, 3.0), 1.0, 2.0);
        let c = particle_contact(particle_keys(), &a, &a).unwrap();
        assert_eq!(*c.normal, Vec2::new(1.0, 0.0));
        assert_eq!(c.penetration, 4.0);
    }

    #[test]
    fn circle_circle_contact_point_on_first_surface() {
        let a = RigidBody::new_circle(Vec2::new(0.0, 0.0), 10.0, 1.0);
        let b = RigidBody::new_circle(Vec2::new(15.0, 0.0), 10.0, 1.0);
        let c = intersection_check(body_keys(), &a, &b, BoxBoxMode::default()).unwrap();
        assert_eq!(*c.normal, Vec2::new(1.0, 0.0));
        assert_eq!(c.point, Vec2::new(10.0, 0.0));
        assert!(approx_eq(c.penetration, 5.0, 1e-6));

        let c = intersection_check(body_keys(), &a, &a, BoxBoxMode::default()).unwrap();
        assert_eq!(*c.normal, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn circle_rect_normal_points_from_first_to_second() {
        let rect = RigidBody::new_rect(Vec2::new(0.0, 0.0), 100.0, 20.0, 0.0);
        // circle resting slightly into the top face (y-down, so top is negative y)
        let circle = RigidBody::new_circle(Vec2::new(10.0, -18.0), 10.0, 1.0);

        let c = intersection_check(body_keys(), &circle, &rect, BoxBoxMode::default()).unwrap();
        assert!(approx_eq(c.normal.x, 0.0, 1e-6));
        assert!(approx_eq(c.normal.y, 1.0, 1e-6));
        assert!(approx_eq(c.penetration, 2.0, 1e-4));
        assert!(approx_eq(c.point.y, -10.0, 1e-4));

        let c = intersection_check(body_keys(), &rect, &circle, BoxBoxMode::default()).unwrap();
        assert!(approx_eq(c.normal.y, -1.0, 1e-6));

        assert!(check_circle_rect_collision(&circle, &rect));
        assert!(check_rigid_collision(&rect, &circle, BoxBoxMode::default()));
        assert!(!check_circle_rect_collision(&rect, &circle));
    }

    #[test]
    fn circle_center_inside_rect_is_pushed_out() {
        let rect = RigidBody::new_rect(Vec2::new(0.0, 0.0), 100.0, 20.0, 0.0);
        let circle = RigidBody::new_circle(Vec2::new(0.0, -8.0), 5.0, 1.0);
        let c = intersection_check(body_keys(), &rect, &circle, BoxBoxMode::default()).unwrap();
        // nearest face is the top one, 2 units away
        assert!(approx_eq(c.normal.y, -1.0, 1e-6));
        assert!(approx_eq(c.penetration, 7.0, 1e-4));
    }

    #[test]
    fn separated_circle_and_rotated_rect() {
        let rect =
            RigidBody::new_rect(Vec2::new(0.0, 0.0), 20.0, 20.0, 1.0).with_orientation(PI / 4.0);
        // corner of the rotated rect reaches to about 14.14 on the x axis
        let near = RigidBody::new_circle(Vec2::new(17.0, 0.0), 4.0, 1.0);
        let far = RigidBody::new_circle(Vec2::new(19.0, 0.0), 4.0, 1.0);
        assert!(intersection_check(body_keys(), &near, &rect, BoxBoxMode::default()).is_some());
        assert!(intersection_check(body_keys(), &far, &rect, BoxBoxMode::default()).is_none());
        assert!(!check_circle_rect_collision(&far, &rect));
    }

    #[test]
    fn box_box_bounding_circle_factor() {
        let a = RigidBody::new_rect(Vec2::new(0.0, 0.0), 30.0, 30.0, 1.0);
        let b = RigidBody::new_rect(Vec2::new(0.0, 32.0), 30.0, 30.0, 1.0);
        // radius 15 each with the default factor, no contact at distance 32
        assert!(intersection_check(body_keys(), &a, &b, BoxBoxMode::default()).is_none());
        assert!(!check_rect_rect_collision(&a, &b, DEFAULT_RECT_RADIUS_FACTOR));

        // radius 21 each with 0.7
        let wide = BoxBoxMode::BoundingCircle { radius_factor: 0.7 };
        let c = intersection_check(body_keys(), &a, &b, wide).unwrap();
        assert!(approx_eq(c.penetration, 10.0, 1e-4));
        assert_eq!(*c.normal, Vec2::new(0.0, 1.0));
        assert!(check_rect_rect_collision(&a, &b, 0.7));
    }

    #[test]
    fn box_box_separating_axis() {
        let a = RigidBody::new_rect(Vec2::new(0.0, 0.0), 40.0, 20.0, 1.0);
        let b = RigidBody::new_rect(Vec2::new(35.0, 5.0), 40.0, 20.0, 1.0);
        let c = intersection_check(body_keys(), &a, &b, BoxBoxMode::SeparatingAxis).unwrap();
        assert!(approx_eq(c.normal.x, 1.0, 1e-6));
        assert!(approx_eq(c.penetration, 5.0, 1e-4));

        let c = intersection_check(body_keys(), &b, &a, BoxBoxMode::SeparatingAxis).unwrap();
        assert!(approx_eq(c.normal.x, -1.0, 1e-6));

        // gap that the bounding circle mode would report as overlapping
        let above = RigidBody::new_rect(Vec2::new(0.0, 21.0), 20.0, 20.0, 1.0);
        assert!(intersection_check(body_keys(), &a, &above, BoxBoxMode::SeparatingAxis).is_none());
        assert!(!check_rigid_collision(&a, &above, BoxBoxMode::SeparatingAxis));
        assert!(check_rigid_collision(&a, &above, BoxBoxMode::default()));
    }

    fn on_rect_surface(point: Vec2, rect: &RigidBody) -> bool {
        let Shape::Rect { hw, hh } = rect.shape else {
            return false;
        };
        let local = m::rotate(point - rect.position, -rect.orientation);
        approx_eq((local.x.abs() - hw).max(local.y.abs() - hh), 0.0, 1e-3)
    }

    #[test]
    fn box_box_contact_point_on_first_surface() {
        // face of the first rect is the axis of least penetration
        let a = RigidBody::new_rect(Vec2::new(0.0, 0.0), 40.0, 20.0, 1.0);
        let b = RigidBody::new_rect(Vec2::new(35.0, 5.0), 40.0, 20.0, 1.0);
        let c = intersection_check(body_keys(), &a, &b, BoxBoxMode::SeparatingAxis).unwrap();
        assert!(approx_eq(c.point.x, 20.0, 1e-4));
        assert!(approx_eq(c.point.y, -5.0, 1e-4));
        assert!(on_rect_surface(c.point, &a));

        // face of the second rect, with a corner of the rotated first rect poking in
        let a =
            RigidBody::new_rect(Vec2::new(0.0, 0.0), 20.0, 20.0, 1.0).with_orientation(PI / 4.0);
        let b = RigidBody::new_rect(Vec2::new(32.0, 0.0), 40.0, 40.0, 1.0);
        let c = intersection_check(body_keys(), &a, &b, BoxBoxMode::SeparatingAxis).unwrap();
        assert!(approx_eq(c.normal.x, 1.0, 1e-5));
        assert!(approx_eq(c.penetration, 200.0f32.sqrt() + 20.0 - 32.0, 1e-3));
        assert!(approx_eq(c.point.x, 200.0f32.sqrt(), 1e-3));
        assert!(approx_eq(c.point.y, 0.0, 1e-3));
        assert!(on_rect_surface(c.point, &a));
    }

    #[test]
    fn circle_rect_edge_distance_check() {
        let rect = RigidBody::new_rect(Vec2::new(50.0, 50.0), 40.0, 20.0, 1.0);
        let touching = RigidBody::new_circle(Vec2::new(50.0, 65.0), 6.0, 1.0);
        let apart = RigidBody::new_circle(Vec2::new(50.0, 67.0), 6.0, 1.0);
        assert!(check_circle_rect_collision(&touching, &rect));
        assert!(!check_circle_rect_collision(&apart, &rect));
        assert!(!check_circle_rect_collision(&rect, &rect));
    }
}
