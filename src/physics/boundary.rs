//! Keeping bodies inside the rectangular simulation area.

use crate::math::Vec2;

/// Edges of the area a body was pushed back from during one boundary pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundaryHits {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    /// The edge at `y = height`, which is the floor with y pointing down.
    pub bottom: bool,
}

impl BoundaryHits {
    #[inline]
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Clamp a position so that a body with the given extent stays within `[0, max]`,
/// reflecting the velocity if it points out of the area.
///
/// Returns whether the low and high edge were hit, in that order.
fn keep_axis_in_bounds(
    pos: &mut f32,
    vel: &mut f32,
    extent: f32,
    max: f32,
    restitution: f32,
) -> (bool, bool) {
    let mut hits = (false, false);
    if *pos + extent > max {
        *pos = max - extent;
        if *vel > 0.0 {
            *vel *= -restitution;
        }
        hits.1 = true;
    }
    if *pos - extent < 0.0 {
        *pos = extent;
        if *vel < 0.0 {
            *vel *= -restitution;
        }
        hits.0 = true;
    }
    hits
}

/// Keep a body with the given extent inside `[0, size.x] x [0, size.y]`.
pub fn keep_in_bounds(
    position: &mut Vec2,
    velocity: &mut Vec2,
    extent: f32,
    size: Vec2,
    restitution: f32,
) -> BoundaryHits {
    let (top, bottom) =
        keep_axis_in_bounds(&mut position.y, &mut velocity.y, extent, size.y, restitution);
    let (left, right) =
        keep_axis_in_bounds(&mut position.x, &mut velocity.x, extent, size.x, restitution);
    BoundaryHits {
        left,
        right,
        top,
        bottom,
    }
}
