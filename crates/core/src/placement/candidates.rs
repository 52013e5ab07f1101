//! Candidate scoring against the running bounds and the hard zone limits.

use crate::geometry::{Footprint, span_is_aligned};
use crate::tree::TreeNode;
use crate::types::{Bounds, Direction, ZoneConstraints};

/// How well a candidate fits. `Good` keeps the bounding box as it is,
/// `Normal` grows it. Ordered so the worse axis wins when combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fit {
    Good,
    Normal,
}

/// Scores one axis of a candidate span `[min, max]`. `None` when the span
/// leaves `[limit_min, limit_max]`, straddles two super-tiles, or would
/// stretch the bounds past `max_span`.
pub fn value_matches_constraints(
    (min, max): (i32, i32),
    bounds: Option<(i32, i32)>,
    (limit_min, limit_max): (i32, i32),
    max_span: i32,
) -> Option<Fit> {
    if min < limit_min || max > limit_max || !span_is_aligned(min, max) {
        return None;
    }
    let Some((bound_min, bound_max)) = bounds else {
        return (max - min < max_span).then_some(Fit::Good);
    };
    let new_min = bound_min.min(min);
    let new_max = bound_max.max(max);
    if new_max - new_min >= max_span {
        return None;
    }
    if new_min == bound_min && new_max == bound_max { Some(Fit::Good) } else { Some(Fit::Normal) }
}

pub fn classify(
    footprint: Footprint,
    bounds: Option<&Bounds>,
    limits: &ZoneConstraints,
) -> Option<Fit> {
    let z = footprint.origin.z;
    let x = value_matches_constraints(
        (footprint.origin.x, footprint.right()),
        bounds.map(|b| (b.x_min, b.x_max)),
        (limits.min_x, limits.max_x),
        limits.max_w,
    )?;
    let y = value_matches_constraints(
        (footprint.origin.y, footprint.bottom()),
        bounds.map(|b| (b.y_min, b.y_max)),
        (limits.min_y, limits.max_y),
        limits.max_h,
    )?;
    let z = value_matches_constraints(
        (z, z),
        bounds.map(|b| (b.z_min, b.z_max)),
        (limits.min_z, limits.max_z),
        limits.max_d,
    )?;
    Some(x.max(y).max(z))
}

/// Walls of `parent` that `child` may be attached to.
///
/// Key-locked doors are kept vertical, so locked children never sit left or
/// right of their parent. The wall that holds a room's zone entrance is never
/// shared with a child door.
pub fn allowed_directions(parent: &TreeNode, child: &TreeNode) -> Vec<Direction> {
    let parent_entrance = parent.entrance.as_ref().map(|entrance| entrance.direction);
    let child_entrance = child.entrance.as_ref().map(|entrance| entrance.direction);
    Direction::ALL
        .into_iter()
        .filter(|direction| {
            child.entrance_directions.as_ref().is_none_or(|allowed| allowed.contains(direction))
        })
        .filter(|direction| !(child.is_key_blocked() && direction.is_horizontal()))
        .filter(|&direction| parent_entrance != Some(direction))
        .filter(|&direction| child_entrance != Some(direction.opposite()))
        .collect()
}

/// Stairs need a parent without a stairway of its own, and a child with no
/// wall facing to honour. Gates travel with the stairway doors.
pub fn supports_stairs(parent: &TreeNode, child: &TreeNode) -> bool {
    !parent.has_stairs && child.entrance_directions.is_none()
}
