//! Road-constrained motion resolution
//!
//! One movement step clamps an axis-aligned velocity to the road network:
//! the dog travels along the corridor it currently occupies and stops when
//! it reaches the corridor edge.

use super::map::{Road, ROAD_HALF_WIDTH};
use super::Vec2;

const EPS: f64 = 1e-9;

/// Result of a movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moved {
    pub pos: Vec2,
    pub speed: Vec2,
}

/// Advance `pos` by `speed * dt_secs`, clamped to the road corridors.
///
/// The carrier road is the first road in map order whose corridor contains
/// the current position, preferring roads parallel to the travel direction;
/// a perpendicular road only carries the dog across its own corridor width.
/// If clamping shortens the step, the moved velocity component is zeroed.
/// With no carrier road at all the dog stops in place.
pub fn resolve(pos: Vec2, speed: Vec2, dt_secs: f64, roads: &[Road]) -> Moved {
    if speed.is_zero() {
        return Moved { pos, speed };
    }

    let horizontal_motion = speed.x != 0.0;
    debug_assert!(
        !(speed.x != 0.0 && speed.y != 0.0),
        "dog velocity must be axis-aligned"
    );

    let carrier = roads
        .iter()
        .find(|road| road.is_horizontal() == horizontal_motion && road.corridor_contains(pos, EPS))
        .or_else(|| {
            roads
                .iter()
                .find(|road| road.is_horizontal() != horizontal_motion && road.corridor_contains(pos, EPS))
        });

    let Some(road) = carrier else {
        return Moved {
            pos,
            speed: Vec2::ZERO,
        };
    };

    // Travel limits along the motion axis: the full corridor length when the
    // road is parallel to the motion, just the corridor width when it is
    // perpendicular.
    let (lo, hi) = if road.is_horizontal() == horizontal_motion {
        let (lo, hi) = road.span();
        (lo - ROAD_HALF_WIDTH, hi + ROAD_HALF_WIDTH)
    } else {
        (road.cross() - ROAD_HALF_WIDTH, road.cross() + ROAD_HALF_WIDTH)
    };

    let mut next = pos;
    let mut speed = speed;
    if horizontal_motion {
        let x = pos.x + speed.x * dt_secs;
        if x < lo {
            next.x = lo;
            speed.x = 0.0;
        } else if x > hi {
            next.x = hi;
            speed.x = 0.0;
        } else {
            next.x = x;
        }
    } else {
        let y = pos.y + speed.y * dt_secs;
        if y < lo {
            next.y = lo;
            speed.y = 0.0;
        } else if y > hi {
            next.y = hi;
            speed.y = 0.0;
        } else {
            next.y = y;
        }
    }

    Moved { pos: next, speed }
}
