//! Order-preserving sweep between moving gatherers and stationary items
//!
//! Each gatherer is the segment a dog travelled during the tick; each item is
//! a point with a radius (loot 0.0, offices 0.5). An encounter happens when
//! the item's distance to the segment is within the combined widths, and the
//! events come back ordered by closest-approach time so contested loot goes
//! to whoever reaches it first.

use super::Vec2;

/// A dog's motion during one tick.
#[derive(Debug, Clone, Copy)]
pub struct Gatherer {
    pub start: Vec2,
    pub end: Vec2,
    pub width: f64,
}

/// A stationary collectable or landmark.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    pub pos: Vec2,
    pub radius: f64,
}

/// One (gatherer, item) encounter at parametric time `time` in [0, 1] along
/// the gatherer's segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatherEvent {
    pub gatherer: usize,
    pub item: usize,
    pub sq_distance: f64,
    pub time: f64,
}

struct CollectionResult {
    sq_distance: f64,
    proj_ratio: f64,
}

/// Squared distance and projection ratio of point `c` against segment `ab`.
/// Requires `a != b`.
fn try_collect_point(a: Vec2, b: Vec2, c: Vec2) -> CollectionResult {
    let u = Vec2::new(c.x - a.x, c.y - a.y);
    let v = Vec2::new(b.x - a.x, b.y - a.y);
    let u_dot_v = u.x * v.x + u.y * v.y;
    let u_len2 = u.x * u.x + u.y * u.y;
    let v_len2 = v.x * v.x + v.y * v.y;
    CollectionResult {
        sq_distance: u_len2 - u_dot_v * u_dot_v / v_len2,
        proj_ratio: u_dot_v / v_len2,
    }
}

/// Find every encounter between the gatherers and the items, ordered by
/// closest-approach time ascending; ties go to the earlier gatherer. A
/// gatherer that did not move produces no events.
pub fn find_gather_events(gatherers: &[Gatherer], items: &[Item]) -> Vec<GatherEvent> {
    let mut events = Vec::new();

    for (g_idx, gatherer) in gatherers.iter().enumerate() {
        if gatherer.start == gatherer.end {
            continue;
        }
        for (i_idx, item) in items.iter().enumerate() {
            let collect = try_collect_point(gatherer.start, gatherer.end, item.pos);
            let reach = gatherer.width + item.radius;
            if collect.proj_ratio >= 0.0
                && collect.proj_ratio <= 1.0
                && collect.sq_distance <= reach * reach
            {
                events.push(GatherEvent {
                    gatherer: g_idx,
                    item: i_idx,
                    sq_distance: collect.sq_distance,
                    time: collect.proj_ratio,
                });
            }
        }
    }

    events.sort_by(|a, b| {
        a.time
            .total_cmp(&b.time)
            .then_with(|| a.gatherer.cmp(&b.gatherer))
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gatherer(start: (f64, f64), end: (f64, f64)) -> Gatherer {
        Gatherer {
            start: Vec2::new(start.0, start.1),
            end: Vec2::new(end.0, end.1),
            width: 0.3,
        }
    }

    fn item(x: f64, y: f64, radius: f64) -> Item {
        Item {
            pos: Vec2::new(x, y),
            radius,
        }
    }

    #[test]
    fn collects_item_on_the_path() {
        let events = find_gather_events(&[gatherer((0.0, 0.0), (10.0, 0.0))], &[item(5.0, 0.0, 0.0)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].gatherer, 0);
        assert_eq!(events[0].item, 0);
        assert!((events[0].time - 0.5).abs() < 1e-9);
    }

    #[test]
    fn misses_item_beyond_combined_width() {
        let events =
            find_gather_events(&[gatherer((0.0, 0.0), (10.0, 0.0))], &[item(5.0, 0.31, 0.0)]);
        assert!(events.is_empty());
    }

    #[test]
    fn item_radius_extends_the_reach() {
        // 0.31 off axis is out of reach for loot but inside 0.3 + 0.5 for an
        // office.
        let events =
            find_gather_events(&[gatherer((0.0, 0.0), (10.0, 0.0))], &[item(5.0, 0.31, 0.5)]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn events_come_back_ordered_by_time() {
        let events = find_gather_events(
            &[gatherer((0.0, 0.0), (10.0, 0.0))],
            &[item(8.0, 0.0, 0.0), item(2.0, 0.0, 0.0), item(5.0, 0.0, 0.0)],
        );
        let order: Vec<usize> = events.iter().map(|e| e.item).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn simultaneous_reach_goes_to_the_earlier_gatherer() {
        // Two dogs approaching the same item from opposite sides at equal
        // speed touch it at the same parametric time.
        let events = find_gather_events(
            &[gatherer((4.0, 0.0), (6.0, 0.0)), gatherer((6.0, 0.0), (4.0, 0.0))],
            &[item(5.0, 0.0, 0.0)],
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].gatherer, 0);
        assert_eq!(events[1].gatherer, 1);
    }

    #[test]
    fn stationary_gatherer_produces_no_events() {
        let events = find_gather_events(&[gatherer((5.0, 0.0), (5.0, 0.0))], &[item(5.0, 0.0, 0.0)]);
        assert!(events.is_empty());
    }

    #[test]
    fn item_behind_the_segment_is_ignored() {
        let events =
            find_gather_events(&[gatherer((5.0, 0.0), (10.0, 0.0))], &[item(4.0, 0.0, 0.0)]);
        assert!(events.is_empty());
    }
}
