use std::collections::BTreeMap;

use crate::geometry::{EPSILON, Orientation, Point, Segment};
use crate::ir::WireId;

use super::types::Bump;

/// Angles closer than this count as the same slope for the tie-break.
const ANGLE_TIE_DEGREES: f32 = 1e-3;

/// Recomputes every bump from scratch. Each proper crossing between two wires puts
/// exactly one bump on the wire whose crossing segment lies flatter; equal slopes go
/// to the wire that comes later in `wires`.
pub fn resolve(wires: &[(WireId, Vec<Segment>)]) -> BTreeMap<WireId, Vec<Bump>> {
    let mut bumps: BTreeMap<WireId, Vec<Bump>> =
        wires.iter().map(|(id, _)| (*id, Vec::new())).collect();

    for (idx, (first_id, first)) in wires.iter().enumerate() {
        for (second_id, second) in &wires[idx + 1..] {
            if first_id == second_id {
                continue;
            }
            for seg_first in first {
                for seg_second in second {
                    let Some(point) = segment_crossing(seg_first, seg_second) else {
                        continue;
                    };
                    let first_angle = seg_first.angle_to_horizontal();
                    let second_angle = seg_second.angle_to_horizontal();
                    let (owner, segment) = if (first_angle - second_angle).abs() <= ANGLE_TIE_DEGREES
                        || second_angle < first_angle
                    {
                        (*second_id, seg_second)
                    } else {
                        (*first_id, seg_first)
                    };
                    let bump = Bump {
                        position: point,
                        orientation: bump_orientation(segment),
                    };
                    let entry = bumps.entry(owner).or_default();
                    if entry.iter().any(|existing| existing.position.approx_eq(point)) {
                        continue;
                    }
                    log::debug!(
                        "crossing of {first_id} and {second_id} at ({:.1}, {:.1}) bumps {owner}",
                        point.x,
                        point.y
                    );
                    entry.push(bump);
                }
            }
        }
    }
    bumps
}

/// Parametric intersection of two segments, only when it lies strictly inside both.
/// Parallel and colinear segments never cross, and meeting at an endpoint is a joint.
pub fn segment_crossing(first: &Segment, second: &Segment) -> Option<Point> {
    let v1 = (first.b.x - first.a.x, first.b.y - first.a.y);
    let v2 = (second.b.x - second.a.x, second.b.y - second.a.y);
    let det = v1.0 * v2.1 - v1.1 * v2.0;
    if det.abs() < 1e-9 {
        return None;
    }
    let dx = second.a.x - first.a.x;
    let dy = second.a.y - first.a.y;
    let t1 = (dx * v2.1 - dy * v2.0) / det;
    let t2 = (dx * v1.1 - dy * v1.0) / det;

    let len1 = first.length();
    let len2 = second.length();
    let interior = |t: f32, len: f32| t * len > EPSILON && (1.0 - t) * len > EPSILON;
    if !interior(t1, len1) || !interior(t2, len2) {
        return None;
    }
    // Axis-aligned pairs meet exactly at (vertical x, horizontal y).
    Some(match (first.orientation(), second.orientation()) {
        (Some(Orientation::Horizontal), Some(Orientation::Vertical)) => {
            Point::new(second.a.x, first.a.y)
        }
        (Some(Orientation::Vertical), Some(Orientation::Horizontal)) => {
            Point::new(first.a.x, second.a.y)
        }
        _ => Point::new(first.a.x + t1 * v1.0, first.a.y + t1 * v1.1),
    })
}

fn bump_orientation(segment: &Segment) -> Orientation {
    match segment.orientation() {
        Some(orientation) => orientation.perpendicular(),
        None if segment.angle_to_horizontal() < 45.0 => Orientation::Vertical,
        None => Orientation::Horizontal,
    }
}

/// Number of proper crossings between two segment lists, bumped or not.
pub fn count_crossings(first: &[Segment], second: &[Segment]) -> usize {
    first
        .iter()
        .flat_map(|a| second.iter().map(move |b| (a, b)))
        .filter(|(a, b)| segment_crossing(a, b).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::planner::plan;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn perpendicular_segments_cross_inside() {
        let h = Segment::new(p(0.0, 50.0), p(100.0, 50.0));
        let v = Segment::new(p(40.0, 0.0), p(40.0, 100.0));
        assert_eq!(segment_crossing(&h, &v), Some(p(40.0, 50.0)));
    }

    #[test]
    fn endpoints_and_t_junctions_are_not_crossings() {
        let h = Segment::new(p(0.0, 0.0), p(100.0, 0.0));
        let corner = Segment::new(p(100.0, 0.0), p(100.0, 50.0));
        let tee = Segment::new(p(50.0, 0.0), p(50.0, 50.0));
        assert_eq!(segment_crossing(&h, &corner), None);
        assert_eq!(segment_crossing(&h, &tee), None);
    }

    #[test]
    fn colinear_overlap_is_not_a_crossing() {
        let a = Segment::new(p(50.0, 0.0), p(50.0, 100.0));
        let b = Segment::new(p(50.0, 20.0), p(50.0, 80.0));
        assert_eq!(segment_crossing(&a, &b), None);
    }

    #[test]
    fn horizontal_segment_takes_the_bump() {
        let vertical = (WireId(0), vec![Segment::new(p(50.0, 0.0), p(50.0, 100.0))]);
        let horizontal = (WireId(1), vec![Segment::new(p(0.0, 40.0), p(100.0, 40.0))]);

        for wires in [
            vec![vertical.clone(), horizontal.clone()],
            vec![horizontal.clone(), vertical.clone()],
        ] {
            let bumps = resolve(&wires);
            assert!(bumps[&WireId(0)].is_empty());
            assert_eq!(
                bumps[&WireId(1)],
                vec![Bump {
                    position: p(50.0, 40.0),
                    orientation: Orientation::Vertical,
                }]
            );
        }
    }

    #[test]
    fn equal_slopes_bump_the_later_wire() {
        let earlier = (WireId(3), vec![Segment::new(p(0.0, 0.0), p(100.0, 100.0))]);
        let later = (WireId(7), vec![Segment::new(p(0.0, 100.0), p(100.0, 0.0))]);
        let bumps = resolve(&[earlier, later]);
        assert!(bumps[&WireId(3)].is_empty());
        assert_eq!(bumps[&WireId(7)].len(), 1);
        assert!(bumps[&WireId(7)][0].position.approx_eq(p(50.0, 50.0)));
    }

    #[test]
    fn colinear_planned_wires_have_no_bumps() {
        let a = plan(p(0.0, 0.0), p(100.0, 100.0));
        let b = plan(p(0.0, 100.0), p(100.0, 0.0));
        let bumps = resolve(&[(WireId(0), a), (WireId(1), b)]);
        assert_eq!(bumps.len(), 2);
        assert!(bumps.values().all(Vec::is_empty));
    }

    #[test]
    fn perturbed_wire_gets_exactly_one_bump() {
        let a = plan(p(0.0, 0.0), p(100.0, 100.0));
        let b = plan(p(10.0, 100.0), p(100.0, 0.0));
        assert_eq!(count_crossings(&a, &b), 1);
        let wires = [(WireId(0), a), (WireId(1), b)];
        let bumps = resolve(&wires);
        assert!(bumps[&WireId(0)].is_empty());
        assert_eq!(
            bumps[&WireId(1)],
            vec![Bump {
                position: p(50.0, 50.0),
                orientation: Orientation::Vertical,
            }]
        );
        assert_eq!(resolve(&wires), bumps);
    }

    #[test]
    fn wires_sharing_a_pin_do_not_bump() {
        let a = plan(p(0.0, 0.0), p(120.0, 60.0));
        let b = plan(p(0.0, 0.0), p(-80.0, 200.0));
        let bumps = resolve(&[(WireId(0), a), (WireId(1), b)]);
        assert!(bumps.values().all(Vec::is_empty));
    }

    #[test]
    fn one_wire_collects_several_bumps() {
        let bus = (WireId(0), vec![Segment::new(p(0.0, 50.0), p(300.0, 50.0))]);
        let taps: Vec<_> = (1..=3)
            .map(|i| {
                let x = i as f32 * 70.0;
                (WireId(i), vec![Segment::new(p(x, 0.0), p(x, 100.0))])
            })
            .collect();
        let mut wires = vec![bus];
        wires.extend(taps);
        let bumps = resolve(&wires);
        assert_eq!(bumps[&WireId(0)].len(), 3);
        assert!((1..=3).all(|i| bumps[&WireId(i)].is_empty()));
    }

    #[test]
    fn axis_aligned_crossings_are_exact() {
        let h = Segment::new(p(-3.7, 912.31), p(1480.9, 912.31));
        let v = Segment::new(p(733.13, 1500.2), p(733.13, -20.6));
        assert_eq!(segment_crossing(&h, &v), Some(p(733.13, 912.31)));
        assert_eq!(segment_crossing(&v, &h), Some(p(733.13, 912.31)));
    }
}
