use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::config::RouterConfig;
use crate::geometry::{
    EPSILON, Orientation, Point, Rect, Segment, compress_path, points_to_segments,
    segments_to_points,
};

use super::types::Obstacle;

#[derive(Debug, Clone, PartialEq)]
pub struct AvoidOutcome {
    pub segments: Vec<Segment>,
    pub passes: usize,
    /// False when the pass cap was reached with a segment still inside an obstacle.
    pub converged: bool,
}

/// Reroutes segments that run through obstacles other than the wire's own
/// components. Best effort: never fails, may leave residual overlap.
pub fn avoid(
    segments: &[Segment],
    obstacles: &[Obstacle],
    excluded: &BTreeSet<String>,
    config: &RouterConfig,
) -> Vec<Segment> {
    avoid_with_report(segments, obstacles, excluded, config).segments
}

pub fn avoid_with_report(
    segments: &[Segment],
    obstacles: &[Obstacle],
    excluded: &BTreeSet<String>,
    config: &RouterConfig,
) -> AvoidOutcome {
    let active: Vec<&Rect> = obstacles
        .iter()
        .filter(|obstacle| {
            if excluded.contains(&obstacle.id) {
                return false;
            }
            if !obstacle.rect.is_valid() {
                log::debug!("ignoring malformed obstacle {}: {:?}", obstacle.id, obstacle.rect);
                return false;
            }
            true
        })
        .map(|obstacle| &obstacle.rect)
        .collect();

    let mut current = segments.to_vec();
    if active.is_empty() || current.is_empty() {
        return AvoidOutcome {
            segments: current,
            passes: 0,
            converged: true,
        };
    }

    let clearance = config.clearance.max(0.0);
    for pass in 0..config.max_passes {
        let mut changed = false;
        let mut next: Vec<Point> = Vec::with_capacity(current.len() * 2 + 1);
        next.push(current[0].a);
        for segment in &current {
            match first_blocking(segment, &active) {
                Some(rect) => {
                    changed = true;
                    next.extend(detour(segment, rect, clearance).into_iter().skip(1));
                }
                None => next.push(segment.b),
            }
        }
        current = points_to_segments(&compress_path(&next));
        if !changed {
            return AvoidOutcome {
                segments: current,
                passes: pass,
                converged: true,
            };
        }
    }

    let converged = current
        .iter()
        .all(|segment| first_blocking(segment, &active).is_none());
    if !converged {
        log::warn!(
            "wire {:?} -> {:?} still overlaps a component after {} detour passes",
            segments_to_points(segments).first(),
            segments_to_points(segments).last(),
            config.max_passes
        );
    }
    AvoidOutcome {
        segments: current,
        passes: config.max_passes,
        converged,
    }
}

/// Interior overlap test. Running along an edge or ending on it is allowed.
pub fn segment_hits_rect(segment: &Segment, rect: &Rect) -> bool {
    match segment.orientation() {
        Some(Orientation::Horizontal) => {
            let y = segment.a.y;
            let lo = segment.a.x.min(segment.b.x);
            let hi = segment.a.x.max(segment.b.x);
            y > rect.y_min + EPSILON
                && y < rect.y_max - EPSILON
                && hi > rect.x_min + EPSILON
                && lo < rect.x_max - EPSILON
        }
        Some(Orientation::Vertical) => {
            let x = segment.a.x;
            let lo = segment.a.y.min(segment.b.y);
            let hi = segment.a.y.max(segment.b.y);
            x > rect.x_min + EPSILON
                && x < rect.x_max - EPSILON
                && hi > rect.y_min + EPSILON
                && lo < rect.y_max - EPSILON
        }
        None => false,
    }
}

/// The obstacle the segment runs into first, walking from `a` to `b`.
fn first_blocking<'a>(segment: &Segment, obstacles: &[&'a Rect]) -> Option<&'a Rect> {
    let entry_distance = |rect: &Rect| -> f32 {
        let Segment { a, b } = *segment;
        match segment.orientation() {
            Some(Orientation::Horizontal) if b.x >= a.x => rect.x_min - a.x,
            Some(Orientation::Horizontal) => a.x - rect.x_max,
            Some(Orientation::Vertical) if b.y >= a.y => rect.y_min - a.y,
            _ => a.y - rect.y_max,
        }
    };
    obstacles
        .iter()
        .copied()
        .filter(|rect| segment_hits_rect(segment, rect))
        .min_by(|l, r| {
            entry_distance(l)
                .partial_cmp(&entry_distance(r))
                .unwrap_or(Ordering::Equal)
        })
}

/// Points of the replacement route for `segment`, starting at `a` and ending at `b`.
/// The jog goes to whichever side of `rect` is closer to the segment, ties below
/// (horizontal) or right (vertical). Jog columns sit `clearance` outside the
/// obstacle when the segment has room, otherwise at the segment's own endpoints.
fn detour(segment: &Segment, rect: &Rect, clearance: f32) -> Vec<Point> {
    let Segment { a, b } = *segment;
    match segment.orientation() {
        Some(Orientation::Horizontal) => {
            let y0 = a.y;
            let above = rect.y_min - clearance;
            let below = rect.y_max + clearance;
            let lane = if y0 - above < below - y0 { above } else { below };
            let (enter, leave) = if b.x >= a.x {
                let enter = rect.x_min - clearance;
                let leave = rect.x_max + clearance;
                (
                    if enter > a.x { enter } else { a.x },
                    if leave < b.x { leave } else { b.x },
                )
            } else {
                let enter = rect.x_max + clearance;
                let leave = rect.x_min - clearance;
                (
                    if enter < a.x { enter } else { a.x },
                    if leave > b.x { leave } else { b.x },
                )
            };
            vec![
                a,
                Point::new(enter, y0),
                Point::new(enter, lane),
                Point::new(leave, lane),
                Point::new(leave, y0),
                b,
            ]
        }
        Some(Orientation::Vertical) => {
            let x0 = a.x;
            let left = rect.x_min - clearance;
            let right = rect.x_max + clearance;
            let lane = if x0 - left < right - x0 { left } else { right };
            let (enter, leave) = if b.y >= a.y {
                let enter = rect.y_min - clearance;
                let leave = rect.y_max + clearance;
                (
                    if enter > a.y { enter } else { a.y },
                    if leave < b.y { leave } else { b.y },
                )
            } else {
                let enter = rect.y_max + clearance;
                let leave = rect.y_min - clearance;
                (
                    if enter < a.y { enter } else { a.y },
                    if leave > b.y { leave } else { b.y },
                )
            };
            vec![
                a,
                Point::new(x0, enter),
                Point::new(lane, enter),
                Point::new(lane, leave),
                Point::new(x0, leave),
                b,
            ]
        }
        None => vec![a, b],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::is_continuous;

    fn config() -> RouterConfig {
        RouterConfig::default()
    }

    fn hline(x0: f32, x1: f32, y: f32) -> Segment {
        Segment::new(Point::new(x0, y), Point::new(x1, y))
    }

    fn vline(x: f32, y0: f32, y1: f32) -> Segment {
        Segment::new(Point::new(x, y0), Point::new(x, y1))
    }

    fn clear_of(segments: &[Segment], rect: &Rect) -> bool {
        segments.iter().all(|segment| !segment_hits_rect(segment, rect))
    }

    #[test]
    fn horizontal_collision_detours_below_on_tie() {
        let rect = Rect::new(80.0, 30.0, 120.0, 70.0);
        let obstacles = [Obstacle::new("U1", rect)];
        let input = [hline(0.0, 200.0, 50.0)];
        let out = avoid(&input, &obstacles, &BTreeSet::new(), &config());
        assert_eq!(
            segments_to_points(&out),
            vec![
                Point::new(0.0, 50.0),
                Point::new(60.0, 50.0),
                Point::new(60.0, 90.0),
                Point::new(140.0, 90.0),
                Point::new(140.0, 50.0),
                Point::new(200.0, 50.0),
            ]
        );
        assert!(clear_of(&out, &rect));
    }

    #[test]
    fn horizontal_collision_prefers_nearer_side() {
        let rect = Rect::new(80.0, 30.0, 120.0, 70.0);
        let obstacles = [Obstacle::new("U1", rect)];
        let input = [hline(200.0, 0.0, 35.0)];
        let out = avoid(&input, &obstacles, &BTreeSet::new(), &config());
        assert!(out.iter().any(|s| s.is_horizontal() && (s.a.y - 10.0).abs() < 1e-4));
        assert!(clear_of(&out, &rect));
        assert_eq!(out.first().map(|s| s.a), Some(Point::new(200.0, 35.0)));
        assert_eq!(out.last().map(|s| s.b), Some(Point::new(0.0, 35.0)));
        assert!(is_continuous(&out));
    }

    #[test]
    fn vertical_collision_detours_sideways() {
        let rect = Rect::new(0.0, 100.0, 40.0, 140.0);
        let obstacles = [Obstacle::new("U1", rect)];
        let input = [vline(30.0, 0.0, 300.0)];
        let out = avoid(&input, &obstacles, &BTreeSet::new(), &config());
        assert!(clear_of(&out, &rect));
        // 30 is closer to the right edge.
        assert!(out.iter().any(|s| s.is_vertical() && (s.a.x - 60.0).abs() < 1e-4));
    }

    #[test]
    fn vertical_collision_detours_right_on_tie() {
        let rect = Rect::new(0.0, 100.0, 40.0, 140.0);
        let obstacles = [Obstacle::new("U1", rect)];
        let input = [vline(20.0, 0.0, 300.0)];
        let out = avoid(&input, &obstacles, &BTreeSet::new(), &config());
        assert_eq!(
            segments_to_points(&out),
            vec![
                Point::new(20.0, 0.0),
                Point::new(20.0, 80.0),
                Point::new(60.0, 80.0),
                Point::new(60.0, 160.0),
                Point::new(20.0, 160.0),
                Point::new(20.0, 300.0),
            ]
        );
        assert!(clear_of(&out, &rect));
    }

    #[test]
    fn excluded_components_are_not_obstacles() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let obstacles = [Obstacle::new("U1", rect)];
        let input = [hline(100.0, 50.0, 50.0), vline(50.0, 50.0, 300.0)];
        let excluded: BTreeSet<String> = ["U1".to_string()].into_iter().collect();
        let out = avoid(&input, &obstacles, &excluded, &config());
        assert_eq!(out, input.to_vec());
    }

    #[test]
    fn touching_an_edge_is_not_a_collision() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(!segment_hits_rect(&hline(-50.0, 150.0, 100.0), &rect));
        assert!(!segment_hits_rect(&vline(100.0, -10.0, 10.0), &rect));
        assert!(!segment_hits_rect(&hline(-50.0, 0.0, 50.0), &rect));
        assert!(segment_hits_rect(&hline(-50.0, 1.0, 50.0), &rect));
    }

    #[test]
    fn malformed_obstacles_are_ignored() {
        let obstacles = [
            Obstacle::new("flat", Rect::new(50.0, -10.0, 50.0, 10.0)),
            Obstacle::new("inverted", Rect::new(60.0, 10.0, 40.0, -10.0)),
        ];
        let input = [hline(0.0, 100.0, 0.0)];
        let out = avoid(&input, &obstacles, &BTreeSet::new(), &config());
        assert_eq!(out, input.to_vec());
    }

    #[test]
    fn chained_obstacles_reach_a_fixed_point() {
        let first = Rect::new(40.0, -20.0, 60.0, 20.0);
        // Sits on the lane the first detour would take.
        let second = Rect::new(30.0, 30.0, 70.0, 50.0);
        let obstacles = [Obstacle::new("A", first), Obstacle::new("B", second)];
        let input = [hline(0.0, 200.0, 0.0)];
        let outcome = avoid_with_report(&input, &obstacles, &BTreeSet::new(), &config());
        assert!(outcome.converged);
        assert!(clear_of(&outcome.segments, &first));
        assert!(clear_of(&outcome.segments, &second));
        assert!(is_continuous(&outcome.segments));
    }

    #[test]
    fn enclosed_pin_returns_best_effort() {
        let rect = Rect::new(-50.0, -50.0, 50.0, 50.0);
        let obstacles = [Obstacle::new("cage", rect)];
        let input = [hline(0.0, 200.0, 0.0)];
        let outcome = avoid_with_report(&input, &obstacles, &BTreeSet::new(), &config());
        assert_eq!(outcome.segments.first().map(|s| s.a), Some(Point::new(0.0, 0.0)));
        assert_eq!(outcome.segments.last().map(|s| s.b), Some(Point::new(200.0, 0.0)));
        assert!(!outcome.converged);
        assert_eq!(outcome.passes, config().max_passes);
    }
}
