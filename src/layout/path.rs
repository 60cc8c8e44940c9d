use std::fmt::Write as _;

use serde::Serialize;

use crate::geometry::{EPSILON, Orientation, Point, Segment};

use super::types::Bump;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo { to: Point },
    LineTo { to: Point },
    /// Semicircle of `radius` ending at `to`. `sweep` follows the SVG arc flag.
    Arc { radius: f32, sweep: bool, to: Point },
}

impl PathCommand {
    pub fn end(&self) -> Point {
        match *self {
            PathCommand::MoveTo { to } | PathCommand::LineTo { to } | PathCommand::Arc { to, .. } => to,
        }
    }
}

/// One continuous drawable outline for a wire, bumps included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathCurve {
    pub commands: Vec<PathCommand>,
}

impl PathCurve {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn arc_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, PathCommand::Arc { .. }))
            .count()
    }

    pub fn start(&self) -> Option<Point> {
        self.commands.first().map(PathCommand::end)
    }

    pub fn end(&self) -> Option<Point> {
        self.commands.last().map(PathCommand::end)
    }

    pub fn to_svg_path(&self) -> String {
        let mut d = String::new();
        for cmd in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = match *cmd {
                PathCommand::MoveTo { to } => write!(d, "M {:.2} {:.2}", to.x, to.y),
                PathCommand::LineTo { to } => write!(d, "L {:.2} {:.2}", to.x, to.y),
                PathCommand::Arc { radius, sweep, to } => write!(
                    d,
                    "A {radius:.2} {radius:.2} 0 0 {} {:.2} {:.2}",
                    u8::from(sweep),
                    to.x,
                    to.y
                ),
            };
        }
        d
    }
}

/// Walks the segments in order, replacing each bump that lies on a segment with a
/// semicircle of `radius`. Horizontal runs hop upward, vertical runs hop left.
pub fn render(segments: &[Segment], bumps: &[Bump], radius: f32) -> PathCurve {
    let mut curve = PathCurve::default();
    let Some(first) = segments.first() else {
        return curve;
    };
    curve.commands.push(PathCommand::MoveTo { to: first.a });

    let mut claimed = vec![false; bumps.len()];
    for segment in segments {
        let len = segment.length();
        if len <= EPSILON {
            continue;
        }
        let dir = ((segment.b.x - segment.a.x) / len, (segment.b.y - segment.a.y) / len);
        let along = |dist: f32| Point::new(segment.a.x + dir.0 * dist, segment.a.y + dir.1 * dist);

        let mut on_segment: Vec<(f32, usize)> = Vec::new();
        if let Some(orientation) = segment.orientation() {
            for (idx, bump) in bumps.iter().enumerate() {
                if claimed[idx]
                    || bump.orientation != orientation.perpendicular()
                    || !segment.contains_point(bump.position)
                {
                    continue;
                }
                claimed[idx] = true;
                on_segment.push((segment.a.distance(bump.position), idx));
            }
        }
        on_segment.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut cursor = 0.0f32;
        for (dist, idx) in on_segment {
            if dist - radius < cursor - EPSILON || dist + radius > len + EPSILON {
                log::debug!(
                    "bump at ({:.1}, {:.1}) has no room for radius {radius}, drawing straight",
                    bumps[idx].position.x,
                    bumps[idx].position.y
                );
                continue;
            }
            if dist - radius > cursor + EPSILON {
                curve.commands.push(PathCommand::LineTo { to: along(dist - radius) });
            }
            let sweep = match segment.orientation() {
                Some(Orientation::Horizontal) => dir.0 > 0.0,
                _ => dir.1 < 0.0,
            };
            curve.commands.push(PathCommand::Arc {
                radius,
                sweep,
                to: along(dist + radius),
            });
            cursor = dist + radius;
        }
        if len - cursor > EPSILON {
            curve.commands.push(PathCommand::LineTo { to: segment.b });
        }
    }
    curve
}
