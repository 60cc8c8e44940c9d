//! Routing pipeline: plan each wire, detour it around foreign components, then
//! resolve crossings across every wire and build the drawable curves.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::RouterConfig;
use crate::geometry::{
    EPSILON, Orientation, Point, Rect, Segment, compress_path, points_to_segments,
    segments_to_points,
};
use crate::ir::{Component, PinEdge, PinRef, Scene, Wire, WireId};

mod avoidance;
mod crossings;
mod path;
mod planner;
mod types;

pub use avoidance::{AvoidOutcome, avoid, avoid_with_report, segment_hits_rect};
pub use crossings::{count_crossings, resolve, segment_crossing};
pub use path::{PathCommand, PathCurve, render};
pub use planner::plan;
pub use types::{Bump, Obstacle, PreviewLayout, SceneLayout, WireLayout, WirePath};

/// Plan plus avoidance for a single wire. Never fails.
pub fn route_wire(
    start: Point,
    end: Point,
    obstacles: &[Obstacle],
    excluded: &BTreeSet<String>,
    config: &RouterConfig,
) -> AvoidOutcome {
    let planned = plan(start, end);
    let outcome = avoid_with_report(&planned, obstacles, excluded, config);
    log::debug!(
        "routed ({:.1}, {:.1}) -> ({:.1}, {:.1}): {} planned, {} final segments, {} passes",
        start.x,
        start.y,
        end.x,
        end.y,
        planned.len(),
        outcome.segments.len(),
        outcome.passes
    );
    outcome
}

pub fn scene_obstacles(scene: &Scene) -> Vec<Obstacle> {
    scene
        .components
        .values()
        .map(|component| Obstacle::new(component.id.clone(), component.rect))
        .collect()
}

/// Where a wire attaches to a pin: the pin itself and the approach point one stub
/// length out, square to the pin's edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinAnchor {
    pub pin: Point,
    pub approach: Point,
    /// `None` when the wire starts right at the pin (no edge, or stubs disabled).
    pub edge: Option<PinEdge>,
}

impl PinAnchor {
    pub fn has_stub(&self) -> bool {
        self.edge.is_some()
    }
}

pub fn pin_anchor(component: &Component, pin: &str, config: &RouterConfig) -> Option<PinAnchor> {
    let point = component.pin_position(pin)?;
    let edge = if config.pin_stub > EPSILON {
        component.pin_edge(pin)
    } else {
        None
    };
    let approach = match edge {
        Some(edge) => {
            let (dx, dy) = edge.outward();
            point.offset(dx * config.pin_stub, dy * config.pin_stub)
        }
        None => point,
    };
    Some(PinAnchor {
        pin: point,
        approach,
        edge,
    })
}

/// A pin with a stub starts clear of its body, so the body stays an obstacle for
/// the rest of the wire. Without a stub the wire may cross its own component.
pub fn wire_exclusions(wire: &Wire, from: &PinAnchor, to: &PinAnchor) -> BTreeSet<String> {
    [(&wire.from, from), (&wire.to, to)]
        .into_iter()
        .filter(|(_, anchor)| !anchor.has_stub())
        .map(|(pin, _)| pin.component.clone())
        .collect()
}

/// Plans and detours between the two approach points, then adds the pin stubs.
pub fn route_between(
    from: &PinAnchor,
    to: &PinAnchor,
    obstacles: &[Obstacle],
    excluded: &BTreeSet<String>,
    config: &RouterConfig,
) -> AvoidOutcome {
    let middle = route_wire(from.approach, to.approach, obstacles, excluded, config);
    let mut points = vec![from.pin, from.approach];
    points.extend(segments_to_points(&middle.segments));
    points.push(to.approach);
    points.push(to.pin);
    AvoidOutcome {
        segments: points_to_segments(&compress_path(&points)),
        ..middle
    }
}

/// Routed geometry of one wire before crossings are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedWire {
    pub wire: Wire,
    pub start: Point,
    pub end: Point,
    pub segments: Vec<Segment>,
    pub residual_overlap: bool,
}

fn scene_anchor(scene: &Scene, wire: &Wire, pin: &PinRef, config: &RouterConfig) -> Option<PinAnchor> {
    let anchor = scene
        .components
        .get(&pin.component)
        .and_then(|component| pin_anchor(component, &pin.pin, config));
    if anchor.is_none() {
        log::warn!("wire {}: unknown pin {}", wire.id, pin);
    }
    anchor
}

pub fn route_scene_wire(
    scene: &Scene,
    wire: &Wire,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> Option<RoutedWire> {
    let from = scene_anchor(scene, wire, &wire.from, config)?;
    let to = scene_anchor(scene, wire, &wire.to, config)?;
    let excluded = wire_exclusions(wire, &from, &to);
    let outcome = route_between(&from, &to, obstacles, &excluded, config);
    Some(RoutedWire {
        wire: wire.clone(),
        start: from.pin,
        end: to.pin,
        segments: outcome.segments,
        residual_overlap: !outcome.converged,
    })
}

/// Runs the global crossing pass over every routed wire, in the given order.
pub fn resolve_routed(routed: &[RoutedWire]) -> BTreeMap<WireId, Vec<Bump>> {
    let snapshot: Vec<(WireId, Vec<Segment>)> = routed
        .iter()
        .map(|r| (r.wire.id, r.segments.clone()))
        .collect();
    resolve(&snapshot)
}

pub fn build_wire_layout(routed: &RoutedWire, bumps: Vec<Bump>, config: &RouterConfig) -> WireLayout {
    let mut path = WirePath::new(routed.start, routed.end, routed.segments.clone());
    path.bumps = bumps;
    let curve = render(&path.segments, &path.bumps, config.bump_radius);
    WireLayout {
        id: routed.wire.id,
        from: routed.wire.from.clone(),
        to: routed.wire.to.clone(),
        path,
        curve,
        residual_overlap: routed.residual_overlap,
    }
}

/// One-shot layout of a whole scene.
pub fn compute_layout(scene: &Scene, config: &RouterConfig) -> SceneLayout {
    let obstacles = scene_obstacles(scene);
    let routed: Vec<RoutedWire> = scene
        .wires
        .iter()
        .filter_map(|wire| route_scene_wire(scene, wire, &obstacles, config))
        .collect();
    let mut bumps = resolve_routed(&routed);
    let wires: Vec<WireLayout> = routed
        .iter()
        .map(|r| {
            let wire_bumps = bumps.remove(&r.wire.id).unwrap_or_default();
            build_wire_layout(r, wire_bumps, config)
        })
        .collect();
    let bounds = scene_bounds(scene, &wires, config.bump_radius);
    SceneLayout {
        components: scene.components.clone(),
        wires,
        preview: None,
        bounds,
    }
}

/// Smallest rectangle covering every component and wire point, grown to take in
/// the crest of each bump arc.
pub fn scene_bounds(scene: &Scene, wires: &[WireLayout], bump_radius: f32) -> Rect {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut include = |p: Point| {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    };
    for component in scene.components.values() {
        include(Point::new(component.rect.x_min, component.rect.y_min));
        include(Point::new(component.rect.x_max, component.rect.y_max));
    }
    for wire in wires {
        for segment in &wire.path.segments {
            include(segment.a);
            include(segment.b);
        }
        // Hops on horizontal runs rise, hops on vertical runs bulge left.
        for bump in &wire.path.bumps {
            include(match bump.orientation {
                Orientation::Vertical => bump.position.offset(0.0, -bump_radius),
                Orientation::Horizontal => bump.position.offset(-bump_radius, 0.0),
            });
        }
    }
    if !min_x.is_finite() {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}
