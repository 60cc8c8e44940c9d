use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::{Orientation, Point, Rect, Segment};
use crate::ir::{Component, PinRef, WireId};

use super::path::PathCurve;

/// A rectangle wires must not pass through, tagged with the component it
/// belongs to so a wire can exclude its own endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obstacle {
    pub id: String,
    pub rect: Rect,
}

impl Obstacle {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
        }
    }
}

/// Jog drawn where a wire crosses another. `orientation` is the direction the
/// jog leaves the wire, perpendicular to the segment it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bump {
    pub position: Point,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WirePath {
    pub start: Point,
    pub end: Point,
    pub segments: Vec<Segment>,
    pub bumps: Vec<Bump>,
}

impl WirePath {
    pub fn new(start: Point, end: Point, segments: Vec<Segment>) -> Self {
        Self {
            start,
            end,
            segments,
            bumps: Vec::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        crate::geometry::segments_to_points(&self.segments)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireLayout {
    pub id: WireId,
    pub from: PinRef,
    pub to: PinRef,
    pub path: WirePath,
    pub curve: PathCurve,
    /// The detour loop hit its pass cap and the path still overlaps a component.
    pub residual_overlap: bool,
}

/// Temporary wire following the cursor while a connection is being drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewLayout {
    pub from: PinRef,
    pub path: WirePath,
    pub curve: PathCurve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub components: BTreeMap<String, Component>,
    pub wires: Vec<WireLayout>,
    pub preview: Option<PreviewLayout>,
    pub bounds: Rect,
}

impl SceneLayout {
    pub fn wire(&self, id: WireId) -> Option<&WireLayout> {
        self.wires.iter().find(|wire| wire.id == id)
    }

    pub fn bump_count(&self) -> usize {
        self.wires.iter().map(|wire| wire.path.bumps.len()).sum()
    }
}
