use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{EPSILON, Point, Rect};

/// Identifies one wire. Ids are handed out in creation order, which the crossing
/// tie-break relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireId(pub u32);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    /// Connection point relative to the component's top-left corner.
    pub offset: Point,
}

/// Side of the component body a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl PinEdge {
    /// Unit step pointing away from the body.
    pub fn outward(self) -> (f32, f32) {
        match self {
            PinEdge::Left => (-1.0, 0.0),
            PinEdge::Right => (1.0, 0.0),
            PinEdge::Top => (0.0, -1.0),
            PinEdge::Bottom => (0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub label: String,
    pub rect: Rect,
    pub pins: Vec<Pin>,
}

impl Component {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            rect,
            pins: Vec::new(),
        }
    }

    pub fn with_pin(mut self, name: impl Into<String>, offset: Point) -> Self {
        self.pins.push(Pin {
            name: name.into(),
            offset,
        });
        self
    }

    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.name == name)
    }

    /// Edge a pin lies on, derived from its offset. Corner pins count as left or
    /// right; pins inside or away from the body have no edge.
    pub fn pin_edge(&self, name: &str) -> Option<PinEdge> {
        let offset = self.pin(name)?.offset;
        let (width, height) = (self.rect.width(), self.rect.height());
        let on = |v: f32, target: f32| (v - target).abs() <= EPSILON;
        let within = |v: f32, len: f32| v >= -EPSILON && v <= len + EPSILON;
        if within(offset.y, height) {
            if on(offset.x, 0.0) {
                return Some(PinEdge::Left);
            }
            if on(offset.x, width) {
                return Some(PinEdge::Right);
            }
        }
        if within(offset.x, width) {
            if on(offset.y, 0.0) {
                return Some(PinEdge::Top);
            }
            if on(offset.y, height) {
                return Some(PinEdge::Bottom);
            }
        }
        None
    }

    pub fn pin_position(&self, name: &str) -> Option<Point> {
        let origin = self.rect.origin();
        self.pin(name)
            .map(|pin| origin.offset(pin.offset.x, pin.offset.y))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinRef {
    pub component: String,
    pub pin: String,
}

impl PinRef {
    pub fn new(component: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            pin: pin.into(),
        }
    }

    /// Parses the `component.pin` shorthand used in scene files.
    pub fn parse(token: &str) -> Option<Self> {
        let (component, pin) = token.trim().split_once('.')?;
        if component.is_empty() || pin.is_empty() {
            return None;
        }
        Some(Self::new(component, pin))
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.pin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub from: PinRef,
    pub to: PinRef,
}

impl Wire {
    pub fn touches(&self, component: &str) -> bool {
        self.from.component == component || self.to.component == component
    }
}

/// Host-owned snapshot of everything on the canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub components: BTreeMap<String, Component>,
    /// Creation order.
    pub wires: Vec<Wire>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: Component) -> Option<Component> {
        self.components.insert(component.id.clone(), component)
    }

    pub fn next_wire_id(&self) -> WireId {
        let next = self.wires.iter().map(|wire| wire.id.0 + 1).max().unwrap_or(0);
        WireId(next)
    }

    pub fn add_wire(&mut self, from: PinRef, to: PinRef) -> WireId {
        let id = self.next_wire_id();
        self.wires.push(Wire { id, from, to });
        id
    }

    pub fn resolve_pin(&self, pin: &PinRef) -> Option<Point> {
        self.components
            .get(&pin.component)
            .and_then(|component| component.pin_position(&pin.pin))
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.iter().find(|wire| wire.id == id)
    }
}
