//! Host-side controller that owns the scene and keeps routed geometry current.
//!
//! Every mutating call re-routes the wires it touched and then reruns the crossing
//! pass over all wires, so bumps never come from stale geometry. The router itself
//! keeps no state between calls; everything lives here.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::config::RouterConfig;
use crate::geometry::{Point, Rect};
use crate::ir::{Component, PinRef, Scene, Wire, WireId};
use crate::layout::{
    Bump, Obstacle, PinAnchor, PreviewLayout, RoutedWire, SceneLayout, WireLayout, WirePath,
    build_wire_layout, pin_anchor, render, resolve_routed, route_between, route_scene_wire,
    scene_bounds, scene_obstacles,
};

#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    #[error("component {0} already exists")]
    DuplicateComponent(String),
    #[error("unknown component {0}")]
    UnknownComponent(String),
    #[error("unknown pin {0}")]
    UnknownPin(PinRef),
    #[error("unknown wire {0}")]
    UnknownWire(WireId),
    #[error("cannot connect pin {0} to itself")]
    SelfConnection(PinRef),
}

#[derive(Debug, Clone)]
pub struct Canvas {
    scene: Scene,
    config: RouterConfig,
    routes: BTreeMap<WireId, RoutedWire>,
    bumps: BTreeMap<WireId, Vec<Bump>>,
    next_wire: u32,
    preview: Option<PreviewLayout>,
}

impl Canvas {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            scene: Scene::new(),
            config,
            routes: BTreeMap::new(),
            bumps: BTreeMap::new(),
            next_wire: 0,
            preview: None,
        }
    }

    /// Takes over an existing scene and routes all of its wires.
    pub fn from_scene(scene: Scene, config: RouterConfig) -> Self {
        let next_wire = scene.next_wire_id().0;
        let mut canvas = Self {
            scene,
            config,
            routes: BTreeMap::new(),
            bumps: BTreeMap::new(),
            next_wire,
            preview: None,
        };
        let ids: Vec<WireId> = canvas.scene.wires.iter().map(|wire| wire.id).collect();
        canvas.reroute(&ids);
        canvas
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn bumps(&self, id: WireId) -> &[Bump] {
        self.bumps.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn routed(&self, id: WireId) -> Option<&RoutedWire> {
        self.routes.get(&id)
    }

    pub fn add_component(&mut self, component: Component) -> Result<(), CanvasError> {
        if self.scene.components.contains_key(&component.id) {
            return Err(CanvasError::DuplicateComponent(component.id));
        }
        log::debug!("placing component {} at {:?}", component.id, component.rect);
        self.scene.add_component(component);
        // A new body can block wires that used to pass freely.
        let all = self.wire_ids();
        self.reroute(&all);
        Ok(())
    }

    /// Removes the component and every wire attached to it.
    pub fn remove_component(&mut self, id: &str) -> Result<Vec<WireId>, CanvasError> {
        if self.scene.components.remove(id).is_none() {
            return Err(CanvasError::UnknownComponent(id.to_string()));
        }
        let dropped: Vec<WireId> = self
            .scene
            .wires
            .iter()
            .filter(|wire| wire.touches(id))
            .map(|wire| wire.id)
            .collect();
        self.scene.wires.retain(|wire| !wire.touches(id));
        for wire in &dropped {
            self.routes.remove(wire);
        }
        if self
            .preview
            .as_ref()
            .is_some_and(|preview| preview.from.component == id)
        {
            self.preview = None;
        }
        log::debug!("removed component {id} and {} attached wires", dropped.len());
        let all = self.wire_ids();
        self.reroute(&all);
        Ok(dropped)
    }

    pub fn move_component(&mut self, id: &str, dx: f32, dy: f32) -> Result<(), CanvasError> {
        let component = self
            .scene
            .components
            .get_mut(id)
            .ok_or_else(|| CanvasError::UnknownComponent(id.to_string()))?;
        component.rect = component.rect.translate(dx, dy);
        // Any wire may now run through the moved body, not only the attached ones.
        let all = self.wire_ids();
        self.reroute(&all);
        Ok(())
    }

    pub fn place_component(&mut self, id: &str, x: f32, y: f32) -> Result<(), CanvasError> {
        let rect = self
            .scene
            .components
            .get(id)
            .map(|component| component.rect)
            .ok_or_else(|| CanvasError::UnknownComponent(id.to_string()))?;
        self.move_component(id, x - rect.x_min, y - rect.y_min)
    }

    pub fn connect(&mut self, from: PinRef, to: PinRef) -> Result<WireId, CanvasError> {
        if from == to {
            return Err(CanvasError::SelfConnection(from));
        }
        self.anchor(&from)?;
        self.anchor(&to)?;

        let id = WireId(self.next_wire);
        self.next_wire += 1;
        log::debug!("connecting {from} -> {to} as {id}");
        self.scene.wires.push(Wire { id, from, to });
        self.preview = None;
        self.reroute(&[id]);
        Ok(id)
    }

    pub fn disconnect(&mut self, id: WireId) -> Result<Wire, CanvasError> {
        let idx = self
            .scene
            .wires
            .iter()
            .position(|wire| wire.id == id)
            .ok_or(CanvasError::UnknownWire(id))?;
        let wire = self.scene.wires.remove(idx);
        self.routes.remove(&id);
        self.reroute(&[]);
        Ok(wire)
    }

    /// Temporary wire from `from` to the cursor. The free end is not attached to
    /// anything, so only the start component can be excluded, and only when its pin
    /// has no stub.
    pub fn preview(&mut self, from: &PinRef, cursor: Point) -> Result<&PreviewLayout, CanvasError> {
        let anchor = self.anchor(from)?;
        let obstacles = scene_obstacles(&self.scene);
        let excluded: BTreeSet<String> = if anchor.has_stub() {
            BTreeSet::new()
        } else {
            [from.component.clone()].into_iter().collect()
        };
        let free_end = PinAnchor {
            pin: cursor,
            approach: cursor,
            edge: None,
        };
        let outcome = route_between(&anchor, &free_end, &obstacles, &excluded, &self.config);
        let path = WirePath::new(anchor.pin, cursor, outcome.segments);
        let curve = render(&path.segments, &[], self.config.bump_radius);
        Ok(&*self.preview.insert(PreviewLayout {
            from: from.clone(),
            path,
            curve,
        }))
    }

    pub fn cancel_preview(&mut self) {
        self.preview = None;
    }

    pub fn layout(&self) -> SceneLayout {
        let wires: Vec<WireLayout> = self
            .scene
            .wires
            .iter()
            .filter_map(|wire| self.routes.get(&wire.id))
            .map(|routed| {
                let bumps = self.bumps.get(&routed.wire.id).cloned().unwrap_or_default();
                build_wire_layout(routed, bumps, &self.config)
            })
            .collect();
        let mut bounds = scene_bounds(&self.scene, &wires, self.config.bump_radius);
        if let Some(preview) = &self.preview {
            for segment in &preview.path.segments {
                bounds = Rect::new(
                    bounds.x_min.min(segment.a.x.min(segment.b.x)),
                    bounds.y_min.min(segment.a.y.min(segment.b.y)),
                    bounds.x_max.max(segment.a.x.max(segment.b.x)),
                    bounds.y_max.max(segment.a.y.max(segment.b.y)),
                );
            }
        }
        SceneLayout {
            components: self.scene.components.clone(),
            wires,
            preview: self.preview.clone(),
            bounds,
        }
    }

    fn wire_ids(&self) -> Vec<WireId> {
        self.scene.wires.iter().map(|wire| wire.id).collect()
    }

    fn anchor(&self, pin: &PinRef) -> Result<PinAnchor, CanvasError> {
        let component = self
            .scene
            .components
            .get(&pin.component)
            .ok_or_else(|| CanvasError::UnknownComponent(pin.component.clone()))?;
        pin_anchor(component, &pin.pin, &self.config)
            .ok_or_else(|| CanvasError::UnknownPin(pin.clone()))
    }

    /// Re-plans `changed`, then recomputes every bump from the full wire set.
    fn reroute(&mut self, changed: &[WireId]) {
        let obstacles: Vec<Obstacle> = scene_obstacles(&self.scene);
        for id in changed {
            let Some(wire) = self.scene.wire(*id) else {
                continue;
            };
            match route_scene_wire(&self.scene, wire, &obstacles, &self.config) {
                Some(routed) => {
                    if routed.residual_overlap {
                        log::warn!("wire {id} overlaps a component after rerouting");
                    }
                    self.routes.insert(*id, routed);
                }
                None => {
                    self.routes.remove(id);
                }
            }
        }

        let ordered: Vec<RoutedWire> = self
            .scene
            .wires
            .iter()
            .filter_map(|wire| self.routes.get(&wire.id).cloned())
            .collect();
        self.bumps = resolve_routed(&ordered);
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}
