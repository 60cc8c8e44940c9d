//! Scene description files.
//!
//! A scene lists component boxes with their pins and the wires between pins:
//!
//! ```text
//! {
//!   components: [
//!     { id: "U1", x: 0, y: 0, width: 80, height: 60, pins: [{ name: "out", x: 80, y: 30 }] },
//!     { id: "U2", x: 200, y: 120, width: 80, height: 60, pins: [{ name: "in", x: 0, y: 30 }] },
//!   ],
//!   wires: [{ from: "U1.out", to: "U2.in" }],
//! }
//! ```
//!
//! Strict JSON is tried first; JSON5 (comments, unquoted keys, trailing commas)
//! is the fallback.

use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{Point, Rect};
use crate::ir::{Component, Pin, PinRef, Scene};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene syntax: {0}")]
    Syntax(String),
    #[error("component {0} has a non-finite coordinate")]
    NonFinite(String),
    #[error("component {0} is declared twice")]
    DuplicateComponent(String),
    #[error("component {id} has a non-positive size {width}x{height}")]
    InvalidSize { id: String, width: f32, height: f32 },
    #[error("wire {index}: {token:?} is not a component.pin reference")]
    BadPinRef { index: usize, token: String },
    #[error("wire {index}: unknown pin {pin}")]
    UnknownPin { index: usize, pin: PinRef },
    #[error("wire {index}: pin {pin} is connected to itself")]
    SelfConnection { index: usize, pin: PinRef },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    components: Vec<ComponentFile>,
    #[serde(default)]
    wires: Vec<WireFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentFile {
    id: String,
    label: Option<String>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default)]
    pins: Vec<PinFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PinFile {
    name: String,
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireFile {
    from: String,
    to: String,
}

pub fn parse_scene(input: &str) -> Result<Scene, SceneError> {
    let file: SceneFile = match serde_json::from_str(input) {
        Ok(file) => file,
        Err(json_err) => json5::from_str(input).map_err(|json5_err| {
            log::debug!("strict JSON parse failed: {json_err}");
            SceneError::Syntax(json5_err.to_string())
        })?,
    };

    let mut scene = Scene::new();
    for component in file.components {
        let finite = [component.x, component.y, component.width, component.height]
            .into_iter()
            .chain(component.pins.iter().flat_map(|pin| [pin.x, pin.y]))
            .all(f32::is_finite);
        if !finite {
            return Err(SceneError::NonFinite(component.id));
        }
        if component.width <= 0.0 || component.height <= 0.0 {
            // Zero-size bodies would never act as obstacles; reject them up front.
            return Err(SceneError::InvalidSize {
                id: component.id,
                width: component.width,
                height: component.height,
            });
        }
        if scene.components.contains_key(&component.id) {
            return Err(SceneError::DuplicateComponent(component.id));
        }
        let pins = component
            .pins
            .into_iter()
            .map(|pin| Pin {
                name: pin.name,
                offset: Point::new(pin.x, pin.y),
            })
            .collect();
        scene.add_component(Component {
            label: component.label.unwrap_or_else(|| component.id.clone()),
            id: component.id,
            rect: Rect::from_origin_size(component.x, component.y, component.width, component.height),
            pins,
        });
    }

    let mut seen = BTreeSet::new();
    for (index, wire) in file.wires.into_iter().enumerate() {
        let from = parse_pin_ref(index, &wire.from)?;
        let to = parse_pin_ref(index, &wire.to)?;
        for pin in [&from, &to] {
            if scene.resolve_pin(pin).is_none() {
                return Err(SceneError::UnknownPin {
                    index,
                    pin: pin.clone(),
                });
            }
        }
        if from == to {
            return Err(SceneError::SelfConnection { index, pin: from });
        }
        if !seen.insert((from.clone(), to.clone())) {
            log::warn!("wire {index}: duplicate connection {from} -> {to}");
        }
        scene.add_wire(from, to);
    }

    log::debug!(
        "parsed scene with {} components and {} wires",
        scene.components.len(),
        scene.wires.len()
    );
    Ok(scene)
}

fn parse_pin_ref(index: usize, token: &str) -> Result<PinRef, SceneError> {
    PinRef::parse(token).ok_or_else(|| SceneError::BadPinRef {
        index,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::WireId;

    const TWO_CHIPS: &str = r#"
        // comment lines only work through the JSON5 fallback
        {
          components: [
            { id: "U1", label: "MCU", x: 0, y: 0, width: 80, height: 60,
              pins: [{ name: "out", x: 80, y: 30 }] },
            { id: "U2", x: 200, y: 120, width: 80, height: 60,
              pins: [{ name: "in", x: 0, y: 30 }] },
          ],
          wires: [{ from: "U1.out", to: "U2.in" }],
        }
    "#;

    #[test]
    fn parses_json5_scene() {
        let scene = parse_scene(TWO_CHIPS).expect("scene parses");
        assert_eq!(scene.components.len(), 2);
        assert_eq!(scene.components["U1"].label, "MCU");
        assert_eq!(scene.components["U2"].label, "U2");
        assert_eq!(scene.wires.len(), 1);
        assert_eq!(scene.wires[0].id, WireId(0));
        assert_eq!(
            scene.resolve_pin(&scene.wires[0].to),
            Some(Point::new(200.0, 150.0))
        );
    }

    #[test]
    fn parses_strict_json_scene() {
        let scene = parse_scene(r#"{"components": [], "wires": []}"#).expect("scene parses");
        assert!(scene.components.is_empty());
    }

    #[test]
    fn rejects_unknown_pins() {
        let input = TWO_CHIPS.replace("U2.in", "U2.clk");
        let err = parse_scene(&input).unwrap_err();
        assert!(matches!(err, SceneError::UnknownPin { index: 0, .. }));
    }

    #[test]
    fn rejects_malformed_refs_and_sizes() {
        let bad_ref = TWO_CHIPS.replace("U2.in", "U2in");
        assert!(matches!(
            parse_scene(&bad_ref),
            Err(SceneError::BadPinRef { .. })
        ));
        let bad_size = TWO_CHIPS.replace(
            r#"{ id: "U2", x: 200, y: 120, width: 80"#,
            r#"{ id: "U2", x: 200, y: 120, width: 0"#,
        );
        assert!(matches!(
            parse_scene(&bad_size),
            Err(SceneError::InvalidSize { .. })
        ));
        assert!(matches!(parse_scene("{ components: ["), Err(SceneError::Syntax(_))));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let nan_origin = TWO_CHIPS.replace(r#"label: "MCU", x: 0"#, r#"label: "MCU", x: NaN"#);
        assert!(matches!(
            parse_scene(&nan_origin),
            Err(SceneError::NonFinite(id)) if id == "U1"
        ));
        let infinite_size = TWO_CHIPS.replace(
            r#"{ id: "U2", x: 200, y: 120, width: 80"#,
            r#"{ id: "U2", x: 200, y: 120, width: Infinity"#,
        );
        assert!(matches!(
            parse_scene(&infinite_size),
            Err(SceneError::NonFinite(id)) if id == "U2"
        ));
        let bad_pin = TWO_CHIPS.replace(r#"{ name: "in", x: 0"#, r#"{ name: "in", x: -Infinity"#);
        assert!(matches!(
            parse_scene(&bad_pin),
            Err(SceneError::NonFinite(id)) if id == "U2"
        ));
    }

    #[test]
    fn rejects_self_connections() {
        let input = TWO_CHIPS.replace("U2.in", "U1.out");
        assert!(matches!(
            parse_scene(&input),
            Err(SceneError::SelfConnection { .. })
        ));
    }
}
