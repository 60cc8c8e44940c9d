use crate::geometry::Orientation;
use crate::layout::SceneLayout;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub bounds: [f32; 4],
    pub components: Vec<ComponentDump>,
    pub wires: Vec<WireDump>,
    pub preview: Option<PreviewDump>,
}

#[derive(Debug, Serialize)]
pub struct ComponentDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub pins: Vec<PinDump>,
}

#[derive(Debug, Serialize)]
pub struct PinDump {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct WireDump {
    pub id: u32,
    pub from: String,
    pub to: String,
    pub segments: Vec<[[f32; 2]; 2]>,
    pub bumps: Vec<BumpDump>,
    pub arcs: usize,
    pub d: String,
    pub residual_overlap: bool,
}

#[derive(Debug, Serialize)]
pub struct BumpDump {
    pub x: f32,
    pub y: f32,
    pub orientation: Orientation,
}

#[derive(Debug, Serialize)]
pub struct PreviewDump {
    pub from: String,
    pub d: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &SceneLayout) -> Self {
        let components = layout
            .components
            .values()
            .map(|component| ComponentDump {
                id: component.id.clone(),
                label: component.label.clone(),
                x: component.rect.x_min,
                y: component.rect.y_min,
                width: component.rect.width(),
                height: component.rect.height(),
                pins: component
                    .pins
                    .iter()
                    .filter_map(|pin| {
                        component.pin_position(&pin.name).map(|p| PinDump {
                            name: pin.name.clone(),
                            x: p.x,
                            y: p.y,
                        })
                    })
                    .collect(),
            })
            .collect();

        let wires = layout
            .wires
            .iter()
            .map(|wire| WireDump {
                id: wire.id.0,
                from: wire.from.to_string(),
                to: wire.to.to_string(),
                segments: wire
                    .path
                    .segments
                    .iter()
                    .map(|s| [[s.a.x, s.a.y], [s.b.x, s.b.y]])
                    .collect(),
                bumps: wire
                    .path
                    .bumps
                    .iter()
                    .map(|bump| BumpDump {
                        x: bump.position.x,
                        y: bump.position.y,
                        orientation: bump.orientation,
                    })
                    .collect(),
                arcs: wire.curve.arc_count(),
                d: wire.curve.to_svg_path(),
                residual_overlap: wire.residual_overlap,
            })
            .collect();

        let preview = layout.preview.as_ref().map(|preview| PreviewDump {
            from: preview.from.to_string(),
            d: preview.curve.to_svg_path(),
        });

        LayoutDump {
            bounds: [
                layout.bounds.x_min,
                layout.bounds.y_min,
                layout.bounds.x_max,
                layout.bounds.y_max,
            ],
            components,
            wires,
            preview,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, layout: &SceneLayout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &dump)?;
            println!();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::geometry::{Point, Rect};
    use crate::ir::{Component, PinRef, Scene};
    use crate::layout::compute_layout;

    #[test]
    fn dump_carries_bumps_and_path_data() {
        let mut scene = Scene::new();
        scene.add_component(
            Component::new("W", Rect::from_origin_size(0.0, 40.0, 20.0, 40.0))
                .with_pin("e", Point::new(20.0, 20.0)),
        );
        scene.add_component(
            Component::new("E", Rect::from_origin_size(200.0, 40.0, 20.0, 40.0))
                .with_pin("w", Point::new(0.0, 20.0)),
        );
        scene.add_component(
            Component::new("N", Rect::from_origin_size(90.0, -100.0, 40.0, 20.0))
                .with_pin("s", Point::new(20.0, 20.0)),
        );
        scene.add_component(
            Component::new("S", Rect::from_origin_size(90.0, 200.0, 40.0, 20.0))
                .with_pin("n", Point::new(20.0, 0.0)),
        );
        scene.add_wire(PinRef::new("W", "e"), PinRef::new("E", "w"));
        scene.add_wire(PinRef::new("N", "s"), PinRef::new("S", "n"));

        let layout = compute_layout(&scene, &RouterConfig::default());
        let dump = LayoutDump::from_layout(&layout);
        assert_eq!(dump.components.len(), 4);
        assert_eq!(dump.wires.len(), 2);
        assert_eq!(dump.wires[0].from, "W.e");
        assert_eq!(dump.wires[0].bumps.len(), 1);
        assert_eq!(dump.wires[0].arcs, 1);
        assert!(dump.wires[1].bumps.is_empty());
        assert!(dump.wires[0].d.contains(" A "));

        let json = serde_json::to_value(&dump).expect("dump serializes");
        assert_eq!(json["wires"][0]["bumps"][0]["orientation"], "vertical");
    }
}
