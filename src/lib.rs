//! Orthogonal wire routing for schematic canvases.
//!
//! Wires between component pins are planned as right-angle polylines, pushed
//! around the bodies of components they do not connect, and given a small hop
//! wherever two wires cross so the drawing never suggests a junction.

pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

pub use canvas::{Canvas, CanvasError};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, RouterConfig};
pub use layout::{avoid, compute_layout, plan, render, resolve};
pub use parser::{SceneError, parse_scene};
pub use theme::Theme;
