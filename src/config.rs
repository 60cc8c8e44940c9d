use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs for the routing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Gap kept between a detour lane and the obstacle it steps around.
    pub clearance: f32,
    /// Upper bound on detour passes before a path is accepted as-is.
    pub max_passes: usize,
    /// Radius of the semicircular hop drawn at a crossing.
    pub bump_radius: f32,
    /// Length of the straight run leaving a pin square to its edge before the
    /// wire is free to turn. Zero disables stubs.
    pub pin_stub: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            clearance: 20.0,
            max_passes: 10,
            bump_radius: 8.0,
            pin_stub: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Margin added around the scene bounds.
    pub padding: f32,
    pub wire_width: f32,
    pub show_pins: bool,
    pub show_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            wire_width: 2.0,
            show_pins: true,
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub router: RouterConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RouterConfigFile {
    clearance: Option<f32>,
    max_passes: Option<usize>,
    bump_radius: Option<f32>,
    pin_stub: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    wire_width: Option<f32>,
    show_pins: Option<bool>,
    show_labels: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    component_fill: Option<String>,
    component_border: Option<String>,
    label_color: Option<String>,
    pin_color: Option<String>,
    wire_color: Option<String>,
    preview_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    router: Option<RouterConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "schematic" | "default" => config.theme = Theme::schematic(),
            other => log::warn!("unknown theme {other:?}, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.component_fill {
            config.theme.component_fill = v;
        }
        if let Some(v) = vars.component_border {
            config.theme.component_border = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.pin_color {
            config.theme.pin_color = v;
        }
        if let Some(v) = vars.wire_color {
            config.theme.wire_color = v;
        }
        if let Some(v) = vars.preview_color {
            config.theme.preview_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(router) = parsed.router {
        if let Some(v) = router.clearance {
            config.router.clearance = v.max(0.0);
        }
        if let Some(v) = router.max_passes {
            config.router.max_passes = v;
        }
        if let Some(v) = router.bump_radius {
            config.router.bump_radius = v.max(0.0);
        }
        if let Some(v) = router.pin_stub {
            config.router.pin_stub = v.max(0.0);
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.wire_width {
            config.render.wire_width = v;
        }
        if let Some(v) = render.show_pins {
            config.render.show_pins = v;
        }
        if let Some(v) = render.show_labels {
            config.render.show_labels = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_router_constants() {
        let config = Config::default();
        assert_eq!(config.router.clearance, 20.0);
        assert_eq!(config.router.max_passes, 10);
        assert_eq!(config.router.bump_radius, 8.0);
        assert_eq!(config.router.pin_stub, 20.0);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": { "wireColor": "#123456" },
                "router": { "clearance": 12.5, "maxPasses": 4, "pinStub": -3 },
                "render": { "showPins": false }
            }"##,
        )
        .expect("config parses");
        assert_eq!(config.theme.wire_color, "#123456");
        assert_eq!(config.theme.component_border, Theme::modern().component_border);
        assert_eq!(config.router.clearance, 12.5);
        assert_eq!(config.router.max_passes, 4);
        assert_eq!(config.router.pin_stub, 0.0);
        assert_eq!(config.router.bump_radius, 8.0);
        assert!(!config.render.show_pins);
        assert!(config.render.show_labels);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_config("{ router: ").is_err());
    }
}
