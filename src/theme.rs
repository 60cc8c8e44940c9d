use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub component_fill: String,
    pub component_border: String,
    pub label_color: String,
    pub pin_color: String,
    pub wire_color: String,
    /// Colour of the temporary wire drawn while a connection is in progress.
    pub preview_color: String,
    pub background: String,
}

impl Theme {
    pub fn schematic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            component_fill: "#ECECFF".to_string(),
            component_border: "#9370DB".to_string(),
            label_color: "#333333".to_string(),
            pin_color: "#1C2430".to_string(),
            wire_color: "#000000".to_string(),
            preview_color: "#FF0000".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            component_fill: "#F8FAFF".to_string(),
            component_border: "#C7D2E5".to_string(),
            label_color: "#1C2430".to_string(),
            pin_color: "#7A8AA6".to_string(),
            wire_color: "#334155".to_string(),
            preview_color: "#E11D48".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::schematic()
    }
}
