use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub surface: String,
    pub surface_border: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_text_color: String,
    pub selected_fill: String,
    pub selected_stroke: String,
    pub accent_color: String,
    pub accent_background: String,
    pub accent_text_color: String,
    pub button_border: String,
    pub button_background: String,
    pub button_text_color: String,
}

impl Theme {
    /// Dark palette of the explorer UI.
    pub fn explorer() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            background: "#0b1020".to_string(),
            surface: "#0f172a".to_string(),
            surface_border: "#1e293b".to_string(),
            text_color: "#e2e8f0".to_string(),
            muted_text_color: "#94a3b8".to_string(),
            line_color: "#1f2a44".to_string(),
            node_fill: "rgba(15,23,42,0.95)".to_string(),
            node_stroke: "#223055".to_string(),
            node_text_color: "#e2e8f0".to_string(),
            selected_fill: "rgba(59,130,246,0.45)".to_string(),
            selected_stroke: "#60a5fa".to_string(),
            accent_color: "#3b82f6".to_string(),
            accent_background: "rgba(59,130,246,0.2)".to_string(),
            accent_text_color: "#bfdbfe".to_string(),
            button_border: "#223055".to_string(),
            button_background: "#0b1020".to_string(),
            button_text_color: "#cbd5e1".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            background: "#FFFFFF".to_string(),
            surface: "#F8FAFF".to_string(),
            surface_border: "#D7E0F0".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#5B677A".to_string(),
            line_color: "#7A8AA6".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#C7D2E5".to_string(),
            node_text_color: "#1C2430".to_string(),
            selected_fill: "rgba(59,130,246,0.25)".to_string(),
            selected_stroke: "#2563EB".to_string(),
            accent_color: "#2563EB".to_string(),
            accent_background: "rgba(37,99,235,0.12)".to_string(),
            accent_text_color: "#1E3A8A".to_string(),
            button_border: "#C7D2E5".to_string(),
            button_background: "#FFFFFF".to_string(),
            button_text_color: "#334155".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "explorer" | "dark" | "default" => Some(Self::explorer()),
            "light" | "modern" => Some(Self::light()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::explorer()
    }
}
