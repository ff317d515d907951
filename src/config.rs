use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Grid and radius constants of the bubble graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub column_width: f32,
    pub row_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub min_width: f32,
    pub min_height: f32,
    /// Room for labels and radii past the last column/row.
    pub overflow_slack: f32,
    pub base_radius: f32,
    pub radius_step: f32,
    pub max_radius_growth: f32,
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 200.0,
            row_height: 90.0,
            padding_x: 30.0,
            padding_y: 30.0,
            min_width: 600.0,
            min_height: 320.0,
            overflow_slack: 120.0,
            base_radius: 18.0,
            radius_step: 2.0,
            max_radius_growth: 22.0,
            max_depth: 512,
            max_nodes: 100_000,
        }
    }
}

impl LayoutConfig {
    /// Spacing and radius values must be finite and non-negative.
    pub fn validate(&self) -> anyhow::Result<()> {
        let fields = [
            ("columnWidth", self.column_width),
            ("rowHeight", self.row_height),
            ("paddingX", self.padding_x),
            ("paddingY", self.padding_y),
            ("minWidth", self.min_width),
            ("minHeight", self.min_height),
            ("overflowSlack", self.overflow_slack),
            ("baseRadius", self.base_radius),
            ("radiusStep", self.radius_step),
            ("maxRadiusGrowth", self.max_radius_growth),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("layout.{name} must be a finite, non-negative number (got {value})");
            }
        }
        Ok(())
    }
}

/// Indented outline used by the tree view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
    pub indent: f32,
    pub row_height: f32,
    pub padding: f32,
    pub row_padding_x: f32,
    pub font_size: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub show_ids: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            indent: 18.0,
            row_height: 24.0,
            padding: 12.0,
            row_padding_x: 8.0,
            font_size: 12.0,
            min_width: 320.0,
            min_height: 120.0,
            show_ids: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Emit `width="100%"` instead of the layout width, for embedding.
    pub fluid_width: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            fluid_width: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub tree: TreeConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    node_text_color: Option<String>,
    selected_fill: Option<String>,
    selected_stroke: Option<String>,
    accent_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    tree: Option<TreeConfig>,
    render: Option<RenderConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::from_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => log::warn!("unknown theme {theme_name:?}, keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.node_text_color {
            config.theme.node_text_color = v;
        }
        if let Some(v) = vars.selected_fill {
            config.theme.selected_fill = v;
        }
        if let Some(v) = vars.selected_stroke {
            config.theme.selected_stroke = v;
        }
        if let Some(v) = vars.accent_color {
            config.theme.accent_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        layout.validate()?;
        config.layout = layout;
    }
    if let Some(tree) = parsed.tree {
        config.tree = tree;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    Ok(config)
}
