use ast_explorer::{NodeId, RenderOptions, Theme, ViewMode, render_panel_with_options, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerRenderOptions {
    theme: Option<String>,
    view: Option<ViewMode>,
    selected_id: Option<serde_json::Value>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fluid_width: Option<bool>,
}

fn build_render_options(options: ExplorerRenderOptions) -> RenderOptions {
    let mut render_options = RenderOptions::explorer();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::from_name) {
        render_options.config.theme = theme;
    }
    if let Some(view) = options.view {
        render_options.view = view;
    }
    render_options.selected = options.selected_id.and_then(|value| match value {
        serde_json::Value::Number(n) => Some(NodeId::Number(n)),
        serde_json::Value::String(s) => Some(NodeId::Text(s)),
        _ => None,
    });
    if let Some(font_family) = options.font_family {
        render_options.config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.config.theme.font_size = font_size;
    }
    render_options.config.render.fluid_width = options.fluid_width.unwrap_or(true);
    render_options
}

fn parse_options(options_json: Option<String>) -> Result<ExplorerRenderOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str::<ExplorerRenderOptions>(&raw)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(ExplorerRenderOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_ast_svg(ast_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(ast_json, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_ast_panel(
    ast_json: &str,
    tokens_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_panel_with_options(ast_json, tokens_json.as_deref(), &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use ast_explorer::{NodeId, ViewMode, render_with_options};

    use crate::{ExplorerRenderOptions, build_render_options};

    #[test]
    fn renders_bubble_graph_with_selection() {
        let code = r#"{"id":1,"type":"Program","children":[{"id":2,"type":"Num"},{"id":3,"type":"Num"}]}"#;
        let options: ExplorerRenderOptions =
            serde_json::from_str(r#"{"view":"bubble","selectedId":2}"#).unwrap();
        let render_options = build_render_options(options);
        assert_eq!(render_options.view, ViewMode::Bubble);
        assert_eq!(render_options.selected, Some(NodeId::from(2)));

        let svg = render_with_options(code, &render_options).expect("bubble graph should render");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("width=\"100%\""));
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn defaults_to_tree_view() {
        let render_options = build_render_options(ExplorerRenderOptions::default());
        assert_eq!(render_options.view, ViewMode::Tree);
        let svg = render_with_options(r#"{"type":"Program"}"#, &render_options).unwrap();
        assert!(svg.contains("Program"));
    }
}
