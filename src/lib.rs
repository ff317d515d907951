pub mod ast;
pub mod bubble;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod inspector;
pub mod layout;
pub mod layout_dump;
pub mod panel;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod tokens;
pub mod tree_view;

use std::sync::Arc;

pub use ast::{Ast, AstError, AstNode, ChildShape, NodeId, NodeRef};
pub use bubble::BubbleGraph;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, TreeConfig, load_config};
pub use layout::{GraphLayout, LaidOutEdge, LaidOutNode, LayoutError, descendant_count, layout_graph};
pub use panel::{AstPanel, ViewMode, render_page};
pub use render::{render_bubble_svg, render_tree_svg};
pub use theme::Theme;
pub use tokens::{Token, parse_tokens};

/// Everything needed to render an AST document in one call.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    pub view: ViewMode,
    pub selected: Option<NodeId>,
}

impl RenderOptions {
    pub fn explorer() -> Self {
        Self::default()
    }

    pub fn light() -> Self {
        let mut options = Self::default();
        options.config.theme = Theme::light();
        options
    }
}

/// Renders the selected view of `ast_json` as a standalone SVG.
pub fn render_with_options(ast_json: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let ast = Ast::from_json(ast_json)?;
    render_ast(&ast, options)
}

pub fn render_ast(ast: &Ast, options: &RenderOptions) -> anyhow::Result<String> {
    let config = &options.config;
    let selected = options.selected.as_ref();
    let svg = match options.view {
        ViewMode::Bubble => {
            let layout = layout_graph(ast, &config.layout)?;
            render_bubble_svg(&layout, selected, &config.theme, &config.render)
        }
        ViewMode::Tree => {
            let layout = layout::layout_tree(ast, &config.tree, &config.layout, &config.theme.font_family)?;
            render_tree_svg(&layout, selected, config.tree.font_size, &config.theme, &config.render)
        }
    };
    Ok(svg)
}

/// Renders the full panel (view, inspector and tokens) as an HTML page.
pub fn render_panel_with_options(
    ast_json: &str,
    tokens_json: Option<&str>,
    options: &RenderOptions,
) -> anyhow::Result<String> {
    let ast = Arc::new(Ast::from_json(ast_json)?);
    let tokens = match tokens_json {
        Some(raw) => parse_tokens(raw)?,
        None => Vec::new(),
    };
    render_panel_page(&ast, &tokens, options)
}

pub fn render_panel_page(ast: &Arc<Ast>, tokens: &[Token], options: &RenderOptions) -> anyhow::Result<String> {
    let mut panel = AstPanel::new(&options.config);
    panel.set_view_mode(options.view);
    let selected = options
        .selected
        .as_ref()
        .and_then(|id| ast.find_by_id(id))
        .and_then(|node| ast.get(node));
    if options.selected.is_some() && selected.is_none() {
        log::warn!("no node matches the selected id");
    }
    let html = panel.render(Some(ast), selected, tokens)?;
    Ok(render_page(&html, "AST Explorer", &options.config.theme))
}
