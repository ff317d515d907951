//! The AST card: view toggle, active visualization and the side pane.
//!
//! Selection is owned by the caller. The panel only reads it when rendering
//! and reports clicks through a callback, so switching views keeps whatever
//! node is selected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::{Ast, AstNode, NodeRef};
use crate::bubble::BubbleGraph;
use crate::config::{Config, RenderConfig};
use crate::inspector::{NodeInspector, TokensList};
use crate::layout::LayoutError;
use crate::render::escape_xml;
use crate::theme::Theme;
use crate::tokens::Token;
use crate::tree_view::TreeView;

pub const PLACEHOLDER_TEXT: &str = "Click <b>Parse</b> to generate an AST.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Tree,
    Bubble,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Tree, ViewMode::Bubble];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "tree" => Some(Self::Tree),
            "bubble" => Some(Self::Bubble),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Bubble => "bubble",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Tree => "Tree",
            Self::Bubble => "Bubble Graph",
        }
    }
}

pub struct AstPanel {
    view_mode: ViewMode,
    theme: Theme,
    render: RenderConfig,
    tree: TreeView,
    bubble: BubbleGraph,
}

impl AstPanel {
    pub fn new(config: &Config) -> Self {
        let render = RenderConfig {
            fluid_width: true,
            ..config.render.clone()
        };
        Self {
            view_mode: ViewMode::default(),
            theme: config.theme.clone(),
            render,
            tree: TreeView::new(config.tree.clone(), config.layout.clone()),
            bubble: BubbleGraph::new(config.layout.clone()),
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            log::debug!("view mode {} -> {}", self.view_mode.token(), mode.token());
        }
        self.view_mode = mode;
    }

    pub fn toggle(&mut self) {
        let next = match self.view_mode {
            ViewMode::Tree => ViewMode::Bubble,
            ViewMode::Bubble => ViewMode::Tree,
        };
        self.set_view_mode(next);
    }

    pub fn bubble(&self) -> &BubbleGraph {
        &self.bubble
    }

    pub fn tree(&self) -> &TreeView {
        &self.tree
    }

    /// Renders the card. Only the active view is laid out; each view keeps
    /// its layout until it is shown with a different AST.
    pub fn render(
        &mut self,
        ast: Option<&Arc<Ast>>,
        selected: Option<&AstNode>,
        tokens: &[Token],
    ) -> Result<String, LayoutError> {
        let theme = &self.theme;
        let mut html = String::new();
        html.push_str(&format!(
            "<section class=\"ast-card\" style=\"background:{};border:1px solid {};border-radius:14px;padding:16px;color:{}\">",
            theme.surface, theme.surface_border, theme.text_color
        ));
        html.push_str(
            "<div style=\"display:flex;align-items:center;justify-content:space-between\"><h2 style=\"margin:0 0 12px;font-size:16px\">AST</h2>",
        );

        let Some(ast) = ast.filter(|ast| !ast.is_empty()) else {
            html.push_str("</div>");
            html.push_str(&format!(
                "<div class=\"placeholder\" style=\"color:{};padding:24px 0\">{PLACEHOLDER_TEXT}</div>",
                theme.muted_text_color
            ));
            html.push_str("</section>");
            return Ok(html);
        };

        html.push_str("<div style=\"display:flex;gap:8px\">");
        for mode in ViewMode::ALL {
            html.push_str(&toggle_button(mode, mode == self.view_mode, theme));
        }
        html.push_str("</div></div>");

        let selected_id = selected.and_then(|node| node.id.as_ref());
        let view = match self.view_mode {
            ViewMode::Tree => {
                self.tree.update(Some(ast), &theme.font_family)?;
                self.tree.render(selected_id, theme, &self.render)
            }
            ViewMode::Bubble => {
                self.bubble.update(Some(ast))?;
                self.bubble.render(selected_id, theme, &self.render)
            }
        };

        html.push_str(
            "<div class=\"output-grid\" style=\"display:grid;grid-template-columns:minmax(0,2fr) minmax(0,1fr);gap:12px\">",
        );
        html.push_str(&format!(
            "<div class=\"tree-pane\" data-view=\"{}\" style=\"overflow:auto;border:1px solid {};border-radius:10px\">",
            self.view_mode.token(),
            theme.surface_border
        ));
        html.push_str(&view);
        html.push_str("</div>");
        html.push_str("<div class=\"inspector-pane\">");
        html.push_str(&NodeInspector::render(selected, theme));
        html.push_str(&TokensList::render(tokens, theme));
        html.push_str("</div></div></section>");
        Ok(html)
    }

    /// Routes a click in view coordinates to the active view.
    pub fn click<F>(&self, x: f32, y: f32, set_selected: F) -> bool
    where
        F: FnOnce(NodeRef, &AstNode),
    {
        match self.view_mode {
            ViewMode::Tree => self.tree.click(x, y, set_selected),
            ViewMode::Bubble => self.bubble.click(x, y, set_selected),
        }
    }
}

fn toggle_button(mode: ViewMode, active: bool, theme: &Theme) -> String {
    let (border, background, color) = if active {
        (&theme.accent_color, &theme.accent_background, &theme.accent_text_color)
    } else {
        (&theme.button_border, &theme.button_background, &theme.button_text_color)
    };
    format!(
        "<button type=\"button\" data-view=\"{}\" aria-pressed=\"{active}\" style=\"padding:6px 10px;border-radius:999px;border:1px solid {border};background:{background};color:{color};font-size:12px;cursor:pointer\">{}</button>",
        mode.token(),
        escape_xml(mode.title())
    )
}

/// Wraps a rendered panel into a standalone HTML document.
pub fn render_page(panel_html: &str, title: &str, theme: &Theme) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body style=\"margin:0;padding:24px;background:{};font-family:{}\">{panel_html}</body></html>",
        escape_xml(title),
        theme.background,
        escape_xml(&theme.font_family)
    )
}
