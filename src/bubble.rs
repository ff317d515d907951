//! Bubble graph component: caches its layout per AST and turns clicks into
//! selections of the original arena node.

use std::sync::Arc;

use crate::ast::{Ast, AstNode, NodeId, NodeRef};
use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{GraphLayout, LayoutError, layout_graph};
use crate::render::render_bubble_svg;
use crate::theme::Theme;

pub struct BubbleGraph {
    config: LayoutConfig,
    ast: Option<Arc<Ast>>,
    layout: GraphLayout,
    passes: usize,
}

impl BubbleGraph {
    pub fn new(config: LayoutConfig) -> Self {
        let layout = GraphLayout::empty(&config);
        Self {
            config,
            ast: None,
            layout,
            passes: 0,
        }
    }

    /// Lays out `ast` unless it is the same allocation as last time.
    pub fn update(&mut self, ast: Option<&Arc<Ast>>) -> Result<&GraphLayout, LayoutError> {
        let unchanged = match (&self.ast, ast) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(&self.layout);
        }

        self.ast = None;
        self.layout = GraphLayout::empty(&self.config);
        if let Some(next) = ast {
            self.layout = layout_graph(next, &self.config)?;
            self.passes += 1;
            self.ast = Some(Arc::clone(next));
        }
        Ok(&self.layout)
    }

    pub fn layout(&self) -> &GraphLayout {
        &self.layout
    }

    /// Number of layout passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn render(&self, selected: Option<&NodeId>, theme: &Theme, render: &RenderConfig) -> String {
        render_bubble_svg(&self.layout, selected, theme, render)
    }

    /// Hands the clicked node, as stored in the AST, to `on_select`.
    pub fn click<F>(&self, x: f32, y: f32, on_select: F) -> bool
    where
        F: FnOnce(NodeRef, &AstNode),
    {
        let Some(ast) = self.ast.as_deref() else {
            return false;
        };
        let Some(hit) = self.layout.node_at(x, y) else {
            return false;
        };
        match ast.get(hit.node) {
            Some(node) => {
                on_select(hit.node, node);
                true
            }
            None => false,
        }
    }
}
