use std::sync::Arc;

use crate::ast::{Ast, AstNode, NodeId, NodeRef};
use crate::config::{LayoutConfig, RenderConfig, TreeConfig};
use crate::layout::{LayoutError, TreeLayout, layout_tree};
use crate::render::render_tree_svg;
use crate::theme::Theme;

/// Outline view of the AST, cached per AST allocation like the bubble graph.
pub struct TreeView {
    config: TreeConfig,
    limits: LayoutConfig,
    ast: Option<Arc<Ast>>,
    layout: TreeLayout,
}

impl TreeView {
    pub fn new(config: TreeConfig, limits: LayoutConfig) -> Self {
        let layout = TreeLayout::empty(&config);
        Self {
            config,
            limits,
            ast: None,
            layout,
        }
    }

    pub fn update(&mut self, ast: Option<&Arc<Ast>>, font_family: &str) -> Result<&TreeLayout, LayoutError> {
        let unchanged = match (&self.ast, ast) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(&self.layout);
        }

        self.ast = None;
        self.layout = TreeLayout::empty(&self.config);
        if let Some(next) = ast {
            self.layout = layout_tree(next, &self.config, &self.limits, font_family)?;
            self.ast = Some(Arc::clone(next));
        }
        Ok(&self.layout)
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn render(&self, selected: Option<&NodeId>, theme: &Theme, render: &RenderConfig) -> String {
        render_tree_svg(&self.layout, selected, self.config.font_size, theme, render)
    }

    pub fn click<F>(&self, x: f32, y: f32, on_select: F) -> bool
    where
        F: FnOnce(NodeRef, &AstNode),
    {
        let Some(ast) = self.ast.as_deref() else {
            return false;
        };
        let Some(row) = self.layout.row_at(x, y) else {
            return false;
        };
        match ast.get(row.node) {
            Some(node) => {
                on_select(row.node, node);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn click_on_row_selects_node() {
        let ast = Arc::new(
            Ast::from_value(&json!({"id": "root", "type": "Module", "body": [{"id": "s1", "type": "Expr"}]}))
                .unwrap(),
        );
        let mut view = TreeView::new(TreeConfig::default(), LayoutConfig::default());
        view.update(Some(&ast), "sans-serif").unwrap();
        let row = view.layout().rows[1].clone();

        let mut picked = None;
        assert!(view.click(row.x + 2.0, row.y + 2.0, |_, node| picked = node.id.clone()));
        assert_eq!(picked, Some(NodeId::from("s1")));
    }
}
