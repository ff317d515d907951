use serde::Serialize;

use super::{LayoutError, preorder};
use crate::ast::{Ast, NodeId, NodeRef};
use crate::config::{LayoutConfig, TreeConfig};
use crate::text_metrics::measure_text_width;

/// One line of the indented outline.
#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    pub node: NodeRef,
    pub id: Option<NodeId>,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub child_count: usize,
}

impl TreeRow {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeLayout {
    pub rows: Vec<TreeRow>,
    pub width: f32,
    pub height: f32,
}

impl TreeLayout {
    pub fn empty(config: &TreeConfig) -> Self {
        Self {
            rows: Vec::new(),
            width: config.min_width,
            height: config.min_height,
        }
    }

    pub fn row_at(&self, x: f32, y: f32) -> Option<&TreeRow> {
        self.rows.iter().find(|row| row.contains(x, y))
    }
}

pub fn row_text(label: &str, id: Option<&NodeId>, show_ids: bool) -> String {
    match id {
        Some(id) if show_ids => format!("{label} #{id}"),
        _ => label.to_string(),
    }
}

/// Lays out the outline in pre-order, one row per visit. Walk budgets come
/// from the bubble layout settings so both views accept the same trees.
pub fn layout_tree(
    ast: &Ast,
    config: &TreeConfig,
    limits: &LayoutConfig,
    font_family: &str,
) -> Result<TreeLayout, LayoutError> {
    let visits = preorder(ast, limits.max_depth, limits.max_nodes)?;
    if visits.is_empty() {
        return Ok(TreeLayout::empty(config));
    }

    let mut rows = Vec::with_capacity(visits.len());
    let mut right_edge = 0.0f32;
    for (idx, visit) in visits.iter().enumerate() {
        let node = ast
            .get(visit.node)
            .ok_or(LayoutError::UnknownNode(visit.node))?;
        let text = row_text(node.label(), node.id.as_ref(), config.show_ids);
        let text_width = measure_text_width(&text, config.font_size, font_family);
        let x = config.padding + visit.depth as f32 * config.indent;
        let width = text_width + config.row_padding_x * 2.0;
        right_edge = right_edge.max(x + width);
        rows.push(TreeRow {
            node: visit.node,
            id: node.id.clone(),
            depth: visit.depth,
            x,
            y: config.padding + idx as f32 * config.row_height,
            width,
            height: config.row_height,
            text,
            child_count: node.children().len(),
        });
    }

    let width = (right_edge + config.padding).max(config.min_width);
    let height = (config.padding * 2.0 + rows.len() as f32 * config.row_height).max(config.min_height);
    log::debug!("tree layout: {} rows, {width}x{height}", rows.len());
    Ok(TreeLayout {
        rows,
        width,
        height,
    })
}
