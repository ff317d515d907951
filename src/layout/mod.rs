//! Grid layout for the bubble graph.
//!
//! Nodes are visited depth-first in pre-order. Each depth keeps one arrival
//! counter for the whole tree, so a node's column is its rank among every node
//! reached at that depth so far, not among its siblings.

use serde::Serialize;
use thiserror::Error;

use crate::ast::{Ast, NodeId, NodeRef};
use crate::config::LayoutConfig;

pub mod tree;

pub use tree::{TreeLayout, TreeRow, layout_tree};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("node {node} is its own ancestor")]
    Cycle { node: NodeRef },
    #[error("tree is deeper than {limit} levels")]
    DepthExceeded { limit: usize },
    #[error("tree expands to more than {limit} nodes")]
    TooManyNodes { limit: usize },
    #[error("node {0} is not in the arena")]
    UnknownNode(NodeRef),
}

#[derive(Debug, Clone, Serialize)]
pub struct LaidOutNode {
    pub node: NodeRef,
    pub id: Option<NodeId>,
    pub key: String,
    pub depth: usize,
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub label: String,
}

impl LaidOutNode {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.r * self.r
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LaidOutEdge {
    pub id: String,
    /// Slots into [`GraphLayout::nodes`].
    pub from: usize,
    pub to: usize,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphLayout {
    pub nodes: Vec<LaidOutNode>,
    pub links: Vec<LaidOutEdge>,
    pub width: f32,
    pub height: f32,
}

impl GraphLayout {
    pub fn empty(config: &LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            width: config.min_width,
            height: config.min_height,
        }
    }

    /// Topmost circle under the point. Later nodes are drawn over earlier ones.
    pub fn node_at(&self, x: f32, y: f32) -> Option<&LaidOutNode> {
        self.nodes.iter().rev().find(|node| node.contains(x, y))
    }
}

/// One step of a pre-order walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Visit {
    pub node: NodeRef,
    pub depth: usize,
    /// Position of the parent's visit in the walk.
    pub parent: Option<usize>,
}

/// Pre-order walk from the root. Shared subtrees are walked once per parent;
/// a node reached again through its own descendants is a cycle.
pub(crate) fn preorder(
    ast: &Ast,
    max_depth: usize,
    max_nodes: usize,
) -> Result<Vec<Visit>, LayoutError> {
    let mut visits = Vec::new();
    let Some(root) = ast.root() else {
        return Ok(visits);
    };

    let mut path: Vec<NodeRef> = Vec::new();
    let mut stack = vec![Visit {
        node: root,
        depth: 0,
        parent: None,
    }];
    while let Some(visit) = stack.pop() {
        if visit.depth > max_depth {
            return Err(LayoutError::DepthExceeded { limit: max_depth });
        }
        if visits.len() >= max_nodes {
            return Err(LayoutError::TooManyNodes { limit: max_nodes });
        }
        let node = ast
            .get(visit.node)
            .ok_or(LayoutError::UnknownNode(visit.node))?;

        path.truncate(visit.depth);
        if path.contains(&visit.node) {
            return Err(LayoutError::Cycle { node: visit.node });
        }
        path.push(visit.node);

        let slot = visits.len();
        visits.push(visit);
        for child in node.children().iter().rev() {
            stack.push(Visit {
                node: *child,
                depth: visit.depth + 1,
                parent: Some(slot),
            });
        }
    }
    Ok(visits)
}

#[derive(Clone, Copy)]
enum Mark {
    Unvisited,
    Open,
    Done(usize),
}

/// Memoized descendant counts over one arena.
pub struct DescendantCounter<'a> {
    ast: &'a Ast,
    marks: Vec<Mark>,
}

impl<'a> DescendantCounter<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            marks: vec![Mark::Unvisited; ast.len()],
        }
    }

    /// Every node below `start`, counting a shared subtree once per parent
    /// that reaches it.
    pub fn count(&mut self, start: NodeRef) -> Result<usize, LayoutError> {
        let ast = self.ast;
        let mut stack = vec![(start, false)];
        while let Some((node, expanded)) = stack.pop() {
            let kids = ast
                .get(node)
                .ok_or(LayoutError::UnknownNode(node))?
                .children();
            if expanded {
                let mut total = 0usize;
                for kid in kids {
                    let below = match self.marks[kid.0] {
                        Mark::Done(n) => n,
                        _ => return Err(LayoutError::Cycle { node: *kid }),
                    };
                    total = total.saturating_add(below).saturating_add(1);
                }
                self.marks[node.0] = Mark::Done(total);
                continue;
            }
            match self.marks[node.0] {
                Mark::Done(_) => continue,
                Mark::Open => return Err(LayoutError::Cycle { node }),
                Mark::Unvisited => {}
            }
            self.marks[node.0] = Mark::Open;
            stack.push((node, true));
            for kid in kids {
                match self.marks.get(kid.0) {
                    None => return Err(LayoutError::UnknownNode(*kid)),
                    Some(Mark::Open) => return Err(LayoutError::Cycle { node: *kid }),
                    Some(Mark::Done(_)) => {}
                    Some(Mark::Unvisited) => stack.push((*kid, false)),
                }
            }
        }
        match self.marks[start.0] {
            Mark::Done(n) => Ok(n),
            _ => Err(LayoutError::Cycle { node: start }),
        }
    }
}

pub fn descendant_count(ast: &Ast, node: NodeRef) -> Result<usize, LayoutError> {
    DescendantCounter::new(ast).count(node)
}

/// Base radius plus a fixed step per descendant, capped. Negative or NaN
/// settings collapse to no growth.
pub fn node_radius(descendants: usize, config: &LayoutConfig) -> f32 {
    let growth = (descendants as f32 * config.radius_step)
        .max(0.0)
        .min(config.max_radius_growth.max(0.0));
    config.base_radius + growth
}

pub fn layout_graph(ast: &Ast, config: &LayoutConfig) -> Result<GraphLayout, LayoutError> {
    let visits = preorder(ast, config.max_depth, config.max_nodes)?;
    let mut counter = DescendantCounter::new(ast);

    let mut level_sizes: Vec<usize> = Vec::new();
    let mut nodes = Vec::with_capacity(visits.len());
    let mut pending_links = Vec::with_capacity(visits.len().saturating_sub(1));

    for (slot, visit) in visits.iter().enumerate() {
        if level_sizes.len() <= visit.depth {
            level_sizes.resize(visit.depth + 1, 0);
        }
        let index = level_sizes[visit.depth];
        level_sizes[visit.depth] += 1;

        let source = ast
            .get(visit.node)
            .ok_or(LayoutError::UnknownNode(visit.node))?;
        let key = match &source.id {
            Some(id) => id.to_string(),
            None => format!("{}-{}", visit.depth, index),
        };
        let r = node_radius(counter.count(visit.node)?, config);

        nodes.push(LaidOutNode {
            node: visit.node,
            id: source.id.clone(),
            key,
            depth: visit.depth,
            index,
            x: config.padding_x + index as f32 * config.column_width,
            y: config.padding_y + visit.depth as f32 * config.row_height,
            r,
            label: source.label().to_string(),
        });
        if let Some(parent) = visit.parent {
            pending_links.push((parent, slot));
        }
    }

    // Endpoints need both circles placed, so links resolve after the walk.
    let links = pending_links
        .into_iter()
        .enumerate()
        .map(|(idx, (from, to))| {
            let parent = &nodes[from];
            let child = &nodes[to];
            LaidOutEdge {
                id: format!("edge-{idx}"),
                from,
                to,
                x1: parent.x,
                y1: parent.y + parent.r,
                x2: child.x,
                y2: child.y - child.r,
            }
        })
        .collect();

    let max_cols = level_sizes.iter().copied().max().unwrap_or(1).max(1);
    let max_depth = level_sizes.len().saturating_sub(1);
    let width = (config.padding_x * 2.0
        + (max_cols - 1) as f32 * config.column_width
        + config.overflow_slack)
        .max(config.min_width);
    let height = (config.padding_y * 2.0
        + max_depth as f32 * config.row_height
        + config.overflow_slack)
        .max(config.min_height);

    log::debug!(
        "bubble layout: {} nodes, {} levels, {width}x{height}",
        nodes.len(),
        level_sizes.len()
    );

    Ok(GraphLayout {
        nodes,
        links,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, ChildShape};
    use serde_json::json;

    fn load(value: serde_json::Value) -> Ast {
        Ast::from_value(&value).unwrap()
    }

    fn chain(len: usize) -> Ast {
        let mut ast = Ast::new();
        let mut prev: Option<NodeRef> = None;
        for i in 0..len {
            let node = ast.push(AstNode::new("Link").with_id(i as i64));
            match prev {
                Some(p) => {
                    ast.set_shape(p, ChildShape::Children(vec![node]));
                }
                None => ast.set_root(Some(node)),
            }
            prev = Some(node);
        }
        ast
    }

    #[test]
    fn program_with_two_numbers() {
        let ast = load(json!({
            "id": 1,
            "type": "Program",
            "children": [{"id": 2, "type": "Num"}, {"id": 3, "type": "Num"}]
        }));
        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.links.len(), 2);
        let depths: Vec<_> = layout.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 1]);
        assert_eq!(layout.nodes[0].r, 22.0);
        assert_eq!(layout.nodes[1].r, 18.0);
        assert_eq!(layout.nodes[2].r, 18.0);
        assert_eq!(layout.nodes[0].key, "1");
        assert_eq!((layout.nodes[1].x, layout.nodes[1].y), (30.0, 120.0));
        assert_eq!((layout.nodes[2].x, layout.nodes[2].y), (230.0, 120.0));
        assert_eq!((layout.width, layout.height), (600.0, 320.0));
    }

    #[test]
    fn binary_root_without_id_gets_fallback_key() {
        let ast = load(json!({"left": {"id": 2, "type": "A"}, "right": {"id": 3, "type": "B"}}));
        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.nodes[0].id, None);
        assert_eq!(layout.nodes[0].key, "0-0");
        assert_eq!(layout.nodes[0].label, "Node");
        assert_eq!(layout.nodes[1].label, "A");
        assert_eq!(layout.nodes[2].label, "B");
    }

    #[test]
    fn empty_ast_uses_floor_canvas() {
        let layout = layout_graph(&Ast::new(), &LayoutConfig::default()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.links.is_empty());
        assert_eq!((layout.width, layout.height), (600.0, 320.0));
    }

    #[test]
    fn depth_index_is_shared_across_parents() {
        let ast = load(json!({
            "type": "Root",
            "children": [
                {"type": "A", "children": [{"type": "A1"}, {"type": "A2"}]},
                {"type": "B", "children": [{"type": "B1"}]}
            ]
        }));
        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        let grand: Vec<_> = layout
            .nodes
            .iter()
            .filter(|n| n.depth == 2)
            .map(|n| (n.label.as_str(), n.index, n.x))
            .collect();
        assert_eq!(
            grand,
            vec![("A1", 0, 30.0), ("A2", 1, 230.0), ("B1", 2, 430.0)]
        );
        // Three columns stay under the 600px floor.
        assert_eq!(layout.width, 600.0);
        assert_eq!(layout.height, 30.0 * 2.0 + 2.0 * 90.0 + 120.0);
    }

    #[test]
    fn width_grows_with_widest_level() {
        let ast = load(json!({
            "type": "Root",
            "children": [
                {"type": "A", "children": [{"type": "A1"}, {"type": "A2"}]},
                {"type": "B", "children": [{"type": "B1"}, {"type": "B2"}]}
            ]
        }));
        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        // Four columns at depth 2.
        assert_eq!(layout.width, 30.0 * 2.0 + 3.0 * 200.0 + 120.0);
        assert_eq!(layout.width, 780.0);
        assert_eq!(layout.height, 360.0);
    }

    #[test]
    fn edges_touch_circle_boundaries() {
        let ast = load(json!({"type": "P", "body": [{"type": "S"}]}));
        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        let edge = &layout.links[0];
        let (parent, child) = (&layout.nodes[edge.from], &layout.nodes[edge.to]);
        assert_eq!(edge.id, "edge-0");
        assert_eq!(edge.x1, parent.x);
        assert_eq!(edge.y1, parent.y + parent.r);
        assert_eq!(edge.x2, child.x);
        assert_eq!(edge.y2, child.y - child.r);
    }

    #[test]
    fn radius_is_capped() {
        let config = LayoutConfig::default();
        assert_eq!(node_radius(0, &config), 18.0);
        assert_eq!(node_radius(5, &config), 28.0);
        assert_eq!(node_radius(11, &config), 40.0);
        assert_eq!(node_radius(10_000, &config), 40.0);

        let layout = layout_graph(&chain(30), &config).unwrap();
        assert!(layout.nodes.iter().all(|n| (18.0..=40.0).contains(&n.r)));
        assert_eq!(layout.nodes[0].r, 40.0);
        assert_eq!(layout.nodes[29].r, 18.0);
    }

    #[test]
    fn bad_radius_settings_do_not_panic() {
        let ast = chain(4);
        for growth in [-1.0, f32::NAN] {
            let config = LayoutConfig {
                max_radius_growth: growth,
                ..LayoutConfig::default()
            };
            let layout = layout_graph(&ast, &config).unwrap();
            assert!(layout.nodes.iter().all(|n| n.r == 18.0));
        }
        let shrinking = LayoutConfig {
            radius_step: -3.0,
            ..LayoutConfig::default()
        };
        assert_eq!(node_radius(5, &shrinking), 18.0);
    }

    #[test]
    fn shared_subtree_is_laid_out_per_parent() {
        let mut ast = Ast::new();
        let shared = ast.push(AstNode::new("Shared").with_id(9));
        let leaf = ast.push(AstNode::new("Leaf"));
        ast.set_shape(shared, ChildShape::Children(vec![leaf]));
        let root = ast.push(AstNode::new("Root"));
        ast.set_shape(root, ChildShape::Binary([shared, shared]));
        ast.set_root(Some(root));

        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes.len(), 5);
        assert_eq!(layout.links.len(), 4);
        let copies: Vec<_> = layout.nodes.iter().filter(|n| n.node == shared).collect();
        assert_eq!(copies.len(), 2);
        assert_ne!(copies[0].x, copies[1].x);
        assert_eq!(descendant_count(&ast, root).unwrap(), 4);
    }

    #[test]
    fn cycles_are_reported() {
        let mut ast = Ast::new();
        let a = ast.push(AstNode::new("A"));
        let b = ast.push(AstNode::new("B"));
        ast.set_shape(a, ChildShape::Children(vec![b]));
        ast.set_shape(b, ChildShape::Body(vec![a]));
        ast.set_root(Some(a));

        assert_eq!(
            layout_graph(&ast, &LayoutConfig::default()).unwrap_err(),
            LayoutError::Cycle { node: a }
        );
        assert!(matches!(
            descendant_count(&ast, a),
            Err(LayoutError::Cycle { .. })
        ));
    }

    #[test]
    fn budgets_are_enforced() {
        let config = LayoutConfig {
            max_depth: 10,
            ..LayoutConfig::default()
        };
        assert_eq!(
            layout_graph(&chain(20), &config).unwrap_err(),
            LayoutError::DepthExceeded { limit: 10 }
        );
        let config = LayoutConfig {
            max_nodes: 5,
            ..LayoutConfig::default()
        };
        assert_eq!(
            layout_graph(&chain(20), &config).unwrap_err(),
            LayoutError::TooManyNodes { limit: 5 }
        );
    }

    #[test]
    fn dangling_child_is_reported() {
        let mut ast = Ast::new();
        let root = ast.push(AstNode::new("Root"));
        ast.set_shape(root, ChildShape::Children(vec![NodeRef(7)]));
        ast.set_root(Some(root));
        assert_eq!(
            layout_graph(&ast, &LayoutConfig::default()).unwrap_err(),
            LayoutError::UnknownNode(NodeRef(7))
        );
    }

    #[test]
    fn node_at_hits_circles() {
        let ast = load(json!({"id": 1, "children": [{"id": 2}]}));
        let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.node_at(30.0, 30.0).map(|n| n.key.as_str()), Some("1"));
        assert_eq!(layout.node_at(35.0, 125.0).map(|n| n.key.as_str()), Some("2"));
        assert!(layout.node_at(300.0, 300.0).is_none());
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let config = LayoutConfig {
            max_depth: 50_000,
            ..LayoutConfig::default()
        };
        let layout = layout_graph(&chain(20_000), &config).unwrap();
        assert_eq!(layout.nodes.len(), 20_000);
        assert_eq!(layout.links.len(), 19_999);
    }
}
