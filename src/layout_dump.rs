use crate::layout::GraphLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub levels: usize,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub key: String,
    pub id: Option<String>,
    pub label: String,
    pub depth: usize,
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub points: [[f32; 2]; 2],
}

impl LayoutDump {
    pub fn from_layout(layout: &GraphLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                key: node.key.clone(),
                id: node.id.as_ref().map(ToString::to_string),
                label: node.label.clone(),
                depth: node.depth,
                index: node.index,
                x: node.x,
                y: node.y,
                r: node.r,
            })
            .collect();

        let edges = layout
            .links
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                from: layout.nodes[edge.from].key.clone(),
                to: layout.nodes[edge.to].key.clone(),
                points: [[edge.x1, edge.y1], [edge.x2, edge.y2]],
            })
            .collect();

        let levels = layout
            .nodes
            .iter()
            .map(|node| node.depth + 1)
            .max()
            .unwrap_or(0);

        LayoutDump {
            width: layout.width,
            height: layout.height,
            levels,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &GraphLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
