use crate::ast::NodeId;
use crate::config::RenderConfig;
use crate::layout::{GraphLayout, TreeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

fn svg_open(svg: &mut String, width: f32, height: f32, theme: &Theme, render: &RenderConfig) {
    if render.fluid_width {
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\" style=\"display:block\">",
        ));
    } else {
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            theme.background
        ));
    }
}

/// A node shows as selected only when it has an id equal to the selection.
/// Unlike the web explorer, which tests `id && id === selectedId`, falsy ids
/// such as `0` or `""` are selectable here; "nothing selected" is `None`.
fn is_selected(id: Option<&NodeId>, selected: Option<&NodeId>) -> bool {
    matches!((id, selected), (Some(id), Some(selected)) if id == selected)
}

pub fn render_bubble_svg(
    layout: &GraphLayout,
    selected: Option<&NodeId>,
    theme: &Theme,
    render: &RenderConfig,
) -> String {
    let mut svg = String::new();
    svg_open(&mut svg, layout.width, layout.height, theme, render);

    svg.push_str("<g class=\"links\">");
    for link in &layout.links {
        svg.push_str(&format!(
            "<line id=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
            link.id, link.x1, link.y1, link.x2, link.y2, theme.line_color
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in &layout.nodes {
        let highlighted = is_selected(node.id.as_ref(), selected);
        let (fill, stroke, stroke_width) = if highlighted {
            (&theme.selected_fill, &theme.selected_stroke, 2)
        } else {
            (&theme.node_fill, &theme.node_stroke, 1)
        };
        svg.push_str(&format!(
            "<g data-key=\"{}\" data-node=\"{}\" style=\"cursor:pointer\">",
            escape_xml(&node.key),
            node.node.0
        ));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
            node.x, node.y, node.r
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" style=\"pointer-events:none;user-select:none\">{}</text>",
            node.x,
            node.y + 4.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.node_text_color,
            escape_xml(&node.label)
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

pub fn render_tree_svg(
    layout: &TreeLayout,
    selected: Option<&NodeId>,
    font_size: f32,
    theme: &Theme,
    render: &RenderConfig,
) -> String {
    let mut svg = String::new();
    svg_open(&mut svg, layout.width, layout.height, theme, render);

    for row in &layout.rows {
        let highlighted = is_selected(row.id.as_ref(), selected);
        svg.push_str(&format!(
            "<g data-node=\"{}\" style=\"cursor:pointer\">",
            row.node.0
        ));
        if highlighted {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                row.x, row.y + 1.0, row.width, row.height - 2.0, theme.accent_background, theme.selected_stroke
            ));
        }
        let marker = if row.child_count > 0 { "▾ " } else { "" };
        let text_y = row.y + row.height / 2.0 + font_size * 0.35;
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{text_y:.2}\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{}\">{}{}</text>",
            row.x + 8.0,
            escape_xml(&theme.font_family),
            if highlighted { &theme.accent_text_color } else { &theme.text_color },
            marker,
            escape_xml(&row.text)
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid PNG size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::config::{LayoutConfig, TreeConfig};
    use crate::layout::{layout_graph, layout_tree};
    use serde_json::json;

    fn sample() -> Ast {
        Ast::from_value(&json!({
            "id": 1,
            "type": "Program",
            "children": [{"id": 2, "type": "Num"}, {"type": "<Str>"}]
        }))
        .unwrap()
    }

    #[test]
    fn bubble_svg_has_circles_lines_and_labels() {
        let layout = layout_graph(&sample(), &LayoutConfig::default()).unwrap();
        let svg = render_bubble_svg(&layout, None, &Theme::explorer(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains(">Program</text>"));
        assert!(svg.contains("&lt;Str&gt;"));
        assert!(svg.contains("data-key=\"1-1\""));
        assert!(svg.contains("viewBox=\"0 0 600.00 320.00\""));
    }

    #[test]
    fn only_matching_ids_are_highlighted() {
        let theme = Theme::explorer();
        let layout = layout_graph(&sample(), &LayoutConfig::default()).unwrap();

        let none = render_bubble_svg(&layout, None, &theme, &RenderConfig::default());
        assert!(!none.contains(&theme.selected_fill));

        let id = NodeId::from(2);
        let one = render_bubble_svg(&layout, Some(&id), &theme, &RenderConfig::default());
        assert_eq!(one.matches(theme.selected_fill.as_str()).count(), 1);
        assert_eq!(one.matches("stroke-width=\"2\"").count(), 1);
    }

    #[test]
    fn fluid_width_embeds_without_background() {
        let layout = layout_graph(&sample(), &LayoutConfig::default()).unwrap();
        let render = RenderConfig {
            fluid_width: true,
            ..RenderConfig::default()
        };
        let svg = render_bubble_svg(&layout, None, &Theme::explorer(), &render);
        assert!(svg.contains("width=\"100%\" height=\"320.00\""));
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn tree_svg_marks_selection() {
        let config = TreeConfig::default();
        let layout = layout_tree(&sample(), &config, &LayoutConfig::default(), "sans-serif").unwrap();
        let theme = Theme::explorer();
        let id = NodeId::from(1);
        let svg = render_tree_svg(&layout, Some(&id), config.font_size, &theme, &RenderConfig::default());
        assert!(svg.contains("Program #1"));
        assert!(svg.contains(&theme.accent_background));
        assert_eq!(svg.matches("<text").count(), 3);
    }

    #[test]
    fn writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        write_output_svg("<svg></svg>", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg></svg>");
    }
}
