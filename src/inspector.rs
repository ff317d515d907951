//! Side pane fragments: the selected node's attributes and the token list.

use serde_json::Value;

use crate::ast::AstNode;
use crate::render::escape_xml;
use crate::theme::Theme;
use crate::tokens::Token;

/// Longest attribute preview before it is cut with an ellipsis.
const MAX_VALUE_CHARS: usize = 80;

pub struct NodeInspector;

impl NodeInspector {
    pub fn render(node: Option<&AstNode>, theme: &Theme) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            "<div class=\"inspector\" style=\"border:1px solid {};border-radius:10px;padding:10px;margin-bottom:12px\">",
            theme.surface_border
        ));
        html.push_str("<h3 style=\"margin:0 0 8px;font-size:13px\">Node</h3>");

        let Some(node) = node else {
            html.push_str(&format!(
                "<div class=\"muted\" style=\"color:{}\">Select a node to inspect it.</div></div>",
                theme.muted_text_color
            ));
            return html;
        };

        html.push_str("<table style=\"width:100%;border-collapse:collapse;font-size:12px\">");
        push_row(&mut html, "type", node.label(), theme);
        if let Some(id) = &node.id {
            push_row(&mut html, "id", &id.to_string(), theme);
        }
        if let Some(container) = node.shape.container_name() {
            push_row(
                &mut html,
                container,
                &format!("{} child node(s)", node.children().len()),
                theme,
            );
        }
        for (key, value) in &node.attributes {
            push_row(&mut html, key, &preview_value(value), theme);
        }
        html.push_str("</table></div>");
        html
    }
}

fn push_row(html: &mut String, key: &str, value: &str, theme: &Theme) {
    html.push_str(&format!(
        "<tr><th style=\"text-align:left;color:{};font-weight:500;padding:2px 8px 2px 0\">{}</th><td style=\"font-family:monospace\">{}</td></tr>",
        theme.muted_text_color,
        escape_xml(key),
        escape_xml(value)
    ));
}

/// Scalars verbatim, containers as a size summary.
pub fn preview_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{} item(s)]", items.len()),
        Value::Object(fields) => format!("{{{} field(s)}}", fields.len()),
        other => other.to_string(),
    };
    truncate(&text, MAX_VALUE_CHARS)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

pub struct TokensList;

impl TokensList {
    pub fn render(tokens: &[Token], theme: &Theme) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            "<div class=\"tokens\" style=\"border:1px solid {};border-radius:10px;padding:10px\">",
            theme.surface_border
        ));
        html.push_str(&format!(
            "<h3 style=\"margin:0 0 8px;font-size:13px\">Tokens ({})</h3>",
            tokens.len()
        ));
        if tokens.is_empty() {
            html.push_str(&format!(
                "<div class=\"muted\" style=\"color:{}\">No tokens.</div></div>",
                theme.muted_text_color
            ));
            return html;
        }

        html.push_str("<ol style=\"margin:0;padding-left:20px;font-size:12px;font-family:monospace\">");
        for token in tokens {
            let position = token
                .position()
                .map(|pos| {
                    format!(
                        " <span style=\"color:{}\">@{}</span>",
                        theme.muted_text_color,
                        escape_xml(&pos)
                    )
                })
                .unwrap_or_default();
            html.push_str(&format!(
                "<li><b>{}</b> {}{}</li>",
                escape_xml(&token.kind),
                escape_xml(&truncate(&token.value_text(), MAX_VALUE_CHARS)),
                position
            ));
        }
        html.push_str("</ol></div>");
        html
    }
}
