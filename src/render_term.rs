//! Terminal outline renderer.
//!
//! Prints one line per node, indented by nesting depth. Core blocks are
//! cyan, third-party namespaces magenta, free text dimmed.

use colored::Colorize;

use crate::types::BlockNode;

const INDENT: &str = "  ";

/// Render a block tree as ANSI-colored outline text.
pub fn to_terminal(blocks: &[BlockNode]) -> String {
    let mut out = String::new();
    for block in blocks {
        render_node(block, 0, &mut out);
    }
    out
}

fn render_node(node: &BlockNode, depth: usize, out: &mut String) {
    out.push_str(&INDENT.repeat(depth));

    match node.name() {
        None => {
            let label = format!("#text ({} bytes)", node.inner_html.len());
            out.push_str(&label.dimmed().to_string());
        }
        Some(name) => {
            let label = if node.namespace() == Some("core") {
                name.cyan().bold()
            } else {
                name.magenta().bold()
            };
            out.push_str(&label.to_string());
            if !node.attrs.is_empty() {
                let attrs = serde_json::to_string(&node.attrs).unwrap_or_default();
                out.push(' ');
                out.push_str(&attrs.dimmed().to_string());
            }
        }
    }
    out.push('\n');

    for inner in &node.inner_blocks {
        render_node(inner, depth + 1, out);
    }
}
