//! Recursive block renderer: document nodes to indented text lines.
//!
//! Every recursion level returns plain lines carrying their own indent
//! (two spaces per depth). Blank-line collapsing and trimming happen once,
//! over the whole document, in [`render_text`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::inline::extract_text;
use crate::node::{NodeKind, NodeView};

/// Marker for unordered items and standalone list items.
pub(crate) const BULLET: &str = "•";

/// Render `nodes` and apply document-level cleanup.
pub(crate) fn render_text(nodes: &[Value]) -> String {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let joined = render(nodes, 0)
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    BLANK_RUN_RE.replace_all(&joined, "\n\n").trim().to_string()
}

/// Render a node sequence at `depth` into lines.
pub(crate) fn render(nodes: &[Value], depth: usize) -> Vec<String> {
    let indent = indent(depth);
    let mut lines = Vec::new();

    for node in nodes.iter().map(NodeView::new) {
        if !node.is_renderable() {
            continue;
        }
        let kind = node.kind();

        if let Some(items) = node.items() {
            render_items(items, node.ordered_hint(), depth, &mut lines);
            continue;
        }

        if kind == NodeKind::ListItem || node.flag("listItem") {
            let text = extract_text(&node);
            lines.push(format!("{indent}{BULLET} {}", text.trim()));
            if let Some(nested) = node.nested() {
                lines.extend(render(nested, depth + 1));
            }
            continue;
        }

        if kind == NodeKind::List {
            if let Some(content) = node.content() {
                render_content_list(content, node.ordered_hint(), depth, &mut lines);
                continue;
            }
        }

        if kind.is_textual() {
            // Children collapse into one line at this depth; a childless
            // node contributes its own inline text.
            let text = match node.nested() {
                Some(children) => render(children, depth).join("\n"),
                None => extract_text(&node),
            };
            push_text(&mut lines, &indent, &text);
            continue;
        }

        if let Some(nested) = node.nested() {
            lines.extend(render(nested, depth));
            continue;
        }

        push_text(&mut lines, &indent, &extract_text(&node));
    }

    lines
}

/// Render the `items` of a list container. The counter is local to this
/// call, so every nested list starts again at 1.
fn render_items(items: &[Value], ordered: bool, depth: usize, lines: &mut Vec<String>) {
    let indent = indent(depth);

    let renderable = items.iter().map(NodeView::new).filter(NodeView::is_renderable);
    for (idx, item) in renderable.enumerate() {
        let text = extract_text(&item);
        lines.push(format!("{indent}{} {}", marker(ordered, idx + 1), text.trim()));

        if let Some(sub_items) = item.items() {
            // Nested items keep the enclosing list's style unless they say otherwise.
            let sub_ordered = item.ordering_marker().unwrap_or(ordered);
            render_items(sub_items, sub_ordered, depth + 1, lines);
        } else if let Some(nested) = item.nested() {
            lines.extend(render(nested, depth + 1));
        }
    }
}

/// Render a list container that keeps its items under `content`.
///
/// An item without inline text of its own is labelled with the inline text
/// of its content nodes. The item's `content` is always rendered beneath
/// it; `children` is not consulted here.
fn render_content_list(content: &[Value], ordered: bool, depth: usize, lines: &mut Vec<String>) {
    let indent = indent(depth);

    let renderable = content.iter().map(NodeView::new).filter(NodeView::is_renderable);
    for (idx, item) in renderable.enumerate() {
        let nested = item.content().unwrap_or(&[]);

        let mut label = extract_text(&item);
        if label.trim().is_empty() {
            label = nested
                .iter()
                .map(|child| extract_text(&NodeView::new(child)))
                .filter(|text| !text.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
        }
        lines.push(format!("{indent}{} {}", marker(ordered, idx + 1), label.trim()));
        lines.extend(render(nested, depth + 1));
    }
}

fn marker(ordered: bool, idx: usize) -> String {
    if ordered {
        format!("{idx}.")
    } else {
        BULLET.to_string()
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn push_text(lines: &mut Vec<String>, indent: &str, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(format!("{indent}{text}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render_json(value: Value) -> String {
        let nodes = value.as_array().cloned().unwrap_or_default();
        render_text(&nodes)
    }

    #[test]
    fn nested_ordered_numbering_restarts_per_level() {
        let tree = json!([{
            "kind": "list",
            "ordered": true,
            "items": [
                {"text": "Open settings"},
                {"text": "Click save", "items": [{"text": "Confirm dialog"}]}
            ]
        }]);
        assert_eq!(
            render_json(tree),
            "1. Open settings\n2. Click save\n  1. Confirm dialog"
        );
    }

    #[test]
    fn nested_items_can_override_parent_style() {
        let tree = json!([{
            "type": "list",
            "ordered": true,
            "items": [
                {"text": "Pick a plan", "ordered": false, "items": [
                    {"text": "Starter"}, {"text": "Team"}
                ]},
                {"text": "Pay"}
            ]
        }]);
        assert_eq!(
            render_json(tree),
            "1. Pick a plan\n  • Starter\n  • Team\n2. Pay"
        );
    }

    #[test]
    fn unordered_list_uses_bullets() {
        let tree = json!([
            {"type": "list", "ordered": false, "items": [{"text": "Alpha"}, {"text": "Beta"}]},
            {"type": "list", "items": ["Gamma"]}
        ]);
        assert_eq!(render_json(tree), "• Alpha\n• Beta\n• Gamma");
    }

    #[test]
    fn numbered_list_type_label() {
        let tree = json!([{"type": "list", "listType": "numbered", "items": ["a", "b"]}]);
        assert_eq!(render_json(tree), "1. a\n2. b");
    }

    #[test]
    fn item_children_render_one_level_deeper() {
        let tree = json!([{
            "type": "list",
            "items": [{
                "text": "Parent",
                "children": [{"type": "paragraph", "text": "Child paragraph"}]
            }]
        }]);
        assert_eq!(render_json(tree), "• Parent\n  Child paragraph");
    }

    #[test]
    fn deep_nesting_indents_by_depth() {
        let tree = json!([{
            "type": "list",
            "ordered": true,
            "items": [{
                "text": "one",
                "items": [{
                    "text": "two",
                    "items": [{"text": "three"}]
                }]
            }]
        }]);
        assert_eq!(render_json(tree), "1. one\n  1. two\n    1. three");
    }

    #[test]
    fn standalone_list_item_is_bulleted_never_numbered() {
        let tree = json!([
            {"type": "listItem", "ordered": true, "text": "Lonely item",
             "content": [{"text": "detail"}]},
            {"listItem": true, "text": "Flagged item"}
        ]);
        assert_eq!(
            render_json(tree),
            "• Lonely item\n  detail\n• Flagged item"
        );
    }

    #[test]
    fn content_list_container() {
        let tree = json!([{
            "type": "numbered_list",
            "content": [
                {"type": "listItem", "text": "First"},
                {"type": "listItem", "text": "Second", "content": [
                    {"type": "bulleted_list", "content": [{"text": "inner"}]}
                ]}
            ]
        }]);
        assert_eq!(render_json(tree), "1. First\n2. Second\n  • inner");
    }

    #[test]
    fn content_list_item_label_falls_back_to_content_text() {
        let tree = json!([{
            "type": "bulletList",
            "content": [{
                "type": "listItem",
                "content": [{"type": "paragraph", "spans": [{"text": "Label"}]}]
            }]
        }]);
        assert_eq!(render_json(tree), "• Label\n  Label");
    }

    #[test]
    fn content_list_item_content_renders_nested_in_full() {
        let tree = json!([{
            "type": "bulletList",
            "content": [{
                "type": "listItem",
                "content": [
                    {"type": "paragraph", "spans": [{"text": "Pick a plan"}]},
                    {"type": "numberedList", "content": [{"text": "Starter"}]}
                ]
            }]
        }]);
        assert_eq!(
            render_json(tree),
            "• Pick a plan\n  Pick a plan\n  1. Starter"
        );
    }

    #[test]
    fn content_list_ignores_item_children() {
        let tree = json!([{
            "type": "list",
            "content": [{"type": "listItem", "text": "Only", "children": [{"text": "hidden"}]}]
        }]);
        assert_eq!(render_json(tree), "• Only");
    }

    #[test]
    fn unordered_type_label_is_numbered() {
        let tree = json!([{"type": "unorderedList", "items": ["a", "b"]}]);
        assert_eq!(render_json(tree), "1. a\n2. b");
    }

    #[test]
    fn paragraph_joins_children_at_same_depth() {
        let tree = json!([
            {"type": "heading1", "content": [{"text": "Resetting access"}]},
            {"type": "paragraph", "children": [{"text": "Line A"}, {"text": "Line B"}]}
        ]);
        assert_eq!(render_json(tree), "Resetting access\nLine A\nLine B");
    }

    #[test]
    fn childless_paragraph_uses_own_text() {
        let tree = json!([
            {"type": "paragraph", "segments": [{"text": "Own text"}]},
            "bare string node",
            {"text": "untyped"}
        ]);
        assert_eq!(render_json(tree), "Own text\nbare string node\nuntyped");
    }

    #[test]
    fn unknown_container_recurses_at_same_depth() {
        let tree = json!([{
            "type": "callout",
            "children": [{"type": "paragraph", "text": "Inside callout"}]
        }]);
        assert_eq!(render_json(tree), "Inside callout");
    }

    #[test]
    fn unknown_leaf_emits_inline_text() {
        let tree = json!([
            {"type": "codeBlock", "text": "cargo run"},
            {"type": "divider"}
        ]);
        assert_eq!(render_json(tree), "cargo run");
    }

    #[test]
    fn blank_line_runs_collapse_globally() {
        let tree = json!([
            {"type": "paragraph", "text": "Top\n\n\n\n\nBottom"},
            {"type": "text", "text": "\n\n\nAfter"}
        ]);
        let out = render_json(tree);
        assert!(!out.contains("\n\n\n"));
        assert_eq!(out, "Top\n\nBottom\nAfter");
    }

    #[test]
    fn malformed_nodes_degrade_to_empty() {
        let tree = json!([null, 42, true, "", {"items": "bad"}, {}, []]);
        assert_eq!(render_json(tree), "");
    }

    #[test]
    fn null_items_do_not_consume_numbers() {
        let tree = json!([{"type": "list", "ordered": true, "items": [null, "a", 7, "b"]}]);
        assert_eq!(render_json(tree), "1. a\n2. b");
    }
}
