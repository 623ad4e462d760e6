//! Hyperlink collection over a whole document tree.
//!
//! This walk is independent of the block renderer: it visits every node,
//! including list items and children the renderer folds into other lines,
//! and records each linked run in document order. Duplicates are kept.

use serde_json::Value;

use crate::inline::Link;
use crate::node::{NodeView, name};

/// Collect every hyperlink in `nodes`, in document order.
pub fn collect_links(nodes: &[Value]) -> Vec<Link> {
    let mut links = Vec::new();
    scan(nodes, &mut links);
    links
}

fn scan(nodes: &[Value], links: &mut Vec<Link>) {
    for raw in nodes {
        let node = NodeView::new(raw);
        if !node.is_renderable() {
            continue;
        }

        for field in [name::SPANS, name::SEGMENTS] {
            links.extend(node.linked_runs(field).iter().filter_map(Link::from_run));
        }

        for field in [name::CONTENT, name::CHILDREN, name::ITEMS] {
            if let Some(nested) = raw.get(field).and_then(Value::as_array) {
                scan(nested, links);
            }
        }
    }
}
