//! Rendering of FAQ answers into chat-ready plain text.
//!
//! Two input shapes are supported:
//! - loosely-structured document trees (canvas cells): rendered with
//!   [`format_document`], which indents nested lists, encodes inline links
//!   as `<url|label>` and appends a `Link Tags:` section;
//! - plain text: reshaped into a step list with [`format_steps`].
//!
//! Answers rewritten by a text-generation model are split into chat
//! paragraphs by [`format_reply`] and wrapped in a [`ChatReply`].
//!
//! Rendering never fails. Unknown node shapes degrade to empty output.

mod blocks;
mod inline;
mod links;
mod node;
mod reply;
mod steps;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

pub use inline::{Link, extract_text};
pub use links::collect_links;
pub use node::{InlineRun, NodeKind, NodeView};
pub use reply::{ChatReply, format_reply};
pub use steps::format_steps;

/// Header line introducing the trailing link section.
pub const LINK_TAGS_HEADER: &str = "Link Tags:";

/// A rendered document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Full text: rendered blocks plus the `Link Tags:` section, if any.
    pub body: String,
    /// Every hyperlink in document order, duplicates included.
    pub links: Vec<Link>,
}

/// Render a sequence of block nodes.
#[instrument(skip_all, fields(nodes = nodes.len()))]
pub fn format_document(nodes: &[Value]) -> RenderedDocument {
    let mut body = blocks::render_text(nodes);
    let links = collect_links(nodes);

    if !links.is_empty() {
        let tags = links
            .iter()
            .map(Link::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        body.push_str(&format!("\n\n{LINK_TAGS_HEADER}\n{tags}"));
    }

    debug!(body_len = body.len(), links = links.len(), "document rendered");

    RenderedDocument { body, links }
}

/// Render any JSON value that may hold a document.
///
/// Accepts a bare array of nodes or an object wrapping one under
/// `document` (the shape of a canvas cell). Anything else is empty.
pub fn format_value(value: &Value) -> RenderedDocument {
    match value {
        Value::Array(nodes) => format_document(nodes),
        Value::Object(map) => match map.get("document") {
            Some(Value::Array(nodes)) => format_document(nodes),
            _ => RenderedDocument::default(),
        },
        _ => RenderedDocument::default(),
    }
}

/// Whether a JSON cell value is a canvas document.
pub fn is_canvas(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("canvas")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn load_fixture(name: &str) -> Value {
        let content = fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"));
        serde_json::from_str(&content).unwrap_or_else(|e| panic!("invalid fixture {name}: {e}"))
    }

    #[test]
    fn document_without_links_has_no_tag_section() {
        let tree = json!([{"type": "paragraph", "text": "Plain answer."}]);
        let doc = format_value(&tree);
        assert_eq!(doc.body, "Plain answer.");
        assert!(doc.links.is_empty());
    }

    #[test]
    fn link_tags_section_lists_every_link_in_order() {
        let tree = json!([
            {"type": "paragraph", "spans": [
                {"text": "Read "},
                {"text": "L1", "link": "https://one.test"}
            ]},
            {"type": "list", "ordered": true, "items": [
                {"spans": [{"text": "L2", "link": "https://two.test"}]},
                {"spans": [{"text": "L1 again", "link": "https://one.test"}]}
            ]}
        ]);
        let doc = format_value(&tree);
        assert_eq!(
            doc.body,
            "Read <https://one.test|L1>\n\
             1. <https://two.test|L2>\n\
             2. <https://one.test|L1 again>\n\
             \n\
             Link Tags:\n\
             <https://one.test|L1>\n\
             <https://two.test|L2>\n\
             <https://one.test|L1 again>"
        );
        assert_eq!(doc.links.len(), 3);
    }

    #[test]
    fn formatting_is_deterministic() {
        let tree = load_fixture("json/canvas-answer.fixture.json");
        let first = format_value(&tree);
        for _ in 0..5 {
            assert_eq!(format_value(&tree), first);
        }
    }

    #[test]
    fn canvas_fixture_renders_expected_text() {
        let cell = load_fixture("json/canvas-answer.fixture.json");
        assert!(is_canvas(&cell));

        let doc = format_value(&cell);
        let expected = fs::read_to_string(fixture_path("json/canvas-answer.expected.txt"))
            .expect("read expected output");
        assert_eq!(doc.body, expected.trim_end_matches('\n'));
        assert_eq!(doc.links.len(), 3);
        assert_eq!(doc.links[0].url, doc.links[2].url);
    }

    #[test]
    fn non_document_values_render_empty() {
        assert_eq!(format_value(&json!("text")), RenderedDocument::default());
        assert_eq!(format_value(&json!({"document": "nope"})), RenderedDocument::default());
        assert_eq!(format_value(&json!(null)).body, "");
    }

    #[test]
    fn document_without_text_or_links_is_empty() {
        let tree = json!([{"type": "divider", "spans": []}, {"content": []}]);
        let doc = format_value(&tree);
        assert_eq!(doc.body, "");
        assert!(doc.links.is_empty());
    }

    #[test]
    fn links_only_document_still_gets_tag_section() {
        let tree = json!([{"items": [{"segments": [{"link": "https://solo.test"}]}]}]);
        let doc = format_value(&tree);
        assert!(doc.body.starts_with("• <https://solo.test|https://solo.test>"));
        assert!(doc.body.ends_with("Link Tags:\n<https://solo.test|https://solo.test>"));
    }
}
