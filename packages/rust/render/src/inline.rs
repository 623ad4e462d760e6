//! Inline text extraction and the `<url|label>` hyperlink token.

use serde::{Deserialize, Serialize};

use crate::node::{InlineRun, NodeView};

/// A hyperlink found in a document, in chat-compatible `<url|label>` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub label: String,
}

impl Link {
    pub(crate) fn from_run(run: &InlineRun<'_>) -> Option<Self> {
        run.link.map(|url| Self {
            url: url.to_string(),
            label: run.label().to_string(),
        })
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}|{}>", self.url, self.label)
    }
}

/// Flatten a node's inline runs into one string.
///
/// Linked runs become `<url|label>` tokens; runs are concatenated without
/// a separator since the source text already carries its own spacing.
pub fn extract_text(node: &NodeView<'_>) -> String {
    let mut out = String::new();
    for run in node.inline_runs() {
        match Link::from_run(&run) {
            Some(link) => out.push_str(&link.to_string()),
            None => out.push_str(run.text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_of(value: serde_json::Value) -> String {
        extract_text(&NodeView::new(&value))
    }

    #[test]
    fn plain_runs_concatenate_without_separator() {
        let node = json!({"segments": [{"text": "Open "}, {"text": "settings"}]});
        assert_eq!(text_of(node), "Open settings");
    }

    #[test]
    fn linked_run_becomes_token() {
        let node = json!({"spans": [
            {"text": "See "},
            {"text": "the guide", "link": "https://docs.example.com/guide"},
            {"text": " for details."}
        ]});
        assert_eq!(
            text_of(node),
            "See <https://docs.example.com/guide|the guide> for details."
        );
    }

    #[test]
    fn linked_run_without_text_uses_url_as_label() {
        let node = json!({"segments": [{"link": "https://x.test/a"}]});
        assert_eq!(text_of(node), "<https://x.test/a|https://x.test/a>");
    }

    #[test]
    fn missing_text_fields_yield_empty() {
        assert_eq!(text_of(json!({"type": "paragraph"})), "");
        assert_eq!(text_of(json!(null)), "");
        assert_eq!(text_of(json!({"segments": [{"bold": true}]})), "");
    }

    #[test]
    fn link_display_format() {
        let link = Link {
            url: "https://x.test".into(),
            label: "X".into(),
        };
        assert_eq!(link.to_string(), "<https://x.test|X>");
    }
}
