//! Canonical, read-only view over a loosely-shaped document node.
//!
//! Document trees arrive as arbitrary JSON. A node may spell its type as
//! `type` or `kind`, keep its inline text under `segments`, `spans` or
//! `text` (or simply be a string), and keep its children under `items`,
//! `content` or `children`. [`NodeView`] resolves those alternatives in a
//! fixed priority order every time it is asked; nothing is cached on the
//! node and nothing is ever written back. Fields of an unexpected JSON type
//! are treated as absent.

use serde_json::Value;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Block kind inferred from a node's free-form type label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    /// Any label starting with `heading` (`heading1`, `Heading_2`, ...).
    Heading,
    /// Any label containing `list` that is not a list item.
    List,
    ListItem,
    Text,
    /// No type label at all.
    Untyped,
    /// A label outside the known set, kept for diagnostics.
    Unknown(String),
}

impl NodeKind {
    /// Classify a type label. Case, `_`, `-` and spaces are ignored.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(raw) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return Self::Untyped;
        };

        let key = normalize_label(raw);
        if key == "paragraph" {
            Self::Paragraph
        } else if key.starts_with("heading") {
            Self::Heading
        } else if key.contains("listitem") {
            Self::ListItem
        } else if key.contains("list") {
            Self::List
        } else if key == "text" {
            Self::Text
        } else {
            Self::Unknown(raw.to_string())
        }
    }

    /// Kinds rendered as a single flowing line of text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::Heading | Self::Text | Self::Untyped
        )
    }
}

/// Lowercase and drop separators so `list_item`, `list-item` and
/// `listItem` compare equal.
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether a node-type label asks for numbering: it mentions `number` or
/// `ordered` anywhere, so `unorderedList` counts too.
fn label_says_ordered(label: &str) -> bool {
    let key = normalize_label(label);
    key.contains("number") || key.contains("ordered")
}

/// Whether a `listType`/`style` value asks for numbering. Bullet styles
/// never do.
fn style_says_ordered(style: &str) -> bool {
    let key = normalize_label(style);
    !(key.contains("unordered") || key.contains("bullet")) && label_says_ordered(style)
}

// ---------------------------------------------------------------------------
// InlineRun
// ---------------------------------------------------------------------------

/// Smallest unit of inline text, optionally carrying a hyperlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineRun<'a> {
    pub text: &'a str,
    pub link: Option<&'a str>,
}

impl<'a> InlineRun<'a> {
    /// Read a run from a `segments`/`spans` element.
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self { text, link: None }),
            Value::Object(map) => Some(Self {
                text: map.get("text").and_then(Value::as_str).unwrap_or(""),
                link: map
                    .get("link")
                    .and_then(Value::as_str)
                    .filter(|l| !l.is_empty()),
            }),
            _ => None,
        }
    }

    /// Visible label of a linked run: its text, or the URL itself.
    pub fn label(&self) -> &'a str {
        match self.link {
            Some(url) if self.text.is_empty() => url,
            _ => self.text,
        }
    }
}

// ---------------------------------------------------------------------------
// NodeView
// ---------------------------------------------------------------------------

/// Borrowed view resolving a raw node's shape on read.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    raw: &'a Value,
}

impl<'a> NodeView<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// The underlying JSON value.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    /// Only objects and non-empty strings carry anything to render.
    pub fn is_renderable(&self) -> bool {
        match self.raw {
            Value::Object(_) => true,
            Value::String(s) => !s.is_empty(),
            _ => false,
        }
    }

    /// Raw type label (`type`, falling back to `kind`).
    pub fn label(&self) -> Option<&'a str> {
        self.str_field("type").or_else(|| self.str_field("kind"))
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_label(self.label())
    }

    /// `true` only when the field holds the JSON boolean `true`.
    pub fn flag(&self, name: &str) -> bool {
        self.raw.get(name).and_then(Value::as_bool) == Some(true)
    }

    // -- children ----------------------------------------------------------

    /// Non-empty `items` array.
    pub fn items(&self) -> Option<&'a [Value]> {
        self.array_field(name::ITEMS)
    }

    /// Non-empty `content` array.
    pub fn content(&self) -> Option<&'a [Value]> {
        self.array_field(name::CONTENT)
    }

    /// Non-empty `children` array.
    pub fn children(&self) -> Option<&'a [Value]> {
        self.array_field(name::CHILDREN)
    }

    /// Canonical children: `items`, then `content`, then `children`.
    /// The first non-empty field wins; fields are never merged.
    pub fn child_nodes(&self) -> &'a [Value] {
        self.items()
            .or_else(|| self.content())
            .or_else(|| self.children())
            .unwrap_or(&[])
    }

    /// Nested blocks of a non-list node: `content`, then `children`.
    pub fn nested(&self) -> Option<&'a [Value]> {
        self.content().or_else(|| self.children())
    }

    // -- inline text -------------------------------------------------------

    /// Canonical inline runs: `segments`, then `spans`, then the node
    /// itself when it is a string, then a string `text` field.
    pub fn inline_runs(&self) -> Vec<InlineRun<'a>> {
        if let Some(runs) = self.raw.get(name::SEGMENTS).and_then(Value::as_array) {
            return runs.iter().filter_map(InlineRun::from_value).collect();
        }
        if let Some(runs) = self.raw.get(name::SPANS).and_then(Value::as_array) {
            return runs.iter().filter_map(InlineRun::from_value).collect();
        }
        if let Value::String(text) = self.raw {
            return vec![InlineRun { text, link: None }];
        }
        match self.str_field("text") {
            Some(text) => vec![InlineRun { text, link: None }],
            None => Vec::new(),
        }
    }

    /// Linked runs of one named run collection (`spans` or `segments`).
    pub fn linked_runs(&self, field: &str) -> Vec<InlineRun<'a>> {
        self.raw
            .get(field)
            .and_then(Value::as_array)
            .map(|runs| {
                runs.iter()
                    .filter_map(InlineRun::from_value)
                    .filter(|run| run.link.is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    // -- ordering ----------------------------------------------------------

    /// An ordering marker carried by the node itself: the `ordered` boolean
    /// or a `listType`/`style` label. The type label is not a marker.
    pub fn ordering_marker(&self) -> Option<bool> {
        if let Some(ordered) = self.raw.get("ordered").and_then(Value::as_bool) {
            if ordered {
                return Some(true);
            }
            // `ordered: false` can still be overridden by a list-type label.
            return Some(self.list_type_says_ordered());
        }
        ["listType", "style"]
            .iter()
            .find_map(|f| self.str_field(f))
            .map(style_says_ordered)
    }

    /// Whether this list should be numbered: an explicit marker or a type
    /// label mentioning numbering.
    pub fn ordered_hint(&self) -> bool {
        self.ordering_marker() == Some(true) || self.label().is_some_and(label_says_ordered)
    }

    fn list_type_says_ordered(&self) -> bool {
        ["listType", "style"]
            .iter()
            .filter_map(|f| self.str_field(f))
            .any(style_says_ordered)
    }

    // -- helpers -----------------------------------------------------------

    fn str_field(&self, name: &str) -> Option<&'a str> {
        self.raw.get(name).and_then(Value::as_str)
    }

    fn array_field(&self, name: &str) -> Option<&'a [Value]> {
        self.raw
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .filter(|a| !a.is_empty())
    }
}

/// Field names recognized on nodes.
pub(crate) mod name {
    pub const ITEMS: &str = "items";
    pub const CONTENT: &str = "content";
    pub const CHILDREN: &str = "children";
    pub const SEGMENTS: &str = "segments";
    pub const SPANS: &str = "spans";
}
