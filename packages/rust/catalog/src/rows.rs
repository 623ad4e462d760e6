//! Conversion of raw table rows into catalog entries and dump records.

use std::collections::HashMap;

use faqdesk_render::{format_steps, format_value, is_canvas};
use faqdesk_shared::{CatalogConfig, FaqEntry};
use serde::Serialize;
use serde_json::Value;

use crate::client::{TableColumn, TableRow};

/// Answer text used when a row's answer cell is empty or unrenderable.
pub const NO_ANSWER: &str = "[No answer provided]";

/// Column id to column name.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap(HashMap<String, String>);

impl ColumnMap {
    pub fn name_of(&self, column_id: &str) -> Option<&str> {
        self.0.get(column_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TableColumn> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = TableColumn>>(iter: I) -> Self {
        Self(iter.into_iter().map(|c| (c.id, c.name)).collect())
    }
}

/// Names of the columns holding each part of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqColumns {
    pub question: String,
    pub answer: String,
    pub link: String,
}

impl From<&CatalogConfig> for FaqColumns {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            question: config.question_column.clone(),
            answer: config.answer_column.clone(),
            link: config.link_column.clone(),
        }
    }
}

impl Default for FaqColumns {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

/// Build an entry from one row. Cells of unknown columns are ignored.
pub fn row_to_entry(row: &TableRow, columns: &ColumnMap, roles: &FaqColumns) -> FaqEntry {
    let mut question = String::new();
    let mut answer = String::new();
    let mut link = None;

    for (column_id, value) in &row.values {
        let Some(name) = columns.name_of(column_id) else {
            continue;
        };

        if name == roles.question {
            question = cell_text(value);
        } else if name == roles.answer {
            answer = render_answer(value);
        } else if name == roles.link {
            link = cell_link(value);
        }
    }

    if answer.trim().is_empty() {
        answer = NO_ANSWER.to_string();
    }

    FaqEntry::new(question, answer, link)
}

/// Plain text answers become step lists; canvas cells are rendered trees.
pub fn render_answer(value: &Value) -> String {
    match value {
        Value::String(text) => format_steps(text),
        Value::Object(_) if is_canvas(value) => format_value(value).body,
        _ => String::new(),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A link cell is either a URL string or a web-page object carrying `url`.
fn cell_link(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("url").and_then(Value::as_str)?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Short, single-line preview of an answer for log output.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

// ---------------------------------------------------------------------------
// Dump
// ---------------------------------------------------------------------------

/// A row with column names substituted for ids, values left raw.
#[derive(Debug, Clone, Serialize)]
pub struct DumpedRow {
    #[serde(rename = "rowId")]
    pub row_id: String,
    pub values: serde_json::Map<String, Value>,
}

impl DumpedRow {
    /// Unknown column ids are kept as-is.
    pub fn from_row(row: &TableRow, columns: &ColumnMap) -> Self {
        let values = row
            .values
            .iter()
            .map(|(id, value)| {
                let name = columns.name_of(id).unwrap_or(id);
                (name.to_string(), value.clone())
            })
            .collect();

        Self {
            row_id: row.id.clone(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> ColumnMap {
        [("c-q", "Question"), ("c-a", "Next Step"), ("c-l", "Link")]
            .into_iter()
            .map(|(id, name)| TableColumn {
                id: id.into(),
                name: name.into(),
            })
            .collect()
    }

    fn row(values: Value) -> TableRow {
        serde_json::from_value(json!({"id": "r-1", "values": values})).unwrap()
    }

    #[test]
    fn plain_text_answer_becomes_steps() {
        let r = row(json!({
            "c-q": "How do I reset my password?",
            "c-a": "Open settings\nClick reset",
            "c-l": "https://faq.test/reset"
        }));
        let entry = row_to_entry(&r, &columns(), &FaqColumns::default());
        assert_eq!(entry.question, "How do I reset my password?");
        assert_eq!(entry.answer, "1. Open settings\n2. Click reset");
        assert_eq!(entry.link.as_deref(), Some("https://faq.test/reset"));
    }

    #[test]
    fn canvas_answer_is_rendered() {
        let r = row(json!({
            "c-q": "Where is billing?",
            "c-a": {
                "type": "canvas",
                "document": [{"type": "paragraph", "spans": [
                    {"text": "See "},
                    {"text": "billing", "link": "https://app.test/billing"}
                ]}]
            }
        }));
        let entry = row_to_entry(&r, &columns(), &FaqColumns::default());
        assert_eq!(
            entry.answer,
            "See <https://app.test/billing|billing>\n\nLink Tags:\n<https://app.test/billing|billing>"
        );
        assert_eq!(entry.link, None);
    }

    #[test]
    fn missing_or_unsupported_answer_gets_placeholder() {
        let r = row(json!({"c-q": "Empty?"}));
        assert_eq!(row_to_entry(&r, &columns(), &FaqColumns::default()).answer, NO_ANSWER);

        let r = row(json!({"c-q": "Odd?", "c-a": {"type": "image"}}));
        assert_eq!(row_to_entry(&r, &columns(), &FaqColumns::default()).answer, NO_ANSWER);

        let r = row(json!({"c-q": "Blank?", "c-a": "   \n "}));
        assert_eq!(row_to_entry(&r, &columns(), &FaqColumns::default()).answer, NO_ANSWER);
    }

    #[test]
    fn link_cells_accept_strings_and_web_page_objects() {
        assert_eq!(cell_link(&json!("")), None);
        assert_eq!(cell_link(&json!("  https://a.test ")).as_deref(), Some("https://a.test"));
        assert_eq!(
            cell_link(&json!({"@type": "WebPage", "url": "https://b.test"})).as_deref(),
            Some("https://b.test")
        );
        assert_eq!(cell_link(&json!(42)), None);
    }

    #[test]
    fn custom_column_names() {
        let cols: ColumnMap = [("x", "Prompt"), ("y", "Reply")]
            .into_iter()
            .map(|(id, name)| TableColumn {
                id: id.into(),
                name: name.into(),
            })
            .collect();
        let roles = FaqColumns {
            question: "Prompt".into(),
            answer: "Reply".into(),
            link: "Url".into(),
        };
        let entry = row_to_entry(&row(json!({"x": "Q", "y": "A"})), &cols, &roles);
        assert_eq!(entry.question, "Q");
        assert_eq!(entry.answer, "1. A");
    }

    #[test]
    fn dump_substitutes_known_column_names() {
        let r = row(json!({"c-q": "Q", "c-zzz": 5}));
        let dumped = DumpedRow::from_row(&r, &columns());
        assert_eq!(dumped.row_id, "r-1");
        assert_eq!(dumped.values["Question"], "Q");
        assert_eq!(dumped.values["c-zzz"], 5);

        let json = serde_json::to_value(&dumped).unwrap();
        assert_eq!(json["rowId"], "r-1");
    }

    #[test]
    fn preview_truncates_and_flattens() {
        assert_eq!(preview("a\nb", 100), "a b");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
