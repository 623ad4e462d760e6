//! Heuristic step-list formatting for plain-text answers.
//!
//! Each non-empty line is classified as a section heading, a continuation
//! of a colon-terminated line, a conditional note, or a numbered step. The
//! scan threads a small fold state: the step counter (global, never reset)
//! and whether the previous line ended with a colon.

use std::sync::LazyLock;

use regex::Regex;

/// Lines introducing a section (`For admins:`, `Here's how`, `Step 2`, ...).
static HEADING_LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(for |here|step|guide)").expect("heading lead regex"));

/// Lines introducing a condition or aside.
static CONDITIONAL_LEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(if|when|then|else|otherwise|note)").expect("conditional lead regex")
});

const CONTINUATION_INDENT: &str = "      ";
const CONDITIONAL_INDENT: &str = "   ";

/// How a single line is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepRole {
    Heading,
    Continuation,
    Conditional,
    Numbered(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepLine<'a> {
    pub text: &'a str,
    pub role: StepRole,
}

impl StepLine<'_> {
    fn render(&self) -> String {
        match self.role {
            StepRole::Heading => format!("\n*{}*", self.text),
            StepRole::Continuation => format!("{CONTINUATION_INDENT}• {}", self.text),
            StepRole::Conditional => format!("{CONDITIONAL_INDENT}• {}", self.text),
            StepRole::Numbered(n) => format!("{n}. {}", self.text),
        }
    }
}

/// Fold state carried from one line to the next.
#[derive(Debug, Clone, Copy)]
struct ScanState {
    next_step: usize,
    after_colon: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            next_step: 1,
            after_colon: false,
        }
    }
}

impl ScanState {
    fn classify<'a>(&mut self, text: &'a str) -> StepLine<'a> {
        if HEADING_LEAD_RE.is_match(text) {
            self.after_colon = false;
            return StepLine {
                text,
                role: StepRole::Heading,
            };
        }

        let role = if self.after_colon {
            StepRole::Continuation
        } else if CONDITIONAL_LEAD_RE.is_match(text) {
            StepRole::Conditional
        } else {
            let n = self.next_step;
            self.next_step += 1;
            StepRole::Numbered(n)
        };

        self.after_colon = text.ends_with(':');
        StepLine { text, role }
    }
}

/// Classify the trimmed, non-empty lines of `text` in order.
pub(crate) fn classify_lines(text: &str) -> Vec<StepLine<'_>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .scan(ScanState::default(), |state, line| Some(state.classify(line)))
        .collect()
}

/// Reformat a plain-text answer as a numbered, indented step list.
pub fn format_steps(text: &str) -> String {
    classify_lines(text)
        .iter()
        .map(StepLine::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_counter_numbers_plain_lines() {
        assert_eq!(format_steps("Do X\nDo Y\nDo Z"), "1. Do X\n2. Do Y\n3. Do Z");
    }

    #[test]
    fn colon_continuation_does_not_consume_counter() {
        let out = format_steps("Check this:\nsub item one\nsub item two\nSubmit the form");
        assert_eq!(
            out,
            "1. Check this:\n      • sub item one\n      • sub item two\n2. Submit the form"
        );
    }

    #[test]
    fn continuation_chains_while_lines_end_with_colon() {
        let roles: Vec<StepRole> = classify_lines("Open menu:\nChoose one:\nthe first\nnext")
            .into_iter()
            .map(|l| l.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                StepRole::Numbered(1),
                StepRole::Continuation,
                StepRole::Continuation,
                StepRole::Numbered(2),
            ]
        );
    }

    #[test]
    fn heading_lines_are_emphasized_and_reset_colon_flag() {
        let out = format_steps("Configure it:\nFor admins:\nOpen the console");
        assert_eq!(out, "1. Configure it:\n\n*For admins:*\n2. Open the console");
    }

    #[test]
    fn heading_lead_is_case_insensitive_and_needs_space_after_for() {
        let lines = classify_lines("STEP one\nhere we go\nFormat the disk\nguide");
        let roles: Vec<StepRole> = lines.iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![
                StepRole::Heading,
                StepRole::Heading,
                StepRole::Numbered(1),
                StepRole::Heading,
            ]
        );
    }

    #[test]
    fn conditional_lines_are_shallow_bullets() {
        let out = format_steps("Restart the app\nIf it still fails:\ncontact support\nNote: logs help");
        assert_eq!(
            out,
            "1. Restart the app\n   • If it still fails:\n      • contact support\n   • Note: logs help"
        );
    }

    #[test]
    fn blank_lines_and_whitespace_are_dropped() {
        let out = format_steps("\n\n   Open the app   \r\n\n\t\nLog in\n");
        assert_eq!(out, "1. Open the app\n2. Log in");
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(format_steps(""), "");
        assert_eq!(format_steps("   \n  "), "");
    }
}
