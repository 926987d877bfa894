//! Annotation model.
//!
//! A free-text comment plus four flags
//! encoded as whole-word tokens inside that same text, parsed back out with
//! whole-word regex matching so `rebase=nopush=no` glued together is left
//! untouched and at default qualifiers.

use regex::Regex;

use crate::styling::{dim, underline};

/// The four per-branch behavior overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualifiers {
    pub rebase: bool,
    pub push: bool,
    pub slide_out: bool,
    pub update_with_merge: bool,
}

impl Default for Qualifiers {
    fn default() -> Self {
        Qualifiers {
            rebase: true,
            push: true,
            slide_out: true,
            update_with_merge: false,
        }
    }
}

impl Qualifiers {
    pub fn is_default(&self) -> bool {
        self.rebase && self.push && self.slide_out && !self.update_with_merge
    }

    pub fn is_non_default(&self) -> bool {
        !self.is_default()
    }
}

impl std::fmt::Display for Qualifiers {
    /// Space-separated tokens, omitting defaults, in a fixed order:
    /// `rebase=no`, `push=no`, `slide-out=no`, `update=merge`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let segments: Vec<&str> = [
            (!self.rebase).then_some("rebase=no"),
            (!self.push).then_some("push=no"),
            (!self.slide_out).then_some("slide-out=no"),
            self.update_with_merge.then_some("update=merge"),
        ]
        .into_iter()
        .flatten()
        .collect();
        write!(f, "{}", segments.join(" "))
    }
}

/// Free-form branch comment plus the qualifier flags embedded in its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text_without_qualifiers: String,
    pub qualifiers: Qualifiers,
}

impl Annotation {
    /// `text + " " + qualifiers`, either half omitted when empty/default —
    /// the form persisted to the branch-layout file.
    pub fn unformatted_full_text(&self) -> String {
        if self.text_without_qualifiers.is_empty() && self.qualifiers.is_default() {
            return String::new();
        }
        let mut result = String::new();
        if !self.text_without_qualifiers.is_empty() {
            result.push_str(&self.text_without_qualifiers);
        }
        if !self.text_without_qualifiers.is_empty() && self.qualifiers.is_non_default() {
            result.push(' ');
        }
        if self.qualifiers.is_non_default() {
            result.push_str(&self.qualifiers.to_string());
        }
        result
    }

    /// Same as [`Self::unformatted_full_text`], but with the text dimmed and
    /// the qualifier segment dimmed-and-underlined, for status output.
    pub fn formatted_full_text(&self) -> String {
        if self.text_without_qualifiers.is_empty() && self.qualifiers.is_default() {
            return String::new();
        }
        let mut result = String::new();
        if !self.text_without_qualifiers.is_empty() {
            result.push_str(&dim(&self.text_without_qualifiers));
        }
        if !self.text_without_qualifiers.is_empty() && self.qualifiers.is_non_default() {
            result.push(' ');
        }
        if self.qualifiers.is_non_default() {
            result.push_str(&dim(&underline(&self.qualifiers.to_string())));
        }
        result
    }

    /// Parse a raw annotation string (the text following the branch name on
    /// a branch-layout line) into text and qualifiers.
    ///
    /// Whole-word matching is required: substrings glued to a
    /// larger token (e.g. `rebase=nopush=no`) leave qualifiers at their
    /// defaults and remain in the text untouched.
    pub fn parse(text_with_qualifiers: &str) -> Annotation {
        let mut text = text_with_qualifiers.to_string();
        let mut qualifiers = Qualifiers::default();

        parse_one(&mut text, "rebase=no", |q| q.rebase = false, &mut qualifiers);
        parse_one(&mut text, "push=no", |q| q.push = false, &mut qualifiers);
        parse_one(&mut text, "slide-out=no", |q| q.slide_out = false, &mut qualifiers);
        parse_one(&mut text, "update=merge", |q| q.update_with_merge = true, &mut qualifiers);

        Annotation {
            text_without_qualifiers: text.trim().to_string(),
            qualifiers,
        }
    }
}

fn parse_one(text: &mut String, pattern: &str, apply: impl FnOnce(&mut Qualifiers), qualifiers: &mut Qualifiers) {
    let whole_word = Regex::new(&format!(r"\b{}\b", regex::escape(pattern))).expect("static pattern");
    if whole_word.is_match(text) {
        apply(qualifiers);
        let strip = Regex::new(&format!(r"[ ]?{}[ ]?", regex::escape(pattern))).expect("static pattern");
        *text = strip.replace(text, " ").into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_four_qualifiers() {
        let a = Annotation::parse("my comment rebase=no push=no slide-out=no update=merge");
        assert_eq!(a.text_without_qualifiers, "my comment");
        assert!(!a.qualifiers.rebase);
        assert!(!a.qualifiers.push);
        assert!(!a.qualifiers.slide_out);
        assert!(a.qualifiers.update_with_merge);
    }

    #[test]
    fn glued_tokens_are_left_alone() {
        let a = Annotation::parse("rebase=nopush=no");
        assert_eq!(a.text_without_qualifiers, "rebase=nopush=no");
        assert_eq!(a.qualifiers, Qualifiers::default());
    }

    #[test]
    fn plain_text_with_no_qualifiers() {
        let a = Annotation::parse("PR #123");
        assert_eq!(a.text_without_qualifiers, "PR #123");
        assert_eq!(a.qualifiers, Qualifiers::default());
    }

    #[test]
    fn roundtrip_through_unformatted_full_text() {
        let original = "feature work rebase=no update=merge";
        let a = Annotation::parse(original);
        let rendered = a.unformatted_full_text();
        let reparsed = Annotation::parse(&rendered);
        assert_eq!(a, reparsed);
    }

    #[test]
    fn empty_annotation_renders_empty() {
        let a = Annotation::parse("");
        assert_eq!(a.unformatted_full_text(), "");
    }

    #[test]
    fn qualifiers_display_order_is_fixed() {
        let q = Qualifiers {
            rebase: false,
            push: false,
            slide_out: false,
            update_with_merge: true,
        };
        assert_eq!(q.to_string(), "rebase=no push=no slide-out=no update=merge");
    }
}
