use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of probing one size on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
    /// No size selector for this label on the page.
    NotFound,
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }

    /// Classifies a DOM `class` attribute value. Only the exact `disabled`
    /// token counts, mirroring `classList.contains`.
    pub fn from_class_list(class_attr: Option<&str>) -> Self {
        let disabled = class_attr
            .map(|classes| classes.split_whitespace().any(|c| c == "disabled"))
            .unwrap_or(false);

        if disabled {
            Availability::Unavailable
        } else {
            Availability::Available
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Availability::Available => "available",
            Availability::Unavailable => "unavailable",
            Availability::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// Regex-based detector for server-rendered size selectors, e.g.
/// `<input type="radio" name="Size" value="S/M" class="disabled">`.
pub struct SizeDetector {
    input_tag: Regex,
    size_name: Regex,
    disabled_class: Regex,
}

impl Default for SizeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeDetector {
    pub fn new() -> Self {
        Self {
            // quoted attribute values may contain '>'
            input_tag: Regex::new(r#"(?i)<input\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
                .expect("static regex"),
            // attribute name is case-insensitive, its value is not
            size_name: Regex::new(r#"\s(?i:name)\s*=\s*["']Size["']"#).expect("static regex"),
            disabled_class: Regex::new(
                r#"(?i)\sclass\s*=\s*(?:"[^"]*disabled[^"]*"|'[^']*disabled[^']*')"#,
            )
            .expect("static regex"),
        }
    }

    /// Finds the first size input for `size` and reports whether it is
    /// selectable. Attribute order inside the tag does not matter.
    pub fn detect(&self, html: &str, size: &str) -> Availability {
        match self.find_size_input(html, size) {
            None => Availability::NotFound,
            Some(tag) if self.disabled_class.is_match(tag) => Availability::Unavailable,
            Some(_) => Availability::Available,
        }
    }

    pub fn detect_all(&self, html: &str, sizes: &[String]) -> Vec<(String, Availability)> {
        sizes
            .iter()
            .map(|size| (size.clone(), self.detect(html, size)))
            .collect()
    }

    fn find_size_input<'h>(&self, html: &'h str, size: &str) -> Option<&'h str> {
        let value = value_pattern(size);
        self.input_tag
            .find_iter(html)
            .map(|m| m.as_str())
            .find(|tag| self.size_name.is_match(tag) && value.is_match(tag))
    }
}

fn value_pattern(size: &str) -> Regex {
    let pattern = format!(
        r#"\svalue\s*=\s*(?:"{0}"|'{0}')"#,
        regex::escape(size)
    );
    // escaped input always yields a valid pattern
    Regex::new(&pattern).expect("escaped size pattern")
}
