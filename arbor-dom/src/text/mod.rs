use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::element::{Element, Kind};

pub fn display_width(s: &str) -> usize {
    s.width()
}

pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let current_width = display_width(s);
    if current_width <= max_width {
        return s.to_string();
    }

    if max_width == 0 {
        return String::new();
    }

    let ellipsis = "…";
    let ellipsis_width = 1;
    let target_width = max_width.saturating_sub(ellipsis_width);

    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = char_width(ch);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result.push_str(ellipsis);
    result
}

/// One display row of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Key of the element the row was produced from.
    pub key: String,
    pub depth: usize,
    pub text: String,
    pub classes: Vec<&'static str>,
}

impl Line {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }
}

/// Flatten a visual tree into display rows, one per item or placeholder.
///
/// Item rows join the text of their toggle, checkbox and title parts.
pub fn lines(root: &Element) -> Vec<Line> {
    let mut out = Vec::new();
    collect_lines(root, 0, &mut out);
    out
}

fn collect_lines(element: &Element, depth: usize, out: &mut Vec<Line>) {
    match element.kind {
        Kind::List => {
            for child in element.child_elements() {
                collect_lines(child, depth, out);
            }
        }
        Kind::Item => {
            let mut parts: Vec<&str> = Vec::with_capacity(3);
            for part in element.child_elements() {
                if matches!(part.kind, Kind::Toggle | Kind::Checkbox | Kind::Title) {
                    if let Some(text) = part.text_content() {
                        parts.push(text);
                    }
                }
            }
            out.push(Line {
                key: element.key.clone(),
                depth,
                text: parts.join(" "),
                classes: element.classes.clone(),
            });
            for part in element.child_elements() {
                if matches!(part.kind, Kind::List | Kind::Placeholder) {
                    collect_lines(part, depth + 1, out);
                }
            }
        }
        Kind::Placeholder => out.push(Line {
            key: element.key.clone(),
            depth,
            text: element.text_content().unwrap_or_default().to_string(),
            classes: element.classes.clone(),
        }),
        Kind::Toggle | Kind::Checkbox | Kind::Title => {}
    }
}
