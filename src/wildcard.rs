//! Glob-style wildcard patterns used by the wildcard pointcut strategy.
//!
//! # Quantifiers
//!
//! | Symbol | Matches |
//! |--------|---------|
//! | `*` | zero or more characters, never a separator |
//! | `**` | zero or more characters, separators included |
//! | `?` | zero or one character, never a separator |
//! | `+` | exactly one character, never a separator |
//! | `\` | escapes the next character |
//!
//! When a pattern is compiled without a separator, `*` and `**` behave alike.
//!
//! # Examples
//!
//! ```rust
//! use aspect_engine::wildcard::WildcardPattern;
//!
//! let pattern = WildcardPattern::compile_with_separator("/static/**/*.jpg", '/');
//! assert!(pattern.matches("/static/a/b/c.jpg"));
//! assert!(!pattern.matches("/images/c.jpg"));
//!
//! let pattern = WildcardPattern::compile_with_separator("/static/*", '/');
//! assert!(!pattern.matches("/static/a/b.jpg"));
//! ```

use std::fmt;

pub const STAR_CHAR: char = '*';
pub const QUESTION_CHAR: char = '?';
pub const PLUS_CHAR: char = '+';
pub const ESCAPE_CHAR: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Literal(char),
    Separator,
    Star,
    StarStar,
    Question,
    Plus,
}

/// A compiled wildcard pattern, optionally aware of a segment separator.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: String,
    separator: Option<char>,
    elements: Vec<Element>,
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> Self {
        Self::build(pattern, None)
    }

    pub fn compile_with_separator(pattern: &str, separator: char) -> Self {
        Self::build(pattern, Some(separator))
    }

    fn build(pattern: &str, separator: Option<char>) -> Self {
        let mut elements = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            let element = match c {
                ESCAPE_CHAR => Element::Literal(chars.next().unwrap_or(ESCAPE_CHAR)),
                STAR_CHAR => {
                    if chars.peek() == Some(&STAR_CHAR) {
                        chars.next();
                        Element::StarStar
                    } else {
                        Element::Star
                    }
                }
                QUESTION_CHAR => Element::Question,
                PLUS_CHAR => Element::Plus,
                c if Some(c) == separator => Element::Separator,
                c => Element::Literal(c),
            };
            // consecutive stars add nothing once a double star is present
            if matches!(element, Element::Star | Element::StarStar)
                && elements.last() == Some(&Element::StarStar)
            {
                continue;
            }
            elements.push(element);
        }
        Self {
            pattern: pattern.to_string(),
            separator,
            elements,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn separator(&self) -> Option<char> {
        self.separator
    }

    /// Returns true if the whole of `input` matches this pattern.
    pub fn matches(&self, input: &str) -> bool {
        let text: Vec<char> = input.chars().collect();
        let n = text.len();
        let width = n + 1;
        let is_separator = |c: char| self.separator == Some(c);

        // next[j]: the elements already processed match text[j..]
        let mut next = vec![false; width];
        next[n] = true;
        let mut current = vec![false; width];

        for element in self.elements.iter().rev() {
            for j in (0..=n).rev() {
                let ch = text.get(j).copied();
                current[j] = match *element {
                    Element::Literal(c) => ch == Some(c) && next[j + 1],
                    Element::Separator => ch.is_some_and(is_separator) && next[j + 1],
                    Element::Star => {
                        next[j] || (ch.is_some_and(|c| !is_separator(c)) && current[j + 1])
                    }
                    Element::StarStar => next[j] || (ch.is_some() && current[j + 1]),
                    Element::Question => {
                        next[j] || (ch.is_some_and(|c| !is_separator(c)) && next[j + 1])
                    }
                    Element::Plus => ch.is_some_and(|c| !is_separator(c)) && next[j + 1],
                };
            }
            std::mem::swap(&mut next, &mut current);
        }
        next[0]
    }

    /// Returns true if `s` contains a quantifier or an escape, meaning it
    /// cannot be compared with a candidate as plain text.
    pub fn has_wildcards(s: &str) -> bool {
        s.contains(|c: char| {
            c == STAR_CHAR || c == QUESTION_CHAR || c == PLUS_CHAR || c == ESCAPE_CHAR
        })
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.separator == other.separator
    }
}

impl Eq for WildcardPattern {}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
