//! Compound simple selectors.
//!
//! Only the selector forms a widget container is realistically addressed by
//! are understood: a type selector (`body`, `div`), the universal selector
//! (`*`), id selectors (`#main`), class selectors (`.wide`), and compounds of
//! those (`div#main.wide`). Anything else (combinators, attribute selectors,
//! pseudo-classes, selector lists) fails to parse, and an unparseable selector
//! matches nothing.

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parses `input`, returning `None` for unsupported or malformed syntax.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toprogress::dom::Selector;
    ///
    /// assert!(Selector::parse("body").is_some());
    /// assert!(Selector::parse("div#container.wide").is_some());
    /// assert!(Selector::parse("div > p").is_none());
    /// assert!(Selector::parse("").is_none());
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector::default();
        let mut rest = input;

        if let Some(stripped) = rest.strip_prefix('*') {
            rest = stripped;
        } else if !rest.starts_with(['#', '.']) {
            let (ident, tail) = split_ident(rest)?;
            selector.tag = Some(ident.to_ascii_lowercase());
            rest = tail;
        }

        while let Some(marker) = rest.chars().next() {
            let (ident, tail) = split_ident(&rest[marker.len_utf8()..])?;
            match marker {
                '#' => {
                    // `#a#b` can never match a single element
                    if selector.id.is_some() {
                        return None;
                    }
                    selector.id = Some(ident.to_string());
                }
                '.' => selector.classes.push(ident.to_string()),
                _ => return None,
            }
            rest = tail;
        }

        Some(selector)
    }

    /// Tests the selector against an element's tag, id and class list.
    pub(crate) fn matches(&self, tag: &str, id: &str, classes: &[String]) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if expected != id {
                return false;
            }
        }
        self.classes.iter().all(|class| classes.contains(class))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Splits a leading identifier off `input`. Fails on an empty identifier.
fn split_ident(input: &str) -> Option<(&str, &str)> {
    let end = input
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(input.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    Some(input.split_at(end))
}
