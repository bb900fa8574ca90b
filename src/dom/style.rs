//! Inline style declarations.
//!
//! A [`Style`] is the in-memory counterpart of an element's `style` attribute:
//! an ordered list of `property: value` pairs. Property names are stored in
//! their CSS (hyphenated) form, e.g. `background-color` or `-webkit-transition`.

use std::fmt;

/// Ordered set of inline CSS declarations.
///
/// Setting a property that already exists replaces its value in place, so the
/// rendered `css_text()` keeps the order in which properties were first set.
/// Setting a property to the empty string removes it, as `element.style.x = ''`
/// does in a browser.
///
/// # Examples
///
/// ```rust
/// use toprogress::dom::Style;
///
/// let mut style = Style::new();
/// style.set("width", "0%");
/// style.set("opacity", "1");
/// style.set("width", "50%");
///
/// assert_eq!(style.get("width"), Some("50%"));
/// assert_eq!(style.css_text(), "width: 50%; opacity: 1;");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    /// Creates an empty declaration block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `property`, if set.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `property` to `value`. An empty value removes the declaration.
    pub fn set(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.remove(property);
            return;
        }

        match self.declarations.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => self
                .declarations
                .push((property.to_string(), value.to_string())),
        }
    }

    /// Removes `property`, returning its previous value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self
            .declarations
            .iter()
            .position(|(name, _)| name == property)?;
        Some(self.declarations.remove(index).1)
    }

    /// Iterates over `(property, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no declarations are set.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serializes the block the way `CSSStyleDeclaration.cssText` does.
    pub fn css_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", name, value)?;
        }
        Ok(())
    }
}
