//! Construction options.
//!
//! Options come in two shapes. [`Options`] is the plain record with every
//! field spelled out; it implements `Default` and deserializes from a partial
//! record, so `{"color": "#2196F3"}` yields the defaults plus a blue bar.
//! [`ProgressOption`] is the builder form used with [`new`](super::new).

use serde::{Deserialize, Serialize};

/// Default element id.
pub const DEFAULT_ID: &str = "toprogress";
/// Default bar color.
pub const DEFAULT_COLOR: &str = "#F44336";
/// Default bar height.
pub const DEFAULT_HEIGHT: &str = "2px";
/// Default width transition duration, in seconds.
pub const DEFAULT_DURATION: f64 = 0.2;
/// Default container selector.
pub const DEFAULT_SELECTOR: &str = "body";

/// Which edge of the container the bar sticks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Pinned to the top edge.
    #[default]
    Top,
    /// Pinned to the bottom edge.
    Bottom,
}

impl Position {
    /// The CSS property the bar is anchored with.
    pub fn css_property(self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Bottom => "bottom",
        }
    }
}

/// Full widget configuration.
///
/// # Examples
///
/// ```rust
/// use toprogress::progress::{Options, Position};
///
/// let options: Options = serde_json::from_str(r#"{"position": "bottom", "duration": 0.5}"#)?;
/// assert_eq!(options.position, Position::Bottom);
/// assert_eq!(options.duration, 0.5);
/// assert_eq!(options.id, "toprogress");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// `id` attribute given to the bar element.
    pub id: String,
    /// Bar color, any CSS color.
    pub color: String,
    /// Bar height, any CSS length.
    pub height: String,
    /// Width transition duration in seconds for `set_progress`, `increase`,
    /// `decrease`, `reset` and `finish`.
    pub duration: f64,
    /// Edge the bar is anchored to.
    pub position: Position,
    /// Selector of the container the bar is inserted into.
    pub selector: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID.to_string(),
            color: DEFAULT_COLOR.to_string(),
            height: DEFAULT_HEIGHT.to_string(),
            duration: DEFAULT_DURATION,
            position: Position::Top,
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }
}

/// A single override applied over the defaults by [`new`](super::new).
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressOption {
    /// Sets the element id.
    WithId(String),
    /// Sets the bar color.
    WithColor(String),
    /// Sets the bar height.
    WithHeight(String),
    /// Sets the width transition duration in seconds.
    WithDuration(f64),
    /// Anchors the bar to the top or bottom edge.
    WithPosition(Position),
    /// Sets the container selector.
    WithSelector(String),
}

impl ProgressOption {
    pub(crate) fn apply(&self, o: &mut Options) {
        match self {
            ProgressOption::WithId(id) => o.id = id.clone(),
            ProgressOption::WithColor(color) => o.color = color.clone(),
            ProgressOption::WithHeight(height) => o.height = height.clone(),
            ProgressOption::WithDuration(duration) => o.duration = *duration,
            ProgressOption::WithPosition(position) => o.position = *position,
            ProgressOption::WithSelector(selector) => o.selector = selector.clone(),
        }
    }
}

/// Sets the `id` attribute of the bar element.
pub fn with_id(id: impl Into<String>) -> ProgressOption {
    ProgressOption::WithId(id.into())
}

/// Sets the bar color.
///
/// The color is used for the background and for the glow drawn under the bar.
///
/// ```rust
/// use toprogress::dom::Document;
/// use toprogress::progress::{new, with_color};
///
/// let doc = Document::new();
/// let bar = new(&doc, &[with_color("#2196F3")])?;
/// assert_eq!(bar.element().style_value("background-color").as_deref(), Some("#2196F3"));
/// # Ok::<(), toprogress::Error>(())
/// ```
pub fn with_color(color: impl Into<String>) -> ProgressOption {
    ProgressOption::WithColor(color.into())
}

/// Sets the bar height, e.g. `"5px"`.
pub fn with_height(height: impl Into<String>) -> ProgressOption {
    ProgressOption::WithHeight(height.into())
}

/// Sets the width transition duration in seconds.
///
/// The opacity transition runs three times as long, up to one second.
pub fn with_duration(seconds: f64) -> ProgressOption {
    ProgressOption::WithDuration(seconds)
}

/// Anchors the bar to the top or bottom of its container.
pub fn with_position(position: Position) -> ProgressOption {
    ProgressOption::WithPosition(position)
}

/// Sets the selector of the container element.
///
/// With the default `body` the bar is fixed to the viewport; any other
/// container gets a bar positioned relative to it.
pub fn with_selector(selector: impl Into<String>) -> ProgressOption {
    ProgressOption::WithSelector(selector.into())
}
