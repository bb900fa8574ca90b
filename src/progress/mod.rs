//! Progress bar widget.
//!
//! A thin colored bar pinned to the top or bottom of a container, animated
//! entirely with CSS transitions.
//!
//! # Basic Usage
//!
//! ```rust
//! use toprogress::dom::Document;
//! use toprogress::progress::{new, with_color, with_position, Position};
//!
//! let doc = Document::new();
//!
//! // Default bar: 2px, red, fixed to the top of the page
//! let bar = new(&doc, &[])?;
//! bar.destroy();
//!
//! // Customized with the option pattern
//! let bar = new(&doc, &[
//!     with_color("#4CAF50"),
//!     with_position(Position::Bottom),
//! ])?;
//! assert_eq!(bar.element().style_value("bottom").as_deref(), Some("0px"));
//! # Ok::<(), toprogress::Error>(())
//! ```
//!
//! # Animation and Control
//!
//! ```rust
//! use toprogress::dom::Document;
//! use toprogress::progress::new;
//!
//! let doc = Document::new();
//! let mut bar = new(&doc, &[])?;
//!
//! // Indeterminate: crawl toward 99% while work of unknown length runs
//! let _crawl = bar.start();
//!
//! // Determinate updates
//! let _cmd = bar.set_progress(25.0);
//! let _cmd = bar.increase(10.0);
//! let _cmd = bar.decrease(5.0);
//! assert_eq!(bar.progress(), 30.0);
//!
//! // Done: run to 100%, fade out, reset to 0% once the fade ends
//! let _reset = bar.finish();
//! assert_eq!(bar.progress(), 100.0);
//! # Ok::<(), toprogress::Error>(())
//! ```

mod model;
mod options;
mod transition;

pub use model::{
    new, Model, ResetMsg, TransitionEndMsg, DEFAULT_START_DURATION, DEFAULT_START_EASING,
    STOP_DURATION,
};
pub use options::{
    with_color, with_duration, with_height, with_id, with_position, with_selector, Options,
    Position, ProgressOption, DEFAULT_COLOR, DEFAULT_DURATION, DEFAULT_HEIGHT, DEFAULT_ID,
    DEFAULT_SELECTOR,
};
pub use transition::{
    opacity_duration, transition_end_event, transition_rule, TransitionProperty, DEFAULT_EASING,
    MAX_OPACITY_DURATION, TRANSITION_PROPERTIES,
};

#[cfg(test)]
mod tests;
