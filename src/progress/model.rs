use super::options::{Options, ProgressOption};
use super::transition::{
    on_transition_end, transition_end_event, transition_rule, wait_for, TransitionProperty,
    DEFAULT_EASING, TRANSITION_PROPERTIES,
};
use crate::dom::{Document, Element, WeakElement};
use crate::error::{Error, Result};
use bubbletea_rs::{Cmd, Msg};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

// Internal ID management for progress bar instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Duration hint used by [`Model::start`], in seconds.
pub const DEFAULT_START_DURATION: f64 = 30.0;
/// Easing used by [`Model::start`]; fast at first, crawling near the end.
pub const DEFAULT_START_EASING: &str = "cubic-bezier(0.05, 0.45, 0.05, 0.95)";
/// Transition duration [`Model::stop`] installs to freeze the bar in place.
pub const STOP_DURATION: f64 = 10e10;

/// Sent when a width or opacity transition the widget waited on has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEndMsg {
    /// Id of the widget that issued the wait.
    pub id: i64,
    /// The property whose transition ended.
    pub property: TransitionProperty,
}

/// Sent when a `reset()` (or the reset at the end of `finish()`) has
/// completed and the bar is visible again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetMsg {
    /// Id of the widget that was reset.
    pub id: i64,
}

/// Creates a progress bar in `document` with the given option overrides.
///
/// # Errors
///
/// Returns [`Error::ContainerNotFound`] when the container selector matches
/// nothing. The document is left untouched in that case.
///
/// # Examples
///
/// ```rust
/// use toprogress::dom::Document;
/// use toprogress::progress::{new, with_height, with_selector};
/// use toprogress::Error;
///
/// let doc = Document::new();
/// let bar = new(&doc, &[with_height("5px")])?;
/// assert_eq!(doc.body().first_child().as_ref(), Some(bar.element()));
///
/// let missing = new(&doc, &[with_selector("#nope")]);
/// assert!(matches!(missing, Err(Error::ContainerNotFound { .. })));
/// # Ok::<(), Error>(())
/// ```
pub fn new(document: &Document, opts: &[ProgressOption]) -> Result<Model> {
    let mut options = Options::default();
    for opt in opts {
        opt.apply(&mut options);
    }
    Model::with_options(document, options)
}

/// The state shared between the widget and the transition-end listeners it
/// registers, so chained steps (`finish` → `reset` → `show`) run from the
/// listener without the caller driving them.
#[derive(Debug, Clone)]
struct Bar {
    id: i64,
    element: Element,
    options: Arc<Options>,
    event_type: &'static str,
    progress: Arc<Mutex<f64>>,
}

impl Bar {
    fn progress(&self) -> f64 {
        *self.progress.lock()
    }

    fn write_progress(&self, value: f64) -> f64 {
        let progress = clamp_progress(value);
        *self.progress.lock() = progress;
        self.element.set_style("width", &format!("{}%", progress));
        progress
    }

    fn show(&self) {
        self.element.set_style("opacity", "1");
    }

    fn hide(&self) {
        self.element.set_style("opacity", "0");
    }

    fn set_transition(&self, duration: f64, easing: &str) {
        let rule = transition_rule(duration, easing);
        for property in TRANSITION_PROPERTIES {
            self.element.set_style(property, &rule);
        }
    }

    fn apply_css(&self, fixed: bool) {
        let o = &self.options;
        let el = &self.element;
        el.set_style("position", if fixed { "fixed" } else { "relative" });
        el.set_style(o.position.css_property(), "0px");
        el.set_style("left", "0px");
        el.set_style("right", "0px");
        el.set_style("background-color", &o.color);
        el.set_style("height", &o.height);
        el.set_style("width", "0%");
        el.set_style("opacity", "1");
        el.set_style("box-shadow", &format!("0px 1px 2px 0px {}", o.color));
    }

    fn wait(&self, property: TransitionProperty) -> Cmd {
        let rx = wait_for(&self.element, self.event_type, property);
        let msg = TransitionEndMsg {
            id: self.id,
            property,
        };
        settle(rx, msg)
    }

    /// Zeroes the bar under the default transition and shows it once the
    /// width has shrunk, then signals `done`.
    fn reset(&self, done: oneshot::Sender<()>) {
        self.set_transition(self.options.duration, DEFAULT_EASING);
        self.write_progress(0.0);

        let bar = self.downgrade();
        on_transition_end(
            &self.element,
            self.event_type,
            TransitionProperty::Width,
            move || {
                let Some(bar) = bar.upgrade() else {
                    return;
                };
                bar.show();
                tracing::trace!(id = bar.id, "progress bar reset");
                // nobody may be waiting on the reset
                let _ = done.send(());
            },
        );
    }

    fn downgrade(&self) -> WeakBar {
        WeakBar {
            id: self.id,
            element: self.element.downgrade(),
            options: Arc::clone(&self.options),
            event_type: self.event_type,
            progress: Arc::clone(&self.progress),
        }
    }
}

/// A `Bar` as captured by its own element's listeners. The element is held
/// weakly so the tree never owns a handle to itself.
struct WeakBar {
    id: i64,
    element: WeakElement,
    options: Arc<Options>,
    event_type: &'static str,
    progress: Arc<Mutex<f64>>,
}

impl WeakBar {
    fn upgrade(&self) -> Option<Bar> {
        Some(Bar {
            id: self.id,
            element: self.element.upgrade()?,
            options: Arc::clone(&self.options),
            event_type: self.event_type,
            progress: Arc::clone(&self.progress),
        })
    }
}

/// Clamps to [0, 100]. NaN becomes 0, and so does -0 so the width never
/// renders as `-0%`.
fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let progress = value.clamp(0.0, 100.0);
    if progress == 0.0 {
        0.0
    } else {
        progress
    }
}

fn settle<M>(rx: oneshot::Receiver<()>, msg: M) -> Cmd
where
    M: Send + 'static,
{
    Box::pin(async move { rx.await.ok().map(|()| Box::new(msg) as Msg) })
}

/// A thin progress bar pinned to the edge of a container.
///
/// The bar is a single `<div>` inserted as the first child of its container.
/// All animation is done by CSS transitions: methods write `width`/`opacity`
/// and a `transition` rule, and the host reports completion through
/// transition-end events on the element.
///
/// # Completion commands
///
/// Progress-changing methods return a [`Cmd`] that resolves once the matching
/// transition ends on the element:
///
/// - [`set_progress`](Self::set_progress), [`increase`](Self::increase),
///   [`decrease`](Self::decrease) and [`start`](Self::start) resolve to a
///   [`TransitionEndMsg`] for `width`;
/// - [`reset`](Self::reset) and [`finish`](Self::finish) resolve to a
///   [`ResetMsg`] once the bar is back at 0% and visible.
///
/// Commands may be dropped freely; the visual state change has already been
/// applied, and `finish`'s trailing reset still happens.
///
/// Each wait is independent. A new call does not cancel an older wait, so a
/// wait for a property that never transitions again never resolves. Waits
/// still pending when the widget is destroyed resolve to `None`.
///
/// # Examples
///
/// ```rust
/// use toprogress::dom::{Document, Event};
/// use toprogress::progress::{Model, Options};
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let doc = Document::new();
/// let mut bar = Model::with_options(&doc, Options::default()).expect("body exists");
///
/// let done = bar.set_progress(40.0);
/// assert_eq!(bar.element().style_value("width").as_deref(), Some("40%"));
///
/// // the host reports the end of the width transition
/// bar.element().dispatch_event(&Event::transition_end("width"));
/// assert!(done.await.is_some());
/// # }
/// ```
#[derive(Debug)]
pub struct Model {
    bar: Bar,
}

impl Model {
    /// Creates a progress bar in `document` from a full option record.
    ///
    /// The container is looked up first; when it is missing nothing is created
    /// or modified and [`Error::ContainerNotFound`] is returned.
    pub fn with_options(document: &Document, options: Options) -> Result<Self> {
        let container = document
            .query_selector(&options.selector)
            .ok_or_else(|| Error::container_not_found(&options.selector))?;
        let fixed = container == document.body();

        let element = document.create_element("div");
        element.set_id(&options.id);

        let bar = Bar {
            id: next_id(),
            element,
            event_type: transition_end_event(document),
            options: Arc::new(options),
            progress: Arc::new(Mutex::new(0.0)),
        };
        bar.apply_css(fixed);
        bar.set_transition(bar.options.duration, DEFAULT_EASING);

        match container.first_child() {
            Some(first) => container.insert_before(&bar.element, Some(&first)),
            None => container.append_child(&bar.element),
        }

        tracing::debug!(
            id = bar.id,
            selector = %bar.options.selector,
            fixed,
            event = bar.event_type,
            "progress bar created"
        );
        Ok(Self { bar })
    }

    /// Unique id of this widget, carried by its completion messages.
    pub fn id(&self) -> i64 {
        self.bar.id
    }

    /// The merged configuration.
    pub fn options(&self) -> &Options {
        &self.bar.options
    }

    /// The bar element.
    pub fn element(&self) -> &Element {
        &self.bar.element
    }

    /// The transition-end event name this widget listens for.
    pub fn transition_end_event(&self) -> &'static str {
        self.bar.event_type
    }

    /// Current progress, in [0, 100].
    ///
    /// While `start()` is animating this is the target (98 or 99), not the
    /// position currently on screen.
    pub fn progress(&self) -> f64 {
        self.bar.progress()
    }

    /// Sets progress, clamped to [0, 100], and makes the bar visible.
    ///
    /// The returned command resolves when the width transition ends.
    ///
    /// ```rust
    /// use toprogress::dom::Document;
    /// use toprogress::progress::new;
    ///
    /// let doc = Document::new();
    /// let mut bar = new(&doc, &[])?;
    ///
    /// drop(bar.set_progress(110.0));
    /// assert_eq!(bar.progress(), 100.0);
    ///
    /// drop(bar.set_progress(-5.0));
    /// assert_eq!(bar.progress(), 0.0);
    /// # Ok::<(), toprogress::Error>(())
    /// ```
    pub fn set_progress(&mut self, progress: f64) -> Cmd {
        let progress = self.bar.write_progress(progress);
        self.bar.show();
        tracing::trace!(id = self.bar.id, progress, "set progress");
        self.bar.wait(TransitionProperty::Width)
    }

    /// Adds `amount` to the current progress.
    pub fn increase(&mut self, amount: f64) -> Cmd {
        self.set_progress(self.progress() + amount)
    }

    /// Subtracts `amount` from the current progress.
    pub fn decrease(&mut self, amount: f64) -> Cmd {
        self.set_progress(self.progress() - amount)
    }

    /// Makes the bar fully opaque.
    pub fn show(&mut self) {
        self.bar.show();
    }

    /// Makes the bar fully transparent.
    pub fn hide(&mut self) {
        self.bar.hide();
    }

    /// Starts an indeterminate animation with the default 30 second crawl.
    ///
    /// See [`start_with`](Self::start_with).
    pub fn start(&mut self) -> Cmd {
        self.start_with(DEFAULT_START_DURATION, DEFAULT_START_EASING)
    }

    /// Starts an indeterminate animation.
    ///
    /// The bar is shown and slowly advances toward 99% over `duration`
    /// seconds following `easing`. When progress is already 99 the target is
    /// 98 instead, so that calling `start` again changes the width and the
    /// new transition takes effect.
    ///
    /// The command resolves when the crawl ends, which is usually after a
    /// later [`finish`](Self::finish) has moved the width on.
    pub fn start_with(&mut self, duration: f64, easing: &str) -> Cmd {
        self.bar.show();
        self.bar.set_transition(duration, easing);
        let target = if self.progress() == 99.0 { 98.0 } else { 99.0 };
        self.set_progress(target)
    }

    /// Freezes an animation started with [`start`](Self::start).
    ///
    /// Installs an effectively infinite transition and steps progress back by
    /// one, so the next `start` changes the width and visibly resumes.
    /// Opacity is left as it is.
    pub fn stop(&mut self) {
        self.bar.set_transition(STOP_DURATION, DEFAULT_EASING);
        self.bar.write_progress(self.progress() - 1.0);
    }

    /// Runs the bar to 100%, fades it out, then resets it for reuse.
    ///
    /// The reset happens from the transition-end listener once the fade-out
    /// ends, whether or not the returned command is awaited. The command
    /// resolves to a [`ResetMsg`] after the reset has shown the bar again.
    pub fn finish(&mut self) -> Cmd {
        self.bar
            .set_transition(self.bar.options.duration, DEFAULT_EASING);
        drop(self.set_progress(100.0));
        self.bar.hide();

        let (tx, rx) = oneshot::channel();
        let bar = self.bar.downgrade();
        on_transition_end(
            &self.bar.element,
            self.bar.event_type,
            TransitionProperty::Opacity,
            move || {
                if let Some(bar) = bar.upgrade() {
                    bar.reset(tx);
                }
            },
        );
        settle(rx, ResetMsg { id: self.bar.id })
    }

    /// Sets progress to 0 under the default transition and shows the bar
    /// again once the width transition ends.
    ///
    /// Opacity is left alone until then, so a hidden bar stays hidden while
    /// it shrinks.
    pub fn reset(&mut self) -> Cmd {
        let (tx, rx) = oneshot::channel();
        self.bar.reset(tx);
        settle(rx, ResetMsg { id: self.bar.id })
    }

    /// Renders the bar element as HTML.
    pub fn view(&self) -> String {
        self.bar.element.outer_html()
    }

    /// Removes the bar from its container and releases its element along with
    /// its listeners, leaving the document as it was before construction.
    ///
    /// Pending completion commands resolve to `None`.
    pub fn destroy(self) {
        self.bar.element.dispose();
        tracing::debug!(id = self.bar.id, "progress bar destroyed");
    }
}
