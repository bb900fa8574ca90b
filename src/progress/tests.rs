use super::*;
use crate::dom::{Document, Element, Event};
use crate::Error;
use bubbletea_rs::{Cmd, Msg};
use proptest::prelude::*;
use std::time::Duration;

fn bar(doc: &Document) -> Model {
    new(doc, &[]).expect("body exists")
}

fn style(el: &Element, property: &str) -> Option<String> {
    el.style_value(property)
}

fn end(bar: &Model, property: &str) {
    bar.element().dispatch_event(&Event::transition_end(property));
}

fn container(doc: &Document, with_child: bool) -> Element {
    let container = doc.create_element("div");
    container.set_id("container");
    if with_child {
        container.append_child(&doc.create_element("div"));
    }
    doc.body().append_child(&container);
    container
}

async fn pending(cmd: Cmd) -> bool {
    tokio::time::timeout(Duration::from_millis(20), cmd)
        .await
        .is_err()
}

fn transition_end_msg(msg: Option<Msg>) -> TransitionEndMsg {
    let msg = msg.expect("wait resolved");
    *msg.downcast_ref::<TransitionEndMsg>().expect("TransitionEndMsg")
}

fn reset_msg(msg: Option<Msg>) -> ResetMsg {
    let msg = msg.expect("wait resolved");
    *msg.downcast_ref::<ResetMsg>().expect("ResetMsg")
}

// options

#[test]
fn test_id_defaults_to_toprogress() {
    let doc = Document::new();
    let bar = bar(&doc);
    assert_eq!(doc.get_element_by_id("toprogress").as_ref(), Some(bar.element()));
}

#[test]
fn test_sets_element_id() {
    let doc = Document::new();
    let _bar = new(&doc, &[with_id("progressbar")]).expect("body exists");
    assert!(doc.get_element_by_id("progressbar").is_some());
    assert!(doc.get_element_by_id("toprogress").is_none());
}

#[test]
fn test_selector_defaults_to_body() {
    let doc = Document::new();
    let existing = doc.create_element("main");
    doc.body().append_child(&existing);

    let bar = bar(&doc);

    assert_eq!(doc.body().first_child().as_ref(), Some(bar.element()));
    assert_eq!(doc.body().children().len(), 2);
}

#[test]
fn test_missing_container_fails_without_mutation() {
    let doc = Document::new();
    let before = doc.outer_html();

    let err = new(&doc, &[with_selector("dne")]).expect_err("no such container");

    assert_eq!(
        err,
        Error::ContainerNotFound {
            selector: "dne".to_string()
        }
    );
    assert_eq!(doc.outer_html(), before);
}

#[test]
fn test_unparseable_selector_is_not_found() {
    let doc = Document::new();
    let result = new(&doc, &[with_selector("body > div")]);
    assert!(matches!(result, Err(Error::ContainerNotFound { .. })));
}

#[test]
fn test_inserts_into_empty_container() {
    let doc = Document::new();
    let container = container(&doc, false);

    let bar = new(&doc, &[with_selector("#container")]).expect("container exists");

    assert_eq!(container.first_child().as_ref(), Some(bar.element()));
    assert_eq!(container.children().len(), 1);
}

#[test]
fn test_inserts_before_existing_children() {
    let doc = Document::new();
    let container = container(&doc, true);

    let bar = new(&doc, &[with_selector("#container")]).expect("container exists");

    assert_eq!(container.first_child().as_ref(), Some(bar.element()));
    assert_eq!(container.children().len(), 2);
}

#[test]
fn test_custom_container_uses_relative_positioning() {
    let doc = Document::new();
    container(&doc, true);

    let bar = new(&doc, &[with_selector("#container")]).expect("container exists");
    let el = bar.element();

    assert_eq!(style(el, "position").as_deref(), Some("relative"));
    assert_eq!(style(el, "top").as_deref(), Some("0px"));
    assert_eq!(style(el, "bottom"), None);
}

#[test]
fn test_body_selected_by_other_selector_is_fixed() {
    let doc = Document::new();
    let bar = new(&doc, &[with_selector("*")]).expect("html matches");
    // `*` matches <html> first, which is not the body
    assert_eq!(style(bar.element(), "position").as_deref(), Some("relative"));

    doc.body().add_class("page");
    let bar = new(&doc, &[with_selector(".page")]).expect("body matches");
    assert_eq!(style(bar.element(), "position").as_deref(), Some("fixed"));
}

#[test]
fn test_color() {
    let doc = Document::new();
    let bar = bar(&doc);
    assert_eq!(style(bar.element(), "background-color").as_deref(), Some("#F44336"));
    assert_eq!(
        style(bar.element(), "box-shadow").as_deref(),
        Some("0px 1px 2px 0px #F44336")
    );

    let bar = new(&doc, &[with_color("#FFF")]).expect("body exists");
    assert_eq!(style(bar.element(), "background-color").as_deref(), Some("#FFF"));
}

#[test]
fn test_height() {
    let doc = Document::new();
    assert_eq!(style(bar(&doc).element(), "height").as_deref(), Some("2px"));

    let bar = new(&doc, &[with_height("5px")]).expect("body exists");
    assert_eq!(style(bar.element(), "height").as_deref(), Some("5px"));
}

#[test]
fn test_duration_defaults() {
    let doc = Document::new();
    let bar = bar(&doc);
    let transition = style(bar.element(), "transition").expect("transition set");
    assert!(transition.contains("width 0.2s ease-out"));
    assert!(transition.contains("opacity 0.6"));
}

#[test]
fn test_duration_sets_all_vendor_rules() {
    let doc = Document::new();
    let bar = new(&doc, &[with_duration(5.0)]).expect("body exists");
    let expected = "width 5s ease-out, opacity 1s";

    for property in TRANSITION_PROPERTIES {
        assert_eq!(style(bar.element(), property).as_deref(), Some(expected));
    }
}

#[test]
fn test_position_defaults_to_top() {
    let doc = Document::new();
    let bar = bar(&doc);
    let el = bar.element();
    assert_eq!(style(el, "position").as_deref(), Some("fixed"));
    assert_eq!(style(el, "top").as_deref(), Some("0px"));
    assert_eq!(style(el, "bottom"), None);
    assert_eq!(style(el, "left").as_deref(), Some("0px"));
    assert_eq!(style(el, "right").as_deref(), Some("0px"));
}

#[test]
fn test_position_bottom() {
    let doc = Document::new();
    let bar = new(&doc, &[with_position(Position::Bottom)]).expect("body exists");
    let el = bar.element();
    assert_eq!(style(el, "position").as_deref(), Some("fixed"));
    assert_eq!(style(el, "top"), None);
    assert_eq!(style(el, "bottom").as_deref(), Some("0px"));
}

#[test]
fn test_with_options_from_config() {
    let doc = Document::new();
    let options: Options =
        serde_json::from_str(r#"{"id": "loader", "height": "4px"}"#).expect("valid json");

    let bar = Model::with_options(&doc, options).expect("body exists");

    assert_eq!(bar.options().id, "loader");
    assert_eq!(bar.options().color, DEFAULT_COLOR);
    assert_eq!(style(bar.element(), "height").as_deref(), Some("4px"));
}

// initialization

#[test]
fn test_initial_state() {
    let doc = Document::new();
    let bar = bar(&doc);
    assert_eq!(bar.progress(), 0.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("0%"));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
    assert_eq!(bar.transition_end_event(), "transitionend");
}

#[test]
fn test_unique_ids() {
    let doc = Document::new();
    let a = bar(&doc);
    let b = new(&doc, &[with_id("other")]).expect("body exists");
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_view_renders_element() {
    let doc = Document::new();
    let bar = bar(&doc);
    let html = bar.view();
    assert!(html.starts_with("<div id=\"toprogress\" style=\"position: fixed; top: 0px;"));
    assert!(html.contains("width: 0%;"));
    assert!(html.ends_with("></div>"));
}

// set_progress / increase / decrease

#[test]
fn test_set_progress_sets_width() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    drop(bar.set_progress(50.0));
    assert_eq!(style(bar.element(), "width").as_deref(), Some("50%"));
    assert_eq!(bar.progress(), 50.0);
}

#[test]
fn test_set_progress_clamps() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    drop(bar.set_progress(110.0));
    assert_eq!(bar.progress(), 100.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("100%"));

    drop(bar.set_progress(-5.0));
    assert_eq!(bar.progress(), 0.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("0%"));

    drop(bar.set_progress(f64::NAN));
    assert_eq!(bar.progress(), 0.0);

    drop(bar.set_progress(-0.0));
    assert_eq!(style(bar.element(), "width").as_deref(), Some("0%"));
}

#[test]
fn test_set_progress_keeps_fractions() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    drop(bar.set_progress(12.5));
    assert_eq!(style(bar.element(), "width").as_deref(), Some("12.5%"));
}

#[test]
fn test_set_progress_shows_bar() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    bar.hide();
    drop(bar.set_progress(10.0));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_set_progress_resolves_after_width_transition() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    let cmd = bar.set_progress(10.0);

    end(&bar, "width");

    let msg = transition_end_msg(cmd.await);
    assert_eq!(msg.id, bar.id());
    assert_eq!(msg.property, TransitionProperty::Width);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("10%"));
    assert_eq!(bar.element().listener_count(), 0);
}

#[tokio::test]
async fn test_set_progress_ignores_opacity_transition() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    let cmd = bar.set_progress(10.0);

    end(&bar, "opacity");

    assert!(pending(cmd).await);
}

#[tokio::test]
async fn test_overlapping_waits_resolve_independently() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    let first = bar.set_progress(10.0);
    let second = bar.set_progress(20.0);

    end(&bar, "width");

    assert!(first.await.is_some());
    assert!(second.await.is_some());
    assert_eq!(bar.progress(), 20.0);
}

#[test]
fn test_increase_decrease() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    drop(bar.increase(10.0));
    assert_eq!(bar.progress(), 10.0);

    drop(bar.decrease(5.0));
    assert_eq!(bar.progress(), 5.0);

    drop(bar.decrease(50.0));
    assert_eq!(bar.progress(), 0.0);

    drop(bar.increase(250.0));
    assert_eq!(bar.progress(), 100.0);
}

#[tokio::test]
async fn test_increase_resolves_like_set_progress() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    let cmd = bar.increase(15.0);

    end(&bar, "width");

    assert_eq!(transition_end_msg(cmd.await).property, TransitionProperty::Width);
}

// show / hide

#[test]
fn test_hide_show_toggle_opacity() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    bar.hide();
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("0"));

    bar.show();
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
}

// start / stop

#[test]
fn test_start_crawls_to_99() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    bar.hide();

    drop(bar.start());

    assert_eq!(bar.progress(), 99.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("99%"));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
    assert_eq!(
        style(bar.element(), "transition").as_deref(),
        Some("width 30s cubic-bezier(0.05, 0.45, 0.05, 0.95), opacity 1s")
    );
}

#[test]
fn test_repeated_start_flips_width() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    drop(bar.start());
    assert_eq!(style(bar.element(), "width").as_deref(), Some("99%"));
    drop(bar.start());
    assert_eq!(style(bar.element(), "width").as_deref(), Some("98%"));
    drop(bar.start());
    assert_eq!(style(bar.element(), "width").as_deref(), Some("99%"));
}

#[test]
fn test_start_with_custom_timing() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    drop(bar.start_with(5.0, "linear"));

    assert_eq!(
        style(bar.element(), "transition").as_deref(),
        Some("width 5s linear, opacity 1s")
    );
}

#[test]
fn test_stop_freezes_and_steps_back() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    drop(bar.start());

    bar.stop();

    assert_eq!(bar.progress(), 98.0);
    assert_eq!(
        style(bar.element(), "transition").as_deref(),
        Some("width 100000000000s ease-out, opacity 1s")
    );

    drop(bar.start());
    assert_eq!(bar.progress(), 99.0);
}

#[test]
fn test_stop_leaves_opacity_alone() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    drop(bar.start());
    bar.hide();

    bar.stop();

    assert_eq!(bar.progress(), 98.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("98%"));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("0"));
}

#[test]
fn test_stop_at_zero_stays_at_zero() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    bar.stop();
    assert_eq!(bar.progress(), 0.0);
}

// reset / finish

#[tokio::test]
async fn test_reset_shows_after_width_transition() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    drop(bar.start());
    bar.hide();

    let cmd = bar.reset();

    assert_eq!(bar.progress(), 0.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("0%"));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("0"));
    assert!(style(bar.element(), "transition")
        .expect("transition set")
        .starts_with("width 0.2s ease-out"));

    end(&bar, "width");

    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
    assert_eq!(reset_msg(cmd.await).id, bar.id());
}

#[tokio::test]
async fn test_finish_runs_to_full_then_resets() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    drop(bar.start());

    let cmd = bar.finish();

    assert_eq!(bar.progress(), 100.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("100%"));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("0"));
    assert!(style(bar.element(), "transition")
        .expect("transition set")
        .starts_with("width 0.2s ease-out"));

    // width settles first; nothing resets until the fade-out ends
    end(&bar, "width");
    assert_eq!(bar.progress(), 100.0);

    end(&bar, "opacity");
    assert_eq!(bar.progress(), 0.0);
    assert_eq!(style(bar.element(), "width").as_deref(), Some("0%"));
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("0"));

    end(&bar, "width");
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
    assert_eq!(reset_msg(cmd.await).id, bar.id());
}

#[test]
fn test_finish_resets_without_awaiting() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    drop(bar.finish());
    end(&bar, "opacity");
    end(&bar, "width");

    assert_eq!(bar.progress(), 0.0);
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
}

#[test]
fn test_bar_is_reusable_after_finish() {
    let doc = Document::new();
    let mut bar = bar(&doc);

    drop(bar.finish());
    end(&bar, "opacity");
    end(&bar, "width");
    drop(bar.start());

    assert_eq!(bar.progress(), 99.0);
    assert_eq!(style(bar.element(), "opacity").as_deref(), Some("1"));
}

// destroy

#[tokio::test]
async fn test_destroy_removes_element() {
    let doc = Document::new();
    let mut bar = bar(&doc);
    let element = bar.element().clone();
    let pending_width = bar.set_progress(40.0);
    let pending_reset = bar.finish();

    bar.destroy();

    assert!(doc.get_element_by_id("toprogress").is_none());
    assert!(!doc.body().has_child_nodes());
    assert_eq!(element.listener_count(), 0);
    assert!(pending_width.await.is_none());
    assert!(pending_reset.await.is_none());
}

#[test]
fn test_destroy_releases_nodes() {
    let doc = Document::new();
    let baseline = doc.node_count();

    for _ in 0..100 {
        let mut bar = bar(&doc);
        drop(bar.set_progress(50.0));
        drop(bar.finish());
        bar.destroy();
    }

    assert_eq!(doc.node_count(), baseline);
    assert_eq!(doc.outer_html(), "<html><body></body></html>");
}

#[test]
fn test_dropped_widget_does_not_keep_document_alive() {
    let doc = Document::new();
    let weak = doc.body().downgrade();
    {
        let mut bar = bar(&doc);
        drop(bar.finish());
        end(&bar, "opacity");
        // the reset's width listener is still pending here
        drop(bar.reset());
    }
    drop(doc);

    assert!(weak.upgrade().is_none());
}

#[test]
fn test_dropped_widget_mid_finish_does_not_keep_document_alive() {
    let doc = Document::new();
    let weak = doc.body().downgrade();
    {
        let mut bar = bar(&doc);
        drop(bar.finish());
    }
    drop(doc);

    assert!(weak.upgrade().is_none());
}

// hosts and instances

#[tokio::test]
async fn test_vendor_transition_event() {
    let doc = Document::with_vendor_properties(["WebkitTransition"]);
    let mut bar = bar(&doc);
    assert_eq!(bar.transition_end_event(), "webkitTransitionEnd");

    let ignored = bar.set_progress(30.0);
    end(&bar, "width");
    assert!(pending(ignored).await);

    let cmd = bar.set_progress(40.0);
    bar.element()
        .dispatch_event(&Event::new("webkitTransitionEnd").with_property_name("width"));
    assert!(cmd.await.is_some());
}

#[test]
fn test_instances_are_independent() {
    let doc = Document::new();
    container(&doc, false);
    let mut page = bar(&doc);
    let mut panel = new(&doc, &[with_id("panel-bar"), with_selector("#container")])
        .expect("container exists");

    drop(page.set_progress(70.0));
    drop(panel.set_progress(20.0));
    panel.hide();

    assert_eq!(page.progress(), 70.0);
    assert_eq!(panel.progress(), 20.0);
    assert_eq!(style(page.element(), "opacity").as_deref(), Some("1"));
    assert_eq!(style(panel.element(), "opacity").as_deref(), Some("0"));

    panel.destroy();
    assert!(page.element().is_connected());
}

proptest! {
    #[test]
    fn prop_set_progress_clamps(value in -1_000.0f64..1_000.0) {
        let doc = Document::new();
        let mut bar = bar(&doc);
        drop(bar.set_progress(value));
        prop_assert_eq!(bar.progress(), value.clamp(0.0, 100.0));
    }

    #[test]
    fn prop_increase_decrease_clamp(start in 0.0f64..=100.0, delta in -300.0f64..300.0) {
        let doc = Document::new();
        let mut bar = bar(&doc);
        drop(bar.set_progress(start));
        drop(bar.increase(delta));
        prop_assert_eq!(bar.progress(), (start + delta).clamp(0.0, 100.0));

        drop(bar.set_progress(start));
        drop(bar.decrease(delta));
        prop_assert_eq!(bar.progress(), (start - delta).clamp(0.0, 100.0));
    }
}
