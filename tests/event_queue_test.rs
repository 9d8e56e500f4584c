//! Tests for the FIFO event queue driving the schema browser

mod common;

use common::{Harness, Shown, BASE_URL};
use schema_inspector::application::services::ViewOutcome;
use schema_inspector::application::{ApplicationError, BrowserEvent, EventOutcome, EventQueue};
use schema_inspector::domain::{Click, DomainError, ElementRole};

#[test]
fn given_queued_events_when_run_then_handled_in_order() {
    // Arrange
    let h = Harness::new(&["a", "b"]);
    let mut browser = h.default_browser();
    browser.restore().unwrap();
    let mut queue = EventQueue::new();
    queue.push(BrowserEvent::SelectSchema("b".into()));
    queue.push(BrowserEvent::FormatChanged(1));
    queue.push(BrowserEvent::SelectSchema("a".into()));
    queue.push(BrowserEvent::Download("a".into()));

    // Act
    let outcomes = queue.run(&mut browser).into_result().unwrap();

    // Assert
    assert!(queue.is_empty());
    assert_eq!(outcomes.len(), 4);
    assert!(matches!(
        &outcomes[0],
        EventOutcome::Viewed(ViewOutcome::SpecViewerLoaded { schema_id, .. }) if schema_id == "b"
    ));
    assert!(matches!(
        &outcomes[1],
        EventOutcome::Viewed(ViewOutcome::FrameNavigated { schema_id, .. }) if schema_id == "b"
    ));
    assert!(matches!(
        &outcomes[2],
        EventOutcome::Viewed(ViewOutcome::FrameNavigated { schema_id, .. }) if schema_id == "a"
    ));
    assert!(matches!(&outcomes[3], EventOutcome::Downloaded(p) if p.ends_with("a.html")));

    assert_eq!(
        h.display.shown()[1..],
        [
            Shown::Url(format!("{BASE_URL}/schemas/b?download=false&format=HTML")),
            Shown::Url(format!("{BASE_URL}/schemas/a?download=false&format=HTML")),
        ]
    );
}

#[test]
fn given_failing_event_when_run_then_keeps_earlier_outcomes_and_later_events() {
    let h = Harness::new(&["a"]);
    let mut browser = h.default_browser();
    browser.restore().unwrap();
    let mut queue = EventQueue::new();
    queue.push(BrowserEvent::Toggle("schemas".into()));
    queue.push(BrowserEvent::SelectSchema("missing".into()));
    queue.push(BrowserEvent::DownloadAll);

    let run = queue.run(&mut browser);

    assert_eq!(
        run.outcomes,
        vec![EventOutcome::Toggled {
            id: Some("schemas".into()),
            expanded: false
        }]
    );
    assert!(matches!(
        run.error,
        Some(ApplicationError::Domain(DomainError::UnknownSchema(_)))
    ));
    assert_eq!(queue.len(), 1);
    assert!(h.navigator.paths().is_empty());
}

#[test]
fn given_toggle_event_when_handled_then_reports_new_state() {
    let h = Harness::new(&["a"]);
    let mut browser = h.default_browser();
    browser.restore().unwrap();

    let outcome = browser
        .handle(BrowserEvent::Toggle("schemas".into()))
        .unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Toggled {
            id: Some("schemas".into()),
            expanded: false
        }
    );
}

#[test]
fn given_raw_clicks_when_handled_then_routed_by_element_role() {
    let h = Harness::new(&["a", "b"]);
    let mut browser = h.default_browser();
    browser.restore().unwrap();
    let b = browser.widget().tree().find_by_id("schemas/b").unwrap();

    let face = browser
        .handle(BrowserEvent::Click(Click::new(ElementRole::Face, b)))
        .unwrap();
    let label = browser
        .handle(BrowserEvent::Click(Click::from_tag("tree-label", b)))
        .unwrap();

    assert_eq!(face, EventOutcome::Nothing);
    assert!(matches!(label, EventOutcome::Viewed(_)));
    assert_eq!(browser.active_schema().as_deref(), Some("b"));
}

#[test]
fn given_unknown_node_when_toggled_then_unknown_node_error() {
    let h = Harness::new(&["a"]);
    let mut browser = h.default_browser();
    browser.restore().unwrap();

    let result = browser.handle(BrowserEvent::Toggle("nope".into()));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::UnknownNode(ref id))) if id == "nope"
    ));
}
