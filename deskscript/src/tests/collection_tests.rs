use super::{init_tracing, notepad_desktop, MockNode, MockProvider};
use crate::errors::AutomationError;
use crate::{Bounds, Desktop};
use std::sync::Arc;

/// A dialog whose buttons sit directly under the window, the shape
/// find-by-name queries were written against.
fn dialog_desktop() -> (Desktop, Arc<MockProvider>) {
    let dialog = MockNode::window("Save Changes?").with_children(vec![
        MockNode::new("Cancel", "Button"),
        MockNode::new("OK", "Button"),
        MockNode::new("Apply", "Button"),
    ]);
    let provider = Arc::new(MockProvider::new(vec![dialog]));
    (Desktop::with_provider(provider.clone()), provider)
}

#[test]
fn windows_enumerates_top_level_names() {
    init_tracing();
    let (desktop, _) = notepad_desktop();
    let windows = desktop.windows().unwrap();
    assert_eq!(windows.names(), vec!["Notepad"]);
    assert_eq!(windows.roles(), vec!["Window"]);
}

#[test]
fn value_mirrors_name() {
    let (desktop, _) = notepad_desktop();
    let window = desktop.windows().unwrap().first().unwrap();
    assert_eq!(window.value(), window.name());
}

#[test]
fn dead_members_are_dropped_at_construction() {
    let provider = Arc::new(MockProvider::new(vec![
        MockNode::window("Alive"),
        MockNode::window("Gone").dead(),
    ]));
    let desktop = Desktop::with_provider(provider);
    assert_eq!(desktop.windows().unwrap().names(), vec!["Alive"]);
}

#[test]
fn filter_preserves_order() {
    let provider = Arc::new(MockProvider::new(vec![
        MockNode::window("A"),
        MockNode::window("B"),
        MockNode::window("C"),
        MockNode::window("D"),
    ]));
    let desktop = Desktop::with_provider(provider);
    let filtered = desktop.windows().unwrap().filter(|e| e.name() != "B");
    assert_eq!(filtered.names(), vec!["A", "C", "D"]);
}

#[test]
fn filter_by_name_accepts_any_of_the_names() {
    let (desktop, _) = dialog_desktop();
    let buttons = desktop.windows().unwrap().children().unwrap();
    let narrowed = buttons.filter_by_name(&["OK", "Cancel"]);
    assert_eq!(narrowed.names(), vec!["Cancel", "OK"]);
}

#[test]
fn include_children_is_shallow_and_self_first() {
    let (desktop, _) = notepad_desktop();
    let widened = desktop.windows().unwrap().include_children().unwrap();
    // the window first, then its pane; the pane's own children stay out
    assert_eq!(widened.roles(), vec!["Window", "Pane"]);
}

#[test]
fn include_children_deduplicates_by_handle_identity() {
    let (desktop, _) = notepad_desktop();
    let once = desktop.windows().unwrap().include_children().unwrap();
    // the pane is already a member, so widening again must not repeat it
    let twice = once.include_children().unwrap();
    assert_eq!(
        twice.roles(),
        vec!["Window", "Pane", "Button", "Label", "Label"]
    );
}

#[test]
fn find_by_name_keeps_request_order_and_skips_misses() {
    let (desktop, _) = dialog_desktop();
    let found = desktop
        .windows()
        .unwrap()
        .find_by_name(&["Cancel", "Help", "OK"])
        .unwrap();
    assert_eq!(found.names(), vec!["Cancel", "OK"]);
}

#[test]
fn find_and_click_clicks_found_and_returns_original_membership() {
    let (desktop, provider) = dialog_desktop();
    let windows = desktop.windows().unwrap();
    let unchanged = windows.find_and_click(&["OK"]).unwrap();
    assert_eq!(unchanged.names(), windows.names());
    assert_eq!(provider.logged("click:OK"), 1);
    assert_eq!(provider.logged("click:Cancel"), 0);
}

#[test]
fn get_beyond_bounds_is_an_index_error() {
    let (desktop, _) = notepad_desktop();
    let windows = desktop.windows().unwrap();
    assert!(windows.get(0).is_ok());
    let err = windows.get(5).unwrap_err();
    assert!(matches!(err, AutomationError::IndexOutOfRange(_)));
}

#[test]
fn first_last_and_counts() {
    let (desktop, _) = dialog_desktop();
    let buttons = desktop.windows().unwrap().children().unwrap();
    assert_eq!(buttons.first().unwrap().name(), "Cancel");
    assert_eq!(buttons.last().unwrap().name(), "Apply");
    assert_eq!(
        buttons.first_where(|e| e.name() != "Cancel").unwrap().name(),
        "OK"
    );
    assert_eq!(buttons.count(), 3);
    assert_eq!(buttons.count_where(|e| e.name().len() == 2), 1);
    assert!(buttons.filter(|_| false).first().is_none());
}

#[test]
fn children_flatten_in_member_order() {
    let provider = Arc::new(MockProvider::new(vec![
        MockNode::window("One").with_children(vec![MockNode::new("A", "Button")]),
        MockNode::window("Two").with_children(vec![MockNode::new("B", "Button")]),
    ]));
    let desktop = Desktop::with_provider(provider);
    let children = desktop.windows().unwrap().children().unwrap();
    assert_eq!(children.names(), vec!["A", "B"]);
}

#[test]
fn labels_and_buttons_look_one_level_down() {
    let (desktop, _) = notepad_desktop();
    let panes = desktop.windows().unwrap().children().unwrap();
    assert_eq!(panes.buttons().unwrap().names(), vec!["OK"]);
    assert_eq!(
        panes.labels().unwrap().names(),
        vec!["Ready", "Ln 1, Col 1"]
    );
    assert_eq!(
        panes.labels_by_name(&["Ready"]).unwrap().names(),
        vec!["Ready"]
    );
}

#[test]
fn clicking_a_named_button_through_the_tree() {
    init_tracing();
    let (desktop, provider) = notepad_desktop();
    let ok = desktop
        .windows()
        .unwrap()
        .children()
        .unwrap()
        .buttons_by_name(&["OK"])
        .unwrap();
    assert_eq!(ok.count(), 1);
    ok.click().unwrap();
    assert_eq!(provider.logged("click:OK"), 1);
}

#[test]
fn bulk_click_stops_at_the_first_failure() {
    let provider = Arc::new(MockProvider::new(vec![MockNode::window("W").with_children(
        vec![
            MockNode::new("A", "Button"),
            MockNode::new("B", "Button").failing(),
            MockNode::new("C", "Button"),
        ],
    )]));
    let desktop = Desktop::with_provider(provider.clone());
    let buttons = desktop.windows().unwrap().children().unwrap();
    let err = buttons.click().unwrap_err();
    assert!(matches!(err, AutomationError::PlatformError(_)));
    assert_eq!(provider.logged("click:A"), 1);
    assert_eq!(provider.logged("click:C"), 0);
}

#[test]
fn window_state_ops_on_non_windows_are_swallowed() {
    let (desktop, provider) = notepad_desktop();
    let panes = desktop.windows().unwrap().children().unwrap();
    // the pane cannot close, but the chain stays intact and nothing runs
    let unchanged = panes.close().minimize().maximize().restore();
    assert_eq!(unchanged.count(), panes.count());
    assert!(provider.log().is_empty());
}

#[test]
fn window_state_ops_reach_real_windows() {
    let (desktop, provider) = notepad_desktop();
    desktop.windows().unwrap().maximize().restore().close();
    assert_eq!(
        provider.log(),
        vec!["maximize:Notepad", "restore:Notepad", "close:Notepad"]
    );
}

#[test]
fn show_desktop_minimizes_every_window() {
    let provider = Arc::new(MockProvider::new(vec![
        MockNode::window("One"),
        MockNode::window("Two"),
    ]));
    let desktop = Desktop::with_provider(provider.clone());
    desktop.show_desktop().unwrap();
    assert_eq!(provider.log(), vec!["minimize:One", "minimize:Two"]);
}

#[test]
fn collections_can_reach_back_to_the_desktop() {
    let (desktop, _) = notepad_desktop();
    let roundtrip = desktop
        .windows()
        .unwrap()
        .children()
        .unwrap()
        .desktop()
        .windows()
        .unwrap();
    assert_eq!(roundtrip.names(), vec!["Notepad"]);
}

#[test]
fn set_value_applies_to_every_member() {
    let (desktop, provider) = dialog_desktop();
    desktop
        .windows()
        .unwrap()
        .children()
        .unwrap()
        .filter_by_name(&["OK"])
        .set_value("pressed")
        .unwrap();
    assert_eq!(provider.logged("value=pressed:OK"), 1);
}

#[test]
fn visibility_projection_reflects_the_provider() {
    let provider = Arc::new(MockProvider::new(vec![
        MockNode::window("Shown"),
        MockNode::window("Hidden").hidden(),
    ]));
    let desktop = Desktop::with_provider(provider);
    assert_eq!(desktop.windows().unwrap().visible().unwrap(), vec![true, false]);
}

#[test]
fn run_delegates_to_the_provider() {
    let (desktop, provider) = notepad_desktop();
    desktop.run("notepad.exe").unwrap();
    assert_eq!(provider.logged("launch:notepad.exe"), 1);
}

#[test]
fn bounds_serialize_round_trip() {
    let bounds = Bounds {
        x: 10.0,
        y: 20.0,
        width: 300.0,
        height: 200.0,
    };
    let json = serde_json::to_string(&bounds).unwrap();
    let back: Bounds = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bounds);
}
