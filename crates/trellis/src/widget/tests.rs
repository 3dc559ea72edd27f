//! Tests for the widget tree as a whole: hierarchy, hover and focus
//! bookkeeping, layout propagation and persistence.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::SignalError;
use trellis_render::{Point, RecordingTarget, Size};

use super::widgets::{Button, ComboBox, Label, ListBox, Panel, Popup};
use super::{DataNode, Layout2d, WidgetId, WidgetTree};
use crate::error::{GuiError, LayoutError};

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Record `entry` in `log` every time the named signal fires.
fn record(tree: &WidgetTree, id: WidgetId, signal: &str, log: &Log, entry: &str) {
    let log = log.clone();
    let entry = entry.to_string();
    tree.connect(id, signal, move || log.lock().push(entry.clone()))
        .unwrap();
}

/// A 400x300 panel holding buttons `a` at (0, 0) and `b` at (60, 0), both
/// 50x30.
fn panel_with_two_buttons() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
    let mut tree = WidgetTree::new();
    let panel = tree.insert(Panel::new());
    let a = tree.insert(Button::new("A"));
    let b = tree.insert(Button::new("B"));
    tree.set_size(panel, (400.0, 300.0)).unwrap();
    tree.add(panel, a, "a").unwrap();
    tree.add(panel, b, "b").unwrap();
    tree.set_size(a, (50.0, 30.0)).unwrap();
    tree.set_size(b, (50.0, 30.0)).unwrap();
    tree.set_position(b, (60.0, 0.0)).unwrap();
    (tree, panel, a, b)
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn test_add_then_lookup() {
    let (tree, panel, a, b) = panel_with_two_buttons();
    assert_eq!(tree.get_child(panel, "a"), Some(a));
    assert_eq!(tree.parent(a), Some(panel));
    assert_eq!(tree.children(panel), vec![a, b]);
    assert_eq!(tree.widget_name(b), "b");
    assert_eq!(tree.get_child(panel, "missing"), None);
}

#[test]
fn test_remove_detaches_once() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    assert!(tree.remove(a));
    assert_eq!(tree.widget_name(a), "");
    assert_eq!(tree.parent(a), None);
    assert!(!tree.remove(a));
    assert!(tree.contains(a));
    assert_eq!(tree.get_child(panel, "a"), None);
}

#[test]
fn test_add_rejects_invalid_targets() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    assert_eq!(tree.add(a, panel, "x"), Err(GuiError::NotAContainer(a)));

    let inner = tree.insert(Panel::new());
    tree.add(panel, inner, "inner").unwrap();
    assert!(matches!(
        tree.add(inner, panel, "loop"),
        Err(GuiError::WouldCreateCycle { .. })
    ));
}

#[test]
fn test_get_recursive_prefers_direct_children() {
    let mut tree = WidgetTree::new();
    let outer = tree.insert(Panel::new());
    let inner = tree.insert(Panel::new());
    let deep = tree.insert(Label::new("deep"));
    let shallow = tree.insert(Label::new("shallow"));
    tree.add(outer, inner, "inner").unwrap();
    tree.add(inner, deep, "label").unwrap();
    assert_eq!(tree.get_recursive(outer, "label"), Some(deep));

    tree.add(outer, shallow, "label").unwrap();
    assert_eq!(tree.get_recursive(outer, "label"), Some(shallow));
}

#[test]
fn test_child_order_changes() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    assert!(tree.move_to_back(b));
    assert_eq!(tree.children(panel), vec![b, a]);
    assert!(tree.move_to_front(b));
    assert_eq!(tree.child_index(b), Some(1));
    assert!(tree.set_child_index(b, 0));
    assert!(!tree.set_child_index(b, 2));
    assert_eq!(tree.children(panel), vec![b, a]);
}

// =============================================================================
// Hover and focus
// =============================================================================

#[test]
fn test_hover_leaves_before_entering() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    let log = new_log();
    record(&tree, a, "MouseEntered", &log, "enter a");
    record(&tree, a, "MouseLeft", &log, "leave a");
    record(&tree, b, "MouseEntered", &log, "enter b");

    tree.mouse_moved(panel, Point::new(10.0, 10.0));
    tree.mouse_moved(panel, Point::new(20.0, 10.0));
    tree.mouse_moved(panel, Point::new(70.0, 10.0));

    assert_eq!(*log.lock(), vec!["enter a", "leave a", "enter b"]);
    assert_eq!(tree.widget_below_mouse(panel), Some(b));
}

#[test]
fn test_click_moves_focus_between_siblings() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    let log = new_log();
    record(&tree, a, "Focused", &log, "a focused");
    record(&tree, a, "Unfocused", &log, "a unfocused");
    record(&tree, b, "Focused", &log, "b focused");

    tree.left_mouse_pressed(panel, Point::new(10.0, 10.0));
    tree.process_mouse_release(panel, Point::new(10.0, 10.0));
    tree.left_mouse_pressed(panel, Point::new(70.0, 10.0));

    assert_eq!(*log.lock(), vec!["a focused", "a unfocused", "b focused"]);
    assert_eq!(tree.focused_child(panel), Some(b));
    assert!(!tree.is_focused(a));
    assert!(tree.is_focused(panel));
}

#[test]
fn test_click_on_background_focuses_container() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    tree.left_mouse_pressed(panel, Point::new(10.0, 10.0));
    tree.left_mouse_pressed(panel, Point::new(300.0, 200.0));
    assert!(!tree.is_focused(a));
    assert_eq!(tree.focused_child(panel), None);
    assert!(tree.is_focused(panel));
}

#[test]
fn test_disabled_widget_blocks_press() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    tree.set_position(b, (0.0, 0.0)).unwrap();
    tree.set_enabled(b, false);

    tree.left_mouse_pressed(panel, Point::new(10.0, 10.0));
    assert!(!tree.is_focused(a));
    assert!(!tree.is_focused(b));
    assert!(!tree.base(a).unwrap().is_mouse_down());
}

#[test]
fn test_disabling_hovered_widget_leaves_it() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    let log = new_log();
    record(&tree, a, "MouseLeft", &log, "leave a");
    tree.mouse_moved(panel, Point::new(10.0, 10.0));
    assert_eq!(tree.widget_below_mouse(panel), Some(a));

    tree.set_enabled(a, false);
    assert_eq!(*log.lock(), vec!["leave a"]);
    assert!(!tree.base(a).unwrap().is_mouse_hover());
    assert_eq!(tree.widget_below_mouse(panel), None);

    // Enabling again does not bring the hover back on its own.
    tree.set_enabled(a, true);
    assert_eq!(tree.widget_below_mouse(panel), None);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_hidden_focused_widget_loses_focus() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    tree.set_focused(a, true);
    assert_eq!(tree.focused_child(panel), Some(a));
    tree.set_visible(a, false);
    assert!(!tree.is_focused(a));
    assert_eq!(tree.focused_child(panel), None);

    // Hidden widgets refuse focus.
    tree.set_focused(a, true);
    assert!(!tree.is_focused(a));
}

#[test]
fn test_set_visible_emits_on_change_only() {
    let (mut tree, _, a, _) = panel_with_two_buttons();
    let log = new_log();
    record(&tree, a, "VisibilityChanged", &log, "visibility");

    tree.set_visible(a, true);
    tree.set_visible(a, true);
    assert!(log.lock().is_empty());

    tree.set_visible(a, false);
    tree.set_visible(a, true);
    tree.set_visible(a, true);
    assert_eq!(log.lock().len(), 2);
}

#[test]
fn test_labels_never_take_focus() {
    let mut tree = WidgetTree::new();
    let panel = tree.insert(Panel::new());
    let label = tree.insert(Label::new("Name:"));
    let button = tree.insert(Button::new("OK"));
    tree.add(panel, label, "label").unwrap();
    tree.add(panel, button, "button").unwrap();

    tree.set_focused(label, true);
    assert!(!tree.is_focused(label));
    assert!(tree.focus_next_widget(panel));
    assert!(tree.is_focused(button));
}

#[test]
fn test_isolated_popup_keeps_focus_inside() {
    let mut tree = WidgetTree::new();
    let panel = tree.insert(Panel::new());
    let popup = tree.insert(Popup::new());
    let after = tree.insert(Button::new("after"));
    tree.add(panel, popup, "popup").unwrap();
    tree.add(panel, after, "after").unwrap();
    let items: Vec<WidgetId> = ["one", "two", "three"]
        .into_iter()
        .map(|text| {
            let item = tree.insert(Button::new(text));
            tree.add(popup, item, text).unwrap();
            item
        })
        .collect();

    tree.set_focused(items[0], true);
    let mut visited = Vec::new();
    for _ in 0..6 {
        assert!(tree.focus_next_widget(panel));
        visited.push(items.iter().position(|item| tree.is_focused(*item)).unwrap());
        assert!(!tree.is_focused(after));
    }
    assert_eq!(visited, vec![1, 2, 0, 1, 2, 0]);

    assert!(tree.focus_previous_widget(panel));
    assert!(tree.is_focused(items[2]));
}

#[test]
fn test_isolated_popup_reports_failure() {
    let mut tree = WidgetTree::new();
    let panel = tree.insert(Panel::new());
    let popup = tree.insert(Popup::new());
    let only = tree.insert(Button::new("only"));
    let after = tree.insert(Button::new("after"));
    tree.add(panel, popup, "popup").unwrap();
    tree.add(panel, after, "after").unwrap();
    tree.add(popup, only, "only").unwrap();

    tree.set_focused(only, true);
    assert!(!tree.focus_next_widget(panel));
    assert!(tree.is_focused(only));
    assert!(!tree.is_focused(after));
}

#[test]
fn test_focus_leaves_non_isolated_container() {
    let mut tree = WidgetTree::new();
    let window = tree.insert(Panel::new());
    let group = tree.insert(Panel::new());
    let inner = tree.insert(Button::new("inner"));
    let after = tree.insert(Button::new("after"));
    tree.add(window, group, "group").unwrap();
    tree.add(window, after, "after").unwrap();
    tree.add(group, inner, "inner").unwrap();

    tree.set_focused(inner, true);
    assert!(tree.focus_next_widget(window));
    assert!(tree.is_focused(after));
    assert!(!tree.is_focused(inner));
    assert!(!tree.is_focused(group));
}

#[test]
fn test_removing_hovered_widget_clears_hover() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    tree.mouse_moved(panel, Point::new(10.0, 10.0));
    assert_eq!(tree.widget_below_mouse(panel), Some(a));

    assert!(tree.remove(a));
    assert_eq!(tree.widget_below_mouse(panel), None);
    assert!(!tree.base(a).unwrap().is_mouse_hover());

    tree.mouse_moved(panel, Point::new(12.0, 10.0));
    assert_eq!(tree.widget_below_mouse(panel), None);
}

#[test]
fn test_destroying_focused_widget() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    tree.left_mouse_pressed(panel, Point::new(10.0, 10.0));
    assert!(tree.destroy(a));
    assert!(!tree.contains(a));
    assert_eq!(tree.focused_child(panel), None);
    assert_eq!(tree.children(panel), vec![b]);
    assert!(!tree.destroy(a));

    // Dispatch never reaches the destroyed handle.
    assert!(!tree.key_pressed(panel, &super::KeyEvent::new(super::Key::Space)));
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_ratio_follows_parent_resize() {
    let mut tree = WidgetTree::new();
    let parent = tree.insert(Panel::new());
    let child = tree.insert(Button::new("half"));
    tree.add(parent, child, "child").unwrap();
    tree.set_size(child, Layout2d::parse("(50%, 20)").unwrap()).unwrap();

    let sizes = Arc::new(Mutex::new(Vec::new()));
    let log = sizes.clone();
    tree.base(child)
        .unwrap()
        .signals()
        .size_changed
        .connect(move |size| log.lock().push(*size));

    tree.set_size(parent, (200.0, 100.0)).unwrap();
    assert_eq!(tree.size(child), Size::new(100.0, 20.0));

    // Re-setting an equal size is not a change.
    tree.set_size(parent, (200.0, 100.0)).unwrap();
    assert_eq!(*sizes.lock(), vec![Size::new(100.0, 20.0)]);
}

#[test]
fn test_sibling_binding_propagates() {
    let mut tree = WidgetTree::new();
    let panel = tree.insert(Panel::new());
    let first = tree.insert(Button::new("first"));
    let second = tree.insert(Button::new("second"));
    tree.add(panel, first, "first").unwrap();
    tree.add(panel, second, "second").unwrap();
    tree.set_position(first, (5.0, 5.0)).unwrap();
    tree.set_size(first, (50.0, 20.0)).unwrap();

    let position = Layout2d::parse("(first.right + 10, first.top)").unwrap();
    tree.set_position(second, position).unwrap();
    assert_eq!(tree.position(second), Point::new(65.0, 5.0));

    tree.set_size(first, (80.0, 20.0)).unwrap();
    assert_eq!(tree.position(second), Point::new(95.0, 5.0));

    // A destroyed source leaves the dependent where it was.
    tree.destroy(first);
    assert_eq!(tree.position(second), Point::new(95.0, 5.0));
}

#[test]
fn test_borders_change_updates_child_layouts() {
    let mut tree = WidgetTree::new();
    let panel = tree.insert(Panel::new());
    let fill = tree.insert(Button::new("Fill"));
    let footer = tree.insert(Button::new("Footer"));
    tree.set_size(panel, (200.0, 100.0)).unwrap();
    tree.add(panel, fill, "fill").unwrap();
    tree.add(panel, footer, "footer").unwrap();
    tree.set_size(fill, Layout2d::parse("(50%, 20)").unwrap()).unwrap();
    tree.set_position(footer, Layout2d::parse("(0, &.h - 20)").unwrap())
        .unwrap();
    assert_eq!(tree.size(fill), Size::new(100.0, 20.0));
    assert_eq!(tree.position(footer), Point::new(0.0, 80.0));

    let log = new_log();
    record(&tree, panel, "SizeChanged", &log, "panel");
    record(&tree, fill, "SizeChanged", &log, "fill");
    tree.set_renderer(
        panel,
        super::RendererData::new().with(super::RendererProperty::Borders, 11.0),
    );

    assert_eq!(tree.inner_size(panel), Size::new(178.0, 78.0));
    assert_eq!(tree.size(fill), Size::new(89.0, 20.0));
    assert_eq!(tree.position(footer), Point::new(0.0, 58.0));
    // The panel's own size did not change.
    assert_eq!(*log.lock(), vec!["fill"]);
}

#[test]
fn test_unknown_sibling_is_an_error() {
    let (mut tree, _, a, _) = panel_with_two_buttons();
    let layout = Layout2d::parse("(nobody.left, 0)").unwrap();
    assert_eq!(
        tree.set_position(a, layout),
        Err(GuiError::Layout(LayoutError::UnknownWidget("nobody".into())))
    );
}

#[test]
fn test_binding_cycle_is_rejected() {
    let (mut tree, _, a, b) = panel_with_two_buttons();
    tree.set_position(a, Layout2d::parse("(b.right, 0)").unwrap()).unwrap();
    let result = tree.set_position(b, Layout2d::parse("(a.right, 0)").unwrap());
    assert!(matches!(
        result,
        Err(GuiError::Layout(LayoutError::Cycle { widget, .. })) if widget == b
    ));
    // The rejected layout was not kept.
    assert_eq!(tree.position(b), Point::new(60.0, 0.0));
}

// =============================================================================
// Signals
// =============================================================================

#[test]
fn test_signal_lookup_by_name() {
    let (tree, _, a, _) = panel_with_two_buttons();
    assert!(tree.signal(a, "pressed").is_ok());
    assert!(tree.signal(a, "SizeChanged").is_ok());
    assert_eq!(
        tree.connect(a, "Clicked", || {}).unwrap_err(),
        GuiError::Signal(SignalError::UnknownSignal {
            name: "Clicked".into(),
            type_name: "Button".into(),
        })
    );
}

#[test]
fn test_disconnect_by_id() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    let log = new_log();
    let sink = log.clone();
    let id = tree
        .connect(a, "Pressed", move || sink.lock().push("pressed".into()))
        .unwrap();

    tree.left_mouse_pressed(panel, Point::new(10.0, 10.0));
    tree.process_mouse_release(panel, Point::new(10.0, 10.0));
    assert!(tree.disconnect(a, id));
    assert!(!tree.disconnect(a, id));
    tree.left_mouse_pressed(panel, Point::new(10.0, 10.0));
    tree.process_mouse_release(panel, Point::new(10.0, 10.0));

    assert_eq!(log.lock().len(), 1);
}

// =============================================================================
// Overlays and tooltips
// =============================================================================

#[test]
fn test_combo_box_dropdown() {
    let mut tree = WidgetTree::new();
    let root = tree.insert(Panel::new());
    tree.set_size(root, (400.0, 300.0)).unwrap();
    let combo = ComboBox::create(&mut tree);
    tree.add(root, combo, "combo").unwrap();
    tree.set_position(combo, (10.0, 10.0)).unwrap();
    tree.set_size(combo, (100.0, 20.0)).unwrap();

    let (popup, list) = {
        let combo_box = tree.get_mut::<ComboBox>(combo).unwrap();
        for item in ["a", "b", "c"] {
            combo_box.add_item(item);
        }
        (combo_box.popup(), combo_box.list())
    };
    let log = new_log();
    let sink = log.clone();
    tree.get::<ComboBox>(combo)
        .unwrap()
        .item_selected
        .connect(move |(index, text)| sink.lock().push(format!("{index}:{text}")));

    // Opening reparents the popup into the root and places the list below
    // the combo box.
    tree.left_mouse_pressed(root, Point::new(20.0, 15.0));
    tree.process_mouse_release(root, Point::new(20.0, 15.0));
    tree.process_requests();
    assert!(tree.get::<ComboBox>(combo).unwrap().is_open());
    assert_eq!(tree.parent(popup), Some(root));
    assert_eq!(tree.size(popup), Size::new(400.0, 300.0));
    assert_eq!(tree.position(list), Point::new(10.0, 30.0));
    assert_eq!(tree.size(list), Size::new(100.0, 62.0));

    // Picking an item closes the dropdown.
    tree.left_mouse_pressed(root, Point::new(20.0, 55.0));
    tree.process_mouse_release(root, Point::new(20.0, 55.0));
    tree.process_requests();
    assert_eq!(*log.lock(), vec!["1:b"]);
    assert_eq!(tree.get::<ComboBox>(combo).unwrap().selected_index(), Some(1));
    assert_eq!(tree.get::<ListBox>(list).unwrap().selected_index(), Some(1));
    assert!(!tree.get::<ComboBox>(combo).unwrap().is_open());
    assert_eq!(tree.parent(popup), None);

    // A click outside the list dismisses without selecting.
    tree.left_mouse_pressed(root, Point::new(20.0, 15.0));
    tree.process_requests();
    tree.left_mouse_pressed(root, Point::new(300.0, 250.0));
    tree.process_requests();
    assert_eq!(tree.parent(popup), None);
    assert!(!tree.get::<ComboBox>(combo).unwrap().is_open());
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_ask_tool_tip_finds_deepest() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    let panel_tip = tree.insert(Label::new("panel"));
    let a_tip = tree.insert(Label::new("a"));
    tree.set_tool_tip(panel, Some(panel_tip)).unwrap();
    tree.set_tool_tip(a, Some(a_tip)).unwrap();

    assert_eq!(tree.ask_tool_tip(panel, Point::new(10.0, 10.0)), Some(a_tip));
    // `b` has no tooltip of its own.
    assert_eq!(tree.ask_tool_tip(panel, Point::new(70.0, 10.0)), Some(panel_tip));
    assert_eq!(tree.base(a_tip).unwrap().owner(), Some(a));
    assert!(tree.contains(b));

    // The tooltip goes away with its owner.
    tree.destroy(a);
    assert!(!tree.contains(a_tip));
}

#[test]
fn test_disabled_widget_hides_its_tool_tip() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    let panel_tip = tree.insert(Label::new("panel"));
    let a_tip = tree.insert(Label::new("a"));
    tree.set_tool_tip(panel, Some(panel_tip)).unwrap();
    tree.set_tool_tip(a, Some(a_tip)).unwrap();

    tree.set_enabled(a, false);
    assert_eq!(tree.ask_tool_tip(panel, Point::new(10.0, 10.0)), Some(panel_tip));

    // A disabled container hides the tooltips of its enabled children.
    let mut outer = WidgetTree::new();
    let root = outer.insert(Panel::new());
    let inner = outer.insert(Panel::new());
    let button = outer.insert(Button::new("In"));
    let button_tip = outer.insert(Label::new("in"));
    outer.set_size(root, (200.0, 200.0)).unwrap();
    outer.add(root, inner, "inner").unwrap();
    outer.set_size(inner, (100.0, 100.0)).unwrap();
    outer.add(inner, button, "button").unwrap();
    outer.set_size(button, (50.0, 30.0)).unwrap();
    outer.set_tool_tip(button, Some(button_tip)).unwrap();
    assert_eq!(outer.ask_tool_tip(root, Point::new(10.0, 10.0)), Some(button_tip));

    outer.set_enabled(inner, false);
    assert_eq!(outer.ask_tool_tip(root, Point::new(10.0, 10.0)), None);
}

// =============================================================================
// Drawing
// =============================================================================

#[test]
fn test_draw_skips_hidden_widgets() {
    let (mut tree, panel, _, b) = panel_with_two_buttons();
    tree.set_visible(b, false);

    let mut target = RecordingTarget::new();
    tree.draw(panel, &mut target);
    assert_eq!(target.texts(), vec!["A"]);
    assert_eq!(target.depth(), 0);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_save_load_round_trip() {
    let (mut tree, panel, a, b) = panel_with_two_buttons();
    tree.set_position(a, (5.0, 7.0)).unwrap();
    tree.set_visible(a, false);
    tree.set_enabled(b, false);
    tree.set_size(b, Layout2d::parse("(a.width * 2, 30)").unwrap()).unwrap();

    let saved = tree.save(panel).unwrap();
    let json = serde_json::to_string_pretty(&saved).unwrap();
    let restored: DataNode = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, saved);

    let copy = tree.load(&restored).unwrap();
    let children = tree.children(copy);
    assert_eq!(children.len(), 2);
    let (a2, b2) = (children[0], children[1]);

    assert_eq!(tree.widget_name(a2), "a");
    assert_eq!(tree.widget_name(b2), "b");
    assert_eq!(tree.get::<Button>(a2).unwrap().text(), "A");
    assert!(!tree.is_visible(a2));
    assert!(tree.is_enabled(a2));
    assert!(!tree.is_enabled(b2));
    assert_eq!(tree.position(a2), Point::new(5.0, 7.0));
    assert_eq!(tree.size(b2), Size::new(100.0, 30.0));
    assert_eq!(tree.size(copy), Size::new(400.0, 300.0));

    // The copy's binding follows the copy, not the original.
    tree.set_size(a2, (20.0, 30.0)).unwrap();
    assert_eq!(tree.size(b2), Size::new(40.0, 30.0));
    assert_eq!(tree.size(b), Size::new(100.0, 30.0));
}

#[test]
fn test_load_unknown_type_cleans_up() {
    let mut tree = WidgetTree::new();
    let mut data = DataNode::new("Panel").with_property("Size", "(10, 10)");
    data.children.push(DataNode::new("Button").with_property("Name", "ok"));
    data.children.push(DataNode::new("Knob"));

    let before = tree.len();
    assert_eq!(
        tree.load(&data),
        Err(GuiError::UnknownWidgetType("Knob".into()))
    );
    assert_eq!(tree.len(), before);
}

#[test]
fn test_duplicate_combo_box_keeps_items() {
    let mut tree = WidgetTree::new();
    let combo = ComboBox::create(&mut tree);
    {
        let combo_box = tree.get_mut::<ComboBox>(combo).unwrap();
        combo_box.add_item("x, \"quoted\"");
        combo_box.add_item("y");
        combo_box.set_selected_index(Some(1));
    }

    let copy = tree.duplicate(combo).unwrap();
    let combo_box = tree.get::<ComboBox>(copy).unwrap();
    assert_eq!(combo_box.items(), vec!["x, \"quoted\"".to_string(), "y".to_string()]);
    assert_eq!(combo_box.selected_item().as_deref(), Some("y"));
    assert_ne!(combo_box.popup(), tree.get::<ComboBox>(combo).unwrap().popup());
}

#[test]
fn test_custom_renderer_is_saved() {
    let (mut tree, panel, a, _) = panel_with_two_buttons();
    let renderer = super::RendererData::new()
        .with(super::RendererProperty::Borders, 3.0)
        .with(super::RendererProperty::TextColor, trellis_render::Color::rgb(255, 0, 0));
    tree.set_renderer(a, renderer);

    let saved = tree.save(panel).unwrap();
    let copy = tree.load(&saved).unwrap();
    let a2 = tree.get_child(copy, "a").unwrap();
    assert_eq!(tree.base(a2).unwrap().borders(), 3.0);

    // Widgets without a custom renderer keep sharing the theme section.
    let b2 = tree.get_child(copy, "b").unwrap();
    assert!(tree.renderer(b2).unwrap().ptr_eq(tree.theme().section("Button").unwrap()));
}
