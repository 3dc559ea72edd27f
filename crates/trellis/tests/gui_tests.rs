//! End-to-end tests driving a [`Gui`] with raw window events.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis::prelude::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trellis=debug")
        .with_test_writer()
        .try_init();
}

fn click(gui: &mut Gui, x: f32, y: f32) {
    let position = Point::new(x, y);
    gui.handle_event(Event::MouseButtonPressed {
        button: MouseButton::Left,
        position,
    });
    gui.handle_event(Event::MouseButtonReleased {
        button: MouseButton::Left,
        position,
    });
}

fn key(gui: &mut Gui, key: Key) -> bool {
    gui.handle_event(Event::KeyPressed(KeyEvent::new(key)))
}

fn type_text(gui: &mut Gui, text: &str) {
    for ch in text.chars() {
        gui.handle_event(Event::TextEntered(ch));
    }
}

struct Form {
    window: WidgetId,
    user: WidgetId,
    ok: WidgetId,
}

/// A child window at (100, 100) holding an edit box and a button.
fn build_form(gui: &mut Gui) -> Form {
    let tree = gui.tree_mut();
    let window = tree.insert(ChildWindow::new("Login"));
    let user = tree.insert(EditBox::new());
    let ok = tree.insert(Button::new("OK"));
    tree.add(window, user, "user").unwrap();
    tree.add(window, ok, "ok").unwrap();
    tree.set_position(user, (10.0, 10.0)).unwrap();
    tree.set_size(user, (200.0, 24.0)).unwrap();
    tree.set_position(ok, Layout2d::parse("(user.left, user.bottom + 16)").unwrap())
        .unwrap();
    tree.set_size(ok, (80.0, 24.0)).unwrap();

    gui.add(window, "login").unwrap();
    let tree = gui.tree_mut();
    tree.set_position(window, (100.0, 100.0)).unwrap();
    tree.set_size(window, (300.0, 200.0)).unwrap();
    Form { window, user, ok }
}

#[test]
fn test_form_interaction() {
    init_logging();
    let mut gui = Gui::new(Size::new(800.0, 600.0));
    let form = build_form(&mut gui);

    let pressed = Arc::new(Mutex::new(0));
    let counter = pressed.clone();
    gui.tree()
        .connect(form.ok, "Pressed", move || *counter.lock() += 1)
        .unwrap();

    // The window's child area starts at (101, 121): borders 1, title bar 20.
    click(&mut gui, 131.0, 141.0);
    assert!(gui.tree().is_focused(form.user));
    assert!(gui.tree().is_focused(form.window));
    type_text(&mut gui, "bob");
    assert_eq!(gui.tree().get::<EditBox>(form.user).unwrap().text(), "bob");

    // Tab moves to the button, Space presses it.
    assert!(key(&mut gui, Key::Tab));
    assert!(gui.tree().is_focused(form.ok));
    assert!(key(&mut gui, Key::Space));
    assert_eq!(*pressed.lock(), 1);

    // The child window keeps Tab inside itself.
    assert!(key(&mut gui, Key::Tab));
    assert!(gui.tree().is_focused(form.user));

    // A click on the button presses it too.
    assert_eq!(gui.tree().position(form.ok), Point::new(10.0, 50.0));
    click(&mut gui, 121.0, 181.0);
    assert_eq!(*pressed.lock(), 2);
}

#[test]
fn test_dragging_window_moves_children() {
    init_logging();
    let mut gui = Gui::new(Size::new(800.0, 600.0));
    let form = build_form(&mut gui);

    let position = |x, y| Point::new(x, y);
    gui.handle_event(Event::MouseButtonPressed {
        button: MouseButton::Left,
        position: position(150.0, 110.0),
    });
    gui.handle_event(Event::MouseMoved {
        position: position(250.0, 160.0),
    });
    gui.handle_event(Event::MouseButtonReleased {
        button: MouseButton::Left,
        position: position(250.0, 160.0),
    });

    assert_eq!(gui.tree().position(form.window), Point::new(200.0, 150.0));
    assert_eq!(
        gui.tree().absolute_position(form.user),
        Point::new(211.0, 181.0)
    );
}

#[test]
fn test_save_and_load_through_json() {
    init_logging();
    let mut gui = Gui::new(Size::new(800.0, 600.0));
    let form = build_form(&mut gui);
    gui.tree_mut()
        .get_mut::<EditBox>(form.user)
        .unwrap()
        .set_text("alice");

    let combo = ComboBox::create(gui.tree_mut());
    {
        let combo_box = gui.tree_mut().get_mut::<ComboBox>(combo).unwrap();
        combo_box.add_item("Light");
        combo_box.add_item("Dark");
        combo_box.set_selected_index(Some(1));
    }
    gui.add(combo, "theme").unwrap();
    gui.tree_mut()
        .set_position(combo, Layout2d::parse("(login.right + 10, login.top)").unwrap())
        .unwrap();

    let json = serde_json::to_string(&gui.save().unwrap()).unwrap();
    let data: DataNode = serde_json::from_str(&json).unwrap();

    let mut restored = Gui::new(Size::new(800.0, 600.0));
    restored.load(&data).unwrap();

    let window = restored.get("login").unwrap();
    let user = restored.get("user").unwrap();
    let ok = restored.get("ok").unwrap();
    let combo = restored.get("theme").unwrap();
    let tree = restored.tree();

    assert_eq!(tree.parent(window), Some(restored.root()));
    assert_eq!(tree.children(restored.root()), vec![window, combo]);
    assert_eq!(tree.get::<ChildWindow>(window).unwrap().title(), "Login");
    assert_eq!(tree.get::<EditBox>(user).unwrap().text(), "alice");
    assert_eq!(tree.position(ok), Point::new(10.0, 50.0));
    assert_eq!(tree.position(window), Point::new(100.0, 100.0));
    assert_eq!(tree.position(combo), Point::new(410.0, 100.0));

    let combo_box = tree.get::<ComboBox>(combo).unwrap();
    assert_eq!(combo_box.items(), vec!["Light".to_string(), "Dark".to_string()]);
    assert_eq!(combo_box.selected_item().as_deref(), Some("Dark"));
}

#[test]
fn test_combo_box_through_events() {
    init_logging();
    let mut gui = Gui::new(Size::new(400.0, 300.0));
    let combo = ComboBox::create(gui.tree_mut());
    gui.add(combo, "combo").unwrap();
    {
        let tree = gui.tree_mut();
        tree.set_position(combo, (10.0, 10.0)).unwrap();
        tree.set_size(combo, (120.0, 20.0)).unwrap();
        let combo_box = tree.get_mut::<ComboBox>(combo).unwrap();
        for item in ["a", "b", "c"] {
            combo_box.add_item(item);
        }
    }

    click(&mut gui, 20.0, 15.0);
    assert!(gui.tree().get::<ComboBox>(combo).unwrap().is_open());

    click(&mut gui, 20.0, 55.0);
    let combo_box = gui.tree().get::<ComboBox>(combo).unwrap();
    assert!(!combo_box.is_open());
    assert_eq!(combo_box.selected_item().as_deref(), Some("b"));
    assert_eq!(gui.tree().parent(combo_box.popup()), None);

    // Escape closes an open dropdown.
    click(&mut gui, 20.0, 15.0);
    assert!(gui.tree().get::<ComboBox>(combo).unwrap().is_open());
    assert!(key(&mut gui, Key::Escape));
    assert!(!gui.tree().get::<ComboBox>(combo).unwrap().is_open());
}

#[test]
fn test_scaled_view() {
    init_logging();
    let mut gui = Gui::new(Size::new(800.0, 600.0));
    gui.set_view(Rect::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(gui.tree().size(gui.root()), Size::new(400.0, 300.0));

    let button = gui.tree_mut().insert(Button::new("Scaled"));
    gui.add(button, "button").unwrap();
    gui.tree_mut().set_position(button, (100.0, 100.0)).unwrap();
    gui.tree_mut().set_size(button, (50.0, 20.0)).unwrap();

    let pressed = Arc::new(Mutex::new(0));
    let counter = pressed.clone();
    gui.tree()
        .connect(button, "Pressed", move || *counter.lock() += 1)
        .unwrap();

    // Window pixels are twice the view units.
    assert_eq!(gui.map_pixel_to_view(Point::new(250.0, 210.0)), Point::new(125.0, 105.0));
    click(&mut gui, 150.0, 150.0);
    assert_eq!(*pressed.lock(), 0);
    click(&mut gui, 250.0, 210.0);
    assert_eq!(*pressed.lock(), 1);
}

#[test]
fn test_draw_records_visible_widgets() {
    init_logging();
    let mut gui = Gui::new(Size::new(800.0, 600.0));
    let form = build_form(&mut gui);
    let hint = gui.tree_mut().insert(Label::new("hidden hint"));
    gui.add(hint, "hint").unwrap();
    gui.tree_mut().set_visible(hint, false);

    let mut target = trellis::render::RecordingTarget::new();
    gui.draw(&mut target);
    let texts = target.texts();
    assert!(texts.contains(&"Login"));
    assert!(texts.contains(&"OK"));
    assert!(!texts.contains(&"hidden hint"));
    assert_eq!(target.depth(), 0);
    assert!(gui.tree().contains(form.window));
}
