//! Push button widget.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use trellis::widget::WidgetTree;
//! use trellis::widget::widgets::Button;
//!
//! let mut tree = WidgetTree::new();
//! let button = tree.insert(Button::new("OK"));
//!
//! let presses = Arc::new(Mutex::new(Vec::new()));
//! let log = presses.clone();
//! tree.get::<Button>(button)
//!     .unwrap()
//!     .pressed
//!     .connect(move |text| log.lock().push(text.clone()));
//!
//! tree.set_size(button, (80.0, 24.0)).unwrap();
//! tree.left_mouse_pressed(button, (10.0, 10.0).into());
//! tree.process_mouse_release(button, (10.0, 10.0).into());
//! assert_eq!(*presses.lock(), vec!["OK".to_string()]);
//! ```

use trellis_core::{ErasedSignal, Signal};
use trellis_render::{Point, RenderTarget, measure_text};

use super::draw_frame;
use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::events::KeyEvent;
use crate::widget::persistence::DataNode;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};

/// A clickable button.
///
/// # Signals
///
/// - `pressed`: the button was clicked (press and release on it) or
///   activated with Space/Enter while focused. Carries the button text.
#[derive(Debug, Default)]
pub struct Button {
    text: String,
    pub pressed: Signal<String>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pressed: Signal::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn left_mouse_released(&mut self, ctx: &mut EventContext<'_>, _pos: Point) {
        if ctx.base().is_mouse_down() {
            self.pressed.emit(self.text.clone());
        }
    }

    fn key_pressed(&mut self, _ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        if event.key.is_activation() {
            self.pressed.emit(self.text.clone());
            return true;
        }
        false
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        let background = base.state_color(
            RendererProperty::BackgroundColor,
            RendererProperty::BackgroundColorHover,
            RendererProperty::BackgroundColorDisabled,
        );
        draw_frame(base, target, background);

        let style = base.text_style();
        let text_size = measure_text(target.metrics(), &self.text, style.size);
        let size = base.size();
        let position = Point::new(
            (size.width - text_size.width) / 2.0,
            (size.height - text_size.height) / 2.0,
        );
        target.draw_text(&self.text, position, &style);
    }

    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        name.eq_ignore_ascii_case("Pressed").then_some(&self.pressed as &dyn ErasedSignal)
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &["Pressed"]
    }

    fn save(&self, node: &mut DataNode) {
        node.set_property("Text", &self.text);
    }

    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        if let Some(text) = node.property("Text") {
            self.text = text.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::events::Key;
    use crate::widget::tree::WidgetTree;

    #[test]
    fn test_release_without_press_does_not_emit() {
        let mut tree = WidgetTree::new();
        let button = tree.insert(Button::new("OK"));
        tree.set_size(button, (80.0, 24.0)).unwrap();
        let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = count.clone();
        tree.connect(button, "pressed", move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        })
        .unwrap();

        tree.process_mouse_release(button, Point::new(5.0, 5.0));
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 0);

        tree.left_mouse_pressed(button, Point::new(5.0, 5.0));
        tree.process_mouse_release(button, Point::new(5.0, 5.0));
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(!tree.base(button).unwrap().is_mouse_down());
    }

    #[test]
    fn test_space_activates() {
        let mut tree = WidgetTree::new();
        let button = tree.insert(Button::new("Go"));
        assert!(tree.key_pressed(button, &KeyEvent::new(Key::Space)));
        assert!(!tree.key_pressed(button, &KeyEvent::new(Key::A)));
    }

    #[test]
    fn test_draw_centers_text() {
        let mut tree = WidgetTree::new();
        let button = tree.insert(Button::new("abcd"));
        tree.set_size(button, (100.0, 30.0)).unwrap();
        let mut target = trellis_render::RecordingTarget::new();
        tree.draw(button, &mut target);
        assert_eq!(target.texts(), vec!["abcd"]);
    }
}
