//! Overlay container.

use trellis_core::logging::targets;
use trellis_core::{ErasedSignal, Signal};
use trellis_render::{Point, RenderTarget};

use crate::widget::base::WidgetBase;
use crate::widget::events::{Key, KeyEvent};
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};

/// A container shown over the whole root, e.g. the dropdown of a
/// [`ComboBox`](super::ComboBox).
///
/// The popup itself is transparent and covers everything, so a click that
/// misses its children lands on the popup. That click, or Escape, hides it.
/// Tab cycling stays inside the popup.
///
/// # Signals
///
/// - `closed`: the popup dismissed itself.
#[derive(Debug, Default)]
pub struct Popup {
    pub closed: Signal<()>,
}

impl Popup {
    pub fn new() -> Self {
        Self::default()
    }

    fn dismiss(&self, ctx: &EventContext<'_>) {
        tracing::debug!(target: targets::GUI, popup = ?ctx.id(), "popup dismissed");
        ctx.hide_overlay(ctx.id());
        self.closed.emit(());
    }
}

impl Widget for Popup {
    fn type_name(&self) -> &'static str {
        "Popup"
    }

    fn is_container(&self) -> bool {
        true
    }

    fn isolated_focus_group(&self) -> bool {
        true
    }

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, _pos: Point) {
        self.dismiss(ctx);
    }

    fn right_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, _pos: Point) {
        self.dismiss(ctx);
    }

    fn key_pressed(&mut self, ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        if event.key == Key::Escape {
            self.dismiss(ctx);
            return true;
        }
        false
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        let background = base.color(RendererProperty::BackgroundColor);
        if background.a > 0 {
            target.fill_rect(base.local_bounds(), background);
        }
    }

    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        name.eq_ignore_ascii_case("Closed")
            .then_some(&self.closed as &dyn ErasedSignal)
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &["Closed"]
    }
}
