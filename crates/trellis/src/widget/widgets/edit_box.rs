//! Single-line text input.

use std::time::Duration;

use trellis_core::{ErasedSignal, Signal};
use trellis_render::{FixedMetrics, Point, Rect, RenderTarget, char_index_at, text_offset};

use super::{content_rect, draw_frame};
use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::events::{Key, KeyEvent};
use crate::widget::persistence::DataNode;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};

/// How long the caret stays on (and off) while blinking.
pub const CARET_BLINK_INTERVAL: Duration = Duration::from_millis(500);

const PADDING: f32 = 2.0;

/// A single-line text field.
///
/// Text arrives through `text_entered` while the box is focused; editing
/// and caret keys arrive through `key_pressed`. The caret is a character
/// index. Clicking places it using fixed-pitch metrics, which is what the
/// box also draws with when the backend has nothing better.
///
/// # Signals
///
/// - `text_changed`: the text was edited. Carries the new text.
/// - `return_key_pressed`: Enter was pressed. Carries the text.
#[derive(Debug)]
pub struct EditBox {
    text: String,
    caret: usize,
    max_chars: Option<usize>,
    caret_visible: bool,
    blink_elapsed: Duration,
    metrics: FixedMetrics,
    pub text_changed: Signal<String>,
    pub return_key_pressed: Signal<String>,
}

impl Default for EditBox {
    fn default() -> Self {
        Self::new()
    }
}

impl EditBox {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            caret: 0,
            max_chars: None,
            caret_visible: true,
            blink_elapsed: Duration::ZERO,
            metrics: FixedMetrics::default(),
            text_changed: Signal::new(),
            return_key_pressed: Signal::new(),
        }
    }

    /// Set the maximum number of characters using builder pattern.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and move the caret to its end. Emits
    /// `text_changed` if the text differs.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let mut text = text.into();
        if let Some(max) = self.max_chars {
            text = text.chars().take(max).collect();
        }
        self.caret = text.chars().count();
        if text != self.text {
            self.text = text;
            self.text_changed.emit(self.text.clone());
        }
    }

    /// Caret position as a character index.
    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.char_count());
        self.show_caret();
    }

    pub fn is_caret_visible(&self) -> bool {
        self.caret_visible
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, caret: usize) -> usize {
        self.text
            .char_indices()
            .nth(caret)
            .map_or(self.text.len(), |(index, _)| index)
    }

    fn show_caret(&mut self) {
        self.caret_visible = true;
        self.blink_elapsed = Duration::ZERO;
    }

    fn insert(&mut self, ch: char) {
        if self.max_chars.is_some_and(|max| self.char_count() >= max) {
            return;
        }
        let at = self.byte_index(self.caret);
        self.text.insert(at, ch);
        self.caret += 1;
        self.show_caret();
        self.text_changed.emit(self.text.clone());
    }

    /// Remove the character at `caret` (a character index).
    fn delete_at(&mut self, caret: usize) {
        if caret >= self.char_count() {
            return;
        }
        let at = self.byte_index(caret);
        self.text.remove(at);
        self.caret = caret;
        self.show_caret();
        self.text_changed.emit(self.text.clone());
    }
}

impl Widget for EditBox {
    fn type_name(&self) -> &'static str {
        "EditBox"
    }

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        let base = ctx.base();
        let size = base.text_style().size;
        let x = pos.x - base.borders() - PADDING;
        self.caret = char_index_at(&self.metrics, &self.text, size, x);
        self.show_caret();
    }

    fn key_pressed(&mut self, _ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        match event.key {
            Key::Backspace => {
                if self.caret > 0 {
                    self.delete_at(self.caret - 1);
                }
            }
            Key::Delete => self.delete_at(self.caret),
            Key::Left => self.set_caret(self.caret.saturating_sub(1)),
            Key::Right => self.set_caret(self.caret + 1),
            Key::Home => self.set_caret(0),
            Key::End => self.set_caret(self.char_count()),
            Key::Enter => self.return_key_pressed.emit(self.text.clone()),
            _ => return false,
        }
        true
    }

    fn text_entered(&mut self, _ctx: &mut EventContext<'_>, ch: char) {
        if !ch.is_control() {
            self.insert(ch);
        }
    }

    fn focus_changed(&mut self, _ctx: &mut EventContext<'_>, _focused: bool) {
        self.show_caret();
    }

    fn update_time(&mut self, ctx: &mut EventContext<'_>, elapsed: Duration) -> bool {
        if !ctx.base().is_focused() {
            return false;
        }
        self.blink_elapsed += elapsed;
        if self.blink_elapsed < CARET_BLINK_INTERVAL {
            return false;
        }
        self.blink_elapsed = Duration::ZERO;
        self.caret_visible = !self.caret_visible;
        true
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        let background = base.state_color(
            RendererProperty::BackgroundColor,
            RendererProperty::BackgroundColorHover,
            RendererProperty::BackgroundColorDisabled,
        );
        draw_frame(base, target, background);

        let content = content_rect(base);
        let style = base.text_style();
        let origin = Point::new(content.left() + PADDING, content.top());
        target.draw_text(&self.text, origin, &style);

        if base.is_focused() && self.caret_visible {
            let x = origin.x + text_offset(&self.metrics, &self.text, style.size, self.caret);
            target.fill_rect(
                Rect::new(x, content.top(), 1.0, content.height()),
                base.color(RendererProperty::CaretColor),
            );
        }
    }

    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        if name.eq_ignore_ascii_case("TextChanged") {
            Some(&self.text_changed)
        } else if name.eq_ignore_ascii_case("ReturnKeyPressed") {
            Some(&self.return_key_pressed)
        } else {
            None
        }
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &["TextChanged", "ReturnKeyPressed"]
    }

    fn save(&self, node: &mut DataNode) {
        node.set_property("Text", &self.text);
        if let Some(max) = self.max_chars {
            node.set_property("MaximumCharacters", max);
        }
    }

    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        self.max_chars = node.parse_property("MaximumCharacters")?;
        if let Some(text) = node.property("Text") {
            self.text = text.to_string();
            self.caret = self.char_count();
        }
        Ok(())
    }
}
