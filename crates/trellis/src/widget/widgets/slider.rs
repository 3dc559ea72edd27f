//! Slider widget.
//!
//! A horizontal slider when it is wider than tall, vertical otherwise. The
//! minimum is at the left (or bottom).

use trellis_core::{ErasedSignal, Signal};
use trellis_render::{Point, Rect, RenderTarget};

use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::events::{Key, KeyEvent};
use crate::widget::persistence::DataNode;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};

const THUMB_THICKNESS: f32 = 10.0;

/// A value picked by dragging a thumb along a track.
///
/// The slider is draggable: once pressed it keeps following the mouse even
/// outside its bounds until the button is released.
///
/// # Signals
///
/// - `value_changed`: the value changed. Carries the new value.
#[derive(Debug)]
pub struct Slider {
    minimum: f32,
    maximum: f32,
    value: f32,
    step: f32,
    pub value_changed: Signal<f32>,
}

impl Slider {
    /// A slider over `minimum..=maximum` with step 1, starting at the
    /// minimum.
    pub fn new(minimum: f32, maximum: f32) -> Self {
        let (minimum, maximum) = if minimum <= maximum {
            (minimum, maximum)
        } else {
            (maximum, minimum)
        };
        Self {
            minimum,
            maximum,
            value: minimum,
            step: 1.0,
            value_changed: Signal::new(),
        }
    }

    /// Set the step size using builder pattern. A step of 0 means
    /// continuous values.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step.max(0.0);
        self
    }

    pub fn minimum(&self) -> f32 {
        self.minimum
    }

    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Clamp to the range, snap to the step and emit `value_changed` if the
    /// value moved.
    pub fn set_value(&mut self, value: f32) {
        let mut value = value.clamp(self.minimum, self.maximum);
        if self.step > 0.0 {
            value = self.minimum + ((value - self.minimum) / self.step).round() * self.step;
            value = value.min(self.maximum);
        }
        if value != self.value {
            self.value = value;
            self.value_changed.emit(value);
        }
    }

    /// Change the range, keeping the value inside it.
    pub fn set_range(&mut self, minimum: f32, maximum: f32) {
        self.minimum = minimum.min(maximum);
        self.maximum = maximum.max(minimum);
        self.set_value(self.value);
    }

    fn ratio(&self) -> f32 {
        let span = self.maximum - self.minimum;
        if span > 0.0 { (self.value - self.minimum) / span } else { 0.0 }
    }

    fn value_at(&self, base: &WidgetBase, pos: Point) -> f32 {
        let size = base.size();
        let ratio = if size.width >= size.height {
            if size.width > 0.0 { pos.x / size.width } else { 0.0 }
        } else if size.height > 0.0 {
            1.0 - pos.y / size.height
        } else {
            0.0
        };
        self.minimum + ratio.clamp(0.0, 1.0) * (self.maximum - self.minimum)
    }

    fn nudge(&mut self, steps: f32) {
        let step = if self.step > 0.0 {
            self.step
        } else {
            (self.maximum - self.minimum) / 100.0
        };
        self.set_value(self.value + steps * step);
    }
}

impl Widget for Slider {
    fn type_name(&self) -> &'static str {
        "Slider"
    }

    fn is_draggable(&self) -> bool {
        true
    }

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        let value = self.value_at(ctx.base(), pos);
        self.set_value(value);
    }

    fn mouse_moved(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        if ctx.base().is_mouse_down() {
            let value = self.value_at(ctx.base(), pos);
            self.set_value(value);
        }
    }

    fn mouse_wheel_scrolled(&mut self, _ctx: &mut EventContext<'_>, delta: f32, _pos: Point) -> bool {
        let before = self.value;
        self.nudge(delta);
        self.value != before
    }

    fn key_pressed(&mut self, _ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        match event.key {
            Key::Left | Key::Down => self.nudge(-1.0),
            Key::Right | Key::Up => self.nudge(1.0),
            Key::Home => self.set_value(self.minimum),
            Key::End => self.set_value(self.maximum),
            _ => return false,
        }
        true
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        let size = base.size();
        let border = base.color(RendererProperty::BorderColor);
        let borders = base.borders();
        let track = base.local_bounds();
        target.fill_rect(track, base.color(RendererProperty::TrackColor));
        if borders > 0.0 {
            target.stroke_rect(track, border, borders);
        }

        let thumb = if size.width >= size.height {
            let x = self.ratio() * (size.width - THUMB_THICKNESS).max(0.0);
            Rect::new(x, 0.0, THUMB_THICKNESS.min(size.width), size.height)
        } else {
            let y = (1.0 - self.ratio()) * (size.height - THUMB_THICKNESS).max(0.0);
            Rect::new(0.0, y, size.width, THUMB_THICKNESS.min(size.height))
        };
        target.fill_rect(thumb, base.color(RendererProperty::ThumbColor));
        if borders > 0.0 {
            target.stroke_rect(thumb, border, borders);
        }
    }

    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        name.eq_ignore_ascii_case("ValueChanged")
            .then_some(&self.value_changed as &dyn ErasedSignal)
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &["ValueChanged"]
    }

    fn save(&self, node: &mut DataNode) {
        node.set_property("Minimum", self.minimum);
        node.set_property("Maximum", self.maximum);
        node.set_property("Step", self.step);
        node.set_property("Value", self.value);
    }

    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        let minimum = node.parse_property("Minimum")?.unwrap_or(self.minimum);
        let maximum = node.parse_property("Maximum")?.unwrap_or(self.maximum);
        self.step = node.parse_property::<f32>("Step")?.unwrap_or(self.step).max(0.0);
        self.set_range(minimum, maximum);
        if let Some(value) = node.parse_property("Value")? {
            self.set_value(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::widget::tree::WidgetTree;
    use crate::widget::widgets::Panel;

    #[test]
    fn test_set_value_clamps_and_snaps() {
        let mut slider = Slider::new(0.0, 10.0).with_step(2.0);
        slider.set_value(4.9);
        assert_eq!(slider.value(), 4.0);
        slider.set_value(25.0);
        assert_eq!(slider.value(), 10.0);
        slider.set_value(-3.0);
        assert_eq!(slider.value(), 0.0);
    }

    #[test]
    fn test_drag_continues_outside_bounds() {
        let mut tree = WidgetTree::new();
        let panel = tree.insert(Panel::new());
        let slider = tree.insert(Slider::new(0.0, 10.0));
        tree.set_size(panel, (400.0, 100.0)).unwrap();
        tree.add(panel, slider, "slider").unwrap();
        tree.set_size(slider, (100.0, 20.0)).unwrap();

        let values = Arc::new(Mutex::new(Vec::new()));
        let log = values.clone();
        tree.get::<Slider>(slider)
            .unwrap()
            .value_changed
            .connect(move |value| log.lock().push(*value));

        tree.left_mouse_pressed(panel, Point::new(50.0, 10.0));
        // Far to the right of the slider, still dragging.
        tree.mouse_moved(panel, Point::new(300.0, 60.0));
        tree.process_mouse_release(panel, Point::new(300.0, 60.0));
        tree.mouse_moved(panel, Point::new(20.0, 10.0));

        assert_eq!(*values.lock(), vec![5.0, 10.0]);
    }

    #[test]
    fn test_keys_and_wheel() {
        let mut tree = WidgetTree::new();
        let slider = tree.insert(Slider::new(0.0, 5.0));
        assert!(tree.key_pressed(slider, &KeyEvent::new(Key::Right)));
        assert!(tree.mouse_wheel_scrolled(slider, 2.0, Point::ZERO));
        assert_eq!(tree.get::<Slider>(slider).unwrap().value(), 3.0);
        assert!(tree.key_pressed(slider, &KeyEvent::new(Key::End)));
        assert!(!tree.mouse_wheel_scrolled(slider, 1.0, Point::ZERO));
    }
}
