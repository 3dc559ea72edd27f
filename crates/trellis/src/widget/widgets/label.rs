//! Text display widget.

use trellis_render::{FixedMetrics, Point, RenderTarget, Size, measure_text};

use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::persistence::DataNode;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::Widget;

/// A read-only line of text. Labels never take focus.
#[derive(Debug, Clone, Default)]
pub struct Label {
    text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Size the text needs at `text_size` with fixed-pitch metrics.
    pub fn text_bounds(&self, text_size: f32) -> Size {
        measure_text(&FixedMetrics::default(), &self.text, text_size)
    }
}

impl Widget for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn can_gain_focus(&self) -> bool {
        false
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        let background = base.color(RendererProperty::BackgroundColor);
        if background.a > 0 {
            target.fill_rect(base.local_bounds(), background);
        }
        let padding = base.borders();
        target.draw_text(&self.text, Point::new(padding, padding), &base.text_style());
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
