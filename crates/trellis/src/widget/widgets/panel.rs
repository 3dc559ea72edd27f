//! Plain container widget.

use trellis_render::{Point, RenderTarget, Size};

use super::{content_rect, draw_frame};
use crate::widget::base::WidgetBase;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::Widget;

/// A container that draws a background and border behind its children.
///
/// The child area is the panel minus its borders.
#[derive(Debug, Default)]
pub struct Panel;

impl Panel {
    pub fn new() -> Self {
        Self
    }
}

impl Widget for Panel {
    fn type_name(&self) -> &'static str {
        "Panel"
    }

    fn is_container(&self) -> bool {
        true
    }

    fn child_offset(&self, base: &WidgetBase) -> Point {
        Point::new(base.borders(), base.borders())
    }

    fn inner_size(&self, base: &WidgetBase) -> Size {
        content_rect(base).size
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        draw_frame(base, target, base.color(RendererProperty::BackgroundColor));
    }
}
