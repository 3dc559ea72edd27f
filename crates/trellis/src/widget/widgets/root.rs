//! The root container of a [`Gui`](crate::Gui).

use trellis_render::RenderTarget;

use crate::widget::base::WidgetBase;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::Widget;

/// Container covering the whole view.
///
/// It is an isolated focus group, so Tab cycling wraps around at the end of
/// the window instead of giving up.
#[derive(Debug, Default)]
pub struct RootContainer;

impl RootContainer {
    pub fn new() -> Self {
        Self
    }
}

impl Widget for RootContainer {
    fn type_name(&self) -> &'static str {
        "RootContainer"
    }

    fn is_container(&self) -> bool {
        true
    }

    fn isolated_focus_group(&self) -> bool {
        true
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        let background = base.color(RendererProperty::BackgroundColor);
        if background.a > 0 {
            target.fill_rect(base.local_bounds(), background);
        }
    }
}
