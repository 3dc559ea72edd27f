//! Standard widgets for Trellis.
//!
//! - [`Panel`]: plain container with a background
//! - [`ChildWindow`]: container with a draggable title bar
//! - [`Button`]: clickable button with a `pressed` signal
//! - [`Label`]: text display, never focusable
//! - [`EditBox`]: single-line text input
//! - [`Slider`]: draggable value selector
//! - [`ListBox`]: selectable list of items
//! - [`ComboBox`]: button that opens a [`ListBox`] in a [`Popup`] overlay
//! - [`Popup`]: overlay container dismissed by outside clicks
//! - [`RootContainer`]: the container owned by a [`Gui`](crate::Gui)

mod button;
mod child_window;
mod combo_box;
mod edit_box;
mod label;
mod list_box;
mod panel;
mod popup;
mod root;
mod slider;

pub use button::Button;
pub use child_window::ChildWindow;
pub use combo_box::ComboBox;
pub use edit_box::EditBox;
pub use label::Label;
pub use list_box::{ListBox, ListModel};
pub use panel::Panel;
pub use popup::Popup;
pub use root::RootContainer;
pub use slider::Slider;

use trellis_render::{Color, Rect, RenderTarget};

use super::base::WidgetBase;
use super::persistence::DataNode;
use super::theme::RendererProperty;
use crate::error::GuiError;

/// Fill the widget's local bounds and stroke its border.
pub(crate) fn draw_frame(base: &WidgetBase, target: &mut dyn RenderTarget, background: Color) {
    let bounds = base.local_bounds();
    target.fill_rect(bounds, background);
    let borders = base.borders();
    if borders > 0.0 {
        target.stroke_rect(bounds, base.color(RendererProperty::BorderColor), borders);
    }
}

/// Local bounds shrunk by the border thickness.
pub(crate) fn content_rect(base: &WidgetBase) -> Rect {
    let borders = base.borders();
    let size = base.size();
    Rect::new(
        borders,
        borders,
        (size.width - 2.0 * borders).max(0.0),
        (size.height - 2.0 * borders).max(0.0),
    )
}

/// Saved list of strings, stored as a JSON array in one property.
pub(crate) fn save_items(node: &mut DataNode, key: &str, items: &[String]) {
    if let Ok(encoded) = serde_json::to_string(items) {
        node.set_property(key, encoded);
    }
}

pub(crate) fn load_items(node: &DataNode, key: &str) -> Result<Option<Vec<String>>, GuiError> {
    node.property(key)
        .map(|text| serde_json::from_str(text).map_err(|_| GuiError::invalid_property(key, text)))
        .transpose()
}
