//! Trellis - a retained-mode GUI widget toolkit.
//!
//! This is the main crate: the widget tree with its layout bindings and
//! container event routing, the built-in widgets and the [`Gui`] root that
//! a host application drives with window events.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut gui = Gui::new(Size::new(640.0, 480.0));
//! let save = gui.tree_mut().insert(Button::new("Save"));
//! gui.add(save, "save").unwrap();
//! gui.tree_mut().set_size(save, (120.0, 30.0)).unwrap();
//!
//! gui.tree().connect(save, "Pressed", || println!("saved")).unwrap();
//! assert_eq!(gui.get("save"), Some(save));
//! ```

mod error;
mod gui;
pub mod prelude;
pub mod widget;

pub use error::{GuiError, LayoutError, Result};
pub use gui::{Gui, GuiConfig};

/// Graphics types and the rendering interface.
pub mod render {
    pub use trellis_render::*;
}

static_assertions::assert_impl_all!(widget::WidgetTree: Send);
static_assertions::assert_impl_all!(GuiError: Send, Sync);
