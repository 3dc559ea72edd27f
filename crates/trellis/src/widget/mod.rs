//! Widget system for Trellis.
//!
//! This module provides the retained widget tree and everything that hangs
//! off it:
//!
//! - [`WidgetTree`]: the arena owning every widget, with hierarchy, geometry,
//!   flag, signal, theme and save/load operations
//! - [`Widget`] trait: per-kind behaviour (input hooks, drawing, persistence)
//! - [`WidgetBase`]: state every widget has, managed by the tree
//! - [`layout`]: position and size expressions bound to other widgets
//! - [`widgets`]: the built-in widget catalog
//!
//! # Overview
//!
//! Widgets are addressed by [`WidgetId`] handles. Containers keep their
//! children in paint order: the last child is drawn on top and is hit first.
//! Input enters at a container and is routed down to the widget under the
//! mouse or to the focused widget; hooks cannot reach into the tree directly
//! and instead queue [`TreeRequest`]s that the tree applies afterwards.
//!
//! ```
//! use trellis::widget::{Layout2d, WidgetTree};
//! use trellis::widget::widgets::{Button, Panel};
//! use trellis_render::Point;
//!
//! let mut tree = WidgetTree::new();
//! let panel = tree.insert(Panel::new());
//! let ok = tree.insert(Button::new("OK"));
//! tree.set_size(panel, (400.0, 300.0)).unwrap();
//! tree.add(panel, ok, "ok").unwrap();
//! tree.set_position(ok, Layout2d::parse("(50%, 10)").unwrap()).unwrap();
//! assert_eq!(tree.position(ok), Point::new(200.0, 10.0));
//! ```

mod base;
mod debug;
mod dispatcher;
mod events;
mod focus;
pub mod layout;
mod persistence;
mod requests;
mod theme;
mod traits;
mod tree;
pub mod widgets;

#[cfg(test)]
mod tests;

pub use base::{BaseSignals, DEFAULT_TEXT_SIZE, WidgetBase};
pub use events::{Event, Key, KeyEvent, KeyboardModifiers, MouseButton};
pub use layout::{Layout, Layout2d};
pub use persistence::{DataNode, RENDERER_NODE, TOOL_TIP_NODE, WidgetFactory, WidgetRegistry};
pub use requests::{RequestQueue, TreeRequest};
pub use theme::{RendererData, RendererProperty, RendererValue, Theme};
pub use traits::{AsAny, EventContext, Widget};
pub use tree::{WidgetId, WidgetTree};
