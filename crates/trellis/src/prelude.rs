//! Prelude module for Trellis.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use trellis::prelude::*;
//! ```

// ============================================================================
// Gui root
// ============================================================================

pub use crate::{Gui, GuiConfig, GuiError, LayoutError};

// ============================================================================
// Signals
// ============================================================================

pub use trellis_core::{ConnectionId, Signal};

// ============================================================================
// Widget foundation
// ============================================================================

pub use crate::widget::{
    DataNode, Event, EventContext, Key, KeyEvent, KeyboardModifiers, Layout, Layout2d, MouseButton,
    RendererData, RendererProperty, Theme, Widget, WidgetBase, WidgetId, WidgetTree,
};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::widget::widgets::{
    Button, ChildWindow, ComboBox, EditBox, Label, ListBox, Panel, Popup, Slider,
};

// ============================================================================
// Geometry
// ============================================================================

pub use trellis_render::{Color, Point, Rect, Size};
