//! The widget behaviour trait.
//!
//! A widget is a node in the [`WidgetTree`](super::WidgetTree): the tree
//! owns its [`WidgetBase`] and, for containers, its child list. The
//! [`Widget`] trait is everything that differs per widget kind: capability
//! queries, geometry of the child area, input hooks, drawing, signals and
//! persistence. Every method has a default so a widget only implements what
//! it reacts to.
//!
//! # Coordinates
//!
//! Positions handed to hooks are widget-local: `(0, 0)` is the widget's
//! top-left corner.
//!
//! # Example
//!
//! ```
//! use trellis::widget::{EventContext, Widget, WidgetTree};
//! use trellis_render::Point;
//!
//! #[derive(Default)]
//! struct ClickCounter {
//!     clicks: u32,
//! }
//!
//! impl Widget for ClickCounter {
//!     fn type_name(&self) -> &'static str {
//!         "ClickCounter"
//!     }
//!
//!     fn left_mouse_released(&mut self, ctx: &mut EventContext<'_>, _pos: Point) {
//!         if ctx.base().is_mouse_down() {
//!             self.clicks += 1;
//!         }
//!     }
//! }
//!
//! let mut tree = WidgetTree::new();
//! let counter = tree.insert(ClickCounter::default());
//! assert_eq!(tree.get::<ClickCounter>(counter).map(|c| c.clicks), Some(0));
//! ```

use std::any::Any;
use std::time::Duration;

use trellis_core::ErasedSignal;
use trellis_render::{Point, Rect, RenderTarget, Size};

use super::WidgetId;
use super::base::WidgetBase;
use super::events::KeyEvent;
use super::persistence::DataNode;
use super::requests::{RequestQueue, TreeRequest};
use super::theme::RendererProperty;
use crate::error::GuiError;

/// Upcast helper so behaviours can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a hook may touch besides its own behaviour state.
///
/// The base is read-only; changes to geometry, focus or overlays are queued
/// as [`TreeRequest`]s and applied by the tree after the hook returns.
pub struct EventContext<'a> {
    id: WidgetId,
    base: &'a WidgetBase,
    requests: &'a RequestQueue,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(id: WidgetId, base: &'a WidgetBase, requests: &'a RequestQueue) -> Self {
        Self { id, base, requests }
    }

    /// The widget receiving the hook.
    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    #[inline]
    pub fn base(&self) -> &WidgetBase {
        self.base
    }

    /// The shared queue, for slots that must request changes later.
    pub fn requests(&self) -> &RequestQueue {
        self.requests
    }

    pub fn request(&self, request: TreeRequest) {
        self.requests.push(request);
    }

    /// Move this widget (to a constant position).
    pub fn request_position(&self, position: Point) {
        self.request(TreeRequest::SetPosition(self.id, position));
    }

    /// Resize this widget (to a constant size).
    pub fn request_size(&self, size: Size) {
        self.request(TreeRequest::SetSize(self.id, size));
    }

    pub fn request_focus(&self) {
        self.request(TreeRequest::Focus(self.id));
    }

    pub fn request_unfocus(&self) {
        self.request(TreeRequest::Unfocus(self.id));
    }

    /// Show `overlay` over the whole root of this widget, placing `content`
    /// at this widget's position plus `offset`.
    pub fn show_overlay(
        &self,
        overlay: WidgetId,
        content: Option<WidgetId>,
        offset: Point,
        content_size: Option<Size>,
    ) {
        self.request(TreeRequest::ShowOverlay {
            overlay,
            owner: self.id,
            content,
            offset,
            content_size,
        });
    }

    pub fn hide_overlay(&self, overlay: WidgetId) {
        self.request(TreeRequest::HideOverlay(overlay));
    }
}

/// Behaviour of a widget kind.
///
/// # Capabilities
///
/// - [`is_container`](Widget::is_container): the node gets a child list and
///   takes part in dispatch as a container.
/// - [`is_draggable`](Widget::is_draggable): keeps receiving mouse moves
///   while the button is held, even outside its bounds.
/// - [`can_gain_focus`](Widget::can_gain_focus): refuses focus when false.
/// - [`isolated_focus_group`](Widget::isolated_focus_group): tab cycling
///   wraps inside the container instead of leaving it.
#[allow(unused_variables)]
pub trait Widget: AsAny + Send {
    /// Type name used by the theme, the registry and saved files.
    fn type_name(&self) -> &'static str;

    // =========================================================================
    // Capabilities and geometry
    // =========================================================================

    fn is_container(&self) -> bool {
        false
    }

    fn isolated_focus_group(&self) -> bool {
        false
    }

    fn is_draggable(&self) -> bool {
        false
    }

    fn can_gain_focus(&self) -> bool {
        true
    }

    /// Offset of the child area from the widget's top-left corner.
    fn child_offset(&self, base: &WidgetBase) -> Point {
        Point::ZERO
    }

    /// Size of the child area. Percentages in child layouts refer to it.
    fn inner_size(&self, base: &WidgetBase) -> Size {
        base.size()
    }

    /// Hit test in local coordinates.
    fn is_mouse_on(&self, base: &WidgetBase, pos: Point) -> bool {
        Rect::from_origin_size(Point::ZERO, base.size()).contains(pos)
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, pos: Point) {}

    fn left_mouse_released(&mut self, ctx: &mut EventContext<'_>, pos: Point) {}

    fn right_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, pos: Point) {}

    fn right_mouse_released(&mut self, ctx: &mut EventContext<'_>, pos: Point) {}

    fn mouse_moved(&mut self, ctx: &mut EventContext<'_>, pos: Point) {}

    /// Returns true if the wheel movement was used.
    fn mouse_wheel_scrolled(&mut self, ctx: &mut EventContext<'_>, delta: f32, pos: Point) -> bool {
        false
    }

    /// Returns true if the key was used.
    fn key_pressed(&mut self, ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        false
    }

    fn text_entered(&mut self, ctx: &mut EventContext<'_>, ch: char) {}

    /// The mouse button was released somewhere, not necessarily on this
    /// widget.
    fn mouse_no_longer_down(&mut self, ctx: &mut EventContext<'_>) {}

    /// The mouse left the widget.
    fn mouse_left(&mut self, ctx: &mut EventContext<'_>) {}

    fn focus_changed(&mut self, ctx: &mut EventContext<'_>, focused: bool) {}

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advance animations. Returns true if the widget needs a redraw.
    fn update_time(&mut self, ctx: &mut EventContext<'_>, elapsed: Duration) -> bool {
        false
    }

    /// Draw in local coordinates. The target is already translated to the
    /// widget and clipped to its size; children are drawn afterwards.
    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {}

    fn renderer_changed(&mut self, ctx: &mut EventContext<'_>, property: RendererProperty) {}

    // =========================================================================
    // Signals and persistence
    // =========================================================================

    /// Look up a widget-specific signal by name (case-insensitive).
    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        None
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Write widget-specific properties.
    fn save(&self, node: &mut DataNode) {}

    /// Read widget-specific properties.
    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        Ok(())
    }

    /// Widgets created and owned by this one outside the child list. They
    /// are destroyed together with it.
    fn owned_widgets(&self) -> Vec<WidgetId> {
        Vec::new()
    }
}
