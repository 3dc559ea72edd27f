//! State shared by every widget.
//!
//! [`WidgetBase`] holds what the tree manages on behalf of a widget:
//! geometry layouts, the visible/enabled/focused flags, transient mouse
//! state, the renderer bag with inherited values, the tooltip and the
//! built-in signals. Widget behaviours get read access to it in every hook;
//! all mutation goes through [`WidgetTree`](super::WidgetTree) so that
//! signals, focus bookkeeping and layout propagation stay consistent.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::{ConnectionId, ErasedSignal, Signal};
use trellis_render::{Color, Point, Rect, Size, TextStyle};

use super::WidgetId;
use super::layout::Layout2d;
use super::theme::{RendererData, RendererProperty};

/// Default character size when neither the widget nor its theme sets one.
pub const DEFAULT_TEXT_SIZE: f32 = 13.0;

/// Signals every widget has.
#[derive(Debug, Default)]
pub struct BaseSignals {
    pub position_changed: Signal<Point>,
    pub size_changed: Signal<Size>,
    pub focused: Signal<()>,
    pub unfocused: Signal<()>,
    pub mouse_entered: Signal<()>,
    pub mouse_left: Signal<()>,
    pub visibility_changed: Signal<bool>,
}

impl BaseSignals {
    /// Names accepted by [`BaseSignals::by_name`].
    pub const NAMES: [&'static str; 7] = [
        "PositionChanged",
        "SizeChanged",
        "Focused",
        "Unfocused",
        "MouseEntered",
        "MouseLeft",
        "VisibilityChanged",
    ];

    /// Case-insensitive lookup.
    pub fn by_name(&self, name: &str) -> Option<&dyn ErasedSignal> {
        let index = Self::NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))?;
        Some(self.all()[index])
    }

    pub(crate) fn all(&self) -> [&dyn ErasedSignal; 7] {
        [
            &self.position_changed,
            &self.size_changed,
            &self.focused,
            &self.unfocused,
            &self.mouse_entered,
            &self.mouse_left,
            &self.visibility_changed,
        ]
    }
}

/// Common widget state owned by the tree.
pub struct WidgetBase {
    pub(crate) position: Layout2d,
    pub(crate) size: Layout2d,

    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) focused: bool,
    pub(crate) mouse_hover: bool,
    pub(crate) mouse_down: bool,

    renderer: RendererData,
    renderer_connection: ConnectionId,
    renderer_inbox: Arc<Mutex<Vec<RendererProperty>>>,
    /// Set when the renderer was assigned explicitly instead of coming from
    /// the theme; only then is it saved with the widget.
    pub(crate) custom_renderer: bool,
    pub(crate) inherited_opacity: f32,
    pub(crate) inherited_font: Option<String>,

    pub(crate) tool_tip: Option<WidgetId>,
    /// Widget that owns this one outside the child hierarchy (tooltips,
    /// dropdown popups).
    pub(crate) owner: Option<WidgetId>,

    signals: BaseSignals,
}

impl std::fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("position", &self.position())
            .field("size", &self.size())
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("focused", &self.focused)
            .field("mouse_hover", &self.mouse_hover)
            .field("mouse_down", &self.mouse_down)
            .finish_non_exhaustive()
    }
}

impl WidgetBase {
    pub(crate) fn new(renderer: RendererData) -> Self {
        let renderer_inbox = Arc::new(Mutex::new(Vec::new()));
        let renderer_connection = subscribe(&renderer, &renderer_inbox);
        Self {
            position: Layout2d::default(),
            size: Layout2d::default(),
            visible: true,
            enabled: true,
            focused: false,
            mouse_hover: false,
            mouse_down: false,
            renderer,
            renderer_connection,
            renderer_inbox,
            custom_renderer: false,
            inherited_opacity: 1.0,
            inherited_font: None,
            tool_tip: None,
            owner: None,
            signals: BaseSignals::default(),
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Last resolved position, relative to the parent's child area.
    pub fn position(&self) -> Point {
        let (x, y) = self.position.value();
        Point::new(x, y)
    }

    /// Last resolved size.
    pub fn size(&self) -> Size {
        let (width, height) = self.size.value();
        Size::new(width, height)
    }

    pub fn position_layout(&self) -> &Layout2d {
        &self.position
    }

    pub fn size_layout(&self) -> &Layout2d {
        &self.size
    }

    /// Rectangle in the parent's child area.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Rectangle in widget-local coordinates (origin at 0, 0).
    pub fn local_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size())
    }

    // =========================================================================
    // Flags
    // =========================================================================

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_mouse_hover(&self) -> bool {
        self.mouse_hover
    }

    pub fn is_mouse_down(&self) -> bool {
        self.mouse_down
    }

    pub fn tool_tip(&self) -> Option<WidgetId> {
        self.tool_tip
    }

    pub fn owner(&self) -> Option<WidgetId> {
        self.owner
    }

    pub fn signals(&self) -> &BaseSignals {
        &self.signals
    }

    // =========================================================================
    // Renderer
    // =========================================================================

    pub fn renderer(&self) -> &RendererData {
        &self.renderer
    }

    /// Swap the renderer bag. Every property of the new bag is reported as
    /// changed on the next flush.
    pub(crate) fn set_renderer(&mut self, renderer: RendererData, custom: bool) {
        self.renderer.changed().disconnect(self.renderer_connection);
        self.renderer_connection = subscribe(&renderer, &self.renderer_inbox);
        self.renderer_inbox
            .lock()
            .extend(renderer.properties().into_iter().map(|(property, _)| property));
        self.renderer = renderer;
        self.custom_renderer = custom;
    }

    /// Properties changed since the last call, without duplicates.
    pub(crate) fn take_renderer_changes(&self) -> Vec<RendererProperty> {
        let mut changes = std::mem::take(&mut *self.renderer_inbox.lock());
        changes.sort_unstable();
        changes.dedup();
        changes
    }

    /// Opacity set on this widget's own renderer, if any.
    pub fn own_opacity(&self) -> Option<f32> {
        self.renderer
            .number(RendererProperty::Opacity)
            .map(|opacity| opacity.clamp(0.0, 1.0))
    }

    /// Own opacity, else the one inherited from the parent.
    pub fn opacity(&self) -> f32 {
        self.own_opacity().unwrap_or(self.inherited_opacity)
    }

    /// Own font, else the one inherited from the parent.
    pub fn font(&self) -> Option<String> {
        self.renderer
            .text(RendererProperty::Font)
            .or_else(|| self.inherited_font.clone())
    }

    /// A color from the renderer, transparent when unset.
    pub fn color(&self, property: RendererProperty) -> Color {
        self.renderer.color(property).unwrap_or(Color::TRANSPARENT)
    }

    /// Pick the disabled or hover variant of a color when it is set and the
    /// widget is in that state.
    pub fn state_color(
        &self,
        normal: RendererProperty,
        hover: RendererProperty,
        disabled: RendererProperty,
    ) -> Color {
        let variant = if !self.enabled {
            self.renderer.color(disabled)
        } else if self.mouse_hover {
            self.renderer.color(hover)
        } else {
            None
        };
        variant.unwrap_or_else(|| self.color(normal))
    }

    /// Text style from the renderer's font, text size and text colors.
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font: self.font(),
            size: self
                .renderer
                .number(RendererProperty::TextSize)
                .unwrap_or(DEFAULT_TEXT_SIZE),
            color: self.state_color(
                RendererProperty::TextColor,
                RendererProperty::TextColorHover,
                RendererProperty::TextColorDisabled,
            ),
        }
    }

    /// Border thickness, 0 when unset.
    pub fn borders(&self) -> f32 {
        self.renderer
            .number(RendererProperty::Borders)
            .unwrap_or(0.0)
            .max(0.0)
    }
}

impl Drop for WidgetBase {
    fn drop(&mut self) {
        self.renderer.changed().disconnect(self.renderer_connection);
    }
}

fn subscribe(renderer: &RendererData, inbox: &Arc<Mutex<Vec<RendererProperty>>>) -> ConnectionId {
    let inbox = Arc::downgrade(inbox);
    renderer.changed().connect(move |property| {
        if let Some(inbox) = inbox.upgrade() {
            inbox.lock().push(*property);
        }
    })
}
