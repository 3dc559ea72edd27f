//! The top-level object a host application talks to.
//!
//! A [`Gui`] owns a [`WidgetTree`] with a [`RootContainer`] covering the
//! view. The host forwards raw window [`Event`]s to
//! [`handle_event`](Gui::handle_event), advances time with
//! [`update`](Gui::update) and renders with [`draw`](Gui::draw). Every call
//! finishes the work it caused, including requests queued by widgets, before
//! it returns.
//!
//! # Example
//!
//! ```
//! use trellis::{Gui, GuiConfig};
//! use trellis::widget::{Event, MouseButton};
//! use trellis::widget::widgets::Button;
//! use trellis_render::{Point, Size};
//!
//! let mut gui = Gui::with_config(Size::new(800.0, 600.0), GuiConfig::default());
//! let button = gui.tree_mut().insert(Button::new("OK"));
//! gui.add(button, "ok").unwrap();
//! gui.tree_mut().set_size(button, (100.0, 30.0)).unwrap();
//!
//! let position = Point::new(10.0, 10.0);
//! gui.handle_event(Event::MouseButtonPressed { button: MouseButton::Left, position });
//! assert!(gui.tree().is_focused(button));
//! ```

use std::time::Duration;

use trellis_core::PerfSpan;
use trellis_core::logging::targets;
use trellis_render::{Point, Rect, RenderTarget, Size};

use crate::error::Result;
use crate::widget::layout::Layout2d;
use crate::widget::widgets::RootContainer;
use crate::widget::{DataNode, Event, Key, MouseButton, WidgetId, WidgetTree};

// ============================================================================
// Configuration
// ============================================================================

/// Behaviour settings of a [`Gui`].
#[derive(Debug, Clone, PartialEq)]
pub struct GuiConfig {
    /// How long the mouse must rest before a tooltip appears.
    pub tool_tip_delay: Duration,
    /// Distance of a shown tooltip from the mouse, in view units.
    pub tool_tip_offset: Point,
    /// Whether Tab and Shift+Tab move the keyboard focus.
    pub tab_key_navigation: bool,
    /// Whether [`Gui::update`] keeps ticking widgets while the window is
    /// not focused.
    pub tick_when_unfocused: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            tool_tip_delay: Duration::from_millis(500),
            tool_tip_offset: Point::new(10.0, 10.0),
            tab_key_navigation: true,
            tick_when_unfocused: false,
        }
    }
}

impl GuiConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tooltip delay using builder pattern.
    pub fn with_tool_tip_delay(mut self, delay: Duration) -> Self {
        self.tool_tip_delay = delay;
        self
    }

    /// Set the tooltip offset using builder pattern.
    pub fn with_tool_tip_offset(mut self, offset: impl Into<Point>) -> Self {
        self.tool_tip_offset = offset.into();
        self
    }

    /// Enable or disable Tab focus navigation using builder pattern.
    pub fn with_tab_key_navigation(mut self, enabled: bool) -> Self {
        self.tab_key_navigation = enabled;
        self
    }

    /// Keep ticking while unfocused using builder pattern.
    pub fn with_tick_when_unfocused(mut self, enabled: bool) -> Self {
        self.tick_when_unfocused = enabled;
        self
    }
}

// ============================================================================
// Tooltip state
// ============================================================================

#[derive(Debug, Default)]
struct ToolTipState {
    /// Time the mouse has rested since the last mouse event.
    elapsed: Duration,
    /// Set by mouse events, cleared once the tree was asked.
    armed: bool,
    /// Last mouse position in view coordinates.
    mouse: Point,
    /// The tooltip attached to the root and its layout from before.
    shown: Option<(WidgetId, Layout2d)>,
}

// ============================================================================
// Gui
// ============================================================================

/// Root of a widget hierarchy bound to one window.
#[derive(Debug)]
pub struct Gui {
    tree: WidgetTree,
    root: WidgetId,
    config: GuiConfig,
    window_size: Size,
    /// Part of the GUI coordinate space that is shown.
    view: Option<Rect>,
    /// Part of the window, in pixels, the view is shown in.
    viewport: Option<Rect>,
    window_focused: bool,
    tool_tip: ToolTipState,
    touch_finger: Option<u32>,
}

static_assertions::assert_impl_all!(Gui: Send);

impl Gui {
    /// A gui for a window of the given pixel size, with default settings.
    pub fn new(window_size: Size) -> Self {
        Self::with_config(window_size, GuiConfig::default())
    }

    pub fn with_config(window_size: Size, config: GuiConfig) -> Self {
        Self::with_tree(window_size, config, WidgetTree::new())
    }

    /// A gui around an existing tree, e.g. one with a custom theme or extra
    /// registered widget types.
    pub fn with_tree(window_size: Size, config: GuiConfig, mut tree: WidgetTree) -> Self {
        let root = tree.insert(RootContainer::new());
        let mut gui = Self {
            tree,
            root,
            config,
            window_size,
            view: None,
            viewport: None,
            window_focused: true,
            tool_tip: ToolTipState::default(),
            touch_finger: None,
        };
        gui.resize_root();
        gui
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    /// The container covering the view.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GuiConfig) {
        self.config = config;
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    /// Add a widget to the root container.
    pub fn add(&mut self, widget: WidgetId, name: impl Into<String>) -> Result<()> {
        self.tree.add(self.root, widget, name)
    }

    /// Find a widget by name anywhere below the root.
    pub fn get(&self, name: &str) -> Option<WidgetId> {
        self.tree.get_recursive(self.root, name)
    }

    /// Detach a widget from the root container.
    pub fn remove(&mut self, widget: WidgetId) -> bool {
        self.tree.parent(widget) == Some(self.root) && self.tree.remove(widget)
    }

    pub fn remove_all_widgets(&mut self) {
        self.hide_tool_tip();
        self.tree.remove_all(self.root);
    }

    pub fn focus_next_widget(&mut self) -> bool {
        let moved = self.tree.focus_next_widget(self.root);
        self.tree.process_requests();
        moved
    }

    pub fn focus_previous_widget(&mut self) -> bool {
        let moved = self.tree.focus_previous_widget(self.root);
        self.tree.process_requests();
        moved
    }

    pub fn unfocus_all_widgets(&mut self) {
        self.tree.unfocus_all_widgets(self.root);
        self.tree.process_requests();
    }

    /// Save the root's widgets. The root itself is saved as an untyped
    /// node holding them.
    pub fn save(&self) -> Result<DataNode> {
        let mut data = DataNode::new("Gui");
        for child in self.tree.children(self.root) {
            if self.tree.base(child).is_some_and(|base| base.owner().is_some()) {
                continue;
            }
            data.children.push(self.tree.save(child)?);
        }
        Ok(data)
    }

    /// Load widgets saved with [`save`](Self::save) and add them to the
    /// root. Widgets loaded before an error stay added.
    pub fn load(&mut self, data: &DataNode) -> Result<()> {
        for child in &data.children {
            let widget = self.tree.load(child)?;
            self.add(widget, child.property("Name").unwrap_or_default())?;
        }
        self.tree.process_requests();
        Ok(())
    }

    // =========================================================================
    // View
    // =========================================================================

    /// The shown part of the GUI coordinate space. Follows the window size
    /// unless set explicitly.
    pub fn view(&self) -> Rect {
        self.view
            .unwrap_or_else(|| Rect::from_origin_size(Point::ZERO, self.window_size))
    }

    /// Show a fixed part of the GUI coordinate space. The root container is
    /// resized to it.
    pub fn set_view(&mut self, view: Rect) {
        self.view = Some(view);
        self.resize_root();
    }

    /// The window area, in pixels, the view is mapped onto. The whole
    /// window unless set explicitly.
    pub fn viewport(&self) -> Rect {
        self.viewport
            .unwrap_or_else(|| Rect::from_origin_size(Point::ZERO, self.window_size))
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = Some(viewport);
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    /// Convert a window pixel position into view coordinates.
    pub fn map_pixel_to_view(&self, pixel: Point) -> Point {
        let view = self.view();
        let viewport = self.viewport();
        let scale = |view: f32, port: f32| if port > 0.0 { view / port } else { 1.0 };
        Point::new(
            view.left() + (pixel.x - viewport.left()) * scale(view.width(), viewport.width()),
            view.top() + (pixel.y - viewport.top()) * scale(view.height(), viewport.height()),
        )
    }

    fn resize_root(&mut self) {
        let size = self.view().size;
        if let Err(err) = self.tree.set_size(self.root, size) {
            tracing::warn!(target: targets::GUI, %err, "cannot resize root container");
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn is_window_focused(&self) -> bool {
        self.window_focused
    }

    /// Feed a raw window event. Returns true if a widget used it.
    pub fn handle_event(&mut self, event: Event) -> bool {
        tracing::trace!(target: targets::GUI, ?event, "handling event");
        if event.is_mouse_event() {
            self.hide_tool_tip();
        }

        let root = self.root;
        let handled = match event {
            Event::MouseMoved { position } => {
                let pos = self.mouse_event_at(position);
                self.tree.mouse_moved(root, pos);
                self.is_over_widget(pos)
            }
            Event::MouseButtonPressed { button, position } => {
                let pos = self.mouse_event_at(position);
                match button {
                    MouseButton::Left => self.tree.left_mouse_pressed(root, pos),
                    MouseButton::Right => self.tree.right_mouse_pressed(root, pos),
                    MouseButton::Middle => return false,
                }
                self.is_over_widget(pos)
            }
            Event::MouseButtonReleased { button, position } => {
                let pos = self.mouse_event_at(position);
                match button {
                    MouseButton::Left => self.tree.process_mouse_release(root, pos),
                    MouseButton::Right => self.tree.right_mouse_released(root, pos),
                    MouseButton::Middle => return false,
                }
                self.is_over_widget(pos)
            }
            Event::MouseWheelScrolled { delta, position } => {
                let pos = self.mouse_event_at(position);
                self.tree.mouse_wheel_scrolled(root, delta, pos)
            }
            Event::KeyPressed(key_event) => {
                let modifiers = key_event.modifiers;
                if key_event.key == Key::Tab
                    && self.config.tab_key_navigation
                    && !modifiers.control
                    && !modifiers.alt
                {
                    if modifiers.shift {
                        self.tree.focus_previous_widget(root);
                    } else {
                        self.tree.focus_next_widget(root);
                    }
                    true
                } else {
                    self.tree.key_pressed(root, &key_event)
                }
            }
            Event::TextEntered(ch) => {
                let focused = self.tree.focused_child(root).is_some();
                self.tree.text_entered(root, ch);
                focused
            }
            Event::LostFocus => {
                tracing::debug!(target: targets::GUI, "window lost focus");
                self.window_focused = false;
                false
            }
            Event::GainedFocus => {
                tracing::debug!(target: targets::GUI, "window gained focus");
                self.window_focused = true;
                false
            }
            Event::MouseLeft => {
                self.hide_tool_tip();
                self.tool_tip.armed = false;
                self.tree.mouse_no_longer_on_widget(root);
                false
            }
            Event::Resized(size) => {
                self.window_size = size;
                self.resize_root();
                false
            }
            Event::TouchBegan { finger, position } => {
                if self.touch_finger.is_some() {
                    return false;
                }
                self.touch_finger = Some(finger);
                self.hide_tool_tip();
                let pos = self.mouse_event_at(position);
                self.tree.mouse_moved(root, pos);
                self.tree.left_mouse_pressed(root, pos);
                self.is_over_widget(pos)
            }
            Event::TouchMoved { finger, position } => {
                if self.touch_finger != Some(finger) {
                    return false;
                }
                self.hide_tool_tip();
                let pos = self.mouse_event_at(position);
                self.tree.mouse_moved(root, pos);
                self.is_over_widget(pos)
            }
            Event::TouchEnded { finger, position } => {
                if self.touch_finger != Some(finger) {
                    return false;
                }
                self.touch_finger = None;
                self.hide_tool_tip();
                let pos = self.mouse_event_at(position);
                self.tree.process_mouse_release(root, pos);
                self.is_over_widget(pos)
            }
        };

        self.tree.process_requests();
        handled
    }

    /// Map a pixel position and restart the tooltip timer from it.
    fn mouse_event_at(&mut self, pixel: Point) -> Point {
        let pos = self.map_pixel_to_view(pixel);
        self.tool_tip.elapsed = Duration::ZERO;
        self.tool_tip.armed = true;
        self.tool_tip.mouse = pos;
        pos
    }

    fn is_over_widget(&self, pos: Point) -> bool {
        self.tree
            .widget_at(self.root, pos)
            .is_some_and(|widget| widget != self.root)
    }

    // =========================================================================
    // Tooltips
    // =========================================================================

    /// The tooltip currently shown, if any.
    pub fn shown_tool_tip(&self) -> Option<WidgetId> {
        self.tool_tip.shown.as_ref().map(|(tip, _)| *tip)
    }

    fn show_tool_tip(&mut self, tip: WidgetId) {
        let previous = self
            .tree
            .base(tip)
            .map(|base| base.position_layout().clone())
            .unwrap_or_default();
        if let Err(err) = self.tree.add(self.root, tip, "") {
            tracing::warn!(target: targets::GUI, ?tip, %err, "cannot show tooltip");
            return;
        }
        let position = self.tool_tip.mouse + self.config.tool_tip_offset;
        if let Err(err) = self.tree.set_position(tip, position) {
            tracing::warn!(target: targets::GUI, ?tip, %err, "cannot place tooltip");
        }
        tracing::debug!(target: targets::GUI, ?tip, ?position, "tooltip shown");
        self.tool_tip.shown = Some((tip, previous));
    }

    /// Detach the shown tooltip and give it back its own layout.
    fn hide_tool_tip(&mut self) {
        let Some((tip, previous)) = self.tool_tip.shown.take() else {
            return;
        };
        if !self.tree.contains(tip) {
            return;
        }
        self.tree.remove(tip);
        if let Err(err) = self.tree.set_position(tip, previous) {
            tracing::warn!(target: targets::GUI, ?tip, %err, "cannot restore tooltip position");
        }
        tracing::debug!(target: targets::GUI, ?tip, "tooltip hidden");
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advance time. Returns true if the screen needs a redraw.
    ///
    /// Nothing happens while the window is unfocused unless
    /// [`GuiConfig::tick_when_unfocused`] is set.
    pub fn update(&mut self, elapsed: Duration) -> bool {
        if !self.window_focused && !self.config.tick_when_unfocused {
            return false;
        }
        let _span = PerfSpan::new("gui_update");

        let mut changed = false;
        if self.tool_tip.armed && self.tool_tip.shown.is_none() {
            self.tool_tip.elapsed += elapsed;
            if self.tool_tip.elapsed >= self.config.tool_tip_delay {
                self.tool_tip.armed = false;
                if let Some(tip) = self.tree.ask_tool_tip(self.root, self.tool_tip.mouse) {
                    self.show_tool_tip(tip);
                    changed = true;
                }
            }
        }

        changed |= self.tree.update_time(self.root, elapsed);
        self.tree.process_requests();
        changed
    }

    /// Draw every visible widget. The view is translated into the viewport
    /// and clipped to it; scaling between the two is up to the backend.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        let _span = PerfSpan::new("gui_draw");
        let view = self.view();
        let viewport = self.viewport();
        target.save();
        target.clip_rect(viewport);
        target.translate(viewport.origin - view.origin);
        self.tree.draw(self.root, target);
        target.restore();
    }
}
