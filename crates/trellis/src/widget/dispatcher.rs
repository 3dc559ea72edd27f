//! Input dispatch through the widget hierarchy.
//!
//! Every entry point takes the widget and a position in the coordinate space
//! of that widget's parent's child area. A container converts the position
//! into its own child area (`pos - position - child_offset`) before finding
//! the child under the mouse, so positions stay relative all the way down.
//!
//! # Event Flow
//!
//! - **Mouse presses** go to the topmost visible child under the mouse. A
//!   disabled child blocks the press without receiving it. The pressed child
//!   becomes the container's focused child; a press on the container's own
//!   background focuses the container and unfocuses its child.
//! - **Mouse moves** update hover state. While a draggable child (or a child
//!   container) holds the button, moves go to it even outside its bounds.
//! - **Mouse releases** go to the child under the mouse. Afterwards every
//!   widget in the tree is told the button is no longer down, see
//!   [`WidgetTree::process_mouse_release`].
//! - **Keys and text** follow the chain of focused children. A key the
//!   focused child does not use falls through to the container's own hook.

use trellis_core::logging::targets;
use trellis_render::Point;

use super::events::{Key, KeyEvent};
use super::tree::{WidgetId, WidgetTree};

impl WidgetTree {
    /// Position inside the child area of `id`, from one in its parent's.
    fn to_child_area(&self, id: WidgetId, pos: Point) -> Point {
        pos - self.position(id) - self.child_offset(id)
    }

    /// Topmost visible child of `container` containing `inner`, whether or
    /// not it is enabled.
    fn child_at(&self, container: WidgetId, inner: Point) -> Option<WidgetId> {
        self.container(container)?
            .children
            .iter()
            .rev()
            .map(|(child, _)| *child)
            .find(|child| {
                self.nodes.get(*child).is_some_and(|node| {
                    node.base.visible && node.behavior.is_mouse_on(&node.base, inner - node.base.position())
                })
            })
    }

    /// Update the hovered child of `container` and return it. A disabled
    /// child under the mouse hides the widgets below it.
    fn mouse_on_which_widget(&mut self, container: WidgetId, inner: Point) -> Option<WidgetId> {
        let hit = self
            .child_at(container, inner)
            .filter(|child| self.is_enabled(*child));
        let previous = self.container(container)?.widget_below_mouse;
        if previous != hit {
            if let Some(previous) = previous {
                self.mouse_no_longer_on_widget(previous);
            }
            if let Some(state) = self.container_mut(container) {
                state.widget_below_mouse = hit;
            }
        }
        hit
    }

    // =========================================================================
    // Mouse
    // =========================================================================

    pub fn left_mouse_pressed(&mut self, id: WidgetId, pos: Point) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.base.mouse_down = true;
        let local = pos - node.base.position();

        if !self.is_container(id) {
            self.call_hook(id, |widget, ctx| widget.left_mouse_pressed(ctx, local));
            return;
        }

        let inner = self.to_child_area(id, pos);
        match self.mouse_on_which_widget(id, inner) {
            Some(hit) => {
                let previous = self.container(id).and_then(|state| state.focused_widget);
                if previous != Some(hit) {
                    if let Some(previous) = previous {
                        self.set_focused(previous, false);
                    }
                    if let Some(state) = self.container_mut(id) {
                        state.focused_widget = Some(hit);
                    }
                }
                if !self.is_container(hit) {
                    self.set_focused(hit, true);
                }
                self.left_mouse_pressed(hit, inner);
            }
            None => {
                if let Some(previous) = self.container_mut(id).and_then(|state| state.focused_widget.take()) {
                    self.set_focused(previous, false);
                }
                self.set_focused(id, true);
                self.call_hook(id, |widget, ctx| widget.left_mouse_pressed(ctx, local));
            }
        }
    }

    pub fn left_mouse_released(&mut self, id: WidgetId, pos: Point) {
        let local = pos - self.position(id);
        if self.is_container(id) {
            let inner = self.to_child_area(id, pos);
            if let Some(hit) = self.mouse_on_which_widget(id, inner) {
                self.left_mouse_released(hit, inner);
                return;
            }
        }
        self.call_hook(id, |widget, ctx| widget.left_mouse_released(ctx, local));
    }

    /// Deliver a left button release and then reset the pressed state of
    /// `id` and everything below it.
    pub fn process_mouse_release(&mut self, id: WidgetId, pos: Point) {
        self.left_mouse_released(id, pos);
        self.mouse_no_longer_down(id);
    }

    /// The mouse button went up somewhere; clear pressed state recursively.
    pub fn mouse_no_longer_down(&mut self, id: WidgetId) {
        self.call_hook(id, |widget, ctx| widget.mouse_no_longer_down(ctx));
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.mouse_down = false;
        }
        for child in self.children(id) {
            self.mouse_no_longer_down(child);
        }
    }

    pub fn right_mouse_pressed(&mut self, id: WidgetId, pos: Point) {
        let local = pos - self.position(id);
        if self.is_container(id) {
            let inner = self.to_child_area(id, pos);
            if let Some(hit) = self.mouse_on_which_widget(id, inner) {
                self.right_mouse_pressed(hit, inner);
                return;
            }
        }
        self.call_hook(id, |widget, ctx| widget.right_mouse_pressed(ctx, local));
    }

    pub fn right_mouse_released(&mut self, id: WidgetId, pos: Point) {
        let local = pos - self.position(id);
        if self.is_container(id) {
            let inner = self.to_child_area(id, pos);
            if let Some(hit) = self.mouse_on_which_widget(id, inner) {
                self.right_mouse_released(hit, inner);
                return;
            }
        }
        self.call_hook(id, |widget, ctx| widget.right_mouse_released(ctx, local));
    }

    pub fn mouse_moved(&mut self, id: WidgetId, pos: Point) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let local = pos - node.base.position();
        if !node.base.mouse_hover && node.behavior.is_mouse_on(&node.base, local) {
            node.base.mouse_hover = true;
            node.base.signals().mouse_entered.emit(());
        }
        self.call_hook(id, |widget, ctx| widget.mouse_moved(ctx, local));

        let Some(state) = self.container(id) else {
            return;
        };
        let inner = self.to_child_area(id, pos);
        let dragged = state.children.iter().map(|(child, _)| *child).find(|child| {
            self.nodes.get(*child).is_some_and(|node| {
                node.base.mouse_down && (node.behavior.is_draggable() || node.container.is_some())
            })
        });
        if let Some(dragged) = dragged {
            self.mouse_moved(dragged, inner);
            return;
        }
        if let Some(hit) = self.mouse_on_which_widget(id, inner) {
            self.mouse_moved(hit, inner);
        }
    }

    /// Returns true if some widget used the wheel movement.
    pub fn mouse_wheel_scrolled(&mut self, id: WidgetId, delta: f32, pos: Point) -> bool {
        let local = pos - self.position(id);
        if self.is_container(id) {
            let inner = self.to_child_area(id, pos);
            if let Some(hit) = self.mouse_on_which_widget(id, inner) {
                return self.mouse_wheel_scrolled(hit, delta, inner);
            }
        }
        self.call_hook(id, |widget, ctx| widget.mouse_wheel_scrolled(ctx, delta, local))
            .unwrap_or(false)
    }

    /// The mouse is no longer on `id`: clear its hover and that of the
    /// hovered widget below it.
    pub fn mouse_no_longer_on_widget(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.base.mouse_hover {
            node.base.mouse_hover = false;
            node.base.signals().mouse_left.emit(());
            self.call_hook(id, |widget, ctx| widget.mouse_left(ctx));
        }
        if let Some(below) = self.container_mut(id).and_then(|state| state.widget_below_mouse.take()) {
            self.mouse_no_longer_on_widget(below);
        }
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Returns true if some widget used the key.
    pub fn key_pressed(&mut self, id: WidgetId, event: &KeyEvent) -> bool {
        if event.key == Key::Unknown {
            tracing::trace!(target: targets::FOCUS, "unknown key dropped");
            return false;
        }
        if let Some(child) = self.focused_child(id)
            && self.key_pressed(child, event)
        {
            return true;
        }
        self.call_hook(id, |widget, ctx| widget.key_pressed(ctx, event))
            .unwrap_or(false)
    }

    pub fn text_entered(&mut self, id: WidgetId, ch: char) {
        match self.focused_child(id) {
            Some(child) => self.text_entered(child, ch),
            None => {
                self.call_hook(id, |widget, ctx| widget.text_entered(ctx, ch));
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Tooltip to show for the mouse at `pos`: the one of the deepest
    /// widget under the mouse that has one. A disabled widget under the
    /// mouse hides its own tooltip and those below it.
    pub fn ask_tool_tip(&self, id: WidgetId, pos: Point) -> Option<WidgetId> {
        let base = self.base(id)?;
        if !base.is_visible() {
            return None;
        }
        if self.is_container(id) {
            let inner = self.to_child_area(id, pos);
            if let Some(tip) = self
                .child_at(id, inner)
                .filter(|child| self.is_enabled(*child))
                .and_then(|child| self.ask_tool_tip(child, inner))
            {
                return Some(tip);
            }
        }
        base.tool_tip().filter(|tip| self.contains(*tip))
    }

    /// Deepest visible widget at `pos`, starting from `id`. Does not change
    /// hover state.
    pub fn widget_at(&self, id: WidgetId, pos: Point) -> Option<WidgetId> {
        let node = self.nodes.get(id)?;
        if !node.base.visible || !node.behavior.is_mouse_on(&node.base, pos - node.base.position()) {
            return None;
        }
        let inner = self.to_child_area(id, pos);
        Some(
            self.child_at(id, inner)
                .and_then(|child| self.widget_at(child, inner))
                .unwrap_or(id),
        )
    }
}
