//! Keyboard focus cycling.
//!
//! Focus is tracked per container: each container remembers its focused
//! child, and a focused widget's ancestors are focused too. Tab order is the
//! child order, depth-first.
//!
//! # Isolated Groups
//!
//! A container that is an isolated focus group (the root, child windows,
//! popups) keeps Tab inside itself: when the end is reached, cycling wraps
//! around to its first child instead of moving on to the container's
//! siblings.

use trellis_core::logging::targets;

use super::tree::{WidgetId, WidgetTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Previous,
}

impl WidgetTree {
    /// Move focus to the next focusable widget inside `container`.
    ///
    /// Returns false when there is nothing further to focus, in which case
    /// the caller may move on to the container's siblings.
    pub fn focus_next_widget(&mut self, container: WidgetId) -> bool {
        self.cycle_focus(container, Direction::Next)
    }

    /// Move focus to the previous focusable widget inside `container`.
    pub fn focus_previous_widget(&mut self, container: WidgetId) -> bool {
        self.cycle_focus(container, Direction::Previous)
    }

    /// Unfocus the focused child of `container` and everything below it.
    pub fn unfocus_all_widgets(&mut self, container: WidgetId) {
        if let Some(child) = self.container_mut(container).and_then(|state| state.focused_widget.take()) {
            self.set_focused(child, false);
        }
    }

    fn cycle_focus(&mut self, container: WidgetId, direction: Direction) -> bool {
        let Some(state) = self.container(container) else {
            return false;
        };
        let isolated = state.isolated_focus_group;
        let children = state.ids();
        let focused = self.focused_child(container);
        let index = focused.and_then(|focused| children.iter().position(|child| *child == focused));

        // A focused child container gets the first chance to move focus
        // within itself.
        let mut focused_is_container = false;
        if let Some(focused) = focused
            && self.is_container(focused)
        {
            focused_is_container = true;
            if self.cycle_focus(focused, direction) {
                return true;
            }
            if self.container(focused).is_some_and(|state| state.isolated_focus_group) {
                return false;
            }
        }

        let len = children.len();
        let order: Vec<usize> = match (direction, index) {
            (Direction::Next, Some(i)) => (i + 1..len).collect(),
            (Direction::Next, None) => (0..len).collect(),
            (Direction::Previous, Some(i)) => (0..i).rev().collect(),
            (Direction::Previous, None) => (0..len).rev().collect(),
        };
        if order.into_iter().any(|i| self.try_focus(children[i], direction)) {
            return true;
        }

        // Wrap around. A focused container is tried again from its start;
        // a focused leaf keeps focus if nothing else can take it.
        let Some(i) = index.filter(|_| isolated) else {
            return false;
        };
        let wrapped: Vec<usize> = match (direction, focused_is_container) {
            (Direction::Next, true) => (0..=i).collect(),
            (Direction::Next, false) => (0..i).collect(),
            (Direction::Previous, true) => (i..len).rev().collect(),
            (Direction::Previous, false) => (i + 1..len).rev().collect(),
        };
        let moved = wrapped.into_iter().any(|i| self.try_focus(children[i], direction));
        if moved {
            tracing::trace!(target: targets::FOCUS, ?container, "focus wrapped inside isolated group");
        }
        moved
    }

    /// Focus `id`, or for a container its first focusable descendant in
    /// `direction`.
    fn try_focus(&mut self, id: WidgetId, direction: Direction) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if !(node.base.visible && node.base.enabled) {
            return false;
        }
        if node.container.is_none() {
            if !node.behavior.can_gain_focus() {
                return false;
            }
            self.set_focused(id, true);
            return self.is_focused(id);
        }

        self.unfocus_all_widgets(id);
        let mut children = self.children(id);
        if direction == Direction::Previous {
            children.reverse();
        }
        children.into_iter().any(|child| self.try_focus(child, direction))
    }
}
