//! Deferred tree mutations.
//!
//! Widget hooks and signal slots only see their own state, never the tree.
//! When they need the tree to do something (move the widget, open a
//! dropdown, grab focus) they push a [`TreeRequest`] into the shared
//! [`RequestQueue`]. The tree drains the queue before the [`Gui`](crate::Gui)
//! returns from `handle_event` or `update`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use trellis_render::{Point, Size};

use super::WidgetId;

/// A change a widget asks the tree to make on its behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeRequest {
    SetPosition(WidgetId, Point),
    SetSize(WidgetId, Size),
    /// Attach `overlay` to the root of `owner`, covering the whole root.
    /// When `content` is given it is placed at the owner's position plus
    /// `offset`, with `content_size` if provided.
    ShowOverlay {
        overlay: WidgetId,
        owner: WidgetId,
        content: Option<WidgetId>,
        offset: Point,
        content_size: Option<Size>,
    },
    /// Detach an overlay (or any widget) from its parent without destroying it.
    HideOverlay(WidgetId),
    Focus(WidgetId),
    Unfocus(WidgetId),
}

impl TreeRequest {
    /// The widget the request is about.
    pub fn target(&self) -> WidgetId {
        match self {
            Self::SetPosition(id, _)
            | Self::SetSize(id, _)
            | Self::HideOverlay(id)
            | Self::Focus(id)
            | Self::Unfocus(id) => *id,
            Self::ShowOverlay { overlay, .. } => *overlay,
        }
    }
}

/// FIFO of pending requests, shared between the tree and signal slots.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    inner: Arc<Mutex<VecDeque<TreeRequest>>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, request: TreeRequest) {
        self.inner.lock().push_back(request);
    }

    pub(crate) fn pop(&self) -> Option<TreeRequest> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_queue_is_fifo_and_shared() {
        let mut ids: SlotMap<WidgetId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());

        let queue = RequestQueue::new();
        let clone = queue.clone();
        clone.push(TreeRequest::Focus(a));
        queue.push(TreeRequest::HideOverlay(b));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|r| r.target()), Some(a));
        assert_eq!(clone.pop(), Some(TreeRequest::HideOverlay(b)));
        assert!(queue.is_empty());
    }
}
