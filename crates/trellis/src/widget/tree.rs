//! The widget arena.
//!
//! [`WidgetTree`] owns every widget. Widgets are addressed by [`WidgetId`]
//! handles; parent links, hover and focus references are handles too, so a
//! destroyed widget can never be reached through a stale pointer. All soft
//! references to a widget are cleared in [`WidgetTree::remove`], and every
//! lookup checks liveness.
//!
//! This file holds the hierarchy, geometry and flag operations. Input
//! dispatch lives in `dispatcher.rs`, focus cycling in `focus.rs` and
//! save/load in `persistence.rs`.

use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use trellis_core::logging::targets;
use trellis_core::{ConnectionId, ErasedSignal, SignalError};
use trellis_render::{ClipScope, Point, Rect, RenderTarget, Size};

use super::base::WidgetBase;
use super::layout::{
    BindProperty, BindTarget, Layout, Layout2d, LayoutComponent, LayoutGraph, LayoutResolver, Slot,
};
use super::persistence::WidgetRegistry;
use super::requests::{RequestQueue, TreeRequest};
use super::theme::{RendererData, Theme};
use super::traits::{EventContext, Widget};
use crate::error::{GuiError, LayoutError, Result};

new_key_type! {
    /// Handle to a widget in a [`WidgetTree`].
    pub struct WidgetId;
}

/// Upper bound on requests handled in one [`WidgetTree::process_requests`]
/// call, so that widgets re-queueing each other cannot hang the host.
const MAX_REQUESTS_PER_FLUSH: usize = 4096;

/// Dispatch bookkeeping of a container node.
#[derive(Debug, Default)]
pub(crate) struct ContainerState {
    /// Children in paint order with their names.
    pub(crate) children: Vec<(WidgetId, String)>,
    pub(crate) widget_below_mouse: Option<WidgetId>,
    pub(crate) focused_widget: Option<WidgetId>,
    pub(crate) isolated_focus_group: bool,
}

impl ContainerState {
    fn new(isolated_focus_group: bool) -> Self {
        Self {
            isolated_focus_group,
            ..Self::default()
        }
    }

    pub(crate) fn ids(&self) -> Vec<WidgetId> {
        self.children.iter().map(|(id, _)| *id).collect()
    }

    pub(crate) fn index_of(&self, id: WidgetId) -> Option<usize> {
        self.children.iter().position(|(child, _)| *child == id)
    }
}

pub(crate) struct Node {
    pub(crate) base: WidgetBase,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) container: Option<ContainerState>,
    pub(crate) behavior: Box<dyn Widget>,
}

impl Node {
    pub(crate) fn behavior(&self) -> &dyn Widget {
        &*self.behavior
    }
}

/// Owner of all widgets and of the layout dependency graph.
pub struct WidgetTree {
    pub(crate) nodes: SlotMap<WidgetId, Node>,
    pub(crate) graph: LayoutGraph,
    pub(crate) requests: RequestQueue,
    pub(crate) registry: WidgetRegistry,
    theme: Theme,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WidgetTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetTree")
            .field("widgets", &self.nodes.len())
            .field("pending_requests", &self.requests.len())
            .finish_non_exhaustive()
    }
}

impl WidgetTree {
    /// A tree using the built-in theme and widget registry.
    pub fn new() -> Self {
        Self::with_theme(Theme::builtin())
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            graph: LayoutGraph::new(),
            requests: RequestQueue::new(),
            registry: WidgetRegistry::with_defaults(),
            theme,
        }
    }

    // =========================================================================
    // Creation and lookup
    // =========================================================================

    /// Create a detached widget.
    pub fn insert<W: Widget>(&mut self, behavior: W) -> WidgetId {
        self.insert_boxed(Box::new(behavior))
    }

    pub fn insert_boxed(&mut self, behavior: Box<dyn Widget>) -> WidgetId {
        let type_name = behavior.type_name();
        let base = WidgetBase::new(self.theme.renderer_for(type_name));
        let container = behavior
            .is_container()
            .then(|| ContainerState::new(behavior.isolated_focus_group()));
        let id = self.nodes.insert(Node {
            base,
            parent: None,
            container,
            behavior,
        });
        tracing::trace!(target: targets::CONTAINER, ?id, type_name, "widget created");
        id
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn base(&self, id: WidgetId) -> Option<&WidgetBase> {
        self.nodes.get(id).map(|node| &node.base)
    }

    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.nodes.get(id).map(Node::behavior)
    }

    /// The behaviour of `id` as its concrete type.
    pub fn get<W: Widget>(&self, id: WidgetId) -> Option<&W> {
        self.nodes.get(id)?.behavior().as_any().downcast_ref()
    }

    pub fn get_mut<W: Widget>(&mut self, id: WidgetId) -> Option<&mut W> {
        let behavior: &mut dyn Widget = &mut *self.nodes.get_mut(id)?.behavior;
        behavior.as_any_mut().downcast_mut()
    }

    pub fn type_name(&self, id: WidgetId) -> Option<&'static str> {
        self.nodes.get(id).map(|node| node.behavior.type_name())
    }

    pub fn is_container(&self, id: WidgetId) -> bool {
        self.container(id).is_some()
    }

    pub(crate) fn container(&self, id: WidgetId) -> Option<&ContainerState> {
        self.nodes.get(id)?.container.as_ref()
    }

    pub(crate) fn container_mut(&mut self, id: WidgetId) -> Option<&mut ContainerState> {
        self.nodes.get_mut(id)?.container.as_mut()
    }

    /// Run a behaviour hook with its context.
    pub(crate) fn call_hook<R>(
        &mut self,
        id: WidgetId,
        hook: impl FnOnce(&mut dyn Widget, &mut EventContext<'_>) -> R,
    ) -> Option<R> {
        let node = self.nodes.get_mut(id)?;
        let mut ctx = EventContext::new(id, &node.base, &self.requests);
        Some(hook(node.behavior.as_mut(), &mut ctx))
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id)?.parent
    }

    /// Children in paint order. Empty for leaves and dead handles.
    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.container(id).map(ContainerState::ids).unwrap_or_default()
    }

    /// Name under which the widget was added, `""` when detached.
    pub fn widget_name(&self, id: WidgetId) -> String {
        self.parent(id)
            .and_then(|parent| self.container(parent))
            .and_then(|state| state.children.iter().find(|(child, _)| *child == id))
            .map(|(_, name)| name.clone())
            .unwrap_or_default()
    }

    /// Rename an attached widget. Returns false when detached.
    pub fn set_widget_name(&mut self, id: WidgetId, name: impl Into<String>) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let name = name.into();
        let Some(entry) = self
            .container_mut(parent)
            .and_then(|state| state.children.iter_mut().find(|(child, _)| *child == id))
        else {
            return false;
        };
        entry.1 = name.clone();
        self.rebind_waiting_siblings(parent, &name);
        true
    }

    /// Direct child with the given name.
    pub fn get_child(&self, container: WidgetId, name: &str) -> Option<WidgetId> {
        self.container(container)?
            .children
            .iter()
            .find(|(_, child_name)| child_name == name)
            .map(|(id, _)| *id)
    }

    /// Child with the given name: direct children first, then depth-first
    /// through child containers.
    pub fn get_recursive(&self, container: WidgetId, name: &str) -> Option<WidgetId> {
        self.get_child(container, name).or_else(|| {
            self.children(container)
                .into_iter()
                .filter(|child| self.is_container(*child))
                .find_map(|child| self.get_recursive(child, name))
        })
    }

    /// Topmost ancestor of `id` (itself when detached).
    pub fn root_of(&self, id: WidgetId) -> WidgetId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Append `child` to `container`. A child attached elsewhere is removed
    /// from its old parent first.
    pub fn add(&mut self, container: WidgetId, child: WidgetId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !self.contains(child) {
            return Err(GuiError::InvalidHandle(child));
        }
        if !self.contains(container) {
            return Err(GuiError::InvalidHandle(container));
        }
        if !self.is_container(container) {
            return Err(GuiError::NotAContainer(container));
        }
        if child == container || self.is_ancestor(child, container) {
            return Err(GuiError::WouldCreateCycle { container, child });
        }

        if self.parent(child).is_some() {
            self.remove(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(container);
        }
        if let Some(state) = self.container_mut(container) {
            state.children.push((child, name.clone()));
        }
        tracing::trace!(target: targets::CONTAINER, ?container, ?child, name = %name, "widget added");

        self.inherit_from_parent(child);
        self.rebind(child);
        if !name.is_empty() {
            self.rebind_waiting_siblings(container, &name);
        }
        Ok(())
    }

    /// Detach `child` from its parent. The widget stays alive.
    ///
    /// Returns false if it was not attached.
    pub fn remove(&mut self, child: WidgetId) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        let (hovered, focused) = self
            .container(parent)
            .map(|state| {
                (
                    state.widget_below_mouse == Some(child),
                    state.focused_widget == Some(child),
                )
            })
            .unwrap_or_default();

        if hovered {
            self.mouse_no_longer_on_widget(child);
            if let Some(state) = self.container_mut(parent) {
                state.widget_below_mouse = None;
            }
        }
        if focused {
            self.set_focused(child, false);
            if let Some(state) = self.container_mut(parent) {
                state.focused_widget = None;
            }
        }
        if let Some(state) = self.container_mut(parent) {
            state.children.retain(|(id, _)| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }

        self.detach_layouts(child);
        self.forget_sibling_references(parent, child);
        tracing::trace!(target: targets::CONTAINER, ?parent, ?child, "widget removed");
        true
    }

    /// Detach every child of `container`.
    pub fn remove_all(&mut self, container: WidgetId) {
        for child in self.children(container) {
            self.remove(child);
        }
    }

    /// Drop a widget. Its children are detached, not destroyed; its tooltip
    /// and owned widgets are destroyed with it.
    ///
    /// Layouts of other widgets that read this one keep their last value.
    pub fn destroy(&mut self, id: WidgetId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let mut owned = node.behavior.owned_widgets();
        owned.extend(node.base.tool_tip);

        self.remove(id);
        self.remove_all(id);
        self.graph.remove_widget(id);
        self.nodes.remove(id);
        tracing::trace!(target: targets::CONTAINER, ?id, "widget destroyed");

        for widget in owned {
            self.destroy(widget);
        }
        true
    }

    /// Draw the widget after all of its siblings.
    pub fn move_to_front(&mut self, id: WidgetId) -> bool {
        self.move_within_parent(id, |len| len - 1)
    }

    /// Draw the widget before all of its siblings.
    pub fn move_to_back(&mut self, id: WidgetId) -> bool {
        self.move_within_parent(id, |_| 0)
    }

    pub fn child_index(&self, id: WidgetId) -> Option<usize> {
        self.container(self.parent(id)?)?.index_of(id)
    }

    /// Move the widget to `index` in its parent's list. Fails for an index
    /// past the end.
    pub fn set_child_index(&mut self, id: WidgetId, index: usize) -> bool {
        let len = self
            .parent(id)
            .and_then(|parent| self.container(parent))
            .map_or(0, |state| state.children.len());
        if index >= len {
            return false;
        }
        self.move_within_parent(id, |_| index)
    }

    fn move_within_parent(&mut self, id: WidgetId, target: impl FnOnce(usize) -> usize) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(state) = self.container_mut(parent) else {
            return false;
        };
        let Some(from) = state.index_of(id) else {
            return false;
        };
        let entry = state.children.remove(from);
        let to = target(state.children.len() + 1).min(state.children.len());
        state.children.insert(to, entry);
        true
    }

    // =========================================================================
    // Geometry and layout
    // =========================================================================

    /// Resolved position relative to the parent's child area.
    /// `Point::ZERO` for a dead handle.
    pub fn position(&self, id: WidgetId) -> Point {
        self.base(id).map_or(Point::ZERO, WidgetBase::position)
    }

    /// Resolved size. `Size::ZERO` for a dead handle.
    pub fn size(&self, id: WidgetId) -> Size {
        self.base(id).map_or(Size::ZERO, WidgetBase::size)
    }

    pub fn set_position(&mut self, id: WidgetId, position: impl Into<Layout2d>) -> Result<()> {
        self.set_layout(id, LayoutComponent::Position, position.into())
    }

    pub fn set_size(&mut self, id: WidgetId, size: impl Into<Layout2d>) -> Result<()> {
        self.set_layout(id, LayoutComponent::Size, size.into())
    }

    /// Offset of the child area inside the widget.
    pub fn child_offset(&self, id: WidgetId) -> Point {
        self.nodes
            .get(id)
            .map_or(Point::ZERO, |node| node.behavior.child_offset(&node.base))
    }

    /// Size of the child area.
    pub fn inner_size(&self, id: WidgetId) -> Size {
        self.nodes
            .get(id)
            .map_or(Size::ZERO, |node| node.behavior.inner_size(&node.base))
    }

    /// Position in the coordinate space of the topmost ancestor's parent
    /// (view coordinates for widgets under a [`Gui`](crate::Gui)).
    pub fn absolute_position(&self, id: WidgetId) -> Point {
        let mut position = self.position(id);
        let mut current = self.parent(id);
        while let Some(parent) = current {
            position += self.position(parent) + self.child_offset(parent);
            current = self.parent(parent);
        }
        position
    }

    /// Absolute position of the child area's origin.
    pub fn absolute_child_origin(&self, id: WidgetId) -> Point {
        self.absolute_position(id) + self.child_offset(id)
    }

    fn layout(&self, id: WidgetId, component: LayoutComponent) -> Option<&Layout2d> {
        let base = self.base(id)?;
        Some(match component {
            LayoutComponent::Position => &base.position,
            LayoutComponent::Size => &base.size,
        })
    }

    fn layout_mut(&mut self, id: WidgetId, component: LayoutComponent) -> Option<&mut Layout2d> {
        let base = &mut self.nodes.get_mut(id)?.base;
        Some(match component {
            LayoutComponent::Position => &mut base.position,
            LayoutComponent::Size => &mut base.size,
        })
    }

    fn slot_value(&self, (id, component): Slot) -> Option<(f32, f32)> {
        self.layout(id, component).map(Layout2d::value)
    }

    fn set_layout(&mut self, id: WidgetId, component: LayoutComponent, mut layout: Layout2d) -> Result<()> {
        if !self.contains(id) {
            return Err(GuiError::InvalidHandle(id));
        }
        if let Some(name) = self.resolve_names(id, &mut layout) {
            if self.parent(id).is_some() {
                return Err(LayoutError::UnknownWidget(name).into());
            }
        }

        let before = self.slot_value((id, component));
        let Some(slot) = self.layout_mut(id, component) else {
            return Err(GuiError::InvalidHandle(id));
        };
        let previous = std::mem::replace(slot, layout);
        if let Err(err) = self.bind((id, component)) {
            if let Some(slot) = self.layout_mut(id, component) {
                *slot = previous;
            }
            return Err(err.into());
        }

        self.recompute((id, component));
        if self.slot_value((id, component)) != before {
            self.geometry_changed((id, component));
        }
        Ok(())
    }

    /// Resolve sibling names in `layout` against the parent of `id`.
    /// Returns the first name that could not be found.
    fn resolve_names(&self, id: WidgetId, layout: &mut Layout2d) -> Option<String> {
        let siblings: &[(WidgetId, String)] = self
            .parent(id)
            .and_then(|parent| self.container(parent))
            .map(|state| state.children.as_slice())
            .unwrap_or_default();
        let mut missing = None;
        layout.for_each_binding_mut(&mut |target| {
            if let BindTarget::Named { name, resolved } = target {
                *resolved = siblings
                    .iter()
                    .find(|(_, sibling)| *sibling == *name)
                    .map(|(sibling, _)| *sibling);
                if resolved.is_none() && missing.is_none() {
                    missing = Some(name.clone());
                }
            }
        });
        missing
    }

    /// Slots read by the layout of `slot`.
    fn layout_sources(&self, (id, component): Slot) -> Vec<Slot> {
        let Some(layout) = self.layout(id, component) else {
            return Vec::new();
        };
        let parent = self.parent(id);
        let mut sources = Vec::new();
        if let Some(parent) = parent
            && layout.uses_ratio()
        {
            sources.push((parent, LayoutComponent::Size));
        }
        layout.for_each_binding(&mut |target, property| match target {
            BindTarget::Parent => {
                if let Some(parent) = parent {
                    sources.push((parent, LayoutComponent::Size));
                }
            }
            BindTarget::Named { resolved: None, .. } => {}
            BindTarget::Named {
                resolved: Some(other),
                ..
            }
            | BindTarget::Widget(other) => {
                if property.reads_position() {
                    sources.push((*other, LayoutComponent::Position));
                }
                if property.reads_size() {
                    sources.push((*other, LayoutComponent::Size));
                }
            }
        });
        sources
    }

    fn bind(&mut self, slot: Slot) -> std::result::Result<(), LayoutError> {
        let sources = self.layout_sources(slot);
        self.graph
            .set_sources(slot, sources)
            .map_err(|_| LayoutError::Cycle {
                widget: slot.0,
                property: slot.1.name(),
            })
    }

    /// Re-evaluate one slot. Returns true if its value changed.
    fn recompute(&mut self, (id, component): Slot) -> bool {
        let Some(mut layout) = self.layout(id, component).cloned() else {
            return false;
        };
        let changed = layout.update(&TreeResolver { tree: self, owner: id });
        if changed && let Some(slot) = self.layout_mut(id, component) {
            *slot = layout;
        }
        changed
    }

    /// Emit the change signal of `slot` and bring every dependent up to date.
    fn geometry_changed(&mut self, slot: Slot) {
        self.emit_geometry_signal(slot);
        self.propagate(slot);
    }

    /// Re-evaluate everything that reads `slot`, without signalling `slot`
    /// itself.
    fn propagate(&mut self, slot: Slot) {
        let order = self.graph.propagation_order(slot);
        if !order.is_empty() {
            tracing::trace!(target: targets::LAYOUT, source = ?slot, dependents = order.len(), "propagating layout change");
        }
        for dependent in order {
            if self.recompute(dependent) {
                self.emit_geometry_signal(dependent);
            }
        }
    }

    fn emit_geometry_signal(&self, (id, component): Slot) {
        let Some(base) = self.base(id) else {
            return;
        };
        match component {
            LayoutComponent::Position => base.signals().position_changed.emit(base.position()),
            LayoutComponent::Size => base.signals().size_changed.emit(base.size()),
        }
    }

    /// Re-resolve names, re-register and re-evaluate both layouts after the
    /// widget was attached or renamed around.
    fn rebind(&mut self, id: WidgetId) {
        for component in [LayoutComponent::Position, LayoutComponent::Size] {
            let Some(mut layout) = self.layout(id, component).cloned() else {
                return;
            };
            if let Some(name) = self.resolve_names(id, &mut layout) {
                tracing::warn!(target: targets::LAYOUT, ?id, name = %name, "layout refers to an unknown sibling; value frozen");
            }
            if let Some(slot) = self.layout_mut(id, component) {
                *slot = layout;
            }
            if let Err(err) = self.bind((id, component)) {
                tracing::warn!(target: targets::LAYOUT, ?id, %err, "layout binding rejected; value frozen");
            }
            let before = self.slot_value((id, component));
            self.recompute((id, component));
            if self.slot_value((id, component)) != before {
                self.geometry_changed((id, component));
            }
        }
    }

    /// Siblings whose layouts name `name` but could not resolve it yet.
    fn rebind_waiting_siblings(&mut self, container: WidgetId, name: &str) {
        let waiting: Vec<WidgetId> = self
            .children(container)
            .into_iter()
            .filter(|sibling| {
                let mut waits = false;
                if let Some(base) = self.base(*sibling) {
                    for layout in [&base.position, &base.size] {
                        layout.for_each_binding(&mut |target, _| {
                            if let BindTarget::Named {
                                name: wanted,
                                resolved,
                            } = target
                            {
                                waits |= wanted == name && resolved.is_none_or(|id| !self.contains(id));
                            }
                        });
                    }
                }
                waits
            })
            .collect();
        for sibling in waiting {
            self.rebind(sibling);
        }
    }

    /// Drop the parent and sibling edges of a widget that left its parent,
    /// keeping its current values.
    fn detach_layouts(&mut self, id: WidgetId) {
        for component in [LayoutComponent::Position, LayoutComponent::Size] {
            if let Some(layout) = self.layout_mut(id, component) {
                layout.for_each_binding_mut(&mut |target| {
                    if let BindTarget::Named { resolved, .. } = target {
                        *resolved = None;
                    }
                });
            }
            if self.bind((id, component)).is_err() {
                self.graph.clear_sources((id, component));
            }
        }
    }

    /// Siblings that referred to `removed` by name stop following it.
    fn forget_sibling_references(&mut self, parent: WidgetId, removed: WidgetId) {
        for sibling in self.children(parent) {
            for component in [LayoutComponent::Position, LayoutComponent::Size] {
                let mut touched = false;
                if let Some(layout) = self.layout_mut(sibling, component) {
                    layout.for_each_binding_mut(&mut |target| {
                        if let BindTarget::Named { resolved, .. } = target
                            && *resolved == Some(removed)
                        {
                            *resolved = None;
                            touched = true;
                        }
                    });
                }
                if touched && self.bind((sibling, component)).is_err() {
                    self.graph.clear_sources((sibling, component));
                }
            }
        }
    }

    // =========================================================================
    // Flags and focus
    // =========================================================================

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.base(id).is_some_and(WidgetBase::is_visible)
    }

    pub fn is_enabled(&self, id: WidgetId) -> bool {
        self.base(id).is_some_and(WidgetBase::is_enabled)
    }

    pub fn is_focused(&self, id: WidgetId) -> bool {
        self.base(id).is_some_and(WidgetBase::is_focused)
    }

    /// Show or hide a widget. Hiding unfocuses it and clears its hover.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.base.visible == visible {
            return;
        }
        let parent = node.parent;
        if !visible {
            self.set_focused(id, false);
            if let Some(parent) = parent
                && self
                    .container(parent)
                    .is_some_and(|state| state.widget_below_mouse == Some(id))
            {
                self.mouse_no_longer_on_widget(id);
                if let Some(state) = self.container_mut(parent) {
                    state.widget_below_mouse = None;
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.visible = visible;
            node.base.signals().visibility_changed.emit(visible);
        }
    }

    /// Enable or disable a widget. Disabling clears hover and press state and
    /// unfocuses it; enabling does not restore hover.
    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.base.enabled == enabled {
            return;
        }
        node.base.enabled = enabled;
        if !enabled {
            node.base.mouse_down = false;
            let parent = node.parent;
            self.set_focused(id, false);
            self.mouse_no_longer_on_widget(id);
            if let Some(state) = parent.and_then(|parent| self.container_mut(parent))
                && state.widget_below_mouse == Some(id)
            {
                state.widget_below_mouse = None;
            }
        }
    }

    /// Focus or unfocus a widget.
    ///
    /// Focusing requires the widget to be visible, enabled and willing
    /// ([`Widget::can_gain_focus`]). The parent is told first, so a
    /// previously focused sibling is unfocused before this widget's
    /// `focused` signal fires, and the chain up to the root gets focused.
    pub fn set_focused(&mut self, id: WidgetId, focused: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.base.focused == focused {
            return;
        }

        if focused {
            if !(node.base.enabled && node.base.visible && node.behavior.can_gain_focus()) {
                return;
            }
            if let Some(parent) = node.parent {
                self.child_widget_focused(parent, id);
            }
            let Some(node) = self.nodes.get_mut(id) else {
                return;
            };
            node.base.focused = true;
            tracing::debug!(target: targets::FOCUS, ?id, type_name = node.behavior.type_name(), "focused");
            node.base.signals().focused.emit(());
            self.call_hook(id, |widget, ctx| widget.focus_changed(ctx, true));
        } else {
            let parent = node.parent;
            if let Some(node) = self.nodes.get_mut(id) {
                node.base.focused = false;
                tracing::debug!(target: targets::FOCUS, ?id, type_name = node.behavior.type_name(), "unfocused");
                node.base.signals().unfocused.emit(());
            }
            self.call_hook(id, |widget, ctx| widget.focus_changed(ctx, false));

            if let Some(child) = self.container_mut(id).and_then(|state| state.focused_widget.take()) {
                self.set_focused(child, false);
            }
            if let Some(parent) = parent
                && let Some(state) = self.container_mut(parent)
                && state.focused_widget == Some(id)
            {
                state.focused_widget = None;
            }
        }
    }

    /// A child of `container` gained focus.
    fn child_widget_focused(&mut self, container: WidgetId, child: WidgetId) {
        let previous = self.container(container).and_then(|state| state.focused_widget);
        if previous != Some(child) {
            if let Some(previous) = previous {
                self.set_focused(previous, false);
            }
            if let Some(state) = self.container_mut(container) {
                state.focused_widget = Some(child);
            }
        }
        if !self.is_focused(container) {
            self.set_focused(container, true);
        }
    }

    /// The focused child of a container, if it is still focused.
    pub fn focused_child(&self, container: WidgetId) -> Option<WidgetId> {
        self.container(container)?
            .focused_widget
            .filter(|child| self.is_focused(*child))
    }

    /// The hovered child of a container.
    pub fn widget_below_mouse(&self, container: WidgetId) -> Option<WidgetId> {
        self.container(container)?
            .widget_below_mouse
            .filter(|child| self.contains(*child))
    }

    /// Attach a tooltip widget. The tooltip is owned by `id`: a replaced
    /// tooltip is destroyed, and so is the tooltip when `id` is destroyed.
    pub fn set_tool_tip(&mut self, id: WidgetId, tool_tip: Option<WidgetId>) -> Result<()> {
        if !self.contains(id) {
            return Err(GuiError::InvalidHandle(id));
        }
        if let Some(tip) = tool_tip {
            if !self.contains(tip) {
                return Err(GuiError::InvalidHandle(tip));
            }
            if tip == id || self.is_ancestor(tip, id) {
                return Err(GuiError::WouldCreateCycle {
                    container: id,
                    child: tip,
                });
            }
            self.remove(tip);
            if let Some(node) = self.nodes.get_mut(tip) {
                node.base.owner = Some(id);
            }
        }
        let previous = self
            .nodes
            .get_mut(id)
            .and_then(|node| std::mem::replace(&mut node.base.tool_tip, tool_tip));
        if let Some(previous) = previous
            && Some(previous) != tool_tip
        {
            self.destroy(previous);
        }
        Ok(())
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// String-keyed signal lookup: base signals first, then the widget's own.
    pub fn signal(&self, id: WidgetId, name: &str) -> Result<&dyn ErasedSignal> {
        let node = self.nodes.get(id).ok_or(GuiError::InvalidHandle(id))?;
        node.base
            .signals()
            .by_name(name)
            .or_else(|| node.behavior.signal(name))
            .ok_or_else(|| {
                SignalError::UnknownSignal {
                    name: name.to_string(),
                    type_name: node.behavior.type_name().to_string(),
                }
                .into()
            })
    }

    /// Connect a payload-free slot to a signal by name.
    pub fn connect<F>(&self, id: WidgetId, name: &str, slot: F) -> Result<ConnectionId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Ok(self.signal(id, name)?.connect_unit(Box::new(slot)))
    }

    /// Disconnect a connection made on any signal of the widget.
    pub fn disconnect(&self, id: WidgetId, connection: ConnectionId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        node.base
            .signals()
            .all()
            .into_iter()
            .chain(
                node.behavior
                    .signal_names()
                    .iter()
                    .filter_map(|name| node.behavior.signal(name)),
            )
            .any(|signal| signal.disconnect(connection))
    }

    // =========================================================================
    // Theme and renderer
    // =========================================================================

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut Theme {
        &mut self.theme
    }

    /// Replace the theme. Widgets without a custom renderer switch to the
    /// new theme's sections.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        let ids: Vec<WidgetId> = self.nodes.keys().collect();
        for id in ids {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.base.custom_renderer {
                continue;
            }
            let renderer = self.theme.renderer_for(node.behavior.type_name());
            if let Some(node) = self.nodes.get_mut(id) {
                node.base.set_renderer(renderer, false);
            }
        }
        self.apply_renderer_changes();
    }

    pub fn renderer(&self, id: WidgetId) -> Option<&RendererData> {
        self.base(id).map(WidgetBase::renderer)
    }

    /// Give a widget its own renderer bag instead of the theme section.
    pub fn set_renderer(&mut self, id: WidgetId, renderer: RendererData) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.base.set_renderer(renderer, true);
        self.apply_renderer_changes();
        true
    }

    /// Deliver pending renderer changes to the widgets and push inherited
    /// opacity and font down to children.
    pub fn apply_renderer_changes(&mut self) {
        let ids: Vec<WidgetId> = self.nodes.keys().collect();
        for id in ids {
            let changes = match self.nodes.get(id) {
                Some(node) => node.base.take_renderer_changes(),
                None => continue,
            };
            let mut inherited = false;
            let mut geometry = false;
            for property in changes {
                inherited |= property.is_inherited();
                geometry |= property.affects_geometry();
                self.call_hook(id, |widget, ctx| widget.renderer_changed(ctx, property));
            }
            if inherited {
                self.push_inherited(id);
            }
            // Child layouts read the inner size, which the size slot stands for.
            if geometry {
                self.propagate((id, LayoutComponent::Size));
            }
        }
    }

    fn inherit_from_parent(&mut self, child: WidgetId) {
        let Some(parent) = self.parent(child).and_then(|parent| self.base(parent)) else {
            return;
        };
        let (opacity, font) = (parent.opacity(), parent.font());
        if let Some(node) = self.nodes.get_mut(child) {
            node.base.inherited_opacity = opacity;
            node.base.inherited_font = font;
        }
        self.push_inherited(child);
    }

    fn push_inherited(&mut self, container: WidgetId) {
        for child in self.children(container) {
            self.inherit_from_parent(child);
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Queue shared with hooks and signal slots.
    pub fn requests(&self) -> &RequestQueue {
        &self.requests
    }

    /// Apply queued requests and renderer changes until both are drained.
    pub fn process_requests(&mut self) {
        let mut budget = MAX_REQUESTS_PER_FLUSH;
        loop {
            self.apply_renderer_changes();
            let Some(request) = self.requests.pop() else {
                break;
            };
            if budget == 0 {
                tracing::warn!(target: targets::GUI, "request queue keeps refilling; deferring the rest");
                self.requests.push(request);
                break;
            }
            budget -= 1;
            self.apply_request(request);
        }
    }

    fn apply_request(&mut self, request: TreeRequest) {
        if !self.contains(request.target()) {
            tracing::warn!(target: targets::GUI, ?request, "request for a destroyed widget ignored");
            return;
        }
        tracing::trace!(target: targets::GUI, ?request, "applying request");
        match request {
            TreeRequest::SetPosition(id, position) => {
                if let Err(err) = self.set_position(id, position) {
                    tracing::warn!(target: targets::GUI, ?id, %err, "position request failed");
                }
            }
            TreeRequest::SetSize(id, size) => {
                if let Err(err) = self.set_size(id, size) {
                    tracing::warn!(target: targets::GUI, ?id, %err, "size request failed");
                }
            }
            TreeRequest::ShowOverlay {
                overlay,
                owner,
                content,
                offset,
                content_size,
            } => self.show_overlay(overlay, owner, content, offset, content_size),
            TreeRequest::HideOverlay(id) => {
                if self.remove(id) {
                    tracing::debug!(target: targets::GUI, ?id, "overlay hidden");
                }
            }
            TreeRequest::Focus(id) => self.set_focused(id, true),
            TreeRequest::Unfocus(id) => self.set_focused(id, false),
        }
    }

    fn show_overlay(
        &mut self,
        overlay: WidgetId,
        owner: WidgetId,
        content: Option<WidgetId>,
        offset: Point,
        content_size: Option<Size>,
    ) {
        if !self.contains(owner) {
            tracing::warn!(target: targets::GUI, ?owner, "overlay owner no longer exists");
            return;
        }
        let root = self.root_of(owner);
        if let Err(err) = self.add(root, overlay, "") {
            tracing::warn!(target: targets::GUI, ?overlay, %err, "cannot show overlay");
            return;
        }
        let fill = Layout2d::new(Layout::ratio(1.0), Layout::ratio(1.0));
        let placed = self
            .set_position(overlay, Point::ZERO)
            .and_then(|()| self.set_size(overlay, fill));
        if let Err(err) = placed {
            tracing::warn!(target: targets::GUI, ?overlay, %err, "cannot place overlay");
        }
        if let Some(content) = content {
            let origin = self.absolute_position(owner) - self.absolute_child_origin(root) + offset;
            let mut placed = self.set_position(content, origin);
            if let Some(size) = content_size {
                placed = placed.and_then(|()| self.set_size(content, size));
            }
            if let Err(err) = placed {
                tracing::warn!(target: targets::GUI, ?content, %err, "cannot place overlay content");
            }
        }
        tracing::debug!(target: targets::GUI, ?overlay, ?owner, "overlay shown");
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Draw `id` and its visible descendants. Each widget is drawn inside a
    /// clip scope covering its bounds, children inside a nested scope
    /// covering the child area.
    pub fn draw(&self, id: WidgetId, target: &mut dyn RenderTarget) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.base.visible {
            return;
        }
        let mut scope = ClipScope::new(target, node.base.bounds());
        if let Some(opacity) = node.base.own_opacity() {
            scope.set_opacity(opacity);
        }
        node.behavior.draw(&node.base, &mut *scope);

        if let Some(state) = &node.container {
            let area = Rect::from_origin_size(
                node.behavior.child_offset(&node.base),
                node.behavior.inner_size(&node.base),
            );
            let mut inner = ClipScope::new(&mut *scope, area);
            for (child, _) in &state.children {
                self.draw(*child, &mut *inner);
            }
        }
    }

    /// Advance time-based widget state. Returns true if anything asked for a
    /// redraw.
    pub fn update_time(&mut self, id: WidgetId, elapsed: Duration) -> bool {
        let mut changed = self
            .call_hook(id, |widget, ctx| widget.update_time(ctx, elapsed))
            .unwrap_or(false);
        for child in self.children(id) {
            changed |= self.update_time(child, elapsed);
        }
        changed
    }
}

/// Reads geometry for a layout owned by `owner`.
struct TreeResolver<'a> {
    tree: &'a WidgetTree,
    owner: WidgetId,
}

impl LayoutResolver for TreeResolver<'_> {
    fn parent_inner_size(&self) -> Option<Size> {
        let parent = self.tree.parent(self.owner)?;
        Some(self.tree.inner_size(parent))
    }

    fn property(&self, target: &BindTarget, property: BindProperty) -> Option<f32> {
        match target {
            BindTarget::Parent => {
                let inner = self.parent_inner_size()?;
                Some(property.of(Point::ZERO, inner))
            }
            BindTarget::Named {
                resolved: Some(id), ..
            }
            | BindTarget::Widget(id) => {
                let base = self.tree.base(*id)?;
                Some(property.of(base.position(), base.size()))
            }
            BindTarget::Named { resolved: None, .. } => None,
        }
    }
}
