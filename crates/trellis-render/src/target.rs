//! The drawing interface consumed by widgets.
//!
//! A backend implements [`RenderTarget`]; widgets draw in their own local
//! coordinates and the tree translates and clips between them. Backends can
//! reuse [`RenderStateStack`] for the save/restore bookkeeping.

use std::ops::{Deref, DerefMut};

use crate::text::{GlyphMetrics, TextStyle};
use crate::transform::{Transform2D, TransformStack};
use crate::types::{Color, Point, Rect};

/// The 2D drawing interface.
///
/// # State Stack
///
/// `save`/`restore` push and pop the transform, clip and opacity together.
/// Prefer [`ClipScope`] over calling them by hand so the stack stays balanced
/// on every return path.
pub trait RenderTarget {
    /// Save the current render state (transform, clip, opacity).
    fn save(&mut self);

    /// Restore the previously saved render state.
    fn restore(&mut self);

    /// Get the current transform.
    fn transform(&self) -> Transform2D;

    /// Apply a translation to the current transform.
    fn translate(&mut self, offset: Point);

    /// Intersect the clip region with `rect` (in local coordinates).
    fn clip_rect(&mut self, rect: Rect);

    /// Current clip bounds in target coordinates, if any.
    fn clip_bounds(&self) -> Option<Rect>;

    /// Multiply the current opacity.
    fn set_opacity(&mut self, opacity: f32);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Outline a rectangle.
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);

    /// Draw a single line of text with its top-left corner at `position`.
    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle);

    /// Glyph metrics used to measure text for this target.
    fn metrics(&self) -> &dyn GlyphMetrics;
}

/// Complete render state at a point in time.
#[derive(Debug, Clone, Copy)]
pub struct RenderState {
    /// Clip rect in target coordinates.
    pub clip: Option<Rect>,
    /// Accumulated opacity.
    pub opacity: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            clip: None,
            opacity: 1.0,
        }
    }
}

/// Reusable save/restore bookkeeping for [`RenderTarget`] implementations.
#[derive(Debug, Clone, Default)]
pub struct RenderStateStack {
    transforms: TransformStack,
    states: Vec<RenderState>,
    current: RenderState,
}

impl RenderStateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &RenderState {
        &self.current
    }

    pub fn save(&mut self) {
        self.transforms.save();
        self.states.push(self.current);
    }

    /// Restore the last saved state. An unbalanced restore is ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.states.pop() {
            self.transforms.restore();
            self.current = state;
        }
    }

    pub fn transform(&self) -> Transform2D {
        *self.transforms.current()
    }

    pub fn translate(&mut self, offset: Point) {
        self.transforms.translate(offset.x, offset.y);
    }

    /// Intersect the clip with a local rect. A disjoint clip becomes an
    /// empty rect so that everything afterwards is clipped away.
    pub fn clip_rect(&mut self, rect: Rect) {
        let rect = self.transforms.current().transform_rect(&rect);
        self.current.clip = Some(match self.current.clip {
            Some(existing) => existing.intersect(&rect).unwrap_or(Rect::ZERO),
            None => rect,
        });
    }

    pub fn clip_bounds(&self) -> Option<Rect> {
        self.current.clip
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.current.opacity *= opacity.clamp(0.0, 1.0);
    }

    /// Number of saved states.
    pub fn depth(&self) -> usize {
        self.states.len()
    }
}

/// RAII guard that saves the target state, translates and clips, and
/// restores the state when dropped.
///
/// Scopes nest: a scope derefs to the target so an inner scope can be
/// opened on it, and each drop pops exactly the level it pushed.
pub struct ClipScope<'a> {
    target: &'a mut dyn RenderTarget,
}

impl<'a> ClipScope<'a> {
    /// Enter a child area at `origin` with the given clip size.
    pub fn new(target: &'a mut dyn RenderTarget, area: Rect) -> Self {
        target.save();
        target.translate(area.origin);
        target.clip_rect(Rect::from_origin_size(Point::ZERO, area.size));
        Self { target }
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.target.restore();
    }
}

impl<'a> Deref for ClipScope<'a> {
    type Target = dyn RenderTarget + 'a;

    fn deref(&self) -> &Self::Target {
        self.target
    }
}

impl<'a> DerefMut for ClipScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.target
    }
}
