//! 2D transformations and transform stack.
//!
//! Widgets only ever translate and scale, so the transform is an axis-aligned
//! affine map: `p' = p * scale + offset`.

use crate::types::{Point, Rect};

/// An axis-aligned 2D transform (scale followed by translation).
///
/// ```
/// use trellis_render::{Point, Transform2D};
///
/// let transform = Transform2D::translate(10.0, 5.0).then(&Transform2D::scale(2.0, 2.0));
/// // Scale applies first, then the translation of the outer transform.
/// assert_eq!(transform.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 7.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    scale: Point,
    offset: Point,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        scale: Point::new(1.0, 1.0),
        offset: Point::ZERO,
    };

    /// A pure translation.
    #[inline]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            scale: Point::new(1.0, 1.0),
            offset: Point::new(tx, ty),
        }
    }

    /// A pure (possibly non-uniform) scale.
    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            scale: Point::new(sx, sy),
            offset: Point::ZERO,
        }
    }

    /// Compose two transforms. The result first applies `other`, then `self`.
    #[inline]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            scale: Point::new(self.scale.x * other.scale.x, self.scale.y * other.scale.y),
            offset: self.transform_point(other.offset),
        }
    }

    /// Apply a translation inside this transform's coordinate system.
    #[inline]
    pub fn translated(&self, tx: f32, ty: f32) -> Self {
        self.then(&Self::translate(tx, ty))
    }

    /// Transform a point.
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale.x + self.offset.x,
            p.y * self.scale.y + self.offset.y,
        )
    }

    /// Transform a rectangle.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let a = self.transform_point(Point::new(rect.left(), rect.top()));
        let b = self.transform_point(Point::new(rect.right(), rect.bottom()));
        Rect::new(a.x.min(b.x), a.y.min(b.y), (b.x - a.x).abs(), (b.y - a.y).abs())
    }

    /// Compute the inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        if self.scale.x.abs() < 1e-10 || self.scale.y.abs() < 1e-10 {
            return None;
        }
        let scale = Point::new(1.0 / self.scale.x, 1.0 / self.scale.y);
        Some(Self {
            scale,
            offset: Point::new(-self.offset.x * scale.x, -self.offset.y * scale.y),
        })
    }

    /// The translation component.
    #[inline]
    pub fn translation(&self) -> Point {
        self.offset
    }

    /// Check if this is the identity transform.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// A stack of transforms for save/restore functionality.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    stack: Vec<Transform2D>,
    current: Transform2D,
}

impl TransformStack {
    /// Create a new transform stack with identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> &Transform2D {
        &self.current
    }

    /// Save the current transform state.
    #[inline]
    pub fn save(&mut self) {
        self.stack.push(self.current);
    }

    /// Restore the previously saved transform state.
    ///
    /// Does nothing if the stack is empty.
    #[inline]
    pub fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.current = transform;
        }
    }

    /// Get the current stack depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Apply a translation.
    #[inline]
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.current = self.current.translated(tx, ty);
    }

    /// Apply a transform on top of the current transform.
    #[inline]
    pub fn concat(&mut self, transform: &Transform2D) {
        self.current = self.current.then(transform);
    }

    /// Transform a point using the current transform.
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        self.current.transform_point(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_and_invert() {
        let transform = Transform2D::translate(100.0, 50.0).then(&Transform2D::scale(2.0, 4.0));
        let p = transform.transform_point(Point::new(5.0, 5.0));
        assert_eq!(p, Point::new(110.0, 70.0));

        let inverse = transform.inverse().unwrap();
        assert_eq!(inverse.transform_point(p), Point::new(5.0, 5.0));
        assert!(Transform2D::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_stack_save_restore() {
        let mut stack = TransformStack::new();
        stack.translate(10.0, 10.0);
        stack.save();
        stack.translate(5.0, 0.0);
        assert_eq!(stack.transform_point(Point::ZERO), Point::new(15.0, 10.0));
        assert_eq!(stack.depth(), 1);

        stack.restore();
        assert_eq!(stack.transform_point(Point::ZERO), Point::new(10.0, 10.0));

        // Unbalanced restore is ignored.
        stack.restore();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.transform_point(Point::ZERO), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_transform_rect() {
        let transform = Transform2D::scale(2.0, 2.0).translated(1.0, 1.0);
        let rect = transform.transform_rect(&Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(rect, Rect::new(2.0, 2.0, 20.0, 10.0));
    }
}
