//! Rendering interface for Trellis.
//!
//! This crate holds the geometry and color types shared by every Trellis
//! crate plus the small drawing interface widgets render through. Concrete
//! rasterization lives in a backend that implements [`RenderTarget`].
//!
//! # Drawing a Widget Area
//!
//! ```
//! use trellis_render::{ClipScope, Color, RecordingTarget, Rect, RenderTarget};
//!
//! let mut target = RecordingTarget::new();
//! {
//!     // Everything drawn through the scope is offset by (10, 10) and
//!     // clipped to a 50x20 box.
//!     let mut scope = ClipScope::new(&mut target, Rect::new(10.0, 10.0, 50.0, 20.0));
//!     scope.fill_rect(Rect::new(0.0, 0.0, 50.0, 20.0), Color::WHITE);
//! }
//! assert_eq!(target.depth(), 0);
//! assert_eq!(target.commands().len(), 1);
//! ```
//!
//! # Measuring Text
//!
//! ```
//! use trellis_render::{measure_text, FixedMetrics, Size};
//!
//! let metrics = FixedMetrics::default();
//! assert_eq!(measure_text(&metrics, "abcd", 10.0), Size::new(20.0, 12.5));
//! ```

mod recording;
mod target;
mod text;
mod transform;
mod types;

pub use recording::{DrawCommand, RecordingTarget};
pub use target::{ClipScope, RenderState, RenderStateStack, RenderTarget};
pub use text::{FixedMetrics, GlyphMetrics, TextStyle, char_index_at, measure_text, text_offset};
pub use transform::{Transform2D, TransformStack};
pub use types::{Color, Point, Rect, Size};
