//! Glyph metrics and text measurement.
//!
//! Shaping and rasterization belong to the backend. The widget layer only
//! needs per-glyph advances, kerning and line spacing to lay text out.

use crate::types::{Color, Size};

/// Style for a single run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font family name, or `None` for the backend default.
    pub font: Option<String>,
    /// Character size in view units.
    pub size: f32,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size: 13.0,
            color: Color::BLACK,
        }
    }
}

/// Glyph metrics provided by a font backend.
pub trait GlyphMetrics {
    /// Horizontal advance of `ch` at the given character size.
    fn advance(&self, ch: char, size: f32) -> f32;

    /// Kerning adjustment between two consecutive characters.
    fn kerning(&self, _first: char, _second: char, _size: f32) -> f32 {
        0.0
    }

    /// Distance between two baselines.
    fn line_spacing(&self, size: f32) -> f32;
}

/// Metrics for a fixed-pitch font, used when no backend font is available
/// and by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    /// Advance as a fraction of the character size.
    pub advance_ratio: f32,
    /// Line spacing as a fraction of the character size.
    pub line_ratio: f32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            line_ratio: 1.25,
        }
    }
}

impl GlyphMetrics for FixedMetrics {
    fn advance(&self, ch: char, size: f32) -> f32 {
        match ch {
            '\n' => 0.0,
            '\t' => size * self.advance_ratio * 4.0,
            _ => size * self.advance_ratio,
        }
    }

    fn line_spacing(&self, size: f32) -> f32 {
        size * self.line_ratio
    }
}

/// Width of the first `count` characters of a single line.
pub fn text_offset(metrics: &dyn GlyphMetrics, text: &str, size: f32, count: usize) -> f32 {
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars().take(count) {
        if let Some(prev) = previous {
            width += metrics.kerning(prev, ch, size);
        }
        width += metrics.advance(ch, size);
        previous = Some(ch);
    }
    width
}

/// Measure a possibly multi-line string.
pub fn measure_text(metrics: &dyn GlyphMetrics, text: &str, size: f32) -> Size {
    if text.is_empty() {
        return Size::ZERO;
    }
    let mut width: f32 = 0.0;
    let mut lines = 0;
    for line in text.split('\n') {
        width = width.max(text_offset(metrics, line, size, usize::MAX));
        lines += 1;
    }
    Size::new(width, metrics.line_spacing(size) * lines as f32)
}

/// Index of the character boundary closest to `x` on a single line.
pub fn char_index_at(metrics: &dyn GlyphMetrics, text: &str, size: f32, x: f32) -> usize {
    let mut offset = 0.0;
    let mut previous = None;
    for (index, ch) in text.chars().enumerate() {
        if let Some(prev) = previous {
            offset += metrics.kerning(prev, ch, size);
        }
        let advance = metrics.advance(ch, size);
        if x < offset + advance / 2.0 {
            return index;
        }
        offset += advance;
        previous = Some(ch);
    }
    text.chars().count()
}
