//! A render target that records draw calls instead of rasterizing them.
//!
//! Useful for tests and for backends that replay a frame later. Commands are
//! stored in target coordinates with the active clip and opacity applied.

use crate::target::{RenderStateStack, RenderTarget};
use crate::text::{FixedMetrics, GlyphMetrics, TextStyle};
use crate::transform::Transform2D;
use crate::types::{Color, Point, Rect};

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
        clip: Option<Rect>,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
        clip: Option<Rect>,
    },
    Text {
        text: String,
        position: Point,
        style: TextStyle,
        clip: Option<Rect>,
    },
}

impl DrawCommand {
    /// The clip that was active when the command was recorded.
    pub fn clip(&self) -> Option<Rect> {
        match self {
            Self::FillRect { clip, .. } | Self::StrokeRect { clip, .. } | Self::Text { clip, .. } => {
                *clip
            }
        }
    }
}

/// A [`RenderTarget`] that records every draw call.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    state: RenderStateStack,
    metrics: FixedMetrics,
    commands: Vec<DrawCommand>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom fixed-pitch metrics for text measurement.
    pub fn with_metrics(metrics: FixedMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take all recorded commands, leaving the list empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current save depth; zero when every scope has been closed.
    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    /// Text of every recorded text command, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn to_target(&self, rect: Rect) -> Rect {
        self.state.transform().transform_rect(&rect)
    }
}

impl RenderTarget for RecordingTarget {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn transform(&self) -> Transform2D {
        self.state.transform()
    }

    fn translate(&mut self, offset: Point) {
        self.state.translate(offset);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip_rect(rect);
    }

    fn clip_bounds(&self) -> Option<Rect> {
        self.state.clip_bounds()
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.set_opacity(opacity);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let command = DrawCommand::FillRect {
            rect: self.to_target(rect),
            color: color.with_opacity(self.state.current().opacity),
            clip: self.state.clip_bounds(),
        };
        self.commands.push(command);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        let command = DrawCommand::StrokeRect {
            rect: self.to_target(rect),
            color: color.with_opacity(self.state.current().opacity),
            width,
            clip: self.state.clip_bounds(),
        };
        self.commands.push(command);
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        let mut style = style.clone();
        style.color = style.color.with_opacity(self.state.current().opacity);
        let command = DrawCommand::Text {
            text: text.to_owned(),
            position: self.state.transform().transform_point(position),
            style,
            clip: self.state.clip_bounds(),
        };
        self.commands.push(command);
    }

    fn metrics(&self) -> &dyn GlyphMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::ClipScope;

    fn draw_nested(target: &mut dyn RenderTarget, bail_early: bool) {
        let mut outer = ClipScope::new(target, Rect::new(10.0, 10.0, 100.0, 100.0));
        outer.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::BLACK);
        {
            let mut inner = ClipScope::new(&mut *outer, Rect::new(20.0, 20.0, 200.0, 200.0));
            inner.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::WHITE);
            if bail_early {
                return;
            }
        }
        outer.fill_rect(Rect::new(1.0, 1.0, 1.0, 1.0), Color::BLACK);
    }

    #[test]
    fn test_nested_scopes_translate_and_clip() {
        let mut target = RecordingTarget::new();
        draw_nested(&mut target, false);

        let commands = target.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[1],
            DrawCommand::FillRect {
                rect: Rect::new(30.0, 30.0, 5.0, 5.0),
                color: Color::WHITE,
                clip: Some(Rect::new(30.0, 30.0, 80.0, 80.0)),
            }
        );
        assert_eq!(commands[2].clip(), Some(Rect::new(10.0, 10.0, 100.0, 100.0)));
        assert_eq!(target.depth(), 0);
    }

    #[test]
    fn test_early_return_restores_state() {
        let mut target = RecordingTarget::new();
        draw_nested(&mut target, true);
        assert_eq!(target.commands().len(), 2);
        assert_eq!(target.depth(), 0);
        assert!(target.clip_bounds().is_none());
    }

    #[test]
    fn test_opacity_applies_to_colors() {
        let mut target = RecordingTarget::new();
        target.save();
        target.set_opacity(0.5);
        target.draw_text("hi", Point::new(1.0, 2.0), &TextStyle::default());
        target.restore();
        target.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK);

        assert_eq!(target.texts(), vec!["hi"]);
        match &target.commands()[0] {
            DrawCommand::Text { style, .. } => assert_eq!(style.color.a, 128),
            other => panic!("unexpected command {other:?}"),
        }
        match &target.commands()[1] {
            DrawCommand::FillRect { color, .. } => assert_eq!(color.a, 255),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
