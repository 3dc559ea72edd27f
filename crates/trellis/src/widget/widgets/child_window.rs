//! Movable window inside the view.

use trellis_render::{Point, Rect, RenderTarget, Size};

use super::draw_frame;
use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::persistence::DataNode;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};

/// A container with a title bar that can be dragged around its parent.
///
/// The child area starts below the title bar and inside the borders. Child
/// windows are isolated focus groups: Tab cycles through their children
/// without leaving the window.
#[derive(Debug, Default)]
pub struct ChildWindow {
    title: String,
    /// Where the title bar was grabbed, in local coordinates.
    grab: Option<Point>,
}

impl ChildWindow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            grab: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    fn title_bar_height(base: &WidgetBase) -> f32 {
        base.renderer()
            .number(RendererProperty::TitleBarHeight)
            .unwrap_or(0.0)
            .max(0.0)
    }
}

impl Widget for ChildWindow {
    fn type_name(&self) -> &'static str {
        "ChildWindow"
    }

    fn is_container(&self) -> bool {
        true
    }

    fn isolated_focus_group(&self) -> bool {
        true
    }

    fn child_offset(&self, base: &WidgetBase) -> Point {
        let borders = base.borders();
        Point::new(borders, borders + Self::title_bar_height(base))
    }

    fn inner_size(&self, base: &WidgetBase) -> Size {
        let borders = base.borders();
        let size = base.size();
        Size::new(
            (size.width - 2.0 * borders).max(0.0),
            (size.height - 2.0 * borders - Self::title_bar_height(base)).max(0.0),
        )
    }

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        let base = ctx.base();
        if pos.y < base.borders() + Self::title_bar_height(base) {
            self.grab = Some(pos);
        }
    }

    fn mouse_moved(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        let Some(grab) = self.grab else {
            return;
        };
        if !ctx.base().is_mouse_down() {
            self.grab = None;
            return;
        }
        let delta = pos - grab;
        if delta != Point::ZERO {
            ctx.request_position(ctx.base().position() + delta);
        }
    }

    fn mouse_no_longer_down(&mut self, _ctx: &mut EventContext<'_>) {
        self.grab = None;
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        draw_frame(base, target, base.color(RendererProperty::BackgroundColor));

        let borders = base.borders();
        let title_bar = Rect::new(
            borders,
            borders,
            (base.size().width - 2.0 * borders).max(0.0),
            Self::title_bar_height(base),
        );
        if !title_bar.is_empty() {
            target.fill_rect(title_bar, base.color(RendererProperty::TitleBarColor));
            target.draw_text(
                &self.title,
                Point::new(title_bar.left() + 4.0, title_bar.top()),
                &base.text_style(),
            );
        }
    }

    fn save(&self, node: &mut DataNode) {
        node.set_property("Title", &self.title);
    }

    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        if let Some(title) = node.property("Title") {
            self.title = title.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::tree::WidgetTree;
    use crate::widget::widgets::{Button, Panel};

    #[test]
    fn test_child_area_excludes_title_bar() {
        let mut tree = WidgetTree::new();
        let window = tree.insert(ChildWindow::new("Settings"));
        tree.set_size(window, (200.0, 150.0)).unwrap();

        // Built-in theme: borders 1, title bar 20.
        assert_eq!(tree.child_offset(window), Point::new(1.0, 21.0));
        assert_eq!(tree.inner_size(window), Size::new(198.0, 128.0));
    }

    #[test]
    fn test_title_bar_drag_moves_window() {
        let mut tree = WidgetTree::new();
        let root = tree.insert(Panel::new());
        let window = tree.insert(ChildWindow::new("Drag me"));
        tree.set_size(root, (800.0, 600.0)).unwrap();
        tree.add(root, window, "window").unwrap();
        tree.set_position(window, (100.0, 100.0)).unwrap();
        tree.set_size(window, (200.0, 150.0)).unwrap();

        tree.left_mouse_pressed(root, Point::new(110.0, 105.0));
        assert!(tree.get::<ChildWindow>(window).unwrap().is_dragging());
        tree.mouse_moved(root, Point::new(160.0, 125.0));
        tree.process_requests();
        assert_eq!(tree.position(window), Point::new(150.0, 120.0));

        tree.process_mouse_release(root, Point::new(160.0, 125.0));
        assert!(!tree.get::<ChildWindow>(window).unwrap().is_dragging());
    }

    #[test]
    fn test_press_in_child_area_does_not_drag() {
        let mut tree = WidgetTree::new();
        let window = tree.insert(ChildWindow::new(""));
        let button = tree.insert(Button::new("OK"));
        tree.set_size(window, (200.0, 150.0)).unwrap();
        tree.add(window, button, "ok").unwrap();
        tree.set_size(button, (50.0, 20.0)).unwrap();

        tree.left_mouse_pressed(window, Point::new(100.0, 100.0));
        assert!(!tree.get::<ChildWindow>(window).unwrap().is_dragging());
        assert!(tree.is_focused(window));

        tree.left_mouse_pressed(window, Point::new(10.0, 30.0));
        assert!(tree.is_focused(button));
    }
}
