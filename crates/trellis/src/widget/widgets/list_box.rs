//! Selectable list of text items.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::{ErasedSignal, Signal};
use trellis_render::{Point, Rect, RenderTarget};

use super::{content_rect, draw_frame, load_items, save_items};
use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::events::{Key, KeyEvent};
use crate::widget::persistence::DataNode;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};

/// Default row height.
pub const DEFAULT_ITEM_HEIGHT: f32 = 20.0;

/// Items and selection of a list, shareable between widgets.
///
/// A [`ComboBox`](super::ComboBox) and the list box in its dropdown share
/// one model, so the dropdown always shows the combo box's items.
#[derive(Debug, Default)]
pub struct ListModel {
    pub items: Vec<String>,
    pub selected: Option<usize>,
}

impl ListModel {
    pub fn selected_item(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.items.get(index))
            .map(String::as_str)
    }

    /// Remove an item, keeping the selection on the same item if it
    /// survives.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        true
    }
}

/// A vertical list of items with a single selection.
///
/// Clicking an item or moving with Up/Down selects it. The wheel scrolls
/// when there are more items than fit.
///
/// # Signals
///
/// - `item_selected`: the user selected an item. Carries its index and
///   text. Changing the selection from code does not emit.
#[derive(Debug)]
pub struct ListBox {
    model: Arc<Mutex<ListModel>>,
    item_height: f32,
    scroll: usize,
    hovered: Option<usize>,
    pub item_selected: Signal<(usize, String)>,
}

impl Default for ListBox {
    fn default() -> Self {
        Self::new()
    }
}

impl ListBox {
    pub fn new() -> Self {
        Self::with_model(Arc::new(Mutex::new(ListModel::default())))
    }

    /// A list box showing a shared model.
    pub fn with_model(model: Arc<Mutex<ListModel>>) -> Self {
        Self {
            model,
            item_height: DEFAULT_ITEM_HEIGHT,
            scroll: 0,
            hovered: None,
            item_selected: Signal::new(),
        }
    }

    pub fn model(&self) -> Arc<Mutex<ListModel>> {
        self.model.clone()
    }

    pub fn add_item(&mut self, item: impl Into<String>) {
        self.model.lock().items.push(item.into());
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        self.model.lock().remove(index)
    }

    pub fn remove_all_items(&mut self) {
        let mut model = self.model.lock();
        model.items.clear();
        model.selected = None;
        self.scroll = 0;
    }

    pub fn items(&self) -> Vec<String> {
        self.model.lock().items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.model.lock().items.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.model.lock().selected
    }

    pub fn selected_item(&self) -> Option<String> {
        self.model.lock().selected_item().map(str::to_string)
    }

    /// Select an item without emitting. Out-of-range indices deselect.
    pub fn set_selected_index(&mut self, index: Option<usize>) {
        let mut model = self.model.lock();
        let count = model.items.len();
        model.selected = index.filter(|index| *index < count);
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    pub fn set_item_height(&mut self, item_height: f32) {
        self.item_height = item_height.max(1.0);
    }

    /// Index of the first visible row.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Height that shows `rows` items without scrolling.
    pub fn height_for_rows(&self, rows: usize, borders: f32) -> f32 {
        rows as f32 * self.item_height + 2.0 * borders
    }

    fn visible_rows(&self, base: &WidgetBase) -> usize {
        (content_rect(base).height() / self.item_height).floor().max(1.0) as usize
    }

    fn item_at(&self, base: &WidgetBase, pos: Point) -> Option<usize> {
        let content = content_rect(base);
        if !content.contains(pos) {
            return None;
        }
        let row = ((pos.y - content.top()) / self.item_height) as usize;
        let index = self.scroll + row;
        (index < self.item_count()).then_some(index)
    }

    /// Select from user input and emit `item_selected` if it changed.
    fn select(&mut self, base: &WidgetBase, index: usize) {
        let text = {
            let mut model = self.model.lock();
            if model.selected == Some(index) {
                return;
            }
            let Some(text) = model.items.get(index).cloned() else {
                return;
            };
            model.selected = Some(index);
            text
        };
        self.scroll_into_view(base, index);
        self.item_selected.emit((index, text));
    }

    fn scroll_into_view(&mut self, base: &WidgetBase, index: usize) {
        let rows = self.visible_rows(base);
        if index < self.scroll {
            self.scroll = index;
        } else if index >= self.scroll + rows {
            self.scroll = index + 1 - rows;
        }
    }
}

impl Widget for ListBox {
    fn type_name(&self) -> &'static str {
        "ListBox"
    }

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        if let Some(index) = self.item_at(ctx.base(), pos) {
            self.select(ctx.base(), index);
        }
    }

    fn mouse_moved(&mut self, ctx: &mut EventContext<'_>, pos: Point) {
        self.hovered = self.item_at(ctx.base(), pos);
    }

    fn mouse_left(&mut self, _ctx: &mut EventContext<'_>) {
        self.hovered = None;
    }

    fn mouse_wheel_scrolled(&mut self, ctx: &mut EventContext<'_>, delta: f32, _pos: Point) -> bool {
        let max_scroll = self.item_count().saturating_sub(self.visible_rows(ctx.base()));
        let before = self.scroll;
        let lines = delta.abs().round().max(1.0) as usize;
        self.scroll = if delta > 0.0 {
            self.scroll.saturating_sub(lines)
        } else {
            (self.scroll + lines).min(max_scroll)
        };
        self.scroll != before
    }

    fn key_pressed(&mut self, ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        let count = self.item_count();
        if count == 0 {
            return false;
        }
        let selected = self.selected_index();
        let index = match event.key {
            Key::Up => selected.map_or(0, |index| index.saturating_sub(1)),
            Key::Down => selected.map_or(0, |index| (index + 1).min(count - 1)),
            Key::Home => 0,
            Key::End => count - 1,
            _ => return false,
        };
        self.select(ctx.base(), index);
        true
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        draw_frame(base, target, base.color(RendererProperty::BackgroundColor));

        let content = content_rect(base);
        let style = base.text_style();
        let model = self.model.lock();
        let rows = self.visible_rows(base);
        for (row, (index, item)) in model.items.iter().enumerate().skip(self.scroll).take(rows).enumerate() {
            let y = content.top() + row as f32 * self.item_height;
            let row_rect = Rect::new(content.left(), y, content.width(), self.item_height);
            let mut row_style = style.clone();
            if model.selected == Some(index) {
                target.fill_rect(row_rect, base.color(RendererProperty::SelectedBackgroundColor));
                row_style.color = base.color(RendererProperty::SelectedTextColor);
            } else if self.hovered == Some(index) {
                target.fill_rect(row_rect, base.color(RendererProperty::BackgroundColorHover));
            }
            target.draw_text(item, Point::new(content.left() + 2.0, y), &row_style);
        }
    }

    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        name.eq_ignore_ascii_case("ItemSelected")
            .then_some(&self.item_selected as &dyn ErasedSignal)
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &["ItemSelected"]
    }

    fn save(&self, node: &mut DataNode) {
        let model = self.model.lock();
        save_items(node, "Items", &model.items);
        if let Some(selected) = model.selected {
            node.set_property("SelectedItemIndex", selected);
        }
        node.set_property("ItemHeight", self.item_height);
    }

    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        if let Some(height) = node.parse_property("ItemHeight")? {
            self.set_item_height(height);
        }
        let mut model = self.model.lock();
        if let Some(items) = load_items(node, "Items")? {
            model.items = items;
        }
        let count = model.items.len();
        model.selected = node
            .parse_property::<usize>("SelectedItemIndex")?
            .filter(|index| *index < count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::tree::WidgetTree;

    fn list_with(tree: &mut WidgetTree, items: &[&str]) -> crate::widget::WidgetId {
        let mut list = ListBox::new();
        for item in items {
            list.add_item(*item);
        }
        let id = tree.insert(list);
        // Borders 1 and five 20px rows.
        tree.set_size(id, (100.0, 102.0)).unwrap();
        id
    }

    #[test]
    fn test_click_selects_and_emits() {
        let mut tree = WidgetTree::new();
        let list = list_with(&mut tree, &["a", "b", "c"]);
        let selected = Arc::new(Mutex::new(Vec::new()));
        let log = selected.clone();
        tree.get::<ListBox>(list)
            .unwrap()
            .item_selected
            .connect(move |(index, text)| log.lock().push(format!("{index}:{text}")));

        tree.left_mouse_pressed(list, Point::new(10.0, 25.0));
        tree.left_mouse_pressed(list, Point::new(10.0, 25.0));
        tree.left_mouse_pressed(list, Point::new(10.0, 90.0));

        assert_eq!(*selected.lock(), vec!["1:b".to_string()]);
        assert_eq!(tree.get::<ListBox>(list).unwrap().selected_item(), Some("b".to_string()));
    }

    #[test]
    fn test_keyboard_selection_scrolls() {
        let mut tree = WidgetTree::new();
        let items: Vec<String> = (0..8).map(|i| format!("item {i}")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let list = list_with(&mut tree, &refs);

        assert!(tree.key_pressed(list, &KeyEvent::new(Key::End)));
        let list_box = tree.get::<ListBox>(list).unwrap();
        assert_eq!(list_box.selected_index(), Some(7));
        assert_eq!(list_box.scroll(), 3);

        assert!(tree.mouse_wheel_scrolled(list, 1.0, Point::new(5.0, 5.0)));
        assert_eq!(tree.get::<ListBox>(list).unwrap().scroll(), 2);
    }

    #[test]
    fn test_remove_keeps_selection_on_item() {
        let mut model = ListModel {
            items: vec!["a".into(), "b".into(), "c".into()],
            selected: Some(2),
        };
        assert!(model.remove(0));
        assert_eq!(model.selected_item(), Some("c"));
        assert!(model.remove(1));
        assert_eq!(model.selected, None);
        assert!(!model.remove(5));
    }
}
