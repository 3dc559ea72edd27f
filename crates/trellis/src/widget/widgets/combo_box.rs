//! Combo box widget.
//!
//! A combo box shows the selected item and opens a dropdown list when
//! pressed. The dropdown is a [`ListBox`] inside a [`Popup`]; both are
//! created and owned by the combo box, and the popup is added to the root
//! container as an overlay while open, so it draws above every other widget
//! and a click anywhere else closes it.
//!
//! # Example
//!
//! ```
//! use trellis::widget::WidgetTree;
//! use trellis::widget::widgets::ComboBox;
//!
//! let mut tree = WidgetTree::new();
//! let combo = ComboBox::create(&mut tree);
//! let combo_box = tree.get_mut::<ComboBox>(combo).unwrap();
//! combo_box.add_item("Small");
//! combo_box.add_item("Large");
//! combo_box.set_selected_index(Some(1));
//! assert_eq!(combo_box.selected_item().as_deref(), Some("Large"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use trellis_core::logging::targets;
use trellis_core::{ErasedSignal, Signal};
use trellis_render::{Point, Rect, RenderTarget, Size};

use super::list_box::{DEFAULT_ITEM_HEIGHT, ListBox, ListModel};
use super::popup::Popup;
use super::{content_rect, draw_frame, load_items, save_items};
use crate::error::GuiError;
use crate::widget::base::WidgetBase;
use crate::widget::events::{Key, KeyEvent};
use crate::widget::persistence::DataNode;
use crate::widget::requests::TreeRequest;
use crate::widget::theme::RendererProperty;
use crate::widget::traits::{EventContext, Widget};
use crate::widget::tree::{WidgetId, WidgetTree};

/// Rows shown in the dropdown before it scrolls.
pub const DEFAULT_MAX_VISIBLE_ITEMS: usize = 6;

/// A button showing the selected item, with a dropdown list.
///
/// # Signals
///
/// - `item_selected`: the user picked an item, from the dropdown or with
///   Up/Down on the combo box. Carries its index and text.
#[derive(Debug)]
pub struct ComboBox {
    model: Arc<Mutex<ListModel>>,
    popup: WidgetId,
    list: WidgetId,
    open: Arc<AtomicBool>,
    max_visible_items: usize,
    pub item_selected: Arc<Signal<(usize, String)>>,
}

impl ComboBox {
    /// Create a combo box together with its dropdown popup and list.
    pub fn create(tree: &mut WidgetTree) -> WidgetId {
        let list_box = ListBox::new();
        let model = list_box.model();
        let list = tree.insert(list_box);
        let popup = tree.insert(Popup::new());
        if let Err(err) = tree.add(popup, list, "ListBox") {
            tracing::warn!(target: targets::CONTAINER, %err, "cannot attach dropdown list");
        }

        let open = Arc::new(AtomicBool::new(false));
        let item_selected = Arc::new(Signal::new());
        let requests = tree.requests().clone();

        if let Some(list_box) = tree.get::<ListBox>(list) {
            let open = open.clone();
            let item_selected = item_selected.clone();
            list_box.item_selected.connect(move |(index, text)| {
                if open.swap(false, Ordering::SeqCst) {
                    requests.push(TreeRequest::HideOverlay(popup));
                }
                item_selected.emit((*index, text.clone()));
            });
        }
        if let Some(popup_widget) = tree.get::<Popup>(popup) {
            let open = open.clone();
            popup_widget
                .closed
                .connect(move |_| open.store(false, Ordering::SeqCst));
        }

        let combo = tree.insert(ComboBox {
            model,
            popup,
            list,
            open,
            max_visible_items: DEFAULT_MAX_VISIBLE_ITEMS,
            item_selected,
        });
        if let Some(node) = tree.nodes.get_mut(popup) {
            node.base.owner = Some(combo);
        }
        combo
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

    pub fn max_visible_items(&self) -> usize {
        self.max_visible_items
    }

    pub fn set_max_visible_items(&mut self, count: usize) {
        self.max_visible_items = count.max(1);
    }

    /// Whether the dropdown is shown.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// The overlay container of the dropdown.
    pub fn popup(&self) -> WidgetId {
        self.popup
    }

    /// The list box inside the dropdown.
    pub fn list(&self) -> WidgetId {
        self.list
    }

    fn open_dropdown(&self, ctx: &EventContext<'_>) {
        let base = ctx.base();
        let size = base.size();
        let rows = self.item_count().clamp(1, self.max_visible_items);
        let height = rows as f32 * DEFAULT_ITEM_HEIGHT + 2.0 * base.borders();
        self.open.store(true, Ordering::SeqCst);
        ctx.show_overlay(
            self.popup,
            Some(self.list),
            Point::new(0.0, size.height),
            Some(Size::new(size.width, height)),
        );
    }

    fn select(&self, index: usize) {
        let text = {
            let mut model = self.model.lock();
            let Some(text) = model.items.get(index).cloned() else {
                return;
            };
            if model.selected == Some(index) {
                return;
            }
            model.selected = Some(index);
            text
        };
        self.item_selected.emit((index, text));
    }
}

impl Widget for ComboBox {
    fn type_name(&self) -> &'static str {
        "ComboBox"
    }

    fn left_mouse_pressed(&mut self, ctx: &mut EventContext<'_>, _pos: Point) {
        if self.open.swap(false, Ordering::SeqCst) {
            ctx.hide_overlay(self.popup);
        } else {
            self.open_dropdown(ctx);
        }
    }

    fn key_pressed(&mut self, ctx: &mut EventContext<'_>, event: &KeyEvent) -> bool {
        // The dropdown does not take focus, so Escape arrives here.
        if event.key == Key::Escape && self.open.swap(false, Ordering::SeqCst) {
            ctx.hide_overlay(self.popup);
            return true;
        }
        let count = self.item_count();
        if count == 0 {
            return false;
        }
        let selected = self.selected_index();
        let index = match event.key {
            Key::Up => selected.map_or(0, |index| index.saturating_sub(1)),
            Key::Down => selected.map_or(0, |index| (index + 1).min(count - 1)),
            _ => return false,
        };
        self.select(index);
        true
    }

    fn draw(&self, base: &WidgetBase, target: &mut dyn RenderTarget) {
        draw_frame(base, target, base.color(RendererProperty::BackgroundColor));

        let content = content_rect(base);
        if let Some(text) = self.selected_item() {
            target.draw_text(&text, Point::new(content.left() + 2.0, content.top()), &base.text_style());
        }
        // Arrow box on the right.
        let arrow = content.height().min(content.width());
        target.fill_rect(
            Rect::new(content.right() - arrow, content.top(), arrow, arrow),
            base.color(RendererProperty::BorderColor),
        );
    }

    fn signal(&self, name: &str) -> Option<&dyn ErasedSignal> {
        name.eq_ignore_ascii_case("ItemSelected")
            .then_some(&*self.item_selected as &dyn ErasedSignal)
    }

    fn signal_names(&self) -> &'static [&'static str] {
        &["ItemSelected"]
    }

    fn owned_widgets(&self) -> Vec<WidgetId> {
        vec![self.popup, self.list]
    }

    fn save(&self, node: &mut DataNode) {
        let model = self.model.lock();
        save_items(node, "Items", &model.items);
        if let Some(selected) = model.selected {
            node.set_property("SelectedItemIndex", selected);
        }
        node.set_property("MaximumItems", self.max_visible_items);
    }

    fn load(&mut self, node: &DataNode) -> Result<(), GuiError> {
        if let Some(count) = node.parse_property("MaximumItems")? {
            self.set_max_visible_items(count);
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

    #[test]
    fn test_create_builds_owned_dropdown() {
        let mut tree = WidgetTree::new();
        let combo = ComboBox::create(&mut tree);
        let combo_box = tree.get::<ComboBox>(combo).unwrap();
        let (popup, list) = (combo_box.popup(), combo_box.list());

        assert_eq!(tree.parent(list), Some(popup));
        assert_eq!(tree.parent(popup), None);
        assert_eq!(tree.base(popup).unwrap().owner(), Some(combo));

        tree.destroy(combo);
        assert!(!tree.contains(popup));
        assert!(!tree.contains(list));
    }

    #[test]
    fn test_dropdown_shares_items() {
        let mut tree = WidgetTree::new();
        let combo = ComboBox::create(&mut tree);
        let list = tree.get::<ComboBox>(combo).unwrap().list();
        tree.get_mut::<ComboBox>(combo).unwrap().add_item("One");
        assert_eq!(tree.get::<ListBox>(list).unwrap().items(), vec!["One".to_string()]);
    }

    #[test]
    fn test_arrow_keys_select() {
        let mut tree = WidgetTree::new();
        let combo = ComboBox::create(&mut tree);
        {
            let combo_box = tree.get_mut::<ComboBox>(combo).unwrap();
            combo_box.add_item("a");
            combo_box.add_item("b");
        }
        let picked = Arc::new(Mutex::new(Vec::new()));
        let log = picked.clone();
        tree.get::<ComboBox>(combo)
            .unwrap()
            .item_selected
            .connect(move |(index, _)| log.lock().push(*index));

        assert!(tree.key_pressed(combo, &KeyEvent::new(Key::Down)));
        assert!(tree.key_pressed(combo, &KeyEvent::new(Key::Down)));
        assert!(tree.key_pressed(combo, &KeyEvent::new(Key::Down)));
        assert_eq!(*picked.lock(), vec![0, 1]);
    }
}
