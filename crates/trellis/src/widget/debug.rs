//! Tree dumps for debugging.

use trellis_core::{DebugTree, TreeDebug, TreeFormatOptions};

use super::tree::{WidgetId, WidgetTree};

impl DebugTree for WidgetTree {
    type Node = WidgetId;

    fn node_name(&self, node: WidgetId) -> String {
        self.widget_name(node)
    }

    fn node_type(&self, node: WidgetId) -> String {
        self.type_name(node).unwrap_or("<destroyed>").to_string()
    }

    fn node_flags(&self, node: WidgetId) -> Vec<&'static str> {
        let Some(base) = self.base(node) else {
            return Vec::new();
        };
        [
            (!base.is_visible(), "hidden"),
            (!base.is_enabled(), "disabled"),
            (base.is_focused(), "focused"),
            (base.is_mouse_hover(), "hover"),
            (base.is_mouse_down(), "down"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
    }

    fn node_children(&self, node: WidgetId) -> Vec<WidgetId> {
        self.children(node)
    }
}

impl WidgetTree {
    /// Names, types and flags of the subtree below `root`, one widget per
    /// line.
    pub fn dump(&self, root: WidgetId) -> String {
        TreeDebug::with_options(TreeFormatOptions {
            show_ids: false,
            ..TreeFormatOptions::default()
        })
        .format_subtree(self, root)
    }
}

#[cfg(test)]
mod tests {
    use super::super::widgets::{Button, Panel};
    use super::*;

    #[test]
    fn test_dump_shows_names_types_and_flags() {
        let mut tree = WidgetTree::new();
        let panel = tree.insert(Panel::new());
        let ok = tree.insert(Button::new("OK"));
        let cancel = tree.insert(Button::new("Cancel"));
        tree.add(panel, ok, "ok").unwrap();
        tree.add(panel, cancel, "cancel").unwrap();
        tree.set_enabled(cancel, false);
        tree.set_focused(ok, true);

        let dump = tree.dump(panel);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "(unnamed) (Panel) {focused}");
        assert!(lines[1].ends_with("ok (Button) {focused}"));
        assert!(lines[2].ends_with("cancel (Button) {disabled}"));
    }
}
