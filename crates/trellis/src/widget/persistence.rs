//! Saved widget trees and the widget type registry.
//!
//! A saved widget is a [`DataNode`]: its type name, string properties and
//! child nodes. The text format that stores node trees on disk is up to the
//! host; `DataNode` derives serde traits so any serde format works.
//!
//! [`WidgetRegistry`] maps type names back to factories so that
//! [`WidgetTree::load`](super::WidgetTree::load) can recreate widgets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use trellis_core::logging::targets;

use super::WidgetId;
use super::layout::Layout2d;
use super::theme::{RendererData, RendererProperty, RendererValue};
use super::tree::WidgetTree;
use super::widgets::{Button, ChildWindow, ComboBox, EditBox, Label, ListBox, Panel, Popup, Slider};
use crate::error::{GuiError, Result};

/// Child node holding a widget's custom renderer.
pub const RENDERER_NODE: &str = "Renderer";
/// Child node wrapping a widget's tooltip.
pub const TOOL_TIP_NODE: &str = "ToolTip";

/// A keyed node: name, properties and ordered children.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DataNode>,
}

impl DataNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.properties.insert(key.into(), value.to_string());
    }

    /// Set a property using builder pattern.
    pub fn with_property(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.set_property(key, value);
        self
    }

    /// Parse a property, `Ok(None)` when it is absent.
    pub fn parse_property<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.property(key) {
            None => Ok(None),
            Some(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| GuiError::invalid_property(key, text)),
        }
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&DataNode> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Creates a detached widget in the tree.
pub type WidgetFactory = Arc<dyn Fn(&mut WidgetTree) -> WidgetId + Send + Sync>;

/// Type name → factory.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    factories: HashMap<String, WidgetFactory>,
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("WidgetRegistry").field("types", &names).finish()
    }
}

impl WidgetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in widget type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("Panel", |tree| tree.insert(Panel::new()));
        registry.register("ChildWindow", |tree| tree.insert(ChildWindow::new("")));
        registry.register("Button", |tree| tree.insert(Button::new("")));
        registry.register("Label", |tree| tree.insert(Label::new("")));
        registry.register("EditBox", |tree| tree.insert(EditBox::new()));
        registry.register("Slider", |tree| tree.insert(Slider::new(0.0, 10.0)));
        registry.register("ListBox", |tree| tree.insert(ListBox::new()));
        registry.register("ComboBox", ComboBox::create);
        registry.register("Popup", |tree| tree.insert(Popup::new()));
        registry
    }

    /// Register or replace a factory.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&mut WidgetTree) -> WidgetId + Send + Sync + 'static,
    {
        self.factories.insert(type_name.into(), Arc::new(factory));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn factory(&self, type_name: &str) -> Result<WidgetFactory> {
        self.factories
            .get(type_name)
            .cloned()
            .ok_or_else(|| GuiError::UnknownWidgetType(type_name.to_string()))
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// =============================================================================
// Save and load
// =============================================================================

impl WidgetTree {
    /// Save a widget with its children, tooltip and custom renderer.
    ///
    /// Overlays that are only attached while shown (dropdowns, tooltips)
    /// are skipped as children; their owners recreate them.
    pub fn save(&self, id: WidgetId) -> Result<DataNode> {
        let node = self.nodes.get(id).ok_or(GuiError::InvalidHandle(id))?;
        let mut data = DataNode::new(node.behavior.type_name());

        let name = self.widget_name(id);
        if !name.is_empty() {
            data.set_property("Name", name);
        }
        data.set_property("Position", &node.base.position);
        data.set_property("Size", &node.base.size);
        if !node.base.visible {
            data.set_property("Visible", false);
        }
        if !node.base.enabled {
            data.set_property("Enabled", false);
        }
        node.behavior.save(&mut data);

        if node.base.custom_renderer {
            let mut renderer = DataNode::new(RENDERER_NODE);
            for (property, value) in node.base.renderer().properties() {
                renderer.set_property(property.name(), value);
            }
            data.children.push(renderer);
        }
        if let Some(tip) = node.base.tool_tip {
            let mut wrapper = DataNode::new(TOOL_TIP_NODE);
            wrapper.children.push(self.save(tip)?);
            data.children.push(wrapper);
        }

        for child in self.children(id) {
            if self.base(child).is_some_and(|base| base.owner.is_some()) {
                continue;
            }
            data.children.push(self.save(child)?);
        }
        Ok(data)
    }

    /// Recreate a saved widget tree. The returned widget is detached.
    ///
    /// Widgets are created and attached first and their geometry is applied
    /// afterwards, so layouts may refer to siblings saved later. On error
    /// every widget created so far is destroyed.
    pub fn load(&mut self, data: &DataNode) -> Result<WidgetId> {
        let mut created = Vec::new();
        let result = self.create_from(data, &mut created).and_then(|root| {
            for (id, node) in &created {
                self.apply_geometry(*id, node)?;
            }
            Ok(root)
        });
        if let Err(err) = &result {
            tracing::warn!(target: targets::GUI, %err, widget = %data.name, "loading widget failed");
            for (id, _) in created.iter().rev() {
                self.destroy(*id);
            }
        }
        result
    }

    /// Copy a widget through save and load. Signal connections are not
    /// copied; the copy is detached.
    pub fn duplicate(&mut self, id: WidgetId) -> Result<WidgetId> {
        let data = self.save(id)?;
        self.load(&data)
    }

    /// The factories [`load`](Self::load) creates widgets with.
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Make a custom widget type loadable.
    pub fn register_widget_type<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&mut WidgetTree) -> WidgetId + Send + Sync + 'static,
    {
        self.registry.register(type_name, factory);
    }

    fn create_from<'a>(
        &mut self,
        data: &'a DataNode,
        created: &mut Vec<(WidgetId, &'a DataNode)>,
    ) -> Result<WidgetId> {
        let factory = self.registry.factory(&data.name)?;
        let id = factory(self);
        created.push((id, data));

        if let Some(visible) = data.parse_property("Visible")? {
            self.set_visible(id, visible);
        }
        if let Some(enabled) = data.parse_property("Enabled")? {
            self.set_enabled(id, enabled);
        }
        if let Some(renderer) = data.child(RENDERER_NODE) {
            let bag = RendererData::new();
            for (key, value) in &renderer.properties {
                let property = RendererProperty::from_name(key)
                    .ok_or_else(|| GuiError::invalid_property(key.as_str(), value.as_str()))?;
                bag.set(property, RendererValue::parse(value)?);
            }
            self.set_renderer(id, bag);
        }
        if let Some(tip) = data.child(TOOL_TIP_NODE).and_then(|wrapper| wrapper.children.first()) {
            let tip = self.create_from(tip, created)?;
            self.set_tool_tip(id, Some(tip))?;
        }

        let node = self.nodes.get_mut(id).ok_or(GuiError::InvalidHandle(id))?;
        node.behavior.load(data)?;

        for child in &data.children {
            if child.name == RENDERER_NODE || child.name == TOOL_TIP_NODE {
                continue;
            }
            let child_id = self.create_from(child, created)?;
            self.add(id, child_id, child.property("Name").unwrap_or_default())?;
        }
        Ok(id)
    }

    fn apply_geometry(&mut self, id: WidgetId, data: &DataNode) -> Result<()> {
        if let Some(text) = data.property("Position") {
            self.set_position(id, Layout2d::parse(text)?)?;
        }
        if let Some(text) = data.property("Size") {
            self.set_size(id, Layout2d::parse(text)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        let node = DataNode::new("Button")
            .with_property("Visible", true)
            .with_property("Value", "abc");

        assert_eq!(node.parse_property::<bool>("Visible").unwrap(), Some(true));
        assert_eq!(node.parse_property::<bool>("Enabled").unwrap(), None);
        assert!(matches!(
            node.parse_property::<f32>("Value"),
            Err(GuiError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn test_serde_skips_empty_fields() {
        let node = DataNode::new("Panel");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"name":"Panel"}"#);
        let back: DataNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = WidgetRegistry::with_defaults();
        assert!(registry.contains("ComboBox"));
        assert!(registry.type_names().contains(&"Slider"));
        assert!(matches!(
            registry.factory("Knob"),
            Err(GuiError::UnknownWidgetType(name)) if name == "Knob"
        ));

        let mut tree = WidgetTree::new();
        let button = registry.factory("Button").unwrap()(&mut tree);
        assert_eq!(tree.type_name(button), Some("Button"));
    }
}
