//! Renderer properties and themes.
//!
//! Every widget holds a [`RendererData`]: a shared bag of typed appearance
//! values. By default the bag is the theme section for the widget's type, so
//! changing a property in the theme restyles every widget that uses it.
//! Widgets are told about changes through
//! [`Widget::renderer_changed`](super::Widget::renderer_changed) the next time
//! the tree processes its pending work.
//!
//! Property names exist only as a string façade for persistence; code uses
//! the [`RendererProperty`] enum.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::Signal;
use trellis_core::logging::targets;
use trellis_render::Color;

use crate::error::GuiError;

/// A themable appearance property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RendererProperty {
    BackgroundColor,
    BackgroundColorHover,
    BackgroundColorDisabled,
    TextColor,
    TextColorHover,
    TextColorDisabled,
    BorderColor,
    /// Border thickness.
    Borders,
    SelectedBackgroundColor,
    SelectedTextColor,
    TitleBarColor,
    TitleBarHeight,
    /// Opacity in `0..=1`; inherited by children that do not set their own.
    Opacity,
    /// Font family; inherited by children that do not set their own.
    Font,
    TextSize,
    CaretColor,
    ThumbColor,
    TrackColor,
}

impl RendererProperty {
    /// All properties, in declaration order.
    pub const ALL: [RendererProperty; 18] = [
        Self::BackgroundColor,
        Self::BackgroundColorHover,
        Self::BackgroundColorDisabled,
        Self::TextColor,
        Self::TextColorHover,
        Self::TextColorDisabled,
        Self::BorderColor,
        Self::Borders,
        Self::SelectedBackgroundColor,
        Self::SelectedTextColor,
        Self::TitleBarColor,
        Self::TitleBarHeight,
        Self::Opacity,
        Self::Font,
        Self::TextSize,
        Self::CaretColor,
        Self::ThumbColor,
        Self::TrackColor,
    ];

    /// Name used in saved widget files.
    pub fn name(self) -> &'static str {
        match self {
            Self::BackgroundColor => "BackgroundColor",
            Self::BackgroundColorHover => "BackgroundColorHover",
            Self::BackgroundColorDisabled => "BackgroundColorDisabled",
            Self::TextColor => "TextColor",
            Self::TextColorHover => "TextColorHover",
            Self::TextColorDisabled => "TextColorDisabled",
            Self::BorderColor => "BorderColor",
            Self::Borders => "Borders",
            Self::SelectedBackgroundColor => "SelectedBackgroundColor",
            Self::SelectedTextColor => "SelectedTextColor",
            Self::TitleBarColor => "TitleBarColor",
            Self::TitleBarHeight => "TitleBarHeight",
            Self::Opacity => "Opacity",
            Self::Font => "Font",
            Self::TextSize => "TextSize",
            Self::CaretColor => "CaretColor",
            Self::ThumbColor => "ThumbColor",
            Self::TrackColor => "TrackColor",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|property| property.name().eq_ignore_ascii_case(name))
    }

    /// Whether children pick the value up from their parent.
    pub fn is_inherited(self) -> bool {
        matches!(self, Self::Opacity | Self::Font)
    }

    /// Whether the value changes the child area of a container.
    pub fn affects_geometry(self) -> bool {
        matches!(self, Self::Borders | Self::TitleBarHeight)
    }
}

impl fmt::Display for RendererProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed renderer value.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererValue {
    Color(Color),
    Number(f32),
    Bool(bool),
    Text(String),
}

impl RendererValue {
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Parse the textual form written by `Display`: `#rrggbb[aa]`, `true`,
    /// `false`, a quoted string or a number.
    pub fn parse(text: &str) -> Result<Self, GuiError> {
        let text = text.trim();
        if text.starts_with('#') {
            return Color::from_hex(text)
                .map(Self::Color)
                .ok_or_else(|| GuiError::invalid_property("renderer color", text));
        }
        if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            return Ok(Self::Text(inner.replace("\\\"", "\"")));
        }
        match text {
            "true" => Ok(Self::Bool(true)),
            "false" => Ok(Self::Bool(false)),
            _ => text
                .parse::<f32>()
                .map(Self::Number)
                .map_err(|_| GuiError::invalid_property("renderer value", text)),
        }
    }
}

impl fmt::Display for RendererValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(color) => write!(f, "{color}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "\"{}\"", text.replace('"', "\\\"")),
        }
    }
}

impl From<Color> for RendererValue {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<f32> for RendererValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for RendererValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for RendererValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

struct RendererInner {
    properties: Mutex<BTreeMap<RendererProperty, RendererValue>>,
    changed: Signal<RendererProperty>,
}

/// A shared, observable bag of renderer properties.
///
/// Cloning shares the bag; use [`RendererData::deep_clone`] for an
/// independent copy.
#[derive(Clone)]
pub struct RendererData {
    inner: Arc<RendererInner>,
}

impl Default for RendererData {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.properties.lock().iter())
            .finish()
    }
}

impl RendererData {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RendererInner {
                properties: Mutex::new(BTreeMap::new()),
                changed: Signal::new(),
            }),
        }
    }

    /// Set a property using builder pattern.
    pub fn with(self, property: RendererProperty, value: impl Into<RendererValue>) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property. Emits `changed` only when the value differs.
    pub fn set(&self, property: RendererProperty, value: impl Into<RendererValue>) {
        let value = value.into();
        let previous = self.inner.properties.lock().insert(property, value.clone());
        if previous.as_ref() != Some(&value) {
            tracing::trace!(target: targets::THEME, %property, %value, "renderer property set");
            self.inner.changed.emit(property);
        }
    }

    /// Remove a property. Emits `changed` if it was present.
    pub fn remove(&self, property: RendererProperty) -> Option<RendererValue> {
        let previous = self.inner.properties.lock().remove(&property);
        if previous.is_some() {
            self.inner.changed.emit(property);
        }
        previous
    }

    pub fn get(&self, property: RendererProperty) -> Option<RendererValue> {
        self.inner.properties.lock().get(&property).cloned()
    }

    pub fn contains(&self, property: RendererProperty) -> bool {
        self.inner.properties.lock().contains_key(&property)
    }

    pub fn color(&self, property: RendererProperty) -> Option<Color> {
        self.get(property).and_then(|value| value.as_color())
    }

    pub fn number(&self, property: RendererProperty) -> Option<f32> {
        self.get(property).and_then(|value| value.as_number())
    }

    pub fn text(&self, property: RendererProperty) -> Option<String> {
        self.get(property)
            .and_then(|value| value.as_text().map(str::to_string))
    }

    /// Snapshot of all properties.
    pub fn properties(&self) -> Vec<(RendererProperty, RendererValue)> {
        self.inner
            .properties
            .lock()
            .iter()
            .map(|(property, value)| (*property, value.clone()))
            .collect()
    }

    /// Emitted with the property whenever a value changes.
    pub fn changed(&self) -> &Signal<RendererProperty> {
        &self.inner.changed
    }

    /// An independent copy of the current values, with no subscribers.
    pub fn deep_clone(&self) -> Self {
        let copy = Self::new();
        *copy.inner.properties.lock() = self.inner.properties.lock().clone();
        copy
    }

    /// Whether both handles share the same bag.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Named renderer sections, one per widget type.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    sections: HashMap<String, RendererData>,
}

impl Theme {
    /// An empty theme. Widgets get empty sections created on demand.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in light theme.
    pub fn builtin() -> Self {
        use RendererProperty as P;

        let dark = Color::rgb(60, 60, 60);
        let border = Color::rgb(100, 100, 100);
        let mut theme = Self::new();

        theme.add_section(
            "Button",
            RendererData::new()
                .with(P::BackgroundColor, Color::rgb(245, 245, 245))
                .with(P::BackgroundColorHover, Color::WHITE)
                .with(P::BackgroundColorDisabled, Color::rgb(230, 230, 230))
                .with(P::TextColor, dark)
                .with(P::TextColorHover, Color::BLACK)
                .with(P::TextColorDisabled, Color::rgb(125, 125, 125))
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme.add_section(
            "Label",
            RendererData::new().with(P::TextColor, dark),
        );
        theme.add_section(
            "EditBox",
            RendererData::new()
                .with(P::BackgroundColor, Color::rgb(245, 245, 245))
                .with(P::BackgroundColorHover, Color::WHITE)
                .with(P::TextColor, dark)
                .with(P::SelectedBackgroundColor, Color::rgb(0, 110, 255))
                .with(P::SelectedTextColor, Color::WHITE)
                .with(P::CaretColor, Color::BLACK)
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme.add_section(
            "Slider",
            RendererData::new()
                .with(P::TrackColor, Color::rgb(245, 245, 245))
                .with(P::ThumbColor, Color::rgb(245, 245, 245))
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme.add_section(
            "ListBox",
            RendererData::new()
                .with(P::BackgroundColor, Color::rgb(245, 245, 245))
                .with(P::BackgroundColorHover, Color::WHITE)
                .with(P::TextColor, dark)
                .with(P::SelectedBackgroundColor, Color::rgb(0, 110, 255))
                .with(P::SelectedTextColor, Color::WHITE)
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme.add_section(
            "ComboBox",
            RendererData::new()
                .with(P::BackgroundColor, Color::rgb(245, 245, 245))
                .with(P::TextColor, dark)
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme.add_section(
            "ChildWindow",
            RendererData::new()
                .with(P::BackgroundColor, Color::rgb(230, 230, 230))
                .with(P::TitleBarColor, Color::WHITE)
                .with(P::TitleBarHeight, 20.0)
                .with(P::TextColor, dark)
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme.add_section(
            "Panel",
            RendererData::new().with(P::BackgroundColor, Color::TRANSPARENT),
        );
        theme.add_section(
            "ToolTip",
            RendererData::new()
                .with(P::BackgroundColor, Color::rgb(255, 255, 225))
                .with(P::TextColor, dark)
                .with(P::BorderColor, border)
                .with(P::Borders, 1.0),
        );
        theme
    }

    /// Add or replace a section.
    pub fn add_section(&mut self, name: impl Into<String>, data: RendererData) {
        self.sections.insert(name.into(), data);
    }

    pub fn section(&self, name: &str) -> Option<&RendererData> {
        self.sections.get(name)
    }

    /// The section for a widget type, created empty if missing.
    pub fn renderer_for(&mut self, type_name: &str) -> RendererData {
        self.sections
            .entry(type_name.to_string())
            .or_default()
            .clone()
    }

    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
