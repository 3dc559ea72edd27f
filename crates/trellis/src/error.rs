//! Error types for the widget layer.

use thiserror::Error;
use trellis_core::SignalError;

use crate::widget::WidgetId;

/// Errors raised while building or binding layout expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The layout text could not be parsed.
    #[error("invalid layout '{input}' at column {column}: {message}")]
    Parse {
        /// The text that was being parsed.
        input: String,
        /// 1-based column of the offending character.
        column: usize,
        /// What the parser expected.
        message: String,
    },

    /// The binding would make a widget's geometry depend on itself.
    #[error("binding {property} of {widget:?} would create a dependency cycle")]
    Cycle {
        /// Widget whose layout was being set.
        widget: WidgetId,
        /// `"position"` or `"size"`.
        property: &'static str,
    },

    /// A layout refers to a sibling name that does not exist in the parent.
    #[error("layout refers to unknown widget '{0}'")]
    UnknownWidget(String),
}

/// The top-level error type for Trellis operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuiError {
    /// A layout expression could not be parsed or bound.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A signal lookup by name failed.
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// No factory is registered for this widget type name.
    #[error("unknown widget type '{0}'")]
    UnknownWidgetType(String),

    /// A saved property could not be interpreted.
    #[error("invalid value '{value}' for property '{property}'")]
    InvalidProperty {
        /// Property key.
        property: String,
        /// The rejected value.
        value: String,
    },

    /// The widget handle does not refer to a live widget.
    #[error("widget {0:?} does not exist")]
    InvalidHandle(WidgetId),

    /// The widget cannot have children.
    #[error("widget {0:?} is not a container")]
    NotAContainer(WidgetId),

    /// Adding the widget would make it its own ancestor.
    #[error("cannot add {child:?} to {container:?}: it is an ancestor of the container")]
    WouldCreateCycle {
        /// The container receiving the child.
        container: WidgetId,
        /// The child being added.
        child: WidgetId,
    },
}

impl GuiError {
    /// Convenience constructor for [`GuiError::InvalidProperty`].
    pub fn invalid_property(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidProperty {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// A specialized Result type for Trellis operations.
pub type Result<T> = std::result::Result<T, GuiError>;
