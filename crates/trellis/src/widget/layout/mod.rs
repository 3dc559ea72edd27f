//! Layout expressions and the dependency graph that keeps them current.
//!
//! Widget positions and sizes are [`Layout2d`] values. A layout can be a
//! plain number, a percentage of the parent, or a formula that reads the
//! geometry of the parent or of a sibling:
//!
//! ```
//! use trellis::widget::layout::{Layout, Layout2d};
//!
//! let size = Layout2d::parse("(50%, 30)").unwrap();
//! assert_eq!(size.to_string(), "(50%, 30)");
//!
//! let x = Layout::parse("ok_button.right + 10").unwrap();
//! assert!(!x.is_constant());
//! ```
//!
//! When a widget is attached, the tree resolves the references, registers
//! the widget as a dependent of every slot it reads and evaluates the
//! layout. A later change of a read slot re-evaluates the dependents in
//! breadth-first order; dependents whose value does not change emit
//! nothing.

mod expr;
mod graph;
mod parser;

pub use expr::{Axis, BindProperty, BindTarget, Expr, Layout, Layout2d, Operator};
pub(crate) use expr::LayoutResolver;
pub use graph::{LayoutComponent, LayoutGraph, Slot};
