//! Layout expressions.
//!
//! A [`Layout`] is one coordinate (or one dimension) of a widget, expressed as
//! a small formula: constants, arithmetic, percentages of the parent and
//! references to the geometry of other widgets. The last evaluated value is
//! cached in the layout; the widget tree re-evaluates it whenever one of the
//! referenced values changes.

use std::fmt;
use std::str::FromStr;

use trellis_render::{Point, Size};

use crate::error::LayoutError;
use crate::widget::WidgetId;

use super::parser;

/// Axis a layout component belongs to.
///
/// Percentages are taken from the parent's width on the x axis and from its
/// height on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A geometry property of another widget that a layout can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindProperty {
    Left,
    Top,
    Width,
    Height,
    Right,
    Bottom,
}

impl BindProperty {
    /// Canonical name used when printing layouts.
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }

    /// Parse a property name, accepting the short aliases `x`, `y`, `w`, `h`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" | "x" => Some(Self::Left),
            "top" | "y" => Some(Self::Top),
            "width" | "w" => Some(Self::Width),
            "height" | "h" => Some(Self::Height),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    /// Whether the property reads the referenced widget's position.
    pub fn reads_position(self) -> bool {
        !matches!(self, Self::Width | Self::Height)
    }

    /// Whether the property reads the referenced widget's size.
    pub fn reads_size(self) -> bool {
        !matches!(self, Self::Left | Self::Top)
    }

    /// Compute this property from a widget's resolved geometry.
    pub fn of(self, position: Point, size: Size) -> f32 {
        match self {
            Self::Left => position.x,
            Self::Top => position.y,
            Self::Width => size.width,
            Self::Height => size.height,
            Self::Right => position.x + size.width,
            Self::Bottom => position.y + size.height,
        }
    }
}

/// The widget a binding refers to.
#[derive(Debug, Clone)]
pub enum BindTarget {
    /// The parent of the widget owning the layout, whatever it currently is.
    Parent,
    /// A sibling looked up by name when the widget is attached.
    Named {
        name: String,
        resolved: Option<WidgetId>,
    },
    /// A specific widget.
    Widget(WidgetId),
}

impl PartialEq for BindTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Parent, Self::Parent) => true,
            (Self::Named { name: a, .. }, Self::Named { name: b, .. }) => a == b,
            (Self::Widget(a), Self::Widget(b)) => a == b,
            _ => false,
        }
    }
}

/// Binary operators and functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl Operator {
    fn apply(self, lhs: f32, rhs: f32) -> f32 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div if rhs == 0.0 => 0.0,
            Self::Div => lhs / rhs,
            Self::Min => lhs.min(rhs),
            Self::Max => lhs.max(rhs),
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Min | Self::Max => 3,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// A layout expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant.
    Value(f32),
    /// A fraction of the parent's inner size along the layout's axis.
    Ratio(f32),
    Negate(Box<Expr>),
    Binary {
        op: Operator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A geometry property of another widget.
    Binding {
        target: BindTarget,
        property: BindProperty,
    },
}

/// Read access to the geometry a layout expression may refer to.
pub(crate) trait LayoutResolver {
    /// Inner size of the owner's parent, if the owner is attached.
    fn parent_inner_size(&self) -> Option<Size>;

    /// Value of a property of the bound widget, or `None` when it cannot be
    /// resolved (detached owner, unknown sibling, destroyed widget).
    fn property(&self, target: &BindTarget, property: BindProperty) -> Option<f32>;
}

impl Expr {
    pub(crate) fn binary(op: Operator, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate the expression. `None` means an input is unavailable and the
    /// previous value should be kept.
    pub(crate) fn evaluate(&self, axis: Axis, resolver: &dyn LayoutResolver) -> Option<f32> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Ratio(r) => {
                let size = resolver.parent_inner_size()?;
                Some(
                    r * match axis {
                        Axis::X => size.width,
                        Axis::Y => size.height,
                    },
                )
            }
            Self::Negate(inner) => inner.evaluate(axis, resolver).map(|v| -v),
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(axis, resolver)?;
                let rhs = rhs.evaluate(axis, resolver)?;
                Some(op.apply(lhs, rhs))
            }
            Self::Binding { target, property } => resolver.property(target, *property),
        }
    }

    /// True when the expression contains no percentages and no bindings.
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Value(_) => true,
            Self::Ratio(_) | Self::Binding { .. } => false,
            Self::Negate(inner) => inner.is_constant(),
            Self::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
        }
    }

    /// True when the expression reads the parent's size through a percentage.
    pub(crate) fn uses_ratio(&self) -> bool {
        match self {
            Self::Ratio(_) => true,
            Self::Value(_) | Self::Binding { .. } => false,
            Self::Negate(inner) => inner.uses_ratio(),
            Self::Binary { lhs, rhs, .. } => lhs.uses_ratio() || rhs.uses_ratio(),
        }
    }

    /// Visit every binding in the expression.
    pub(crate) fn for_each_binding(&self, f: &mut dyn FnMut(&BindTarget, BindProperty)) {
        match self {
            Self::Value(_) | Self::Ratio(_) => {}
            Self::Negate(inner) => inner.for_each_binding(f),
            Self::Binary { lhs, rhs, .. } => {
                lhs.for_each_binding(f);
                rhs.for_each_binding(f);
            }
            Self::Binding { target, property } => f(target, *property),
        }
    }

    /// Visit every binding mutably, e.g. to resolve sibling names.
    pub(crate) fn for_each_binding_mut(&mut self, f: &mut dyn FnMut(&mut BindTarget)) {
        match self {
            Self::Value(_) | Self::Ratio(_) => {}
            Self::Negate(inner) => inner.for_each_binding_mut(f),
            Self::Binary { lhs, rhs, .. } => {
                lhs.for_each_binding_mut(f);
                rhs.for_each_binding_mut(f);
            }
            Self::Binding { target, .. } => f(target),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Binary { op, .. } => op.precedence(),
            _ => 4,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Ratio(r) => write!(f, "{}%", r * 100.0),
            Self::Negate(inner) => {
                if inner.precedence() < 4 {
                    write!(f, "-({inner})")
                } else {
                    write!(f, "-{inner}")
                }
            }
            Self::Binary { op, lhs, rhs } if matches!(op, Operator::Min | Operator::Max) => {
                write!(f, "{}({lhs}, {rhs})", op.symbol())
            }
            Self::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                if lhs.precedence() < prec {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                write!(f, " {} ", op.symbol())?;
                let rhs_needs_parens = rhs.precedence() < prec
                    || (rhs.precedence() == prec && matches!(op, Operator::Sub | Operator::Div));
                if rhs_needs_parens {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
            Self::Binding { target, property } => match target {
                BindTarget::Parent => write!(f, "parent.{}", property.name()),
                BindTarget::Named { name, .. } => write!(f, "{name}.{}", property.name()),
                BindTarget::Widget(id) => write!(f, "{id:?}.{}", property.name()),
            },
        }
    }
}

/// One coordinate or dimension of a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    expr: Expr,
    value: f32,
}

impl Layout {
    /// A constant layout.
    pub fn new(value: f32) -> Self {
        Self {
            expr: Expr::Value(value),
            value,
        }
    }

    /// A layout from an expression. Constant expressions are evaluated
    /// immediately, anything else starts at 0 until the tree evaluates it.
    pub fn from_expr(expr: Expr) -> Self {
        let value = if expr.is_constant() {
            expr.evaluate(Axis::X, &NoResolver).unwrap_or(0.0)
        } else {
            0.0
        };
        Self { expr, value }
    }

    /// A fraction of the parent's size (`0.5` is `50%`).
    pub fn ratio(ratio: f32) -> Self {
        Self::from_expr(Expr::Ratio(ratio))
    }

    /// Parse layout text such as `"50% - 10"` or `"parent.width / 2"`.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        parser::parse_expr(text).map(Self::from_expr)
    }

    /// The last evaluated value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub(crate) fn expr_mut(&mut self) -> &mut Expr {
        &mut self.expr
    }

    pub fn is_constant(&self) -> bool {
        self.expr.is_constant()
    }

    /// Re-evaluate and cache. Returns true if the value changed.
    pub(crate) fn update(&mut self, axis: Axis, resolver: &dyn LayoutResolver) -> bool {
        match self.expr.evaluate(axis, resolver) {
            Some(value) if value != self.value => {
                self.value = value;
                true
            }
            _ => false,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl From<f32> for Layout {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Expr> for Layout {
    fn from(expr: Expr) -> Self {
        Self::from_expr(expr)
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// A two-component layout used for positions and sizes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout2d {
    pub x: Layout,
    pub y: Layout,
}

impl Layout2d {
    pub fn new(x: impl Into<Layout>, y: impl Into<Layout>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Parse `"(x, y)"` or `"{x, y}"`.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let (x, y) = parser::parse_pair(text)?;
        Ok(Self::new(Layout::from_expr(x), Layout::from_expr(y)))
    }

    /// The last evaluated values.
    pub fn value(&self) -> (f32, f32) {
        (self.x.value, self.y.value)
    }

    pub fn is_constant(&self) -> bool {
        self.x.is_constant() && self.y.is_constant()
    }

    pub(crate) fn uses_ratio(&self) -> bool {
        self.x.expr.uses_ratio() || self.y.expr.uses_ratio()
    }

    /// Re-evaluate both components. Returns true if either changed.
    pub(crate) fn update(&mut self, resolver: &dyn LayoutResolver) -> bool {
        let x = self.x.update(Axis::X, resolver);
        let y = self.y.update(Axis::Y, resolver);
        x || y
    }

    /// Visit the bindings of both components.
    pub(crate) fn for_each_binding(&self, f: &mut dyn FnMut(&BindTarget, BindProperty)) {
        self.x.expr.for_each_binding(f);
        self.y.expr.for_each_binding(f);
    }

    pub(crate) fn for_each_binding_mut(&mut self, f: &mut dyn FnMut(&mut BindTarget)) {
        self.x.expr.for_each_binding_mut(f);
        self.y.expr.for_each_binding_mut(f);
    }
}

impl From<(f32, f32)> for Layout2d {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for Layout2d {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<Size> for Layout2d {
    fn from(size: Size) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<(Layout, Layout)> for Layout2d {
    fn from((x, y): (Layout, Layout)) -> Self {
        Self { x, y }
    }
}

impl FromStr for Layout2d {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Layout2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Resolver for detached evaluation: nothing can be looked up.
struct NoResolver;

impl LayoutResolver for NoResolver {
    fn parent_inner_size(&self) -> Option<Size> {
        None
    }

    fn property(&self, _target: &BindTarget, _property: BindProperty) -> Option<f32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedParent(Size);

    impl LayoutResolver for FixedParent {
        fn parent_inner_size(&self) -> Option<Size> {
            Some(self.0)
        }

        fn property(&self, target: &BindTarget, property: BindProperty) -> Option<f32> {
            match target {
                BindTarget::Parent => Some(property.of(Point::new(5.0, 5.0), self.0)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_constant_layout() {
        let layout = Layout::new(12.5);
        assert!(layout.is_constant());
        assert_eq!(layout.value(), 12.5);
        assert_eq!(layout.to_string(), "12.5");
    }

    #[test]
    fn test_ratio_uses_axis() {
        let parent = FixedParent(Size::new(200.0, 100.0));
        let mut layout = Layout2d::new(Layout::ratio(0.5), Layout::ratio(0.5));
        assert!(layout.update(&parent));
        assert_eq!(layout.value(), (100.0, 50.0));
        // Unchanged inputs do not report a change.
        assert!(!layout.update(&parent));
    }

    #[test]
    fn test_unresolved_keeps_previous_value() {
        let mut layout = Layout::parse("other.width + 5").unwrap();
        assert!(!layout.update(Axis::X, &FixedParent(Size::new(10.0, 10.0))));
        assert_eq!(layout.value(), 0.0);
    }

    #[test]
    fn test_right_and_bottom() {
        let position = Point::new(10.0, 20.0);
        let size = Size::new(30.0, 40.0);
        assert_eq!(BindProperty::Right.of(position, size), 40.0);
        assert_eq!(BindProperty::Bottom.of(position, size), 60.0);
        assert!(BindProperty::Right.reads_position() && BindProperty::Right.reads_size());
        assert!(!BindProperty::Width.reads_position());
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        let layout = Layout::parse("10 / (5 - 5)").unwrap();
        assert_eq!(layout.value(), 0.0);
    }

    #[test]
    fn test_display_parenthesizes_minimally() {
        let cases = [
            ("1 + 2 * 3", "1 + 2 * 3"),
            ("(1 + 2) * 3", "(1 + 2) * 3"),
            ("10 - (4 - 2)", "10 - (4 - 2)"),
            ("min(50%, parent.w - 20)", "min(50%, parent.width - 20)"),
            ("-(button.x + 2)", "-(button.left + 2)"),
            ("&.height / 2", "parent.height / 2"),
        ];
        for (input, expected) in cases {
            assert_eq!(Layout::parse(input).unwrap().to_string(), expected, "{input}");
        }
    }
}
