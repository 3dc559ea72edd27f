//! Logging and debugging facilities for Trellis.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - A tree formatter for dumping widget hierarchies
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis::focus=debug,trellis::container=trace")
//!     .init();
//! ```

use std::fmt::{self, Write as FmtWrite};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis::signal";
    /// Container event dispatch target.
    pub const CONTAINER: &str = "trellis::container";
    /// Focus transitions target.
    pub const FOCUS: &str = "trellis::focus";
    /// Layout binding and propagation target.
    pub const LAYOUT: &str = "trellis::layout";
    /// Gui root (input normalization, tooltips, requests) target.
    pub const GUI: &str = "trellis::gui";
    /// Theme and renderer data target.
    pub const THEME: &str = "trellis::theme";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact representation, one dash per level.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Whether to show per-node flags (visible, focused, ...).
    pub show_flags: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_flags: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output (names only).
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_flags: false,
            ..Default::default()
        }
    }

    /// Use the given style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }
}

/// A hierarchy that can be dumped with [`TreeDebug`].
pub trait DebugTree {
    /// Node handle type.
    type Node: Copy + fmt::Debug;

    /// Name shown for a node; empty names print as `(unnamed)`.
    fn node_name(&self, node: Self::Node) -> String;

    /// Short type name of a node.
    fn node_type(&self, node: Self::Node) -> String;

    /// Flags worth showing, e.g. `["focused", "hidden"]`.
    fn node_flags(&self, _node: Self::Node) -> Vec<&'static str> {
        Vec::new()
    }

    /// Children in paint order.
    fn node_children(&self, node: Self::Node) -> Vec<Self::Node>;
}

/// Debug utility for visualizing trees.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a subtree starting from `root`.
    pub fn format_subtree<T: DebugTree>(&self, tree: &T, root: T::Node) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.format_into(tree, root, 0, true, &mut output);
        output
    }

    fn format_into<T: DebugTree>(
        &self,
        tree: &T,
        node: T::Node,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        output.push_str(&self.build_prefix(depth, is_last));

        let name = tree.node_name(node);
        output.push_str(if name.is_empty() { "(unnamed)" } else { &name });

        if self.options.show_ids {
            write!(output, " [{node:?}]")?;
        }
        if self.options.show_types {
            write!(output, " ({})", tree.node_type(node))?;
        }
        if self.options.show_flags {
            let flags = tree.node_flags(node);
            if !flags.is_empty() {
                write!(output, " {{{}}}", flags.join(", "))?;
            }
        }
        output.push('\n');

        let children = tree.node_children(node);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_into(tree, child, depth + 1, i + 1 == count, output)?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => return format!("{} ", "-".repeat(depth)),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time a frame's draw or update pass.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture;

    impl DebugTree for Fixture {
        type Node = usize;

        fn node_name(&self, node: usize) -> String {
            ["root", "left", "", "leaf"][node].to_string()
        }

        fn node_type(&self, node: usize) -> String {
            if node == 0 { "Panel".into() } else { "Button".into() }
        }

        fn node_flags(&self, node: usize) -> Vec<&'static str> {
            if node == 1 { vec!["focused"] } else { Vec::new() }
        }

        fn node_children(&self, node: usize) -> Vec<usize> {
            match node {
                0 => vec![1, 2],
                1 => vec![3],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn test_tree_format_hierarchy() {
        let output = TreeDebug::new().format_subtree(&Fixture, 0);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "root [0] (Panel)");
        assert!(lines[1].starts_with("\u{251c}\u{2500}\u{2500} left"));
        assert!(lines[1].ends_with("{focused}"));
        assert!(lines[3].contains("(unnamed)"));
    }

    #[test]
    fn test_tree_format_minimal_ascii() {
        let options = TreeFormatOptions::minimal().with_style(TreeStyle::Ascii);
        let output = TreeDebug::with_options(options).format_subtree(&Fixture, 0);
        assert_eq!(output, "root\n+-- left\n|  `-- leaf\n`-- (unnamed)\n");
    }

    #[test]
    fn test_tree_format_max_depth() {
        let options = TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        };
        let output = TreeDebug::with_options(options).format_subtree(&Fixture, 0);
        assert!(!output.contains("leaf"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
