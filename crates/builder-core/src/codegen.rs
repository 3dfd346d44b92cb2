//! Code generation boundary.
//!
//! Generators consume a finalized forest and return source text. They never mutate the document.

use crate::node::ComponentTree;
use std::fmt::Write;

/// Turns a forest into generated source text.
pub trait CodeGenerator {
    /// Render the forest.
    fn generate(&self, forest: &[ComponentTree]) -> String;
}

/// Indented `type#id` outline of the forest, one node per line.
///
/// ```rust
/// use builder_core::{CodeGenerator, ComponentTree, OutlineGenerator};
///
/// let forest: Vec<ComponentTree> = serde_json::from_str(
///     r#"[{"id":"a","type":"section","children":[{"id":"b","type":"text","hidden":true}]}]"#,
/// ).unwrap();
///
/// assert_eq!(OutlineGenerator::default().generate(&forest), "section#a\n  text#b [hidden]\n");
/// ```
#[derive(Debug, Clone)]
pub struct OutlineGenerator {
    /// Indentation per depth level.
    pub indent: String,
}

impl Default for OutlineGenerator {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

impl OutlineGenerator {
    fn write_tree(&self, out: &mut String, tree: &ComponentTree, depth: usize) {
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
        let _ = write!(out, "{}#{}", tree.component_type, tree.id);
        match (tree.hidden, tree.locked) {
            (true, true) => out.push_str(" [hidden, locked]"),
            (true, false) => out.push_str(" [hidden]"),
            (false, true) => out.push_str(" [locked]"),
            (false, false) => {}
        }
        out.push('\n');
        for child in &tree.children {
            self.write_tree(out, child, depth + 1);
        }
    }
}

impl CodeGenerator for OutlineGenerator {
    fn generate(&self, forest: &[ComponentTree]) -> String {
        let mut out = String::new();
        for tree in forest {
            self.write_tree(&mut out, tree, 0);
        }
        out
    }
}
