//! Human-readable tree dumps for debugging.

use std::fmt::Write;

use crate::{DocTree, NodeId};

/// Render the subtree below `id` (children only), one node per line,
/// indented four spaces per depth.
///
/// ```text
/// p
///     data: "Hello "
///     strong
///         data: "world"
/// ```
#[must_use]
pub fn dump_tree(tree: &DocTree, id: NodeId) -> String {
    let mut out = String::new();
    dump_children(tree, id, 0, &mut out);
    out
}

fn dump_children(tree: &DocTree, id: NodeId, indent: usize, out: &mut String) {
    for &child_id in tree.children(id) {
        let Some(child) = tree.get(child_id) else {
            continue;
        };
        let _ = write!(out, "{}{}", " ".repeat(indent), child.kind);
        if let Some(content) = &child.content {
            let _ = write!(out, ": {content:?}");
        }
        if !child.attrs.is_empty() {
            let attrs: Vec<String> = child
                .attrs
                .iter()
                .map(|(k, v)| format!("{k}={v:?}"))
                .collect();
            let _ = write!(out, " - attrs: {}", attrs.join(" "));
        }
        if let Some(level) = child.level {
            let _ = write!(out, " - level: {level}");
        }
        out.push('\n');
        dump_children(tree, child_id, indent + 4, out);
    }
}

/// Print a document tree for debugging.
pub fn print_tree(tree: &DocTree, id: NodeId) {
    print!("{}", dump_tree(tree, id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttributesMap, DocNode, NodeKind};

    #[test]
    fn test_dump_nested_nodes() {
        let mut tree = DocTree::new();
        let mut attrs = AttributesMap::new();
        let _ = attrs.insert("href".to_string(), "http://x".to_string());
        let p = tree.create_child(NodeId::ROOT, DocNode::element(NodeKind::Paragraph, attrs));
        let _ = tree.create_child(p, DocNode::leaf(NodeKind::Data, "Hello"));
        let ul = tree.create_child(
            NodeId::ROOT,
            DocNode::element(NodeKind::UnorderedList, AttributesMap::new()).with_level(1),
        );

        assert_eq!(
            dump_tree(&tree, NodeId::ROOT),
            "p - attrs: href=\"http://x\"\n    data: \"Hello\"\nul - level: 1\n"
        );
        assert_eq!(dump_tree(&tree, ul), "");
    }
}
