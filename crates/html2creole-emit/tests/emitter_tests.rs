//! Integration tests for the Creole emitter, on hand-built trees.

use html2creole_dom::{AttributesMap, DocNode, DocTree, NodeId, NodeKind};
use html2creole_emit::{EmitError, Emitter, EmitterOptions};
use quickcheck_macros::quickcheck;

fn element(tree: &mut DocTree, parent: NodeId, kind: NodeKind) -> NodeId {
    tree.create_child(parent, DocNode::element(kind, AttributesMap::new()))
}

fn with_attrs(tree: &mut DocTree, parent: NodeId, kind: NodeKind, attrs: &[(&str, &str)]) -> NodeId {
    let attrs: AttributesMap = attrs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    tree.create_child(parent, DocNode::element(kind, attrs))
}

fn text(tree: &mut DocTree, parent: NodeId, data: &str) -> NodeId {
    tree.create_child(parent, DocNode::leaf(NodeKind::Data, data))
}

fn list(tree: &mut DocTree, parent: NodeId, kind: NodeKind, level: usize) -> NodeId {
    tree.create_child(parent, DocNode::element(kind, AttributesMap::new()).with_level(level))
}

fn emit(tree: &DocTree) -> Result<String, EmitError> {
    Emitter::new(tree, EmitterOptions::default()).emit()
}

#[test]
fn test_paragraphs_and_inline_markup() {
    let mut tree = DocTree::new();
    let p1 = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let _ = text(&mut tree, p1, "a ");
    let b = element(&mut tree, p1, NodeKind::Bold);
    let _ = text(&mut tree, b, "b");
    let p2 = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let em = element(&mut tree, p2, NodeKind::Emphasis);
    let _ = text(&mut tree, em, "c");

    assert_eq!(emit(&tree).as_deref(), Ok("a **b**\n\n//c//"));
}

#[test]
fn test_headline_and_rule() {
    let mut tree = DocTree::new();
    let h = tree.create_child(
        NodeId::ROOT,
        DocNode::element(NodeKind::Headline, AttributesMap::new()).with_level(2),
    );
    let _ = text(&mut tree, h, "Title");
    let _ = element(&mut tree, NodeId::ROOT, NodeKind::HorizontalRule);

    assert_eq!(emit(&tree).as_deref(), Ok("== Title\n\n----"));
}

#[test]
fn test_line_break_outside_and_inside_list() {
    let mut tree = DocTree::new();
    let p = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let _ = text(&mut tree, p, "a");
    let _ = element(&mut tree, p, NodeKind::LineBreak);
    let _ = text(&mut tree, p, "b");
    let ul = list(&mut tree, NodeId::ROOT, NodeKind::UnorderedList, 1);
    let li = list(&mut tree, ul, NodeKind::ListItem, 1);
    let _ = text(&mut tree, li, "c");
    let _ = element(&mut tree, li, NodeKind::LineBreak);
    let _ = text(&mut tree, li, "d");

    assert_eq!(emit(&tree).as_deref(), Ok("a\nb\n\n* c\\\\d"));
}

#[test]
fn test_mixed_nested_lists() {
    let mut tree = DocTree::new();
    let ul = list(&mut tree, NodeId::ROOT, NodeKind::UnorderedList, 1);
    let li = list(&mut tree, ul, NodeKind::ListItem, 1);
    let _ = text(&mut tree, li, "outer");
    let ol = list(&mut tree, li, NodeKind::OrderedList, 2);
    let inner = list(&mut tree, ol, NodeKind::ListItem, 2);
    let _ = text(&mut tree, inner, "inner");
    let p = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let _ = text(&mut tree, p, "after");

    assert_eq!(emit(&tree).as_deref(), Ok("* outer\n*# inner\n\nafter"));
}

#[test]
fn test_link_with_and_without_label() {
    let mut tree = DocTree::new();
    let p = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let a1 = with_attrs(&mut tree, p, NodeKind::Link, &[("href", "http://x")]);
    let _ = text(&mut tree, a1, "http://x");
    let _ = text(&mut tree, p, " ");
    let a2 = with_attrs(&mut tree, p, NodeKind::Link, &[("href", "http://x")]);
    let _ = text(&mut tree, a2, "label");

    assert_eq!(
        emit(&tree).as_deref(),
        Ok("[[http://x]] [[http://x|label]]")
    );
}

#[test]
fn test_image_requires_src_and_alt() {
    let mut tree = DocTree::new();
    let _ = with_attrs(&mut tree, NodeId::ROOT, NodeKind::Image, &[("src", "a.jpg"), ("alt", "A")]);
    assert_eq!(emit(&tree).as_deref(), Ok("{{a.jpg|A}}"));

    let mut tree = DocTree::new();
    let _ = with_attrs(&mut tree, NodeId::ROOT, NodeKind::Image, &[("src", "a.jpg")]);
    assert_eq!(
        emit(&tree),
        Err(EmitError::MissingRequiredAttribute {
            kind: NodeKind::Image,
            attribute: "alt",
        })
    );
}

#[test]
fn test_link_without_href_is_an_error() {
    let mut tree = DocTree::new();
    let a = element(&mut tree, NodeId::ROOT, NodeKind::Link);
    let _ = text(&mut tree, a, "x");
    assert_eq!(
        emit(&tree),
        Err(EmitError::MissingRequiredAttribute {
            kind: NodeKind::Link,
            attribute: "href",
        })
    );
}

#[test]
fn test_table_is_aligned() {
    let mut tree = DocTree::new();
    let table = element(&mut tree, NodeId::ROOT, NodeKind::Table);
    let head = element(&mut tree, table, NodeKind::TableRow);
    for label in ["Name", "Value"] {
        let th = element(&mut tree, head, NodeKind::TableHeader);
        let _ = text(&mut tree, th, label);
    }
    let row = element(&mut tree, table, NodeKind::TableRow);
    let td = element(&mut tree, row, NodeKind::TableCell);
    let _ = text(&mut tree, td, " a ");
    let td = element(&mut tree, row, NodeKind::TableCell);
    let _ = text(&mut tree, td, "two");
    let _ = element(&mut tree, td, NodeKind::LineBreak);
    let _ = text(&mut tree, td, "lines");

    assert_eq!(
        emit(&tree).as_deref(),
        Ok("|= Name |= Value     |\n| a     | two\\\\lines |")
    );
}

#[test]
fn test_table_cell_with_unclosed_link() {
    let mut tree = DocTree::new();
    let table = element(&mut tree, NodeId::ROOT, NodeKind::Table);
    let row = element(&mut tree, table, NodeKind::TableRow);
    let td = element(&mut tree, row, NodeKind::TableCell);
    let _ = text(&mut tree, td, "a");
    let _ = element(&mut tree, td, NodeKind::LineBreak);
    let _ = text(&mut tree, td, "b");
    let td = element(&mut tree, row, NodeKind::TableCell);
    let _ = text(&mut tree, td, "[[x");

    assert_eq!(emit(&tree).as_deref(), Ok("| a\\\\b | [[x |"));
}

#[test]
fn test_verbatim_nodes() {
    let mut tree = DocTree::new();
    let _ = tree.create_child(NodeId::ROOT, DocNode::leaf(NodeKind::PreBlock, "raw &amp; text"));
    let p = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let _ = text(&mut tree, p, "use ");
    let _ = tree.create_child(p, DocNode::leaf(NodeKind::InlinePre, "x"));
    let _ = tree.create_child(NodeId::ROOT, DocNode::leaf(NodeKind::PreBlock, "a\nb"));
    let _ = tree.create_child(
        NodeId::ROOT,
        DocNode::leaf(NodeKind::PassBlock, "{% raw %}x{% endraw %}"),
    );

    assert_eq!(
        emit(&tree).as_deref(),
        Ok("{{{raw &amp; text}}}\n\nuse {{{ x }}}\n\n{{{\na\nb\n}}}\n\n{% raw %}x{% endraw %}")
    );
}

#[test]
fn test_decode_verbatim_entities_option() {
    let mut tree = DocTree::new();
    let _ = tree.create_child(NodeId::ROOT, DocNode::leaf(NodeKind::PreBlock, "a &amp; b"));
    let options = EmitterOptions {
        decode_verbatim_entities: true,
    };
    assert_eq!(
        Emitter::new(&tree, options).emit().as_deref(),
        Ok("{{{a & b}}}")
    );
}

#[test]
fn test_references_are_resolved() {
    let mut tree = DocTree::new();
    let p = element(&mut tree, NodeId::ROOT, NodeKind::Paragraph);
    let _ = tree.create_child(p, DocNode::leaf(NodeKind::CharRef, "65"));
    let _ = tree.create_child(p, DocNode::leaf(NodeKind::EntityRef, "amp"));
    let _ = tree.create_child(p, DocNode::leaf(NodeKind::CharRef, "x42"));
    assert_eq!(emit(&tree).as_deref(), Ok("A&B"));

    let mut tree = DocTree::new();
    let _ = tree.create_child(NodeId::ROOT, DocNode::leaf(NodeKind::EntityRef, "bogus"));
    assert_eq!(
        emit(&tree),
        Err(EmitError::UnresolvedEntityReference {
            name: "bogus".to_string()
        })
    );
}

#[test]
fn test_unknown_kind_is_an_error() {
    let mut tree = DocTree::new();
    let blink = element(&mut tree, NodeId::ROOT, NodeKind::Other("blink".to_string()));
    let _ = text(&mut tree, blink, "x");
    assert_eq!(
        emit(&tree),
        Err(EmitError::UnknownNodeKind {
            kind: "blink".to_string()
        })
    );
}

#[test]
fn test_invalid_content_is_an_error() {
    let mut tree = DocTree::new();
    let _ = element(&mut tree, NodeId::ROOT, NodeKind::Data);
    assert!(matches!(
        emit(&tree),
        Err(EmitError::InvalidContentType {
            kind: NodeKind::Data,
            ..
        })
    ));

    let mut tree = DocTree::new();
    let _ = tree.create_child(NodeId::ROOT, DocNode::leaf(NodeKind::Paragraph, "text"));
    assert!(matches!(
        emit(&tree),
        Err(EmitError::InvalidContentType {
            kind: NodeKind::Paragraph,
            ..
        })
    ));
}

#[test]
fn test_error_messages_name_the_culprit() {
    let err = EmitError::MissingRequiredAttribute {
        kind: NodeKind::Image,
        attribute: "src",
    };
    assert_eq!(err.to_string(), "<img> is missing the required attribute 'src'");
}

#[quickcheck]
fn prop_headline_depth(level: u8, title: String) -> bool {
    let level = usize::from(level % 6) + 1;
    let title: String = title.chars().filter(char::is_ascii_alphanumeric).collect();
    let mut tree = DocTree::new();
    let h = tree.create_child(
        NodeId::ROOT,
        DocNode::element(NodeKind::Headline, AttributesMap::new()).with_level(level),
    );
    let _ = text(&mut tree, h, &title);
    let expected = format!("{} {title}", "=".repeat(level));
    emit(&tree).is_ok_and(|out| out == expected.trim())
}

#[quickcheck]
fn prop_link_symmetry(href: String, label: String) -> bool {
    let href: String = href.chars().filter(char::is_ascii_alphanumeric).collect();
    let label: String = label.chars().filter(char::is_ascii_alphanumeric).collect();
    let mut tree = DocTree::new();
    let a = with_attrs(&mut tree, NodeId::ROOT, NodeKind::Link, &[("href", href.as_str())]);
    let _ = text(&mut tree, a, &label);
    let expected = if label == href {
        format!("[[{href}]]")
    } else {
        format!("[[{href}|{label}]]")
    };
    emit(&tree).is_ok_and(|out| out == expected)
}

#[quickcheck]
fn prop_list_prefix_matches_depth(depth: u8) -> bool {
    let depth = usize::from(depth % 8) + 1;
    let mut tree = DocTree::new();
    let mut parent = NodeId::ROOT;
    for level in 1..=depth {
        let ol = list(&mut tree, parent, NodeKind::OrderedList, level);
        let li = list(&mut tree, ol, NodeKind::ListItem, level);
        let _ = text(&mut tree, li, "x");
        parent = li;
    }
    let Ok(out) = emit(&tree) else {
        return false;
    };
    out.lines()
        .enumerate()
        .all(|(index, line)| line == format!("{} x", "#".repeat(index + 1)))
}
