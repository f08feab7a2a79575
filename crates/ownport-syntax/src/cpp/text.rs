//! Small helpers over Tree-sitter nodes and raw source bytes.

use tree_sitter::Node;

/// Collects the named children of `node`.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Collects all children of `node`, including anonymous tokens.
pub(crate) fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Collects every child stored under `field`.
pub(crate) fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Returns the source text covered by `node`.
pub(crate) fn node_text(node: Node<'_>, source: &[u8]) -> String {
    slice_text(source, node.start_byte(), node.end_byte())
}

/// Returns the source text in `[start, end)`, replacing invalid UTF-8.
///
/// Only names and type spellings go through here; rewritten source text is
/// always spliced from the original bytes by span.
pub(crate) fn slice_text(source: &[u8], start: usize, end: usize) -> String {
    source
        .get(start..end)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the unqualified, untemplated name of a type or class spelling.
///
/// `const ns::Widget<int>` becomes `Widget`.
pub(crate) fn simple_type_name(spelling: &str) -> &str {
    let mut name = spelling.trim();
    for prefix in ["const ", "volatile ", "struct ", "class ", "union "] {
        while let Some(rest) = name.strip_prefix(prefix) {
            name = rest.trim_start();
        }
    }
    let name = name.split('<').next().unwrap_or(name).trim();
    name.rsplit("::").next().unwrap_or(name).trim()
}
