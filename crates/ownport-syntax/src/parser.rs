//! Tree-sitter C++ parsing wrapper with error recovery.
//!
//! This module wraps the raw Tree-sitter parser configured with the C++
//! grammar and provides structured access to parse results and syntax
//! errors.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::position::point_to_one_based;

/// Result of parsing C++ source.
///
/// Tree-sitter is error-tolerant, so a parse result may contain both a
/// usable tree and error nodes.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: Vec<u8>,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source that was parsed.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Returns whether the parse result contains any syntax errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects all syntax errors found in the parse result.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &[u8]) -> Self {
        let byte_range = node.byte_range();

        let context = source
            .get(byte_range.clone())
            .map(|bytes| {
                let text = String::from_utf8_lossy(bytes);
                if text.chars().count() > 50 {
                    let truncated: String = text.chars().take(47).collect();
                    format!("{truncated}...")
                } else {
                    text.into_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = point_to_one_based(node.start_position());

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }

    /// Converts the error into the fatal provider error.
    #[must_use]
    pub fn into_error(self) -> SyntaxError {
        let message = if self.context.is_empty() {
            self.message
        } else {
            format!("{} near `{}`", self.message, self.context)
        };
        SyntaxError::parse(self.line, self.column, message)
    }
}

/// Tree-sitter parser configured for C++.
pub struct CppParser {
    inner: tree_sitter::Parser,
}

impl CppParser {
    /// Creates a new parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded into Tree-sitter.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses source and returns the result, even when it has errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser fails to produce a syntax tree at all.
    pub fn parse(&mut self, source: &[u8]) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(1, 1, "parser produced no tree"))?;

        Ok(ParseResult {
            tree,
            source: source.to_vec(),
        })
    }
}

fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &[u8],
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
        return;
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int main() { return 0; }")]
    #[case("struct Node { Node* next; };")]
    #[case("void f(int* p) { delete p; }")]
    fn parser_parses_valid_source(#[case] source: &str) {
        let mut parser = CppParser::new().expect("parser init");
        let result = parser.parse(source.as_bytes()).expect("parse");
        assert!(!result.has_errors());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn syntax_error_info_has_line_and_column() {
        let mut parser = CppParser::new().expect("parser init");
        let result = parser
            .parse(b"int main() {\n    int x = ;\n}")
            .expect("parse");

        assert!(result.has_errors());
        let first = result.errors().into_iter().next().expect("has error");
        assert!(first.line >= 1);
        assert!(first.column >= 1);
        assert!(matches!(first.into_error(), SyntaxError::ParseError { .. }));
    }
}
