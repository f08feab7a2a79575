//! The seam between front ends and the migration engine.

use crate::error::SyntaxError;
use crate::node::SyntaxNode;

/// Produces the typed syntax tree for one translation unit.
///
/// Spans in the returned tree must address `source`, the buffer the engine
/// will rewrite.
pub trait SyntaxProvider {
    /// Builds the typed tree for `source`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be turned into a complete
    /// tree. The migration must not run in that case.
    fn provide(&mut self, source: &[u8]) -> Result<SyntaxNode, SyntaxError>;
}

/// Replays a typed tree serialized as JSON by another front end.
#[derive(Debug, Clone)]
pub struct JsonProvider {
    document: String,
}

impl JsonProvider {
    /// Creates a provider for the given JSON document.
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl SyntaxProvider for JsonProvider {
    fn provide(&mut self, source: &[u8]) -> Result<SyntaxNode, SyntaxError> {
        let tree: SyntaxNode = serde_json::from_str(&self.document)
            .map_err(|err| SyntaxError::tree_decode(err.to_string()))?;
        let tree_end = tree.preorder().map(|node| node.span.end).max().unwrap_or(0);
        if tree_end > source.len() {
            return Err(SyntaxError::source_mismatch(tree_end, source.len()));
        }
        Ok(tree.normalised())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn json_tree_is_decoded() {
        let mut provider = JsonProvider::new(
            r#"{"span":{"start":0,"end":4},"kind":{"node":"translation_unit"}}"#,
        );
        let tree = provider.provide(b"int;").expect("tree");
        assert_eq!(tree.kind, NodeKind::TranslationUnit);
    }

    #[test]
    fn tree_longer_than_source_is_rejected() {
        let mut provider = JsonProvider::new(
            r#"{"span":{"start":0,"end":40},"kind":{"node":"translation_unit"}}"#,
        );
        let result = provider.provide(b"int;");
        assert!(matches!(
            result,
            Err(SyntaxError::SourceMismatch {
                tree_end: 40,
                source_len: 4
            })
        ));
    }

    #[test]
    fn malformed_document_is_a_decode_error() {
        let mut provider = JsonProvider::new("{");
        assert!(matches!(
            provider.provide(b""),
            Err(SyntaxError::TreeDecodeError { .. })
        ));
    }
}
