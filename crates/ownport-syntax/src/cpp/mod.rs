//! Tree-sitter backed provider for C++ sources.
//!
//! Types come from declarations alone: every reference is resolved through
//! lexical block scopes and the fields of classes defined in the same
//! translation unit. Anything that cannot be resolved this way is typed as
//! [`TypeDescriptor::unresolved`](crate::TypeDescriptor::unresolved) and is
//! therefore never treated as a pointer.

mod declarator;
mod lower;
mod scope;
mod text;

use tracing::{debug, warn};

use crate::error::SyntaxError;
use crate::node::SyntaxNode;
use crate::parser::{CppParser, SyntaxErrorInfo};
use crate::provider::SyntaxProvider;

/// Produces typed syntax trees by parsing C++ with Tree-sitter.
pub struct CppProvider {
    parser: CppParser,
    lenient: bool,
}

impl CppProvider {
    /// Creates a strict provider that rejects sources with syntax errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the C++ grammar cannot be loaded.
    pub fn new() -> Result<Self, SyntaxError> {
        Ok(Self {
            parser: CppParser::new()?,
            lenient: false,
        })
    }

    /// Accepts error-recovered trees instead of failing on syntax errors.
    #[must_use]
    pub const fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

impl SyntaxProvider for CppProvider {
    fn provide(&mut self, source: &[u8]) -> Result<SyntaxNode, SyntaxError> {
        let parsed = self.parser.parse(source)?;
        if parsed.has_errors() {
            let errors = parsed.errors();
            if !self.lenient {
                return Err(errors.into_iter().next().map_or_else(
                    || SyntaxError::parse(1, 1, "syntax error"),
                    SyntaxErrorInfo::into_error,
                ));
            }
            warn!(errors = errors.len(), "lowering error-recovered parse tree");
        }

        let tree = lower::lower(parsed.root_node(), parsed.source());
        debug!(
            bytes = source.len(),
            nodes = tree.node_count(),
            "lowered C++ translation unit"
        );
        Ok(tree)
    }
}
