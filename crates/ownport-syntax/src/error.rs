//! Error types for syntax providers.
//!
//! Every variant is fatal to a migration run: the engine is only invoked
//! once a provider has produced a complete typed tree.

use thiserror::Error;

/// Errors raised while producing a typed syntax tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser.
    #[error("failed to initialise C++ parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// The source could not be parsed.
    #[error("failed to parse source at {line}:{column}: {message}")]
    ParseError {
        /// One-based line of the first problem.
        line: u32,
        /// One-based column of the first problem.
        column: u32,
        /// Description of the problem.
        message: String,
    },

    /// A serialized tree could not be decoded.
    #[error("invalid syntax tree document: {message}")]
    TreeDecodeError {
        /// Decoder message.
        message: String,
    },

    /// The tree does not describe the buffer it was paired with.
    #[error("syntax tree spans {tree_end} bytes but the source has {source_len}")]
    SourceMismatch {
        /// End offset of the tree root.
        tree_end: usize,
        /// Length of the source buffer.
        source_len: usize,
    },

    /// Internal error indicating a bug or system failure.
    #[error("internal error: {message}")]
    InternalError {
        /// Description of the internal error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error at a one-based position.
    #[must_use]
    pub fn parse(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates a tree decoding error.
    #[must_use]
    pub fn tree_decode(message: impl Into<String>) -> Self {
        Self::TreeDecodeError {
            message: message.into(),
        }
    }

    /// Creates a tree/source mismatch error.
    #[must_use]
    pub const fn source_mismatch(tree_end: usize, source_len: usize) -> Self {
        Self::SourceMismatch {
            tree_end,
            source_len,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
