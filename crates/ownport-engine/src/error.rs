//! Error types for the migration engine.

use ownport_syntax::Span;
use thiserror::Error;

/// Errors that abort a migration.
///
/// Classification never fails; these only arise when the inputs disagree
/// or the ledger invariants are broken.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The tree addresses bytes the source buffer does not have.
    #[error("syntax tree spans {tree_end} bytes but the source has {source_len}")]
    SourceMismatch {
        /// End offset of the tree root.
        tree_end: usize,
        /// Length of the source buffer.
        source_len: usize,
    },

    /// Two committed edits overlap.
    #[error("committed edits {first} and {second} overlap")]
    OverlappingEdits {
        /// Earlier edit in document order.
        first: Span,
        /// Later edit in document order.
        second: Span,
    },
}

impl EngineError {
    /// Creates a tree/source mismatch error.
    #[must_use]
    pub const fn source_mismatch(tree_end: usize, source_len: usize) -> Self {
        Self::SourceMismatch {
            tree_end,
            source_len,
        }
    }

    /// Creates an overlapping-edits error.
    #[must_use]
    pub const fn overlapping_edits(first: Span, second: Span) -> Self {
        Self::OverlappingEdits { first, second }
    }
}

/// Why the ledger refused an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Rejection {
    /// The edit overlaps one committed earlier.
    #[error("edit {span} overlaps committed edit {existing}")]
    Overlap {
        /// Range of the refused edit.
        span: Span,
        /// Range of the committed edit.
        existing: Span,
    },

    /// The edit reaches past the end of the buffer.
    #[error("edit {span} lies outside the {len}-byte buffer")]
    OutOfBounds {
        /// Range of the refused edit.
        span: Span,
        /// Length of the buffer.
        len: usize,
    },
}
