//! Observations reported alongside a migration.
//!
//! Observations describe constructs the engine recognized but deliberately
//! left untouched, and edits it had to drop. None of them stop a run.

use std::fmt;

use ownport_syntax::Span;
use serde::Serialize;

/// Something noteworthy found while migrating a translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Observation {
    /// An array allocation, `new T[n]`, left unchanged.
    ArrayAllocation {
        /// Range of the allocation.
        span: Span,
        /// Array length, when written as an integer literal.
        length: Option<u64>,
    },
    /// An array deallocation, `delete[] p`, left unchanged.
    ArrayDeallocation {
        /// Range of the deallocation.
        span: Span,
    },
    /// A nonzero integer literal assigned to a pointer.
    NonzeroPointerLiteral {
        /// Range of the assignment.
        span: Span,
        /// Assigned pointer.
        name: String,
        /// Literal text as written.
        literal: String,
    },
    /// A pointer assigned from another name, left unchanged.
    NameAssignment {
        /// Range of the assignment.
        span: Span,
        /// Assigned-to name.
        lhs: String,
        /// Assigned-from name.
        rhs: String,
    },
    /// A pointer variable at namespace scope, left unchanged.
    GlobalPointer {
        /// Range of the declaration.
        span: Span,
        /// Variable name.
        name: String,
    },
    /// An edit dropped because an earlier edit already claimed its text.
    EditConflict {
        /// Range of the dropped edit.
        rejected: Span,
        /// Range of the committed edit it collided with.
        existing: Span,
    },
    /// An edit dropped because it does not address the source buffer.
    InvalidEdit {
        /// Range of the dropped edit.
        span: Span,
        /// Why the edit was refused.
        reason: String,
    },
}

impl Observation {
    /// Returns the source range the observation refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::ArrayAllocation { span, .. }
            | Self::ArrayDeallocation { span }
            | Self::NonzeroPointerLiteral { span, .. }
            | Self::NameAssignment { span, .. }
            | Self::GlobalPointer { span, .. }
            | Self::InvalidEdit { span, .. } => *span,
            Self::EditConflict { rejected, .. } => *rejected,
        }
    }

    /// Returns true for observations about edits that were dropped.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::EditConflict { .. } | Self::InvalidEdit { .. })
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrayAllocation {
                length: Some(length),
                ..
            } => write!(f, "array allocation of {length} elements left unchanged"),
            Self::ArrayAllocation { length: None, .. } => {
                f.write_str("array allocation left unchanged")
            }
            Self::ArrayDeallocation { .. } => f.write_str("array deallocation left unchanged"),
            Self::NonzeroPointerLiteral { name, literal, .. } => {
                write!(f, "nonzero literal `{literal}` assigned to pointer `{name}`")
            }
            Self::NameAssignment { lhs, rhs, .. } => {
                write!(f, "pointer `{lhs}` assigned from `{rhs}` left unchanged")
            }
            Self::GlobalPointer { name, .. } => {
                write!(f, "global pointer `{name}` left unchanged")
            }
            Self::EditConflict { rejected, existing } => {
                write!(f, "edit at {rejected} overlaps earlier edit at {existing}")
            }
            Self::InvalidEdit { span, reason } => write!(f, "edit at {span} dropped: {reason}"),
        }
    }
}
