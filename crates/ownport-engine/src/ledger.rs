//! Conflict-free collection and application of text edits.
//!
//! The ledger holds a read-only view of the original buffer and the edits
//! committed against it. Edits are never applied incrementally: offsets
//! always refer to the original buffer, and the output is assembled once
//! by [`EditLedger::materialize`].

use ownport_syntax::Span;

use crate::error::{EngineError, Rejection};

/// A replacement of one byte range of the original buffer.
///
/// Replacements are raw bytes so text copied from the source keeps its
/// original encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    span: Span,
    replacement: Vec<u8>,
}

impl EditRecord {
    /// Creates an edit replacing `span` with `replacement`.
    #[must_use]
    pub fn new(span: Span, replacement: impl Into<Vec<u8>>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Returns the replaced range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the replacement bytes.
    #[must_use]
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }
}

/// Result of [`EditLedger::materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// The rewritten buffer, preamble included.
    pub output: Vec<u8>,
    /// Committed edits in document order.
    pub applied: Vec<EditRecord>,
}

impl Materialized {
    /// Returns true when at least one edit was applied.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// First-writer-wins collection of non-overlapping edits.
#[derive(Debug)]
pub struct EditLedger<'a> {
    source: &'a [u8],
    committed: Vec<EditRecord>,
}

impl<'a> EditLedger<'a> {
    /// Creates an empty ledger over `source`.
    #[must_use]
    pub const fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            committed: Vec::new(),
        }
    }

    /// Commits `record` unless it conflicts with the ledger.
    ///
    /// # Errors
    ///
    /// Returns the reason the record was refused: it reaches past the end
    /// of the buffer, or it overlaps a record committed earlier. A refused
    /// record leaves the ledger unchanged.
    pub fn submit(&mut self, record: EditRecord) -> Result<(), Rejection> {
        let span = record.span;
        if span.end > self.source.len() {
            return Err(Rejection::OutOfBounds {
                span,
                len: self.source.len(),
            });
        }
        if let Some(existing) = self.committed.iter().find(|edit| edit.span.overlaps(span)) {
            return Err(Rejection::Overlap {
                span,
                existing: existing.span,
            });
        }
        self.committed.push(record);
        Ok(())
    }

    /// Returns the number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Returns true when nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Splices every committed record into a copy of the buffer.
    ///
    /// `preamble` is prepended whether or not any record was committed;
    /// callers decide from [`Materialized::changed`] whether to use the
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OverlappingEdits`] if two committed records
    /// overlap, which `submit` is meant to prevent.
    pub fn materialize(self, preamble: &str) -> Result<Materialized, EngineError> {
        let mut applied = self.committed;
        applied.sort_by_key(|edit| edit.span.start);
        for pair in applied.windows(2) {
            if let [first, second] = pair
                && first.span.overlaps(second.span)
            {
                return Err(EngineError::overlapping_edits(first.span, second.span));
            }
        }

        let inserted: usize = applied.iter().map(|edit| edit.replacement.len()).sum();
        let mut output = Vec::with_capacity(
            preamble
                .len()
                .saturating_add(self.source.len())
                .saturating_add(inserted),
        );
        output.extend_from_slice(preamble.as_bytes());

        let mut cursor = 0;
        for edit in &applied {
            output.extend_from_slice(self.source.get(cursor..edit.span.start).unwrap_or_default());
            output.extend_from_slice(&edit.replacement);
            cursor = edit.span.end;
        }
        output.extend_from_slice(self.source.get(cursor..).unwrap_or_default());

        Ok(Materialized { output, applied })
    }
}
