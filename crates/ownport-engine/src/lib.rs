//! Raw-pointer to owning-pointer migration engine.
//!
//! The engine consumes a typed syntax tree from an
//! [`ownport_syntax::SyntaxProvider`] together with the buffer it was
//! produced from, and rewrites pointer declarations, allocations,
//! deallocations and related expressions into owning smart-pointer
//! constructs. Unrelated text is copied through unchanged.
//!
//! A run has four stages:
//!
//! 1. [`classify`] decides, per node, whether it is a rewrite target.
//! 2. [`render`] turns each target into replacement bytes.
//! 3. [`EditLedger`] accepts edits first-writer-wins, refusing overlaps.
//! 4. [`Migrator::migrate`] materializes the ledger into the output buffer.
//!
//! # Example
//!
//! ```
//! use ownport_engine::Migrator;
//! use ownport_syntax::{CppProvider, SyntaxProvider};
//!
//! let source = b"void f() { int *p = new int; delete p; }";
//! let tree = CppProvider::new()?.provide(source)?;
//! let migration = Migrator::default().migrate(&tree, source)?;
//! assert!(migration.changed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classify;
mod driver;
mod error;
mod ledger;
mod options;
pub mod render;
mod report;

use ownport_syntax::SyntaxNode;
use tracing::info;

pub use driver::TransformationContext;
pub use error::{EngineError, Rejection};
pub use ledger::{EditLedger, EditRecord, Materialized};
pub use options::RewriteOptions;
pub use report::Observation;

/// Applies the migration to whole translation units.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    options: RewriteOptions,
}

impl Migrator {
    /// Creates a migrator rendering with `options`.
    #[must_use]
    pub const fn new(options: RewriteOptions) -> Self {
        Self { options }
    }

    /// Migrates one translation unit.
    ///
    /// `source` must be the buffer `unit` was produced from. The run is a
    /// single pass: feeding the output back in is not a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree addresses bytes past the end of
    /// `source`, or if the ledger's invariants are violated.
    pub fn migrate(&self, unit: &SyntaxNode, source: &[u8]) -> Result<Migration, EngineError> {
        if unit.span.end > source.len() {
            return Err(EngineError::source_mismatch(unit.span.end, source.len()));
        }

        let mut context = TransformationContext::new(&self.options, source);
        context.visit(unit);
        let migration = context.finish()?;

        info!(
            nodes = unit.node_count(),
            applied = migration.applied.len(),
            observations = migration.observations.len(),
            changed = migration.changed,
            "migration finished"
        );
        Ok(migration)
    }
}

/// Outcome of migrating one translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    changed: bool,
    output: Vec<u8>,
    applied: Vec<EditRecord>,
    observations: Vec<Observation>,
}

impl Migration {
    /// Returns true when at least one edit was applied.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.changed
    }

    /// Returns the migrated buffer, preamble included.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Returns the applied edits in document order.
    #[must_use]
    pub fn applied(&self) -> &[EditRecord] {
        &self.applied
    }

    /// Returns the observations recorded during the run.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}
