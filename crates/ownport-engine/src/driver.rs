//! Single-pass traversal submitting edits for one translation unit.

use ownport_syntax::SyntaxNode;
use tracing::{debug, warn};

use crate::classify::{Verdict, classify};
use crate::error::{EngineError, Rejection};
use crate::ledger::{EditLedger, EditRecord};
use crate::options::RewriteOptions;
use crate::render;
use crate::report::Observation;
use crate::Migration;

/// Per-translation-unit state: the edit ledger and the observation log.
///
/// A context is created when traversal starts and consumed by
/// [`TransformationContext::finish`]; it is never shared.
#[derive(Debug)]
pub struct TransformationContext<'a> {
    options: &'a RewriteOptions,
    source: &'a [u8],
    ledger: EditLedger<'a>,
    observations: Vec<Observation>,
}

impl<'a> TransformationContext<'a> {
    /// Creates a context over the original `source` buffer.
    #[must_use]
    pub const fn new(options: &'a RewriteOptions, source: &'a [u8]) -> Self {
        Self {
            options,
            source,
            ledger: EditLedger::new(source),
            observations: Vec::new(),
        }
    }

    /// Visits every node of `root` once, in preorder, dispatching each.
    ///
    /// A node's edits never cover its children on its behalf; children are
    /// dispatched on their own and lose to any overlapping ancestor edit.
    pub fn visit(&mut self, root: &SyntaxNode) {
        for node in root.preorder() {
            self.dispatch(node);
        }
    }

    fn dispatch(&mut self, node: &SyntaxNode) {
        match classify(node) {
            Verdict::Rewrite(target) => {
                let records = render::edits(self.options, self.source, &target);
                debug!(span = %node.span, edits = records.len(), "rewrite target");
                for record in records {
                    self.submit(record);
                }
            }
            Verdict::Recognized(observation) => {
                debug!(span = %node.span, %observation, "left unchanged");
                self.observations.push(observation);
            }
            Verdict::Unrecognized => {}
        }
    }

    fn submit(&mut self, record: EditRecord) {
        let Err(rejection) = self.ledger.submit(record) else {
            return;
        };
        warn!(%rejection, "edit dropped");
        let observation = match rejection {
            Rejection::Overlap { span, existing } => Observation::EditConflict {
                rejected: span,
                existing,
            },
            Rejection::OutOfBounds { span, .. } => Observation::InvalidEdit {
                span,
                reason: rejection.to_string(),
            },
        };
        self.observations.push(observation);
    }

    /// Returns the observations recorded so far.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Materializes the ledger into the migrated buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger's non-overlap invariant is broken.
    pub fn finish(self) -> Result<Migration, EngineError> {
        let materialized = self.ledger.materialize(&render::preamble(self.options))?;
        Ok(Migration {
            changed: materialized.changed(),
            output: materialized.output,
            applied: materialized.applied,
            observations: self.observations,
        })
    }
}
