//! Recoverable generation diagnostics.
//!
//! Generation never aborts: every failure below is collected on the result and
//! echoed through the `log` facade, and the zone is finalized with whatever
//! could be placed.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("could not place {child} under {parent}: every placement strategy failed")]
    PlacementExhausted { parent: String, child: String },
    #[error("placement loop exceeded {dequeues} dequeues; zone finalized with a partial layout")]
    Livelock { dequeues: usize },
    #[error("missing {what}")]
    MissingLookup { what: String },
}

impl GenerationError {
    pub fn is_placement_failure(&self) -> bool {
        matches!(self, Self::PlacementExhausted { .. })
    }
}
