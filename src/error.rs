//! Error taxonomy for upstream data-contract violations.
//!
//! These are fatal: they mean the precomputed step structure and the
//! node/edge universe disagree, which cannot be repaired locally. The
//! commit that hit one is abandoned wholesale so no partial snapshot
//! reaches subscribers. Interaction races are NOT errors - guarded
//! transitions drop the request and log at debug.

use thiserror::Error;

/// Fatal inconsistency between the step structure and the graph universe.
#[derive(Debug, Error)]
pub enum DataError {
    /// An edge references a node id missing from the universe.
    #[error("edge {edge_index} references unknown node id {node_id:?}")]
    UnknownNode { edge_index: usize, node_id: String },

    /// A summary row's first_edge does not fall inside the step's active
    /// edge prefix, so it cannot be resolved to a labeled component.
    #[error(
        "subgraph summary {external_id:?} has first_edge {first_edge} outside \
         the active prefix of {n_edges} edges (step {step})"
    )]
    UnresolvedSummary {
        step: usize,
        external_id: String,
        first_edge: usize,
        n_edges: usize,
    },

    /// A step asks for more edges than the global order contains.
    #[error("step {step} selects {n_edges} edges but only {available} exist")]
    EdgePrefixOutOfRange {
        step: usize,
        n_edges: usize,
        available: usize,
    },

    /// Step index outside the precomputed sequence.
    #[error("step index {step} out of range (have {step_count} steps)")]
    StepOutOfRange { step: usize, step_count: usize },

    /// The timeline needs at least one step record to select a default.
    #[error("empty step sequence")]
    NoSteps,
}
