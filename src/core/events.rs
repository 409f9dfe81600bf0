//! Events published on the bus during the commit protocol and focus
//! transitions.
//!
//! Subscribers (typically the embedding host's view glue) receive these
//! synchronously; the snapshot is shared read-only and must not be held
//! past the next commit.

use std::sync::Arc;

use crate::entities::{Snapshot, SubgraphId};

/// A new step was pinned and the commit protocol ran to completion.
///
/// Emitted last in the protocol: harmonize, layout swap and view reset have
/// already happened by the time subscribers see this.
#[derive(Clone, Debug)]
pub struct SnapshotCommitted {
    pub step: usize,
    pub snapshot: Arc<Snapshot>,
}

/// Focus entered or left a subgraph. `None` means back to overview.
#[derive(Clone, Debug)]
pub struct FocusChanged {
    pub subgraph: Option<SubgraphId>,
}

/// Node highlight toggled inside the focused subgraph.
#[derive(Clone, Debug)]
pub struct NodeHighlightChanged {
    pub node: Option<usize>,
}
