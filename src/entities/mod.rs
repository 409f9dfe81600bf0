//! Entities module - the data model, separated from the engines that use it
//!
//! Static inputs (node/edge universe, per-step summary and metric rows)
//! arrive preloaded from upstream; the `Snapshot` is the only derived
//! entity and is rebuilt on every committed step change.

pub mod graph;
pub mod snapshot;
pub mod step;

pub use graph::{Edge, GraphData, Node};
pub use snapshot::{ActiveEdge, MemberNode, Snapshot, SubgraphGroup, SubgraphId, SubgraphStats};
pub use step::{Step, StepRecord, SubgraphSummary};
