//! The fully resolved view of one step: nodes with component assignments,
//! the active edge prefix tagged with component ids, and the per-component
//! grouping the views share.
//!
//! Snapshots are transient. They are rebuilt by the harmonizer on every
//! committed step change and owned by the commit that produced them;
//! nothing mutates a snapshot after construction.

use glam::DVec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-step component label: the index of the component's lowest-index
/// member node. Deterministic and independent of edge iteration order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SubgraphId(pub usize);

impl std::fmt::Display for SubgraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A universe node with its assignment for this step.
#[derive(Clone, Debug)]
pub struct MemberNode {
    /// Index into the static universe.
    pub index: usize,
    pub id: String,
    pub color: Option<String>,
    pub subgraph: SubgraphId,
    /// Anchor point pulling this node's layout toward its subgraph region.
    pub anchor: DVec2,
}

/// An edge of the active prefix with its component tag.
#[derive(Clone, Debug)]
pub struct ActiveEdge {
    /// Index into the global edge order.
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub strength: f64,
    pub subgraph: SubgraphId,
}

/// Node and edge membership of one component.
#[derive(Clone, Debug, Default)]
pub struct SubgraphGroup {
    /// Universe indices, ascending.
    pub nodes: Vec<usize>,
    /// Positions into the snapshot's `edges` vec, ascending.
    pub edges: Vec<usize>,
}

/// Upstream summary statistics with the external id resolved to this
/// step's component labeling.
#[derive(Clone, Debug)]
pub struct SubgraphStats {
    pub id: SubgraphId,
    pub external_id: String,
    pub size: u32,
    pub density: f64,
    pub strength: f64,
    pub first_edge: usize,
}

/// Everything the three views need for one step.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub step_index: usize,
    /// All universe nodes, in universe order.
    pub nodes: Vec<MemberNode>,
    /// The active prefix, in global order; `len() == n_edges`.
    pub edges: Vec<ActiveEdge>,
    /// Disjoint, exhaustive partition of the node universe.
    /// Keyed and ordered by ascending `SubgraphId`.
    pub groups: IndexMap<SubgraphId, SubgraphGroup>,
    pub subgraphs: Vec<SubgraphStats>,
}

impl Snapshot {
    /// Anchor of a component (anchors are uniform within a group).
    pub fn anchor_of(&self, id: SubgraphId) -> Option<DVec2> {
        let group = self.groups.get(&id)?;
        group.nodes.first().map(|&n| self.nodes[n].anchor)
    }

    /// Neighbors of `node` over the active prefix, sorted by descending
    /// edge strength. Ties keep global edge order.
    pub fn neighbors_of(&self, node: usize) -> Vec<(usize, f64)> {
        let mut out: Vec<(usize, f64)> = self
            .edges
            .iter()
            .filter_map(|e| {
                if e.source == node {
                    Some((e.target, e.strength))
                } else if e.target == node {
                    Some((e.source, e.strength))
                } else {
                    None
                }
            })
            .collect();
        out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    /// Strength extent (min, max) of the active prefix, if any edges are
    /// active.
    pub fn strength_extent(&self) -> Option<(f64, f64)> {
        let mut iter = self.edges.iter().map(|e| e.strength);
        let first = iter.next()?;
        let mut lo = first;
        let mut hi = first;
        for s in iter {
            lo = lo.min(s);
            hi = hi.max(s);
        }
        Some((lo, hi))
    }
}
