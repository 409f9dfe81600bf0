//! Per-step structure and metric rows, precomputed upstream.
//!
//! A step is identified by its edge-inclusion threshold expressed as
//! `n_edges`: the length of the active prefix of the global edge order.
//! Subgraph statistics and timeline metrics are never derived here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Upstream statistics for one connected component at one step.
///
/// `first_edge` indexes the global edge order and is how the row is joined
/// to the component labeling of the harmonized snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubgraphSummary {
    pub id: String,
    pub size: u32,
    pub density: f64,
    /// Mean edge strength inside the component.
    pub strength: f64,
    pub first_edge: usize,
}

/// One snapshot of the precomputed sweep.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    pub n_edges: usize,
    pub subgraphs: Vec<SubgraphSummary>,
}

/// Scalar metrics for one step, keyed by metric name.
///
/// `rel_max_size` (largest subgraph size over total node count) drives
/// default-step selection and must be present; any further series are
/// carried verbatim for the timeline charts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub values: IndexMap<String, f64>,
}

impl StepRecord {
    pub const REL_MAX_SIZE: &'static str = "rel_max_size";

    pub fn rel_max_size(&self) -> Option<f64> {
        self.values.get(Self::REL_MAX_SIZE).copied()
    }
}
