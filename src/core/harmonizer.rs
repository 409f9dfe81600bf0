//! Per-step data harmonization.
//!
//! **Architecture**: the harmonizer does NOT own the universe. It receives
//! `&GraphData` plus one `Step` and produces a fresh `Snapshot`; the caller
//! (the commit protocol) owns the result. Nothing here is cached across
//! steps, which is what makes A -> B -> A restore the same partition.
//!
//! Labeling is union-find over universe indices with the component root
//! canonicalized to the lowest member index, so the same step always yields
//! the same assignment regardless of edge iteration order. Nodes with no
//! incident edge in the active prefix become singleton components.

use glam::DVec2;
use indexmap::IndexMap;
use log::{debug, trace};

use crate::entities::{
    ActiveEdge, GraphData, MemberNode, Snapshot, Step, SubgraphGroup, SubgraphId, SubgraphStats,
};
use crate::error::DataError;

/// Disjoint-set forest where the representative of every set is its lowest
/// member index. Union attaches the larger root under the smaller one.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if ra < rb {
            self.parent[rb] = ra;
        } else {
            self.parent[ra] = rb;
        }
    }
}

/// Builds the resolved snapshot for a step.
pub struct Harmonizer {
    /// World-space extent the anchor grid spans (viewport interior).
    world: DVec2,
}

impl Harmonizer {
    pub fn new(world_width: f64, world_height: f64) -> Self {
        Self {
            world: DVec2::new(world_width, world_height),
        }
    }

    /// Resolve one step into a snapshot.
    ///
    /// Fails only on upstream contract breaches; a step with zero active
    /// edges resolves to all-singleton components.
    pub fn harmonize(&self, data: &GraphData, step: &Step) -> Result<Snapshot, DataError> {
        let n_nodes = data.node_count();
        let n_edges = step.n_edges;
        if n_edges > data.edges.len() {
            return Err(DataError::EdgePrefixOutOfRange {
                step: step.index,
                n_edges,
                available: data.edges.len(),
            });
        }

        // Label components over the active prefix.
        let mut dsu = DisjointSet::new(n_nodes);
        for i in 0..n_edges {
            let (a, b) = data.endpoints(i);
            dsu.union(a, b);
        }

        // Group nodes in ascending universe order: deterministic insertion
        // order and ascending SubgraphId keys fall out together.
        let mut groups: IndexMap<SubgraphId, SubgraphGroup> = IndexMap::new();
        let mut labels = Vec::with_capacity(n_nodes);
        for node in 0..n_nodes {
            let id = SubgraphId(dsu.find(node));
            labels.push(id);
            groups.entry(id).or_default().nodes.push(node);
        }

        let mut edges = Vec::with_capacity(n_edges);
        for i in 0..n_edges {
            let (source, target) = data.endpoints(i);
            let subgraph = labels[source];
            groups
                .entry(subgraph)
                .or_default()
                .edges
                .push(edges.len());
            edges.push(ActiveEdge {
                index: i,
                source,
                target,
                strength: data.edges[i].strength,
                subgraph,
            });
        }

        let anchors = self.place_anchors(&groups);

        let nodes = data
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| MemberNode {
                index,
                id: node.id.clone(),
                color: node.color.clone(),
                subgraph: labels[index],
                anchor: anchors[&labels[index]],
            })
            .collect();

        // Join the upstream summary rows to this step's labeling through
        // their first_edge.
        let mut subgraphs = Vec::with_capacity(step.subgraphs.len());
        for row in &step.subgraphs {
            if row.first_edge >= n_edges {
                return Err(DataError::UnresolvedSummary {
                    step: step.index,
                    external_id: row.id.clone(),
                    first_edge: row.first_edge,
                    n_edges,
                });
            }
            let (source, _) = data.endpoints(row.first_edge);
            subgraphs.push(SubgraphStats {
                id: labels[source],
                external_id: row.id.clone(),
                size: row.size,
                density: row.density,
                strength: row.strength,
                first_edge: row.first_edge,
            });
        }

        debug!(
            "harmonized step {}: {} edges active, {} subgraphs",
            step.index,
            n_edges,
            groups.len()
        );
        trace!("labels: {:?}", labels);

        Ok(Snapshot {
            step_index: step.index,
            nodes,
            edges,
            groups,
            subgraphs,
        })
    }

    /// Anchor placement: components ordered by descending size (ties by
    /// ascending id) on a near-square grid spanning the world extent,
    /// anchored at cell centers.
    fn place_anchors(
        &self,
        groups: &IndexMap<SubgraphId, SubgraphGroup>,
    ) -> IndexMap<SubgraphId, DVec2> {
        let mut order: Vec<(SubgraphId, usize)> = groups
            .iter()
            .map(|(id, g)| (*id, g.nodes.len()))
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let k = order.len().max(1);
        let cols = (k as f64).sqrt().ceil() as usize;
        let rows = k.div_ceil(cols);
        let cell = DVec2::new(
            self.world.x / cols as f64,
            self.world.y / rows as f64,
        );

        order
            .into_iter()
            .enumerate()
            .map(|(i, (id, _))| {
                let col = i % cols;
                let row = i / cols;
                let anchor = DVec2::new(
                    (col as f64 + 0.5) * cell.x,
                    (row as f64 + 0.5) * cell.y,
                );
                (id, anchor)
            })
            .collect()
    }
}
