//! Static node/edge universe shared by every step.
//!
//! Node identity is the upstream string id and is stable across the whole
//! sweep; the universe never changes size. Edges arrive globally sorted by
//! descending strength and are never re-sorted here - a step activates a
//! prefix of this order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One node of the universe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Upstream-assigned display color (CSS-style string).
    #[serde(default)]
    pub color: Option<String>,
}

/// One association edge. `strength` is a positive real; the global edge
/// array is sorted by descending strength with ties keeping original order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub strength: f64,
}

/// The full universe plus resolved edge endpoints.
///
/// Endpoint resolution happens once at construction; an edge referencing an
/// unknown node id is a fatal upstream-contract violation.
#[derive(Clone, Debug)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Edge endpoints as indices into `nodes`, same order as `edges`.
    endpoints: Vec<(usize, usize)>,
    index_of: HashMap<String, usize>,
}

impl GraphData {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, DataError> {
        let index_of: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut endpoints = Vec::with_capacity(edges.len());
        for (edge_index, edge) in edges.iter().enumerate() {
            let a = *index_of
                .get(&edge.source)
                .ok_or_else(|| DataError::UnknownNode {
                    edge_index,
                    node_id: edge.source.clone(),
                })?;
            let b = *index_of
                .get(&edge.target)
                .ok_or_else(|| DataError::UnknownNode {
                    edge_index,
                    node_id: edge.target.clone(),
                })?;
            endpoints.push((a, b));
        }

        Ok(Self {
            nodes,
            edges,
            endpoints,
            index_of,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    /// Resolved endpoint indices of edge `i`.
    pub fn endpoints(&self, i: usize) -> (usize, usize) {
        self.endpoints[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            id: id.into(),
            color: None,
        }
    }

    fn edge(a: &str, b: &str, s: f64) -> Edge {
        Edge {
            source: a.into(),
            target: b.into(),
            strength: s,
        }
    }

    #[test]
    fn resolves_endpoints() {
        let g = GraphData::new(
            vec![node("a"), node("b"), node("c")],
            vec![edge("a", "c", 2.0), edge("c", "b", 1.0)],
        )
        .unwrap();
        assert_eq!(g.endpoints(0), (0, 2));
        assert_eq!(g.endpoints(1), (2, 1));
        assert_eq!(g.index_of("b"), Some(1));
    }

    #[test]
    fn unknown_node_is_fatal() {
        let err = GraphData::new(vec![node("a")], vec![edge("a", "nope", 1.0)]).unwrap_err();
        match err {
            crate::error::DataError::UnknownNode { edge_index, node_id } => {
                assert_eq!(edge_index, 0);
                assert_eq!(node_id, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
