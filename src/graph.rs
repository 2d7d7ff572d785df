//! Graph adapters and the crate's concrete simple graph.
//!
//! Algorithms take any [`Graph`] adapter; everything the crate *produces* is an
//! [`UndirectedGraph`], whose invariants (no self-loops, no parallel edges, symmetric
//! neighbor lists) are enforced on every mutation.

use crate::{Error, Result};

/// Read-only adjacency view with node ids `0..node_count()`.
pub trait Graph {
    fn node_count(&self) -> usize;

    /// Neighbors of `node`. Adapters for undirected graphs list each edge from both ends.
    fn neighbors(&self, node: usize) -> Vec<usize>;

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }
}

/// Dense matrix adapter: any non-zero entry `adj[u][v]` is an edge `u -> v`.
///
/// Row count is the node count. Rows shorter than the node count are treated as zero-padded.
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyMatrix<'a>(pub &'a [Vec<f64>]);

impl Graph for AdjacencyMatrix<'_> {
    fn node_count(&self) -> usize {
        self.0.len()
    }

    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.0[node]
            .iter()
            .enumerate()
            .filter(|(_, &w)| w != 0.0)
            .map(|(v, _)| v)
            .collect()
    }
}

/// Node and edge counts, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Undirected simple graph over the dense node range `0..n`.
///
/// Neighbor lists are kept sorted, so two graphs compare equal iff they have the same node
/// count and the same edge set. Serialized as an [`EdgeList`]; deserialization rebuilds the
/// graph through [`UndirectedGraph::from_edges`], so malformed input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "EdgeList", into = "EdgeList")
)]
pub struct UndirectedGraph {
    adj: Vec<Vec<usize>>,
    edge_count: usize,
}

/// Node count plus canonical edges; the serialized form of [`UndirectedGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeList {
    pub nodes: usize,
    pub edges: Vec<(usize, usize)>,
}

impl TryFrom<EdgeList> for UndirectedGraph {
    type Error = Error;

    fn try_from(list: EdgeList) -> Result<Self> {
        Self::from_edges(list.nodes, &list.edges)
    }
}

impl From<UndirectedGraph> for EdgeList {
    fn from(g: UndirectedGraph) -> Self {
        EdgeList {
            nodes: g.node_count(),
            edges: g.edges().collect(),
        }
    }
}

impl UndirectedGraph {
    /// `n` isolated nodes.
    pub fn with_nodes(n: usize) -> Self {
        Self {
            adj: vec![Vec::new(); n],
            edge_count: 0,
        }
    }

    /// Build from an edge list. Duplicates (in either orientation) collapse into one edge.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut g = Self::with_nodes(n);
        for &(u, v) in edges {
            g.add_edge(u, v)?;
        }
        Ok(g)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count,
        }
    }

    /// Sorted neighbors of `node`.
    ///
    /// Panics if `node >= node_count()`, like slice indexing.
    pub fn neighbors_ref(&self, node: usize) -> &[usize] {
        &self.adj[node]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.adj.get(node).map_or(0, Vec::len)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        match self.adj.get(u) {
            Some(ns) => ns.binary_search(&v).is_ok(),
            None => false,
        }
    }

    /// Insert `{u, v}`. Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<bool> {
        self.check_pair(u, v)?;
        Ok(self.insert(u, v))
    }

    /// Remove `{u, v}`. Returns `false` if the edge was absent.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> Result<bool> {
        self.check_pair(u, v)?;
        Ok(self.delete(u, v))
    }

    /// Flip membership of `{u, v}`. Returns `true` if the edge is present afterwards.
    pub fn toggle_edge(&mut self, u: usize, v: usize) -> Result<bool> {
        self.check_pair(u, v)?;
        Ok(self.flip(u, v))
    }

    /// Canonical edges `(i, j)` with `i < j`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj.iter().enumerate().flat_map(|(u, ns)| {
            ns.iter()
                .copied()
                .filter(move |&v| v > u)
                .map(move |v| (u, v))
        })
    }

    fn check_pair(&self, u: usize, v: usize) -> Result<()> {
        let n = self.node_count();
        if u >= n {
            return Err(Error::IndexOutOfBounds(u));
        }
        if v >= n {
            return Err(Error::IndexOutOfBounds(v));
        }
        if u == v {
            return Err(Error::InvalidParameter(format!(
                "self-loop on node {u} is not allowed"
            )));
        }
        Ok(())
    }

    // The unchecked mutators below assume `u != v` and both ids in range.

    pub(crate) fn insert(&mut self, u: usize, v: usize) -> bool {
        let Err(pos) = self.adj[u].binary_search(&v) else {
            return false;
        };
        self.adj[u].insert(pos, v);
        if let Err(pos) = self.adj[v].binary_search(&u) {
            self.adj[v].insert(pos, u);
        }
        self.edge_count += 1;
        true
    }

    pub(crate) fn delete(&mut self, u: usize, v: usize) -> bool {
        let Ok(pos) = self.adj[u].binary_search(&v) else {
            return false;
        };
        self.adj[u].remove(pos);
        if let Ok(pos) = self.adj[v].binary_search(&u) {
            self.adj[v].remove(pos);
        }
        self.edge_count -= 1;
        true
    }

    pub(crate) fn flip(&mut self, u: usize, v: usize) -> bool {
        if self.delete(u, v) {
            false
        } else {
            self.insert(u, v)
        }
    }
}

impl Graph for UndirectedGraph {
    fn node_count(&self) -> usize {
        self.adj.len()
    }

    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.adj[node].clone()
    }

    fn out_degree(&self, node: usize) -> usize {
        self.adj[node].len()
    }
}

#[cfg(feature = "petgraph")]
mod petgraph_adapter {
    use super::{Graph, UndirectedGraph};
    use petgraph::graph::{IndexType, NodeIndex, UnGraph};
    use petgraph::EdgeType;

    impl<N, E, Ty: EdgeType, Ix: IndexType> Graph for petgraph::Graph<N, E, Ty, Ix> {
        fn node_count(&self) -> usize {
            petgraph::Graph::node_count(self)
        }

        fn neighbors(&self, node: usize) -> Vec<usize> {
            petgraph::Graph::neighbors(self, NodeIndex::new(node))
                .map(|n| n.index())
                .collect()
        }
    }

    impl From<&UndirectedGraph> for UnGraph<(), ()> {
        fn from(g: &UndirectedGraph) -> Self {
            let mut out = UnGraph::with_capacity(g.node_count(), g.edge_count());
            for _ in 0..g.node_count() {
                out.add_node(());
            }
            for (u, v) in g.edges() {
                out.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
            }
            out
        }
    }
}
