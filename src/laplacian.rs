//! Adjacency, degrees, and the symmetric normalized Laplacian.
//!
//! \[
//!   L = I - D^{-1/2} A D^{-1/2}
//! \]
//!
//! Conventions:
//! - `A` is symmetrized: an edge listed from either endpoint counts as undirected.
//! - Self-loops and out-of-range neighbors reported by an adapter are ignored.
//! - Degree-0 nodes use \(D^{-1/2}_{ii} = 0\): their row and column are zero off the diagonal
//!   and the diagonal keeps the identity term, so \(L_{ii} = 1\) (networkx's
//!   `normalized_laplacian_matrix` gives \(L_{ii} = 0\) for such nodes instead).

use nalgebra::DMatrix;

use crate::graph::Graph;

/// Dense 0/1 adjacency matrix with zero diagonal.
pub fn adjacency_matrix<G: Graph>(graph: &G) -> DMatrix<f64> {
    let n = graph.node_count();
    let mut adj = DMatrix::<f64>::zeros(n, n);
    for u in 0..n {
        for v in graph.neighbors(u) {
            if v >= n || v == u {
                continue;
            }
            adj[(u, v)] = 1.0;
            adj[(v, u)] = 1.0;
        }
    }
    adj
}

/// Row sums of a (weighted) adjacency matrix.
pub fn degrees(adj: &DMatrix<f64>) -> Vec<f64> {
    adj.row_iter().map(|row| row.sum()).collect()
}

/// Symmetric normalized Laplacian of `graph`. Eigenvalues lie in `[0, 2]`.
pub fn normalized_laplacian<G: Graph>(graph: &G) -> DMatrix<f64> {
    let adj = adjacency_matrix(graph);
    let n = adj.nrows();
    let inv_sqrt: Vec<f64> = degrees(&adj)
        .into_iter()
        .map(|d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
        .collect();

    let isolated = inv_sqrt.iter().filter(|&&s| s == 0.0).count();
    if isolated > 0 {
        tracing::debug!(isolated, n, "normalized laplacian: degree-0 nodes");
    }

    let mut lap = DMatrix::<f64>::identity(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let a = adj[(i, j)];
            if a != 0.0 {
                let x = -(a * (inv_sqrt[i] * inv_sqrt[j]));
                lap[(i, j)] = x;
                lap[(j, i)] = x;
            }
        }
    }
    lap
}
