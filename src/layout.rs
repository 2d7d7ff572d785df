//! Shared 2D node positions for drawing an original graph and its filtered version.
//!
//! Positions are indexed by node id, so a layout computed on the original graph applies
//! unchanged to the filtered one (same node set).

use crate::graph::Graph;
use crate::laplacian::normalized_laplacian;
use crate::spectrum::{smallest_eigenpairs, EigenSolverConfig};
use crate::Result;

/// Spectral layout: node `i` sits at the `i`-th entries of the eigenvectors of the 2nd and
/// 3rd smallest normalized-Laplacian eigenvalues.
///
/// Coordinates are centered per axis and scaled so the largest magnitude is 1. With three
/// nodes only one non-trivial eigenvector exists and every `y` is 0. One node sits at the
/// origin, two nodes at `[-1, 0]` and `[1, 0]`.
pub fn spectral_layout<G: Graph>(graph: &G, solver: &EigenSolverConfig) -> Result<Vec<[f64; 2]>> {
    let n = graph.node_count();
    match n {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![[0.0, 0.0]]),
        2 => return Ok(vec![[-1.0, 0.0], [1.0, 0.0]]),
        _ => {}
    }

    let pairs = smallest_eigenpairs(&normalized_laplacian(graph), (n - 1).min(3), solver)?;
    let mut pos: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let x = pairs.vectors[(i, 1)];
            let y = if pairs.len() > 2 { pairs.vectors[(i, 2)] } else { 0.0 };
            [x, y]
        })
        .collect();
    rescale(&mut pos);
    Ok(pos)
}

fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }
    let lim = pos
        .iter()
        .flat_map(|p| p.iter())
        .fold(0.0_f64, |m, &x| m.max(x.abs()));
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= lim;
            p[1] /= lim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{community_graph_seeded, CommunityGraphConfig};
    use crate::graph::UndirectedGraph;

    #[test]
    fn layout_is_finite_centered_and_bounded() {
        let g = community_graph_seeded(&CommunityGraphConfig::default(), 42).unwrap();
        let pos = spectral_layout(&g, &EigenSolverConfig::default()).unwrap();
        assert_eq!(pos.len(), g.node_count());
        let mut max_abs = 0.0_f64;
        for axis in 0..2 {
            let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / pos.len() as f64;
            assert!(mean.abs() < 1e-9, "axis {axis} mean {mean}");
        }
        for p in &pos {
            assert!(p[0].is_finite() && p[1].is_finite());
            max_abs = max_abs.max(p[0].abs()).max(p[1].abs());
        }
        assert!((max_abs - 1.0).abs() < 1e-12);
    }

    #[test]
    fn layout_is_deterministic() {
        let g = community_graph_seeded(&CommunityGraphConfig::default(), 1).unwrap();
        let cfg = EigenSolverConfig::default();
        assert_eq!(
            spectral_layout(&g, &cfg).unwrap(),
            spectral_layout(&g, &cfg).unwrap()
        );
    }

    #[test]
    fn small_graphs_get_fixed_positions() {
        let cfg = EigenSolverConfig::default();
        assert!(spectral_layout(&UndirectedGraph::with_nodes(0), &cfg)
            .unwrap()
            .is_empty());
        assert_eq!(
            spectral_layout(&UndirectedGraph::with_nodes(2), &cfg).unwrap(),
            vec![[-1.0, 0.0], [1.0, 0.0]]
        );
        let path = UndirectedGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let pos = spectral_layout(&path, &cfg).unwrap();
        assert_eq!(pos.len(), 3);
        assert!(pos.iter().all(|p| p[1] == 0.0));
    }
}
