//! Spectral (graph-Fourier) low-pass filtering.
//!
//! Pipeline:
//! 1. normalized Laplacian \(L\) of the input graph
//! 2. the `k` smallest eigenpairs of \(L\) (`k` capped at `n - 1`)
//! 3. keep pairs whose eigenvalue is **strictly below** the `cutoff * 100`-th percentile of
//!    those `k` eigenvalues
//! 4. \(W = \left|\sum_i \lambda_i v_i v_i^\top\right|\), then \(W \leftarrow (W + W^\top)/2\)
//! 5. `threshold = mean(W) + 0.5 * std(W)` over all \(n^2\) entries, diagonal included
//! 6. edge `{i, j}` (`i < j`) iff `W[i, j] > threshold`
//!
//! Degenerate cases are conventions, not errors: an empty retained set gives \(W = 0\),
//! threshold 0, and (because the comparison is strict) a graph with no edges.
//!
//! The strict `<` in step 3 means a `cutoff` close to 1 can drop the largest retained
//! eigenvalue; this boundary is kept as is.

use nalgebra::DMatrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::graph::{Graph, UndirectedGraph};
use crate::laplacian::normalized_laplacian;
use crate::spectrum::{smallest_eigenpairs, EigenPairs, EigenSolverConfig};
use crate::stats::{mean_std, percentile, symmetric_entry, symmetrize, threshold_from_stats};
use crate::{Error, Result};

/// Number of eigenpairs requested from the solver before capping at `n - 1`.
pub const DEFAULT_EIGENPAIRS: usize = 15;

/// How the filtered weight matrix is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reconstruction {
    /// Materialize the full `n x n` weight matrix.
    #[default]
    Dense,
    /// Evaluate weights on demand in row-major sweeps; memory stays `O(n k)`.
    ///
    /// Produces the same graph as `Dense`, at roughly three times the arithmetic.
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LowPassConfig {
    /// Fraction of the computed spectrum treated as low frequency, in `(0, 1]`.
    pub cutoff: f64,
    /// Eigenpairs to request (capped at `n - 1`).
    pub k: usize,
    pub solver: EigenSolverConfig,
    pub reconstruction: Reconstruction,
}

impl Default for LowPassConfig {
    fn default() -> Self {
        Self {
            cutoff: 0.5,
            k: DEFAULT_EIGENPAIRS,
            solver: EigenSolverConfig::default(),
            reconstruction: Reconstruction::Dense,
        }
    }
}

impl LowPassConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.cutoff.is_finite() {
            return Err(Error::InvalidParameter("cutoff must be finite".to_string()));
        }
        if self.cutoff <= 0.0 || self.cutoff > 1.0 {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be in (0,1] (got {})",
                self.cutoff
            )));
        }
        if self.k == 0 {
            return Err(Error::InvalidParameter("k must be > 0".to_string()));
        }
        self.solver.validate()
    }
}

/// Filtered graph plus the intermediate quantities that produced it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterRun {
    pub graph: UndirectedGraph,
    /// Eigenpairs actually requested (`min(config.k, n - 1)`).
    pub k: usize,
    /// All `k` eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
    /// Percentile value the eigenvalues were compared against.
    pub eigenvalue_cutoff: f64,
    /// Eigenvalues of the retained (low-frequency) pairs, ascending.
    pub retained: Vec<f64>,
    /// Edge threshold on the weight matrix.
    pub threshold: f64,
    /// Filtered weight matrix; `None` for [`Reconstruction::Streaming`].
    pub weights: Option<DMatrix<f64>>,
}

/// Low-pass filter `graph`, returning only the filtered graph.
pub fn low_pass_filter<G: Graph>(graph: &G, config: &LowPassConfig) -> Result<UndirectedGraph> {
    low_pass_filter_run(graph, config).map(|run| run.graph)
}

/// Low-pass filter `graph`, reporting the spectrum, cutoff and threshold that were used.
///
/// All-or-nothing: parameter and eigensolver errors are returned before any graph is built.
pub fn low_pass_filter_run<G: Graph>(graph: &G, config: &LowPassConfig) -> Result<FilterRun> {
    config.validate()?;
    let n = graph.node_count();
    let laplacian = normalized_laplacian(graph);
    let k = config.k.min(n.saturating_sub(1));
    let pairs = smallest_eigenpairs(&laplacian, k, &config.solver)?;

    let (eigenvalue_cutoff, low) = select_low_frequency(&pairs, config.cutoff);
    if low.is_empty() {
        tracing::debug!(
            k,
            eigenvalue_cutoff,
            "no eigenpairs below cutoff; filtered graph will be empty"
        );
    }

    let (filtered, threshold, weights) = match config.reconstruction {
        Reconstruction::Dense => {
            let w = reconstruct_weights(&low);
            let threshold = weight_threshold(&w);
            let g = threshold_graph(&w, threshold)?;
            (g, threshold, Some(w))
        }
        Reconstruction::Streaming => {
            let entry = |i: usize, j: usize| streamed_weight(&low, i, j);
            let (mean, std) = mean_std(|| {
                (0..n).flat_map(move |i| (0..n).map(move |j| entry(i, j)))
            });
            let threshold = threshold_from_stats(mean, std);
            (sweep_edges(n, threshold, entry), threshold, None)
        }
    };

    tracing::debug!(
        n,
        k,
        eigenvalue_cutoff,
        retained = low.len(),
        threshold,
        edges = filtered.edge_count(),
        "low-pass filter"
    );

    Ok(FilterRun {
        graph: filtered,
        k,
        eigenvalues: pairs.values,
        eigenvalue_cutoff,
        retained: low.values,
        threshold,
        weights,
    })
}

/// Split off the low-frequency pairs: eigenvalue strictly below the `cutoff * 100`-th
/// percentile of `pairs.values`. Returns the percentile value and the retained pairs.
pub fn select_low_frequency(pairs: &EigenPairs, cutoff: f64) -> (f64, EigenPairs) {
    let Some(lambda_cut) = percentile(&pairs.values, cutoff * 100.0) else {
        return (0.0, pairs.select(&[]));
    };
    let keep: Vec<usize> = (0..pairs.len())
        .filter(|&c| pairs.values[c] < lambda_cut)
        .collect();
    (lambda_cut, pairs.select(&keep))
}

// |sum_c lambda_c * v_c[i] * v_c[j]|, accumulated in column order.
fn raw_weight(pairs: &EigenPairs, i: usize, j: usize) -> f64 {
    let v = &pairs.vectors;
    pairs
        .values
        .iter()
        .enumerate()
        .fold(0.0, |acc, (c, &lambda)| acc + v[(i, c)] * v[(j, c)] * lambda)
        .abs()
}

// Entry of the symmetrized matrix without materializing it; bit-identical to the dense path.
fn streamed_weight(pairs: &EigenPairs, i: usize, j: usize) -> f64 {
    if i == j {
        return raw_weight(pairs, i, i);
    }
    let (a, b) = if i < j { (i, j) } else { (j, i) };
    symmetric_entry(raw_weight(pairs, a, b), raw_weight(pairs, b, a))
}

/// Filtered weight matrix \(\left|\sum_i \lambda_i v_i v_i^\top\right|\), symmetrized.
///
/// Always exactly symmetric with non-negative entries; all zeros when `pairs` is empty.
pub fn reconstruct_weights(pairs: &EigenPairs) -> DMatrix<f64> {
    let n = pairs.dim();

    #[cfg(feature = "parallel")]
    let mut w = {
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (0..n).map(|j| raw_weight(pairs, i, j)).collect())
            .collect();
        DMatrix::from_fn(n, n, |i, j| rows[i][j])
    };
    #[cfg(not(feature = "parallel"))]
    let mut w = DMatrix::from_fn(n, n, |i, j| raw_weight(pairs, i, j));

    symmetrize(&mut w);
    w
}

/// `mean(W) + 0.5 * std(W)` over every entry of `w`, diagonal included.
pub fn weight_threshold(w: &DMatrix<f64>) -> f64 {
    let (mean, std) = mean_std(|| w.iter().copied());
    threshold_from_stats(mean, std)
}

/// Graph on `w.nrows()` nodes with edge `{i, j}` iff `w[(i, j)] > threshold`, `i < j`.
pub fn threshold_graph(w: &DMatrix<f64>, threshold: f64) -> Result<UndirectedGraph> {
    if !w.is_square() {
        return Err(Error::InvalidParameter(format!(
            "weight matrix must be square (got {}x{})",
            w.nrows(),
            w.ncols()
        )));
    }
    Ok(sweep_edges(w.nrows(), threshold, |i, j| w[(i, j)]))
}

fn sweep_edges<F: Fn(usize, usize) -> f64>(n: usize, threshold: f64, weight: F) -> UndirectedGraph {
    let mut g = UndirectedGraph::with_nodes(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if weight(i, j) > threshold {
                g.insert(i, j);
            }
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{community_graph_seeded, CommunityGraphConfig};
    use proptest::prelude::*;

    fn two_triangles() -> UndirectedGraph {
        UndirectedGraph::from_edges(6, &[(0, 1), (0, 2), (1, 2), (3, 4), (3, 5), (4, 5)]).unwrap()
    }

    fn config(cutoff: f64) -> LowPassConfig {
        LowPassConfig {
            cutoff,
            ..Default::default()
        }
    }

    #[test]
    fn two_triangles_never_gain_cross_edges() {
        let g = two_triangles();
        let run = low_pass_filter_run(&g, &config(0.99)).unwrap();
        assert_eq!(run.k, 5);
        assert_eq!(run.eigenvalues.len(), 5);
        assert_eq!(run.graph.node_count(), 6);
        for (u, v) in run.graph.edges() {
            assert_eq!(u / 3, v / 3, "cross edge {u}-{v}");
        }
    }

    #[test]
    fn flat_spectrum_retains_nothing_and_yields_no_edges() {
        // L = I: every eigenvalue equals the percentile, none is strictly below it
        let g = UndirectedGraph::with_nodes(8);
        for reconstruction in [Reconstruction::Dense, Reconstruction::Streaming] {
            let cfg = LowPassConfig {
                reconstruction,
                ..config(0.3)
            };
            let run = low_pass_filter_run(&g, &cfg).unwrap();
            assert_eq!(run.k, 7);
            assert_eq!(run.eigenvalue_cutoff, 1.0);
            assert!(run.retained.is_empty());
            assert_eq!(run.threshold, 0.0);
            assert_eq!(run.graph.edge_count(), 0);
            assert_eq!(run.graph.node_count(), 8);
        }
    }

    #[test]
    fn empty_selection_reconstructs_the_zero_matrix() {
        let pairs = EigenPairs {
            values: vec![0.1, 0.2],
            vectors: DMatrix::from_element(5, 2, 0.5),
        };
        let w = reconstruct_weights(&pairs.select(&[]));
        assert_eq!(w.shape(), (5, 5));
        assert!(w.iter().all(|&x| x == 0.0));
        let threshold = weight_threshold(&w);
        assert_eq!(threshold, 0.0);
        assert_eq!(threshold_graph(&w, threshold).unwrap().edge_count(), 0);
    }

    #[test]
    fn retained_eigenvalues_are_strictly_below_cutoff() {
        let g = community_graph_seeded(&CommunityGraphConfig::default(), 11).unwrap();
        let run = low_pass_filter_run(&g, &config(0.6)).unwrap();
        assert_eq!(run.k, DEFAULT_EIGENPAIRS);
        assert!(run.retained.iter().all(|&l| l < run.eigenvalue_cutoff));
        let below = run
            .eigenvalues
            .iter()
            .filter(|&&l| l < run.eigenvalue_cutoff)
            .count();
        assert_eq!(below, run.retained.len());
    }

    #[test]
    fn weights_are_symmetric_and_nonnegative() {
        let g = community_graph_seeded(&CommunityGraphConfig::default(), 2).unwrap();
        let run = low_pass_filter_run(&g, &config(0.99)).unwrap();
        let w = run.weights.unwrap();
        assert_eq!(w, w.transpose());
        assert!(w.iter().all(|&x| x >= 0.0));
        assert_eq!(run.threshold, weight_threshold(&w));
    }

    #[test]
    fn streaming_matches_dense() {
        let g = community_graph_seeded(&CommunityGraphConfig::default(), 99).unwrap();
        for cutoff in [0.3, 0.5, 0.99] {
            let dense = low_pass_filter_run(&g, &config(cutoff)).unwrap();
            let streaming = low_pass_filter_run(
                &g,
                &LowPassConfig {
                    reconstruction: Reconstruction::Streaming,
                    ..config(cutoff)
                },
            )
            .unwrap();
            assert!(streaming.weights.is_none());
            assert_eq!(dense.threshold, streaming.threshold);
            assert_eq!(dense.graph, streaming.graph);
        }
    }

    #[test]
    fn tiny_graphs_fail_in_the_eigensolver() {
        for n in [0, 1] {
            let g = UndirectedGraph::with_nodes(n);
            let err = low_pass_filter(&g, &LowPassConfig::default()).unwrap_err();
            assert!(matches!(err, Error::NumericalConvergence(_)), "n={n}: {err}");
        }
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let g = two_triangles();
        for cutoff in [0.0, -0.5, 1.5, f64::NAN] {
            let err = low_pass_filter(&g, &config(cutoff)).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "cutoff={cutoff}");
        }
        let err = low_pass_filter(&g, &LowPassConfig { k: 0, ..config(0.5) }).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn threshold_graph_is_strict_and_ignores_diagonal() {
        let w = DMatrix::from_row_slice(3, 3, &[9.0, 1.0, 2.0, 1.0, 9.0, 0.5, 2.0, 0.5, 9.0]);
        let g = threshold_graph(&w, 1.0).unwrap();
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 2)]);
        assert!(threshold_graph(&DMatrix::zeros(2, 3), 0.0).is_err());
    }

    #[test]
    fn select_low_frequency_uses_percentile() {
        let pairs = EigenPairs {
            values: vec![0.0, 0.25, 0.5, 1.0],
            vectors: DMatrix::identity(4, 4),
        };
        let (cut, low) = select_low_frequency(&pairs, 0.5);
        assert_eq!(cut, 0.375);
        assert_eq!(low.values, vec![0.0, 0.25]);
        assert_eq!(low.vectors.shape(), (4, 2));
        // 100th percentile is the max itself, which the strict comparison drops
        let (cut, low) = select_low_frequency(&pairs, 1.0);
        assert_eq!(cut, 1.0);
        assert_eq!(low.len(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_filtered_graph_is_simple(seed in any::<u64>(), cutoff in 0.05f64..=1.0, noise in 0.0f64..0.4) {
            let cfg = CommunityGraphConfig { n_nodes: 18, n_communities: 3, noise_level: noise, ..Default::default() };
            let g = community_graph_seeded(&cfg, seed).unwrap();
            let run = low_pass_filter_run(&g, &config(cutoff)).unwrap();
            prop_assert_eq!(run.graph.node_count(), 18);
            for (u, v) in run.graph.edges() {
                prop_assert!(u < v);
            }
            let w = run.weights.unwrap();
            prop_assert_eq!(&w, &w.transpose());
            prop_assert!(w.iter().all(|&x| x >= 0.0));
        }
    }
}
