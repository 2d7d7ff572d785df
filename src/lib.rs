//! `graphfilter`: noisy community graphs and spectral low-pass graph filtering.
//!
//! Two pieces, used in sequence:
//! - [`community_graph`]: a stochastic block model with planted communities, followed by a
//!   uniform edge-flip noise pass. Randomness is always injected by the caller.
//! - [`low_pass_filter`]: normalized Laplacian → partial eigendecomposition → keep the
//!   low-frequency eigenpairs → reconstruct a weight matrix → threshold it back into a graph.
//!
//! Public invariants (must not drift):
//! - **Node set**: every graph produced here has node ids \(0..n-1\); filtering never adds or
//!   removes nodes, only recomputes edges.
//! - **Simple graphs**: no self-loops, no parallel edges, `{i,j} == {j,i}`.
//! - **Determinism**: the generator is deterministic given the RNG state; the filter is
//!   deterministic given identical inputs + configs.
//! - **No silent recovery**: invalid parameters and eigensolver failures are returned as
//!   errors, never retried with different settings.
//!
//! Swappable (allowed to change without breaking the contract):
//! - dense vs streaming reconstruction (identical results)
//! - serial vs parallel reconstruction (identical results)
//! - eigenvector signs and ordering inside numerically degenerate eigenspaces

pub mod filter;
pub mod generate;
pub mod graph;
pub mod laplacian;
pub mod layout;
pub mod spectrum;
pub mod stats;

pub use filter::{
    low_pass_filter, low_pass_filter_run, reconstruct_weights, select_low_frequency,
    threshold_graph, weight_threshold, FilterRun, LowPassConfig, Reconstruction,
    DEFAULT_EIGENPAIRS,
};
pub use generate::{
    community_graph, community_graph_seeded, community_labels, CommunityGraphConfig,
};
pub use graph::{AdjacencyMatrix, EdgeList, Graph, GraphSummary, UndirectedGraph};
pub use laplacian::{adjacency_matrix, degrees, normalized_laplacian};
pub use layout::spectral_layout;
pub use spectrum::{smallest_eigenpairs, EigenPairs, EigenSolverConfig};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("eigensolver failed: {0}")]
    NumericalConvergence(String),
}

pub type Result<T> = std::result::Result<T, Error>;
