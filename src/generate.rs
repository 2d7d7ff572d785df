//! Noisy stochastic block model.
//!
//! The generator plants `n_communities` contiguous blocks, wires them with `p_in` inside a
//! block and `p_out` across blocks, then flips every pair independently with probability
//! `noise_level`.
//!
//! Invariants:
//! - Output has exactly `n_nodes` nodes and is a simple undirected graph.
//! - Randomness comes only from the caller's generator, consumed in a fixed order
//!   (intra-block pairs, then cross-block pairs, then the noise pass), so a fixed seed
//!   reproduces the graph exactly.
//!
//! Block size is `n_nodes / n_communities` (floor). Remainder nodes at the end of the id
//! range belong to no block: they get no intra-community edges, and their block index
//! (`id / block_size`) differs from every real block, so they are wired with `p_out`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::UndirectedGraph;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommunityGraphConfig {
    pub n_nodes: usize,
    pub n_communities: usize,
    /// Edge probability inside a block.
    pub p_in: f64,
    /// Edge probability across blocks.
    pub p_out: f64,
    /// Probability of flipping each pair after the planted structure is drawn.
    pub noise_level: f64,
}

impl Default for CommunityGraphConfig {
    fn default() -> Self {
        Self {
            n_nodes: 30,
            n_communities: 3,
            p_in: 0.5,
            p_out: 0.1,
            noise_level: 0.15,
        }
    }
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if !p.is_finite() {
        return Err(Error::InvalidParameter(format!("{name} must be finite")));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidParameter(format!(
            "{name} must be in [0,1] (got {p})"
        )));
    }
    Ok(())
}

impl CommunityGraphConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_nodes == 0 {
            return Err(Error::InvalidParameter("n_nodes must be > 0".to_string()));
        }
        if self.n_communities == 0 {
            return Err(Error::InvalidParameter(
                "n_communities must be > 0".to_string(),
            ));
        }
        if self.n_communities > self.n_nodes {
            return Err(Error::InvalidParameter(format!(
                "n_communities must be <= n_nodes (n_communities={} n_nodes={})",
                self.n_communities, self.n_nodes
            )));
        }
        check_probability("p_in", self.p_in)?;
        check_probability("p_out", self.p_out)?;
        check_probability("noise_level", self.noise_level)?;
        Ok(())
    }

    /// Nodes per planted block (floor division).
    pub fn block_size(&self) -> usize {
        self.n_nodes / self.n_communities.max(1)
    }
}

/// Planted block of every node; `None` for remainder nodes outside every block.
pub fn community_labels(config: &CommunityGraphConfig) -> Vec<Option<usize>> {
    let size = config.block_size();
    let planted = size * config.n_communities;
    (0..config.n_nodes)
        .map(|i| if i < planted { Some(i / size) } else { None })
        .collect()
}

/// Generate a noisy community graph using the caller's random generator.
pub fn community_graph<R: Rng + ?Sized>(
    config: &CommunityGraphConfig,
    rng: &mut R,
) -> Result<UndirectedGraph> {
    config.validate()?;
    let n = config.n_nodes;
    let size = config.block_size();
    let mut graph = UndirectedGraph::with_nodes(n);

    for comm in 0..config.n_communities {
        let start = comm * size;
        let end = start + size;
        for i in start..end {
            for j in (i + 1)..end {
                if rng.gen::<f64>() < config.p_in {
                    graph.insert(i, j);
                }
            }
        }
    }
    let planted = graph.edge_count();

    for i in 0..n {
        for j in (i + 1)..n {
            if i / size != j / size && rng.gen::<f64>() < config.p_out {
                graph.insert(i, j);
            }
        }
    }
    let structured = graph.edge_count();

    let mut flipped = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < config.noise_level {
                graph.flip(i, j);
                flipped += 1;
            }
        }
    }

    tracing::debug!(
        n_nodes = n,
        n_communities = config.n_communities,
        intra_edges = planted,
        cross_edges = structured - planted,
        flipped,
        edges = graph.edge_count(),
        "generated community graph"
    );
    Ok(graph)
}

/// [`community_graph`] driven by `StdRng::seed_from_u64(seed)`.
pub fn community_graph_seeded(config: &CommunityGraphConfig, seed: u64) -> Result<UndirectedGraph> {
    let mut rng = StdRng::seed_from_u64(seed);
    community_graph(config, &mut rng)
}
