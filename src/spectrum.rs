//! Partial eigendecomposition of symmetric matrices.
//!
//! The matrices here are small enough for a full symmetric QR decomposition
//! (`nalgebra::SymmetricEigen`); we keep only the `k` eigenpairs of smallest magnitude.
//! Requesting `k >= n` is rejected the same way a Lanczos-type solver would reject it, so
//! callers see one failure mode whatever the backend.

use nalgebra::{DMatrix, DVectorView, SymmetricEigen};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EigenSolverConfig {
    /// Off-diagonal magnitude below which the QR iteration treats an entry as zero.
    pub tolerance: f64,
    /// Upper bound on QR sweeps before giving up.
    pub max_iterations: usize,
}

impl Default for EigenSolverConfig {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

impl EigenSolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter(
                "tolerance must be finite and > 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Eigenvalues in ascending order; column `c` of `vectors` is the unit eigenvector of
/// `values[c]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EigenPairs {
    pub values: Vec<f64>,
    pub vectors: DMatrix<f64>,
}

impl EigenPairs {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dimension of the eigenvectors.
    pub fn dim(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn vector(&self, c: usize) -> DVectorView<'_, f64> {
        self.vectors.column(c)
    }

    /// Subset of pairs, in the order given by `columns`.
    ///
    /// Panics if any column is `>= len()`, like slice indexing.
    pub fn select(&self, columns: &[usize]) -> EigenPairs {
        let values = columns.iter().map(|&c| self.values[c]).collect();
        let vectors = DMatrix::from_fn(self.dim(), columns.len(), |r, c| {
            self.vectors[(r, columns[c])]
        });
        EigenPairs { values, vectors }
    }
}

/// The `k` eigenpairs of smallest magnitude of the symmetric matrix `m`.
///
/// Fails with [`Error::NumericalConvergence`] when `k` is outside `1..n` or the solver does
/// not converge within `config.max_iterations`. There is no retry.
pub fn smallest_eigenpairs(
    m: &DMatrix<f64>,
    k: usize,
    config: &EigenSolverConfig,
) -> Result<EigenPairs> {
    config.validate()?;
    let n = m.nrows();
    if m.ncols() != n {
        return Err(Error::InvalidParameter(format!(
            "matrix must be square (got {}x{})",
            n,
            m.ncols()
        )));
    }
    if m.iter().any(|x| !x.is_finite()) {
        return Err(Error::InvalidParameter(
            "matrix entries must be finite".to_string(),
        ));
    }
    if k == 0 || k >= n {
        return Err(Error::NumericalConvergence(format!(
            "k must satisfy 1 <= k < n (k={k} n={n})"
        )));
    }

    let eigen = SymmetricEigen::try_new(m.clone(), config.tolerance, config.max_iterations)
        .ok_or_else(|| {
            Error::NumericalConvergence(format!(
                "no convergence within {} iterations (n={n})",
                config.max_iterations
            ))
        })?;

    let vals = &eigen.eigenvalues;
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| vals[a].abs().total_cmp(&vals[b].abs()).then(a.cmp(&b)));
    order.truncate(k);
    order.sort_by(|&a, &b| vals[a].total_cmp(&vals[b]).then(a.cmp(&b)));

    let all = EigenPairs {
        values: vals.iter().copied().collect(),
        vectors: eigen.eigenvectors,
    };
    let pairs = all.select(&order);
    tracing::trace!(n, k, smallest = ?pairs.values.first(), largest = ?pairs.values.last(), "eigenpairs");
    Ok(pairs)
}
