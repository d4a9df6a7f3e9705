//! Dense linear algebra for the eigendecomposition layers.
use std::fmt;
use nalgebra::{DMatrix, DVector};

/// Eigenpairs sorted by ascending eigenvalue.  Column `i` of `vectors`
/// belongs to `values[i]`.
#[derive(Clone, Debug)]
pub struct Eigen {
    pub values: Vec<f64>,
    pub vectors: DMatrix<f64>,
}

/// Ritz pairs of a Lanczos run.
#[derive(Clone, Debug)]
pub struct Lanczos {
    pub values: Vec<f64>,
    /// Ritz vectors in the original basis, one per column.
    pub vectors: DMatrix<f64>,
    /// `|⟨start|ψ_i⟩|²`; they sum to one.
    pub weights: Vec<f64>,
}

/// Source of dense matrix algorithms.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Diagonalize a symmetric matrix.
    fn diagonalize(&self, m: DMatrix<f64>) -> Eigen;

    /// Run at most `steps` Lanczos iterations on a symmetric matrix.
    fn lanczos(&self, m: &DMatrix<f64>, start: DVector<f64>, steps: usize) -> Lanczos;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NalgebraBackend;

/// Relative size of a residual below which the Krylov space is invariant.
const BREAKDOWN: f64 = 1e-12;

fn sorted_eigen(m: DMatrix<f64>) -> Eigen {
    let eig = m.symmetric_eigen();
    let mut order: Vec<usize> = (0 .. eig.eigenvalues.len()).collect();
    order.sort_by(|&i, &j| {
        eig.eigenvalues[i].partial_cmp(&eig.eigenvalues[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let values = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let vectors = DMatrix::from_fn(eig.eigenvectors.nrows(), order.len(),
                                   |r, c| eig.eigenvectors[(r, order[c])]);
    Eigen { values, vectors }
}

impl Backend for NalgebraBackend {
    fn diagonalize(&self, m: DMatrix<f64>) -> Eigen {
        sorted_eigen(m)
    }

    fn lanczos(&self, m: &DMatrix<f64>, start: DVector<f64>, steps: usize) -> Lanczos {
        let n = m.nrows();
        let steps = steps.max(1).min(n);
        let norm = start.norm();
        let first = if norm > 0.0 {
            start / norm
        } else {
            let mut e = DVector::zeros(n);
            e[0] = 1.0;
            e
        };
        let mut basis = vec![first];
        let mut alpha = Vec::with_capacity(steps);
        let mut beta = Vec::with_capacity(steps);
        loop {
            let q = &basis[basis.len() - 1];
            let mut w = m * q;
            let a = q.dot(&w);
            alpha.push(a);
            // full reorthogonalization, twice
            for _ in 0 .. 2 {
                for v in &basis {
                    let overlap = v.dot(&w);
                    w.axpy(-overlap, v, 1.0);
                }
            }
            if basis.len() == steps {
                break;
            }
            let b = w.norm();
            if b <= BREAKDOWN * a.abs().max(1.0) {
                break;
            }
            beta.push(b);
            basis.push(w / b);
        }
        let k = basis.len();
        let t = DMatrix::from_fn(k, k, |i, j| {
            if i == j {
                alpha[i]
            } else if i + 1 == j {
                beta[i]
            } else if j + 1 == i {
                beta[j]
            } else {
                0.0
            }
        });
        let ritz = sorted_eigen(t);
        let q = DMatrix::from_fn(n, k, |r, c| basis[c][r]);
        let weights = (0 .. k).map(|i| ritz.vectors[(0, i)].powi(2)).collect();
        Lanczos {
            values: ritz.values,
            vectors: q * ritz.vectors,
            weights,
        }
    }
}
