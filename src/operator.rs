//! Linear operators on the spin basis as sums of terms.
use std::fmt;
use std::sync::Arc;
use nalgebra::DMatrix;
use rayon::prelude::*;
use super::error::Error;
use super::half::Half;
use super::index_converter::{coupled, lexicographic};
use super::space::Subspace;
use super::space::sparse::SparseVector;

/// One contribution to an operator.
pub trait Term: Send + Sync + fmt::Debug {
    /// Call `out(j, ⟨j|T|index⟩)` for the nonzero elements of column
    /// `index`.  Indices may repeat.
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error>;
}

/// `c 1`
#[derive(Clone, Copy, Debug)]
pub struct Constant(pub f64);

impl Term for Constant {
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        out(index, self.0);
        Ok(())
    }
}

/// `(∑[a] c_a S_z,a)²`
#[derive(Clone, Debug)]
pub struct LinearSzSquared {
    pub converter: Arc<lexicographic::IndexConverter>,
    pub coefficients: Vec<f64>,
}

impl Term for LinearSzSquared {
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        let value: f64 = self.coefficients.iter().enumerate()
            .map(|(a, &c)| c * half_to_f64(self.converter.index_to_one_physical_projection(index, a)))
            .sum();
        out(index, value * value);
        Ok(())
    }
}

/// `∑[a] D_a S_z,a²`, the axial zero-field splitting.
#[derive(Clone, Debug)]
pub struct SzSquared {
    pub converter: Arc<lexicographic::IndexConverter>,
    pub coefficients: Vec<f64>,
}

impl Term for SzSquared {
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        let value: f64 = self.coefficients.iter().enumerate()
            .map(|(a, &d)| {
                let m = half_to_f64(self.converter.index_to_one_physical_projection(index, a));
                d * m * m
            })
            .sum();
        out(index, value);
        Ok(())
    }
}

/// `c S_a · S_b = c (S_z,a S_z,b + (S+_a S-_b + S-_a S+_b) / 2)`
#[derive(Clone, Debug)]
pub struct ScalarProduct {
    pub converter: Arc<lexicographic::IndexConverter>,
    pub a: usize,
    pub b: usize,
    pub coefficient: f64,
}

/// `√(s (s + 1) - m (m ± 1))` for `S±|s m⟩`
fn ladder_factor(s: Half<i32>, m: Half<i32>, raise: bool) -> f64 {
    let m = half_to_f64(m);
    let shifted = if raise { m + 1.0 } else { m - 1.0 };
    (s.casimir() - m * shifted).max(0.0).sqrt()
}

impl Term for ScalarProduct {
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        let conv = &*self.converter;
        let (a, b) = (self.a, self.b);
        let (sa, sb) = (conv.spin(a), conv.spin(b));
        let ma = conv.index_to_one_physical_projection(index, a);
        let mb = conv.index_to_one_physical_projection(index, b);
        out(index, self.coefficient * half_to_f64(ma) * half_to_f64(mb));
        // S+_a S-_b
        if ma < sa && mb > -sb {
            let j = conv.ladder_projection(conv.ladder_projection(index, a, 1), b, -1);
            out(j, 0.5 * self.coefficient
                * ladder_factor(sa, ma, true) * ladder_factor(sb, mb, false));
        }
        // S-_a S+_b
        if ma > -sa && mb < sb {
            let j = conv.ladder_projection(conv.ladder_projection(index, a, -1), b, 1);
            out(j, 0.5 * self.coefficient
                * ladder_factor(sa, ma, false) * ladder_factor(sb, mb, true));
        }
        Ok(())
    }
}

/// `c M²` in the coupled basis, where `M` is the total projection.
#[derive(Clone, Debug)]
pub struct CoupledSzSquared {
    pub converter: Arc<coupled::IndexConverter>,
    pub coefficient: f64,
}

impl Term for CoupledSzSquared {
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        let t = self.converter.total_projection(index) as f64;
        let m = t - self.converter.max_total_projection() as f64 / 2.0;
        out(index, self.coefficient * m * m);
        Ok(())
    }
}

#[inline]
fn half_to_f64(x: Half<i32>) -> f64 {
    x.twice() as f64 / 2.0
}

/// Sum of terms.  Cloning shares the terms.
#[derive(Clone, Debug, Default)]
pub struct Operator {
    terms: Vec<Arc<dyn Term>>,
}

impl Operator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push<T: Term + 'static>(&mut self, term: T) {
        self.terms.push(Arc::new(term));
    }

    #[inline]
    pub fn terms(&self) -> &[Arc<dyn Term>] {
        &self.terms
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        for term in &self.terms {
            term.act(index, out)?;
        }
        Ok(())
    }

    /// `O v`
    pub fn apply(&self, v: &SparseVector) -> Result<SparseVector, Error> {
        let mut entries = Vec::new();
        for &(i, x) in v.entries() {
            self.act(i, &mut |j, y| entries.push((j, x * y)))?;
        }
        Ok(SparseVector::from_unsorted(entries))
    }

    /// Matrix of the operator in the block's basis:
    /// `T (Uᵀ O U) Tᵀ`, or `Uᵀ O U` without a transformation.
    pub fn block_matrix(&self, block: &Subspace) -> Result<DMatrix<f64>, Error> {
        let columns = block.decomposition.columns();
        let n = columns.len();
        if let Some(ref t) = block.transformation {
            if t.ncols() != n {
                return Err(Error::DimensionMismatch(n, t.ncols()));
            }
        }
        let images: Vec<SparseVector> = columns.par_iter()
            .map(|u| self.apply(u))
            .collect::<Result<_, _>>()?;
        let m = DMatrix::from_fn(n, n, |i, j| columns[i].dot(&images[j]));
        Ok(match block.transformation {
            Some(ref t) => t * m * t.transpose(),
            None => m,
        })
    }

    /// Dense matrix in the full basis of `size` states.
    pub fn full_matrix(&self, size: usize) -> Result<DMatrix<f64>, Error> {
        let mut m = DMatrix::zeros(size, size);
        for j in 0 .. size {
            self.act(j, &mut |i, x| m[(i, j)] += x)?;
        }
        Ok(m)
    }
}
