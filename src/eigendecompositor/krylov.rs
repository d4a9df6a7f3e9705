//! Lanczos approximation for large blocks.
//!
//! A block above the threshold is reduced to a Krylov space grown from a
//! seeded random vector `r`.  Ritz values stand in for the spectrum and
//! `size × |⟨r|ψ_i⟩|²` for their weights, so that thermal sums over the
//! block keep their normalization.
use std::sync::Arc;
use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use super::super::error::Error;
use super::super::linalg::Backend;
use super::super::operator::Operator;
use super::super::space::Subspace;
use super::{Eigendecompositor, Observables, Quantity, Request, Results, Subspectrum};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KrylovConf {
    /// Blocks larger than this are approximated.
    pub threshold: usize,
    pub steps: usize,
    pub seed: u64,
}

impl Default for KrylovConf {
    fn default() -> Self {
        KrylovConf { threshold: 500, steps: 100, seed: 42 }
    }
}

pub struct KrylovDecorator {
    inner: Box<dyn Eigendecompositor>,
    backend: Arc<dyn Backend>,
    conf: KrylovConf,
    energy: Option<Operator>,
    observables: Observables,
    /// Number of layers that built each block.
    owners: Vec<usize>,
}

impl KrylovDecorator {
    pub fn new(inner: Box<dyn Eigendecompositor>, backend: Arc<dyn Backend>,
               conf: KrylovConf) -> Self {
        Self {
            inner,
            backend,
            conf,
            energy: None,
            observables: Default::default(),
            owners: Vec::new(),
        }
    }

    fn start_vector(&self, block_index: usize, size: usize) -> DVector<f64> {
        let mut rng = XorShiftRng::seed_from_u64(
            self.conf.seed.wrapping_add(block_index as u64));
        DVector::from_fn(size, |_, _| rng.gen_range(-1.0 .. 1.0))
    }
}

impl Eigendecompositor for KrylovDecorator {
    fn initialize(&mut self, request: &mut Request, num_blocks: usize) -> Result<(), Error> {
        self.energy = Some(request.operators.get(&Quantity::Energy).cloned()
                           .ok_or_else(|| Error::MissingQuantity("energy".to_owned()))?);
        self.observables.operators = request.operators.iter()
            .filter(|&(&q, _)| q != Quantity::Energy)
            .map(|(&q, op)| (q, op.clone()))
            .collect();
        self.observables.derivatives = request.derivatives.clone();
        self.observables.keep_matrices = request.keep_matrices;
        self.owners = vec![0; num_blocks];
        self.inner.initialize(request, num_blocks)
    }

    fn build_subspectra(&mut self, block_index: usize, block: &Subspace)
                        -> Result<Option<DMatrix<f64>>, Error> {
        let size = block.size();
        if size <= self.conf.threshold {
            let vectors = self.inner.build_subspectra(block_index, block)?;
            if vectors.is_some() {
                self.owners[block_index] += 1;
            }
            return Ok(vectors);
        }
        let energy = self.energy.as_ref()
            .ok_or_else(|| Error::MissingQuantity("energy".to_owned()))?;
        let m = energy.block_matrix(block)?;
        let start = self.start_vector(block_index, size);
        let lanczos = self.backend.lanczos(&m, start, self.conf.steps);
        debug!("krylov: block {} of size {} -> {} Ritz values",
               block_index, size, lanczos.values.len());
        let weights: Vec<f64> = lanczos.weights.iter().map(|w| w * size as f64).collect();
        let results = self.inner.results_mut();
        if !self.observables.is_empty() {
            self.observables.observe(results, block_index, block,
                                     &lanczos.vectors, &weights)?;
        }
        results.insert(Quantity::Energy, block_index, Subspectrum {
            values: lanczos.values,
            degeneracy: block.properties.degeneracy,
            weights,
            matrix: if self.observables.keep_matrices { Some(m) } else { None },
        });
        self.owners[block_index] += 1;
        Ok(Some(lanczos.vectors))
    }

    fn finalize(&mut self) -> Result<(), Error> {
        for (i, &n) in self.owners.iter().enumerate() {
            if n != 1 {
                return Err(Error::BlockOwnership(i, n));
            }
        }
        self.inner.finalize()
    }

    fn results(&self) -> &Results {
        self.inner.results()
    }

    fn results_mut(&mut self) -> &mut Results {
        self.inner.results_mut()
    }
}
