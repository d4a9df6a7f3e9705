use std::collections::BTreeSet;
use nalgebra::DMatrix;
use super::super::error::Error;
use super::super::space::Subspace;
use super::{Eigendecompositor, Observables, Quantity, Request, Results};

/// Evaluates requested observables in the eigenbasis produced by the
/// inner layers.  Outermost layer.
pub struct ExplicitQuantitiesDecorator {
    inner: Box<dyn Eigendecompositor>,
    /// Quantities left for the inner layers.
    passthrough: BTreeSet<Quantity>,
    /// Leave `∂E/∂p` to the inner layers.
    pass_energy_derivatives: bool,
    observables: Observables,
}

impl ExplicitQuantitiesDecorator {
    pub fn new(inner: Box<dyn Eigendecompositor>, passthrough: BTreeSet<Quantity>,
               pass_energy_derivatives: bool) -> Self {
        Self {
            inner,
            passthrough,
            pass_energy_derivatives,
            observables: Default::default(),
        }
    }
}

impl Eigendecompositor for ExplicitQuantitiesDecorator {
    fn initialize(&mut self, request: &mut Request, num_blocks: usize) -> Result<(), Error> {
        let taken: Vec<Quantity> = request.operators.keys()
            .filter(|&q| !self.passthrough.contains(q))
            .cloned()
            .collect();
        self.observables.operators = taken.into_iter()
            .filter_map(|q| request.operators.remove(&q).map(|op| (q, op)))
            .collect();
        let pass_energy = self.pass_energy_derivatives;
        let taken: Vec<(Quantity, String)> = request.derivatives.keys()
            .filter(|&&(q, _)| !(pass_energy && q == Quantity::Energy))
            .cloned()
            .collect();
        self.observables.derivatives = taken.into_iter()
            .filter_map(|key| request.derivatives.remove(&key).map(|op| (key, op)))
            .collect();
        self.observables.keep_matrices = request.keep_matrices;
        self.inner.initialize(request, num_blocks)
    }

    fn build_subspectra(&mut self, block_index: usize, block: &Subspace)
                        -> Result<Option<DMatrix<f64>>, Error> {
        let vectors = self.inner.build_subspectra(block_index, block)?;
        let v = vectors.as_ref().ok_or(Error::BlockOwnership(block_index, 0))?;
        if !self.observables.is_empty() {
            let weights = self.inner.results().spectrum(Quantity::Energy)?
                .blocks[block_index].weights.clone();
            self.observables.observe(self.inner.results_mut(), block_index, block,
                                     v, &weights)?;
        }
        Ok(vectors)
    }

    fn finalize(&mut self) -> Result<(), Error> {
        self.inner.finalize()
    }

    fn results(&self) -> &Results {
        self.inner.results()
    }

    fn results_mut(&mut self) -> &mut Results {
        self.inner.results_mut()
    }
}
