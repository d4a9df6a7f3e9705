use std::mem;
use std::sync::Arc;
use nalgebra::DMatrix;
use super::super::error::Error;
use super::super::linalg::Backend;
use super::super::operator::Operator;
use super::super::space::Subspace;
use super::{Eigendecompositor, Observables, Quantity, Request, Results, Subspectrum};

/// Full diagonalization of every block it is handed.  Innermost layer;
/// owns the results.
#[derive(Debug)]
pub struct ExactEigendecompositor {
    backend: Arc<dyn Backend>,
    energy: Option<Operator>,
    observables: Observables,
    results: Results,
}

impl ExactEigendecompositor {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            energy: None,
            observables: Default::default(),
            results: Default::default(),
        }
    }
}

impl Eigendecompositor for ExactEigendecompositor {
    fn initialize(&mut self, request: &mut Request, num_blocks: usize) -> Result<(), Error> {
        self.results.reset(num_blocks);
        self.energy = Some(request.operators.remove(&Quantity::Energy)
                           .ok_or_else(|| Error::MissingQuantity("energy".to_owned()))?);
        self.observables.operators = mem::take(&mut request.operators);
        self.observables.derivatives = mem::take(&mut request.derivatives);
        self.observables.keep_matrices = request.keep_matrices;
        Ok(())
    }

    fn build_subspectra(&mut self, block_index: usize, block: &Subspace)
                        -> Result<Option<DMatrix<f64>>, Error> {
        let energy = self.energy.as_ref()
            .ok_or_else(|| Error::MissingQuantity("energy".to_owned()))?;
        let m = energy.block_matrix(block)?;
        let matrix = if self.observables.keep_matrices { Some(m.clone()) } else { None };
        let eigen = self.backend.diagonalize(m);
        let weights = vec![1.0; eigen.values.len()];
        debug!("exact: block {} of size {}", block_index, eigen.values.len());
        if !self.observables.is_empty() {
            self.observables.observe(&mut self.results, block_index, block,
                                     &eigen.vectors, &weights)?;
        }
        self.results.insert(Quantity::Energy, block_index, Subspectrum {
            values: eigen.values,
            degeneracy: block.properties.degeneracy,
            weights,
            matrix,
        });
        Ok(Some(eigen.vectors))
    }

    fn finalize(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn results(&self) -> &Results {
        &self.results
    }

    fn results_mut(&mut self) -> &mut Results {
        &mut self.results
    }
}
