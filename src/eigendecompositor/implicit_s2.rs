use nalgebra::DMatrix;
use super::super::error::Error;
use super::super::half::Half;
use super::super::space::Subspace;
use super::{Eigendecompositor, Quantity, Request, Results, Subspectrum};

/// Fills `S²` from the total multiplicity of each block.
pub struct ImplicitTotalSpinDecorator {
    inner: Box<dyn Eigendecompositor>,
}

impl ImplicitTotalSpinDecorator {
    pub fn new(inner: Box<dyn Eigendecompositor>) -> Self {
        Self { inner }
    }
}

impl Eigendecompositor for ImplicitTotalSpinDecorator {
    fn initialize(&mut self, request: &mut Request, num_blocks: usize) -> Result<(), Error> {
        if request.operators.contains_key(&Quantity::SSquared) {
            return Err(Error::ExplicitTotalSpin);
        }
        self.inner.initialize(request, num_blocks)
    }

    fn build_subspectra(&mut self, block_index: usize, block: &Subspace)
                        -> Result<Option<DMatrix<f64>>, Error> {
        let mult = block.properties.total_mult
            .ok_or(Error::MissingMetadata("total multiplicity"))?;
        let vectors = self.inner.build_subspectra(block_index, block)?;
        let (len, weights) = {
            let energy = &self.inner.results().spectrum(Quantity::Energy)?.blocks[block_index];
            (energy.values.len(), energy.weights.clone())
        };
        let s2 = Half::from_multiplicity(mult).casimir();
        self.inner.results_mut().insert(Quantity::SSquared, block_index, Subspectrum {
            values: vec![s2; len],
            degeneracy: block.properties.degeneracy,
            weights,
            matrix: None,
        });
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
