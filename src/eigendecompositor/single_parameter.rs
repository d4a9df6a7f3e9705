//! Reuse of a spectrum for Hamiltonians `H = p H₀`.
//!
//! The first run is passed through and cached.  Later runs with the same
//! parameter and block count scale the cached energies by `p / p₀` and
//! hand out the cached eigenvectors without touching the inner layers.
//! `∂E/∂p = E₀ / p₀` needs no operator.
use nalgebra::DMatrix;
use super::super::error::Error;
use super::super::space::Subspace;
use super::{Eigendecompositor, Quantity, Request, Results, Subspectrum};

#[derive(Clone, Debug)]
struct Cache {
    parameter: String,
    value: f64,
    results: Results,
    vectors: Vec<Option<DMatrix<f64>>>,
}

pub struct SingleParameterDecorator {
    inner: Box<dyn Eigendecompositor>,
    cache: Option<Cache>,
    /// Run in progress that is not served from the cache.
    pending: Option<Cache>,
    derivative: Option<String>,
}

impl SingleParameterDecorator {
    pub fn new(inner: Box<dyn Eigendecompositor>) -> Self {
        Self { inner, cache: None, pending: None, derivative: None }
    }

    fn write_derivative(&mut self) -> Result<(), Error> {
        let parameter = match self.derivative {
            Some(ref p) => p.clone(),
            None => return Ok(()),
        };
        let cache = self.cache.as_ref()
            .ok_or_else(|| Error::MissingQuantity("cached energies".to_owned()))?;
        let energy = cache.results.spectrum(Quantity::Energy)?.clone();
        let results = self.inner.results_mut();
        for (i, block) in energy.blocks.into_iter().enumerate() {
            results.insert_derivative((Quantity::Energy, parameter.clone()), i, Subspectrum {
                values: block.values.iter().map(|e| e / cache.value).collect(),
                matrix: block.matrix.map(|m| m / cache.value),
                ..block
            });
        }
        Ok(())
    }
}

impl Eigendecompositor for SingleParameterDecorator {
    fn initialize(&mut self, request: &mut Request, num_blocks: usize) -> Result<(), Error> {
        if request.parameters.len() != 1 {
            return Err(Error::TooManyParameters(format!(
                "expected exactly one changeable parameter, found {}",
                request.parameters.len())));
        }
        let (name, value) = request.parameters.iter().next()
            .map(|(name, &value)| (name.clone(), value))
            .ok_or_else(|| Error::TooManyParameters("no parameter".to_owned()))?;
        if value == 0.0 {
            return Err(Error::TooManyParameters(format!("{} starts at zero", name)));
        }
        let energy_derivatives: Vec<String> = request.derivatives.keys()
            .filter(|&&(q, _)| q == Quantity::Energy)
            .map(|&(_, ref p)| p.clone())
            .collect();
        if energy_derivatives.len() > 1 {
            return Err(Error::TooManyParameters(format!(
                "energy derivatives requested for {:?}", energy_derivatives)));
        }
        if let Some(p) = energy_derivatives.first() {
            if *p != name {
                return Err(Error::TooManyParameters(format!(
                    "energy derivative requested for {}, but {} is the parameter", p, name)));
            }
        }
        self.derivative = request.derivatives
            .remove(&(Quantity::Energy, name.clone()))
            .map(|_| name.clone());

        if let Some(ref cache) = self.cache {
            if cache.parameter == name && cache.vectors.len() == num_blocks {
                let mut results = cache.results.clone();
                if let Some(energy) = results.spectrum_mut(Quantity::Energy) {
                    energy.scale(value / cache.value);
                }
                debug!("single parameter: {} = {}, rescaled from {}",
                       name, value, cache.value);
                *self.inner.results_mut() = results;
                self.pending = None;
                return Ok(());
            }
        }
        self.cache = None;
        self.pending = Some(Cache {
            parameter: name,
            value,
            results: Default::default(),
            vectors: vec![None; num_blocks],
        });
        self.inner.initialize(request, num_blocks)
    }

    fn build_subspectra(&mut self, block_index: usize, block: &Subspace)
                        -> Result<Option<DMatrix<f64>>, Error> {
        match self.pending {
            Some(ref mut pending) => {
                let vectors = self.inner.build_subspectra(block_index, block)?;
                pending.vectors[block_index] = vectors.clone();
                Ok(vectors)
            }
            None => {
                let cache = self.cache.as_ref()
                    .ok_or_else(|| Error::MissingQuantity("cached energies".to_owned()))?;
                cache.vectors.get(block_index).cloned()
                    .ok_or(Error::DimensionMismatch(cache.vectors.len(), block_index + 1))
            }
        }
    }

    fn finalize(&mut self) -> Result<(), Error> {
        if let Some(mut pending) = self.pending.take() {
            self.inner.finalize()?;
            pending.results = self.inner.results().clone();
            self.cache = Some(pending);
        }
        self.write_derivative()
    }

    fn results(&self) -> &Results {
        self.inner.results()
    }

    fn results_mut(&mut self) -> &mut Results {
        self.inner.results_mut()
    }
}
