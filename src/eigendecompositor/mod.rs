//! Block-by-block eigendecomposition.
//!
//! The chain is a stack of layers, each owning the next inner one:
//!
//! ```text
//! Explicit → [SingleParameter] → [ImplicitTotalSpin] → [Krylov] → Exact
//! ```
//!
//! A layer takes the parts of the [`Request`] it serves before passing the
//! rest inward.  `build_subspectra` returns the eigenvectors of the block
//! (one per column) so that outer layers can evaluate further observables.
//! Results live in the innermost layer and are reached through
//! `results`/`results_mut`.
pub mod exact;
pub mod explicit;
pub mod implicit_s2;
pub mod krylov;
pub mod single_parameter;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use nalgebra::DMatrix;
use super::error::Error;
use super::linalg::Backend;
use super::operator::Operator;
use super::space::{BlockProperties, Space, Subspace};

pub use self::exact::ExactEigendecompositor;
pub use self::explicit::ExplicitQuantitiesDecorator;
pub use self::implicit_s2::ImplicitTotalSpinDecorator;
pub use self::krylov::{KrylovConf, KrylovDecorator};
pub use self::single_parameter::SingleParameterDecorator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Energy,
    SSquared,
    GSzSquared,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Quantity::Energy => "energy",
            Quantity::SSquared => "s_squared",
            Quantity::GSzSquared => "g_sz_squared",
        })
    }
}

/// What to compute.
#[derive(Clone, Debug, Default)]
pub struct Request {
    pub operators: BTreeMap<Quantity, Operator>,
    /// `∂O/∂p` for `(O, p)`.
    pub derivatives: BTreeMap<(Quantity, String), Operator>,
    /// Current values of the changeable parameters.
    pub parameters: BTreeMap<String, f64>,
    /// Also store operator matrices in the block basis.
    pub keep_matrices: bool,
}

/// Values of one quantity on one block, ordered like the energies.
#[derive(Clone, Debug, Default)]
pub struct Subspectrum {
    pub values: Vec<f64>,
    pub degeneracy: usize,
    /// Statistical weight of every level; all ones unless approximated.
    pub weights: Vec<f64>,
    pub matrix: Option<DMatrix<f64>>,
}

#[derive(Clone, Debug, Default)]
pub struct Spectrum {
    pub blocks: Vec<Subspectrum>,
}

impl Spectrum {
    fn new(num_blocks: usize) -> Self {
        Self { blocks: vec![Default::default(); num_blocks] }
    }

    /// `(value, degeneracy × weight)` of every level, in block order.
    pub fn levels(&self) -> Vec<(f64, f64)> {
        self.blocks.iter().flat_map(|b| {
            b.values.iter().zip(&b.weights)
                .map(move |(&x, &w)| (x, b.degeneracy as f64 * w))
        }).collect()
    }

    pub fn scale(&mut self, factor: f64) {
        for block in &mut self.blocks {
            for x in &mut block.values {
                *x *= factor;
            }
            if let Some(ref mut m) = block.matrix {
                *m *= factor;
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Results {
    num_blocks: usize,
    properties: Vec<BlockProperties>,
    quantities: BTreeMap<Quantity, Spectrum>,
    derivatives: BTreeMap<(Quantity, String), Spectrum>,
}

impl Results {
    pub fn reset(&mut self, num_blocks: usize) {
        self.num_blocks = num_blocks;
        self.properties.clear();
        self.quantities.clear();
        self.derivatives.clear();
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Quantum numbers of every block, in block order.
    #[inline]
    pub fn block_properties(&self) -> &[BlockProperties] {
        &self.properties
    }

    pub fn set_block_properties(&mut self, properties: Vec<BlockProperties>) {
        debug_assert_eq!(properties.len(), self.num_blocks);
        self.properties = properties;
    }

    pub fn insert(&mut self, quantity: Quantity, block: usize, sub: Subspectrum) {
        let n = self.num_blocks;
        self.quantities.entry(quantity)
            .or_insert_with(|| Spectrum::new(n))
            .blocks[block] = sub;
    }

    pub fn insert_derivative(&mut self, key: (Quantity, String), block: usize,
                             sub: Subspectrum) {
        let n = self.num_blocks;
        self.derivatives.entry(key)
            .or_insert_with(|| Spectrum::new(n))
            .blocks[block] = sub;
    }

    pub fn spectrum(&self, quantity: Quantity) -> Result<&Spectrum, Error> {
        self.quantities.get(&quantity)
            .ok_or_else(|| Error::MissingQuantity(quantity.to_string()))
    }

    pub fn spectrum_mut(&mut self, quantity: Quantity) -> Option<&mut Spectrum> {
        self.quantities.get_mut(&quantity)
    }

    pub fn derivative(&self, quantity: Quantity, parameter: &str)
                      -> Result<&Spectrum, Error> {
        self.derivatives.get(&(quantity, parameter.to_owned()))
            .ok_or_else(|| Error::MissingQuantity(format!("d{}/d{}", quantity, parameter)))
    }

    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.quantities.keys().cloned()
    }

    pub fn derivative_keys(&self) -> impl Iterator<Item = &(Quantity, String)> + '_ {
        self.derivatives.keys()
    }
}

pub trait Eigendecompositor: Send {
    fn initialize(&mut self, request: &mut Request, num_blocks: usize) -> Result<(), Error>;

    /// Eigenvectors of the block as columns, or `None` if this layer and
    /// everything below it left the block alone.
    fn build_subspectra(&mut self, block_index: usize, block: &Subspace)
                        -> Result<Option<DMatrix<f64>>, Error>;

    fn finalize(&mut self) -> Result<(), Error>;

    fn results(&self) -> &Results;

    fn results_mut(&mut self) -> &mut Results;
}

/// `diag(Vᵀ O V)` on a block.
pub fn expectation_values(op: &Operator, block: &Subspace, vectors: &DMatrix<f64>)
                          -> Result<(Vec<f64>, DMatrix<f64>), Error>
{
    let m = op.block_matrix(block)?;
    if m.nrows() != vectors.nrows() {
        return Err(Error::DimensionMismatch(m.nrows(), vectors.nrows()));
    }
    let mv = &m * vectors;
    let values = (0 .. vectors.ncols())
        .map(|i| vectors.column(i).dot(&mv.column(i)))
        .collect();
    Ok((values, m))
}

/// Operators evaluated on already computed eigenvectors.
#[derive(Clone, Debug, Default)]
struct Observables {
    operators: BTreeMap<Quantity, Operator>,
    derivatives: BTreeMap<(Quantity, String), Operator>,
    keep_matrices: bool,
}

impl Observables {
    fn is_empty(&self) -> bool {
        self.operators.is_empty() && self.derivatives.is_empty()
    }

    fn observe(&self, results: &mut Results, block_index: usize, block: &Subspace,
               vectors: &DMatrix<f64>, weights: &[f64]) -> Result<(), Error> {
        let degeneracy = block.properties.degeneracy;
        let keep = self.keep_matrices;
        let subspectrum = |(values, m): (Vec<f64>, DMatrix<f64>)| Subspectrum {
            values,
            degeneracy,
            weights: weights.to_vec(),
            matrix: if keep { Some(m) } else { None },
        };
        for (&quantity, op) in &self.operators {
            let sub = subspectrum(expectation_values(op, block, vectors)?);
            results.insert(quantity, block_index, sub);
        }
        for (key, op) in &self.derivatives {
            let sub = subspectrum(expectation_values(op, block, vectors)?);
            results.insert_derivative(key.clone(), block_index, sub);
        }
        Ok(())
    }
}

/// Flags that decide which layers make up the chain.
#[derive(Clone, Debug, Default)]
pub struct EigendecompositorBuilder {
    krylov: Option<KrylovConf>,
    implicit_total_spin: bool,
    single_parameter: bool,
}

impl EigendecompositorBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn krylov(mut self, conf: Option<KrylovConf>) -> Self {
        self.krylov = conf;
        self
    }

    /// Take `S²` from the block metadata instead of an operator.
    pub fn implicit_total_spin(mut self, enable: bool) -> Self {
        self.implicit_total_spin = enable;
        self
    }

    /// Rescale cached eigenvalues when the only parameter changes.
    pub fn single_parameter(mut self, enable: bool) -> Self {
        self.single_parameter = enable;
        self
    }

    pub fn build(&self, backend: Arc<dyn Backend>) -> Box<dyn Eigendecompositor> {
        let mut chain: Box<dyn Eigendecompositor> =
            Box::new(ExactEigendecompositor::new(backend.clone()));
        if let Some(ref conf) = self.krylov {
            chain = Box::new(KrylovDecorator::new(chain, backend, conf.clone()));
        }
        let mut passthrough = vec![Quantity::Energy];
        if self.implicit_total_spin {
            chain = Box::new(ImplicitTotalSpinDecorator::new(chain));
            passthrough.push(Quantity::SSquared);
        }
        if self.single_parameter {
            chain = Box::new(SingleParameterDecorator::new(chain));
        }
        Box::new(ExplicitQuantitiesDecorator::new(
            chain, passthrough.into_iter().collect(), self.single_parameter))
    }
}

/// Run the chain over every block of a space.
pub fn eigendecompose<'a>(chain: &'a mut dyn Eigendecompositor, space: &Space,
                          mut request: Request) -> Result<&'a Results, Error> {
    info!("eigendecompose: {} blocks, largest {}", space.len(), space.max_block_size());
    chain.initialize(&mut request, space.len())?;
    for (i, block) in space.blocks.iter().enumerate() {
        chain.build_subspectra(i, block)?;
    }
    chain.finalize()?;
    chain.results_mut().set_block_properties(
        space.blocks.iter().map(|b| b.properties.clone()).collect());
    Ok(chain.results())
}
