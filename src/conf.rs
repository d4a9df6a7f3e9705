//! YAML configuration of a whole calculation.
//!
//! ```yaml
//! multiplicities: [2, 2, 2, 2]
//! basis: lexicographic
//! steps:
//!   - tz_sort
//!   - symmetrize: {group: {dihedral: 4}, generators: [[1, 2, 3, 0], [0, 3, 2, 1]]}
//!   - eliminate_positive_projections
//!   - s2_transform
//! exchanges:
//!   - {centers: [0, 1], parameter: J}
//! parameters: {J: 10.0}
//! quantities: [s_squared, g_sz_squared]
//! ```
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use super::eigendecompositor::{self, Eigendecompositor, EigendecompositorBuilder,
                               KrylovConf, Quantity, Results};
use super::error::Error;
use super::group::{Group, GroupType, Permutation};
use super::group::algebra::GroupRegistry;
use super::index_converter::BasisKind;
use super::index_converter::coupled::OrderOfSummation;
use super::linalg::NalgebraBackend;
use super::model::{Exchange, Model, ZeroField};
use super::optimization::{OptimizationList, Optimizer, Step};
use super::space::Space;
use super::utils::Toler;

/// A [`Step`] as written in the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepConf {
    TzSort,
    EliminatePositiveProjections,
    EliminateNonMinimalProjections,
    Symmetrize {
        group: GroupType,
        generators: Vec<Permutation>,
    },
    NonAbelianSimplify,
    TSquaredSort,
    S2Transform,
}

impl StepConf {
    fn to_step(&self, registry: &GroupRegistry) -> Result<Step, Error> {
        Ok(match *self {
            StepConf::TzSort => Step::TzSort,
            StepConf::EliminatePositiveProjections => Step::EliminatePositiveProjections,
            StepConf::EliminateNonMinimalProjections => Step::EliminateNonMinimalProjections,
            StepConf::Symmetrize { group, ref generators } => {
                Step::Symmetrize(Group::new(registry, group, generators.clone())?)
            }
            StepConf::NonAbelianSimplify => Step::NonAbelianSimplify,
            StepConf::TSquaredSort => Step::TSquaredSort,
            StepConf::S2Transform => Step::S2Transform,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    pub multiplicities: Vec<u32>,
    pub basis: BasisKind,
    /// Coupling tree of the coupled basis as `[a, b]` pairs; chosen from the
    /// first group if absent.
    pub order_of_summation: Option<Vec<[usize; 2]>>,
    pub steps: Vec<StepConf>,
    pub exchanges: Vec<Exchange>,
    pub zero_field: Vec<ZeroField>,
    pub parameters: BTreeMap<String, f64>,
    pub g_factor: f64,
    /// Observables besides the energy.
    pub quantities: Vec<Quantity>,
    /// Parameters to differentiate the energy by.
    pub derivatives: Vec<String>,
    pub krylov: Option<KrylovConf>,
    pub implicit_total_spin: bool,
    pub single_parameter: bool,
    pub toler: Toler,
}

/// `{ basis: lexicographic, g_factor: 2.0, .. }`
impl Default for Conf {
    fn default() -> Self {
        Conf {
            multiplicities: Vec::new(),
            basis: Default::default(),
            order_of_summation: None,
            steps: Vec::new(),
            exchanges: Vec::new(),
            zero_field: Vec::new(),
            parameters: BTreeMap::new(),
            g_factor: 2.0,
            quantities: Vec::new(),
            derivatives: Vec::new(),
            krylov: None,
            implicit_total_spin: false,
            single_parameter: false,
            toler: Default::default(),
        }
    }
}

impl Conf {
    pub fn from_yaml(s: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut s = String::new();
        File::open(path)?.read_to_string(&mut s)?;
        Self::from_yaml(&s)
    }

    pub fn model(&self) -> Model {
        Model {
            mults: self.multiplicities.clone(),
            exchanges: self.exchanges.clone(),
            zero_field: self.zero_field.clone(),
            parameters: self.parameters.clone(),
            g_factor: self.g_factor,
        }
    }

    pub fn optimization_list(&self, registry: &GroupRegistry)
                             -> Result<OptimizationList, Error> {
        let steps = self.steps.iter()
            .map(|s| s.to_step(registry))
            .collect::<Result<_, _>>()?;
        OptimizationList::new(self.basis, steps)
    }

    pub fn order(&self) -> Result<Option<OrderOfSummation>, Error> {
        match self.order_of_summation {
            Some(ref pairs) => Ok(Some(OrderOfSummation::new(
                self.multiplicities.len(), pairs.clone())?)),
            None => Ok(None),
        }
    }

    pub fn builder(&self) -> EigendecompositorBuilder {
        EigendecompositorBuilder::new()
            .krylov(self.krylov.clone())
            .implicit_total_spin(self.implicit_total_spin)
            .single_parameter(self.single_parameter)
    }

    pub fn make_run(self, registry: &GroupRegistry) -> Result<Run, Error> {
        let model = self.model();
        model.validate()?;
        let optimizer = Optimizer::new(self.multiplicities.clone(),
                                       self.optimization_list(registry)?,
                                       self.order()?, self.toler)?;
        let chain = self.builder().build(Arc::new(NalgebraBackend));
        Ok(Run { conf: self, model, optimizer, chain, space: None })
    }
}

/// State of a calculation.  The reduced space is built on the first run
/// and reused afterwards, so only the parameters may change in between.
pub struct Run {
    pub conf: Conf,
    pub model: Model,
    optimizer: Optimizer,
    chain: Box<dyn Eigendecompositor>,
    space: Option<Space>,
}

impl Run {
    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn space(&mut self) -> Result<&Space, Error> {
        if self.space.is_none() {
            self.space = Some(self.optimizer.run()?);
        }
        self.space.as_ref().ok_or(Error::MissingMetadata("space"))
    }

    /// Change a parameter of the model for the next run.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), Error> {
        match self.model.parameters.get_mut(name) {
            Some(x) => {
                *x = value;
                Ok(())
            }
            None => Err(Error::Conf(format!("unknown parameter {}", name))),
        }
    }

    pub fn do_run(&mut self) -> Result<&Results, Error> {
        self.space()?;
        let request = self.model.request(
            self.optimizer.basis(), &self.conf.quantities,
            &self.conf.derivatives, self.conf.implicit_total_spin)?;
        let space = self.space.as_ref().ok_or(Error::MissingMetadata("space"))?;
        eigendecompositor::eigendecompose(&mut *self.chain, space, request)
    }
}
