//! Basis reduction: a sequence of passes that split the basis into blocks.
//!
//! ```text
//! Space::full ─▶ TzSort ─▶ Symmetrize(G) ─▶ … ─▶ Space
//! ```
//!
//! Every pass consumes a [`Space`] and returns a new one; blocks are
//! processed in parallel and an error in any block aborts the pass.
pub mod projection;
pub mod simplifier;
pub mod symmetrizer;
pub mod total_spin;

use std::time::Instant;
use rayon::prelude::*;
use super::error::Error;
use super::group::Group;
use super::index_converter::{Basis, BasisKind};
use super::index_converter::coupled::{self, OrderOfSummation};
use super::index_converter::lexicographic;
use super::space::{Space, Subspace};
use super::utils::Toler;

/// One step of the reduction.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    TzSort,
    EliminatePositiveProjections,
    EliminateNonMinimalProjections,
    Symmetrize(Group),
    NonAbelianSimplify,
    TSquaredSort,
    S2Transform,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match *self {
            Step::TzSort => "tz_sort",
            Step::EliminatePositiveProjections => "eliminate_positive_projections",
            Step::EliminateNonMinimalProjections => "eliminate_non_minimal_projections",
            Step::Symmetrize(_) => "symmetrize",
            Step::NonAbelianSimplify => "non_abelian_simplify",
            Step::TSquaredSort => "t_squared_sort",
            Step::S2Transform => "s2_transform",
        }
    }
}

/// A validated sequence of steps.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationList {
    basis: BasisKind,
    steps: Vec<Step>,
}

impl OptimizationList {
    pub fn new(basis: BasisKind, steps: Vec<Step>) -> Result<Self, Error> {
        let mut tz_sorted = false;
        let mut positive = false;
        let mut non_minimal = false;
        let mut total_spin = false;
        let mut transformed = false;
        let mut simplified = false;
        let mut non_abelian: Vec<&Group> = Vec::new();
        for step in &steps {
            if transformed {
                match *step {
                    Step::EliminatePositiveProjections
                        | Step::EliminateNonMinimalProjections => {}
                    _ => illegal!("{} after s2_transform", step.name()),
                }
            }
            match *step {
                Step::TzSort => {
                    if tz_sorted {
                        illegal!("tz_sort applied twice");
                    }
                    tz_sorted = true;
                }
                Step::EliminatePositiveProjections => {
                    if !tz_sorted {
                        illegal!("{} requires tz_sort", step.name());
                    }
                    if positive {
                        illegal!("{} applied twice", step.name());
                    }
                    if non_minimal {
                        illegal!("{} after eliminate_non_minimal_projections",
                                 step.name());
                    }
                    positive = true;
                }
                Step::EliminateNonMinimalProjections => {
                    if !tz_sorted {
                        illegal!("{} requires tz_sort", step.name());
                    }
                    if !total_spin {
                        illegal!("{} requires t_squared_sort or s2_transform", step.name());
                    }
                    if positive {
                        illegal!("{} after eliminate_positive_projections", step.name());
                    }
                    if non_minimal {
                        illegal!("{} applied twice", step.name());
                    }
                    non_minimal = true;
                }
                Step::Symmetrize(ref group) => {
                    if !group.is_abelian() {
                        if basis == BasisKind::Coupled {
                            illegal!("non-abelian group {} in the coupled basis",
                                     group.group_type());
                        }
                        if simplified {
                            illegal!("symmetrize by {} after non_abelian_simplify",
                                     group.group_type());
                        }
                        if non_abelian.contains(&group) {
                            illegal!("symmetrize by {} applied twice", group.group_type());
                        }
                        non_abelian.push(group);
                    }
                }
                Step::NonAbelianSimplify => {
                    simplified = true;
                }
                Step::TSquaredSort => {
                    if basis != BasisKind::Coupled {
                        illegal!("{} requires the coupled basis", step.name());
                    }
                    total_spin = true;
                }
                Step::S2Transform => {
                    if basis != BasisKind::Lexicographic {
                        illegal!("{} requires the lexicographic basis", step.name());
                    }
                    if !tz_sorted {
                        illegal!("{} requires tz_sort", step.name());
                    }
                    total_spin = true;
                    transformed = true;
                }
            }
        }
        Ok(Self { basis, steps })
    }

    #[inline]
    pub fn basis(&self) -> BasisKind {
        self.basis
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether every final block is an eigenspace of the total spin.
    pub fn has_total_spin(&self) -> bool {
        self.steps.iter().any(|s| *s == Step::TSquaredSort || *s == Step::S2Transform)
    }

    /// Coupling tree for the coupled basis: centers are paired by the
    /// first generator of the first group, if there is one.
    pub fn default_order(&self, num_centers: usize) -> Result<OrderOfSummation, Error> {
        for step in &self.steps {
            if let Step::Symmetrize(ref group) = *step {
                return OrderOfSummation::paired(&group.generators()[0]);
            }
        }
        OrderOfSummation::chain(num_centers)
    }
}

/// A basis-reduction pass.
pub trait Pass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Children of one block, in order.
    fn apply_block(&self, block: Subspace) -> Result<Vec<Subspace>, Error>;

    fn apply(&self, space: Space) -> Result<Space, Error> {
        let children: Vec<Vec<Subspace>> = space.blocks
            .into_par_iter()
            .map(|block| self.apply_block(block))
            .collect::<Result<_, _>>()?;
        Ok(Space::new(children.into_iter().flatten().collect()))
    }
}

/// Runs an [`OptimizationList`] on a basis.
#[derive(Debug)]
pub struct Optimizer {
    basis: Basis,
    list: OptimizationList,
    toler: Toler,
}

impl Optimizer {
    /// `order` is only used by the coupled basis; `None` picks
    /// [`OptimizationList::default_order`].
    pub fn new(mults: Vec<u32>, list: OptimizationList,
               order: Option<OrderOfSummation>, toler: Toler) -> Result<Self, Error> {
        let basis = match list.basis() {
            BasisKind::Lexicographic => {
                Basis::Lexicographic(lexicographic::IndexConverter::new(mults)?)
            }
            BasisKind::Coupled => {
                let order = match order {
                    Some(order) => order,
                    None => list.default_order(mults.len())?,
                };
                Basis::Coupled(coupled::IndexConverter::new(mults, order)?)
            }
        };
        Ok(Self { basis, list, toler })
    }

    #[inline]
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    #[inline]
    pub fn list(&self) -> &OptimizationList {
        &self.list
    }

    fn make_pass(&self, step: &Step) -> Result<Box<dyn Pass>, Error> {
        let max_projection = self.basis.max_total_projection();
        let pass: Box<dyn Pass> = match *step {
            Step::TzSort => Box::new(projection::ProjectionSorter::new(self.basis.clone())),
            Step::EliminatePositiveProjections => {
                Box::new(projection::PositiveProjectionsEliminator { max_projection })
            }
            Step::EliminateNonMinimalProjections => {
                Box::new(projection::NonMinimalProjectionsEliminator { max_projection })
            }
            Step::Symmetrize(ref group) => Box::new(symmetrizer::Symmetrizer::new(
                group.clone(), self.basis.make_permutator(group)?, self.toler)),
            Step::NonAbelianSimplify => Box::new(simplifier::NonAbelianSimplifier),
            Step::TSquaredSort => match self.basis {
                Basis::Coupled(ref c) => Box::new(total_spin::TSquaredSorter::new(c.clone())),
                Basis::Lexicographic(_) => illegal!("t_squared_sort requires the coupled basis"),
            },
            Step::S2Transform => match self.basis {
                Basis::Lexicographic(ref c) => Box::new(total_spin::S2Transformer::new(
                    c.multiplicities().to_vec(), self.toler)?),
                Basis::Coupled(_) => illegal!("s2_transform requires the lexicographic basis"),
            },
        };
        Ok(pass)
    }

    /// Build every pass, then apply them in order.  The size invariant is
    /// checked after each pass.
    pub fn run(&self) -> Result<Space, Error> {
        let passes = self.list.steps().iter()
            .map(|step| self.make_pass(step))
            .collect::<Result<Vec<_>, _>>()?;
        let total = self.basis.total_space_size();
        let mut space = Space::full(total);
        info!("basis: {:?}, total size: {}", self.basis.kind(), total);
        for pass in passes {
            let start = Instant::now();
            space = pass.apply(space)?;
            space.check_size(total)?;
            info!("{}: {} blocks, largest {}, {:.3}s", pass.name(), space.len(),
                  space.max_block_size(), start.elapsed().as_secs_f64());
        }
        Ok(space)
    }
}
