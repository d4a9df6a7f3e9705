//! Passes based on the total spin `S²`.
use std::collections::BTreeMap;
use nalgebra::{DMatrix, DVector};
use super::super::ang_mom::with_coupling_ctx;
use super::super::error::Error;
use super::super::index_converter::coupled::{self, OrderOfSummation};
use super::super::space::Subspace;
use super::super::space::sparse::{SparseVector, UnitarySparseMatrix};
use super::super::utils::Toler;
use super::Pass;

/// Splits blocks of the coupled basis by total multiplicity.
#[derive(Clone, Debug)]
pub struct TSquaredSorter {
    converter: coupled::IndexConverter,
}

impl TSquaredSorter {
    pub fn new(converter: coupled::IndexConverter) -> Self {
        Self { converter }
    }
}

impl Pass for TSquaredSorter {
    fn name(&self) -> &'static str {
        "t_squared_sort"
    }

    fn apply_block(&self, mut block: Subspace) -> Result<Vec<Subspace>, Error> {
        let rows = block.decomposition.rows();
        let mut children = BTreeMap::new();
        for j in 0 .. block.decomposition.size() {
            let column = block.decomposition.take_column(j);
            if let Some(index) = column.first_index() {
                children.entry(self.converter.total_multiplicity(index))
                    .or_insert_with(|| UnitarySparseMatrix::new(rows))
                    .push(column);
            }
        }
        Ok(children.into_iter().map(|(mult, decomposition)| {
            let mut properties = block.properties.clone();
            properties.total_mult = Some(mult);
            Subspace::new(properties, decomposition)
        }).collect())
    }
}

/// Splits blocks of fixed projection in the lexicographic basis into
/// eigenspaces of `S²`.
///
/// The coupled states of the block's projection are projected onto the
/// block and orthonormalized per total multiplicity.  Symmetrized blocks
/// receive several coupled states with the same image, so dependent rows
/// are dropped.  The result is carried as a dense transformation on top of
/// the unchanged decomposition.
#[derive(Clone, Debug)]
pub struct S2Transformer {
    coupled: coupled::IndexConverter,
    toler: Toler,
}

impl S2Transformer {
    pub fn new(mults: Vec<u32>, toler: Toler) -> Result<Self, Error> {
        let order = OrderOfSummation::chain(mults.len())?;
        Ok(Self { coupled: coupled::IndexConverter::new(mults, order)?, toler })
    }

    fn orthonormalize(&self, rows: Vec<DVector<f64>>) -> Vec<DVector<f64>> {
        let mut basis: Vec<DVector<f64>> = Vec::with_capacity(rows.len());
        for mut row in rows {
            // twice, to keep the rows orthogonal to working precision
            for _ in 0 .. 2 {
                for b in &basis {
                    let overlap = b.dot(&row);
                    row.axpy(-overlap, b, 1.0);
                }
            }
            let norm_sqr = row.norm_squared();
            if !self.toler.is_zero(norm_sqr) {
                basis.push(row / norm_sqr.sqrt());
            }
        }
        basis
    }
}

impl Pass for S2Transformer {
    fn name(&self) -> &'static str {
        "s2_transform"
    }

    fn apply_block(&self, block: Subspace) -> Result<Vec<Subspace>, Error> {
        let t = block.properties.projection
            .ok_or(Error::MissingMetadata("projection"))?;
        if block.transformation.is_some() {
            illegal!("s2_transform applied twice");
        }
        let size = block.decomposition.size();
        let mut rows_by_mult: BTreeMap<u32, Vec<DVector<f64>>> = BTreeMap::new();
        with_coupling_ctx(|ctx| {
            for c in self.coupled.indices_with_projection(t) {
                let state = SparseVector::from_unsorted(self.coupled.to_lexicographic(c, ctx));
                let row = DVector::from_iterator(
                    size, block.decomposition.columns().iter().map(|u| u.dot(&state)));
                rows_by_mult.entry(self.coupled.total_multiplicity(c))
                    .or_insert_with(Vec::new)
                    .push(row);
            }
        });
        let mut children = Vec::with_capacity(rows_by_mult.len());
        let mut total = 0;
        for (mult, rows) in rows_by_mult {
            let basis = self.orthonormalize(rows);
            if basis.is_empty() {
                continue;
            }
            total += basis.len();
            let mut properties = block.properties.clone();
            properties.total_mult = Some(mult);
            let transformation = DMatrix::from_fn(basis.len(), size, |i, j| basis[i][j]);
            children.push(Subspace {
                properties,
                decomposition: block.decomposition.clone(),
                transformation: Some(transformation),
            });
        }
        if total != size {
            return Err(Error::DimensionMismatch(size, total));
        }
        Ok(children)
    }
}
