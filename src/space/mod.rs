//! Block decomposition of the basis.
pub mod sparse;

use std::fmt;
use nalgebra::DMatrix;
use self::sparse::UnitarySparseMatrix;
use super::error::Error;

/// Quantum numbers and counting factors of a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockProperties {
    /// Total projection as a count, `0 ..= max_total_projection`.
    pub projection: Option<u32>,
    pub total_mult: Option<u32>,
    /// Product of the dimensions of the representations applied so far.
    pub dimensionality: usize,
    pub degeneracy: usize,
    /// One representation index per applied group.
    pub representations: Vec<usize>,
    /// Names of those representations, e.g. `E1`.
    pub labels: Vec<String>,
}

impl Default for BlockProperties {
    fn default() -> Self {
        Self {
            projection: None,
            total_mult: None,
            dimensionality: 1,
            degeneracy: 1,
            representations: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl fmt::Display for BlockProperties {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        if let Some(t) = self.projection {
            write!(f, "tz: {}, ", t)?;
        }
        if let Some(m) = self.total_mult {
            write!(f, "mult: {}, ", m)?;
        }
        if !self.labels.is_empty() {
            write!(f, "reps: [{}], ", self.labels.join(", "))?;
        }
        write!(f, "dim: {}, deg: {}}}", self.dimensionality, self.degeneracy)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Subspace {
    pub properties: BlockProperties,
    pub decomposition: UnitarySparseMatrix,
    /// Dense change of basis applied after `decomposition`: rows are the
    /// block's vectors, columns are decomposition columns.
    pub transformation: Option<DMatrix<f64>>,
}

impl Subspace {
    pub fn new(properties: BlockProperties, decomposition: UnitarySparseMatrix) -> Self {
        Self { properties, decomposition, transformation: None }
    }

    /// Number of basis vectors of the block.
    pub fn size(&self) -> usize {
        match self.transformation {
            Some(ref t) => t.nrows(),
            None => self.decomposition.size(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of multiplets of the block's representation.
    pub fn multiplets(&self) -> usize {
        debug_assert_eq!(self.size() % self.properties.dimensionality, 0,
                         "partners of a multiplet are incomplete");
        self.size() / self.properties.dimensionality
    }

    /// Number of states of the full basis this block accounts for.
    pub fn represented_size(&self) -> usize {
        self.multiplets() * self.properties.dimensionality * self.properties.degeneracy
    }

    /// Dense `rows × size` matrix whose columns are the block's vectors in
    /// the underlying basis.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let u = self.decomposition.to_dense();
        match self.transformation {
            Some(ref t) => u * t.transpose(),
            None => u,
        }
    }
}

/// Ordered list of blocks.  Empty blocks are never stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Space {
    pub blocks: Vec<Subspace>,
}

impl Space {
    pub fn new(blocks: Vec<Subspace>) -> Self {
        Self { blocks: blocks.into_iter().filter(|b| !b.is_empty()).collect() }
    }

    /// A single block holding the whole basis.
    pub fn full(total_space_size: usize) -> Self {
        Self::new(vec![Subspace::new(Default::default(),
                                     UnitarySparseMatrix::identity(total_space_size))])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `∑ multiplets × dimensionality × degeneracy`
    pub fn represented_size(&self) -> usize {
        self.blocks.iter().map(|b| b.represented_size()).sum()
    }

    pub fn check_size(&self, total_space_size: usize) -> Result<(), Error> {
        let size = self.represented_size();
        if size != total_space_size {
            return Err(Error::DimensionMismatch(total_space_size, size));
        }
        Ok(())
    }

    /// Size of the largest block.
    pub fn max_block_size(&self) -> usize {
        self.blocks.iter().map(|b| b.size()).max().unwrap_or(0)
    }
}
