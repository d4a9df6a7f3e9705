//! Bijections between basis indices and quantum numbers.
pub mod coupled;
pub mod lexicographic;

use super::error::Error;
use super::group::Group;
use super::group::permutator::{CoupledPermutator, IndexPermutator, LexicographicPermutator};

/// Which basis the decomposition vectors are expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisKind {
    /// Uncoupled product basis of per-center projections.
    Lexicographic,
    /// Total-spin basis built along an `OrderOfSummation`.
    Coupled,
}

impl Default for BasisKind {
    fn default() -> Self {
        BasisKind::Lexicographic
    }
}

/// Converter of whichever basis is in use.
#[derive(Clone, Debug)]
pub enum Basis {
    Lexicographic(lexicographic::IndexConverter),
    Coupled(coupled::IndexConverter),
}

impl Basis {
    pub fn kind(&self) -> BasisKind {
        match *self {
            Basis::Lexicographic(_) => BasisKind::Lexicographic,
            Basis::Coupled(_) => BasisKind::Coupled,
        }
    }

    pub fn multiplicities(&self) -> &[u32] {
        match *self {
            Basis::Lexicographic(ref c) => c.multiplicities(),
            Basis::Coupled(ref c) => c.multiplicities(),
        }
    }

    pub fn total_space_size(&self) -> usize {
        match *self {
            Basis::Lexicographic(ref c) => c.total_space_size(),
            Basis::Coupled(ref c) => c.total_space_size(),
        }
    }

    pub fn max_total_projection(&self) -> u32 {
        match *self {
            Basis::Lexicographic(ref c) => c.max_total_projection(),
            Basis::Coupled(ref c) => c.max_total_projection(),
        }
    }

    pub fn total_projection(&self, index: usize) -> u32 {
        match *self {
            Basis::Lexicographic(ref c) => c.total_projection(index),
            Basis::Coupled(ref c) => c.total_projection(index),
        }
    }

    pub fn make_permutator(&self, group: &Group) -> Result<Box<dyn IndexPermutator>, Error> {
        Ok(match *self {
            Basis::Lexicographic(ref c) => Box::new(LexicographicPermutator::new(c, group)?),
            Basis::Coupled(ref c) => Box::new(CoupledPermutator::new(c, group)?),
        })
    }
}
