//! Action of group elements on basis indices.
use fnv::FnvHashMap;
use super::super::error::Error;
use super::super::index_converter::coupled::{self, Level};
use super::super::index_converter::lexicographic;
use super::{Group, Permutation};

/// Maps a basis index onto its images under every group element.
pub trait IndexPermutator: Send + Sync {
    /// Same order as `Group::elements`.  Each image carries a sign.
    fn permutate(&self, index: usize) -> Result<Vec<(usize, f64)>, Error>;
}

fn check_multiplicities(mults: &[u32], group: &Group) -> Result<(), Error> {
    if group.num_centers() != mults.len() {
        return Err(Error::DimensionMismatch(mults.len(), group.num_centers()));
    }
    for gen in group.generators() {
        for (i, &j) in gen.iter().enumerate() {
            if mults[i] != mults[j] {
                return Err(Error::CenterMultiplicityMismatch(i, j));
            }
        }
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct LexicographicPermutator {
    converter: lexicographic::IndexConverter,
    elements: Vec<Permutation>,
}

impl LexicographicPermutator {
    pub fn new(converter: &lexicographic::IndexConverter, group: &Group)
               -> Result<Self, Error> {
        check_multiplicities(converter.multiplicities(), group)?;
        Ok(Self {
            converter: converter.clone(),
            elements: group.elements().to_vec(),
        })
    }
}

impl IndexPermutator for LexicographicPermutator {
    fn permutate(&self, index: usize) -> Result<Vec<(usize, f64)>, Error> {
        let projections = self.converter.index_to_projections(index);
        let mut permuted = vec![0; projections.len()];
        Ok(self.elements.iter().map(|element| {
            for (i, &j) in element.iter().enumerate() {
                permuted[j] = projections[i];
            }
            (self.converter.projections_to_index(&permuted), 1.0)
        }).collect())
    }
}

/// An element extended to every position of the coupling tree.
#[derive(Clone, Debug)]
struct TreePermutation {
    positions: Permutation,
    /// Positions whose instruction has its operands swapped in the image.
    swapped: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct CoupledPermutator {
    converter: coupled::IndexConverter,
    elements: Vec<TreePermutation>,
}

impl CoupledPermutator {
    /// Only groups whose generators are involutions, acting compatibly with
    /// the order of summation, are supported.
    pub fn new(converter: &coupled::IndexConverter, group: &Group)
               -> Result<Self, Error> {
        if group.properties().generator_orders.iter().any(|&o| o > 2) {
            return Err(Error::NonAbelianInCoupledBasis);
        }
        check_multiplicities(converter.multiplicities(), group)?;
        let order = converter.order();
        let mut by_operands = FnvHashMap::default();
        for ins in order.instructions() {
            let [a, b] = ins.summands;
            by_operands.insert((a.min(b), a.max(b)), *ins);
        }
        let elements = group.elements().iter().map(|element| {
            let mut positions = element.clone();
            positions.resize(order.num_positions(), 0);
            let mut swapped = Vec::new();
            for ins in order.instructions() {
                let [a, b] = ins.summands;
                let (ga, gb) = (positions[a], positions[b]);
                let image = by_operands.get(&(ga.min(gb), ga.max(gb)))
                    .ok_or(Error::IncompatibleOrderOfSummation)?;
                positions[ins.sum] = image.sum;
                if image.summands[0] != ga {
                    swapped.push(ins.sum);
                }
            }
            Ok(TreePermutation { positions, swapped })
        }).collect::<Result<_, Error>>()?;
        Ok(Self { converter: converter.clone(), elements })
    }
}

impl IndexPermutator for CoupledPermutator {
    fn permutate(&self, index: usize) -> Result<Vec<(usize, f64)>, Error> {
        let order = self.converter.order();
        let (level, projection) = self.converter.index_to_state(index);
        let mut permuted = Level(vec![0; level.0.len()]);
        self.elements.iter().map(|element| {
            for (p, &q) in element.positions.iter().enumerate() {
                permuted.0[q] = level.0[p];
            }
            // |j_b j_a; j_c⟩ = (-1)^(j_a + j_b - j_c) |j_a j_b; j_c⟩
            let phase: i32 = element.swapped.iter().map(|&c| {
                let ins = order.instructions()[c - order.num_centers()];
                let [a, b] = ins.summands;
                (level.spin(a) + level.spin(b) - level.spin(c)).twice() / 2
            }).sum();
            let sign = if phase % 2 == 0 { 1.0 } else { -1.0 };
            let image = self.converter.state_to_index(&permuted, projection)
                .ok_or(Error::IncompatibleOrderOfSummation)?;
            Ok((image, sign))
        }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::GroupType;
    use super::super::algebra::GroupRegistry;
    use super::super::super::index_converter::coupled::OrderOfSummation;

    #[test]
    fn test_lexicographic() {
        let registry = GroupRegistry::new();
        let group = Group::new(&registry, GroupType::Dihedral(3), vec![
            vec![1, 2, 0],
            vec![0, 2, 1],
        ]).unwrap();
        let conv = lexicographic::IndexConverter::new(vec![3, 3, 3]).unwrap();
        let perm = LexicographicPermutator::new(&conv, &group).unwrap();
        let i = conv.projections_to_index(&[2, 1, 0]);
        let images = perm.permutate(i).unwrap();
        assert_eq!(images.len(), 6);
        assert_eq!(images[0], (i, 1.0));
        // center 0 -> 1, 1 -> 2, 2 -> 0
        assert_eq!(conv.index_to_projections(images[1].0), vec![0, 2, 1]);
        for &(j, _) in &images {
            assert_eq!(conv.total_projection(j), conv.total_projection(i));
        }
    }

    #[test]
    fn test_multiplicity_mismatch() {
        let registry = GroupRegistry::new();
        let group = Group::new(&registry, GroupType::S2, vec![vec![1, 0]]).unwrap();
        let conv = lexicographic::IndexConverter::new(vec![2, 3]).unwrap();
        match LexicographicPermutator::new(&conv, &group) {
            Err(Error::CenterMultiplicityMismatch(0, 1)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_coupled_swap_sign() {
        let registry = GroupRegistry::new();
        let group = Group::new(&registry, GroupType::S2, vec![vec![1, 0]]).unwrap();
        let conv = coupled::IndexConverter::new(
            vec![2, 2], OrderOfSummation::chain(2).unwrap()).unwrap();
        let perm = CoupledPermutator::new(&conv, &group).unwrap();
        // singlet is antisymmetric, triplet symmetric
        for i in 0 .. conv.total_space_size() {
            let images = perm.permutate(i).unwrap();
            let expected = if conv.total_multiplicity(i) == 1 { -1.0 } else { 1.0 };
            assert_eq!(images[1], (i, expected));
        }
    }

    #[test]
    fn test_coupled_rejections() {
        let registry = GroupRegistry::new();
        let d3 = Group::new(&registry, GroupType::Dihedral(3), vec![
            vec![1, 2, 0],
            vec![0, 2, 1],
        ]).unwrap();
        let conv = coupled::IndexConverter::new(
            vec![2, 2, 2], OrderOfSummation::chain(3).unwrap()).unwrap();
        match CoupledPermutator::new(&conv, &d3) {
            Err(Error::NonAbelianInCoupledBasis) => {}
            other => panic!("unexpected {:?}", other),
        }
        let s2 = Group::new(&registry, GroupType::S2, vec![vec![0, 2, 1]]).unwrap();
        match CoupledPermutator::new(&conv, &s2) {
            Err(Error::IncompatibleOrderOfSummation) => {}
            other => panic!("unexpected {:?}", other),
        }
        let paired = coupled::IndexConverter::new(
            vec![2, 2, 2], OrderOfSummation::paired(&[0, 2, 1]).unwrap()).unwrap();
        assert!(CoupledPermutator::new(&paired, &s2).is_ok());
    }
}
