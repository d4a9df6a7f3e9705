//! Permutation groups acting on the centers.
pub mod algebra;
pub mod permutator;

use std::fmt;
use std::sync::Arc;
use self::algebra::{AlgebraicProperties, GroupRegistry};
use super::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    /// `{e, s}`
    S2,
    /// Symmetries of a regular polygon, `2 n` elements.
    Dihedral(u32),
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GroupType::S2 => write!(f, "S2"),
            GroupType::Dihedral(n) => write!(f, "D{}", n),
        }
    }
}

/// A permutation `p` maps center `i` onto center `p[i]`.
pub type Permutation = Vec<usize>;

fn compose(f: &[usize], g: &[usize]) -> Permutation {
    g.iter().map(|&i| f[i]).collect()
}

fn power(p: &[usize], k: u32) -> Permutation {
    let mut result: Permutation = (0 .. p.len()).collect();
    for _ in 0 .. k {
        result = compose(p, &result);
    }
    result
}

fn is_identity(p: &[usize]) -> bool {
    p.iter().enumerate().all(|(i, &j)| i == j)
}

/// A group together with its action on the centers.
#[derive(Clone, Debug)]
pub struct Group {
    properties: Arc<AlgebraicProperties>,
    generators: Vec<Permutation>,
    /// Indexed like `properties.elements`.
    elements: Vec<Permutation>,
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.properties.group_type == other.properties.group_type
            && self.generators == other.generators
    }
}

impl Group {
    pub fn new(registry: &GroupRegistry, group_type: GroupType,
               generators: Vec<Permutation>) -> Result<Self, Error> {
        let properties = registry.get(group_type)?;
        if generators.len() != properties.num_generators() {
            return Err(Error::InvalidGroup(format!(
                "{} needs {} generators, got {}",
                group_type, properties.num_generators(), generators.len())));
        }
        let n = generators[0].len();
        for (gen, &order) in generators.iter().zip(&properties.generator_orders) {
            if gen.len() != n {
                return Err(Error::InvalidGroup(format!(
                    "generators of different lengths: {:?}", generators)));
            }
            let mut seen = vec![false; n];
            for &i in gen {
                if i >= n || seen[i] {
                    return Err(Error::InvalidGroup(format!(
                        "{:?} is not a permutation", gen)));
                }
                seen[i] = true;
            }
            if !is_identity(&power(gen, order)) {
                return Err(Error::InvalidGroup(format!(
                    "{:?} raised to {} is not the identity", gen, order)));
            }
        }
        let elements: Vec<Permutation> = properties.elements.iter().map(|exponents| {
            exponents.iter().zip(&generators)
                .fold((0 .. n).collect::<Permutation>(), |acc, (&k, gen)| {
                    compose(&acc, &power(gen, k))
                })
        }).collect();
        for (element, &order) in elements.iter().zip(&properties.element_orders) {
            if !is_identity(&power(element, order)) {
                return Err(Error::InvalidGroup(format!(
                    "element {:?} raised to {} is not the identity", element, order)));
            }
        }
        Ok(Self { properties, generators, elements })
    }

    #[inline]
    pub fn properties(&self) -> &AlgebraicProperties {
        &self.properties
    }

    #[inline]
    pub fn group_type(&self) -> GroupType {
        self.properties.group_type
    }

    #[inline]
    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    #[inline]
    pub fn elements(&self) -> &[Permutation] {
        &self.elements
    }

    #[inline]
    pub fn num_centers(&self) -> usize {
        self.generators[0].len()
    }

    #[inline]
    pub fn is_abelian(&self) -> bool {
        self.properties.is_abelian()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dihedral_elements() {
        let registry = GroupRegistry::new();
        let group = Group::new(&registry, GroupType::Dihedral(4), vec![
            vec![1, 2, 3, 0],
            vec![3, 2, 1, 0],
        ]).unwrap();
        assert_eq!(group.elements().len(), 8);
        assert_eq!(group.elements()[0], vec![0, 1, 2, 3]);
        // r ∘ s
        assert_eq!(group.elements()[5], vec![0, 3, 2, 1]);
        let mut sorted = group.elements().to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 8);
        assert!(!group.is_abelian());
    }

    #[test]
    fn test_invalid_groups() {
        let registry = GroupRegistry::new();
        let cases: Vec<(GroupType, Vec<Permutation>)> = vec![
            (GroupType::S2, vec![vec![1, 0], vec![1, 0]]),
            (GroupType::S2, vec![vec![1, 1]]),
            (GroupType::S2, vec![vec![1, 2, 0]]),
            (GroupType::Dihedral(3), vec![vec![1, 2, 0], vec![1, 0]]),
            (GroupType::Dihedral(4), vec![vec![1, 2, 3, 0], vec![0, 1, 2, 3]]),
            (GroupType::Dihedral(3), vec![vec![1, 0, 2], vec![0, 2, 1]]),
        ];
        for (group_type, generators) in cases {
            match Group::new(&registry, group_type, generators.clone()) {
                Err(Error::InvalidGroup(_)) => {}
                other => panic!("{:?} {:?}: expected InvalidGroup, got {:?}",
                                group_type, generators, other),
            }
        }
    }
}
