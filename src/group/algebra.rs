//! Character and projector tables of the supported point groups.
use std::f64::consts::PI;
use std::sync::{Arc, Mutex};
use fnv::FnvHashMap;
use num::integer::gcd;
use super::super::error::Error;
use super::GroupType;

/// An irreducible representation.
#[derive(Clone, Debug)]
pub struct Representation {
    pub name: String,
    pub dimension: usize,
    /// Indexed by group element.
    pub characters: Vec<f64>,
    /// `projectors[i][g]`: coefficient of element `g` in the projector
    /// onto (or transfer operator into) partner `i`.  One-dimensional
    /// representations have a single projector equal to the characters.
    pub projectors: Vec<Vec<f64>>,
}

/// Everything about a group that does not depend on how it acts on the
/// centers.
#[derive(Clone, Debug)]
pub struct AlgebraicProperties {
    pub group_type: GroupType,
    pub generator_orders: Vec<u32>,
    /// Each element as exponents of the generators, applied right to left:
    /// `[k, l]` is `g0^k ∘ g1^l`.  Element 0 is the identity.
    pub elements: Vec<Vec<u32>>,
    pub element_orders: Vec<u32>,
    /// Representation 0 is fully symmetric.
    pub representations: Vec<Representation>,
}

impl AlgebraicProperties {
    pub fn new(group_type: GroupType) -> Result<Self, Error> {
        match group_type {
            GroupType::S2 => Ok(Self::s2()),
            GroupType::Dihedral(n) => {
                if n < 3 || n > 49 {
                    return Err(Error::InvalidGroup(format!(
                        "dihedral group of order {} is not supported", n)));
                }
                Ok(Self::dihedral(n))
            }
        }
    }

    fn s2() -> Self {
        Self {
            group_type: GroupType::S2,
            generator_orders: vec![2],
            elements: vec![vec![0], vec![1]],
            element_orders: vec![1, 2],
            representations: vec![
                one_dimensional("A", vec![1.0, 1.0]),
                one_dimensional("B", vec![1.0, -1.0]),
            ],
        }
    }

    /// Generated by a rotation `r` of order `n` and a reflection `s`.
    fn dihedral(n: u32) -> Self {
        let elements: Vec<Vec<u32>> = (0 .. 2)
            .flat_map(|l| (0 .. n).map(move |k| vec![k, l]))
            .collect();
        let element_orders = elements.iter().map(|e| {
            if e[1] == 1 {
                2
            } else {
                n / gcd(e[0], n)
            }
        }).collect();
        let parity = |k: u32| if k % 2 == 0 { 1.0 } else { -1.0 };
        let reflection_sign = |l: u32| if l == 0 { 1.0 } else { -1.0 };
        let mut representations = vec![
            one_dimensional("A1", elements.iter().map(|_| 1.0).collect()),
            one_dimensional("A2", elements.iter()
                            .map(|e| reflection_sign(e[1])).collect()),
        ];
        if n % 2 == 0 {
            representations.push(one_dimensional(
                "B1", elements.iter().map(|e| parity(e[0])).collect()));
            representations.push(one_dimensional(
                "B2", elements.iter()
                    .map(|e| parity(e[0]) * reflection_sign(e[1])).collect()));
        }
        for k in 1 .. (n + 1) / 2 {
            // D(r^j) = [[c, -s], [s, c]], D(r^j s) = [[c, s], [s, -c]]
            let angle = |e: &Vec<u32>| 2.0 * PI * (k * e[0]) as f64 / n as f64;
            let d11 = elements.iter().map(|e| angle(e).cos()).collect();
            let d21 = elements.iter().map(|e| angle(e).sin()).collect();
            let characters = elements.iter().map(|e| {
                if e[1] == 0 {
                    2.0 * angle(e).cos()
                } else {
                    0.0
                }
            }).collect();
            representations.push(Representation {
                name: format!("E{}", k),
                dimension: 2,
                characters,
                projectors: vec![d11, d21],
            });
        }
        Self {
            group_type: GroupType::Dihedral(n),
            generator_orders: vec![n, 2],
            elements,
            element_orders,
            representations,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn num_generators(&self) -> usize {
        self.generator_orders.len()
    }

    #[inline]
    pub fn num_representations(&self) -> usize {
        self.representations.len()
    }

    pub fn is_abelian(&self) -> bool {
        self.representations.iter().all(|r| r.dimension == 1)
    }
}

fn one_dimensional(name: &str, characters: Vec<f64>) -> Representation {
    Representation {
        name: name.to_owned(),
        dimension: 1,
        projectors: vec![characters.clone()],
        characters,
    }
}

/// Shared store of algebraic tables, one per group type.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    tables: Mutex<FnvHashMap<GroupType, Arc<AlgebraicProperties>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, group_type: GroupType) -> Result<Arc<AlgebraicProperties>, Error> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = tables.get(&group_type) {
            return Ok(table.clone());
        }
        let table = Arc::new(AlgebraicProperties::new(group_type)?);
        tables.insert(group_type, table.clone());
        Ok(table)
    }
}
