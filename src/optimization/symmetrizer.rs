//! Projection of blocks onto the irreducible representations of a group.
//!
//! For a one-dimensional representation the projector is
//! `P = ∑[g] χ(g) g`.  A two-dimensional representation uses the diagonal
//! element `P₁₁ = ∑[g] D₁₁(g) g` to pick the first partner of a multiplet
//! and the transfer operator `P₂₁ = ∑[g] D₂₁(g) g` to generate the second
//! partner from it, so partners are stored next to each other.
//!
//! Every parent vector is projected.  A candidate first partner is
//! orthogonalized against the first partners already accepted that share
//! an index with it (found through an index → owners map); if nothing
//! survives, the candidate was already covered.
use fnv::FnvHashMap;
use super::super::error::Error;
use super::super::group::Group;
use super::super::group::permutator::IndexPermutator;
use super::super::space::Subspace;
use super::super::space::sparse::{SparseVector, UnitarySparseMatrix};
use super::super::utils::Toler;
use super::Pass;

pub struct Symmetrizer {
    group: Group,
    permutator: Box<dyn IndexPermutator>,
    toler: Toler,
}

impl Symmetrizer {
    pub fn new(group: Group, permutator: Box<dyn IndexPermutator>, toler: Toler) -> Self {
        Self { group, permutator, toler }
    }
}

/// Images of basis indices under the group, computed on demand.
struct ImageCache<'a> {
    permutator: &'a dyn IndexPermutator,
    images: FnvHashMap<usize, Vec<(usize, f64)>>,
}

impl<'a> ImageCache<'a> {
    fn get(&mut self, index: usize) -> Result<&[(usize, f64)], Error> {
        if !self.images.contains_key(&index) {
            let images = self.permutator.permutate(index)?;
            self.images.insert(index, images);
        }
        Ok(&self.images[&index])
    }

    /// `∑[g] coefficients[g] g v`
    fn project(&mut self, coefficients: &[f64], v: &SparseVector)
               -> Result<SparseVector, Error> {
        let mut entries = Vec::new();
        for &(i, x) in v.entries() {
            for (&c, &(j, sign)) in coefficients.iter().zip(self.get(i)?) {
                if c != 0.0 {
                    entries.push((j, c * sign * x));
                }
            }
        }
        Ok(SparseVector::from_unsorted(entries))
    }
}

/// Columns holding the first partners of one representation, by index.
#[derive(Default)]
struct Owners {
    by_index: FnvHashMap<usize, Vec<usize>>,
}

impl Owners {
    /// Remove the components along accepted vectors sharing an index.
    fn orthogonalize(&self, accepted: &UnitarySparseMatrix, w: &mut SparseVector,
                     toler: Toler) {
        let mut sharing: Vec<usize> = w.entries().iter()
            .filter_map(|&(i, _)| self.by_index.get(&i))
            .flat_map(|owners| owners.iter().cloned())
            .collect();
        sharing.sort();
        sharing.dedup();
        for j in sharing {
            let u = accepted.column(j);
            let overlap = u.dot(w);
            if !toler.is_zero(overlap) {
                w.add_scaled(-overlap, u);
            }
        }
    }

    fn insert(&mut self, column: usize, w: &SparseVector) {
        for &(i, _) in w.entries() {
            self.by_index.entry(i).or_insert_with(Vec::new).push(column);
        }
    }
}

impl Pass for Symmetrizer {
    fn name(&self) -> &'static str {
        "symmetrize"
    }

    fn apply_block(&self, block: Subspace) -> Result<Vec<Subspace>, Error> {
        if block.transformation.is_some() {
            illegal!("symmetrize on a transformed block");
        }
        let reps = &self.group.properties().representations;
        let rows = block.decomposition.rows();
        let mut cache = ImageCache {
            permutator: &*self.permutator,
            images: Default::default(),
        };
        let mut children: Vec<UnitarySparseMatrix> = reps.iter()
            .map(|_| UnitarySparseMatrix::new(rows))
            .collect();
        let mut owners: Vec<Owners> = reps.iter().map(|_| Default::default()).collect();
        for v in block.decomposition.columns() {
            for (r, rep) in reps.iter().enumerate() {
                let mut w = cache.project(&rep.projectors[0], v)?;
                w.erase_zeros(self.toler);
                if w.is_empty() || !w.normalize(self.toler) {
                    continue;
                }
                owners[r].orthogonalize(&children[r], &mut w, self.toler);
                w.erase_zeros(self.toler);
                if w.is_empty() || !w.normalize(self.toler) {
                    continue;
                }
                let mut partners = Vec::with_capacity(rep.dimension - 1);
                for coefficients in &rep.projectors[1 ..] {
                    let mut partner = cache.project(coefficients, &w)?;
                    partner.erase_zeros(self.toler);
                    if !partner.normalize(self.toler) {
                        return Err(Error::InvalidGroup(format!(
                            "{} has no partner vector in {}",
                            self.group.group_type(), rep.name)));
                    }
                    partners.push(partner);
                }
                owners[r].insert(children[r].size(), &w);
                children[r].push(w);
                for partner in partners {
                    children[r].push(partner);
                }
            }
        }
        debug!("symmetrize: block of {} -> {:?}", block.size(),
               children.iter().map(|c| c.size()).collect::<Vec<_>>());
        Ok(children.into_iter().zip(reps).enumerate().map(|(r, (decomposition, rep))| {
            let mut properties = block.properties.clone();
            properties.dimensionality *= rep.dimension;
            properties.representations.push(r);
            properties.labels.push(rep.name.clone());
            Subspace::new(properties, decomposition)
        }).collect())
    }
}
