//! Total-spin basis built along a binary coupling tree.
//!
//! Positions `0 .. n` of the tree are the centers, positions `n .. 2 n - 1`
//! hold the intermediate sums, and the last position is the total spin.
//! A basis state is a [`Level`] (multiplicity at every position) together
//! with an unshifted projection `0 .. total_mult` of the total spin.
use std::collections::BTreeMap;
use super::super::ang_mom::{ClebschGordan, CouplingCtx};
use super::super::error::Error;
use super::super::half::Half;
use super::lexicographic;

/// Adds positions `summands[0]` and `summands[1]` into position `sum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SumInstruction {
    pub summands: [usize; 2],
    pub sum: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderOfSummation {
    num_centers: usize,
    instructions: Vec<SumInstruction>,
}

fn invalid<T>(msg: String) -> Result<T, Error> {
    Err(Error::InvalidOrderOfSummation(msg))
}

impl OrderOfSummation {
    /// Instruction `k` stores its sum in position `num_centers + k`.
    pub fn new(num_centers: usize, pairs: Vec<[usize; 2]>) -> Result<Self, Error> {
        if num_centers == 0 {
            return invalid("no centers".to_owned());
        }
        if pairs.len() + 1 != num_centers {
            return invalid(format!("expected {} instructions, got {}",
                                   num_centers - 1, pairs.len()));
        }
        let num_positions = 2 * num_centers - 1;
        let mut used = vec![false; num_positions];
        let mut instructions = Vec::with_capacity(pairs.len());
        for (k, pair) in pairs.into_iter().enumerate() {
            let sum = num_centers + k;
            for &x in &pair {
                if x >= sum {
                    return invalid(format!("position {} used before it is defined", x));
                }
                if used[x] {
                    return invalid(format!("position {} summed more than once", x));
                }
                used[x] = true;
            }
            instructions.push(SumInstruction { summands: pair, sum });
        }
        if let Some(x) = used[.. num_positions - 1].iter().position(|&u| !u) {
            return invalid(format!("position {} is never summed", x));
        }
        Ok(Self { num_centers, instructions })
    }

    /// `((0 + 1) + 2) + …`
    pub fn chain(num_centers: usize) -> Result<Self, Error> {
        if num_centers == 0 {
            return invalid("no centers".to_owned());
        }
        let instructions = (1 .. num_centers).map(|k| SumInstruction {
            summands: [if k == 1 { 0 } else { num_centers + k - 2 }, k],
            sum: num_centers + k - 1,
        }).collect();
        Ok(Self { num_centers, instructions })
    }

    /// Couple every center with its image under an involution first, then
    /// chain the pair sums and fixed centers in order of their lowest
    /// center.
    pub fn paired(involution: &[usize]) -> Result<Self, Error> {
        let n = involution.len();
        for (i, &j) in involution.iter().enumerate() {
            if j >= n || involution[j] != i {
                return invalid(format!("{:?} is not an involution", involution));
            }
        }
        let mut pairs = Vec::with_capacity(n.saturating_sub(1));
        let mut roots = Vec::new();
        for (i, &j) in involution.iter().enumerate() {
            if j == i {
                roots.push(i);
            } else if j > i {
                roots.push(n + pairs.len());
                pairs.push([i, j]);
            }
        }
        if let Some((&first, rest)) = roots.split_first() {
            let mut acc = first;
            for &r in rest {
                pairs.push([acc, r]);
                acc = n + pairs.len() - 1;
            }
        }
        Self::new(n, pairs)
    }

    #[inline]
    pub fn num_centers(&self) -> usize {
        self.num_centers
    }

    #[inline]
    pub fn num_positions(&self) -> usize {
        2 * self.num_centers - 1
    }

    #[inline]
    pub fn instructions(&self) -> &[SumInstruction] {
        &self.instructions
    }

    /// Instruction producing `position`, if it is not a center.
    #[inline]
    pub fn instruction(&self, position: usize) -> Option<&SumInstruction> {
        position.checked_sub(self.num_centers)
            .and_then(|k| self.instructions.get(k))
    }

    #[inline]
    pub fn root(&self) -> usize {
        self.num_positions() - 1
    }
}

/// Multiplicities at every position of the coupling tree.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(pub Vec<u32>);

impl Level {
    #[inline]
    pub fn multiplicity(&self, position: usize) -> u32 {
        self.0[position]
    }

    #[inline]
    pub fn spin(&self, position: usize) -> Half<i32> {
        Half::from_multiplicity(self.0[position])
    }

    #[inline]
    pub fn total_multiplicity(&self) -> u32 {
        self.0[self.0.len() - 1]
    }
}

#[derive(Clone, Debug)]
struct Block {
    mult: u32,
    offset: usize,
    levels: Vec<Level>,
}

impl Block {
    #[inline]
    fn size(&self) -> usize {
        self.levels.len() * self.mult as usize
    }
}

#[derive(Clone, Debug)]
pub struct IndexConverter {
    order: OrderOfSummation,
    lexicographic: lexicographic::IndexConverter,
    /// Ascending in `mult`.
    blocks: Vec<Block>,
}

impl IndexConverter {
    pub fn new(mults: Vec<u32>, order: OrderOfSummation) -> Result<Self, Error> {
        if order.num_centers() != mults.len() {
            return Err(Error::DimensionMismatch(mults.len(), order.num_centers()));
        }
        let lexicographic = lexicographic::IndexConverter::new(mults.clone())?;
        let mut partial = vec![mults.clone()];
        for ins in order.instructions() {
            let [a, b] = ins.summands;
            let mut next = Vec::with_capacity(partial.len());
            for level in partial {
                let ja = Half::from_multiplicity(level[a]);
                let jb = Half::from_multiplicity(level[b]);
                for jc in ja.tri_range(jb) {
                    let mut level = level.clone();
                    level.push(jc.multiplicity());
                    next.push(level);
                }
            }
            partial = next;
        }
        let mut by_mult = BTreeMap::new();
        for level in partial {
            let level = Level(level);
            by_mult.entry(level.total_multiplicity())
                .or_insert_with(Vec::new)
                .push(level);
        }
        let mut offset = 0;
        let blocks = by_mult.into_iter().map(|(mult, mut levels)| {
            levels.sort();
            let block = Block { mult, offset, levels };
            offset += block.size();
            block
        }).collect();
        debug_assert_eq!(offset, lexicographic.total_space_size());
        Ok(Self { order, lexicographic, blocks })
    }

    #[inline]
    pub fn order(&self) -> &OrderOfSummation {
        &self.order
    }

    /// Uncoupled converter for the same centers.
    #[inline]
    pub fn lexicographic(&self) -> &lexicographic::IndexConverter {
        &self.lexicographic
    }

    #[inline]
    pub fn multiplicities(&self) -> &[u32] {
        self.lexicographic.multiplicities()
    }

    #[inline]
    pub fn total_space_size(&self) -> usize {
        self.lexicographic.total_space_size()
    }

    #[inline]
    pub fn max_total_projection(&self) -> u32 {
        self.lexicographic.max_total_projection()
    }

    fn block_of(&self, index: usize) -> &Block {
        debug_assert!(index < self.total_space_size());
        let i = self.blocks.partition_point(|b| b.offset <= index);
        &self.blocks[i - 1]
    }

    pub fn index_to_state(&self, index: usize) -> (&Level, u32) {
        let block = self.block_of(index);
        let local = index - block.offset;
        let mult = block.mult as usize;
        (&block.levels[local / mult], (local % mult) as u32)
    }

    /// `None` if the level is not reachable along this coupling tree or
    /// the projection is out of range.
    pub fn state_to_index(&self, level: &Level, projection: u32) -> Option<usize> {
        if level.0.len() != self.order.num_positions() {
            return None;
        }
        let mult = level.total_multiplicity();
        if projection >= mult {
            return None;
        }
        let b = self.blocks.binary_search_by_key(&mult, |b| b.mult).ok()?;
        let block = &self.blocks[b];
        let pos = block.levels.binary_search(level).ok()?;
        Some(block.offset + pos * mult as usize + projection as usize)
    }

    #[inline]
    pub fn total_multiplicity(&self, index: usize) -> u32 {
        self.block_of(index).mult
    }

    /// Lowest total projection count of a multiplet.
    #[inline]
    fn projection_base(&self, mult: u32) -> u32 {
        (self.max_total_projection() + 1 - mult) / 2
    }

    /// Total projection as a count, same convention as the lexicographic
    /// converter.
    pub fn total_projection(&self, index: usize) -> u32 {
        let (level, projection) = self.index_to_state(index);
        projection + self.projection_base(level.total_multiplicity())
    }

    pub fn levels_with_multiplicity(&self, mult: u32) -> &[Level] {
        match self.blocks.binary_search_by_key(&mult, |b| b.mult) {
            Ok(b) => &self.blocks[b].levels,
            Err(_) => &[],
        }
    }

    /// Total multiplicities present, ascending.
    pub fn total_multiplicities(&self) -> Vec<u32> {
        self.blocks.iter().map(|b| b.mult).collect()
    }

    /// All indices whose total projection count is `projection`.
    pub fn indices_with_projection(&self, projection: u32) -> Vec<usize> {
        let mut indices = Vec::new();
        for block in &self.blocks {
            let base = self.projection_base(block.mult);
            if projection < base || projection - base >= block.mult {
                continue;
            }
            let p = (projection - base) as usize;
            let mult = block.mult as usize;
            indices.extend((0 .. block.levels.len())
                           .map(|pos| block.offset + pos * mult + p));
        }
        indices
    }

    /// Expansion of a coupled state in the lexicographic basis, sorted by
    /// lexicographic index.
    pub fn to_lexicographic(&self, index: usize, ctx: &mut CouplingCtx)
                            -> Vec<(usize, f64)>
    {
        let (level, projection) = self.index_to_state(index);
        let tm = 2 * projection as i32 + 1 - level.total_multiplicity() as i32;
        let mut expansion = self.expand(level, self.order.root(), tm, ctx);
        expansion.sort_by_key(|&(i, _)| i);
        expansion
    }

    fn expand(&self, level: &Level, position: usize, tm: i32, ctx: &mut CouplingCtx)
              -> Vec<(usize, f64)>
    {
        let ins = match self.order.instruction(position) {
            None => {
                let count = (tm + level.spin(position).twice()) / 2;
                return vec![(count as usize * self.lexicographic.stride(position), 1.0)];
            }
            Some(ins) => ins,
        };
        let [a, b] = ins.summands;
        let ja = level.spin(a);
        let jb = level.spin(b);
        let jc = level.spin(position);
        let mut expansion = Vec::new();
        for ma in ja.multiplet() {
            let mb = Half(tm) - ma;
            if mb.twice().abs() > jb.twice() {
                continue;
            }
            let cg = ctx.cg(ClebschGordan {
                tj1: ja.twice(),
                tm1: ma.twice(),
                tj2: jb.twice(),
                tm2: mb.twice(),
                tj12: jc.twice(),
                tm12: tm,
            });
            if cg == 0.0 {
                continue;
            }
            let left = self.expand(level, a, ma.twice(), ctx);
            let right = self.expand(level, b, mb.twice(), ctx);
            for &(i, x) in &left {
                for &(j, y) in &right {
                    expansion.push((i + j, cg * x * y));
                }
            }
        }
        expansion
    }
}
