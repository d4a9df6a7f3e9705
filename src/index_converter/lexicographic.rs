//! Uncoupled basis indexed by per-center projection counts.
//!
//! A basis index is the mixed-radix number whose digits are the projection
//! counts `n_a ∈ [0, mult_a)` of every center, center 0 being the most
//! significant digit.  The physical projection of a center is `n_a - s_a`.
use super::super::error::Error;
use super::super::half::Half;
use super::super::utils;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConverter {
    mults: Vec<u32>,
    /// `cumulative_product[a] == ∏[b > a] mults[b]`
    cumulative_product: Vec<usize>,
    total_space_size: usize,
    max_total_projection: u32,
}

impl IndexConverter {
    pub fn new(mults: Vec<u32>) -> Result<Self, Error> {
        if mults.is_empty() || mults.iter().any(|&m| m == 0) {
            return Err(Error::InvalidMultiplicities(mults));
        }
        let mut cumulative_product = vec![1; mults.len()];
        for a in (0 .. mults.len().saturating_sub(1)).rev() {
            cumulative_product[a] = cumulative_product[a + 1] * mults[a + 1] as usize;
        }
        let total_space_size = utils::product(&mults);
        let max_total_projection = mults.iter().map(|&m| m - 1).sum();
        Ok(Self {
            mults,
            cumulative_product,
            total_space_size,
            max_total_projection,
        })
    }

    #[inline]
    pub fn multiplicities(&self) -> &[u32] {
        &self.mults
    }

    #[inline]
    pub fn num_centers(&self) -> usize {
        self.mults.len()
    }

    #[inline]
    pub fn total_space_size(&self) -> usize {
        self.total_space_size
    }

    /// Largest value of `total_projection`, i.e. `∑ (mult_a - 1)`.
    #[inline]
    pub fn max_total_projection(&self) -> u32 {
        self.max_total_projection
    }

    /// Change of the basis index per unit of projection on `center`.
    #[inline]
    pub fn stride(&self, center: usize) -> usize {
        self.cumulative_product[center]
    }

    #[inline]
    pub fn spin(&self, center: usize) -> Half<i32> {
        Half::from_multiplicity(self.mults[center])
    }

    pub fn index_to_projections(&self, mut index: usize) -> Vec<u32> {
        debug_assert!(index < self.total_space_size);
        let mut projections = Vec::with_capacity(self.mults.len());
        for &c in &self.cumulative_product {
            projections.push((index / c) as u32);
            index %= c;
        }
        projections
    }

    pub fn projections_to_index(&self, projections: &[u32]) -> usize {
        debug_assert_eq!(projections.len(), self.mults.len());
        projections.iter()
            .zip(&self.cumulative_product)
            .map(|(&n, &c)| n as usize * c)
            .sum()
    }

    #[inline]
    pub fn index_to_one_projection(&self, index: usize, center: usize) -> u32 {
        ((index / self.cumulative_product[center]) % self.mults[center] as usize) as u32
    }

    /// Physical projection `m_a` of one center.
    #[inline]
    pub fn index_to_one_physical_projection(&self, index: usize, center: usize) -> Half<i32> {
        Half(2 * self.index_to_one_projection(index, center) as i32)
            - self.spin(center)
    }

    /// Shift the projection of one center by `±1`.
    ///
    /// The caller must make sure the result stays within `[0, mult)`; this
    /// is only checked in debug builds.
    #[inline]
    pub fn ladder_projection(&self, index: usize, center: usize, delta: i32) -> usize {
        debug_assert!({
            let n = self.index_to_one_projection(index, center) as i32 + delta;
            n >= 0 && n < self.mults[center] as i32
        }, "ladder out of range");
        (index as isize + delta as isize * self.cumulative_product[center] as isize) as usize
    }

    /// Sum of projection counts, in `0 ..= max_total_projection`.
    pub fn total_projection(&self, index: usize) -> u32 {
        let mut index = index;
        let mut sum = 0;
        for &c in &self.cumulative_product {
            sum += (index / c) as u32;
            index %= c;
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for mults in &[vec![2, 2], vec![3, 3, 3], vec![4, 4, 4, 4], vec![2, 3, 4, 5, 6]] {
            let conv = IndexConverter::new(mults.clone()).unwrap();
            assert_eq!(conv.total_space_size(), utils::product(mults));
            for i in 0 .. conv.total_space_size() {
                let ns = conv.index_to_projections(i);
                assert_eq!(conv.projections_to_index(&ns), i);
                for (a, &n) in ns.iter().enumerate() {
                    assert_eq!(conv.index_to_one_projection(i, a), n);
                }
                assert_eq!(conv.total_projection(i), ns.iter().sum::<u32>());
            }
        }
    }

    #[test]
    fn test_ladder() {
        let conv = IndexConverter::new(vec![2, 3, 4]).unwrap();
        let i = conv.projections_to_index(&[1, 1, 2]);
        let j = conv.ladder_projection(i, 1, 1);
        assert_eq!(conv.index_to_projections(j), vec![1, 2, 2]);
        let k = conv.ladder_projection(j, 2, -1);
        assert_eq!(conv.index_to_projections(k), vec![1, 2, 1]);
        assert_eq!(conv.index_to_one_physical_projection(k, 2), Half(-1));
        assert_eq!(conv.max_total_projection(), 1 + 2 + 3);
    }

    #[test]
    fn test_invalid_multiplicities() {
        for mults in &[vec![], vec![0], vec![2, 0, 3]] {
            match IndexConverter::new(mults.clone()) {
                Err(Error::InvalidMultiplicities(ref m)) if m == mults => {}
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(IndexConverter::new(vec![1]).is_ok());
    }
}
