//! Column-sparse semiunitary matrices.
use std::cmp::Ordering;
use std::mem;
use nalgebra::DMatrix;
use super::super::utils::Toler;

/// Sparse vector stored as `(index, coefficient)` pairs sorted by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn unit(index: usize) -> Self {
        Self { entries: vec![(index, 1.0)] }
    }

    /// Sort the entries and add up coefficients of repeated indices.
    pub fn from_unsorted(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|&(i, _)| i);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (i, x) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == i => last.1 += x,
                _ => merged.push((i, x)),
            }
        }
        Self { entries: merged }
    }

    #[inline]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest index with a stored coefficient.
    #[inline]
    pub fn first_index(&self) -> Option<usize> {
        self.entries.first().map(|&(i, _)| i)
    }

    pub fn get(&self, index: usize) -> f64 {
        match self.entries.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(k) => self.entries[k].1,
            Err(_) => 0.0,
        }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut p, mut q) = (0, 0);
        let mut sum = 0.0;
        while p < a.len() && q < b.len() {
            match a[p].0.cmp(&b[q].0) {
                Ordering::Less => p += 1,
                Ordering::Greater => q += 1,
                Ordering::Equal => {
                    sum += a[p].1 * b[q].1;
                    p += 1;
                    q += 1;
                }
            }
        }
        sum
    }

    #[inline]
    pub fn norm_sqr(&self) -> f64 {
        self.entries.iter().map(|&(_, x)| x * x).sum()
    }

    pub fn scale(&mut self, factor: f64) {
        for entry in &mut self.entries {
            entry.1 *= factor;
        }
    }

    /// `self += factor * other`
    pub fn add_scaled(&mut self, factor: f64, other: &Self) {
        let mut entries = mem::replace(&mut self.entries, Vec::new());
        entries.extend(other.entries.iter().map(|&(i, x)| (i, factor * x)));
        *self = Self::from_unsorted(entries);
    }

    /// Remove coefficients below `toler.abserr` in magnitude.
    pub fn erase_zeros(&mut self, toler: Toler) {
        self.entries.retain(|&(_, x)| !toler.is_zero(x));
    }

    /// Scale to unit norm.  Returns `false` and leaves the vector untouched
    /// if its norm is negligible.
    pub fn normalize(&mut self, toler: Toler) -> bool {
        let norm = self.norm_sqr().sqrt();
        if toler.is_zero(norm) {
            return false;
        }
        self.scale(1.0 / norm);
        true
    }
}

/// Columns are orthonormal vectors in a space of `rows` basis states.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitarySparseMatrix {
    rows: usize,
    columns: Vec<SparseVector>,
}

impl UnitarySparseMatrix {
    pub fn new(rows: usize) -> Self {
        Self { rows, columns: Vec::new() }
    }

    pub fn identity(rows: usize) -> Self {
        Self { rows, columns: (0 .. rows).map(SparseVector::unit).collect() }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn column(&self, j: usize) -> &SparseVector {
        &self.columns[j]
    }

    #[inline]
    pub fn columns(&self) -> &[SparseVector] {
        &self.columns
    }

    pub fn push(&mut self, column: SparseVector) {
        debug_assert!(column.entries().last().map(|&(i, _)| i < self.rows).unwrap_or(true),
                      "row index out of range");
        self.columns.push(column);
    }

    /// Move a column out, leaving an empty one behind.
    pub fn take_column(&mut self, j: usize) -> SparseVector {
        mem::replace(&mut self.columns[j], SparseVector::new())
    }

    pub fn copy_column_from(&mut self, other: &Self, j: usize) {
        self.push(other.columns[j].clone());
    }

    pub fn scale_column(&mut self, j: usize, factor: f64) {
        self.columns[j].scale(factor);
    }

    pub fn erase_zeros(&mut self, toler: Toler) {
        for column in &mut self.columns {
            column.erase_zeros(toler);
        }
    }

    /// Normalize every column in place.
    pub fn normalize(&mut self, toler: Toler) {
        for column in &mut self.columns {
            column.normalize(toler);
        }
    }

    pub fn resize_rows(&mut self, rows: usize) {
        debug_assert!(self.columns.iter().all(|c| {
            c.entries().last().map(|&(i, _)| i < rows).unwrap_or(true)
        }), "shrinking would drop entries");
        self.rows = rows;
    }

    #[inline]
    pub fn column_dot(&self, i: usize, j: usize) -> f64 {
        self.columns[i].dot(&self.columns[j])
    }

    /// Keep every `step`-th column starting with the first.
    pub fn keep_every(&mut self, step: usize) {
        let columns = mem::replace(&mut self.columns, Vec::new());
        self.columns = columns.into_iter().step_by(step).collect();
    }

    /// Dense `rows × size` copy.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.rows, self.columns.len());
        for (j, column) in self.columns.iter().enumerate() {
            for &(i, x) in column.entries() {
                m[(i, j)] = x;
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_vector() {
        let toler = Toler::default();
        let mut v = SparseVector::from_unsorted(vec![(3, 1.0), (1, 2.0), (3, 1.0), (5, 1e-12)]);
        assert_eq!(v.entries(), &[(1, 2.0), (3, 2.0), (5, 1e-12)]);
        v.erase_zeros(toler);
        assert_eq!(v.len(), 2);
        let w = SparseVector::from_unsorted(vec![(0, 1.0), (3, -1.0)]);
        assert_eq!(v.dot(&w), -2.0);
        v.add_scaled(2.0, &w);
        assert_eq!(v.entries(), &[(0, 2.0), (1, 2.0), (3, 0.0)]);
        v.erase_zeros(toler);
        assert!(v.normalize(toler));
        toler_assert_eq!(toler, v.norm_sqr(), 1.0);
        assert_eq!(v.first_index(), Some(0));
        toler_assert_eq!(toler, v.get(1), 0.5f64.sqrt());
        assert!(!SparseVector::new().normalize(toler));
    }

    #[test]
    fn test_unitary_sparse_matrix() {
        let mut m = UnitarySparseMatrix::identity(4);
        assert_eq!(m.size(), 4);
        assert_eq!(m.column_dot(1, 1), 1.0);
        assert_eq!(m.column_dot(1, 2), 0.0);
        m.keep_every(2);
        assert_eq!(m.size(), 2);
        assert_eq!(m.column(1), &SparseVector::unit(2));
        let c = m.take_column(0);
        assert_eq!(c, SparseVector::unit(0));
        assert!(m.column(0).is_empty());
        m.resize_rows(8);
        assert_eq!(m.to_dense().shape(), (8, 2));

        let mut n = UnitarySparseMatrix::new(8);
        n.copy_column_from(&m, 1);
        n.scale_column(0, -3.0);
        assert_eq!(n.column(0).entries(), &[(2, -3.0)]);
        n.normalize(Toler::default());
        assert_eq!(n.column(0).entries(), &[(2, -1.0)]);
    }
}
