//! Passes based on the total projection `Tz`.
use super::super::error::Error;
use super::super::index_converter::Basis;
use super::super::space::Subspace;
use super::super::space::sparse::UnitarySparseMatrix;
use super::Pass;

/// Splits every block by total projection.
///
/// The projection of a column is read off its first entry alone; columns
/// are expected not to mix projections.
#[derive(Clone, Debug)]
pub struct ProjectionSorter {
    basis: Basis,
}

impl ProjectionSorter {
    pub fn new(basis: Basis) -> Self {
        Self { basis }
    }
}

impl Pass for ProjectionSorter {
    fn name(&self) -> &'static str {
        "tz_sort"
    }

    fn apply_block(&self, mut block: Subspace) -> Result<Vec<Subspace>, Error> {
        let rows = block.decomposition.rows();
        let num_projections = self.basis.max_total_projection() as usize + 1;
        let mut children: Vec<UnitarySparseMatrix> = (0 .. num_projections)
            .map(|_| UnitarySparseMatrix::new(rows))
            .collect();
        for j in 0 .. block.decomposition.size() {
            let column = block.decomposition.take_column(j);
            if let Some(index) = column.first_index() {
                children[self.basis.total_projection(index) as usize].push(column);
            }
        }
        Ok(children.into_iter().enumerate().map(|(t, decomposition)| {
            let mut properties = block.properties.clone();
            properties.projection = Some(t as u32);
            Subspace::new(properties, decomposition)
        }).collect())
    }
}

/// Keeps blocks with `2 Tz <= max` and counts their mirror images through
/// the degeneracy.
#[derive(Clone, Copy, Debug)]
pub struct PositiveProjectionsEliminator {
    pub max_projection: u32,
}

impl Pass for PositiveProjectionsEliminator {
    fn name(&self) -> &'static str {
        "eliminate_positive_projections"
    }

    fn apply_block(&self, mut block: Subspace) -> Result<Vec<Subspace>, Error> {
        let t = block.properties.projection
            .ok_or(Error::MissingMetadata("projection"))?;
        if 2 * t > self.max_projection {
            return Ok(Vec::new());
        }
        if 2 * t < self.max_projection {
            block.properties.degeneracy *= 2;
        }
        Ok(vec![block])
    }
}

/// Keeps only the lowest projection of every total-spin multiplet.
#[derive(Clone, Copy, Debug)]
pub struct NonMinimalProjectionsEliminator {
    pub max_projection: u32,
}

impl Pass for NonMinimalProjectionsEliminator {
    fn name(&self) -> &'static str {
        "eliminate_non_minimal_projections"
    }

    fn apply_block(&self, mut block: Subspace) -> Result<Vec<Subspace>, Error> {
        let t = block.properties.projection
            .ok_or(Error::MissingMetadata("projection"))?;
        let mult = block.properties.total_mult
            .ok_or(Error::MissingMetadata("total multiplicity"))?;
        if 2 * t + mult != self.max_projection + 1 {
            return Ok(Vec::new());
        }
        block.properties.degeneracy *= mult as usize;
        Ok(vec![block])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::super::index_converter::lexicographic::IndexConverter;
    use super::super::super::space::Space;

    #[test]
    fn test_sort_and_eliminate() {
        let conv = IndexConverter::new(vec![3, 3, 3]).unwrap();
        let space = Space::full(27);
        let sorted = ProjectionSorter::new(Basis::Lexicographic(conv.clone()))
            .apply(space).unwrap();
        assert_eq!(sorted.len(), 7);
        assert!(sorted.check_size(27).is_ok());
        for block in &sorted.blocks {
            let t = block.properties.projection.unwrap();
            for column in block.decomposition.columns() {
                assert_eq!(conv.total_projection(column.first_index().unwrap()), t);
            }
        }
        let reduced = PositiveProjectionsEliminator { max_projection: 6 }
            .apply(sorted).unwrap();
        assert_eq!(reduced.len(), 4);
        assert!(reduced.check_size(27).is_ok());
        assert_eq!(reduced.blocks[3].properties.degeneracy, 1);
        assert_eq!(reduced.blocks[0].properties.degeneracy, 2);
    }

    #[test]
    fn test_missing_metadata() {
        let block = Space::full(4).blocks.pop().unwrap();
        let positive = PositiveProjectionsEliminator { max_projection: 2 };
        match positive.apply_block(block.clone()) {
            Err(Error::MissingMetadata(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        let mut block = block;
        block.properties.projection = Some(1);
        let non_minimal = NonMinimalProjectionsEliminator { max_projection: 2 };
        match non_minimal.apply_block(block) {
            Err(Error::MissingMetadata(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
