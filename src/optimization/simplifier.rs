use super::super::error::Error;
use super::super::space::Subspace;
use super::Pass;

/// Keeps one partner of every multiplet of a multidimensional
/// representation; the others are counted through the degeneracy.
#[derive(Clone, Copy, Debug)]
pub struct NonAbelianSimplifier;

impl Pass for NonAbelianSimplifier {
    fn name(&self) -> &'static str {
        "non_abelian_simplify"
    }

    fn apply_block(&self, mut block: Subspace) -> Result<Vec<Subspace>, Error> {
        let d = block.properties.dimensionality;
        if d > 1 {
            if block.transformation.is_some() {
                illegal!("non_abelian_simplify on a transformed block");
            }
            block.decomposition.keep_every(d);
            block.properties.degeneracy *= d;
            block.properties.dimensionality = 1;
        }
        Ok(vec![block])
    }
}
