//! Irreducible tensor operators in the coupled basis.
//!
//! An isotropic exchange `S_a · S_b` equals `-√3 [S_a ⊗ S_b]⁰`.  The
//! product is coupled along the same tree as the basis: a position whose
//! subtree holds exactly one of `a` and `b` carries rank 1, every other
//! position rank 0.  Reduced matrix elements then follow from the 9j
//! recoupling formula applied bottom-up, with
//!
//! ```text
//! ⟨j || 1 || j⟩ = √(2 j + 1)
//! ⟨j || S || j⟩ = √(j (j + 1) (2 j + 1))
//! ```
//!
//! (Edmonds convention).  Only positions of rank 1 can change their
//! intermediate spin, by at most one.
use std::sync::Arc;
use super::ang_mom::{with_coupling_ctx, CouplingCtx, Wigner9j};
use super::error::Error;
use super::half::Half;
use super::index_converter::coupled::{IndexConverter, Level};
use super::operator::Term;

/// `c S_a · S_b` in the coupled basis.
#[derive(Clone, Debug)]
pub struct CoupledExchange {
    converter: Arc<IndexConverter>,
    coefficient: f64,
    /// Doubled rank of the coupled tensor at every tree position.
    ranks: Vec<i32>,
    /// Whether the subtree of a position contains `a` or `b`.
    touched: Vec<bool>,
    /// Intermediate positions of rank 1.
    active: Vec<usize>,
}

impl CoupledExchange {
    pub fn new(converter: Arc<IndexConverter>, a: usize, b: usize, coefficient: f64)
               -> Result<Self, Error>
    {
        let n = converter.order().num_centers();
        if a == b || a >= n || b >= n {
            return Err(Error::Conf(format!("invalid exchange pair ({}, {})", a, b)));
        }
        let positions = converter.order().num_positions();
        let mut has_a = vec![false; positions];
        let mut has_b = vec![false; positions];
        has_a[a] = true;
        has_b[b] = true;
        for ins in converter.order().instructions() {
            let [x, y] = ins.summands;
            has_a[ins.sum] = has_a[x] || has_a[y];
            has_b[ins.sum] = has_b[x] || has_b[y];
        }
        let ranks: Vec<i32> = (0 .. positions)
            .map(|p| if has_a[p] != has_b[p] { 2 } else { 0 })
            .collect();
        let touched = (0 .. positions).map(|p| has_a[p] || has_b[p]).collect();
        let active = (n .. positions).filter(|&p| ranks[p] != 0).collect();
        Ok(Self { converter, coefficient, ranks, touched, active })
    }

    /// `⟨bra || T || ket⟩` of the subtree rooted at `position`.
    fn reduced(&self, bra: &Level, ket: &Level, position: usize, ctx: &mut CouplingCtx)
               -> Result<f64, Error>
    {
        let (j, jp) = (bra.spin(position), ket.spin(position));
        if !self.touched[position] {
            return Ok(if j == jp { j.weight(1) } else { 0.0 });
        }
        let k = self.ranks[position];
        let ins = match self.converter.order().instruction(position) {
            None => {
                if j != jp {
                    return Ok(0.0);
                }
                return Ok(if k == 0 {
                    j.weight(1)
                } else {
                    j.casimir().sqrt() * j.weight(1)
                });
            }
            Some(ins) => ins,
        };
        let [x, y] = ins.summands;
        let rx = self.reduced(bra, ket, x, ctx)?;
        if rx == 0.0 {
            return Ok(0.0);
        }
        let ry = self.reduced(bra, ket, y, ctx)?;
        if ry == 0.0 {
            return Ok(0.0);
        }
        let w = ctx.w9j(Wigner9j {
            tj1: bra.spin(x).twice(), tj2: ket.spin(x).twice(), tj3: self.ranks[x],
            tj4: bra.spin(y).twice(), tj5: ket.spin(y).twice(), tj6: self.ranks[y],
            tj7: j.twice(), tj8: jp.twice(), tj9: k,
        })?;
        Ok(j.weight(1) * jp.weight(1) * ((k + 1) as f64).sqrt() * w * rx * ry)
    }

    /// `⟨bra M|c S_a · S_b|ket M⟩`, independent of `M`.
    pub fn element(&self, bra: &Level, ket: &Level, ctx: &mut CouplingCtx)
                   -> Result<f64, Error>
    {
        let root = self.converter.order().root();
        if bra.multiplicity(root) != ket.multiplicity(root) {
            return Ok(0.0);
        }
        let reduced = self.reduced(bra, ket, root, ctx)?;
        Ok(-(3.0f64).sqrt() * self.coefficient * reduced / ket.spin(root).weight(1))
    }

    fn visit(&self, k: usize, ket: &Level, bra: &mut Level, projection: u32,
             ctx: &mut CouplingCtx, out: &mut dyn FnMut(usize, f64))
             -> Result<(), Error>
    {
        if k == self.active.len() {
            if let Some(i) = self.converter.state_to_index(bra, projection) {
                let x = self.element(bra, ket, ctx)?;
                if x != 0.0 {
                    out(i, x);
                }
            }
            return Ok(());
        }
        let p = self.active[k];
        for j in ket.spin(p).tri_range(Half(2)) {
            bra.0[p] = j.multiplicity();
            self.visit(k + 1, ket, bra, projection, ctx, out)?;
        }
        bra.0[p] = ket.0[p];
        Ok(())
    }
}

impl Term for CoupledExchange {
    fn act(&self, index: usize, out: &mut dyn FnMut(usize, f64)) -> Result<(), Error> {
        let (ket, projection) = self.converter.index_to_state(index);
        let mut bra = ket.clone();
        with_coupling_ctx(|ctx| self.visit(0, ket, &mut bra, projection, ctx, out))
    }
}
