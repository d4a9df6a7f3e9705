//! Angular momentum coupling.
//!
//! All arguments are doubled (`tj = 2 j`, `tm = 2 m`) so that half-odd
//! values stay integral.  Exact values come from `wigner_symbols` and are
//! memoized as `f64` in a [`CouplingCtx`].  Each thread owns its own
//! context (see [`with_coupling_ctx`]), so lookups never take a lock.
use std::cell::RefCell;
use fnv::FnvHashMap;
use wigner_symbols::SignedSqrt;
pub use wigner_symbols::{ClebschGordan, Wigner6j, Wigner9j};
use super::error::Error;
use super::half::Half;

#[inline]
fn to_f64(x: SignedSqrt) -> f64 {
    x.into()
}

/// Triangle condition on doubled arguments, including integrality.
#[inline]
fn triangle(ta: i32, tb: i32, tc: i32) -> bool {
    Half::triangle(Half(ta), Half(tb), Half(tc))
}

fn cg_is_zero(cg: &ClebschGordan) -> bool {
    let &ClebschGordan { tj1, tm1, tj2, tm2, tj12, tm12 } = cg;
    tm1 + tm2 != tm12
        || !triangle(tj1, tj2, tj12)
        || tm1.abs() > tj1 || tm2.abs() > tj2 || tm12.abs() > tj12
        || (tj1 + tm1) % 2 != 0 || (tj2 + tm2) % 2 != 0
        || (tj12 + tm12) % 2 != 0
}

/// Memoization of coupling coefficients.  Not thread-safe by itself; use
/// one per thread.
#[derive(Clone, Debug, Default)]
pub struct CouplingCtx {
    cg: FnvHashMap<ClebschGordan, f64>,
    w6j: FnvHashMap<Wigner6j, f64>,
    w9j: FnvHashMap<Wigner9j, f64>,
}

impl CouplingCtx {
    /// `⟨j1 m1 j2 m2 | j12 m12⟩`
    pub fn cg(&mut self, cg: ClebschGordan) -> f64 {
        if cg_is_zero(&cg) {
            return 0.0;
        }
        *self.cg.entry(cg).or_insert_with(|| to_f64(cg.value()))
    }

    /// `{j1 j2 j3; j4 j5 j6}`
    pub fn w6j(&mut self, w: Wigner6j) -> f64 {
        let Wigner6j { tj1, tj2, tj3, tj4, tj5, tj6 } = w;
        if !(triangle(tj1, tj2, tj3) && triangle(tj1, tj5, tj6)
             && triangle(tj4, tj2, tj6) && triangle(tj4, tj5, tj3))
        {
            return 0.0;
        }
        *self.w6j.entry(w).or_insert_with(|| to_f64(w.value()))
    }

    /// `{j1 j2 j3; j4 j5 j6; j7 j8 j9}` where the third column holds tensor
    /// ranks 0, 1 or 2.
    pub fn w9j(&mut self, w: Wigner9j) -> Result<f64, Error> {
        let Wigner9j { tj1, tj2, tj3, tj4, tj5, tj6, tj7, tj8, tj9 } = w;
        let ranks = [tj3, tj6, tj9];
        if ranks.iter().any(|&k| k != 0 && k != 2 && k != 4) {
            return Err(Error::UnsupportedRank(ranks));
        }
        if !(triangle(tj1, tj2, tj3) && triangle(tj4, tj5, tj6)
             && triangle(tj7, tj8, tj9) && triangle(tj1, tj4, tj7)
             && triangle(tj2, tj5, tj8) && triangle(tj3, tj6, tj9))
        {
            return Ok(0.0);
        }
        Ok(*self.w9j.entry(w).or_insert_with(|| to_f64(w.value())))
    }

    /// Number of memoized coefficients.
    pub fn len(&self) -> usize {
        self.cg.len() + self.w6j.len() + self.w9j.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

thread_local! {
    static COUPLING_CTX: RefCell<CouplingCtx> = RefCell::new(CouplingCtx::default());
}

/// Run `f` with the coupling context owned by the current thread.
///
/// Must not be nested: pass the `&mut CouplingCtx` down instead.
pub fn with_coupling_ctx<F, R>(f: F) -> R
    where F: FnOnce(&mut CouplingCtx) -> R
{
    COUPLING_CTX.with(|ctx| f(&mut ctx.borrow_mut()))
}
