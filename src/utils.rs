use std::hash::Hash;
use conv::ValueInto;
use fnv::FnvHashMap;

/// Shorthand for casting numbers.  Panics if out of range.
pub fn cast<T: ValueInto<U>, U>(x: T) -> U {
    x.value_into().expect("integer conversion failure")
}

pub fn default_hash_map<K: Hash + Eq, V>() -> FnvHashMap<K, V> {
    FnvHashMap::default()
}

/// Absolute and relative tolerances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Toler {
    pub relerr: f64,
    pub abserr: f64,
}

/// `{ relerr: 1e-9, abserr: 1e-9 }`
impl Default for Toler {
    fn default() -> Self {
        Toler { relerr: 1e-9, abserr: 1e-9 }
    }
}

impl Toler {
    /// Whether `x` and `y` are equal within `abserr + relerr × max(|x|, |y|)`.
    pub fn is_eq(&self, x: f64, y: f64) -> bool {
        let scale = f64::max(x.abs(), y.abs());
        (x - y).abs() <= self.abserr + self.relerr * scale
    }

    /// Whether `x` is negligible compared to `abserr`.
    pub fn is_zero(&self, x: f64) -> bool {
        x.abs() <= self.abserr
    }
}

/// Multiply all elements of a slice.
pub fn product(xs: &[u32]) -> usize {
    xs.iter().map(|&x| cast::<u32, usize>(x)).product()
}
