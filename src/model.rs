//! Spin Hamiltonians and the observables that go with them.
//!
//! ```text
//! H = ∑[(a, b)] J_ab S_a · S_b + ∑[a] D_a S_z,a²
//! ```
//!
//! Every coupling names a parameter; the Hamiltonian is linear in each.
use std::collections::BTreeMap;
use std::sync::Arc;
use super::eigendecompositor::{Quantity, Request};
use super::error::Error;
use super::half::Half;
use super::index_converter::Basis;
use super::ito::CoupledExchange;
use super::operator::{Constant, CoupledSzSquared, LinearSzSquared, Operator,
                      ScalarProduct, SzSquared};

/// Isotropic exchange `J S_a · S_b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub centers: [usize; 2],
    pub parameter: String,
}

/// Axial zero-field splitting `D S_z²` on one center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZeroField {
    pub center: usize,
    pub parameter: String,
}

#[derive(Clone, Debug)]
pub struct Model {
    pub mults: Vec<u32>,
    pub exchanges: Vec<Exchange>,
    pub zero_field: Vec<ZeroField>,
    pub parameters: BTreeMap<String, f64>,
    pub g_factor: f64,
}

impl Default for Model {
    fn default() -> Self {
        Model {
            mults: Vec::new(),
            exchanges: Vec::new(),
            zero_field: Vec::new(),
            parameters: BTreeMap::new(),
            g_factor: 2.0,
        }
    }
}

impl Model {
    pub fn new(mults: Vec<u32>) -> Self {
        Model { mults, ..Default::default() }
    }

    /// Add `J S_a · S_b` with `J` taken from `parameter`.
    pub fn exchange(mut self, a: usize, b: usize, parameter: &str) -> Self {
        self.exchanges.push(Exchange { centers: [a, b], parameter: parameter.to_owned() });
        self
    }

    pub fn zero_field(mut self, center: usize, parameter: &str) -> Self {
        self.zero_field.push(ZeroField { center, parameter: parameter.to_owned() });
        self
    }

    pub fn parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_owned(), value);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        let n = self.mults.len();
        if n == 0 {
            return Err(Error::Conf("no centers".to_owned()));
        }
        if let Some(&m) = self.mults.iter().find(|&&m| m == 0) {
            return Err(Error::Conf(format!("invalid multiplicity {}", m)));
        }
        for e in &self.exchanges {
            let [a, b] = e.centers;
            if a == b || a >= n || b >= n {
                return Err(Error::Conf(format!("invalid exchange pair ({}, {})", a, b)));
            }
            self.value(&e.parameter)?;
        }
        for z in &self.zero_field {
            if z.center >= n {
                return Err(Error::Conf(format!("invalid center {}", z.center)));
            }
            self.value(&z.parameter)?;
        }
        Ok(())
    }

    pub fn value(&self, parameter: &str) -> Result<f64, Error> {
        self.parameters.get(parameter).cloned()
            .ok_or_else(|| Error::Conf(format!("unknown parameter {}", parameter)))
    }

    /// Parameters the Hamiltonian depends on, with their values.
    pub fn changeable_parameters(&self) -> Result<BTreeMap<String, f64>, Error> {
        let names = self.exchanges.iter().map(|e| &e.parameter)
            .chain(self.zero_field.iter().map(|z| &z.parameter));
        let mut parameters = BTreeMap::new();
        for name in names {
            parameters.insert(name.clone(), self.value(name)?);
        }
        Ok(parameters)
    }

    /// Sum of the terms for which `coefficient(parameter)` gives a value,
    /// scaled by it.
    fn build<F>(&self, basis: &Basis, mut coefficient: F) -> Result<Operator, Error>
        where F: FnMut(&str) -> Result<Option<f64>, Error>
    {
        let mut op = Operator::new();
        match *basis {
            Basis::Lexicographic(ref conv) => {
                let conv = Arc::new(conv.clone());
                for e in &self.exchanges {
                    if let Some(c) = coefficient(&e.parameter)? {
                        let [a, b] = e.centers;
                        op.push(ScalarProduct { converter: conv.clone(), a, b, coefficient: c });
                    }
                }
                let mut d = vec![0.0; self.mults.len()];
                let mut any = false;
                for z in &self.zero_field {
                    if let Some(c) = coefficient(&z.parameter)? {
                        d[z.center] += c;
                        any = true;
                    }
                }
                if any {
                    op.push(SzSquared { converter: conv, coefficients: d });
                }
            }
            Basis::Coupled(ref conv) => {
                if !self.zero_field.is_empty() {
                    return Err(Error::Conf(
                        "zero-field splitting requires the lexicographic basis".to_owned()));
                }
                let conv = Arc::new(conv.clone());
                for e in &self.exchanges {
                    if let Some(c) = coefficient(&e.parameter)? {
                        let [a, b] = e.centers;
                        op.push(CoupledExchange::new(conv.clone(), a, b, c)?);
                    }
                }
            }
        }
        Ok(op)
    }

    pub fn hamiltonian(&self, basis: &Basis) -> Result<Operator, Error> {
        self.build(basis, |p| self.value(p).map(Some))
    }

    /// `∂H/∂p`
    pub fn derivative(&self, basis: &Basis, parameter: &str) -> Result<Operator, Error> {
        self.value(parameter)?;
        self.build(basis, |p| Ok(if p == parameter { Some(1.0) } else { None }))
    }

    /// `S² = ∑[a] s_a (s_a + 1) + 2 ∑[a < b] S_a · S_b`
    pub fn s_squared(&self, basis: &Basis) -> Result<Operator, Error> {
        let mut op = Operator::new();
        op.push(Constant(self.mults.iter()
                         .map(|&m| Half::from_multiplicity(m).casimir())
                         .sum()));
        let n = self.mults.len();
        match *basis {
            Basis::Lexicographic(ref conv) => {
                let conv = Arc::new(conv.clone());
                for a in 0 .. n {
                    for b in a + 1 .. n {
                        op.push(ScalarProduct { converter: conv.clone(), a, b, coefficient: 2.0 });
                    }
                }
            }
            Basis::Coupled(ref conv) => {
                let conv = Arc::new(conv.clone());
                for a in 0 .. n {
                    for b in a + 1 .. n {
                        op.push(CoupledExchange::new(conv.clone(), a, b, 2.0)?);
                    }
                }
            }
        }
        Ok(op)
    }

    /// `(g S_z)²` with the same `g` on every center.
    pub fn g_sz_squared(&self, basis: &Basis) -> Operator {
        let mut op = Operator::new();
        match *basis {
            Basis::Lexicographic(ref conv) => {
                op.push(LinearSzSquared {
                    converter: Arc::new(conv.clone()),
                    coefficients: vec![self.g_factor; self.mults.len()],
                });
            }
            Basis::Coupled(ref conv) => {
                op.push(CoupledSzSquared {
                    converter: Arc::new(conv.clone()),
                    coefficient: self.g_factor * self.g_factor,
                });
            }
        }
        op
    }

    /// Operators for the given quantities.  The energy is always included;
    /// with `implicit_total_spin` no `S²` operator is built.
    pub fn request(&self, basis: &Basis, quantities: &[Quantity],
                   derivatives: &[String], implicit_total_spin: bool)
                   -> Result<Request, Error> {
        self.validate()?;
        let mut request = Request::default();
        request.operators.insert(Quantity::Energy, self.hamiltonian(basis)?);
        for &q in quantities {
            match q {
                Quantity::Energy => {}
                Quantity::SSquared => {
                    if !implicit_total_spin {
                        request.operators.insert(q, self.s_squared(basis)?);
                    }
                }
                Quantity::GSzSquared => {
                    request.operators.insert(q, self.g_sz_squared(basis));
                }
            }
        }
        for p in derivatives {
            request.derivatives.insert((Quantity::Energy, p.clone()),
                                       self.derivative(basis, p)?);
        }
        request.parameters = self.changeable_parameters()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::index_converter::{coupled, lexicographic};
    use super::super::index_converter::coupled::OrderOfSummation;
    use super::super::utils::Toler;

    fn triangle() -> Model {
        Model::new(vec![2, 2, 2])
            .exchange(0, 1, "J")
            .exchange(1, 2, "J")
            .exchange(0, 2, "J")
            .parameter("J", 10.0)
    }

    #[test]
    fn test_s_squared_coupled_diagonal() {
        let conv = coupled::IndexConverter::new(
            vec![2, 3, 2], OrderOfSummation::chain(3).unwrap()).unwrap();
        let model = Model::new(vec![2, 3, 2]);
        let basis = Basis::Coupled(conv.clone());
        let m = model.s_squared(&basis).unwrap().full_matrix(12).unwrap();
        let toler = Toler::default();
        for i in 0 .. 12 {
            for j in 0 .. 12 {
                let expected = if i == j {
                    Half::from_multiplicity(conv.total_multiplicity(i)).casimir()
                } else {
                    0.0
                };
                toler_assert_eq!(toler, m[(i, j)], expected);
            }
        }
    }

    #[test]
    fn test_triangle_spectrum() {
        let conv = lexicographic::IndexConverter::new(vec![2, 2, 2]).unwrap();
        let basis = Basis::Lexicographic(conv);
        let h = triangle().hamiltonian(&basis).unwrap().full_matrix(8).unwrap();
        let mut values: Vec<f64> = h.symmetric_eigen().eigenvalues.iter().cloned().collect();
        values.sort_by(|x, y| x.partial_cmp(y).unwrap());
        // J/2 (S (S + 1) - 9/4)
        let toler = Toler::default();
        for &e in &values[.. 4] {
            toler_assert_eq!(toler, e, -7.5);
        }
        for &e in &values[4 ..] {
            toler_assert_eq!(toler, e, 7.5);
        }
    }

    #[test]
    fn test_derivative_and_request() {
        let conv = lexicographic::IndexConverter::new(vec![2, 2, 2]).unwrap();
        let basis = Basis::Lexicographic(conv);
        let model = triangle();
        let h = model.hamiltonian(&basis).unwrap().full_matrix(8).unwrap();
        let dh = model.derivative(&basis, "J").unwrap().full_matrix(8).unwrap();
        toler_assert_eq!(Toler::default(), (h - dh * 10.0).norm(), 0.0);
        let request = model.request(&basis, &[Quantity::SSquared], &["J".to_owned()], true)
            .unwrap();
        assert!(request.operators.contains_key(&Quantity::Energy));
        assert!(!request.operators.contains_key(&Quantity::SSquared));
        assert_eq!(request.parameters.len(), 1);
        assert!(model.derivative(&basis, "K").is_err());
    }

    #[test]
    fn test_invalid_model() {
        assert!(Model::new(vec![2, 2]).exchange(0, 0, "J").parameter("J", 1.0)
                .validate().is_err());
        assert!(Model::new(vec![2, 2]).exchange(0, 1, "J").validate().is_err());
        let order = OrderOfSummation::chain(1).unwrap();
        let conv = coupled::IndexConverter::new(vec![3], order).unwrap();
        assert!(Model::new(vec![3]).zero_field(0, "D").parameter("D", 1.0)
                .hamiltonian(&Basis::Coupled(conv)).is_err());
    }
}
