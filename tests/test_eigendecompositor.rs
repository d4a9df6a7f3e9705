#[macro_use]
extern crate spinred;

use std::sync::Arc;
use spinred::eigendecompositor::{eigendecompose, Eigendecompositor,
                                 EigendecompositorBuilder, KrylovConf, Quantity, Results};
use spinred::error::Error;
use spinred::index_converter::BasisKind;
use spinred::linalg::NalgebraBackend;
use spinred::model::Model;
use spinred::optimization::{OptimizationList, Optimizer, Step};
use spinred::space::Space;
use spinred::utils::Toler;

fn ring(n: usize, mult: u32) -> Model {
    let mut model = Model::new(vec![mult; n]).parameter("J", 2.0);
    for i in 0 .. n {
        model = model.exchange(i, (i + 1) % n, "J");
    }
    model
}

fn reduce(model: &Model, steps: Vec<Step>) -> (Optimizer, Space) {
    let list = OptimizationList::new(BasisKind::Lexicographic, steps).unwrap();
    let optimizer = Optimizer::new(model.mults.clone(), list, None, Toler::default())
        .unwrap();
    let space = optimizer.run().unwrap();
    (optimizer, space)
}

fn sorted_energies(results: &Results) -> Vec<f64> {
    let mut energies: Vec<f64> = results.spectrum(Quantity::Energy).unwrap().blocks.iter()
        .flat_map(|b| {
            let d = b.degeneracy;
            b.values.iter().flat_map(move |&e| std::iter::repeat(e).take(d))
        })
        .collect();
    energies.sort_by(|x, y| x.partial_cmp(y).unwrap());
    energies
}

#[test]
fn test_krylov_ground_state() {
    let model = ring(8, 2);
    let (optimizer, space) = reduce(&model, vec![Step::TzSort]);
    let basis = optimizer.basis();

    let mut exact = EigendecompositorBuilder::new().build(Arc::new(NalgebraBackend));
    let request = model.request(basis, &[], &[], false).unwrap();
    let reference = sorted_energies(eigendecompose(&mut *exact, &space, request).unwrap());

    let conf = KrylovConf { threshold: 30, steps: 40, seed: 7 };
    let mut chain = EigendecompositorBuilder::new()
        .krylov(Some(conf))
        .build(Arc::new(NalgebraBackend));
    let request = model.request(basis, &[Quantity::GSzSquared], &[], false).unwrap();
    let results = eigendecompose(&mut *chain, &space, request).unwrap();
    let energy = results.spectrum(Quantity::Energy).unwrap();
    let toler = Toler { relerr: 1e-7, abserr: 1e-7 };
    let mut total = 0.0;
    let mut ground = f64::INFINITY;
    for (block, sub) in space.blocks.iter().zip(&energy.blocks) {
        let weight: f64 = sub.weights.iter().sum();
        toler_assert_eq!(toler, weight, block.size() as f64);
        total += weight * sub.degeneracy as f64;
        ground = ground.min(sub.values[0]);
    }
    toler_assert_eq!(toler, total, 256.0);
    toler_assert_eq!(toler, ground, reference[0]);
    // observables are evaluated on the Ritz vectors as well
    let g = results.spectrum(Quantity::GSzSquared).unwrap();
    for (e, x) in energy.blocks.iter().zip(&g.blocks) {
        assert_eq!(e.values.len(), x.values.len());
    }
}

#[test]
fn test_single_parameter_rescaling() {
    let model = ring(4, 3);
    let (optimizer, space) = reduce(&model, vec![Step::TzSort]);
    let basis = optimizer.basis();
    let mut chain = EigendecompositorBuilder::new()
        .single_parameter(true)
        .build(Arc::new(NalgebraBackend));
    let derivatives = vec!["J".to_owned()];
    let request = model.request(basis, &[Quantity::SSquared], &derivatives, false).unwrap();
    let first = sorted_energies(eigendecompose(&mut *chain, &space, request).unwrap());

    let rescaled_model = model.clone().parameter("J", 5.0);
    let request = rescaled_model.request(basis, &[Quantity::SSquared], &derivatives, false)
        .unwrap();
    let results = eigendecompose(&mut *chain, &space, request).unwrap();
    let rescaled = sorted_energies(results);

    let mut exact = EigendecompositorBuilder::new().build(Arc::new(NalgebraBackend));
    let request = rescaled_model.request(basis, &[], &[], false).unwrap();
    let reference = sorted_energies(eigendecompose(&mut *exact, &space, request).unwrap());

    let toler = Toler::default();
    for ((x, y), z) in first.iter().zip(&rescaled).zip(&reference) {
        toler_assert_eq!(toler, x * 2.5, *y);
        toler_assert_eq!(toler, *y, *z);
    }
    let energy = results.spectrum(Quantity::Energy).unwrap();
    let derivative = results.derivative(Quantity::Energy, "J").unwrap();
    for (e, d) in energy.blocks.iter().zip(&derivative.blocks) {
        for (x, y) in e.values.iter().zip(&d.values) {
            toler_assert_eq!(toler, x / 5.0, *y);
        }
    }
    assert!(results.spectrum(Quantity::SSquared).is_ok());
}

#[test]
fn test_hellmann_feynman() {
    let model = Model::new(vec![2, 2, 2])
        .exchange(0, 1, "J")
        .exchange(1, 2, "K")
        .parameter("J", 1.0)
        .parameter("K", 0.5);
    let (optimizer, space) = reduce(&model, vec![Step::TzSort]);
    let basis = optimizer.basis();
    let mut chain = EigendecompositorBuilder::new().build(Arc::new(NalgebraBackend));
    let derivatives = vec!["J".to_owned(), "K".to_owned()];
    let request = model.request(basis, &[], &derivatives, false).unwrap();
    let results = eigendecompose(&mut *chain, &space, request).unwrap();
    let energy = results.spectrum(Quantity::Energy).unwrap();
    let dj = results.derivative(Quantity::Energy, "J").unwrap();
    let dk = results.derivative(Quantity::Energy, "K").unwrap();
    // H = J ∂H/∂J + K ∂H/∂K
    for ((e, a), b) in energy.blocks.iter().zip(&dj.blocks).zip(&dk.blocks) {
        for i in 0 .. e.values.len() {
            toler_assert_eq!(Toler::default(), e.values[i],
                             1.0 * a.values[i] + 0.5 * b.values[i]);
        }
    }
    match results.derivative(Quantity::Energy, "L") {
        Err(Error::MissingQuantity(_)) => {}
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

fn initialize_error(chain: &mut dyn Eigendecompositor, model: &Model,
                    quantities: &[Quantity], derivatives: &[String]) -> Error {
    let (optimizer, space) = reduce(model, vec![Step::TzSort]);
    let request = model.request(optimizer.basis(), quantities, derivatives, false).unwrap();
    match eigendecompose(chain, &space, request) {
        Err(err) => err,
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn test_chain_errors() {
    let two = Model::new(vec![2, 2, 2])
        .exchange(0, 1, "J")
        .exchange(1, 2, "K")
        .parameter("J", 1.0)
        .parameter("K", 0.5);
    let mut chain = EigendecompositorBuilder::new()
        .single_parameter(true)
        .build(Arc::new(NalgebraBackend));
    match initialize_error(&mut *chain, &two, &[], &[]) {
        Error::TooManyParameters(_) => {}
        err => panic!("unexpected {}", err),
    }

    let zero = ring(3, 2).parameter("J", 0.0);
    match initialize_error(&mut *chain, &zero, &[], &[]) {
        Error::TooManyParameters(_) => {}
        err => panic!("unexpected {}", err),
    }

    let one = ring(3, 2).parameter("K", 1.0);
    match initialize_error(&mut *chain, &one, &[], &["K".to_owned()]) {
        Error::TooManyParameters(_) => {}
        err => panic!("unexpected {}", err),
    }

    // S² would be taken from blocks that do not know their total spin
    let mut chain = EigendecompositorBuilder::new()
        .implicit_total_spin(true)
        .build(Arc::new(NalgebraBackend));
    let model = ring(3, 2);
    let (optimizer, space) = reduce(&model, vec![Step::TzSort]);
    let mut request = model.request(optimizer.basis(), &[], &[], true).unwrap();
    request.operators.insert(Quantity::SSquared,
                             model.s_squared(optimizer.basis()).unwrap());
    match eigendecompose(&mut *chain, &space, request) {
        Err(Error::ExplicitTotalSpin) => {}
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
    let request = model.request(optimizer.basis(), &[], &[], true).unwrap();
    match eigendecompose(&mut *chain, &space, request) {
        Err(Error::MissingMetadata(_)) => {}
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_keep_matrices() {
    let model = ring(4, 2);
    let (optimizer, space) = reduce(&model, vec![Step::TzSort, Step::S2Transform]);
    let mut chain = EigendecompositorBuilder::new().build(Arc::new(NalgebraBackend));
    let mut request = model.request(optimizer.basis(), &[Quantity::SSquared], &[], false)
        .unwrap();
    request.keep_matrices = true;
    let results = eigendecompose(&mut *chain, &space, request).unwrap();
    let s2 = results.spectrum(Quantity::SSquared).unwrap();
    for (block, sub) in space.blocks.iter().zip(&s2.blocks) {
        let mult = block.properties.total_mult.unwrap() as f64;
        let expected = (mult * mult - 1.0) / 4.0;
        let m = sub.matrix.as_ref().unwrap();
        for i in 0 .. m.nrows() {
            for j in 0 .. m.ncols() {
                let x = if i == j { expected } else { 0.0 };
                toler_assert_eq!(Toler::default(), m[(i, j)], x);
            }
        }
    }
}

#[test]
fn test_krylov_with_implicit_total_spin() {
    let model = ring(10, 2);
    let (optimizer, space) = reduce(&model, vec![Step::TzSort]);
    let mut exact = EigendecompositorBuilder::new().build(Arc::new(NalgebraBackend));
    let request = model.request(optimizer.basis(), &[], &[], false).unwrap();
    let reference = sorted_energies(eigendecompose(&mut *exact, &space, request).unwrap());

    let (optimizer, space) = reduce(&model, vec![Step::TzSort, Step::S2Transform]);
    assert!(space.max_block_size() > 30);
    let conf = KrylovConf { threshold: 30, steps: 40, seed: 11 };
    let mut chain = EigendecompositorBuilder::new()
        .krylov(Some(conf))
        .implicit_total_spin(true)
        .build(Arc::new(NalgebraBackend));
    let request = model.request(optimizer.basis(), &[Quantity::SSquared], &[], true).unwrap();
    assert!(!request.operators.contains_key(&Quantity::SSquared));
    let results = eigendecompose(&mut *chain, &space, request).unwrap();
    let energy = results.spectrum(Quantity::Energy).unwrap();
    let s2 = results.spectrum(Quantity::SSquared).unwrap();
    let toler = Toler { relerr: 1e-7, abserr: 1e-7 };
    let mut total = 0.0;
    let mut ground = f64::INFINITY;
    for ((block, e), s) in space.blocks.iter().zip(&energy.blocks).zip(&s2.blocks) {
        let mult = block.properties.total_mult.unwrap() as f64;
        assert_eq!(e.values.len(), s.values.len());
        assert_eq!(e.weights, s.weights);
        for &x in &s.values {
            toler_assert_eq!(toler, x, (mult * mult - 1.0) / 4.0);
        }
        if block.size() > 40 {
            // at most one Ritz value per Lanczos step
            assert!(e.values.len() <= 40);
        }
        let weight: f64 = e.weights.iter().sum();
        toler_assert_eq!(toler, weight, block.size() as f64);
        total += weight * e.degeneracy as f64;
        ground = ground.min(e.values[0]);
    }
    toler_assert_eq!(toler, total, 1024.0);
    toler_assert_eq!(toler, ground, reference[0]);
    assert_eq!(results.block_properties().len(), space.len());
    for (p, block) in results.block_properties().iter().zip(&space.blocks) {
        assert_eq!(*p, block.properties);
    }
}
