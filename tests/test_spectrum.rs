//! The spectrum must not depend on how the basis was reduced.
#[macro_use]
extern crate spinred;

use std::sync::Arc;
use spinred::eigendecompositor::{eigendecompose, EigendecompositorBuilder, Quantity, Results};
use spinred::group::{Group, GroupType, Permutation};
use spinred::group::algebra::GroupRegistry;
use spinred::index_converter::BasisKind::{self, Coupled, Lexicographic};
use spinred::linalg::NalgebraBackend;
use spinred::model::Model;
use spinred::optimization::{OptimizationList, Optimizer, Step};
use spinred::optimization::Step::*;
use spinred::utils::Toler;

/// `(energy, number of states, ∑ S²)` of every distinct level.
type Levels = Vec<(f64, usize, f64)>;

const SPLITTING: f64 = 1e-6;

fn levels(results: &Results) -> Levels {
    let energy = results.spectrum(Quantity::Energy).unwrap();
    let s2 = results.spectrum(Quantity::SSquared).unwrap();
    let mut states = Vec::new();
    for (eb, sb) in energy.blocks.iter().zip(&s2.blocks) {
        assert_eq!(eb.values.len(), sb.values.len());
        for (&e, &s) in eb.values.iter().zip(&sb.values) {
            states.push((e, eb.degeneracy, s));
        }
    }
    states.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());
    let mut levels: Levels = Vec::new();
    for (e, n, s) in states {
        match levels.last_mut() {
            Some(level) if e - level.0 < SPLITTING => {
                level.1 += n;
                level.2 += n as f64 * s;
            }
            _ => levels.push((e, n, n as f64 * s)),
        }
    }
    levels
}

fn solve(model: &Model, basis: BasisKind, steps: Vec<Step>, implicit: bool) -> Levels {
    let list = OptimizationList::new(basis, steps).unwrap();
    let optimizer = Optimizer::new(model.mults.clone(), list, None, Toler::default())
        .unwrap();
    let space = optimizer.run().unwrap();
    let request = model.request(optimizer.basis(), &[Quantity::SSquared], &[], implicit)
        .unwrap();
    let mut chain = EigendecompositorBuilder::new()
        .implicit_total_spin(implicit)
        .build(Arc::new(NalgebraBackend));
    let results = eigendecompose(&mut *chain, &space, request).unwrap();
    levels(results)
}

fn check(model: &Model, cases: Vec<(BasisKind, Vec<Step>, bool)>) {
    let reference = solve(model, Lexicographic, vec![], false);
    let toler = Toler { relerr: 1e-8, abserr: 1e-8 };
    for (basis, steps, implicit) in cases {
        let names: Vec<_> = steps.iter().map(|s| s.name()).collect();
        let found = solve(model, basis, steps, implicit);
        assert_eq!(found.len(), reference.len(), "{:?} {:?}", basis, names);
        for (x, y) in found.iter().zip(&reference) {
            toler_assert_eq!(toler, x.0, y.0);
            assert_eq!(x.1, y.1, "{:?} {:?} at {}", basis, names, y.0);
            toler_assert_eq!(toler, x.2, y.2);
        }
    }
}

fn group(registry: &GroupRegistry, group_type: GroupType,
         generators: Vec<Permutation>) -> Group {
    Group::new(registry, group_type, generators).unwrap()
}

#[test]
fn test_rectangle() {
    // 0 - 1
    // |   |
    // 3 - 2
    let model = Model::new(vec![3, 3, 3, 3])
        .exchange(0, 1, "J1")
        .exchange(2, 3, "J1")
        .exchange(1, 2, "J2")
        .exchange(3, 0, "J2")
        .parameter("J1", 1.0)
        .parameter("J2", 0.37);
    let registry = GroupRegistry::new();
    let a = group(&registry, GroupType::S2, vec![vec![1, 0, 3, 2]]);
    let b = group(&registry, GroupType::S2, vec![vec![3, 2, 1, 0]]);
    check(&model, vec![
        (Lexicographic, vec![TzSort], false),
        (Lexicographic, vec![TzSort, Symmetrize(a.clone()), Symmetrize(b.clone()),
                             EliminatePositiveProjections], false),
        (Lexicographic, vec![Symmetrize(b.clone()), TzSort, Symmetrize(a.clone()),
                             S2Transform, EliminateNonMinimalProjections], false),
        (Coupled, vec![TzSort, Symmetrize(a.clone()), Symmetrize(b.clone()),
                       TSquaredSort, EliminateNonMinimalProjections], true),
        (Coupled, vec![TzSort, TSquaredSort], false),
    ]);
}

#[test]
fn test_triangle() {
    let model = Model::new(vec![3, 3, 3])
        .exchange(0, 1, "J")
        .exchange(1, 2, "J")
        .exchange(2, 0, "J")
        .parameter("J", 1.0);
    let registry = GroupRegistry::new();
    let d3 = group(&registry, GroupType::Dihedral(3), vec![vec![1, 2, 0], vec![0, 2, 1]]);
    check(&model, vec![
        (Lexicographic, vec![TzSort, Symmetrize(d3.clone())], false),
        (Lexicographic, vec![TzSort, Symmetrize(d3.clone()), EliminatePositiveProjections,
                             NonAbelianSimplify], false),
        (Lexicographic, vec![TzSort, Symmetrize(d3.clone()), NonAbelianSimplify,
                             S2Transform, EliminateNonMinimalProjections], false),
        (Coupled, vec![TzSort, TSquaredSort, EliminateNonMinimalProjections], true),
    ]);
}

#[test]
fn test_hexagon() {
    let model = Model::new(vec![2; 6])
        .exchange(0, 1, "J")
        .exchange(1, 2, "J")
        .exchange(2, 3, "J")
        .exchange(3, 4, "J")
        .exchange(4, 5, "J")
        .exchange(5, 0, "J")
        .parameter("J", 1.0);
    let registry = GroupRegistry::new();
    let d6 = group(&registry, GroupType::Dihedral(6),
                   vec![vec![1, 2, 3, 4, 5, 0], vec![0, 5, 4, 3, 2, 1]]);
    check(&model, vec![
        (Lexicographic, vec![Symmetrize(d6.clone()), TzSort], false),
        (Lexicographic, vec![TzSort, Symmetrize(d6.clone()), EliminatePositiveProjections,
                             NonAbelianSimplify], false),
        (Lexicographic, vec![TzSort, Symmetrize(d6.clone()), S2Transform,
                             EliminateNonMinimalProjections], false),
    ]);
}

fn shift(x: usize) -> usize {
    (x + 1) % 3
}

fn mirror(x: usize) -> usize {
    (3 - x) % 3
}

fn on_rows(f: fn(usize) -> usize) -> Permutation {
    (0 .. 9).map(|i| 3 * f(i / 3) + i % 3).collect()
}

fn on_cols(f: fn(usize) -> usize) -> Permutation {
    (0 .. 9).map(|i| 3 * (i / 3) + f(i % 3)).collect()
}

/// 3 × 3 square lattice with periodic boundaries; center 3 r + c.
fn torus() -> Model {
    let mut model = Model::new(vec![2; 9]).parameter("J", 1.0);
    for r in 0 .. 3 {
        for c in 0 .. 3 {
            model = model
                .exchange(3 * r + c, 3 * r + (c + 1) % 3, "J")
                .exchange(3 * r + c, 3 * ((r + 1) % 3) + c, "J");
        }
    }
    model
}

fn torus_groups(registry: &GroupRegistry) -> (Group, Group) {
    (group(registry, GroupType::Dihedral(3), vec![on_rows(shift), on_rows(mirror)]),
     group(registry, GroupType::Dihedral(3), vec![on_cols(shift), on_cols(mirror)]))
}

#[test]
fn test_torus() {
    let registry = GroupRegistry::new();
    let (d3_rows, d3_cols) = torus_groups(&registry);
    check(&torus(), vec![
        (Lexicographic, vec![TzSort, Symmetrize(d3_rows.clone()), Symmetrize(d3_cols.clone()),
                             EliminatePositiveProjections], false),
        (Lexicographic, vec![TzSort, Symmetrize(d3_cols.clone()), Symmetrize(d3_rows.clone()),
                             S2Transform, EliminateNonMinimalProjections], false),
    ]);
}

#[test]
fn test_torus_simplified() {
    let registry = GroupRegistry::new();
    let (a, b) = torus_groups(&registry);
    check(&torus(), vec![
        (Lexicographic, vec![TzSort, Symmetrize(a.clone()), Symmetrize(b.clone()),
                             NonAbelianSimplify, EliminatePositiveProjections], false),
        (Lexicographic, vec![Symmetrize(b.clone()), Symmetrize(a.clone()), NonAbelianSimplify,
                             TzSort, EliminatePositiveProjections], false),
        (Lexicographic, vec![TzSort, Symmetrize(a.clone()), Symmetrize(b.clone()),
                             NonAbelianSimplify, S2Transform,
                             EliminateNonMinimalProjections], false),
    ]);
}
