//! Symmetry-reduced exact diagonalization of spin clusters.
//!
//! A basis of per-center spin projections is split into blocks by
//! conserved quantities (total projection, permutation symmetry, total
//! spin) and every block is diagonalized on its own.
extern crate conv;
extern crate fnv;
#[macro_use]
extern crate log;
extern crate nalgebra;
extern crate num;
#[macro_use]
extern crate quick_error;
extern crate rand;
extern crate rand_xorshift;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate wigner_symbols;

#[macro_use]
mod macros;

pub mod ang_mom;
pub mod conf;
pub mod eigendecompositor;
pub mod error;
pub mod group;
pub mod half;
pub mod index_converter;
pub mod ito;
pub mod linalg;
pub mod model;
pub mod operator;
pub mod optimization;
pub mod space;
pub mod utils;
