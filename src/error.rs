//! Errors shared by the whole pipeline.
use std::io;

quick_error! {
    /// Error type for basis construction and eigendecomposition.
    ///
    /// Everything here is raised before (or instead of) producing a result;
    /// nothing is retried.
    #[derive(Debug)]
    pub enum Error {
        /// Generators do not describe the declared group.
        InvalidGroup(msg: String) {
            display("invalid group: {}", msg)
        }
        /// A group maps a center onto a center of different multiplicity.
        CenterMultiplicityMismatch(from: usize, to: usize) {
            display("group maps center {} onto center {} of different multiplicity",
                    from, to)
        }
        /// The optimization sequence cannot be executed in this order.
        IllegalOptimization(msg: String) {
            display("illegal optimization sequence: {}", msg)
        }
        /// Coupled-basis permutations are only defined for involutions.
        NonAbelianInCoupledBasis {
            display("coupled basis supports only groups with generators of order <= 2")
        }
        /// A group element does not map coupling instructions onto each
        /// other.
        IncompatibleOrderOfSummation {
            display("group is incompatible with the order of summation")
        }
        /// Centers must exist and have positive multiplicities.
        InvalidMultiplicities(mults: Vec<u32>) {
            display("invalid multiplicities: {:?}", mults)
        }
        InvalidOrderOfSummation(msg: String) {
            display("invalid order of summation: {}", msg)
        }
        /// Matrix and transformation shapes disagree.
        DimensionMismatch(expected: usize, found: usize) {
            display("dimension mismatch: expected {}, found {}", expected, found)
        }
        /// Exactly one eigendecomposition layer must handle each block.
        BlockOwnership(block: usize, owners: usize) {
            display("block {} was constructed by {} layers", block, owners)
        }
        TooManyParameters(msg: String) {
            display("single-parameter Hamiltonian: {}", msg)
        }
        /// The total spin is already known from the block structure.
        ExplicitTotalSpin {
            display("explicit total-spin operator given to the implicit decorator")
        }
        /// A pass or layer needs block metadata that is absent.
        MissingMetadata(what: &'static str) {
            display("block metadata missing: {}", what)
        }
        MissingQuantity(what: String) {
            display("quantity not available: {}", what)
        }
        /// Only ranks 0, 1 and 2 are implemented for 9j symbols.
        UnsupportedRank(ranks: [i32; 3]) {
            display("unsupported 9j ranks (doubled): {:?}", ranks)
        }
        Conf(msg: String) {
            display("configuration error: {}", msg)
        }
        Io(err: io::Error) {
            from()
            display("{}", err)
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Conf(err.to_string())
    }
}
