//! Raw bindings to the parts of the MPI C API that `mpi-print` uses
//!
//! Generated by `bindgen` at build time from `src/shim.h`. Handle constants that `mpi.h` only
//! exposes as macros are re-exported by the shim under an `MPIP_` prefix, e.g. `MPIP_COMM_WORLD`.
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(missing_copy_implementations)]
#![allow(clippy::all)]
include!(concat!(env!("OUT_DIR"), "/functions_and_types.rs"));

/// Version of the MPI installation found at build time, `"unknown"` when it was found through
/// the compiler wrapper
pub const PROBED_MPI_VERSION: &str = env!("MPI_PRINT_PROBED_VERSION");
