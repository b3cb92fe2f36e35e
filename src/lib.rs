#![deny(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]
#![warn(unused_qualifications)]

//! The MPI bootstrap sequence, and nothing more
//!
//! Every MPI program starts the same way: it joins the group of processes the launcher started,
//! finds out its rank and the size of the group, and eventually leaves the group again. This
//! crate binds exactly that part of the [Message Passing Interface][MPI] and ships the
//! `mpi-print` binary, which prints one `<rank>/<size>` line per process.
//!
//! [MPI]: http://www.mpi-forum.org
//!
//! # Usage
//!
//! ```no_run
//! use mpi_print::traits::*;
//!
//! fn main() -> mpi_print::Result<()> {
//!     let universe = mpi_print::initialize()?;
//!     let world = universe.world();
//!     println!("{}/{}", world.rank(), world.size());
//!     universe.finalize()
//! }
//! ```
//!
//! Run it under a launcher, e.g. `mpiexec -n 4 target/debug/mpi-print`.
//!
//! # Scope
//!
//! - **8.7**: initialization (with thread support levels) and finalization
//! - **6.4.1**: rank and size of `MPI_COMM_WORLD`, `MPI_Abort`
//! - **8.1, 8.6**: version, library version, processor name, timers
//!
//! Point-to-point and collective communication, derived communicators and datatypes are out of
//! scope.

/// The raw C language MPI API
///
/// Documented in the [Message Passing Interface specification][spec]
///
/// [spec]: http://www.mpi-forum.org/docs/docs.html
pub use mpi_print_sys as ffi;

pub mod environment;
pub mod error;
pub mod logging;
pub mod placement;
pub mod topology;

/// Traits that need to be in scope to query communicators
pub mod traits {
    pub use crate::topology::{AsRaw, Communicator};
}

pub use crate::environment::{initialize, initialize_with_threading, Threading, Universe};
pub use crate::error::{Error, Result};
pub use crate::placement::{GroupReport, Placement, ReportError};
pub use crate::topology::{Rank, SystemCommunicator};
