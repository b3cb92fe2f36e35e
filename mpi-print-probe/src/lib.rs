#![deny(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]
#![warn(unused_qualifications)]

//! Locate the MPI library that `mpi-print` is built against
//!
//! On Unix the following sources are tried in order, and the first one that works wins:
//!
//! 1. `$MPI_PKG_CONFIG`, a `pkg-config` package name or path to a `.pc` file. When this variable
//!    is set but unusable, probing stops there instead of silently picking another MPI.
//! 2. `$CRAY_MPICH_DIR/lib/pkgconfig/mpich.pc`
//! 3. The compiler wrapper named by `$MPICC` (or `mpicc`), queried with `-show`.
//! 4. The `pkg-config` packages `mpich` and `ompi`.
//!
//! On Windows, Intel MPI is found through `$I_MPI_ROOT` and MS-MPI through `$MSMPI_INC` plus
//! `$MSMPI_LIB32` or `$MSMPI_LIB64`.
//!
//! When nothing is found, every source's failure is returned so the build log can say why.

use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

mod flags;
mod os;

pub use flags::CompilerFlags;

/// Failures of every probing step, in the order they were tried
pub type ProbeErrors = Vec<Box<dyn Error>>;

/// An MPI installation found on this machine
#[derive(Clone, Debug)]
pub struct Library {
    /// The compiler wrapper the installation was discovered through, if any
    pub mpicc: Option<String>,
    /// Names of the native MPI libraries that need to be linked
    pub libs: Vec<String>,
    /// Search path for native MPI libraries
    pub lib_paths: Vec<PathBuf>,
    /// Search path for C header files
    pub include_paths: Vec<PathBuf>,
    /// The version of the MPI library, `"unknown"` when the source does not say
    pub version: String,
    _priv: (),
}

impl Library {
    #[cfg_attr(windows, allow(dead_code))]
    fn from_flags(mpicc: &str, flags: CompilerFlags) -> Library {
        Library {
            mpicc: Some(mpicc.to_owned()),
            libs: flags.libs,
            lib_paths: flags.lib_paths,
            include_paths: flags.include_paths,
            version: String::from("unknown"),
            _priv: (),
        }
    }
}

/// Probe the environment for an installed MPI library
pub fn probe() -> Result<Library, ProbeErrors> {
    os::probe()
}

/// Read the environment variable `key`, naming it in the error
fn env_var(key: &str) -> Result<String, Box<dyn Error>> {
    std::env::var(key).map_err(|err| format!("${}: {}", key, err).into())
}

/// Render probing failures as a numbered list suitable for a build script panic message
pub fn describe(errs: &[Box<dyn Error>]) -> String {
    let mut out = String::from("Could not find an MPI library:\n");
    for (i, err) in errs.iter().enumerate() {
        // Writing into a `String` cannot fail.
        let _ = writeln!(out, "  {}. {}", i + 1, err);
    }
    out
}
