use std::{env, path::PathBuf};

use crate::{env_var, Library, ProbeErrors};

fn intel_mpi(root: &str) -> Library {
    let root = PathBuf::from(root);
    let release = root.join("lib").join("release");
    let lib_path = if release.exists() {
        release
    } else {
        root.join("lib")
    };

    Library {
        mpicc: None,
        libs: vec!["impi".to_owned()],
        lib_paths: vec![lib_path],
        include_paths: vec![root.join("include")],
        version: String::from("Intel MPI"),
        _priv: (),
    }
}

/// Probe the environment for Intel MPI or MS-MPI
pub fn probe() -> Result<Library, ProbeErrors> {
    let mut errs: ProbeErrors = vec![];

    match env_var("I_MPI_ROOT") {
        Ok(root) => return Ok(intel_mpi(&root)),
        Err(err) => errs.push(err),
    }

    let lib_var = match env::var("CARGO_CFG_TARGET_ARCH").as_deref() {
        Ok("x86") => "MSMPI_LIB32",
        Ok("x86_64") => "MSMPI_LIB64",
        other => {
            errs.push(format!("MS-MPI does not support target architecture {:?}", other).into());
            return Err(errs);
        }
    };

    match (env_var("MSMPI_INC"), env_var(lib_var)) {
        (Ok(include_path), Ok(lib_path)) => Ok(Library {
            mpicc: None,
            libs: vec!["msmpi".to_owned()],
            lib_paths: vec![PathBuf::from(lib_path)],
            include_paths: vec![PathBuf::from(include_path)],
            version: String::from("MS-MPI"),
            _priv: (),
        }),
        (include, lib) => {
            errs.extend(include.err());
            errs.extend(lib.err());
            Err(errs)
        }
    }
}
