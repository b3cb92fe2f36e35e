use std::{env, error::Error, path::PathBuf, process::Command};

use pkg_config::Config;

use crate::{env_var, CompilerFlags, Library, ProbeErrors};

fn pkg_config(name: &str) -> Result<Library, pkg_config::Error> {
    let found = Config::new().cargo_metadata(false).probe(name)?;
    Ok(Library {
        mpicc: None,
        libs: found.libs,
        lib_paths: found.link_paths,
        include_paths: found.include_paths,
        version: found.version,
        _priv: (),
    })
}

fn probe_via_mpicc(mpicc: &str) -> Result<Library, Box<dyn Error>> {
    // `-show` prints the command line the wrapper would hand to the real compiler.
    let output = Command::new(mpicc).arg("-show").output()?;
    if !output.status.success() {
        return Err(format!("`{} -show` exited with {}", mpicc, output.status).into());
    }
    let cmd = String::from_utf8(output.stdout)?;
    let flags = CompilerFlags::parse(&cmd)?;
    Ok(Library::from_flags(mpicc, flags))
}

/// Probe the environment for an MPI installation
pub fn probe() -> Result<Library, ProbeErrors> {
    let mut errs: ProbeErrors = vec![];

    match env_var("MPI_PKG_CONFIG") {
        Ok(name) => {
            return pkg_config(&name).map_err(|err| {
                errs.push(
                    format!(
                        "$MPI_PKG_CONFIG is set to `{}`, but pkg-config cannot use it ({}). \
                         Point it at an MPI `.pc` file or unset it to try the other methods.",
                        name, err
                    )
                    .into(),
                );
                errs
            });
        }
        Err(err) => errs.push(err),
    }

    match env_var("CRAY_MPICH_DIR") {
        Ok(dir) => {
            let pc: PathBuf = [dir.as_str(), "lib", "pkgconfig", "mpich.pc"].iter().collect();
            match pkg_config(&pc.to_string_lossy()) {
                Ok(lib) => return Ok(lib),
                Err(err) => errs.push(Box::new(err)),
            }
        }
        Err(err) => errs.push(err),
    }

    let mpicc = env::var("MPICC").unwrap_or_else(|_| String::from("mpicc"));
    match probe_via_mpicc(&mpicc) {
        Ok(lib) => return Ok(lib),
        Err(err) => errs.push(format!("`{}` could not be queried: {}", mpicc, err).into()),
    }

    for name in ["mpich", "ompi"] {
        match pkg_config(name) {
            Ok(lib) => return Ok(lib),
            Err(_) => errs.push(
                format!(
                    "pkg-config has no `{}` package; add the directory holding `{}.pc` to \
                     $PKG_CONFIG_PATH to use it",
                    name, name
                )
                .into(),
            ),
        }
    }

    Err(errs)
}
