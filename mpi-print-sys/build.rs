use std::env;
use std::path::PathBuf;

/// MPI entry points the bootstrap layer calls. Everything else in `mpi.h` is left out.
const FUNCTIONS: &str = "MPI_(Init_thread|Initialized|Finalize|Finalized|Query_thread|\
                         Comm_rank|Comm_size|Abort|Get_version|Get_library_version|\
                         Get_processor_name|Error_class|Error_string)";

fn main() {
    for var in ["MPI_PKG_CONFIG", "CRAY_MPICH_DIR", "MPICC", "I_MPI_ROOT", "MSMPI_INC"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
    println!("cargo:rerun-if-changed=src/shim.c");
    println!("cargo:rerun-if-changed=src/shim.h");

    let lib = match mpi_print_probe::probe() {
        Ok(lib) => lib,
        Err(errs) => panic!("{}", mpi_print_probe::describe(&errs)),
    };

    // The shim turns handle macros such as `MPI_COMM_WORLD` into linkable constants.
    let mut shim = cc::Build::new();
    shim.file("src/shim.c");
    match &lib.mpicc {
        Some(mpicc) if cfg!(unix) => {
            shim.compiler(mpicc);
        }
        _ => {
            for dir in &lib.include_paths {
                shim.include(dir);
            }
        }
    }
    shim.compile("mpiprintshim");

    for dir in &lib.lib_paths {
        println!("cargo:rustc-link-search=native={}", dir.display());
    }
    for name in &lib.libs {
        println!("cargo:rustc-link-lib={}", name);
    }
    println!("cargo:rustc-env=MPI_PRINT_PROBED_VERSION={}", lib.version);

    let mut builder = bindgen::builder()
        .header("src/shim.h")
        .allowlist_function(FUNCTIONS)
        .allowlist_function("MPIP_.*")
        .allowlist_var("MPIP_.*")
        .allowlist_type("MPI_Comm")
        .blocklist_type("max_align_t")
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()));
    for dir in &lib.include_paths {
        builder = builder.clang_arg(format!("-I{}", dir.display()));
    }

    let bindings = builder
        .generate()
        .expect("bindgen could not process src/shim.h");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo did not set OUT_DIR"));
    bindings
        .write_to_file(out_dir.join("functions_and_types.rs"))
        .expect("could not write the generated bindings");
}
