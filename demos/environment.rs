use mpi_print::environment;
use mpi_print::traits::*;
use mpi_print::Threading;

fn main() -> mpi_print::Result<()> {
    mpi_print::logging::init();

    let (version, subversion) = environment::version();
    let library = environment::library_version()?;

    let (universe, threading) = mpi_print::initialize_with_threading(Threading::Funneled)?;
    let joined = environment::time();
    let world = universe.world();
    let placement = world.placement()?;
    mpi_print::logging::set_placement(placement);

    println!(
        "{} on {}: MPI-{}.{}, thread support {:?}, timer resolution {:e}s",
        placement,
        universe.processor_name()?,
        version,
        subversion,
        threading,
        environment::time_resolution(),
    );
    if placement.rank() == 0 {
        println!("{}", library.trim_end());
        println!("built against MPI version {}", mpi_print::ffi::PROBED_MPI_VERSION);
    }

    assert!(
        version >= 3,
        "the bootstrap layer requires MPI standard 3.0 and up"
    );
    assert_eq!(universe.threading_support()?, threading);
    let elapsed = environment::time() - joined;
    assert!(elapsed >= 0.0);
    println!("{} spent {:.6}s as a member", placement, elapsed);
    universe.finalize()
}
