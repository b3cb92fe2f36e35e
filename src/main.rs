//! Join the MPI group, print `<rank>/<size>`, leave.
use std::io;
use std::process::ExitCode;

use log::{debug, error};
use mpi_print::logging;
use mpi_print::traits::*;

fn main() -> ExitCode {
    logging::init();

    let universe = match mpi_print::initialize() {
        Ok(universe) => universe,
        Err(err) => {
            error!("could not join the MPI group: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let world = universe.world();

    let placement = match world.placement() {
        Ok(placement) => placement,
        Err(err) => {
            error!("runtime reported an impossible placement: {}", err);
            world.abort(1);
        }
    };
    logging::set_placement(placement);
    debug!("joined as rank {} of {}", placement.rank(), placement.size());

    // Flushed before the group is left.
    if let Err(err) = placement.write_line(io::stdout().lock()) {
        error!("could not write to standard output: {}", err);
        world.abort(1);
    }

    match universe.finalize() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("could not leave the MPI group: {}", err);
            ExitCode::FAILURE
        }
    }
}
