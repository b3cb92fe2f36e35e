//! Runs the `mpi-print` binary the way a user would.
//!
//! These tests need an MPI launcher on `PATH` (or named by `$MPIEXEC`) and are ignored by
//! default; `ci/run-tests.sh` runs them with `--ignored`.
use std::env;
use std::process::{Command, Output};

use conv::ConvUtil;
use mpi_print::{GroupReport, Placement, Rank};

const BIN: &str = env!("CARGO_BIN_EXE_mpi-print");

fn launcher() -> Command {
    let mut cmd = Command::new(env::var("MPIEXEC").unwrap_or_else(|_| String::from("mpiexec")));
    // Open MPI refuses to run as root or to oversubscribe small CI machines unless told to.
    cmd.env("OMPI_ALLOW_RUN_AS_ROOT", "1")
        .env("OMPI_ALLOW_RUN_AS_ROOT_CONFIRM", "1")
        .env("OMPI_MCA_rmaps_base_oversubscribe", "1");
    cmd
}

fn run_group(n: usize, extra_args: &[&str]) -> Output {
    launcher()
        .arg("-n")
        .arg(n.to_string())
        .arg(BIN)
        .args(extra_args)
        .output()
        .expect("could not start the MPI launcher")
}

fn stdout(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).expect("output is not UTF-8")
}

#[test]
#[ignore = "needs an MPI runtime"]
fn singleton_without_launcher() {
    let output = Command::new(BIN).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "0/1\n");
}

#[test]
#[ignore = "needs an MPI launcher"]
fn group_of_one() {
    let output = run_group(1, &[]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "0/1\n");
}

#[test]
#[ignore = "needs an MPI launcher"]
fn group_of_four() {
    let output = run_group(4, &[]);
    assert!(output.status.success(), "{:?}", output);

    let report = GroupReport::from_output(stdout(&output)).unwrap();
    assert_eq!(report.size(), 4);
    assert_eq!(stdout(&output).lines().count(), 4);
    for (i, placement) in report.placements().iter().enumerate() {
        let rank: Rank = i.value_as().unwrap();
        assert_eq!(*placement, Placement::new(rank, 4).unwrap());
    }
}

#[test]
#[ignore = "needs an MPI launcher"]
fn every_group_size_reports_completely() {
    for n in 1..=3 {
        let output = run_group(n, &[]);
        assert!(output.status.success(), "{:?}", output);
        let report = GroupReport::from_output(stdout(&output)).unwrap();
        assert_eq!(report.size().value_as::<usize>().unwrap(), n);
    }
}

#[test]
#[ignore = "needs an MPI launcher"]
fn launch_arguments_are_ignored() {
    let output = run_group(2, &["--not-a-flag", "value with spaces"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(GroupReport::from_output(stdout(&output)).unwrap().size(), 2);
}

#[test]
#[ignore = "needs an MPI runtime"]
fn diagnostics_stay_off_stdout() {
    let output = Command::new(BIN).env("RUST_LOG", "debug").output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "0/1\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("joined as rank 0 of 1"), "{}", stderr);
    assert!(stderr.contains("[DEBUG 0/1 mpi_print]"), "{}", stderr);
}
