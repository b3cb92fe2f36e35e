//! Joining and leaving the MPI group, and asking the runtime about itself
//!
//! A process joins its group with [`initialize`] (or [`initialize_with_threading`]) and receives
//! the [`Universe`], which represents its membership. Communicators borrow the `Universe`, so the
//! membership cannot end while one is still in use. Dropping the `Universe`, or calling
//! [`Universe::finalize`], leaves the group.
//!
//! # Standard section(s)
//!
//! 8.1.1, 8.6, 8.7, 12.4.3
use std::cmp::Ordering;
use std::ffi::{CString, OsString};
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_double, c_int};
use std::ptr;

use conv::ConvUtil;
use log::{debug, warn};

use crate::error::{check, success, Error, Result};
use crate::ffi;
use crate::topology::SystemCommunicator;

/// This process's membership in the MPI group
///
/// Exactly one `Universe` can exist per process. It is not `Send`: MPI expects initialization
/// and finalization to happen on the same thread.
pub struct Universe {
    // MPI implementations may keep pointers into argv for the lifetime of the job.
    _args: LaunchArgs,
    finalized: bool,
    _not_send: PhantomData<*const ()>,
}

impl Universe {
    /// The 'world communicator'
    ///
    /// Contains all processes initially partaking in the computation.
    ///
    /// # Examples
    /// See `src/main.rs`
    pub fn world(&self) -> SystemCommunicator<'_> {
        SystemCommunicator::world(self)
    }

    /// Level of multithreading the runtime actually provides
    ///
    /// # Standard section(s)
    ///
    /// 12.4.3
    pub fn threading_support(&self) -> Result<Threading> {
        let mut raw: c_int = 0;
        check(unsafe { ffi::MPI_Query_thread(&mut raw) })?;
        Threading::from_raw(raw)
    }

    /// Names the processor that the calling process is running on.
    ///
    /// # Standard section(s)
    ///
    /// 8.1.1
    pub fn processor_name(&self) -> Result<String> {
        read_string(unsafe { ffi::MPIP_MAX_PROCESSOR_NAME }, |buf, len| unsafe {
            ffi::MPI_Get_processor_name(buf, len)
        })
    }

    /// Leave the group and report how that went.
    ///
    /// Dropping the `Universe` has the same effect but has to discard the return code.
    ///
    /// # Standard section(s)
    ///
    /// 8.7
    pub fn finalize(mut self) -> Result<()> {
        self.finalized = true;
        debug!("leaving the MPI group");
        check(unsafe { ffi::MPI_Finalize() })
    }
}

impl Drop for Universe {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        debug!("leaving the MPI group");
        let code = unsafe { ffi::MPI_Finalize() };
        if code != success() {
            warn!("MPI_Finalize failed: {}", Error::from_code(code));
        }
    }
}

impl fmt::Debug for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Universe")
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

/// Describes the various levels of multithreading that can be supported by an MPI library.
///
/// Levels are ordered from least to most permissive.
///
/// # Standard section(s)
///
/// 12.4.3
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Threading {
    /// All processes partaking in the computation are single-threaded.
    Single,
    /// Processes may be multi-threaded, but MPI functions will only ever be called from the main
    /// thread.
    Funneled,
    /// Processes may be multi-threaded, but calls to MPI functions will not be made concurrently.
    /// The user is responsible for serializing the calls.
    Serialized,
    /// Processes may be multi-threaded with no restrictions on the use of MPI functions from the
    /// threads.
    Multiple,
}

impl Threading {
    /// The raw value understood by the MPI C API
    fn as_raw(self) -> c_int {
        use self::Threading::*;
        unsafe {
            match self {
                Single => ffi::MPIP_THREAD_SINGLE,
                Funneled => ffi::MPIP_THREAD_FUNNELED,
                Serialized => ffi::MPIP_THREAD_SERIALIZED,
                Multiple => ffi::MPIP_THREAD_MULTIPLE,
            }
        }
    }

    fn from_raw(raw: c_int) -> Result<Threading> {
        use self::Threading::*;
        [Single, Funneled, Serialized, Multiple]
            .into_iter()
            .find(|level| level.as_raw() == raw)
            .ok_or(Error::UnknownThreading(raw))
    }
}

impl PartialOrd for Threading {
    fn partial_cmp(&self, other: &Threading) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Threading {
    fn cmp(&self, other: &Threading) -> Ordering {
        self.as_raw().cmp(&other.as_raw())
    }
}

/// The process's command line, laid out as the `argc`/`argv` pair `MPI_Init_thread` expects
struct LaunchArgs {
    strings: Vec<CString>,
    argv: Vec<*mut c_char>,
}

impl LaunchArgs {
    fn from_env() -> LaunchArgs {
        LaunchArgs::new(std::env::args_os())
    }

    fn new<I: IntoIterator<Item = OsString>>(args: I) -> LaunchArgs {
        // OS arguments cannot contain NUL, so nothing is dropped here in practice.
        let strings: Vec<CString> = args
            .into_iter()
            .filter_map(|arg| CString::new(os_bytes(arg)).ok())
            .collect();
        let argv = strings
            .iter()
            .map(|s| s.as_ptr() as *mut c_char)
            .chain(Some(ptr::null_mut()))
            .collect();
        LaunchArgs { strings, argv }
    }

    fn argc(&self) -> c_int {
        self.strings.len().value_as().unwrap_or(c_int::MAX)
    }
}

#[cfg(unix)]
fn os_bytes(arg: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    arg.into_vec()
}

#[cfg(not(unix))]
fn os_bytes(arg: OsString) -> Vec<u8> {
    arg.to_string_lossy().into_owned().into_bytes()
}

/// Whether the MPI library has been initialized
///
/// Can be called at any time.
pub fn is_initialized() -> bool {
    let mut flag: c_int = 0;
    unsafe {
        ffi::MPI_Initialized(&mut flag);
    }
    flag != 0
}

/// Whether the MPI library has been finalized
///
/// Can be called at any time.
pub fn is_finalized() -> bool {
    let mut flag: c_int = 0;
    unsafe {
        ffi::MPI_Finalized(&mut flag);
    }
    flag != 0
}

/// Join the MPI group.
///
/// Equivalent to `initialize_with_threading(Threading::Single)`, discarding the provided level.
///
/// # Examples
/// See `src/main.rs`
///
/// # Standard section(s)
///
/// 8.7
pub fn initialize() -> Result<Universe> {
    initialize_with_threading(Threading::Single).map(|(universe, _)| universe)
}

/// Join the MPI group, asking for a level of multithreading support.
///
/// The process's command line is handed to the runtime unexamined. Returns the `Universe` and
/// the level of multithreading the runtime actually provides, which may be lower than
/// `threading`.
///
/// Fails with [`Error::AlreadyInitialized`] or [`Error::AlreadyFinalized`] when called more than
/// once per process. Note that most runtimes abort the process on their own when the join
/// itself fails, so the [`Error::Mpi`] case is rarely observed.
///
/// # Standard section(s)
///
/// 12.4.3
pub fn initialize_with_threading(threading: Threading) -> Result<(Universe, Threading)> {
    if is_finalized() {
        return Err(Error::AlreadyFinalized);
    }
    if is_initialized() {
        return Err(Error::AlreadyInitialized);
    }

    let mut args = LaunchArgs::from_env();
    let mut argc = args.argc();
    let mut argv = args.argv.as_mut_ptr();
    let mut provided: c_int = 0;
    debug!("joining the MPI group with {} launch argument(s)", argc);
    check(unsafe { ffi::MPI_Init_thread(&mut argc, &mut argv, threading.as_raw(), &mut provided) })?;

    let universe = Universe {
        _args: args,
        finalized: false,
        _not_send: PhantomData,
    };
    let provided = Threading::from_raw(provided)?;
    if provided < threading {
        warn!(
            "requested thread support {:?}, runtime provides {:?}",
            threading, provided
        );
    }
    Ok((universe, provided))
}

/// Identifies the version of the MPI standard implemented by the library.
///
/// Returns a tuple of `(version, subversion)`, e.g. `(3, 1)`.
///
/// Can be called without initializing MPI.
pub fn version() -> (c_int, c_int) {
    let mut version: c_int = 0;
    let mut subversion: c_int = 0;
    unsafe {
        ffi::MPI_Get_version(&mut version, &mut subversion);
    }
    (version, subversion)
}

/// Describes the version of the MPI library itself.
///
/// Can be called without initializing MPI.
pub fn library_version() -> Result<String> {
    read_string(unsafe { ffi::MPIP_MAX_LIBRARY_VERSION_STRING }, |buf, len| unsafe {
        ffi::MPI_Get_library_version(buf, len)
    })
}

/// Time in seconds since an arbitrary time in the past.
///
/// The cheapest high-resolution timer available will be used.
pub fn time() -> c_double {
    unsafe { ffi::MPIP_Wtime() }
}

/// Resolution of timer used in `time()` in seconds
pub fn time_resolution() -> c_double {
    unsafe { ffi::MPIP_Wtick() }
}

/// Calls an MPI function that fills a caller-provided buffer of `capacity` bytes and reports the
/// length it wrote.
fn read_string<F>(capacity: c_int, fill: F) -> Result<String>
where
    F: FnOnce(*mut c_char, *mut c_int) -> c_int,
{
    let capacity: usize = capacity.value_as().unwrap_or(0);
    let mut buf = vec![0u8; capacity];
    let mut len: c_int = 0;
    check(fill(buf.as_mut_ptr() as *mut c_char, &mut len))?;
    buf.truncate(len.value_as::<usize>().unwrap_or(0));
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_args_are_null_terminated() {
        let args = LaunchArgs::new(vec![
            OsString::from("mpi-print"),
            OsString::from("--mca"),
            OsString::from("btl self"),
        ]);
        assert_eq!(args.argc(), 3);
        assert_eq!(args.argv.len(), 4);
        assert!(args.argv[3].is_null());
        assert_eq!(args.strings[2].to_str().unwrap(), "btl self");
        assert_eq!(args.argv[0].cast_const(), args.strings[0].as_ptr());
    }

    #[test]
    fn empty_launch_args() {
        let args = LaunchArgs::new(Vec::new());
        assert_eq!(args.argc(), 0);
        assert_eq!(args.argv, vec![ptr::null_mut()]);
    }

    #[test]
    fn threading_levels_are_ordered() {
        assert!(Threading::Single < Threading::Funneled);
        assert!(Threading::Funneled < Threading::Serialized);
        assert!(Threading::Serialized < Threading::Multiple);
        assert_eq!(
            Threading::from_raw(Threading::Serialized.as_raw()).unwrap(),
            Threading::Serialized
        );
    }

    #[test]
    fn version_is_available_before_initialization() {
        let (version, _) = version();
        assert!(version >= 3, "bootstrap requires MPI 3.0 or newer");
    }
}
