//! The world communicator and what a process can ask it
//!
//! All processes started together by the launcher form the 'world communicator'. Each process
//! is addressed by its `Rank` within it.
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::process;

use crate::environment::Universe;
use crate::error::{success, Result};
use crate::ffi;
use crate::ffi::MPI_Comm;
use crate::placement::Placement;

/// Identifies a certain process within a communicator.
pub type Rank = c_int;

/// A rust type that can identify as a raw value understood by the MPI C API.
///
/// # Safety
/// `as_raw` must return a live handle of the MPI type `Raw`.
pub unsafe trait AsRaw {
    /// The raw MPI C API type
    type Raw;
    /// The raw value
    fn as_raw(&self) -> Self::Raw;
}

/// A built-in communicator, here `MPI_COMM_WORLD`
///
/// Borrows the [`Universe`], which keeps every query on it between joining and leaving the
/// group.
///
/// # Standard section(s)
///
/// 6.4
#[derive(Copy, Clone)]
pub struct SystemCommunicator<'u> {
    raw: MPI_Comm,
    _universe: PhantomData<&'u Universe>,
}

impl<'u> SystemCommunicator<'u> {
    pub(crate) fn world(_universe: &'u Universe) -> SystemCommunicator<'u> {
        SystemCommunicator {
            raw: unsafe { ffi::MPIP_COMM_WORLD },
            _universe: PhantomData,
        }
    }
}

unsafe impl AsRaw for SystemCommunicator<'_> {
    type Raw = MPI_Comm;
    fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

impl Communicator for SystemCommunicator<'_> {}

/// Communicators are contexts for communication
///
/// The default MPI error handler aborts the job when a query fails, so the queries here do not
/// return errors of their own.
pub trait Communicator: AsRaw<Raw = MPI_Comm> {
    /// Number of processes in this communicator
    ///
    /// # Standard section(s)
    ///
    /// 6.4.1
    fn size(&self) -> Rank {
        let mut res: Rank = 0;
        let code = unsafe { ffi::MPI_Comm_size(self.as_raw(), &mut res) };
        debug_assert_eq!(code, success());
        res
    }

    /// The `Rank` that identifies the calling process within this communicator
    ///
    /// # Standard section(s)
    ///
    /// 6.4.1
    fn rank(&self) -> Rank {
        let mut res: Rank = 0;
        let code = unsafe { ffi::MPI_Comm_rank(self.as_raw(), &mut res) };
        debug_assert_eq!(code, success());
        res
    }

    /// Where the calling process sits in this communicator: its rank and the group size
    fn placement(&self) -> Result<Placement> {
        Placement::new(self.rank(), self.size())
    }

    /// Abort program execution
    ///
    /// Takes down every process of the communicator with `errorcode` as exit status, as far as
    /// the runtime supports that.
    ///
    /// # Standard section(s)
    ///
    /// 8.7
    fn abort(&self, errorcode: c_int) -> ! {
        unsafe {
            ffi::MPI_Abort(self.as_raw(), errorcode);
        }
        process::abort();
    }
}
