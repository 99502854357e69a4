use core::alloc::Layout;
use core::fmt;

/// The error returned when a bucket array cannot be (re)allocated.
///
/// Every operation that may allocate comes in two versions:
///
/// - A fallible `try_*` version, which returns this error and leaves the
///   table exactly as it was before the call.
/// - A convenience version, which invokes the `try_*` version and panics on
///   [`TryReserveError::CapacityOverflow`] or calls
///   [`handle_alloc_error`](alloc::alloc::handle_alloc_error) on
///   [`TryReserveError::AllocError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TryReserveError {
    /// The requested size in bytes or in buckets overflowed.
    CapacityOverflow,
    /// The allocator could not satisfy the request.
    AllocError {
        /// The layout of the allocation that failed.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes failed",
                layout.size()
            ),
        }
    }
}

impl core::error::Error for TryReserveError {}

impl TryReserveError {
    /// Turns the error into the behavior of the infallible API.
    #[cold]
    pub(crate) fn bail(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::AllocError { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}
