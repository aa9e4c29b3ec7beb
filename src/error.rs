//! vsfs - Error taxonomy
//!
//! A single sum type replaces the legacy `-1` sentinel used throughout the
//! original C API. `Error<E>` is generic over the underlying block device's
//! error type so a filesystem mounted on any `BlockDevice` can surface a
//! device failure without this crate committing to a concrete I/O error.

use core::fmt;

/// Everything that can go wrong while using a mounted [`crate::vsfs::Filesystem`].
#[derive(Debug)]
pub enum Error<E> {
    /// Bad `m` to `format`, an out-of-range fd, a filename that is too long,
    /// or an unrecognised mode.
    InvalidArgument,
    /// `open`/`delete` on a name that has no directory entry.
    NotFound,
    /// `create` of a name that already has an occupied directory entry.
    AlreadyExists,
    /// The root directory has no free entry, or the data region has no free
    /// block left to extend a chain.
    Full,
    /// `read` on a handle opened in `Append` mode, or `append` on a handle
    /// opened in `Read` mode, or reopening an open file in a different mode.
    WrongMode,
    /// A short read/write against the backing block device, or a device
    /// error bubbled up from the block device implementation.
    Io(E),
    /// The fd names a slot that is not currently open.
    NotOpen,
}

impl<E> fmt::Display for Error<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::NotFound => write!(f, "no such file"),
            Error::AlreadyExists => write!(f, "file already exists"),
            Error::Full => write!(f, "filesystem full"),
            Error::WrongMode => write!(f, "file not open in the requested mode"),
            Error::Io(e) => write!(f, "block device error: {:?}", e),
            Error::NotOpen => write!(f, "file descriptor is not open"),
        }
    }
}

impl<E> std::error::Error for Error<E> where E: fmt::Debug {}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Io(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E> = core::result::Result<T, Error<E>>;
