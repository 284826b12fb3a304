//! Read-only access to a fixed-size file.
//!
//! A [Blob] exposes a file as a zero-indexed sequence of bytes whose length never changes while
//! it is open. Two implementations are provided and selected with [Strategy] when a [Source] is
//! opened:
//!
//! - [mmap::Blob] maps the file and hands out borrowed views into the mapping.
//! - [file::Blob] seeks and reads on every request (for platforms or filesystems where mapping
//!   is unavailable or undesirable).
//!
//! Both return exactly the requested bytes or fail: a range that extends past the end of the
//! file is an [Error::OutOfRange], never a short read.
//!
//! The backing resource is released on the first call to [Blob::close] (later calls do nothing)
//! or when the blob is dropped, whichever comes first.

use crate::Error;
use bytes::Buf;
use std::{borrow::Cow, path::Path};

pub mod file;
pub mod mmap;

/// How a [Source] reads its file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Map the file into memory.
    #[default]
    Mmap,
    /// Seek and read through a file handle.
    File,
}

/// Interface that any read-only byte range backend must implement.
pub trait Blob: Send + Sync {
    /// Returns the length of the file (fixed when opened).
    fn len(&self) -> u64;

    /// Returns true if the file is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns exactly `len` bytes starting at `offset`.
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, Error>;

    /// Release the backing resource. Calling this more than once is a no-op.
    fn close(&mut self);

    /// Returns true if the backing resource has been released.
    fn is_closed(&self) -> bool;

    /// Read a big-endian `u32` at `offset`.
    fn read_u32(&self, offset: u64) -> Result<u32, Error> {
        let buf = self.read_at(offset, 4)?;
        let mut raw: &[u8] = &buf;
        Ok(raw.get_u32())
    }
}

/// Ensure `[offset, offset + len)` lies within a blob of `size` bytes.
pub(crate) fn check_range(offset: u64, len: usize, size: u64) -> Result<(), Error> {
    let len = len as u64;
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(Error::OutOfRange { offset, len, size }),
    }
}

/// A [Blob] backed by either [Strategy].
pub enum Source {
    Mmap(mmap::Blob),
    File(file::Blob),
}

impl Source {
    /// Open the file at `path` with the given [Strategy].
    pub fn open(path: &Path, strategy: Strategy) -> Result<Self, Error> {
        Ok(match strategy {
            Strategy::Mmap => Self::Mmap(mmap::Blob::open(path)?),
            Strategy::File => Self::File(file::Blob::open(path)?),
        })
    }

    /// Returns the [Strategy] the source was opened with.
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Mmap(_) => Strategy::Mmap,
            Self::File(_) => Strategy::File,
        }
    }
}

impl Blob for Source {
    fn len(&self) -> u64 {
        match self {
            Self::Mmap(blob) => blob.len(),
            Self::File(blob) => blob.len(),
        }
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, Error> {
        match self {
            Self::Mmap(blob) => blob.read_at(offset, len),
            Self::File(blob) => blob.read_at(offset, len),
        }
    }

    fn close(&mut self) {
        match self {
            Self::Mmap(blob) => blob.close(),
            Self::File(blob) => blob.close(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::Mmap(blob) => blob.is_closed(),
            Self::File(blob) => blob.is_closed(),
        }
    }
}
