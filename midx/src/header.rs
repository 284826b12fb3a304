//! Fixed-size header at the start of each multi-index.

use crate::{source::check_range, Error};
use bytes::Buf;

/// Magic bytes identifying a multi-index.
pub const MAGIC: [u8; 4] = *b"MIDX";

/// The only version of the format that can be read.
pub const VERSION: u32 = 4;

/// Largest supported fanout width (one bucket per 32-bit prefix).
const MAX_BITS: u32 = 32;

/// Why a file could not be read as a multi-index.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Mismatch {
    #[error("invalid header: {0:?}")]
    InvalidMagic([u8; 4]),
    #[error("truncated header: {0} bytes")]
    Truncated(u64),
    #[error("old-style version: v{0}")]
    Outdated(u32),
    #[error("too-new version: v{0}")]
    Unsupported(u32),
    #[error("invalid bits: {0}")]
    InvalidBits(u32),
}

impl Mismatch {
    /// Returns true if the file should survive a sweep of obsolete files.
    ///
    /// Only files written by an older version are known to be safe to discard.
    pub fn force_keep(&self) -> bool {
        !matches!(self, Self::Outdated(_))
    }

    /// Returns the version declared by the file, if it got that far.
    pub fn version(&self) -> Option<u32> {
        match self {
            Self::Outdated(version) | Self::Unsupported(version) => Some(*version),
            Self::InvalidBits(_) => Some(VERSION),
            Self::InvalidMagic(_) | Self::Truncated(_) => None,
        }
    }
}

/// On-disk layout (12 bytes, big-endian):
/// - Bytes 0-3: [MAGIC]
/// - Bytes 4-7: Version (u32)
/// - Bytes 8-11: Bits (u32)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) bits: u32,
}

impl Header {
    /// Size of the header in bytes.
    pub(crate) const SIZE: u64 = 12;

    /// Parses the leading bytes of a file (at most [Header::SIZE] of them).
    ///
    /// A file too short to hold [MAGIC], or one whose magic, version or bit width is not
    /// understood, is a [Mismatch]. A file that carries [MAGIC] but ends before the version or
    /// bit width it requires is an [Error::OutOfRange].
    pub(crate) fn parse(mut raw: &[u8]) -> Result<Result<Self, Mismatch>, Error> {
        let size = raw.len() as u64;
        if raw.remaining() < MAGIC.len() {
            return Ok(Err(Mismatch::Truncated(size)));
        }
        let mut magic = [0u8; 4];
        raw.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Ok(Err(Mismatch::InvalidMagic(magic)));
        }

        check_range(4, 4, size)?;
        let version = raw.get_u32();
        if version < VERSION {
            return Ok(Err(Mismatch::Outdated(version)));
        }
        if version > VERSION {
            return Ok(Err(Mismatch::Unsupported(version)));
        }

        check_range(8, 4, size)?;
        let bits = raw.get_u32();
        if bits > MAX_BITS {
            return Ok(Err(Mismatch::InvalidBits(bits)));
        }
        Ok(Ok(Self { bits }))
    }
}
