//! Look up content hashes across many pack indexes through a single merged index.
//!
//! A pack stores many objects and a pack index maps each object's [Digest] to its offset within
//! that one pack. Once a store holds many packs, asking "is this digest stored anywhere?" by
//! probing every pack index becomes slow. A multi-index ([Midx]) merges the sorted digest tables
//! of many pack indexes into one file, bucketed by a fanout table, so that a lookup touches a
//! handful of entries no matter how many packs contributed to it.
//!
//! # Format
//!
//! All integers are big-endian:
//!
//! ```text
//! +-----------+-------------+----------+---------------------+-----------------+-----------------+-----------+
//! | MIDX (4)  | Version (4) | Bits (4) | Fanout (4 * 2^bits) | Digests (20 * n) | Indexes (4 * n) | Names ... |
//! +-----------+-------------+----------+---------------------+-----------------+-----------------+-----------+
//!
//! n = Fanout[2^bits - 1]
//! Names = NUL-separated pack index names (to the end of the file)
//! ```
//!
//! Fanout bucket `b` holds the number of digests whose top `bits` bits are `<= b`. Digests are
//! sorted and unique. Entry `i` of the index table names (by position in the name table) the pack
//! index that contributed digest `i`.
//!
//! # Degraded Files
//!
//! A file with an unknown magic, an unsupported version, or an unusable header is never an
//! error: [Midx::open] logs a warning and returns a degraded [Midx] that behaves as an empty
//! index. [Midx::force_keep] tells maintenance tooling whether such a file is merely obsolete
//! (safe to delete) or of an unknown format (keep it).
//!
//! # Example
//!
//! ```rust,no_run
//! use packstore_midx::{Config, Digest, Midx, Strategy};
//!
//! let cfg = Config {
//!     strategy: Strategy::Mmap,
//!     metrics: None,
//! };
//! let midx = Midx::open("objects/pack/midx-0001.midx", &cfg).unwrap();
//!
//! // Look up a digest and the pack index that contributed it
//! let digest: Digest = "0123456789abcdef0123456789abcdef01234567".parse().unwrap();
//! if let Some(name) = midx.source(&digest).unwrap() {
//!     println!("{digest} is stored in {name}");
//! }
//!
//! // Walk every digest in sorted order
//! for digest in midx.iter() {
//!     println!("{}", digest.unwrap());
//! }
//! ```

use std::{io::Error as IoError, path::Path, sync::Arc};
use thiserror::Error;

mod digest;
pub use digest::Digest;
mod fanout;
pub use fanout::Bounds;
mod header;
pub use header::{Mismatch, MAGIC, VERSION};
mod iter;
pub use iter::{Iter, IterWithOffset};
mod metrics;
pub use metrics::Metrics;
mod midx;
pub use midx::Midx;
mod search;
pub mod source;
pub use source::Strategy;
pub mod sweep;

#[cfg(test)]
mod fixture;

/// File extension of every multi-index.
pub const EXTENSION: &str = "midx";

/// Returns true if the file name of `path` ends in `.midx` (including a file named `.midx`).
pub fn is_midx(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        name.as_encoded_bytes()
            .strip_suffix(EXTENSION.as_bytes())
            .is_some_and(|stem| stem.ends_with(b"."))
    })
}

/// Errors that can occur when interacting with a [Midx].
#[derive(Debug, Error)]
pub enum Error {
    #[error("open failed: {0} error: {1}")]
    OpenFailed(String, IoError),
    #[error("read failed: {0}")]
    ReadFailed(IoError),
    #[error("out of range: offset={offset} len={len} size={size}")]
    OutOfRange { offset: u64, len: u64, size: u64 },
    #[error("closed")]
    Closed,
    #[error("invalid digest")]
    InvalidDigest,
    #[error("offset overflow: base={base} index={index}")]
    OffsetOverflow { base: u64, index: u32 },
    #[error("unknown index: {0}")]
    UnknownIndex(u32),
    #[error("remove failed: {0} error: {1}")]
    RemoveFailed(String, IoError),
    #[error("scan failed: {0} error: {1}")]
    ScanFailed(String, IoError),
}

/// Configuration for opening a [Midx].
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// How the file is read.
    pub strategy: Strategy,

    /// Counters to record lookups in.
    ///
    /// If `None`, each [Midx] tracks its own (unregistered) counters.
    pub metrics: Option<Arc<Metrics>>,
}
