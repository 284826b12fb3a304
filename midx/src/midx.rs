use crate::{
    header::{Header, Mismatch},
    iter::{Iter, IterWithOffset},
    source::{Blob, Source, Strategy},
    is_midx, Config, Digest, Error, Metrics,
};
use std::{path::Path, sync::Arc};
use tracing::{debug, warn};

/// Offsets and sizes of the regions of a multi-index, derived from its bit width and the final
/// fanout count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) bits: u32,
    pub(crate) entries: u64,
    pub(crate) hashes: u64,

    /// Offset of the digest table.
    pub(crate) digests: u64,
    /// Offset of the index (provenance) table.
    pub(crate) indexes: u64,
    /// Offset of the name table.
    pub(crate) names: u64,
}

impl Layout {
    /// Offset of the fanout table.
    pub(crate) const FANOUT: u64 = Header::SIZE;

    pub(crate) fn new(bits: u32, hashes: u64) -> Self {
        let entries = 1u64 << bits;
        let digests = Self::FANOUT + 4 * entries;
        let indexes = digests + Digest::SIZE as u64 * hashes;
        let names = indexes + 4 * hashes;
        Self {
            bits,
            entries,
            hashes,
            digests,
            indexes,
            names,
        }
    }

    /// The layout of a file that could not be parsed: a single empty bucket.
    fn degraded() -> Self {
        Self::new(0, 0)
    }

    /// Read the digest at `position` in the digest table.
    pub(crate) fn digest<B: Blob>(&self, blob: &B, position: u64) -> Result<Digest, Error> {
        let offset = self
            .digests
            .saturating_add(position.saturating_mul(Digest::SIZE as u64));
        if position >= self.hashes {
            return Err(Error::OutOfRange {
                offset,
                len: Digest::SIZE as u64,
                size: self.indexes,
            });
        }
        let raw = blob.read_at(offset, Digest::SIZE)?;
        Digest::try_from(&raw[..])
    }

    /// Read the position (in the name table) of the index that contributed the digest at
    /// `position`.
    pub(crate) fn index<B: Blob>(&self, blob: &B, position: u64) -> Result<u32, Error> {
        let offset = self.indexes.saturating_add(position.saturating_mul(4));
        if position >= self.hashes {
            return Err(Error::OutOfRange {
                offset,
                len: 4,
                size: self.names,
            });
        }
        blob.read_u32(offset)
    }
}

/// Split the name table into index names.
///
/// A trailing separator does not introduce an empty name.
fn parse_names(raw: &[u8]) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
    raw.split(|b| *b == 0)
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect()
}

/// A read-only view of one multi-index file.
pub struct Midx {
    name: String,
    blob: Source,

    layout: Layout,
    mismatch: Option<Mismatch>,
    names: Vec<String>,

    metrics: Arc<Metrics>,
}

impl Midx {
    /// Open the multi-index at `path`.
    ///
    /// A file that is not a readable multi-index (unknown magic, unsupported version, or too
    /// short to hold the magic) is not an error: a warning is logged and the returned [Midx] is
    /// degraded (it contains nothing). Errors are only returned when the file cannot be read
    /// or, once the magic matches, its header or regions extend past the end of the file.
    ///
    /// # Panics
    ///
    /// Panics if the file name of `path` does not end in `.midx`.
    pub fn open(path: impl AsRef<Path>, cfg: &Config) -> Result<Self, Error> {
        let path = path.as_ref();
        assert!(is_midx(path), "not a midx file: {}", path.display());
        let name = path.display().to_string();
        let metrics = cfg.metrics.clone().unwrap_or_default();

        // If parsing fails below, the blob is released as it goes out of scope
        let blob = Source::open(path, cfg.strategy)?;
        let header = {
            let available = blob.len().min(Header::SIZE) as usize;
            let raw = blob.read_at(0, available)?;
            Header::parse(&raw)?
        };
        let header = match header {
            Ok(header) => header,
            Err(mismatch) => {
                warn!(
                    path = %name,
                    version = ?mismatch.version(),
                    force_keep = mismatch.force_keep(),
                    reason = %mismatch,
                    "ignoring midx"
                );
                metrics.degraded.inc();
                return Ok(Self {
                    name,
                    blob,
                    layout: Layout::degraded(),
                    mismatch: Some(mismatch),
                    names: Vec::new(),
                    metrics,
                });
            }
        };

        // The final fanout bucket counts every digest
        let entries = 1u64 << header.bits;
        let hashes = blob.read_u32(Layout::FANOUT + 4 * (entries - 1))?;
        let layout = Layout::new(header.bits, hashes as u64);

        // Everything after the index table names the indexes
        let names = {
            let size = blob.len();
            let len = size
                .checked_sub(layout.names)
                .and_then(|len| usize::try_from(len).ok())
                .ok_or(Error::OutOfRange {
                    offset: layout.names,
                    len: 0,
                    size,
                })?;
            let raw = blob.read_at(layout.names, len)?;
            parse_names(&raw)
        };
        debug!(
            path = %name,
            bits = layout.bits,
            hashes = layout.hashes,
            indexes = names.len(),
            "opened midx"
        );

        Ok(Self {
            name,
            blob,
            layout,
            mismatch: None,
            names,
            metrics,
        })
    }

    /// Returns the path the file was opened from.
    pub fn path(&self) -> &str {
        &self.name
    }

    /// Returns the [Strategy] used to read the file.
    pub fn strategy(&self) -> Strategy {
        self.blob.strategy()
    }

    /// Returns the number of leading digest bits used to pick a fanout bucket.
    pub fn bits(&self) -> u32 {
        self.layout.bits
    }

    /// Returns the number of fanout buckets.
    pub fn entries(&self) -> u64 {
        self.layout.entries
    }

    /// Returns the number of digests.
    pub fn len(&self) -> u64 {
        self.layout.hashes
    }

    /// Returns true if there are no digests.
    pub fn is_empty(&self) -> bool {
        self.layout.hashes == 0
    }

    /// Returns the names of the indexes merged into this file.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the name of the index at `index` in the name table.
    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    /// Returns true if the file could not be parsed and is treated as empty.
    pub fn is_degraded(&self) -> bool {
        self.mismatch.is_some()
    }

    /// Returns why the file could not be parsed, if it couldn't.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        self.mismatch.as_ref()
    }

    /// Returns true if a degraded file should not be deleted by maintenance.
    ///
    /// This is advisory: nothing in this crate enforces it except [crate::sweep::prune].
    pub fn force_keep(&self) -> bool {
        self.mismatch.as_ref().is_some_and(Mismatch::force_keep)
    }

    /// Returns the position of `digest` in the digest table, if present.
    pub fn find(&self, digest: &Digest) -> Result<Option<u64>, Error> {
        self.layout.search(&self.blob, digest, &self.metrics)
    }

    /// Returns true if `digest` is present.
    pub fn exists(&self, digest: &Digest) -> Result<bool, Error> {
        Ok(self.find(digest)?.is_some())
    }

    /// Returns the name of the index that contributed `digest`, if present.
    pub fn source(&self, digest: &Digest) -> Result<Option<&str>, Error> {
        let Some(position) = self.find(digest)? else {
            return Ok(None);
        };
        let index = self.provenance(position)?;
        self.name(index).map(Some).ok_or(Error::UnknownIndex(index))
    }

    /// Returns the digest at `position`.
    pub fn get(&self, position: u64) -> Result<Digest, Error> {
        self.layout.digest(&self.blob, position)
    }

    /// Returns the name table position of the index that contributed the digest at `position`.
    pub fn provenance(&self, position: u64) -> Result<u32, Error> {
        self.layout.index(&self.blob, position)
    }

    /// Returns an iterator over all digests in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Returns an iterator over all digests in ascending order, each paired with `base` plus the
    /// name table position of the index that contributed it.
    ///
    /// If that sum does not fit in a `u64`, the iterator yields [Error::OffsetOverflow] and stops.
    pub fn iter_with_offset(&self, base: u64) -> IterWithOffset<'_> {
        IterWithOffset::new(self, base)
    }

    /// Release the underlying file. Subsequent reads fail with [Error::Closed].
    ///
    /// Calling this more than once is a no-op. Dropping a [Midx] has the same effect.
    pub fn close(&mut self) {
        self.blob.close();
    }

    /// Returns true if the underlying file has been released.
    pub fn is_closed(&self) -> bool {
        self.blob.is_closed()
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn blob(&self) -> &Source {
        &self.blob
    }
}
