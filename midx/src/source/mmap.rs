//! A [super::Blob] that maps its file into memory.

use super::check_range;
use crate::Error;
use memmap2::{Mmap, MmapOptions};
use std::{borrow::Cow, fs::File, path::Path};
use tracing::debug;

/// Implementation of [super::Blob] that serves reads from a read-only memory map.
///
/// Reads borrow directly from the mapping and never copy.
pub struct Blob {
    name: String,
    len: u64,

    // `None` once closed.
    map: Option<Mmap>,
}

impl Blob {
    /// Map the file at `path`.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::OpenFailed(name.clone(), e))?;

        // SAFETY: the map is read-only and files are never modified once written (writers
        // produce a new file and rename it into place).
        let map = unsafe { MmapOptions::new().map(&file) }
            .map_err(|e| Error::OpenFailed(name.clone(), e))?;
        let len = map.len() as u64;
        debug!(name = %name, len, "mapped blob");

        // The map outlives the file handle, which is closed here.
        Ok(Self {
            name,
            len,
            map: Some(map),
        })
    }
}

impl super::Blob for Blob {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, Error> {
        let map = self.map.as_ref().ok_or(Error::Closed)?;
        check_range(offset, len, self.len)?;
        let start = offset as usize;
        Ok(Cow::Borrowed(&map[start..start + len]))
    }

    fn close(&mut self) {
        if self.map.take().is_some() {
            debug!(name = %self.name, "unmapped blob");
        }
    }

    fn is_closed(&self) -> bool {
        self.map.is_none()
    }
}
