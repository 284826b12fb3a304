//! A [super::Blob] that seeks and reads through a file handle.

use super::check_range;
use crate::Error;
use std::{
    borrow::Cow,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
    sync::{Mutex, PoisonError},
};
use tracing::debug;

/// Implementation of [super::Blob] that reads through a file handle.
pub struct Blob {
    name: String,
    len: u64,

    // Files must be seeked prior to any read and are thus not safe to concurrently
    // interact with. `None` once closed.
    file: Mutex<Option<File>>,
}

impl Blob {
    /// Open the file at `path` for reading.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::OpenFailed(name.clone(), e))?;
        let len = file
            .metadata()
            .map_err(|e| Error::OpenFailed(name.clone(), e))?
            .len();
        debug!(name = %name, len, "opened blob");
        Ok(Self {
            name,
            len,
            file: Mutex::new(Some(file)),
        })
    }
}

impl super::Blob for Blob {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, Error> {
        // A panic while holding the lock cannot leave the handle in a bad state (every
        // read seeks first), so a poisoned lock is still usable.
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = guard.as_mut().ok_or(Error::Closed)?;
        check_range(offset, len, self.len)?;

        // Perform the read
        let mut buf = vec![0u8; len];
        file.seek(SeekFrom::Start(offset))
            .map_err(Error::ReadFailed)?;
        file.read_exact(&mut buf).map_err(Error::ReadFailed)?;
        Ok(Cow::Owned(buf))
    }

    fn close(&mut self) {
        let file = self
            .file
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if file.take().is_some() {
            debug!(name = %self.name, "closed blob");
        }
    }

    fn is_closed(&self) -> bool {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
