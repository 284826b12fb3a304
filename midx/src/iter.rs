//! Iterate over the digests of a [Midx] in ascending order.

use crate::{Digest, Error, Midx};
use std::iter::FusedIterator;

/// An iterator over every digest in a [Midx], in ascending order.
///
/// Created by [Midx::iter]. Stops after the first error.
pub struct Iter<'a> {
    midx: &'a Midx,
    next: u64,
    end: u64,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(midx: &'a Midx) -> Self {
        Self {
            midx,
            next: 0,
            end: midx.len(),
        }
    }

    /// Returns the position of the next digest along with the digest.
    fn next_entry(&mut self) -> Option<Result<(u64, Digest), Error>> {
        if self.next >= self.end {
            return None;
        }
        let position = self.next;
        self.next += 1;
        match self.midx.get(position) {
            Ok(digest) => Some(Ok((position, digest))),
            Err(err) => {
                self.next = self.end;
                Some(Err(err))
            }
        }
    }

    fn remaining(&self) -> usize {
        usize::try_from(self.end - self.next).unwrap_or(usize::MAX)
    }
}

impl Iterator for Iter<'_> {
    type Item = Result<Digest, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
            .map(|entry| entry.map(|(_, digest)| digest))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// An iterator over every digest in a [Midx], in ascending order, each paired with a caller
/// supplied base plus the name table position of the index that contributed it.
///
/// Created by [Midx::iter_with_offset]. Callers merging several files into one index space
/// pass each file's first position in that space as `base`.
pub struct IterWithOffset<'a> {
    inner: Iter<'a>,
    base: u64,
}

impl<'a> IterWithOffset<'a> {
    pub(crate) fn new(midx: &'a Midx, base: u64) -> Self {
        Self {
            inner: Iter::new(midx),
            base,
        }
    }
}

impl Iterator for IterWithOffset<'_> {
    type Item = Result<(Digest, u64), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let (position, digest) = match self.inner.next_entry()? {
            Ok(entry) => entry,
            Err(err) => return Some(Err(err)),
        };
        let index = self.inner.midx.provenance(position).and_then(|index| {
            self.base
                .checked_add(index as u64)
                .ok_or(Error::OffsetOverflow {
                    base: self.base,
                    index,
                })
        });
        match index {
            Ok(index) => Some(Ok((digest, index))),
            Err(err) => {
                self.inner.next = self.inner.end;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IterWithOffset<'_> {}

impl FusedIterator for IterWithOffset<'_> {}

impl<'a> IntoIterator for &'a Midx {
    type Item = Result<Digest, Error>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixture::{digest, random_digests, Writer},
        Config, Strategy,
    };
    use test_case::test_case;

    #[test_case(Strategy::Mmap; "mmap")]
    #[test_case(Strategy::File; "file")]
    fn test_sorted(strategy: Strategy) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sorted.midx");
        let digests = random_digests(0, 1_000);
        Writer::new(6)
            .index("a.idx", &digests[..400])
            .index("b.idx", &digests[400..])
            .write(&path);

        let cfg = Config {
            strategy,
            metrics: None,
        };
        let midx = Midx::open(&path, &cfg).unwrap();
        let iter = midx.iter();
        assert_eq!(iter.len(), 1_000);
        let got: Vec<Digest> = iter.map(Result::unwrap).collect();
        assert!(got.windows(2).all(|w| w[0] < w[1]));

        let mut expected = digests.clone();
        expected.sort();
        assert_eq!(got, expected);

        // Each call starts over
        let again: Vec<Digest> = (&midx).into_iter().map(Result::unwrap).collect();
        assert_eq!(again, got);
    }

    #[test]
    fn test_with_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.midx");
        Writer::new(0)
            .entry(digest(0x01), 0)
            .entry(digest(0x05), 1)
            .entry(digest(0x09), 0)
            .names(&["a.idx", "b.idx"])
            .write(&path);

        let midx = Midx::open(&path, &Config::default()).unwrap();
        let got: Vec<(Digest, u64)> = midx
            .iter_with_offset(100)
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            got,
            vec![(digest(0x01), 100), (digest(0x05), 101), (digest(0x09), 100)]
        );
        assert_eq!(midx.iter_with_offset(0).len(), 3);

        // An offset that cannot be represented ends the iteration
        let mut iter = midx.iter_with_offset(u64::MAX);
        assert_eq!(iter.next().unwrap().unwrap(), (digest(0x01), u64::MAX));
        assert!(matches!(
            iter.next(),
            Some(Err(Error::OffsetOverflow {
                base: u64::MAX,
                index: 1
            }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_size_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hint.midx");
        Writer::new(2)
            .index("a.idx", &random_digests(1, 5))
            .write(&path);

        let midx = Midx::open(&path, &Config::default()).unwrap();
        let mut iter = midx.iter();
        assert_eq!(iter.size_hint(), (5, Some(5)));
        iter.next().unwrap().unwrap();
        iter.next().unwrap().unwrap();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.by_ref().count(), 3);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.midx");
        Writer::new(2)
            .index("a.idx", &random_digests(2, 5))
            .write(&path);

        let mut midx = Midx::open(&path, &Config::default()).unwrap();
        midx.close();

        // The first read fails and ends the iteration
        let mut iter = midx.iter();
        assert!(matches!(iter.next(), Some(Err(Error::Closed))));
        assert!(iter.next().is_none());
        let mut iter = midx.iter_with_offset(0);
        assert!(matches!(iter.next(), Some(Err(Error::Closed))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("degraded.midx");
        Writer::new(2)
            .magic(*b"XXXX")
            .index("a.idx", &random_digests(3, 5))
            .write(&path);

        let midx = Midx::open(&path, &Config::default()).unwrap();
        assert_eq!(midx.iter().count(), 0);
        assert_eq!(midx.iter_with_offset(7).count(), 0);
    }
}
