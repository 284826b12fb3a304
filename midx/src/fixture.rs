//! Write multi-indexes for tests.

use crate::{Digest, MAGIC, VERSION};
use bytes::BufMut;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::{collections::BTreeSet, fs, path::Path};

/// Builds the bytes of a multi-index from (digest, index) pairs.
pub(crate) struct Writer {
    magic: [u8; 4],
    version: u32,
    bits: u32,
    entries: Vec<(Digest, u32)>,
    names: Vec<String>,
}

impl Writer {
    pub(crate) fn new(bits: u32) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            bits,
            entries: Vec::new(),
            names: Vec::new(),
        }
    }

    pub(crate) fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub(crate) fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Add a single entry pointing at an arbitrary name table position.
    pub(crate) fn entry(mut self, digest: Digest, index: u32) -> Self {
        self.entries.push((digest, index));
        self
    }

    /// Append names to the name table.
    pub(crate) fn names(mut self, names: &[&str]) -> Self {
        self.names.extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Append an index named `name` that contributes `digests`.
    pub(crate) fn index(mut self, name: &str, digests: &[Digest]) -> Self {
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.entries.extend(digests.iter().map(|d| (*d, index)));
        self
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut entries = self.entries.clone();
        entries.sort();

        // Cumulative count of digests per bucket
        let mut fanout = vec![0u32; 1 << self.bits];
        for (digest, _) in &entries {
            fanout[digest.bucket(self.bits) as usize] += 1;
        }
        for i in 1..fanout.len() {
            fanout[i] += fanout[i - 1];
        }

        let mut buf = Vec::new();
        buf.put_slice(&self.magic);
        buf.put_u32(self.version);
        buf.put_u32(self.bits);
        for count in fanout {
            buf.put_u32(count);
        }
        for (digest, _) in &entries {
            buf.put_slice(digest);
        }
        for (_, index) in &entries {
            buf.put_u32(*index);
        }
        buf.put_slice(self.names.join("\0").as_bytes());
        buf
    }

    pub(crate) fn write(&self, path: &Path) {
        fs::write(path, self.encode()).unwrap();
    }
}

/// A digest of all zeros except for its final byte.
pub(crate) fn digest(last: u8) -> Digest {
    let mut raw = [0u8; Digest::SIZE];
    raw[Digest::SIZE - 1] = last;
    Digest::new(raw)
}

/// Generate `count` distinct random digests (in random order).
pub(crate) fn random_digests(seed: u64, count: usize) -> Vec<Digest> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = BTreeSet::new();
    let mut digests = Vec::with_capacity(count);
    while digests.len() < count {
        let mut raw = [0u8; Digest::SIZE];
        rng.fill_bytes(&mut raw);
        let digest = Digest::new(raw);
        if seen.insert(digest) {
            digests.push(digest);
        }
    }
    digests
}

/// Generate `count` distinct random digests that all start with `prefix`.
pub(crate) fn prefixed_digests(seed: u64, prefix: &[u8], count: usize) -> Vec<Digest> {
    random_digests(seed, count)
        .into_iter()
        .map(|d| {
            let mut raw = [0u8; Digest::SIZE];
            raw.copy_from_slice(&d);
            raw[..prefix.len()].copy_from_slice(prefix);
            Digest::new(raw)
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
