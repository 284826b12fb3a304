use bytes::BufMut;
use packstore_midx::{Digest, MAGIC, VERSION};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::{fs, path::Path};

/// Generate `count` random digests.
pub fn random_digests(seed: u64, count: usize) -> Vec<Digest> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut raw = [0u8; Digest::SIZE];
            rng.fill_bytes(&mut raw);
            Digest::new(raw)
        })
        .collect()
}

/// Write a multi-index holding `digests` (attributed to a single index) to `path`.
pub fn write(path: &Path, bits: u32, digests: &[Digest]) {
    let mut digests = digests.to_vec();
    digests.sort();
    digests.dedup();

    let mut fanout = vec![0u32; 1 << bits];
    for d in &digests {
        fanout[d.bucket(bits) as usize] += 1;
    }
    for i in 1..fanout.len() {
        fanout[i] += fanout[i - 1];
    }

    let mut buf = Vec::new();
    buf.put_slice(&MAGIC);
    buf.put_u32(VERSION);
    buf.put_u32(bits);
    for count in fanout {
        buf.put_u32(count);
    }
    for d in &digests {
        buf.put_slice(d);
    }
    for _ in &digests {
        buf.put_u32(0);
    }
    buf.put_slice(b"pack-bench.idx");
    fs::write(path, buf).unwrap();
}
