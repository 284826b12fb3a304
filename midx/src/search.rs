//! Interpolation search over the digest table.
//!
//! Digests are content hashes and thus (close to) uniformly distributed, so the position of a
//! digest within its fanout bucket can be estimated from its 32-bit prefix: a digest whose prefix
//! lies a third of the way through the bucket's value range most likely lies a third of the way
//! through the bucket's slice of the table. Each probe narrows both the slice and the value range
//! (to the prefixes of the entries just read), which on uniform data converges in about
//! `log(log(n))` probes.
//!
//! Estimates only pick where to probe. Whether a digest is present is always decided by comparing
//! full digests, so the search stays correct (though it may take up to `n` probes) on skewed data.

use crate::{fanout::Bounds, midx::Layout, source::Blob, Digest, Error, Metrics};
use std::cmp::Ordering;
use tracing::trace;

/// Estimate the position of `value` within `start..end` (which must not be empty), given that
/// entries in that slice have prefixes in `start_value..=end_value`.
///
/// The result always lies within `start..end`.
pub(crate) fn probe(start: u64, start_value: u64, end: u64, end_value: u64, value: u64) -> u64 {
    debug_assert!(start < end, "empty range: {start}..{end}");
    let span = end - start;

    // Every remaining entry shares the same prefix, so there is nothing to interpolate on
    if end_value <= start_value {
        return start + span / 2;
    }
    let width = end_value - start_value;
    let offset = value.saturating_sub(start_value).min(width);
    let step = (offset as u128 * (span - 1) as u128) / width as u128;
    start + step as u64
}

impl Layout {
    /// Returns the position of `digest` in the digest table, if present.
    pub(crate) fn search<B: Blob>(
        &self,
        blob: &B,
        digest: &Digest,
        metrics: &Metrics,
    ) -> Result<Option<u64>, Error> {
        metrics.searches.inc();

        // Restrict the search to the bucket of the digest
        let Bounds {
            mut start,
            mut start_value,
            mut end,
            mut end_value,
        } = self.bounds(blob, digest.bucket(self.bits))?;
        metrics.steps.inc();

        let value = digest.prefix() as u64;
        while start < end {
            metrics.steps.inc();
            let mid = probe(start, start_value, end, end_value, value);
            trace!(start, mid, end, "probe");
            let entry = self.digest(blob, mid)?;
            match entry.cmp(digest) {
                Ordering::Less => {
                    start = mid + 1;
                    start_value = entry.prefix() as u64;
                }
                Ordering::Greater => {
                    end = mid;
                    end_value = entry.prefix() as u64;
                }
                Ordering::Equal => return Ok(Some(mid)),
            }
        }
        Ok(None)
    }
}
