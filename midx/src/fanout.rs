//! Bound a digest to the slice of the digest table that shares its top bits.

use crate::{midx::Layout, source::Blob, Error, Midx};

/// The slice of the digest table covered by one fanout bucket.
///
/// `start..end` are positions in the digest table. `start_value..end_value` is the range of
/// 32-bit digest prefixes the bucket covers, used to estimate where in the slice a digest lies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub start: u64,
    pub start_value: u64,
    pub end: u64,
    pub end_value: u64,
}

impl Layout {
    /// Read the cumulative digest count of `bucket`.
    pub(crate) fn fanout<B: Blob>(&self, blob: &B, bucket: u64) -> Result<u64, Error> {
        let offset = Self::FANOUT.saturating_add(bucket.saturating_mul(4));
        if bucket >= self.entries {
            return Err(Error::OutOfRange {
                offset,
                len: 4,
                size: self.digests,
            });
        }

        // Every count in a table without digests is zero (and a degraded file has no table)
        if self.hashes == 0 {
            return Ok(0);
        }
        Ok(blob.read_u32(offset)? as u64)
    }

    /// Compute the [Bounds] of the bucket holding digests whose top bits are `bucket`.
    pub(crate) fn bounds<B: Blob>(&self, blob: &B, bucket: u32) -> Result<Bounds, Error> {
        let bucket = bucket as u64;
        let shift = 32 - self.bits;
        let start = match bucket {
            0 => 0,
            _ => self.fanout(blob, bucket - 1)?,
        };
        let end = self.fanout(blob, bucket)?;
        Ok(Bounds {
            start,
            start_value: bucket << shift,
            end,
            end_value: (bucket + 1) << shift,
        })
    }
}

impl Midx {
    /// Returns the number of digests whose top [Midx::bits] bits are `<= bucket`.
    pub fn fanout(&self, bucket: u64) -> Result<u64, Error> {
        self.layout().fanout(self.blob(), bucket)
    }

    /// Returns the [Bounds] of the bucket holding digests whose top [Midx::bits] bits are
    /// `bucket`.
    pub fn bucket_bounds(&self, bucket: u32) -> Result<Bounds, Error> {
        self.layout().bounds(self.blob(), bucket)
    }
}
