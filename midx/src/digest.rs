use crate::Error;
use commonware_utils::{from_hex, hex};
use std::{
    fmt::{Debug, Display, Formatter},
    ops::Deref,
    str::FromStr,
};

/// A 20-byte content hash.
///
/// Digests order by unsigned byte comparison, which matches the order of the digest table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Digest([u8; Digest::SIZE]);

impl Digest {
    /// Size of a digest in bytes.
    pub const SIZE: usize = 20;

    pub const fn new(value: [u8; Self::SIZE]) -> Self {
        Self(value)
    }

    /// Returns the leading 32 bits of the digest as an unsigned integer.
    pub fn prefix(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Returns the top `bits` bits of the digest (the fanout bucket it falls in).
    pub fn bucket(&self, bits: u32) -> u32 {
        debug_assert!(bits <= 32, "bits out of range: {bits}");
        if bits == 0 {
            return 0;
        }
        self.prefix() >> (32 - bits)
    }
}

impl From<[u8; Digest::SIZE]> for Digest {
    fn from(value: [u8; Digest::SIZE]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let value: [u8; Self::SIZE] = value.try_into().map_err(|_| Error::InvalidDigest)?;
        Ok(Self(value))
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = from_hex(s).ok_or(Error::InvalidDigest)?;
        Self::try_from(raw.as_slice())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Digest {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl Debug for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(prefix: [u8; 4]) -> Digest {
        let mut raw = [0xffu8; Digest::SIZE];
        raw[..4].copy_from_slice(&prefix);
        Digest::new(raw)
    }

    #[test]
    fn test_prefix_and_bucket() {
        let d = digest([0xab, 0xcd, 0x12, 0x34]);
        assert_eq!(d.prefix(), 0xabcd1234);
        assert_eq!(d.bucket(0), 0);
        assert_eq!(d.bucket(1), 1);
        assert_eq!(d.bucket(8), 0xab);
        assert_eq!(d.bucket(12), 0xabc);
        assert_eq!(d.bucket(32), 0xabcd1234);
    }

    #[test]
    fn test_order_is_bytewise() {
        let low = digest([0x00, 0x00, 0x00, 0xff]);
        let high = digest([0x80, 0x00, 0x00, 0x00]);
        assert!(low < high);

        // Ties on the prefix are broken by the remaining bytes
        let mut raw = [0u8; Digest::SIZE];
        raw[19] = 1;
        assert!(Digest::new([0u8; Digest::SIZE]) < Digest::new(raw));
    }

    #[test]
    fn test_parse() {
        let s = "0123456789abcdef0123456789abcdef01234567";
        let d: Digest = s.parse().unwrap();
        assert_eq!(d.to_string(), s);
        assert_eq!(d.prefix(), 0x01234567);

        // Wrong length
        assert!(matches!(
            "0123".parse::<Digest>(),
            Err(Error::InvalidDigest)
        ));
        assert!(matches!(
            Digest::try_from(&[0u8; 19][..]),
            Err(Error::InvalidDigest)
        ));

        // Not hex
        assert!(matches!(
            "zz23456789abcdef0123456789abcdef01234567".parse::<Digest>(),
            Err(Error::InvalidDigest)
        ));
    }
}
