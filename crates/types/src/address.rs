use crate::error::RuntimeError;
use sha2::{Digest, Sha512_256};

pub const ADDRESS_LEN: usize = 32;
const CHECKSUM_LEN: usize = 4;

/// A 32-byte public key with a canonical, checksummed base-32 string
/// form. The checksum is the last 4 bytes of
/// `sha512_256(pubkey)`, matching this domain's standard address
/// encoding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    pub fn to_bytes(&self) -> [u8; ADDRESS_LEN] {
        self.0
    }

    /// Encodes the address into its checksummed base-32 string.
    pub fn encode_checksum_address(&self) -> String {
        let checksum = Self::checksum(&self.0);
        let mut payload = Vec::with_capacity(ADDRESS_LEN + CHECKSUM_LEN);
        payload.extend_from_slice(&self.0);
        payload.extend_from_slice(&checksum);
        base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &payload)
    }

    /// Decodes and validates a checksummed base-32 address string.
    pub fn decode_checksum_address(s: &str) -> Result<Self, RuntimeError> {
        let decoded = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, s)
            .ok_or_else(|| RuntimeError::InvalidAddr(s.to_string()))?;
        if decoded.len() != ADDRESS_LEN + CHECKSUM_LEN {
            return Err(RuntimeError::InvalidAddr(s.to_string()));
        }
        let (pubkey, checksum) = decoded.split_at(ADDRESS_LEN);
        if Self::checksum(pubkey) != checksum {
            return Err(RuntimeError::InvalidAddr(s.to_string()));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(pubkey);
        Ok(Address(bytes))
    }

    fn checksum(pubkey: &[u8]) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(pubkey);
        let mut out = [0u8; CHECKSUM_LEN];
        out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        out
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::ZERO
    }
}

impl core::fmt::Debug for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.encode_checksum_address())
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.encode_checksum_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_checksum_string() {
        let addr = Address::new([7u8; ADDRESS_LEN]);
        let s = addr.encode_checksum_address();
        let back = Address::decode_checksum_address(&s).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let addr = Address::new([9u8; ADDRESS_LEN]);
        let mut s = addr.encode_checksum_address();
        // Flip the last character, which lives entirely within the checksum.
        let last = s.pop().unwrap();
        let replacement = if last == 'A' { 'B' } else { 'A' };
        s.push(replacement);
        assert!(Address::decode_checksum_address(&s).is_err());
    }

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::new([1u8; ADDRESS_LEN]).is_zero());
    }
}
