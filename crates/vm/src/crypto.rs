use ed25519_dalek::{PublicKey, Signature, Verifier};
use sha2::{Digest, Sha256, Sha512_256};
use sha3::Keccak256;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    Sha512_256::digest(data).into()
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Domain-separated ed25519 verification: the signed message is always
/// `"ProgData" ‖ program-hash ‖ data`, never the raw
/// `data` bytes, so a signature over one program can't be replayed
/// against another.
pub fn ed25519verify(data: &[u8], signature: &[u8], pubkey: &[u8], program_hash: &[u8; 32]) -> bool {
    let Ok(pk) = PublicKey::from_bytes(pubkey) else {
        return false;
    };
    let Ok(sig) = Signature::from_bytes(signature) else {
        return false;
    };
    let mut message = Vec::with_capacity(8 + 32 + data.len());
    message.extend_from_slice(b"ProgData");
    message.extend_from_slice(program_hash);
    message.extend_from_slice(data);
    pk.verify(&message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        let digest = sha256(b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn ed25519verify_rejects_malformed_key() {
        assert!(!ed25519verify(b"data", &[0u8; 64], &[0u8; 4], &[0u8; 32]));
    }
}
