use ed25519_dalek::{Keypair, PublicKey, Signature, Signer as DalekSigner};
use types::{Address, Bytes, ExecError, RResult, RuntimeError};
use vm::crypto::sha512_256;

/// How a logic signature authorizes the transaction it's attached to.
#[derive(Debug, Clone)]
pub enum LogicSigAuth {
    /// Delegated mode: `fromAccount`'s own key signed the program bytes,
    /// handing authority to whoever holds the program.
    Delegated { signer: Address, signature: [u8; 64] },
    /// Threshold multisig delegation: `threshold` of `signers` must have
    /// produced a valid signature over the program bytes.
    Multisig {
        signers: Vec<Address>,
        threshold: usize,
        signatures: Vec<Option<[u8; 64]>>,
    },
    /// Contract mode: no signature at all — authority comes from
    /// `fromAccount` itself being the program's hash-derived address.
    Contract,
    /// No authorization has been attached yet.
    Unsigned,
}

/// A logic signature: program bytes, the arguments it will see via
/// `ApplicationArgs`/`txn`-style access, and how it proves authorization.
#[derive(Debug, Clone)]
pub struct LogicSig {
    pub program: Vec<u8>,
    pub args: Vec<Bytes>,
    pub auth: LogicSigAuth,
}

impl LogicSig {
    pub fn new(program: Vec<u8>, args: Vec<Bytes>) -> Self {
        Self { program, args, auth: LogicSigAuth::Unsigned }
    }

    /// The address a *contract-mode* logic signature authorizes:
    /// `sha512_256("Program" ++ program_bytes)`, used directly as a
    /// 32-byte address with no corresponding private key.
    pub fn contract_address(program: &[u8]) -> Address {
        let mut buf = Vec::with_capacity(7 + program.len());
        buf.extend_from_slice(b"Program");
        buf.extend_from_slice(program);
        Address::new(sha512_256(&buf))
    }

    /// The address a threshold-multisig group authorizes:
    /// `sha512_256("MultisigAddr" ++ threshold ++ signers)`, the same
    /// hash-derived-address convention `contract_address` uses, keyed to
    /// the group's members instead of a program.
    pub fn multisig_address(signers: &[Address], threshold: usize) -> Address {
        let mut buf = Vec::with_capacity(12 + 1 + 32 * signers.len());
        buf.extend_from_slice(b"MultisigAddr");
        buf.push(threshold as u8);
        for signer in signers {
            buf.extend_from_slice(&signer.to_bytes());
        }
        Address::new(sha512_256(&buf))
    }

    /// Signs the program in delegated mode using the caller-supplied
    /// keypair. Mnemonic/key management is out of scope —
    /// callers hand in raw key material they already hold.
    pub fn sign(&mut self, signer: Address, keypair: &Keypair) {
        let signature = keypair.sign(&self.program).to_bytes();
        self.auth = LogicSigAuth::Delegated { signer, signature };
    }

    /// Signs the program as one signer in a threshold multisig. `signers`
    /// and `threshold` describe the whole group; this call fills in one
    /// slot at `index`.
    pub fn sign_multisig(
        &mut self,
        signers: Vec<Address>,
        threshold: usize,
        index: usize,
        keypair: &Keypair,
    ) {
        let signature = keypair.sign(&self.program).to_bytes();
        match &mut self.auth {
            LogicSigAuth::Multisig { signatures, .. } => {
                signatures[index] = Some(signature);
            }
            _ => {
                let mut signatures = vec![None; signers.len()];
                signatures[index] = Some(signature);
                self.auth = LogicSigAuth::Multisig { signers, threshold, signatures };
            }
        }
    }

    /// Verifies this logic signature authorizes `from_account` per
    /// either a (multisig) signature validates under
    /// `from_account`'s key, or `from_account` equals the program's
    /// hash-derived contract address.
    pub fn verify(&self, from_account: &Address) -> RResult<()> {
        match &self.auth {
            LogicSigAuth::Delegated { signer, signature } => {
                if signer != from_account {
                    return Err(ExecError::from(RuntimeError::LogicSignatureValidationFailed));
                }
                if !verify_ed25519(signer, &self.program, signature) {
                    return Err(ExecError::from(RuntimeError::LogicSignatureValidationFailed));
                }
                Ok(())
            }
            LogicSigAuth::Multisig { signers, threshold, signatures } => {
                if &Self::multisig_address(signers, *threshold) != from_account {
                    return Err(ExecError::from(RuntimeError::LogicSignatureValidationFailed));
                }
                let valid = signers
                    .iter()
                    .zip(signatures.iter())
                    .filter(|(addr, sig)| match sig {
                        Some(s) => verify_ed25519(addr, &self.program, s),
                        None => false,
                    })
                    .count();
                if valid < *threshold {
                    return Err(ExecError::from(RuntimeError::LogicSignatureValidationFailed));
                }
                Ok(())
            }
            LogicSigAuth::Contract => {
                let expected = Self::contract_address(&self.program);
                if &expected != from_account {
                    return Err(ExecError::from(RuntimeError::LogicSignatureValidationFailed));
                }
                Ok(())
            }
            LogicSigAuth::Unsigned => Err(ExecError::from(RuntimeError::LogicSignatureNotFound)),
        }
    }
}

fn verify_ed25519(signer: &Address, message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(pk) = PublicKey::from_bytes(&signer.to_bytes()) else {
        return false;
    };
    let Ok(sig) = Signature::from_bytes(signature) else {
        return false;
    };
    pk.verify_strict(message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Keypair;
    use rand::rngs::OsRng;

    fn keypair() -> Keypair {
        Keypair::generate(&mut OsRng)
    }

    #[test]
    fn delegated_signature_verifies_against_signer() {
        let kp = keypair();
        let addr = Address::new(kp.public.to_bytes());
        let mut lsig = LogicSig::new(b"#pragma version 2\nint 1\nreturn\n".to_vec(), vec![]);
        lsig.sign(addr, &kp);
        assert!(lsig.verify(&addr).is_ok());
    }

    #[test]
    fn delegated_signature_rejects_wrong_submitter() {
        let kp = keypair();
        let addr = Address::new(kp.public.to_bytes());
        let impostor = Address::new([9u8; 32]);
        let mut lsig = LogicSig::new(b"#pragma version 2\nint 1\nreturn\n".to_vec(), vec![]);
        lsig.sign(addr, &kp);
        assert!(lsig.verify(&impostor).is_err());
    }

    #[test]
    fn contract_mode_matches_hash_derived_address() {
        let program = b"#pragma version 2\nint 1\nreturn\n".to_vec();
        let addr = LogicSig::contract_address(&program);
        let lsig = LogicSig { program, args: vec![], auth: LogicSigAuth::Contract };
        assert!(lsig.verify(&addr).is_ok());
    }

    #[test]
    fn multisig_requires_threshold_valid_signatures() {
        let kp1 = keypair();
        let kp2 = keypair();
        let kp3 = keypair();
        let addrs = vec![
            Address::new(kp1.public.to_bytes()),
            Address::new(kp2.public.to_bytes()),
            Address::new(kp3.public.to_bytes()),
        ];
        let group_addr = LogicSig::multisig_address(&addrs, 2);
        let mut lsig = LogicSig::new(b"#pragma version 2\nint 1\nreturn\n".to_vec(), vec![]);
        lsig.sign_multisig(addrs.clone(), 2, 0, &kp1);
        assert!(lsig.verify(&group_addr).is_err());
        lsig.sign_multisig(addrs.clone(), 2, 1, &kp2);
        assert!(lsig.verify(&group_addr).is_ok());
    }

    #[test]
    fn multisig_rejects_submitter_not_matching_group_address() {
        let kp1 = keypair();
        let kp2 = keypair();
        let kp3 = keypair();
        let addrs = vec![
            Address::new(kp1.public.to_bytes()),
            Address::new(kp2.public.to_bytes()),
            Address::new(kp3.public.to_bytes()),
        ];
        let mut lsig = LogicSig::new(b"#pragma version 2\nint 1\nreturn\n".to_vec(), vec![]);
        lsig.sign_multisig(addrs.clone(), 2, 0, &kp1);
        lsig.sign_multisig(addrs.clone(), 2, 1, &kp2);
        assert!(lsig.verify(&Address::ZERO).is_err());
    }
}
