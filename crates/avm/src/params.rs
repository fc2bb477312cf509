use crate::logicsig::LogicSig;
use types::{Address, EncodedTxn};

/// A transaction paired with whatever authorization was attached to it.
/// Both fields can be populated at once; this type doesn't stop that,
/// it's pre-flight validation that rejects a transaction signed both ways.
#[derive(Debug, Clone)]
pub struct SignedTxn {
    pub txn: EncodedTxn,
    pub secret_key_signer: Option<Address>,
    pub logic_sig: Option<LogicSig>,
}

impl SignedTxn {
    pub fn by_secret_key(txn: EncodedTxn) -> Self {
        let signer = txn.sender;
        Self { txn, secret_key_signer: Some(signer), logic_sig: None }
    }

    pub fn by_logic_sig(txn: EncodedTxn, logic_sig: LogicSig) -> Self {
        Self { txn, secret_key_signer: None, logic_sig: Some(logic_sig) }
    }
}
