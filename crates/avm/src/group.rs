use sha2::{Digest, Sha256};
use types::EncodedTxn;

/// Computes the deterministic group identifier for a transaction group:
/// `sha256` over each transaction's encoding (with its own `grp` field
/// held at zero while hashing, since the field being assigned can't be
/// an input to its own computation). Every group of size > 1 gets a
/// computed `grp` before execution, unconditionally.
pub fn compute_group_id(txns: &[EncodedTxn]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for txn in txns {
        hasher.update(encode_for_grouping(txn));
    }
    hasher.finalize().into()
}

/// Stamps `grp` on every transaction in `txns` when the group has more
/// than one member; single transactions are left with a zero `grp`.
pub fn assign_group_id(txns: &mut [EncodedTxn]) {
    if txns.len() > 1 {
        let gid = compute_group_id(txns);
        for txn in txns.iter_mut() {
            txn.group = gid;
        }
    }
}

/// A minimal canonical byte encoding of the fields that make a
/// transaction unique for grouping purposes. Not a wire format — just
/// stable input to the group-id hash.
fn encode_for_grouping(txn: &EncodedTxn) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(txn.txn_type.short_code().as_bytes());
    buf.extend_from_slice(&txn.sender.to_bytes());
    buf.extend_from_slice(&txn.fee.to_be_bytes());
    buf.extend_from_slice(&txn.first_valid.to_be_bytes());
    buf.extend_from_slice(&txn.last_valid.to_be_bytes());
    buf.extend_from_slice(txn.note.as_slice());
    buf.extend_from_slice(&txn.lease);
    buf.extend_from_slice(&txn.receiver.to_bytes());
    buf.extend_from_slice(&txn.amount.to_be_bytes());
    buf.extend_from_slice(&txn.config_asset.to_be_bytes());
    buf.extend_from_slice(&txn.xfer_asset.to_be_bytes());
    buf.extend_from_slice(&txn.asset_amount.to_be_bytes());
    buf.extend_from_slice(&txn.freeze_asset.to_be_bytes());
    buf.extend_from_slice(&txn.app_id.to_be_bytes());
    for arg in &txn.app_args {
        buf.extend_from_slice(arg.as_slice());
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_txn_group_gets_no_group_id() {
        let mut txns = vec![EncodedTxn::default()];
        assign_group_id(&mut txns);
        assert_eq!(txns[0].group, [0u8; 32]);
    }

    #[test]
    fn multi_txn_group_gets_shared_nonzero_group_id() {
        let mut a = EncodedTxn::default();
        a.amount = 1;
        let mut b = EncodedTxn::default();
        b.amount = 2;
        let mut txns = vec![a, b];
        assign_group_id(&mut txns);
        assert_ne!(txns[0].group, [0u8; 32]);
        assert_eq!(txns[0].group, txns[1].group);
    }

    #[test]
    fn different_groups_hash_differently() {
        let mut txns_a = vec![EncodedTxn::default(), EncodedTxn::default()];
        txns_a[1].amount = 5;
        let mut txns_b = vec![EncodedTxn::default(), EncodedTxn::default()];
        txns_b[1].amount = 6;
        assign_group_id(&mut txns_a);
        assign_group_id(&mut txns_b);
        assert_ne!(txns_a[0].group, txns_b[0].group);
    }
}
