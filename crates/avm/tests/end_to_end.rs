use avm::{LogicSig, Runtime, SignedTxn};
use ed25519_dalek::Keypair;
use rand::rngs::OsRng;
use types::{Address, AssetParamsFields, EncodedTxn, OnComplete, TxnType};

fn addr(byte: u8) -> Address {
    Address::new([byte; 32])
}

const ALWAYS_ACCEPT: &str = "#pragma version 2\nint 1\nreturn\n";
const ALWAYS_REJECT: &str = "#pragma version 2\nint 0\nreturn\n";

fn pay(sender: Address, receiver: Address, amount: u64, fee: u64) -> EncodedTxn {
    EncodedTxn { txn_type: TxnType::Pay, sender, receiver, amount, fee, ..EncodedTxn::default() }
}

/// A plain Algo transfer moves balance, and a
/// logic-signature-authorized transfer whose program rejects is refused
/// without mutating either balance.
#[test]
fn algo_transfer_accept_and_reject_by_logic() {
    let a = addr(1);
    let b = addr(2);
    let mut rt = Runtime::new([(a, 1_000_000u64), (b, 1_000_000u64)]);

    rt.execute_tx(vec![SignedTxn::by_secret_key(pay(a, b, 1_000, 1_000))], None).unwrap();
    assert_eq!(rt.get_account(&a).unwrap().balance, 1_000_000 - 2_000);
    assert_eq!(rt.get_account(&b).unwrap().balance, 1_000_000 + 1_000);

    let lsig = rt.get_logic_sig(ALWAYS_REJECT, vec![]).unwrap();
    let txn = pay(a, b, 5_000, 1_000);
    let err = rt.execute_tx(vec![SignedTxn::by_logic_sig(txn, lsig)], None).unwrap_err();
    assert!(format!("{err}").len() > 0);
    assert_eq!(rt.get_account(&a).unwrap().balance, 1_000_000 - 2_000);
}

/// Creates an asset, opt a second account in,
/// transfer, freeze, then revoke (clawback) past the freeze.
#[test]
fn asset_lifecycle_create_optin_transfer_freeze_revoke() {
    let creator = addr(1);
    let holder = addr(2);
    let mut rt = Runtime::new([(creator, 1_000_000u64), (holder, 1_000_000u64)]);

    let mut params = AssetParamsFields::default();
    params.total = 1_000;
    params.manager = creator;
    params.clawback = creator;
    params.freeze = creator;
    let asset_id = rt.create_asset(creator, params, 1_000).unwrap();
    assert_eq!(rt.get_asset_holding(asset_id, &creator).unwrap().amount, 1_000);

    rt.opt_in_to_asa(asset_id, holder, 1_000).unwrap();

    let xfer = EncodedTxn {
        txn_type: TxnType::AssetTransfer,
        sender: creator,
        fee: 1_000,
        xfer_asset: asset_id,
        asset_amount: 100,
        asset_receiver: holder,
        ..EncodedTxn::default()
    };
    rt.execute_tx(vec![SignedTxn::by_secret_key(xfer)], None).unwrap();
    assert_eq!(rt.get_asset_holding(asset_id, &holder).unwrap().amount, 100);

    rt.freeze_asset(creator, asset_id, holder, true, 1_000).unwrap();
    let blocked = EncodedTxn {
        txn_type: TxnType::AssetTransfer,
        sender: holder,
        fee: 1_000,
        xfer_asset: asset_id,
        asset_amount: 10,
        asset_receiver: creator,
        ..EncodedTxn::default()
    };
    assert!(rt.execute_tx(vec![SignedTxn::by_secret_key(blocked)], None).is_err());

    rt.revoke_asset(creator, asset_id, holder, 15, 1_000).unwrap();
    assert_eq!(rt.get_asset_holding(asset_id, &holder).unwrap().amount, 85);
    assert_eq!(rt.get_asset_holding(asset_id, &creator).unwrap().amount, 1_000 - 100 + 15);
}

/// Creates an app, opt in, call it, update its
/// programs, then delete it.
#[test]
fn app_lifecycle_create_optin_call_update_delete() {
    let creator = addr(1);
    let caller = addr(2);
    let mut rt = Runtime::new([(creator, 1_000_000u64), (caller, 1_000_000u64)]);

    let app_id = rt
        .add_app(creator, 1_000, (0, 0), (1, 0), ALWAYS_ACCEPT, ALWAYS_ACCEPT, vec![], vec![], vec![], vec![])
        .unwrap();
    assert!(rt.get_app(app_id).is_some());

    rt.opt_in_to_app(caller, app_id, 1_000).unwrap();
    assert!(rt.get_account(&caller).unwrap().is_opted_in_app(app_id));

    let call = EncodedTxn {
        txn_type: TxnType::AppCall,
        sender: caller,
        fee: 1_000,
        app_id,
        on_complete: OnComplete::NoOp,
        ..EncodedTxn::default()
    };
    rt.execute_tx(vec![SignedTxn::by_secret_key(call)], None).unwrap();

    rt.update_app(creator, app_id, ALWAYS_ACCEPT, ALWAYS_REJECT, 1_000).unwrap();
    rt.delete_app(creator, app_id, 1_000).unwrap();
    assert!(rt.get_app(app_id).is_none());
}

/// `ClearSSC` removes the account's local
/// state and is accepted even though the clear program itself rejects.
#[test]
fn clear_state_accepts_despite_logic_rejection() {
    let creator = addr(1);
    let member = addr(2);
    let mut rt = Runtime::new([(creator, 1_000_000u64), (member, 1_000_000u64)]);

    let app_id = rt
        .add_app(creator, 1_000, (0, 0), (1, 0), ALWAYS_ACCEPT, ALWAYS_REJECT, vec![], vec![], vec![], vec![])
        .unwrap();
    rt.opt_in_to_app(member, app_id, 1_000).unwrap();
    assert!(rt.get_account(&member).unwrap().is_opted_in_app(app_id));

    let clear = EncodedTxn {
        txn_type: TxnType::AppCall,
        sender: member,
        fee: 1_000,
        app_id,
        on_complete: OnComplete::ClearState,
        ..EncodedTxn::default()
    };
    rt.execute_tx(vec![SignedTxn::by_secret_key(clear)], None).unwrap();
    assert!(!rt.get_account(&member).unwrap().is_opted_in_app(app_id));
}

/// A group where one transaction fails leaves
/// neither transaction's effects applied.
#[test]
fn atomic_group_rolls_back_on_any_failure() {
    let a = addr(1);
    let b = addr(2);
    let c = addr(3);
    let mut rt = Runtime::new([(a, 1_000_000u64), (b, 1_000_000u64), (c, 0u64)]);

    let good = pay(a, b, 1_000, 1_000);
    let bad = pay(b, c, 10_000_000, 1_000); // exceeds b's balance
    let err = rt
        .execute_tx(
            vec![SignedTxn::by_secret_key(good), SignedTxn::by_secret_key(bad)],
            None,
        )
        .unwrap_err();
    assert!(format!("{err}").len() > 0);
    assert_eq!(rt.get_account(&a).unwrap().balance, 1_000_000);
    assert_eq!(rt.get_account(&b).unwrap().balance, 1_000_000);
    assert_eq!(rt.get_account(&c).map(|acc| acc.balance).unwrap_or(0), 0);
}

/// A delegated logic signature authorizes a
/// transfer when submitted by the signer, and is rejected when
/// submitted under a different sender address.
#[test]
fn logic_signature_delegation_accept_and_wrong_submitter_reject() {
    let kp = Keypair::generate(&mut OsRng);
    let signer = Address::new(kp.public.to_bytes());
    let receiver = addr(9);
    let mut rt = Runtime::new([(signer, 1_000_000u64), (receiver, 0u64)]);

    let mut lsig = LogicSig::new(ALWAYS_ACCEPT.as_bytes().to_vec(), vec![]);
    lsig.sign(signer, &kp);

    let good = pay(signer, receiver, 1_000, 1_000);
    rt.execute_tx(vec![SignedTxn::by_logic_sig(good, lsig.clone())], None).unwrap();
    assert_eq!(rt.get_account(&receiver).unwrap().balance, 1_000);

    let impostor = addr(42);
    let bad = pay(impostor, receiver, 1_000, 1_000);
    assert!(rt.execute_tx(vec![SignedTxn::by_logic_sig(bad, lsig)], None).is_err());
}
