use state::{Account, AssetHolding, WorldState};
use types::Address;

#[test]
fn fresh_world_state_has_no_accounts() {
    let world = WorldState::new();
    assert!(world.accounts.is_empty());
}

#[test]
fn account_opted_into_asset_reports_holding() {
    let mut world = WorldState::new();
    let addr = Address::new([0x11; 32]);
    let acc = world.get_account_mut(&addr);
    acc.assets.insert(7, AssetHolding { amount: 500, frozen: false });

    let acc: &Account = world.get_account(&addr).unwrap();
    assert!(acc.is_opted_in_asset(7));
    assert!(!acc.is_opted_in_asset(8));
    assert_eq!(acc.assets.get(&7).unwrap().amount, 500);
}

#[test]
fn cloned_world_state_is_a_deep_copy() {
    let mut world = WorldState::new();
    let addr = Address::new([0x22; 32]);
    world.get_account_mut(&addr).balance = 1_000;

    let mut branch = world.clone();
    branch.get_account_mut(&addr).balance = 2_000;

    assert_eq!(world.get_account(&addr).unwrap().balance, 1_000);
    assert_eq!(branch.get_account(&addr).unwrap().balance, 2_000);
}
