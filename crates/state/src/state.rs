use std::collections::BTreeMap;

use types::Address;

use crate::account::Account;
use crate::application::Application;
use crate::asset::AssetDefinition;

/// The full off-chain world state: every account, every application,
/// and every asset definition known to the engine.
///
/// EDUCATIONAL PURPOSE: this is the single source of truth the engine
/// executes against, the same role Ethereum's state trie or this
/// runtime's CPU register file plays for their respective machines —
/// everything a program can read or write lives here.
///
/// ATOMICITY: a transaction group executes against a cloned
/// `WorldState`; the clone is discarded on failure and swapped in on
/// success, giving the group atomic all-or-nothing semantics without
/// any bespoke undo log — `WorldState` is plain data, so `Clone` is the
/// entire rollback mechanism.
///
/// REAL-WORLD COMPARISON: production ledgers keep this in a Merkle
/// structure so individual balances can be proven without shipping the
/// whole state; this runtime keeps everything in a flat in-memory
/// `BTreeMap` instead, since proof generation is out of scope here.
#[derive(Clone, Debug, Default)]
pub struct WorldState {
    /// Every account ever touched, keyed by address.
    pub accounts: BTreeMap<Address, Account>,
    /// Every application created so far, keyed by its assigned id.
    pub apps: BTreeMap<u64, Application>,
    /// Every asset definition created so far, keyed by its assigned id.
    pub assets: BTreeMap<u64, AssetDefinition>,
    next_app_id: u64,
    next_asset_id: u64,
}

impl WorldState {
    /// Builds an empty world with no accounts, apps, or assets and id
    /// counters starting at 1 (id 0 is reserved to mean "create new").
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            apps: BTreeMap::new(),
            assets: BTreeMap::new(),
            next_app_id: 1,
            next_asset_id: 1,
        }
    }

    pub fn get_account(&self, addr: &Address) -> Option<&Account> {
        self.accounts.get(addr)
    }

    /// Looks up an account, lazily materializing a zero-valued one if
    /// this address has never been seen before.
    ///
    /// EDUCATIONAL: every address is implicitly a valid, empty account
    /// until something is written to it — there is no separate
    /// "account creation" step, matching how the protocol treats
    /// balances and opt-ins as just entries in this map rather than
    /// records that must be explicitly allocated first.
    pub fn get_account_mut(&mut self, addr: &Address) -> &mut Account {
        self.accounts.entry(*addr).or_insert_with(Account::new)
    }

    pub fn get_app(&self, app_id: u64) -> Option<&Application> {
        self.apps.get(&app_id)
    }

    pub fn get_app_mut(&mut self, app_id: u64) -> Option<&mut Application> {
        self.apps.get_mut(&app_id)
    }

    pub fn insert_app(&mut self, app: Application) {
        self.apps.insert(app.app_id, app);
    }

    pub fn remove_app(&mut self, app_id: u64) -> Option<Application> {
        self.apps.remove(&app_id)
    }

    pub fn get_asset(&self, asset_id: u64) -> Option<&AssetDefinition> {
        self.assets.get(&asset_id)
    }

    pub fn get_asset_mut(&mut self, asset_id: u64) -> Option<&mut AssetDefinition> {
        self.assets.get_mut(&asset_id)
    }

    pub fn insert_asset(&mut self, asset: AssetDefinition) {
        self.assets.insert(asset.asset_id, asset);
    }

    pub fn remove_asset(&mut self, asset_id: u64) -> Option<AssetDefinition> {
        self.assets.remove(&asset_id)
    }

    /// Allocates and reserves the next application id. Ids start at 1
    /// and never reuse a previously issued value within a process
    /// lifetime, matching the protocol's monotonic id assignment.
    pub fn next_app_id(&mut self) -> u64 {
        let id = self.next_app_id;
        self.next_app_id += 1;
        id
    }

    pub fn next_asset_id(&mut self) -> u64 {
        let id = self.next_asset_id;
        self.next_asset_id += 1;
        id
    }

    /// Prints a human-readable dump of every account, application, and
    /// asset in the world state. Intended for CLI / test diagnostics,
    /// not for any consensus-relevant path.
    pub fn pretty_print(&self) {
        println!("--- World State ---");
        for (addr, acc) in &self.accounts {
            println!("  🔑 {}", addr);
            println!("      balance: {}", acc.balance);
            for (id, holding) in &acc.assets {
                println!(
                    "      asset {}: amount={} frozen={}",
                    id, holding.amount, holding.frozen
                );
            }
            for (id, local) in &acc.apps_local_state {
                println!("      app {} local slots: {}", id, local.key_value.len());
            }
        }
        for (id, app) in &self.apps {
            println!(
                "  app {} creator={} global slots={}",
                id,
                app.creator,
                app.global_state.len()
            );
        }
        for (id, asset) in &self.assets {
            println!(
                "  asset {} creator={} total={}",
                id, asset.creator, asset.params.total
            );
        }
        println!("--------------------");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_account_lazily_materializes_as_empty() {
        let mut world = WorldState::new();
        let addr = Address::new([1u8; 32]);
        assert!(world.get_account(&addr).is_none());
        let acc = world.get_account_mut(&addr);
        assert!(acc.is_empty());
        assert!(world.get_account(&addr).is_some());
    }

    #[test]
    fn app_ids_are_monotonic_and_never_reused() {
        let mut world = WorldState::new();
        assert_eq!(world.next_app_id(), 1);
        assert_eq!(world.next_app_id(), 2);
    }

    #[test]
    fn clone_is_independent_of_the_original() {
        let mut world = WorldState::new();
        let addr = Address::new([2u8; 32]);
        world.get_account_mut(&addr).balance = 10;
        let mut snapshot = world.clone();
        snapshot.get_account_mut(&addr).balance = 99;
        assert_eq!(world.get_account(&addr).unwrap().balance, 10);
        assert_eq!(snapshot.get_account(&addr).unwrap().balance, 99);
    }
}
