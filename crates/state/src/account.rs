use std::collections::{BTreeMap, BTreeSet};

use types::Value;

/// An opted-in asset holding: the account's balance of that asset plus
/// whether it is currently frozen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetHolding {
    pub amount: u64,
    pub frozen: bool,
}

/// An account's local (per-app) key/value state, opted into one
/// application at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppLocalState {
    pub key_value: BTreeMap<Vec<u8>, Value>,
}

/// The minimum-balance schedule used to compute an account's required
/// reserve, overridable per `Runtime` instance.
#[derive(Clone, Debug)]
pub struct MinBalanceParams {
    pub base: u64,
    pub per_asset_holding: u64,
    pub per_app_opt_in: u64,
    pub per_created_app: u64,
    pub per_created_asset: u64,
    pub per_schema_uint: u64,
    pub per_schema_byte_slice: u64,
}

impl Default for MinBalanceParams {
    fn default() -> Self {
        Self {
            base: 100_000,
            per_asset_holding: 100_000,
            per_app_opt_in: 100_000,
            per_created_app: 100_000,
            per_created_asset: 100_000,
            per_schema_uint: 28_500,
            per_schema_byte_slice: 50_000,
        }
    }
}

/// A single account's balance, asset holdings, and application state.
///
/// Accounts are created lazily: any address referenced by a transaction
/// that has never held a balance or state gets a zero-valued `Account`
/// the first time it is looked up mutably.
#[derive(Clone, Debug, Default)]
pub struct Account {
    pub balance: u64,
    pub auth_addr: Option<types::Address>,
    pub assets: BTreeMap<u64, AssetHolding>,
    pub apps_local_state: BTreeMap<u64, AppLocalState>,
    pub created_apps: BTreeSet<u64>,
    pub created_assets: BTreeSet<u64>,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_opted_in_asset(&self, asset_id: u64) -> bool {
        self.assets.contains_key(&asset_id)
    }

    pub fn is_opted_in_app(&self, app_id: u64) -> bool {
        self.apps_local_state.contains_key(&app_id)
    }

    /// Required reserve in microunits: the base reserve plus one
    /// increment per opted-in asset, per opted-in app, per created
    /// asset, per created app, and per allocated schema slot.
    pub fn min_balance(
        &self,
        params: &MinBalanceParams,
        schema_totals: (u64, u64),
    ) -> u128 {
        let (schema_uints, schema_byte_slices) = schema_totals;
        let mut total = params.base as u128;
        total += params.per_asset_holding as u128 * self.assets.len() as u128;
        total += params.per_app_opt_in as u128 * self.apps_local_state.len() as u128;
        total += params.per_created_asset as u128 * self.created_assets.len() as u128;
        total += params.per_created_app as u128 * self.created_apps.len() as u128;
        total += params.per_schema_uint as u128 * schema_uints as u128;
        total += params.per_schema_byte_slice as u128 * schema_byte_slices as u128;
        total
    }

    pub fn is_empty(&self) -> bool {
        self.balance == 0
            && self.assets.is_empty()
            && self.apps_local_state.is_empty()
            && self.created_apps.is_empty()
            && self.created_assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account_has_base_reserve_only() {
        let acc = Account::new();
        let params = MinBalanceParams::default();
        assert_eq!(acc.min_balance(&params, (0, 0)), params.base as u128);
    }

    #[test]
    fn asset_holding_increases_reserve() {
        let mut acc = Account::new();
        acc.assets.insert(5, AssetHolding { amount: 10, frozen: false });
        let params = MinBalanceParams::default();
        assert_eq!(
            acc.min_balance(&params, (0, 0)),
            (params.base + params.per_asset_holding) as u128
        );
    }
}
