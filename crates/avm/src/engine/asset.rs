use log::trace;
use state::{AssetHolding, MinBalanceParams, WorldState};
use state::AssetDefinition as AssetDef;
use types::{Address, AssetParamsFields, EncodedTxn, ExecError, RResult, RuntimeError};

use crate::global::Config;
use super::require_min_balance;

/// `acfg` with `ConfigAsset == 0`: creates a new asset owned by the
/// sender, who is automatically opted in holding the full supply.
pub fn create_asset(world: &mut WorldState, txn: &EncodedTxn) -> RResult<u64> {
    let created_count = world.get_account(&txn.sender).map(|a| a.created_assets.len()).unwrap_or(0);
    if created_count >= Config::MAX_CREATED_ASSETS {
        return Err(ExecError::from(RuntimeError::SchemaExceeded(
            "account already owns the maximum number of created assets".to_string(),
        )));
    }

    let asset_id = world.next_asset_id();
    let params = txn.asset_params.clone();
    let default_frozen = params.default_frozen;
    let total = params.total;
    world.insert_asset(AssetDef {
        asset_id,
        creator: txn.sender,
        params,
    });
    let creator = world.get_account_mut(&txn.sender);
    creator.created_assets.insert(asset_id);
    creator.assets.insert(asset_id, AssetHolding { amount: total, frozen: default_frozen });
    trace!("created asset {} owned by {}", asset_id, txn.sender);
    Ok(asset_id)
}

/// True when `params` carries no configuration at all — the convention
/// this engine uses to recognize a destroy request riding on an `acfg`
/// transaction that only names `ConfigAsset`.
fn is_empty_params(params: &AssetParamsFields) -> bool {
    params.total == 0
        && params.decimals == 0
        && !params.default_frozen
        && params.unit_name.is_empty()
        && params.asset_name.is_empty()
        && params.url.is_empty()
        && params.metadata_hash == [0u8; 32]
        && params.manager.is_zero()
        && params.reserve.is_zero()
        && params.freeze.is_zero()
        && params.clawback.is_zero()
}

/// `acfg` with `ConfigAsset != 0`: either `ModifyAsset` (role-address
/// update) or `DestroyAsset` (empty params convention), both requiring
/// the sender to be the current manager.
pub fn modify_asset(world: &mut WorldState, txn: &EncodedTxn) -> RResult<()> {
    let asset_id = txn.config_asset;
    if is_empty_params(&txn.asset_params) {
        return destroy_asset(world, txn);
    }

    let asset = world
        .get_asset(asset_id)
        .ok_or(RuntimeError::AssetNotFound(asset_id))?
        .clone();
    if !asset.manager_is(&txn.sender) {
        return Err(ExecError::from(RuntimeError::ManagerError(asset_id)));
    }

    check_role_not_locked_blank(&asset.params.manager, &txn.asset_params.manager)?;
    check_role_not_locked_blank(&asset.params.reserve, &txn.asset_params.reserve)?;
    check_role_not_locked_blank(&asset.params.freeze, &txn.asset_params.freeze)?;
    check_role_not_locked_blank(&asset.params.clawback, &txn.asset_params.clawback)?;

    let stored = world.get_asset_mut(asset_id).ok_or(RuntimeError::AssetNotFound(asset_id))?;
    stored.params.manager = txn.asset_params.manager;
    stored.params.reserve = txn.asset_params.reserve;
    stored.params.freeze = txn.asset_params.freeze;
    stored.params.clawback = txn.asset_params.clawback;
    Ok(())
}

fn check_role_not_locked_blank(current: &Address, new: &Address) -> RResult<()> {
    if !current.is_zero() && new.is_zero() {
        return Err(ExecError::from(RuntimeError::AssetRoleLockedBlank));
    }
    Ok(())
}

/// `DestroyAsset`: sender must be manager and must hold the entire
/// supply.
fn destroy_asset(world: &mut WorldState, txn: &EncodedTxn) -> RResult<()> {
    let asset_id = txn.config_asset;
    let asset = world
        .get_asset(asset_id)
        .ok_or(RuntimeError::AssetNotFound(asset_id))?
        .clone();
    if !asset.manager_is(&txn.sender) {
        return Err(ExecError::from(RuntimeError::ManagerError(asset_id)));
    }
    let creator_holds = world
        .get_account(&asset.creator)
        .and_then(|a| a.assets.get(&asset_id))
        .map(|h| h.amount)
        .unwrap_or(0);
    if creator_holds != asset.params.total {
        return Err(ExecError::from(RuntimeError::AssetSupplyNotHeldByCreator));
    }
    world.get_account_mut(&asset.creator).assets.remove(&asset_id);
    world.get_account_mut(&asset.creator).created_assets.remove(&asset_id);
    world.remove_asset(asset_id);
    Ok(())
}

/// `axfer`: a zero-amount self-transfer is the opt-in convention; a
/// transaction with `AssetSender` set is a clawback (`RevokeAsset`),
/// requiring the sender to hold the clawback role; otherwise a regular
/// transfer debiting `txn.sender`.
pub fn transfer_asset(
    world: &mut WorldState,
    min_balance_params: &MinBalanceParams,
    txn: &EncodedTxn,
) -> RResult<()> {
    let asset_id = txn.xfer_asset;
    world.get_asset(asset_id).ok_or(RuntimeError::AssetNotFound(asset_id))?;

    if txn.sender == txn.receiver && txn.asset_amount == 0 && txn.asset_sender.is_zero() {
        return opt_in_asset(world, min_balance_params, asset_id, &txn.sender);
    }

    let is_clawback = !txn.asset_sender.is_zero();
    let from = if is_clawback { txn.asset_sender } else { txn.sender };
    let to = txn.asset_receiver;

    if is_clawback {
        let asset = world.get_asset(asset_id).ok_or(RuntimeError::AssetNotFound(asset_id))?;
        if !asset.clawback_role_is(&txn.sender) {
            return Err(ExecError::from(RuntimeError::ClawbackError(asset_id)));
        }
    }

    debit_and_credit(world, asset_id, &from, &to, txn.asset_amount, is_clawback)?;

    if !txn.asset_close_to.is_zero() && !is_clawback {
        close_out_asset_holding(world, asset_id, &from, &txn.asset_close_to)?;
    }

    Ok(())
}

fn opt_in_asset(
    world: &mut WorldState,
    min_balance_params: &MinBalanceParams,
    asset_id: u64,
    addr: &Address,
) -> RResult<()> {
    let acc = world.get_account(addr);
    if acc.map(|a| a.is_opted_in_asset(asset_id)).unwrap_or(false) {
        return Err(ExecError::from(RuntimeError::AlreadyOptedIn(asset_id)));
    }
    let default_frozen = world
        .get_asset(asset_id)
        .map(|a| a.params.default_frozen)
        .unwrap_or(false);
    world
        .get_account_mut(addr)
        .assets
        .insert(asset_id, AssetHolding { amount: 0, frozen: default_frozen });
    require_min_balance(world, min_balance_params, addr)
}

fn debit_and_credit(
    world: &mut WorldState,
    asset_id: u64,
    from: &Address,
    to: &Address,
    amount: u64,
    skip_frozen_check: bool,
) -> RResult<()> {
    {
        let from_acc = world.get_account(from).ok_or_else(|| {
            ExecError::from(RuntimeError::AccountDoesNotExist(from.to_string()))
        })?;
        let holding = from_acc.assets.get(&asset_id).ok_or(RuntimeError::AsaNotOptin(asset_id))?;
        if !skip_frozen_check && holding.frozen {
            return Err(ExecError::from(RuntimeError::AccountAssetFrozen(asset_id)));
        }
        if holding.amount < amount {
            return Err(ExecError::from(RuntimeError::InsufficientAccountAssets));
        }
    }
    {
        let to_acc = world.get_account(to).ok_or_else(|| {
            ExecError::from(RuntimeError::AccountDoesNotExist(to.to_string()))
        })?;
        let holding = to_acc.assets.get(&asset_id).ok_or(RuntimeError::AsaNotOptin(asset_id))?;
        if !skip_frozen_check && holding.frozen {
            return Err(ExecError::from(RuntimeError::AccountAssetFrozen(asset_id)));
        }
    }

    world.get_account_mut(from).assets.get_mut(&asset_id).unwrap().amount -= amount;
    world.get_account_mut(to).assets.get_mut(&asset_id).unwrap().amount += amount;
    Ok(())
}

fn close_out_asset_holding(
    world: &mut WorldState,
    asset_id: u64,
    from: &Address,
    close_to: &Address,
) -> RResult<()> {
    let remaining = world
        .get_account(from)
        .and_then(|a| a.assets.get(&asset_id))
        .map(|h| h.amount)
        .unwrap_or(0);
    {
        let close_acc = world.get_account(close_to).ok_or_else(|| {
            ExecError::from(RuntimeError::AccountDoesNotExist(close_to.to_string()))
        })?;
        close_acc.assets.get(&asset_id).ok_or(RuntimeError::AsaNotOptin(asset_id))?;
    }
    world.get_account_mut(close_to).assets.get_mut(&asset_id).unwrap().amount += remaining;
    world.get_account_mut(from).assets.remove(&asset_id);
    Ok(())
}

/// `afrz`: sender must hold the freeze role.
pub fn freeze_asset(world: &mut WorldState, txn: &EncodedTxn) -> RResult<()> {
    let asset_id = txn.freeze_asset;
    let asset = world.get_asset(asset_id).ok_or(RuntimeError::AssetNotFound(asset_id))?;
    if !asset.freeze_role_is(&txn.sender) {
        return Err(ExecError::from(RuntimeError::FreezeError(asset_id)));
    }
    let acc = world.get_account_mut(&txn.freeze_account);
    let holding = acc.assets.get_mut(&asset_id).ok_or(RuntimeError::AsaNotOptin(asset_id))?;
    holding.frozen = txn.asset_frozen;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acfg(sender: Address, total: u64, manager: Address, clawback: Address) -> EncodedTxn {
        let mut t = EncodedTxn::default();
        t.sender = sender;
        t.asset_params.total = total;
        t.asset_params.manager = manager;
        t.asset_params.clawback = clawback;
        t
    }

    #[test]
    fn create_asset_credits_creator_with_full_supply() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let id = create_asset(&mut world, &acfg(a, 1000, a, a)).unwrap();
        assert_eq!(world.get_account(&a).unwrap().assets.get(&id).unwrap().amount, 1000);
    }

    #[test]
    fn opt_in_then_transfer_moves_balance() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        let id = create_asset(&mut world, &acfg(a, 1000, a, a)).unwrap();
        let params = MinBalanceParams::default();
        let mut opt_in = EncodedTxn::default();
        opt_in.sender = b;
        opt_in.receiver = b;
        opt_in.xfer_asset = id;
        transfer_asset(&mut world, &params, &opt_in).unwrap();

        let mut xfer = EncodedTxn::default();
        xfer.sender = a;
        xfer.xfer_asset = id;
        xfer.asset_amount = 100;
        xfer.asset_receiver = b;
        transfer_asset(&mut world, &params, &xfer).unwrap();

        assert_eq!(world.get_account(&a).unwrap().assets.get(&id).unwrap().amount, 900);
        assert_eq!(world.get_account(&b).unwrap().assets.get(&id).unwrap().amount, 100);
    }

    #[test]
    fn frozen_holding_rejects_transfer() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        let id = create_asset(&mut world, &acfg(a, 1000, a, a)).unwrap();
        let params = MinBalanceParams::default();
        let mut opt_in = EncodedTxn::default();
        opt_in.sender = b;
        opt_in.receiver = b;
        opt_in.xfer_asset = id;
        transfer_asset(&mut world, &params, &opt_in).unwrap();

        let mut freeze = EncodedTxn::default();
        freeze.sender = a;
        freeze.freeze_asset = id;
        freeze.freeze_account = a;
        freeze.asset_frozen = true;
        freeze_asset(&mut world, &freeze).unwrap();

        let mut xfer = EncodedTxn::default();
        xfer.sender = a;
        xfer.xfer_asset = id;
        xfer.asset_amount = 10;
        xfer.asset_receiver = b;
        assert!(transfer_asset(&mut world, &params, &xfer).is_err());
    }

    #[test]
    fn revoke_moves_from_asset_sender_ignoring_frozen() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        let id = create_asset(&mut world, &acfg(a, 1000, a, a)).unwrap();
        let params = MinBalanceParams::default();
        let mut opt_in = EncodedTxn::default();
        opt_in.sender = b;
        opt_in.receiver = b;
        opt_in.xfer_asset = id;
        transfer_asset(&mut world, &params, &opt_in).unwrap();

        let mut xfer = EncodedTxn::default();
        xfer.sender = a;
        xfer.xfer_asset = id;
        xfer.asset_amount = 100;
        xfer.asset_receiver = b;
        transfer_asset(&mut world, &params, &xfer).unwrap();

        let mut revoke = EncodedTxn::default();
        revoke.sender = a;
        revoke.xfer_asset = id;
        revoke.asset_amount = 15;
        revoke.asset_sender = b;
        revoke.asset_receiver = a;
        transfer_asset(&mut world, &params, &revoke).unwrap();

        assert_eq!(world.get_account(&a).unwrap().assets.get(&id).unwrap().amount, 915);
        assert_eq!(world.get_account(&b).unwrap().assets.get(&id).unwrap().amount, 85);
    }
}
