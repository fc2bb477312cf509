use log::trace;
use state::{MinBalanceParams, WorldState};
use types::{EncodedTxn, ExecError, RResult, RuntimeError};

use super::require_min_balance;

/// `TransferAlgo` debits `amount` from the sender,
/// credits the receiver, and — when `CloseRemainderTo` is set — sweeps
/// whatever balance remains in the sender to that account and zeroes it.
pub fn transfer_algo(
    world: &mut WorldState,
    min_balance_params: &MinBalanceParams,
    txn: &EncodedTxn,
) -> RResult<()> {
    {
        let sender = world.get_account_mut(&txn.sender);
        sender.balance = sender
            .balance
            .checked_sub(txn.amount)
            .ok_or_else(|| ExecError::from(RuntimeError::InsufficientAccountBalance))?;
    }
    {
        let receiver = world.get_account_mut(&txn.receiver);
        receiver.balance = receiver
            .balance
            .checked_add(txn.amount)
            .ok_or_else(|| ExecError::from(RuntimeError::Uint64Overflow))?;
    }

    if !txn.close_remainder_to.is_zero() {
        let remainder = world.get_account(&txn.sender).map(|a| a.balance).unwrap_or(0);
        {
            let close_to = world.get_account_mut(&txn.close_remainder_to);
            close_to.balance = close_to
                .balance
                .checked_add(remainder)
                .ok_or_else(|| ExecError::from(RuntimeError::Uint64Overflow))?;
        }
        world.get_account_mut(&txn.sender).balance = 0;
        trace!("closed remainder {} from {} to {}", remainder, txn.sender, txn.close_remainder_to);
        return Ok(());
    }

    require_min_balance(world, min_balance_params, &txn.sender)?;
    require_min_balance(world, min_balance_params, &txn.receiver)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Address;

    fn txn(sender: Address, receiver: Address, amount: u64) -> EncodedTxn {
        let mut t = EncodedTxn::default();
        t.sender = sender;
        t.receiver = receiver;
        t.amount = amount;
        t
    }

    #[test]
    fn transfer_moves_balance_both_ways() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        world.get_account_mut(&a).balance = 1000;
        world.get_account_mut(&b).balance = 500;
        let params = MinBalanceParams::default();
        transfer_algo(&mut world, &params, &txn(a, b, 100)).unwrap();
        assert_eq!(world.get_account(&a).unwrap().balance, 900);
        assert_eq!(world.get_account(&b).unwrap().balance, 600);
    }

    #[test]
    fn insufficient_balance_rejects() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        world.get_account_mut(&a).balance = 10;
        let params = MinBalanceParams::default();
        assert!(transfer_algo(&mut world, &params, &txn(a, b, 100)).is_err());
    }

    #[test]
    fn close_remainder_sweeps_and_zeroes_sender() {
        let mut world = WorldState::new();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        let c = Address::new([3u8; 32]);
        world.get_account_mut(&a).balance = 1000;
        let params = MinBalanceParams::default();
        let mut t = txn(a, b, 100);
        t.close_remainder_to = c;
        transfer_algo(&mut world, &params, &t).unwrap();
        assert_eq!(world.get_account(&a).unwrap().balance, 0);
        assert_eq!(world.get_account(&b).unwrap().balance, 100);
        assert_eq!(world.get_account(&c).unwrap().balance, 900);
    }
}
