pub mod app;
pub mod asset;
pub mod payment;

use log::{debug, trace, warn};
use state::{MinBalanceParams, WorldState};
use types::{Bytes, ExecError, RResult, RuntimeError, TxnType};
use vm::{assemble, ExecMode, GroupContext, Interpreter};

use crate::global::Config;
use crate::group::assign_group_id;
use crate::params::SignedTxn;

/// What a single transaction produced, beyond the world-state mutation
/// itself: the new id when it created an application or asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxnReceipt {
    pub created_app_id: Option<u64>,
    pub created_asset_id: Option<u64>,
}

/// Per-transaction extra program arguments passed to a stateful app call,
/// indexed the same way as the submitted group.
pub type ProgramArgs = Vec<Bytes>;

/// Owns the canonical world state and the injectable clock/fee
/// parameters, and drives atomic transaction-group execution.
///
/// EDUCATIONAL PURPOSE: this is the top-level orchestrator a caller
/// actually talks to — it plays the same role this runtime's own
/// `vm::Interpreter` plays for a single program, but one level up: one
/// `execute_tx` call drives an entire group of transactions, each
/// possibly running its own program, rather than a single CPU run.
///
/// REAL-WORLD COMPARISON: production ledgers commit a block's worth of
/// groups this way, just with many more groups per call and a
/// consensus layer deciding ordering; this engine processes exactly
/// the one group it's handed, with ordering decided entirely by the
/// caller.
pub struct ExecutionEngine {
    pub world: WorldState,
    pub round: u64,
    pub latest_timestamp: u64,
    pub min_txn_fee: u64,
    pub min_balance_params: MinBalanceParams,
}

impl ExecutionEngine {
    pub fn new(world: WorldState) -> Self {
        Self {
            world,
            round: 0,
            latest_timestamp: 0,
            min_txn_fee: Config::MIN_TXN_FEE,
            min_balance_params: MinBalanceParams::default(),
        }
    }

    /// Executes one atomic group of signed transactions against the
    /// canonical world state, applying the four commit steps below. On
    /// any failure the canonical state is left untouched and the error
    /// that aborted the group is returned; on success it is replaced by
    /// the transient context that absorbed every mutation.
    ///
    /// COMMIT PROTOCOL: group-id assignment, then preflight (signature
    /// and logic-sig checks for every member), then fee deduction for
    /// every sender in declared order, then per-transaction dispatch,
    /// then commit. EDUCATIONAL: this is "all-or-nothing" in the same
    /// sense a database transaction is — nothing the group did is
    /// visible to a later call unless every member of the group
    /// succeeded.
    pub fn execute_tx(
        &mut self,
        mut signed: Vec<SignedTxn>,
        program_args: Option<Vec<ProgramArgs>>,
    ) -> RResult<Vec<TxnReceipt>> {
        if signed.len() > Config::MAX_GROUP_SIZE {
            return Err(ExecError::from(RuntimeError::GroupSizeExceeded(signed.len())));
        }

        let mut txns: Vec<_> = signed.iter().map(|s| s.txn.clone()).collect();
        assign_group_id(&mut txns);
        for (s, t) in signed.iter_mut().zip(txns.iter()) {
            s.txn.group = t.group;
        }

        self.preflight(&signed)?;

        let mut transient = self.world.clone();
        let mut receipts = Vec::with_capacity(signed.len());

        for (i, entry) in signed.iter().enumerate() {
            debug!("executing txn {} of group ({:?})", i, entry.txn.txn_type);
            self.deduct_fee(&mut transient, &entry.txn)?;
        }

        for (i, entry) in signed.iter().enumerate() {
            let args = program_args
                .as_ref()
                .and_then(|v| v.get(i))
                .cloned()
                .unwrap_or_default();
            let receipt = self.dispatch(&mut transient, &txns, i, &entry.txn, &args)?;
            receipts.push(receipt);
        }

        self.world = transient;
        Ok(receipts)
    }

    /// Preflight: every sender resolves, signing is unambiguous, and
    /// whichever authorization is attached actually validates.
    fn preflight(&self, signed: &[SignedTxn]) -> RResult<()> {
        for entry in signed {
            match (&entry.secret_key_signer, &entry.logic_sig) {
                (Some(_), Some(_)) => {
                    return Err(ExecError::from(RuntimeError::AmbiguousSigning));
                }
                (Some(signer), None) => {
                    if *signer != entry.txn.sender {
                        return Err(ExecError::from(RuntimeError::InvalidTransactionParams(
                            "secret-key signer does not match sender".to_string(),
                        )));
                    }
                }
                (None, Some(lsig)) => {
                    lsig.verify(&entry.txn.sender)?;
                    self.run_logic_sig(lsig, &entry.txn)?;
                }
                (None, None) => {
                    return Err(ExecError::from(RuntimeError::LogicSignatureNotFound));
                }
            }
        }
        Ok(())
    }

    fn run_logic_sig(
        &self,
        lsig: &crate::logicsig::LogicSig,
        txn: &types::EncodedTxn,
    ) -> RResult<()> {
        let source = lsig.program.clone();
        let program = assemble(std::str::from_utf8(&source).map_err(|_| {
            ExecError::from(RuntimeError::InvalidTransactionParams(
                "logic-signature program is not valid UTF-8".to_string(),
            ))
        })?)?;
        let mut interp = Interpreter::new(program, &source, Config::STATELESS_BUDGET);
        let single = [txn.clone()];
        let mut world = self.world.clone();
        let mut gctx = GroupContext {
            txns: &single,
            group_index: 0,
            world: &mut world,
            mode: ExecMode::Stateless,
            current_app_id: 0,
            round: self.round,
            latest_timestamp: self.latest_timestamp,
            min_txn_fee: self.min_txn_fee,
            min_balance_params: self.min_balance_params.clone(),
        };
        interp.run(&mut gctx).map_err(|e| {
            trace!("logic signature rejected: {}", e);
            ExecError::from(RuntimeError::RejectedByLogic).with_context(e.to_string())
        })
    }

    /// Fees are deducted for every transaction in declared order before
    /// any payload executes.
    fn deduct_fee(&self, world: &mut WorldState, txn: &types::EncodedTxn) -> RResult<()> {
        let acc = world.get_account_mut(&txn.sender);
        let new_balance = acc.balance.checked_sub(txn.fee).ok_or_else(|| {
            ExecError::from(RuntimeError::InsufficientAccountBalance)
        })?;
        acc.balance = new_balance;
        require_min_balance(world, &self.min_balance_params, &txn.sender)?;
        Ok(())
    }

    /// Dispatches on transaction kind, delegating to the
    /// `payment`/`asset`/`app` submodules.
    fn dispatch(
        &mut self,
        world: &mut WorldState,
        txns: &[types::EncodedTxn],
        index: usize,
        txn: &types::EncodedTxn,
        program_args: &[Bytes],
    ) -> RResult<TxnReceipt> {
        match txn.txn_type {
            TxnType::Pay => {
                payment::transfer_algo(world, &self.min_balance_params, txn)?;
                Ok(TxnReceipt::default())
            }
            TxnType::KeyReg => {
                warn!("keyreg txn accepted as a no-op (consensus participation out of scope)");
                Ok(TxnReceipt::default())
            }
            TxnType::AssetConfig => {
                if txn.config_asset == 0 {
                    let id = asset::create_asset(world, txn)?;
                    Ok(TxnReceipt { created_asset_id: Some(id), ..Default::default() })
                } else {
                    asset::modify_asset(world, txn)?;
                    Ok(TxnReceipt::default())
                }
            }
            TxnType::AssetTransfer => {
                asset::transfer_asset(world, &self.min_balance_params, txn)?;
                Ok(TxnReceipt::default())
            }
            TxnType::AssetFreeze => {
                asset::freeze_asset(world, txn)?;
                Ok(TxnReceipt::default())
            }
            TxnType::AppCall => {
                let ctx = app::AppCallCtx {
                    world,
                    txns,
                    group_index: index,
                    round: self.round,
                    latest_timestamp: self.latest_timestamp,
                    min_txn_fee: self.min_txn_fee,
                    min_balance_params: &self.min_balance_params,
                    program_args,
                };
                match txn.app_id {
                    0 => {
                        let id = app::create_app(ctx, txn)?;
                        Ok(TxnReceipt { created_app_id: Some(id), ..Default::default() })
                    }
                    _ => {
                        app::dispatch_call(ctx, txn)?;
                        Ok(TxnReceipt::default())
                    }
                }
            }
        }
    }
}

/// Rejects with `MinBalanceViolation` if `addr`'s balance is below its
/// required reserve. Schema totals are summed across every app the
/// account created (global schema) and every app it is opted into
/// (local schema).
pub(crate) fn require_min_balance(
    world: &WorldState,
    params: &MinBalanceParams,
    addr: &types::Address,
) -> RResult<()> {
    let Some(acc) = world.get_account(addr) else {
        return Ok(());
    };
    let mut schema_uints = 0u64;
    let mut schema_bytes = 0u64;
    for app_id in &acc.created_apps {
        if let Some(app) = world.get_app(*app_id) {
            schema_uints += app.global_schema.num_uint;
            schema_bytes += app.global_schema.num_byte_slice;
        }
    }
    for app_id in acc.apps_local_state.keys() {
        if let Some(app) = world.get_app(*app_id) {
            schema_uints += app.local_schema.num_uint;
            schema_bytes += app.local_schema.num_byte_slice;
        }
    }
    let required = acc.min_balance(params, (schema_uints, schema_bytes));
    let have = acc.balance as u128;
    if have < required {
        return Err(ExecError::from(RuntimeError::MinBalanceViolation { required, have }));
    }
    Ok(())
}

/// Classifies whether a completed-but-unsuccessful interpreter run
/// counts as "rejected by logic" (the program ran to termination and
/// concluded unfavorably) as opposed to a deeper engine/type/resource
/// error. Only the former gets `ClearSSC`'s special lifecycle-effect-
/// despite-rejection treatment.
pub(crate) fn is_logic_rejection(err: &ExecError) -> bool {
    matches!(
        &err.kind,
        RuntimeError::LogicRejection
            | RuntimeError::TealEncounteredErr
            | RuntimeError::FinalStackValueError
            | RuntimeError::FinalStackSizeError(_)
            | RuntimeError::RejectedByLogic
    )
}
