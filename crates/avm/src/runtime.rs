use state::{Account, Application, AssetDefinition, AssetHolding, WorldState};
use types::{Address, AssetParamsFields, Bytes, EncodedTxn, OnComplete, RResult, TxnType, Value};
use vm::assemble;

use crate::engine::{ExecutionEngine, ProgramArgs, TxnReceipt};
use crate::logicsig::LogicSig;
use crate::params::SignedTxn;

/// Top-level orchestrator a caller drives: seeds accounts, submits
/// transactions/groups, and exposes read accessors over the resulting
/// world state.
pub struct Runtime {
    engine: ExecutionEngine,
}

impl Runtime {
    /// `runtime.new(accounts)`: seeds a fresh world state with the given
    /// starting balances.
    pub fn new(accounts: impl IntoIterator<Item = (Address, u64)>) -> Self {
        let mut world = WorldState::new();
        for (addr, balance) in accounts {
            world.get_account_mut(&addr).balance = balance;
        }
        Self { engine: ExecutionEngine::new(world) }
    }

    pub fn set_round(&mut self, round: u64) {
        self.engine.round = round;
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.engine.latest_timestamp = timestamp;
    }

    /// `runtime.create_asset(name, {creator})`: submits an `acfg` with
    /// `ConfigAsset == 0` and returns the freshly allocated asset id.
    pub fn create_asset(
        &mut self,
        creator: Address,
        params: AssetParamsFields,
        fee: u64,
    ) -> RResult<u64> {
        let mut txn = EncodedTxn { txn_type: TxnType::AssetConfig, sender: creator, fee, ..EncodedTxn::default() };
        txn.asset_params = params;
        let receipt = self.submit_single(txn)?;
        Ok(receipt.created_asset_id.expect("acfg create must report an asset id"))
    }

    /// `runtime.add_app(...)`: submits an `appl` with `ApplicationID == 0`
    /// and returns the freshly allocated app id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_app(
        &mut self,
        sender: Address,
        fee: u64,
        global_schema: (u64, u64),
        local_schema: (u64, u64),
        approval_src: &str,
        clear_src: &str,
        app_args: Vec<Bytes>,
        accounts: Vec<Address>,
        foreign_apps: Vec<u64>,
        foreign_assets: Vec<u64>,
    ) -> RResult<u64> {
        assemble(approval_src)?;
        assemble(clear_src)?;
        let txn = EncodedTxn {
            txn_type: TxnType::AppCall,
            sender,
            fee,
            app_id: 0,
            on_complete: OnComplete::NoOp,
            app_args,
            accounts,
            foreign_apps,
            foreign_assets,
            approval_program: approval_src.as_bytes().to_vec().into(),
            clear_state_program: clear_src.as_bytes().to_vec().into(),
            global_num_uint: global_schema.0,
            global_num_byte_slice: global_schema.1,
            local_num_uint: local_schema.0,
            local_num_byte_slice: local_schema.1,
            ..EncodedTxn::default()
        };
        let receipt = self.submit_single(txn)?;
        Ok(receipt.created_app_id.expect("appl create must report an app id"))
    }

    /// `runtime.opt_in_to_app(addr, app_id, ...)`.
    pub fn opt_in_to_app(&mut self, addr: Address, app_id: u64, fee: u64) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AppCall,
            sender: addr,
            fee,
            app_id,
            on_complete: OnComplete::OptIn,
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    /// `runtime.opt_in_to_asa(asset_id, addr, ...)`: the zero-amount
    /// self-transfer opt-in convention.
    pub fn opt_in_to_asa(&mut self, asset_id: u64, addr: Address, fee: u64) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AssetTransfer,
            sender: addr,
            fee,
            xfer_asset: asset_id,
            asset_amount: 0,
            asset_receiver: addr,
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    /// `runtime.update_app(...)`: runs the *currently stored* approval
    /// program to authorize swapping in the new programs.
    pub fn update_app(
        &mut self,
        sender: Address,
        app_id: u64,
        new_approval_src: &str,
        new_clear_src: &str,
        fee: u64,
    ) -> RResult<()> {
        assemble(new_approval_src)?;
        assemble(new_clear_src)?;
        let txn = EncodedTxn {
            txn_type: TxnType::AppCall,
            sender,
            fee,
            app_id,
            on_complete: OnComplete::UpdateApplication,
            approval_program: new_approval_src.as_bytes().to_vec().into(),
            clear_state_program: new_clear_src.as_bytes().to_vec().into(),
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    pub fn delete_app(&mut self, sender: Address, app_id: u64, fee: u64) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AppCall,
            sender,
            fee,
            app_id,
            on_complete: OnComplete::DeleteApplication,
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    /// `runtime.modify_asset(sender, asset_id, fields, ...)`.
    pub fn modify_asset(
        &mut self,
        sender: Address,
        asset_id: u64,
        new_roles: AssetParamsFields,
        fee: u64,
    ) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AssetConfig,
            sender,
            fee,
            config_asset: asset_id,
            asset_params: new_roles,
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    pub fn freeze_asset(
        &mut self,
        sender: Address,
        asset_id: u64,
        target: Address,
        frozen: bool,
        fee: u64,
    ) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AssetFreeze,
            sender,
            fee,
            freeze_asset: asset_id,
            freeze_account: target,
            asset_frozen: frozen,
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    /// `runtime.revoke_asset(sender, revoker, asset_id, target, amount, ...)`:
    /// `sender` doubles as the clawback-role signer and the destination
    /// of the clawed-back funds, folding the separate `sender` and
    /// `revoker` parameters into one since the engine requires `sender`
    /// to already equal the clawback role.
    pub fn revoke_asset(
        &mut self,
        sender: Address,
        asset_id: u64,
        target: Address,
        amount: u64,
        fee: u64,
    ) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AssetTransfer,
            sender,
            fee,
            xfer_asset: asset_id,
            asset_amount: amount,
            asset_sender: target,
            asset_receiver: sender,
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    pub fn destroy_asset(&mut self, sender: Address, asset_id: u64, fee: u64) -> RResult<()> {
        let txn = EncodedTxn {
            txn_type: TxnType::AssetConfig,
            sender,
            fee,
            config_asset: asset_id,
            asset_params: AssetParamsFields::default(),
            ..EncodedTxn::default()
        };
        self.submit_single(txn).map(|_| ())
    }

    /// `runtime.execute_tx(params | [params], program_args?)`: the
    /// central entry point, accepting either a single
    /// transaction or an atomic group.
    pub fn execute_tx(
        &mut self,
        group: Vec<SignedTxn>,
        program_args: Option<Vec<ProgramArgs>>,
    ) -> RResult<Vec<TxnReceipt>> {
        self.engine.execute_tx(group, program_args)
    }

    fn submit_single(&mut self, txn: EncodedTxn) -> RResult<TxnReceipt> {
        let mut receipts = self.engine.execute_tx(vec![SignedTxn::by_secret_key(txn)], None)?;
        Ok(receipts.remove(0))
    }

    /// `runtime.get_logic_sig(src, args)`.
    pub fn get_logic_sig(&self, src: &str, args: Vec<Bytes>) -> RResult<LogicSig> {
        assemble(src)?;
        Ok(LogicSig::new(src.as_bytes().to_vec(), args))
    }

    pub fn get_account(&self, addr: &Address) -> Option<&Account> {
        self.engine.world.get_account(addr)
    }

    pub fn get_app(&self, app_id: u64) -> Option<&Application> {
        self.engine.world.get_app(app_id)
    }

    pub fn get_asset_def(&self, asset_id: u64) -> Option<&AssetDefinition> {
        self.engine.world.get_asset(asset_id)
    }

    pub fn get_asset_holding(&self, asset_id: u64, addr: &Address) -> Option<&AssetHolding> {
        self.engine.world.get_account(addr)?.assets.get(&asset_id)
    }

    pub fn get_global_state(&self, app_id: u64, key: &[u8]) -> Option<&Value> {
        self.engine.world.get_app(app_id)?.global_state.get(key)
    }

    pub fn get_local_state(&self, app_id: u64, addr: &Address, key: &[u8]) -> Option<&Value> {
        self.engine
            .world
            .get_account(addr)?
            .apps_local_state
            .get(&app_id)?
            .key_value
            .get(key)
    }
}
