use log::{debug, trace};
use state::{AppLocalState, Application, MinBalanceParams, StateSchema, WorldState};
use types::{Bytes, EncodedTxn, ExecError, OnComplete, RResult, RuntimeError};
use vm::{assemble, ExecMode, GroupContext, Interpreter};

use crate::engine::{is_logic_rejection, require_min_balance};
use crate::global::Config;

/// Everything an app-call dispatch needs borrowed from the engine for
/// the duration of one transaction.
pub struct AppCallCtx<'a> {
    pub world: &'a mut WorldState,
    pub txns: &'a [EncodedTxn],
    pub group_index: usize,
    pub round: u64,
    pub latest_timestamp: u64,
    pub min_txn_fee: u64,
    pub min_balance_params: &'a MinBalanceParams,
    pub program_args: &'a [Bytes],
}

/// Assembles and runs `program` in stateful mode against the current
/// group, with `current_app_id` set for `CurrentApplicationID`,
/// `app_local_*`/`app_global_*`, and balance/asset opcodes.
fn run_program(ctx: &mut AppCallCtx, program: &[u8], app_id: u64) -> RResult<()> {
    let source = program.to_vec();
    let assembled = assemble(std::str::from_utf8(&source).map_err(|_| {
        ExecError::from(RuntimeError::InvalidTransactionParams(
            "app program is not valid UTF-8".to_string(),
        ))
    })?)?;
    let mut interp = Interpreter::new(assembled, &source, Config::STATEFUL_BUDGET);

    // `program-args` supplied via `execute_tx` override the
    // current transaction's `ApplicationArgs` for this run only, the way a
    // caller-supplied extra-args parameter would layer on top of whatever
    // the submitted transaction already carries.
    let mut effective_txns;
    let txns: &[EncodedTxn] = if ctx.program_args.is_empty() {
        ctx.txns
    } else {
        effective_txns = ctx.txns.to_vec();
        effective_txns[ctx.group_index].app_args = ctx.program_args.to_vec();
        &effective_txns
    };

    let mut gctx = GroupContext {
        txns,
        group_index: ctx.group_index,
        world: &mut *ctx.world,
        mode: ExecMode::Stateful,
        current_app_id: app_id,
        round: ctx.round,
        latest_timestamp: ctx.latest_timestamp,
        min_txn_fee: ctx.min_txn_fee,
        min_balance_params: ctx.min_balance_params.clone(),
    };
    interp.run(&mut gctx)
}

fn run_approval(ctx: &mut AppCallCtx, app_id: u64) -> RResult<()> {
    let approval = ctx
        .world
        .get_app(app_id)
        .ok_or(RuntimeError::AppNotFound(app_id))?
        .approval_program
        .as_slice()
        .to_vec();
    run_program(ctx, &approval, app_id)
}

/// `appl` with `ApplicationID == 0`: allocates a new app, runs its
/// approval program once with the new id visible, and rolls the
/// allocation back if that run rejects.
pub fn create_app(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<u64> {
    let created_count = ctx.world.get_account(&txn.sender).map(|a| a.created_apps.len()).unwrap_or(0);
    if created_count >= Config::MAX_CREATED_APPS {
        return Err(ExecError::from(RuntimeError::SchemaExceeded(
            "account already owns the maximum number of created apps".to_string(),
        )));
    }

    let app_id = ctx.world.next_app_id();
    let app = Application {
        app_id,
        creator: txn.sender,
        approval_program: txn.approval_program.clone(),
        clear_state_program: txn.clear_state_program.clone(),
        global_state: Default::default(),
        global_schema: StateSchema {
            num_uint: txn.global_num_uint,
            num_byte_slice: txn.global_num_byte_slice,
        },
        local_schema: StateSchema {
            num_uint: txn.local_num_uint,
            num_byte_slice: txn.local_num_byte_slice,
        },
    };
    ctx.world.insert_app(app);
    ctx.world.get_account_mut(&txn.sender).created_apps.insert(app_id);

    if let Err(e) = run_approval(&mut ctx, app_id) {
        ctx.world.remove_app(app_id);
        ctx.world.get_account_mut(&txn.sender).created_apps.remove(&app_id);
        return Err(e);
    }

    require_min_balance(ctx.world, ctx.min_balance_params, &txn.sender)?;
    debug!("created app {} owned by {}", app_id, txn.sender);
    Ok(app_id)
}

/// `appl` with `ApplicationID != 0`: dispatches on `OnCompletion` to the
/// matching lifecycle handling.
pub fn dispatch_call(ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    match txn.on_complete {
        OnComplete::NoOp => call_no_op(ctx, txn),
        OnComplete::OptIn => opt_in(ctx, txn),
        OnComplete::CloseOut => close_out(ctx, txn),
        OnComplete::UpdateApplication => update_app(ctx, txn),
        OnComplete::DeleteApplication => delete_app(ctx, txn),
        OnComplete::ClearState => clear_state(ctx, txn),
    }
}

fn call_no_op(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    ctx.world.get_app(txn.app_id).ok_or(RuntimeError::AppNotFound(txn.app_id))?;
    run_approval(&mut ctx, txn.app_id)
}

/// Allocates the local-state slot *before* running approval, since
/// `app_local_put` during an opt-in call needs somewhere to write; the
/// slot is rolled back if the program rejects.
fn opt_in(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    let app_id = txn.app_id;
    ctx.world.get_app(app_id).ok_or(RuntimeError::AppNotFound(app_id))?;
    if ctx.world.get_account(&txn.sender).map(|a| a.is_opted_in_app(app_id)).unwrap_or(false) {
        return Err(ExecError::from(RuntimeError::AlreadyOptedIn(app_id)));
    }
    let opted_in_count = ctx
        .world
        .get_account(&txn.sender)
        .map(|a| a.apps_local_state.len())
        .unwrap_or(0);
    if opted_in_count >= Config::MAX_OPTED_IN_APPS {
        return Err(ExecError::from(RuntimeError::SchemaExceeded(
            "account is already opted into the maximum number of apps".to_string(),
        )));
    }
    ctx.world
        .get_account_mut(&txn.sender)
        .apps_local_state
        .insert(app_id, AppLocalState::default());

    if let Err(e) = run_approval(&mut ctx, app_id) {
        ctx.world.get_account_mut(&txn.sender).apps_local_state.remove(&app_id);
        return Err(e);
    }

    require_min_balance(ctx.world, ctx.min_balance_params, &txn.sender)?;
    Ok(())
}

fn close_out(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    let app_id = txn.app_id;
    if !ctx.world.get_account(&txn.sender).map(|a| a.is_opted_in_app(app_id)).unwrap_or(false) {
        return Err(ExecError::from(RuntimeError::NotOptedIn(app_id)));
    }
    run_approval(&mut ctx, app_id)?;
    ctx.world.get_account_mut(&txn.sender).apps_local_state.remove(&app_id);
    Ok(())
}

/// Runs the *currently stored* approval program to authorize the
/// update — the new programs only take effect for future calls once
/// this one accepts.
fn update_app(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    let app_id = txn.app_id;
    ctx.world.get_app(app_id).ok_or(RuntimeError::AppNotFound(app_id))?;
    run_approval(&mut ctx, app_id)?;

    let app = ctx.world.get_app_mut(app_id).ok_or(RuntimeError::AppNotFound(app_id))?;
    app.approval_program = txn.approval_program.clone();
    app.clear_state_program = txn.clear_state_program.clone();
    Ok(())
}

fn delete_app(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    let app_id = txn.app_id;
    let creator = ctx
        .world
        .get_app(app_id)
        .ok_or(RuntimeError::AppNotFound(app_id))?
        .creator;

    run_approval(&mut ctx, app_id)?;

    ctx.world.remove_app(app_id);
    ctx.world.get_account_mut(&creator).created_apps.remove(&app_id);
    Ok(())
}

/// `ClearSSC`: the clear program's lifecycle effect (local-state
/// removal) applies whether the program accepts or is merely rejected
/// by logic. Only a non-logic fatal error still aborts the group.
fn clear_state(mut ctx: AppCallCtx, txn: &EncodedTxn) -> RResult<()> {
    let app_id = txn.app_id;
    let program = ctx
        .world
        .get_app(app_id)
        .map(|a| a.clear_state_program.as_slice().to_vec());

    if let Some(program) = program {
        match run_program(&mut ctx, &program, app_id) {
            Ok(()) => {}
            Err(e) if is_logic_rejection(&e) => {
                trace!("clear program rejected by logic, applying lifecycle effect anyway");
            }
            Err(e) => return Err(e),
        }
    }

    ctx.world.get_account_mut(&txn.sender).apps_local_state.remove(&app_id);
    Ok(())
}
