use state::{MinBalanceParams, WorldState};
use types::{Address, Bytes, EncodedTxn, ExecError, RResult, RuntimeError, TxnArrayField, Value};

use crate::assembler::Program;
use crate::crypto;
use crate::opcode::{AssetHoldingField, AssetParamsField, GlobalField, Op};
use crate::stack::{ConstBlocks, Scratch, Stack};

/// Whether the interpreter is running a logic signature (no access to
/// application state) or an application's approval/clear program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Stateless,
    Stateful,
}

/// Everything opcode execution needs beyond the stack/scratch: the
/// transaction group, which transaction in it is "current", and a
/// mutable view of the world being built up by this call.
pub struct GroupContext<'a> {
    pub txns: &'a [EncodedTxn],
    pub group_index: usize,
    pub world: &'a mut WorldState,
    pub mode: ExecMode,
    pub current_app_id: u64,
    pub round: u64,
    pub latest_timestamp: u64,
    pub min_txn_fee: u64,
    pub min_balance_params: MinBalanceParams,
}

impl<'a> GroupContext<'a> {
    pub fn current_txn(&self) -> &EncodedTxn {
        &self.txns[self.group_index]
    }
}

/// A stack-machine execution of one assembled program against one
/// `GroupContext`. One `Interpreter` is built per logic-signature or
/// per app-call invocation; it does not outlive that single run.
///
/// EDUCATIONAL PURPOSE: this plays the same role a CPU core does for a
/// register machine — fetch the next instruction, charge its cost,
/// dispatch it, advance — except the "registers" here are an
/// operand stack plus a fixed scratch-slot bank instead of a named
/// register file.
///
/// EXECUTION MODEL: there is no separate compile step beyond assembly;
/// `step` interprets one `Op` at a time directly against the stack and
/// the borrowed `GroupContext`, the way a tree-walking interpreter
/// trades compile-time work for simplicity over a bytecode-to-native
/// JIT.
pub struct Interpreter {
    program: Program,
    program_hash: [u8; 32],
    stack: Stack,
    scratch: Scratch,
    consts: ConstBlocks,
    ip: usize,
    cost: u64,
    budget: u64,
}

impl Interpreter {
    pub fn new(program: Program, source: &[u8], budget: u64) -> Self {
        Self {
            program,
            program_hash: crypto::sha512_256(source),
            stack: Stack::new(),
            scratch: Scratch::new(),
            consts: ConstBlocks::default(),
            ip: 0,
            cost: 0,
            budget,
        }
    }

    /// Runs the program to completion against `gctx`. `Ok(())` means
    /// the program accepted (exactly one nonzero `Uint64` remained on
    /// the stack); any `Err` means it rejected, carrying the reason.
    ///
    /// COST BUDGET: every opcode has a fixed cost (`Op::cost`), charged
    /// before it runs; exceeding the budget aborts the run the same way
    /// running out of gas aborts an EVM call, except the cost here is a
    /// flat per-opcode number rather than a metered-by-effect gas
    /// schedule.
    pub fn run(&mut self, gctx: &mut GroupContext) -> RResult<()> {
        loop {
            if self.ip >= self.program.ops.len() {
                break;
            }
            let op = self.program.ops[self.ip].clone();
            let line = self.program.lines.get(self.ip).copied();
            self.ip += 1;

            self.cost += op.cost();
            if self.cost > self.budget {
                return Err(ExecError::from(RuntimeError::CostBudgetExceeded {
                    used: self.cost,
                    budget: self.budget,
                })
                .with_line_opt(line));
            }

            self.step(op, gctx).map_err(|e| e.with_line_opt(line))?;
        }

        if self.stack.len() != 1 {
            return Err(ExecError::from(RuntimeError::FinalStackSizeError(self.stack.len())));
        }
        let top = self.stack.pop()?;
        if !top.is_truthy() {
            return Err(ExecError::from(RuntimeError::FinalStackValueError));
        }
        Ok(())
    }

    fn require_stateful(&self, gctx: &GroupContext) -> Result<(), RuntimeError> {
        if gctx.mode != ExecMode::Stateful {
            return Err(RuntimeError::StatefulOpcodeInStatelessMode);
        }
        Ok(())
    }

    fn resolve_account(&self, gctx: &GroupContext, idx: u64) -> Result<Address, RuntimeError> {
        let v = types::resolve_array_field(gctx.current_txn(), TxnArrayField::Accounts, idx)?;
        let bytes = v.as_bytes()?;
        let mut raw = [0u8; types::ADDRESS_LEN];
        if bytes.as_slice().len() != types::ADDRESS_LEN {
            return Err(RuntimeError::InvalidAddr(hex::encode(bytes.as_slice())));
        }
        raw.copy_from_slice(bytes.as_slice());
        Ok(Address::new(raw))
    }

    fn resolve_foreign_app(&self, gctx: &GroupContext, idx: u64) -> Result<u64, RuntimeError> {
        types::resolve_array_field(gctx.current_txn(), TxnArrayField::Applications, idx)?.as_uint64()
    }

    fn resolve_foreign_asset(&self, gctx: &GroupContext, idx: u64) -> Result<u64, RuntimeError> {
        types::resolve_array_field(gctx.current_txn(), TxnArrayField::Assets, idx)?.as_uint64()
    }

    #[allow(clippy::too_many_lines)]
    fn step(&mut self, op: Op, gctx: &mut GroupContext) -> RResult<()> {
        match op {
            Op::IntCBlock(ints) => self.consts.set_ints(ints)?,
            Op::ByteCBlock(bytes) => self.consts.set_bytes(bytes)?,
            Op::IntC(i) => self.stack.push(Value::Uint64(self.consts.int(i)?))?,
            Op::ByteC(i) => self.stack.push(Value::Bytes(self.consts.byte(i)?))?,
            Op::PushInt(v) => self.stack.push(Value::Uint64(v))?,
            Op::PushBytes(b) => self.stack.push(Value::Bytes(b))?,

            Op::Add => self.binary_uint(|a, b| types::checked_add(a, b))?,
            Op::Sub => self.binary_uint(|a, b| types::checked_sub(a, b))?,
            Op::Mul => self.binary_uint(|a, b| types::checked_mul(a, b))?,
            Op::Div => self.binary_uint(|a, b| types::checked_div(a, b))?,
            Op::Mod => self.binary_uint(|a, b| types::checked_mod(a, b))?,
            Op::Lt => self.compare(|a, b| a < b)?,
            Op::Le => self.compare(|a, b| a <= b)?,
            Op::Gt => self.compare(|a, b| a > b)?,
            Op::Ge => self.compare(|a, b| a >= b)?,
            Op::Eq => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                self.stack.push(Value::Uint64((a == b) as u64))?;
            }
            Op::Ne => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                self.stack.push(Value::Uint64((a != b) as u64))?;
            }
            Op::And => {
                let b = self.stack.pop_uint64()? != 0;
                let a = self.stack.pop_uint64()? != 0;
                self.stack.push(Value::Uint64((a && b) as u64))?;
            }
            Op::Or => {
                let b = self.stack.pop_uint64()? != 0;
                let a = self.stack.pop_uint64()? != 0;
                self.stack.push(Value::Uint64((a || b) as u64))?;
            }
            Op::Not => {
                let a = self.stack.pop_uint64()?;
                self.stack.push(Value::Uint64((a == 0) as u64))?;
            }
            Op::BitAnd => self.binary_uint(|a, b| Ok(a & b))?,
            Op::BitOr => self.binary_uint(|a, b| Ok(a | b))?,
            Op::BitXor => self.binary_uint(|a, b| Ok(a ^ b))?,
            Op::BitNot => {
                let a = self.stack.pop_uint64()?;
                self.stack.push(Value::Uint64(!a))?;
            }
            Op::AddW => {
                let b = self.stack.pop_uint64()?;
                let a = self.stack.pop_uint64()?;
                let (carry, sum) = types::wide_add(a, b);
                self.stack.push(Value::Uint64(carry))?;
                self.stack.push(Value::Uint64(sum))?;
            }
            Op::MulW => {
                let b = self.stack.pop_uint64()?;
                let a = self.stack.pop_uint64()?;
                let (high, low) = types::wide_mul(a, b);
                self.stack.push(Value::Uint64(high))?;
                self.stack.push(Value::Uint64(low))?;
            }

            Op::Len => {
                let b = self.stack.pop_bytes()?;
                self.stack.push(Value::Uint64(b.len() as u64))?;
            }
            Op::Itob => {
                let v = self.stack.pop_uint64()?;
                self.stack.push(Value::bytes(v.to_be_bytes().to_vec())?)?;
            }
            Op::Btoi => {
                let b = self.stack.pop_bytes()?;
                if b.len() > 8 {
                    return Err(ExecError::from(RuntimeError::LongInputError(b.len())));
                }
                let mut buf = [0u8; 8];
                buf[8 - b.len()..].copy_from_slice(b.as_slice());
                self.stack.push(Value::Uint64(u64::from_be_bytes(buf)))?;
            }
            Op::Concat => {
                let b = self.stack.pop_bytes()?;
                let a = self.stack.pop_bytes()?;
                let mut out = a.into_vec();
                out.extend_from_slice(b.as_slice());
                if out.len() > types::MAX_BYTES_LEN {
                    return Err(ExecError::from(RuntimeError::ConcatError));
                }
                self.stack.push(Value::bytes(out)?)?;
            }
            Op::Substring(start, end) => {
                let b = self.stack.pop_bytes()?;
                self.stack.push(Value::Bytes(substring(&b, start, end)?))?;
            }
            Op::Substring3 => {
                let end = self.stack.pop_uint64()?;
                let start = self.stack.pop_uint64()?;
                let b = self.stack.pop_bytes()?;
                self.stack.push(Value::Bytes(substring(&b, start, end)?))?;
            }

            Op::Sha256 => {
                let b = self.stack.pop_bytes()?;
                self.stack.push(Value::bytes(crypto::sha256(b.as_slice()).to_vec())?)?;
            }
            Op::Sha512_256 => {
                let b = self.stack.pop_bytes()?;
                self.stack.push(Value::bytes(crypto::sha512_256(b.as_slice()).to_vec())?)?;
            }
            Op::Keccak256 => {
                let b = self.stack.pop_bytes()?;
                self.stack.push(Value::bytes(crypto::keccak256(b.as_slice()).to_vec())?)?;
            }
            Op::Ed25519Verify => {
                let pubkey = self.stack.pop_bytes()?;
                let signature = self.stack.pop_bytes()?;
                let data = self.stack.pop_bytes()?;
                let ok = crypto::ed25519verify(
                    data.as_slice(),
                    signature.as_slice(),
                    pubkey.as_slice(),
                    &self.program_hash,
                );
                self.stack.push(Value::Uint64(ok as u64))?;
            }

            Op::Bnz(target) => {
                if self.stack.pop_uint64()? != 0 {
                    self.ip = target;
                }
            }
            Op::Bz(target) => {
                if self.stack.pop_uint64()? == 0 {
                    self.ip = target;
                }
            }
            Op::B(target) => self.ip = target,
            Op::Return => {
                self.stack.collapse_to_top()?;
                self.ip = self.program.ops.len();
            }
            Op::Err => return Err(ExecError::from(RuntimeError::TealEncounteredErr)),
            Op::Assert => {
                if !self.stack.pop()?.is_truthy() {
                    return Err(ExecError::from(RuntimeError::LogicRejection));
                }
            }

            Op::Dup => {
                let v = self.stack.peek_from_top(0)?.clone();
                self.stack.push(v)?;
            }
            Op::Dup2 => {
                let b = self.stack.peek_from_top(0)?.clone();
                let a = self.stack.peek_from_top(1)?.clone();
                self.stack.push(a)?;
                self.stack.push(b)?;
            }
            Op::Pop => {
                self.stack.pop()?;
            }
            Op::Swap => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                self.stack.push(b)?;
                self.stack.push(a)?;
            }
            Op::Dig(n) => self.stack.dig(n as usize)?,
            Op::Select => {
                let cond = self.stack.pop_uint64()?;
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                self.stack.push(if cond != 0 { b } else { a })?;
            }
            Op::Cover(n) => self.stack.cover(n as usize)?,
            Op::Uncover(n) => self.stack.uncover(n as usize)?,

            Op::SetBit => self.setbit()?,
            Op::GetBit => self.getbit()?,
            Op::SetByte => self.setbyte()?,
            Op::GetByte => self.getbyte()?,

            Op::Store(i) => {
                let v = self.stack.pop()?;
                self.scratch.store(i, v)?;
            }
            Op::Load(i) => {
                let v = self.scratch.load(i)?;
                self.stack.push(v)?;
            }

            Op::Txn(field) => {
                let v = types::resolve_field(gctx.current_txn(), gctx.group_index, field)?;
                self.stack.push(v)?;
            }
            Op::Txna(field, idx) => {
                let v = types::resolve_array_field(gctx.current_txn(), field, idx)?;
                self.stack.push(v)?;
            }
            Op::Gtxn(g, field) => {
                let txn = gctx.txns.get(g).ok_or(RuntimeError::InvalidOpArg("gtxn".to_string()))?;
                self.stack.push(types::resolve_field(txn, g, field)?)?;
            }
            Op::Gtxna(g, field, idx) => {
                let txn = gctx.txns.get(g).ok_or(RuntimeError::InvalidOpArg("gtxna".to_string()))?;
                self.stack.push(types::resolve_array_field(txn, field, idx)?)?;
            }
            Op::Gtxns(field) => {
                let g = self.stack.pop_uint64()? as usize;
                let txn = gctx.txns.get(g).ok_or(RuntimeError::InvalidOpArg("gtxns".to_string()))?;
                self.stack.push(types::resolve_field(txn, g, field)?)?;
            }
            Op::Gtxnsa(field, idx) => {
                let g = self.stack.pop_uint64()? as usize;
                let txn = gctx.txns.get(g).ok_or(RuntimeError::InvalidOpArg("gtxnsa".to_string()))?;
                self.stack.push(types::resolve_array_field(txn, field, idx)?)?;
            }
            Op::Global(field) => self.stack.push(self.global(field, gctx))?,

            Op::AppOptedIn => {
                self.require_stateful(gctx)?;
                let app_idx = self.stack.pop_uint64()?;
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let app_id = self.resolve_foreign_app(gctx, app_idx)?;
                let opted_in = gctx
                    .world
                    .get_account(&addr)
                    .map(|a| a.is_opted_in_app(app_id))
                    .unwrap_or(false);
                self.stack.push(Value::Uint64(opted_in as u64))?;
            }
            Op::AppLocalGet => {
                self.require_stateful(gctx)?;
                let key = self.stack.pop_bytes()?;
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let v = gctx
                    .world
                    .get_account(&addr)
                    .and_then(|a| a.apps_local_state.get(&gctx.current_app_id))
                    .and_then(|l| l.key_value.get(key.as_slice()))
                    .cloned()
                    .unwrap_or(Value::Uint64(0));
                self.stack.push(v)?;
            }
            Op::AppLocalGetEx => {
                self.require_stateful(gctx)?;
                let key = self.stack.pop_bytes()?;
                let app_idx = self.stack.pop_uint64()?;
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let app_id = self.resolve_foreign_app(gctx, app_idx)?;
                let found = gctx
                    .world
                    .get_account(&addr)
                    .and_then(|a| a.apps_local_state.get(&app_id))
                    .and_then(|l| l.key_value.get(key.as_slice()))
                    .cloned();
                self.stack.push(found.clone().unwrap_or(Value::Uint64(0)))?;
                self.stack.push(Value::Uint64(found.is_some() as u64))?;
            }
            Op::AppGlobalGet => {
                self.require_stateful(gctx)?;
                let key = self.stack.pop_bytes()?;
                let v = gctx
                    .world
                    .get_app(gctx.current_app_id)
                    .and_then(|a| a.global_state.get(key.as_slice()))
                    .cloned()
                    .unwrap_or(Value::Uint64(0));
                self.stack.push(v)?;
            }
            Op::AppGlobalGetEx => {
                self.require_stateful(gctx)?;
                let key = self.stack.pop_bytes()?;
                let app_idx = self.stack.pop_uint64()?;
                let app_id = self.resolve_foreign_app(gctx, app_idx)?;
                let found = gctx
                    .world
                    .get_app(app_id)
                    .and_then(|a| a.global_state.get(key.as_slice()))
                    .cloned();
                self.stack.push(found.clone().unwrap_or(Value::Uint64(0)))?;
                self.stack.push(Value::Uint64(found.is_some() as u64))?;
            }
            Op::AppLocalPut => {
                self.require_stateful(gctx)?;
                let value = self.stack.pop()?;
                let key = self.stack.pop_bytes()?;
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let app_id = gctx.current_app_id;
                let schema = gctx
                    .world
                    .get_app(app_id)
                    .ok_or(RuntimeError::AppNotFound(app_id))?
                    .local_schema
                    .clone();
                let acc = gctx.world.get_account_mut(&addr);
                let local = acc.apps_local_state.entry(app_id).or_default();
                state::application::check_local_write(&local.key_value, &schema, app_id, key.as_slice(), &value)?;
                local.key_value.insert(key.into_vec(), value);
            }
            Op::AppGlobalPut => {
                self.require_stateful(gctx)?;
                let value = self.stack.pop()?;
                let key = self.stack.pop_bytes()?;
                let app_id = gctx.current_app_id;
                let app = gctx.world.get_app_mut(app_id).ok_or(RuntimeError::AppNotFound(app_id))?;
                app.check_global_write(key.as_slice(), &value)?;
                app.global_state.insert(key.into_vec(), value);
            }
            Op::AppLocalDel => {
                self.require_stateful(gctx)?;
                let key = self.stack.pop_bytes()?;
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                if let Some(acc) = gctx.world.accounts.get_mut(&addr) {
                    if let Some(local) = acc.apps_local_state.get_mut(&gctx.current_app_id) {
                        local.key_value.remove(key.as_slice());
                    }
                }
            }
            Op::AppGlobalDel => {
                self.require_stateful(gctx)?;
                let key = self.stack.pop_bytes()?;
                if let Some(app) = gctx.world.get_app_mut(gctx.current_app_id) {
                    app.global_state.remove(key.as_slice());
                }
            }
            Op::Balance => {
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let balance = gctx.world.get_account(&addr).map(|a| a.balance).unwrap_or(0);
                self.stack.push(Value::Uint64(balance))?;
            }
            Op::MinBalance => {
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let min = match gctx.world.get_account(&addr) {
                    Some(acc) => acc.min_balance(&gctx.min_balance_params, (0, 0)),
                    None => gctx.min_balance_params.base as u128,
                };
                self.stack.push(Value::Uint64(min.min(u64::MAX as u128) as u64))?;
            }
            Op::AssetHoldingGet(field) => {
                let asset_idx = self.stack.pop_uint64()?;
                let acct_idx = self.stack.pop_uint64()?;
                let addr = self.resolve_account(gctx, acct_idx)?;
                let asset_id = self.resolve_foreign_asset(gctx, asset_idx)?;
                let holding = gctx.world.get_account(&addr).and_then(|a| a.assets.get(&asset_id));
                let (value, found) = match (holding, field) {
                    (Some(h), AssetHoldingField::AssetBalance) => (Value::Uint64(h.amount), true),
                    (Some(h), AssetHoldingField::AssetFrozen) => (Value::Uint64(h.frozen as u64), true),
                    (None, _) => (Value::Uint64(0), false),
                };
                self.stack.push(value)?;
                self.stack.push(Value::Uint64(found as u64))?;
            }
            Op::AssetParamsGet(field) => {
                let asset_idx = self.stack.pop_uint64()?;
                let asset_id = self.resolve_foreign_asset(gctx, asset_idx)?;
                let asset = gctx.world.get_asset(asset_id);
                let (value, found) = asset_params_value(asset, field);
                self.stack.push(value)?;
                self.stack.push(Value::Uint64(found as u64))?;
            }
        }
        Ok(())
    }

    fn binary_uint(&mut self, f: impl Fn(u64, u64) -> Result<u64, RuntimeError>) -> RResult<()> {
        let b = self.stack.pop_uint64()?;
        let a = self.stack.pop_uint64()?;
        self.stack.push(Value::Uint64(f(a, b)?))?;
        Ok(())
    }

    fn compare(&mut self, f: impl Fn(u64, u64) -> bool) -> RResult<()> {
        let b = self.stack.pop_uint64()?;
        let a = self.stack.pop_uint64()?;
        self.stack.push(Value::Uint64(f(a, b) as u64))?;
        Ok(())
    }

    fn setbit(&mut self) -> RResult<()> {
        let bit_value = self.stack.pop_uint64()?;
        if bit_value > 1 {
            return Err(ExecError::from(RuntimeError::SetBitValueError(bit_value)));
        }
        let index = self.stack.pop_uint64()?;
        let target = self.stack.pop()?;
        match target {
            Value::Uint64(v) => {
                if index >= 64 {
                    return Err(ExecError::from(RuntimeError::InvalidUint8(index)));
                }
                let mask = 1u64 << index;
                let result = if bit_value == 1 { v | mask } else { v & !mask };
                self.stack.push(Value::Uint64(result))?;
            }
            Value::Bytes(b) => {
                let mut bytes = b.into_vec();
                let total_bits = bytes.len() as u64 * 8;
                if index >= total_bits {
                    return Err(ExecError::from(RuntimeError::IndexOutOfBound { index, len: bytes.len() }));
                }
                let byte_idx = (index / 8) as usize;
                let bit_in_byte = 7 - (index % 8); // bit 0 is MSB of first byte
                let mask = 1u8 << bit_in_byte;
                if bit_value == 1 {
                    bytes[byte_idx] |= mask;
                } else {
                    bytes[byte_idx] &= !mask;
                }
                self.stack.push(Value::bytes(bytes)?)?;
            }
        }
        Ok(())
    }

    fn getbit(&mut self) -> RResult<()> {
        let index = self.stack.pop_uint64()?;
        let target = self.stack.pop()?;
        let bit = match target {
            Value::Uint64(v) => {
                if index >= 64 {
                    return Err(ExecError::from(RuntimeError::InvalidUint8(index)));
                }
                (v >> index) & 1
            }
            Value::Bytes(b) => {
                let total_bits = b.len() as u64 * 8;
                if index >= total_bits {
                    return Err(ExecError::from(RuntimeError::IndexOutOfBound { index, len: b.len() }));
                }
                let byte_idx = (index / 8) as usize;
                let bit_in_byte = 7 - (index % 8);
                ((b.as_slice()[byte_idx] >> bit_in_byte) & 1) as u64
            }
        };
        self.stack.push(Value::Uint64(bit))?;
        Ok(())
    }

    fn setbyte(&mut self) -> RResult<()> {
        let value = self.stack.pop_uint64()?;
        if value > 255 {
            return Err(ExecError::from(RuntimeError::InvalidUint8(value)));
        }
        let index = self.stack.pop_uint64()?;
        let b = self.stack.pop_bytes()?;
        let mut bytes = b.into_vec();
        let idx = index as usize;
        if idx >= bytes.len() {
            return Err(ExecError::from(RuntimeError::IndexOutOfBound { index, len: bytes.len() }));
        }
        bytes[idx] = value as u8;
        self.stack.push(Value::bytes(bytes)?)?;
        Ok(())
    }

    fn getbyte(&mut self) -> RResult<()> {
        let index = self.stack.pop_uint64()?;
        let b = self.stack.pop_bytes()?;
        let idx = index as usize;
        let byte = *b
            .as_slice()
            .get(idx)
            .ok_or(RuntimeError::IndexOutOfBound { index, len: b.len() })?;
        self.stack.push(Value::Uint64(byte as u64))?;
        Ok(())
    }

    fn global(&self, field: GlobalField, gctx: &GroupContext) -> Value {
        match field {
            GlobalField::MinTxnFee => Value::Uint64(gctx.min_txn_fee),
            GlobalField::MinBalance => Value::Uint64(gctx.min_balance_params.base),
            GlobalField::MaxTxnLife => Value::Uint64(1000),
            GlobalField::ZeroAddress => {
                Value::bytes(Address::ZERO.to_bytes().to_vec()).expect("address fits in Bytes cap")
            }
            GlobalField::GroupSize => Value::Uint64(gctx.txns.len() as u64),
            GlobalField::LogicSigVersion => Value::Uint64(self.program.version),
            GlobalField::Round => Value::Uint64(gctx.round),
            GlobalField::LatestTimestamp => Value::Uint64(gctx.latest_timestamp),
            GlobalField::CurrentApplicationID => Value::Uint64(gctx.current_app_id),
            GlobalField::CreatorAddress => {
                let creator = gctx
                    .world
                    .get_app(gctx.current_app_id)
                    .map(|a| a.creator)
                    .unwrap_or(Address::ZERO);
                Value::bytes(creator.to_bytes().to_vec()).expect("address fits in Bytes cap")
            }
        }
    }
}

fn substring(b: &Bytes, start: u64, end: u64) -> RResult<Bytes> {
    if start > end {
        return Err(ExecError::from(RuntimeError::SubstringEndBeforeStart { start, end }));
    }
    if end as usize > b.len() {
        return Err(ExecError::from(RuntimeError::SubstringRangeBeyond { end, len: b.len() }));
    }
    Bytes::new(b.as_slice()[start as usize..end as usize].to_vec()).map_err(ExecError::from)
}

fn asset_params_value(asset: Option<&state::AssetDefinition>, field: AssetParamsField) -> (Value, bool) {
    let Some(asset) = asset else {
        return (Value::Uint64(0), false);
    };
    let p = &asset.params;
    let v = match field {
        AssetParamsField::AssetTotal => Value::Uint64(p.total),
        AssetParamsField::AssetDecimals => Value::Uint64(p.decimals as u64),
        AssetParamsField::AssetDefaultFrozen => Value::Uint64(p.default_frozen as u64),
        AssetParamsField::AssetUnitName => {
            Value::bytes(p.unit_name.clone().into_bytes()).unwrap_or(Value::Uint64(0))
        }
        AssetParamsField::AssetName => {
            Value::bytes(p.asset_name.clone().into_bytes()).unwrap_or(Value::Uint64(0))
        }
        AssetParamsField::AssetURL => Value::bytes(p.url.clone().into_bytes()).unwrap_or(Value::Uint64(0)),
        AssetParamsField::AssetMetadataHash => {
            Value::bytes(p.metadata_hash.to_vec()).unwrap_or(Value::Uint64(0))
        }
        AssetParamsField::AssetManager => Value::bytes(p.manager.to_bytes().to_vec()).unwrap_or(Value::Uint64(0)),
        AssetParamsField::AssetReserve => Value::bytes(p.reserve.to_bytes().to_vec()).unwrap_or(Value::Uint64(0)),
        AssetParamsField::AssetFreeze => Value::bytes(p.freeze.to_bytes().to_vec()).unwrap_or(Value::Uint64(0)),
        AssetParamsField::AssetClawback => {
            Value::bytes(p.clawback.to_bytes().to_vec()).unwrap_or(Value::Uint64(0))
        }
    };
    (v, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use state::WorldState;
    use types::EncodedTxn;

    fn run_source(src: &str) -> RResult<()> {
        let program = assemble(src).unwrap();
        let mut interp = Interpreter::new(program, src.as_bytes(), 700);
        let mut world = WorldState::new();
        let txns = vec![EncodedTxn::default()];
        let mut gctx = GroupContext {
            txns: &txns,
            group_index: 0,
            world: &mut world,
            mode: ExecMode::Stateless,
            current_app_id: 0,
            round: 1,
            latest_timestamp: 0,
            min_txn_fee: 1000,
            min_balance_params: MinBalanceParams::default(),
        };
        interp.run(&mut gctx)
    }

    #[test]
    fn accepts_on_nonzero_top() {
        assert!(run_source("#pragma version 2\nint 1\nreturn\n").is_ok());
    }

    #[test]
    fn rejects_on_zero_top() {
        assert!(run_source("#pragma version 2\nint 0\nreturn\n").is_err());
    }

    #[test]
    fn stateful_opcode_rejects_in_stateless_mode() {
        let err = run_source("#pragma version 2\nint 0\nint 0\napp_local_get\nreturn\n").unwrap_err();
        assert_eq!(err.kind, RuntimeError::StatefulOpcodeInStatelessMode);
    }

    #[test]
    fn btoi_itob_roundtrip() {
        assert!(run_source("#pragma version 2\nint 42\nitob\nbtoi\nreturn\n").is_ok());
    }

    #[test]
    fn addw_overflow_sets_carry() {
        assert!(run_source(
            "#pragma version 2\nint 18446744073709551615\nint 2\naddw\npop\nreturn\n"
        )
        .is_ok());
    }

    #[test]
    fn cost_budget_exceeded_rejects() {
        let mut src = String::from("#pragma version 2\nbyte \"x\"\n");
        for _ in 0..800 {
            src.push_str("dup\npop\n");
        }
        src.push_str("int 1\nreturn\n");
        let err = run_source(&src).unwrap_err();
        assert!(matches!(err.kind, RuntimeError::CostBudgetExceeded { .. }));
    }
}
