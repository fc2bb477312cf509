use types::{Bytes, TxnArrayField, TxnField};

/// A resolved global field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalField {
    MinTxnFee,
    MinBalance,
    MaxTxnLife,
    ZeroAddress,
    GroupSize,
    LogicSigVersion,
    Round,
    LatestTimestamp,
    CurrentApplicationID,
    CreatorAddress,
}

impl GlobalField {
    pub fn from_name(name: &str) -> Result<Self, types::RuntimeError> {
        use GlobalField::*;
        Ok(match name {
            "MinTxnFee" => MinTxnFee,
            "MinBalance" => MinBalance,
            "MaxTxnLife" => MaxTxnLife,
            "ZeroAddress" => ZeroAddress,
            "GroupSize" => GroupSize,
            "LogicSigVersion" => LogicSigVersion,
            "Round" => Round,
            "LatestTimestamp" => LatestTimestamp,
            "CurrentApplicationID" => CurrentApplicationID,
            "CreatorAddress" => CreatorAddress,
            other => return Err(types::RuntimeError::UnknownGlobalField(other.to_string())),
        })
    }
}

/// `asset_holding_get` field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetHoldingField {
    AssetBalance,
    AssetFrozen,
}

impl AssetHoldingField {
    pub fn from_name(name: &str) -> Result<Self, types::RuntimeError> {
        Ok(match name {
            "AssetBalance" => AssetHoldingField::AssetBalance,
            "AssetFrozen" => AssetHoldingField::AssetFrozen,
            other => return Err(types::RuntimeError::UnknownAssetField(other.to_string())),
        })
    }
}

/// `asset_params_get` field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetParamsField {
    AssetTotal,
    AssetDecimals,
    AssetDefaultFrozen,
    AssetUnitName,
    AssetName,
    AssetURL,
    AssetMetadataHash,
    AssetManager,
    AssetReserve,
    AssetFreeze,
    AssetClawback,
}

impl AssetParamsField {
    pub fn from_name(name: &str) -> Result<Self, types::RuntimeError> {
        use AssetParamsField::*;
        Ok(match name {
            "AssetTotal" => AssetTotal,
            "AssetDecimals" => AssetDecimals,
            "AssetDefaultFrozen" => AssetDefaultFrozen,
            "AssetUnitName" => AssetUnitName,
            "AssetName" => AssetName,
            "AssetURL" => AssetURL,
            "AssetMetadataHash" => AssetMetadataHash,
            "AssetManager" => AssetManager,
            "AssetReserve" => AssetReserve,
            "AssetFreeze" => AssetFreeze,
            "AssetClawback" => AssetClawback,
            other => return Err(types::RuntimeError::UnknownAssetField(other.to_string())),
        })
    }
}

/// A single decoded instruction. Each carries its own immediates;
/// dispatch in the interpreter is a flat match over this enum rather
/// than a class hierarchy, keeping the hot path free of virtual
/// indirection.
#[derive(Debug, Clone)]
pub enum Op {
    IntCBlock(Vec<u64>),
    ByteCBlock(Vec<Bytes>),
    IntC(u64),
    ByteC(u64),
    PushInt(u64),
    PushBytes(Bytes),

    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    AddW,
    MulW,

    Len,
    Itob,
    Btoi,
    Concat,
    Substring(u64, u64),
    Substring3,

    Sha256,
    Sha512_256,
    Keccak256,
    Ed25519Verify,

    Bnz(usize),
    Bz(usize),
    B(usize),
    Return,
    Err,
    Assert,

    Dup,
    Dup2,
    Pop,
    Swap,
    Dig(u64),
    Select,
    Cover(u64),
    Uncover(u64),

    SetBit,
    GetBit,
    SetByte,
    GetByte,

    Store(u64),
    Load(u64),

    Txn(TxnField),
    Txna(TxnArrayField, u64),
    Gtxn(usize, TxnField),
    Gtxna(usize, TxnArrayField, u64),
    Gtxns(TxnField),
    Gtxnsa(TxnArrayField, u64),
    Global(GlobalField),

    AppOptedIn,
    AppLocalGet,
    AppLocalGetEx,
    AppGlobalGet,
    AppGlobalGetEx,
    AppLocalPut,
    AppGlobalPut,
    AppLocalDel,
    AppGlobalDel,
    Balance,
    MinBalance,
    AssetHoldingGet(AssetHoldingField),
    AssetParamsGet(AssetParamsField),
}

impl Op {
    /// The lowest `#pragma version` under which this opcode is legal.
    /// The schedule approximates this domain's actual opcode-version
    /// history closely enough to gate programs meaningfully; it is not
    /// a byte-exact reproduction of any one release.
    pub fn min_version(&self) -> u64 {
        use Op::*;
        match self {
            // `int`/`byte` (which assemble to `PushInt`/`PushBytes`) are
            // pseudo-ops available since version 1; the gate below only
            // concerns opcodes actually introduced later.
            Dig(_) | Select | Swap | MinBalance | Assert => 3,
            Gtxns(_) | Gtxnsa(_, _) | Txna(_, _) | Gtxna(_, _, _) => 2,
            Cover(_) | Uncover(_) | Ed25519Verify | Dup2 => 4,
            _ => 1,
        }
    }

    /// Approximate per-opcode execution cost used by the cost-budget
    /// meter. Ordinary opcodes cost 1; cryptographic
    /// opcodes cost substantially more, reflecting their real
    /// computational weight.
    pub fn cost(&self) -> u64 {
        match self {
            Op::Sha256 => 7,
            Op::Sha512_256 => 9,
            Op::Keccak256 => 26,
            Op::Ed25519Verify => 1900,
            _ => 1,
        }
    }
}
