use crate::address::Address;
use crate::error::RuntimeError;
use crate::value::{Bytes, Value};

/// The six encoded transaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnType {
    Pay,
    KeyReg,
    AssetConfig,
    AssetTransfer,
    AssetFreeze,
    AppCall,
}

impl TxnType {
    /// `TypeEnum` mapping: `pay=1, keyreg=2, acfg=3,
    /// axfer=4, afrz=5, appl=6`.
    pub fn type_enum(self) -> u64 {
        match self {
            TxnType::Pay => 1,
            TxnType::KeyReg => 2,
            TxnType::AssetConfig => 3,
            TxnType::AssetTransfer => 4,
            TxnType::AssetFreeze => 5,
            TxnType::AppCall => 6,
        }
    }

    pub fn short_code(self) -> &'static str {
        match self {
            TxnType::Pay => "pay",
            TxnType::KeyReg => "keyreg",
            TxnType::AssetConfig => "acfg",
            TxnType::AssetTransfer => "axfer",
            TxnType::AssetFreeze => "afrz",
            TxnType::AppCall => "appl",
        }
    }
}

/// The `apar` sub-record carried by an `AssetConfig` transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetParamsFields {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub metadata_hash: [u8; 32],
    pub manager: Address,
    pub reserve: Address,
    pub freeze: Address,
    pub clawback: Address,
}

/// What an `appl` transaction's approval program should do with this
/// call: create, opt-in, regular call, close-out, clear-state, update,
/// or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnComplete {
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
}

/// The full encoded transaction record, keyed by the short field names
/// the wire protocol uses (`snd`, `rcv`, `amt`, `apid`, ...). Fields
/// irrelevant to a transaction's `txn_type` carry their zero value.
#[derive(Debug, Clone)]
pub struct EncodedTxn {
    pub txn_type: TxnType,
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub note: Bytes,
    pub lease: [u8; 32],
    pub rekey_to: Address,
    pub group: [u8; 32],
    pub tx_id: String,

    // pay
    pub receiver: Address,
    pub amount: u64,
    pub close_remainder_to: Address,

    // keyreg
    pub vote_key: Bytes,
    pub selection_key: Bytes,
    pub vote_first: u64,
    pub vote_last: u64,
    pub vote_key_dilution: u64,

    // acfg
    pub config_asset: u64,
    pub asset_params: AssetParamsFields,

    // axfer / afrz
    pub xfer_asset: u64,
    pub asset_amount: u64,
    pub asset_sender: Address,
    pub asset_receiver: Address,
    pub asset_close_to: Address,
    pub freeze_asset: u64,
    pub freeze_account: Address,
    pub asset_frozen: bool,

    // appl
    pub app_id: u64,
    pub on_complete: OnComplete,
    pub app_args: Vec<Bytes>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
    pub approval_program: Bytes,
    pub clear_state_program: Bytes,
    pub global_num_uint: u64,
    pub global_num_byte_slice: u64,
    pub local_num_uint: u64,
    pub local_num_byte_slice: u64,
}

impl Default for EncodedTxn {
    fn default() -> Self {
        Self {
            txn_type: TxnType::Pay,
            sender: Address::ZERO,
            fee: 0,
            first_valid: 0,
            last_valid: 0,
            note: Bytes::default(),
            lease: [0u8; 32],
            rekey_to: Address::ZERO,
            group: [0u8; 32],
            tx_id: String::new(),
            receiver: Address::ZERO,
            amount: 0,
            close_remainder_to: Address::ZERO,
            vote_key: Bytes::default(),
            selection_key: Bytes::default(),
            vote_first: 0,
            vote_last: 0,
            vote_key_dilution: 0,
            config_asset: 0,
            asset_params: AssetParamsFields::default(),
            xfer_asset: 0,
            asset_amount: 0,
            asset_sender: Address::ZERO,
            asset_receiver: Address::ZERO,
            asset_close_to: Address::ZERO,
            freeze_asset: 0,
            freeze_account: Address::ZERO,
            asset_frozen: false,
            app_id: 0,
            on_complete: OnComplete::NoOp,
            app_args: Vec::new(),
            accounts: Vec::new(),
            foreign_apps: Vec::new(),
            foreign_assets: Vec::new(),
            approval_program: Bytes::default(),
            clear_state_program: Bytes::default(),
            global_num_uint: 0,
            global_num_byte_slice: 0,
            local_num_uint: 0,
            local_num_byte_slice: 0,
        }
    }
}

/// Symbolic scalar fields addressable via `txn`/`gtxn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnField {
    Sender,
    Fee,
    FirstValid,
    LastValid,
    Note,
    Lease,
    Receiver,
    Amount,
    CloseRemainderTo,
    VotePK,
    SelectionPK,
    VoteFirst,
    VoteLast,
    VoteKeyDilution,
    TypeEnum,
    XferAsset,
    AssetAmount,
    AssetSender,
    AssetReceiver,
    AssetCloseTo,
    FreezeAsset,
    FreezeAssetAccount,
    FreezeAssetFrozen,
    ConfigAsset,
    ConfigAssetTotal,
    ConfigAssetDecimals,
    ConfigAssetDefaultFrozen,
    ConfigAssetUnitName,
    ConfigAssetName,
    ConfigAssetURL,
    ConfigAssetMetadataHash,
    ConfigAssetManager,
    ConfigAssetReserve,
    ConfigAssetFreeze,
    ConfigAssetClawback,
    ApplicationID,
    OnCompletion,
    NumAppArgs,
    NumAccounts,
    ApprovalProgram,
    ClearStateProgram,
    RekeyTo,
    NumAssets,
    NumApplications,
    GlobalNumUint,
    GlobalNumByteSlice,
    LocalNumUint,
    LocalNumByteSlice,
    GroupIndex,
    TxID,
    FirstValidTime,
}

/// Symbolic array fields addressable via `txna`/`gtxna`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnArrayField {
    ApplicationArgs,
    Accounts,
    Assets,
    Applications,
}

impl TxnField {
    pub fn from_name(name: &str) -> Result<Self, RuntimeError> {
        use TxnField::*;
        Ok(match name {
            "Sender" => Sender,
            "Fee" => Fee,
            "FirstValid" => FirstValid,
            "LastValid" => LastValid,
            "Note" => Note,
            "Lease" => Lease,
            "Receiver" => Receiver,
            "Amount" => Amount,
            "CloseRemainderTo" => CloseRemainderTo,
            "VotePK" => VotePK,
            "SelectionPK" => SelectionPK,
            "VoteFirst" => VoteFirst,
            "VoteLast" => VoteLast,
            "VoteKeyDilution" => VoteKeyDilution,
            "TypeEnum" => TypeEnum,
            "XferAsset" => XferAsset,
            "AssetAmount" => AssetAmount,
            "AssetSender" => AssetSender,
            "AssetReceiver" => AssetReceiver,
            "AssetCloseTo" => AssetCloseTo,
            "FreezeAsset" => FreezeAsset,
            "FreezeAssetAccount" => FreezeAssetAccount,
            "FreezeAssetFrozen" => FreezeAssetFrozen,
            "ConfigAsset" => ConfigAsset,
            "ConfigAssetTotal" => ConfigAssetTotal,
            "ConfigAssetDecimals" => ConfigAssetDecimals,
            "ConfigAssetDefaultFrozen" => ConfigAssetDefaultFrozen,
            "ConfigAssetUnitName" => ConfigAssetUnitName,
            "ConfigAssetName" => ConfigAssetName,
            "ConfigAssetURL" => ConfigAssetURL,
            "ConfigAssetMetadataHash" => ConfigAssetMetadataHash,
            "ConfigAssetManager" => ConfigAssetManager,
            "ConfigAssetReserve" => ConfigAssetReserve,
            "ConfigAssetFreeze" => ConfigAssetFreeze,
            "ConfigAssetClawback" => ConfigAssetClawback,
            "ApplicationID" => ApplicationID,
            "OnCompletion" => OnCompletion,
            "NumAppArgs" => NumAppArgs,
            "NumAccounts" => NumAccounts,
            "ApprovalProgram" => ApprovalProgram,
            "ClearStateProgram" => ClearStateProgram,
            "RekeyTo" => RekeyTo,
            "NumAssets" => NumAssets,
            "NumApplications" => NumApplications,
            "GlobalNumUint" => GlobalNumUint,
            "GlobalNumByteSlice" => GlobalNumByteSlice,
            "LocalNumUint" => LocalNumUint,
            "LocalNumByteSlice" => LocalNumByteSlice,
            "GroupIndex" => GroupIndex,
            "TxID" => TxID,
            "FirstValidTime" => FirstValidTime,
            other => return Err(RuntimeError::UnknownTxField(other.to_string())),
        })
    }
}

impl TxnArrayField {
    pub fn from_name(name: &str) -> Result<Self, RuntimeError> {
        use TxnArrayField::*;
        Ok(match name {
            "ApplicationArgs" => ApplicationArgs,
            "Accounts" => Accounts,
            "Assets" => Assets,
            "Applications" => Applications,
            other => return Err(RuntimeError::UnknownTxField(other.to_string())),
        })
    }
}

/// Resolves a scalar symbolic field against a transaction at `group_index`.
/// `FirstValidTime` has no deterministic meaning off-chain and always
/// rejects.
pub fn resolve_field(
    txn: &EncodedTxn,
    group_index: usize,
    field: TxnField,
) -> Result<Value, RuntimeError> {
    use TxnField::*;
    Ok(match field {
        Sender => Value::bytes(txn.sender.to_bytes().to_vec())?,
        Fee => Value::Uint64(txn.fee),
        FirstValid => Value::Uint64(txn.first_valid),
        LastValid => Value::Uint64(txn.last_valid),
        Note => Value::Bytes(txn.note.clone()),
        Lease => Value::bytes(txn.lease.to_vec())?,
        Receiver => Value::bytes(txn.receiver.to_bytes().to_vec())?,
        Amount => Value::Uint64(txn.amount),
        CloseRemainderTo => Value::bytes(txn.close_remainder_to.to_bytes().to_vec())?,
        VotePK => Value::Bytes(txn.vote_key.clone()),
        SelectionPK => Value::Bytes(txn.selection_key.clone()),
        VoteFirst => Value::Uint64(txn.vote_first),
        VoteLast => Value::Uint64(txn.vote_last),
        VoteKeyDilution => Value::Uint64(txn.vote_key_dilution),
        TypeEnum => Value::Uint64(txn.txn_type.type_enum()),
        XferAsset => Value::Uint64(txn.xfer_asset),
        AssetAmount => Value::Uint64(txn.asset_amount),
        AssetSender => Value::bytes(txn.asset_sender.to_bytes().to_vec())?,
        AssetReceiver => Value::bytes(txn.asset_receiver.to_bytes().to_vec())?,
        AssetCloseTo => Value::bytes(txn.asset_close_to.to_bytes().to_vec())?,
        FreezeAsset => Value::Uint64(txn.freeze_asset),
        FreezeAssetAccount => Value::bytes(txn.freeze_account.to_bytes().to_vec())?,
        FreezeAssetFrozen => Value::Uint64(txn.asset_frozen as u64),
        ConfigAsset => Value::Uint64(txn.config_asset),
        ConfigAssetTotal => Value::Uint64(txn.asset_params.total),
        ConfigAssetDecimals => Value::Uint64(txn.asset_params.decimals as u64),
        ConfigAssetDefaultFrozen => Value::Uint64(txn.asset_params.default_frozen as u64),
        ConfigAssetUnitName => Value::bytes(txn.asset_params.unit_name.clone().into_bytes())?,
        ConfigAssetName => Value::bytes(txn.asset_params.asset_name.clone().into_bytes())?,
        ConfigAssetURL => Value::bytes(txn.asset_params.url.clone().into_bytes())?,
        ConfigAssetMetadataHash => Value::bytes(txn.asset_params.metadata_hash.to_vec())?,
        ConfigAssetManager => Value::bytes(txn.asset_params.manager.to_bytes().to_vec())?,
        ConfigAssetReserve => Value::bytes(txn.asset_params.reserve.to_bytes().to_vec())?,
        ConfigAssetFreeze => Value::bytes(txn.asset_params.freeze.to_bytes().to_vec())?,
        ConfigAssetClawback => Value::bytes(txn.asset_params.clawback.to_bytes().to_vec())?,
        ApplicationID => Value::Uint64(txn.app_id),
        OnCompletion => Value::Uint64(on_complete_code(txn.on_complete)),
        NumAppArgs => Value::Uint64(txn.app_args.len() as u64),
        NumAccounts => Value::Uint64(txn.accounts.len() as u64),
        ApprovalProgram => Value::Bytes(txn.approval_program.clone()),
        ClearStateProgram => Value::Bytes(txn.clear_state_program.clone()),
        RekeyTo => Value::bytes(txn.rekey_to.to_bytes().to_vec())?,
        NumAssets => Value::Uint64(txn.foreign_assets.len() as u64),
        NumApplications => Value::Uint64(txn.foreign_apps.len() as u64),
        GlobalNumUint => Value::Uint64(txn.global_num_uint),
        GlobalNumByteSlice => Value::Uint64(txn.global_num_byte_slice),
        LocalNumUint => Value::Uint64(txn.local_num_uint),
        LocalNumByteSlice => Value::Uint64(txn.local_num_byte_slice),
        GroupIndex => Value::Uint64(group_index as u64),
        TxID => Value::bytes(txn.tx_id.clone().into_bytes())?,
        FirstValidTime => {
            return Err(RuntimeError::InvalidFieldType("FirstValidTime".to_string()))
        }
    })
}

fn on_complete_code(oc: OnComplete) -> u64 {
    match oc {
        OnComplete::NoOp => 0,
        OnComplete::OptIn => 1,
        OnComplete::CloseOut => 2,
        OnComplete::ClearState => 3,
        OnComplete::UpdateApplication => 4,
        OnComplete::DeleteApplication => 5,
    }
}

/// Resolves an array field at `idx`. Index 0 of `Accounts` is always the
/// sender, and index 0 of `Applications` is always the called app id,
/// matching this domain's convention that "self" occupies slot zero.
pub fn resolve_array_field(
    txn: &EncodedTxn,
    field: TxnArrayField,
    idx: u64,
) -> Result<Value, RuntimeError> {
    use TxnArrayField::*;
    match field {
        ApplicationArgs => {
            let i = idx as usize;
            txn.app_args
                .get(i)
                .cloned()
                .map(Value::Bytes)
                .ok_or(RuntimeError::IndexOutOfBound {
                    index: idx,
                    len: txn.app_args.len(),
                })
        }
        Accounts => {
            if idx == 0 {
                return Value::bytes(txn.sender.to_bytes().to_vec());
            }
            let i = (idx - 1) as usize;
            match txn.accounts.get(i) {
                Some(a) => Value::bytes(a.to_bytes().to_vec()),
                None => Err(RuntimeError::IndexOutOfBound {
                    index: idx,
                    len: txn.accounts.len() + 1,
                }),
            }
        }
        Assets => {
            let i = idx as usize;
            txn.foreign_assets
                .get(i)
                .map(|a| Value::Uint64(*a))
                .ok_or(RuntimeError::IndexOutOfBound {
                    index: idx,
                    len: txn.foreign_assets.len(),
                })
        }
        Applications => {
            if idx == 0 {
                return Ok(Value::Uint64(txn.app_id));
            }
            let i = (idx - 1) as usize;
            txn.foreign_apps
                .get(i)
                .map(|a| Value::Uint64(*a))
                .ok_or(RuntimeError::IndexOutOfBound {
                    index: idx,
                    len: txn.foreign_apps.len() + 1,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_enum_mapping() {
        assert_eq!(TxnType::Pay.type_enum(), 1);
        assert_eq!(TxnType::AppCall.type_enum(), 6);
    }

    #[test]
    fn accounts_index_zero_is_sender() {
        let mut txn = EncodedTxn::default();
        txn.sender = Address::new([3u8; 32]);
        let v = resolve_array_field(&txn, TxnArrayField::Accounts, 0).unwrap();
        assert_eq!(v, Value::bytes(txn.sender.to_bytes().to_vec()).unwrap());
    }

    #[test]
    fn accounts_index_out_of_range_fails() {
        let txn = EncodedTxn::default();
        assert!(resolve_array_field(&txn, TxnArrayField::Accounts, 5).is_err());
    }

    #[test]
    fn first_valid_time_always_rejects() {
        let txn = EncodedTxn::default();
        assert!(resolve_field(&txn, 0, TxnField::FirstValidTime).is_err());
    }
}
