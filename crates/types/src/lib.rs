pub mod address;
pub use address::{Address, ADDRESS_LEN};

pub mod error;
pub use error::{ExecError, RResult, RuntimeError, TypeTag};

pub mod value;
pub use value::{
    checked_add, checked_div, checked_mod, checked_mul, checked_sub, wide_add, wide_mul, Bytes,
    Value, MAX_BYTES_LEN,
};

pub mod transaction;
pub use transaction::{
    resolve_array_field, resolve_field, AssetParamsFields, EncodedTxn, OnComplete, TxnArrayField,
    TxnField, TxnType,
};
