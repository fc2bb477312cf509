use std::collections::BTreeMap;

use types::{Address, Bytes, Value};

/// The declared global/local key/value storage budget for an
/// application, fixed at creation time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSchema {
    pub num_uint: u64,
    pub num_byte_slice: u64,
}

impl StateSchema {
    pub fn total_slots(&self) -> u64 {
        self.num_uint + self.num_byte_slice
    }
}

/// An application's durable record: its programs, its creator, its
/// global key/value store, and the schemas that bound both the global
/// store and every account's local store for this app.
#[derive(Clone, Debug)]
pub struct Application {
    pub app_id: u64,
    pub creator: Address,
    pub approval_program: Bytes,
    pub clear_state_program: Bytes,
    pub global_state: BTreeMap<Vec<u8>, Value>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
}

impl Application {
    /// Fails the write with `SCHEMA_EXCEEDED` if writing `key` would push
    /// the global store's uint/byte-slice counts past the global schema,
    /// counting the post-write state — a key already holding a value of
    /// a different kind releases its old slot before the new kind's
    /// count is checked.
    pub fn check_global_write(&self, key: &[u8], value: &Value) -> Result<(), types::RuntimeError> {
        let (uints, byte_slices) = counts_after_write(self.global_state.iter(), key, value);
        if uints > self.global_schema.num_uint || byte_slices > self.global_schema.num_byte_slice {
            return Err(types::RuntimeError::SchemaExceeded(format!(
                "app {} global schema exceeded",
                self.app_id
            )));
        }
        Ok(())
    }
}

pub fn check_local_write(
    local: &BTreeMap<Vec<u8>, Value>,
    schema: &StateSchema,
    app_id: u64,
    key: &[u8],
    value: &Value,
) -> Result<(), types::RuntimeError> {
    let (uints, byte_slices) = counts_after_write(local.iter(), key, value);
    if uints > schema.num_uint || byte_slices > schema.num_byte_slice {
        return Err(types::RuntimeError::SchemaExceeded(format!(
            "app {} local schema exceeded",
            app_id
        )));
    }
    Ok(())
}

/// Counts uint/byte-slice entries the store would hold once `key` is
/// written as `value`, whether that's a new entry or an overwrite of a
/// different-kind existing one.
fn counts_after_write<'a>(
    entries: impl Iterator<Item = (&'a Vec<u8>, &'a Value)>,
    key: &[u8],
    value: &Value,
) -> (u64, u64) {
    let (mut uints, mut byte_slices) = (0u64, 0u64);
    for (k, v) in entries {
        if k.as_slice() == key {
            continue;
        }
        match v {
            Value::Uint64(_) => uints += 1,
            Value::Bytes(_) => byte_slices += 1,
        }
    }
    add_one(uints, byte_slices, value)
}

fn add_one(uints: u64, byte_slices: u64, value: &Value) -> (u64, u64) {
    match value {
        Value::Uint64(_) => (uints + 1, byte_slices),
        Value::Bytes(_) => (uints, byte_slices + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_key_within_schema_is_allowed() {
        let schema = StateSchema { num_uint: 1, num_byte_slice: 0 };
        let local: BTreeMap<Vec<u8>, Value> = BTreeMap::new();
        assert!(check_local_write(&local, &schema, 1, b"a", &Value::Uint64(5)).is_ok());
    }

    #[test]
    fn new_key_beyond_schema_is_rejected() {
        let schema = StateSchema { num_uint: 1, num_byte_slice: 0 };
        let mut local: BTreeMap<Vec<u8>, Value> = BTreeMap::new();
        local.insert(b"a".to_vec(), Value::Uint64(5));
        assert!(check_local_write(&local, &schema, 1, b"b", &Value::Uint64(1)).is_err());
    }

    #[test]
    fn overwriting_key_with_different_kind_beyond_schema_is_rejected() {
        // num_byte_slice: 0 means no byte-slice value may ever be stored,
        // even by overwriting a key that currently holds a uint64.
        let schema = StateSchema { num_uint: 1, num_byte_slice: 0 };
        let mut local: BTreeMap<Vec<u8>, Value> = BTreeMap::new();
        local.insert(b"a".to_vec(), Value::Uint64(5));
        let result = check_local_write(&local, &schema, 1, b"a", &Value::Bytes(Bytes::new(b"x".to_vec()).unwrap()));
        assert!(result.is_err());
    }

    #[test]
    fn overwriting_key_with_same_kind_is_allowed() {
        let schema = StateSchema { num_uint: 1, num_byte_slice: 0 };
        let mut local: BTreeMap<Vec<u8>, Value> = BTreeMap::new();
        local.insert(b"a".to_vec(), Value::Uint64(5));
        assert!(check_local_write(&local, &schema, 1, b"a", &Value::Uint64(9)).is_ok());
    }
}
