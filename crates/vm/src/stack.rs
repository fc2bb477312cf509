use types::{RuntimeError, Value};

/// Maximum number of values the evaluation stack may hold at once.
pub const MAX_STACK_DEPTH: usize = 1000;

/// Number of addressable scratch slots.
pub const MAX_SCRATCH_SLOTS: usize = 256;

/// Maximum entries in either const block.
pub const MAX_CONST_BLOCK_LEN: usize = 256;

/// The bounded evaluation stack. Depth is checked on every push;
/// popping an empty stack is fatal, matching the "underflow is a fatal
/// error" rule.
#[derive(Debug, Default)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn push(&mut self, v: Value) -> Result<(), RuntimeError> {
        if self.values.len() >= MAX_STACK_DEPTH {
            return Err(RuntimeError::StackOverflow(self.values.len() + 1));
        }
        self.values.push(v);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn pop_uint64(&mut self) -> Result<u64, RuntimeError> {
        self.pop()?.as_uint64()
    }

    pub fn pop_bytes(&mut self) -> Result<types::Bytes, RuntimeError> {
        Ok(self.pop()?.as_bytes()?.clone())
    }

    /// Looks at the value `n` positions from the top without removing
    /// it (`n = 0` is the top), used by `dig`/`cover`/`uncover`.
    pub fn peek_from_top(&self, n: usize) -> Result<&Value, RuntimeError> {
        let len = self.values.len();
        if n >= len {
            return Err(RuntimeError::AssertStackLength { expected: n + 1, found: len });
        }
        Ok(&self.values[len - 1 - n])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Duplicates the value `n` positions from the top and pushes it
    /// (`dig N`).
    pub fn dig(&mut self, n: usize) -> Result<(), RuntimeError> {
        let v = self.peek_from_top(n)?.clone();
        self.push(v)
    }

    /// Moves the top value to position `n` from the top, shifting the
    /// rest up (`cover N`).
    pub fn cover(&mut self, n: usize) -> Result<(), RuntimeError> {
        let len = self.values.len();
        if n >= len {
            return Err(RuntimeError::AssertStackLength { expected: n + 1, found: len });
        }
        let top = self.values.pop().ok_or(RuntimeError::StackUnderflow)?;
        self.values.insert(len - 1 - n, top);
        Ok(())
    }

    /// Removes the value `n` positions from the top and pushes it on
    /// top, shifting the rest down (`uncover N`).
    pub fn uncover(&mut self, n: usize) -> Result<(), RuntimeError> {
        let len = self.values.len();
        if n >= len {
            return Err(RuntimeError::AssertStackLength { expected: n + 1, found: len });
        }
        let v = self.values.remove(len - 1 - n);
        self.values.push(v);
        Ok(())
    }

    /// Consumes the whole stack, keeping only the final top value
    /// (`return`).
    pub fn collapse_to_top(&mut self) -> Result<(), RuntimeError> {
        let top = self.values.pop().ok_or(RuntimeError::StackUnderflow)?;
        self.values.clear();
        self.values.push(top);
        Ok(())
    }
}

/// The fixed-size scratch register file, default-initialized to
/// `Uint64(0)` in every slot.
#[derive(Debug, Clone)]
pub struct Scratch {
    slots: [Value; MAX_SCRATCH_SLOTS],
}

impl Default for Scratch {
    fn default() -> Self {
        Self { slots: core::array::from_fn(|_| Value::Uint64(0)) }
    }
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, idx: u64) -> Result<Value, RuntimeError> {
        self.slots
            .get(idx as usize)
            .cloned()
            .ok_or(RuntimeError::ScratchIndexOutOfRange(idx))
    }

    pub fn store(&mut self, idx: u64, v: Value) -> Result<(), RuntimeError> {
        let slot = self
            .slots
            .get_mut(idx as usize)
            .ok_or(RuntimeError::ScratchIndexOutOfRange(idx))?;
        *slot = v;
        Ok(())
    }
}

/// The two const blocks (`intcblock`/`bytecblock`), loaded once per
/// program and indexed by `intc`/`bytec`.
#[derive(Debug, Clone, Default)]
pub struct ConstBlocks {
    pub ints: Vec<u64>,
    pub bytes: Vec<types::Bytes>,
}

impl ConstBlocks {
    pub fn set_ints(&mut self, ints: Vec<u64>) -> Result<(), RuntimeError> {
        if ints.is_empty() || ints.len() > MAX_CONST_BLOCK_LEN {
            return Err(RuntimeError::AssertFieldLength("intcblock".to_string()));
        }
        self.ints = ints;
        Ok(())
    }

    pub fn set_bytes(&mut self, bytes: Vec<types::Bytes>) -> Result<(), RuntimeError> {
        if bytes.is_empty() || bytes.len() > MAX_CONST_BLOCK_LEN {
            return Err(RuntimeError::AssertFieldLength("bytecblock".to_string()));
        }
        self.bytes = bytes;
        Ok(())
    }

    pub fn int(&self, idx: u64) -> Result<u64, RuntimeError> {
        self.ints
            .get(idx as usize)
            .copied()
            .ok_or(RuntimeError::ConstIndexOutOfRange(idx))
    }

    pub fn byte(&self, idx: u64) -> Result<types::Bytes, RuntimeError> {
        self.bytes
            .get(idx as usize)
            .cloned()
            .ok_or(RuntimeError::ConstIndexOutOfRange(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_overflow_past_max_depth() {
        let mut s = Stack::new();
        for _ in 0..MAX_STACK_DEPTH {
            s.push(Value::Uint64(1)).unwrap();
        }
        assert!(s.push(Value::Uint64(1)).is_err());
    }

    #[test]
    fn pop_empty_is_underflow() {
        let mut s = Stack::new();
        assert_eq!(s.pop(), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn dig_duplicates_without_removing() {
        let mut s = Stack::new();
        s.push(Value::Uint64(1)).unwrap();
        s.push(Value::Uint64(2)).unwrap();
        s.dig(1).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.pop().unwrap(), Value::Uint64(1));
    }

    #[test]
    fn scratch_defaults_to_zero() {
        let scratch = Scratch::new();
        assert_eq!(scratch.load(10).unwrap(), Value::Uint64(0));
    }
}
