/// Protocol-wide constants that are not opcode/stack bounds (those live in
/// `vm::stack` and `vm::assembler`). These are the engine-level limits from
/// the protocol's resource bounds and the minimum-balance schedule.
pub struct Config;

impl Config {
    /// Maximum number of transactions in one atomic group.
    pub const MAX_GROUP_SIZE: usize = 16;

    /// Maximum apps a single account may have created.
    pub const MAX_CREATED_APPS: usize = 10;

    /// Maximum apps a single account may be opted into.
    pub const MAX_OPTED_IN_APPS: usize = 10;

    /// Maximum assets a single account may have created.
    pub const MAX_CREATED_ASSETS: usize = 1000;

    /// Opcode-cost budget for a stateless (logic-signature) program run.
    pub const STATELESS_BUDGET: u64 = 700;

    /// Opcode-cost budget for a stateful (application) program run.
    pub const STATEFUL_BUDGET: u64 = 20_000;

    /// Default minimum fee charged per transaction, overridable per
    /// `Runtime` instance via `global MinTxnFee`.
    pub const MIN_TXN_FEE: u64 = 1_000;
}
