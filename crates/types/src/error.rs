use thiserror::Error;

/// A type tag used when reporting `INVALID_TYPE` mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Uint64,
    Bytes,
}

impl core::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TypeTag::Uint64 => write!(f, "uint64"),
            TypeTag::Bytes => write!(f, "bytes"),
        }
    }
}

/// Every fatal condition the runtime can raise, stable-named per the
/// protocol's error taxonomy. Assembly errors are raised while building
/// the opcode list; interpreter and engine errors are raised while
/// executing it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    // --- Assembly ---
    #[error("#pragma version must be the first instruction")]
    PragmaNotAtFirstLine,
    #[error("invalid or unsupported pragma version: {0}")]
    PragmaVersionError(u64),
    #[error("wrong number of arguments for field {0}")]
    AssertFieldLength(String),
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),
    #[error("invalid address literal: {0}")]
    InvalidAddr(String),
    #[error("unknown byte-literal decode tag: {0}")]
    UnknownDecodeType(String),
    #[error("unknown asset field: {0}")]
    UnknownAssetField(String),
    #[error("unknown global field: {0}")]
    UnknownGlobalField(String),
    #[error("unknown transaction field: {0}")]
    UnknownTxField(String),
    #[error("unresolved branch label: {0}")]
    UnresolvedLabel(String),
    #[error("opcode {opcode} requires version >= {min_version}, program declares {declared}")]
    OpcodeVersionGate {
        opcode: String,
        min_version: u64,
        declared: u64,
    },

    // --- Interpreter (typed) ---
    #[error("invalid type: expected {expected}, got {actual}")]
    InvalidType { expected: TypeTag, actual: TypeTag },
    #[error("uint64 overflow")]
    Uint64Overflow,
    #[error("uint64 underflow")]
    Uint64Underflow,
    #[error("division by zero")]
    ZeroDiv,
    #[error("value is not a valid uint8: {0}")]
    InvalidUint8(u64),
    #[error("setbit value must be 0 or 1, got {0}")]
    SetBitValueError(u64),
    #[error("substring end before start: start={start}, end={end}")]
    SubstringEndBeforeStart { start: u64, end: u64 },
    #[error("substring range beyond input length: end={end}, len={len}")]
    SubstringRangeBeyond { end: u64, len: usize },
    #[error("input too long: {0} bytes")]
    LongInputError(usize),
    #[error("concat result exceeds maximum byte-string length")]
    ConcatError,
    #[error("stack assertion failed: expected at least {expected} elements, found {found}")]
    AssertStackLength { expected: usize, found: usize },
    #[error("array assertion failed: index {index} out of {len}")]
    AssertArrLength { index: u64, len: usize },
    #[error("index out of bounds: {index} (len {len})")]
    IndexOutOfBound { index: u64, len: usize },
    #[error("invalid operand for opcode {0}")]
    InvalidOpArg(String),
    #[error("invalid stack element at position {0}")]
    InvalidStackElem(usize),
    #[error("logic rejected by program")]
    LogicRejection,
    #[error("err opcode encountered")]
    TealEncounteredErr,
    #[error("invalid field type for field {0}")]
    InvalidFieldType(String),
    #[error("stack depth exceeded: {0}")]
    StackOverflow(usize),
    #[error("pop on empty stack")]
    StackUnderflow,
    #[error("program terminated with stack size {0}, expected exactly 1")]
    FinalStackSizeError(usize),
    #[error("program terminated with a zero or non-uint64 top of stack")]
    FinalStackValueError,
    #[error("cost budget exceeded: used {used}, budget {budget}")]
    CostBudgetExceeded { used: u64, budget: u64 },
    #[error("stateful opcode used while executing in stateless mode")]
    StatefulOpcodeInStatelessMode,
    #[error("scratch slot index out of range: {0}")]
    ScratchIndexOutOfRange(u64),
    #[error("const block index out of range: {0}")]
    ConstIndexOutOfRange(u64),

    // --- World / engine ---
    #[error("account does not exist: {0}")]
    AccountDoesNotExist(String),
    #[error("application not found: {0}")]
    AppNotFound(u64),
    #[error("asset not found: {0}")]
    AssetNotFound(u64),
    #[error("account is not opted into asset {0}")]
    AsaNotOptin(u64),
    #[error("account asset {0} is frozen")]
    AccountAssetFrozen(u64),
    #[error("sender is not the manager of asset {0}")]
    ManagerError(u64),
    #[error("sender is not the freeze role of asset {0}")]
    FreezeError(u64),
    #[error("sender is not the clawback role of asset {0}")]
    ClawbackError(u64),
    #[error("insufficient account balance")]
    InsufficientAccountBalance,
    #[error("insufficient account assets")]
    InsufficientAccountAssets,
    #[error("invalid transaction parameters: {0}")]
    InvalidTransactionParams(String),
    #[error("invalid round")]
    InvalidRound,
    #[error("transaction rejected by logic")]
    RejectedByLogic,
    #[error("logic signature not found")]
    LogicSignatureNotFound,
    #[error("logic signature validation failed")]
    LogicSignatureValidationFailed,
    #[error("group size {0} exceeds maximum of 16")]
    GroupSizeExceeded(usize),
    #[error("schema exceeded: {0}")]
    SchemaExceeded(String),
    #[error("min balance violation: required {required}, have {have}")]
    MinBalanceViolation { required: u128, have: u128 },
    #[error("asset role address cannot be reset to the zero address")]
    AssetRoleLockedBlank,
    #[error("account already opted into {0}")]
    AlreadyOptedIn(u64),
    #[error("account not opted into {0}")]
    NotOptedIn(u64),
    #[error("account holds outstanding asset balance; cannot destroy")]
    AssetSupplyNotHeldByCreator,
    #[error("account retains created entities; cannot close out")]
    AccountHasAssetsOrApps,
    #[error("ambiguous signing: both secret-key and logic-signature present")]
    AmbiguousSigning,
}

/// A `RuntimeError` annotated with the source line (when known from the
/// assembled program) and free-form context, exactly the
/// `{kind, line?, context}` shape the protocol's callers observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecError {
    pub kind: RuntimeError,
    pub line: Option<u32>,
    pub context: String,
}

impl ExecError {
    pub fn new(kind: RuntimeError) -> Self {
        Self {
            kind,
            line: None,
            context: String::new(),
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Like `with_line`, but leaves an already-set line untouched and is a
    /// no-op for `None` — lets a caller attach "the line we were executing
    /// when this bubbled up" without overwriting a more specific line an
    /// inner call already attached.
    pub fn with_line_opt(self, line: Option<u32>) -> Self {
        if self.line.is_some() {
            return self;
        }
        match line {
            Some(line) => self.with_line(line),
            None => self,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

impl From<RuntimeError> for ExecError {
    fn from(kind: RuntimeError) -> Self {
        ExecError::new(kind)
    }
}

impl core::fmt::Display for ExecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

pub type RResult<T> = core::result::Result<T, ExecError>;
