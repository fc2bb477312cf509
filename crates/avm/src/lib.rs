// exports
pub mod engine;
pub mod global;
pub mod group;
pub mod logicsig;
pub mod params;
pub mod runtime;

pub use engine::{ExecutionEngine, ProgramArgs, TxnReceipt};
pub use logicsig::{LogicSig, LogicSigAuth};
pub use params::SignedTxn;
pub use runtime::Runtime;
