//! Application layer: the lock table, the consolidator and the top-level
//! manager composing the whole pipeline.

pub mod consolidator;
pub mod locks;
pub mod manager;
pub mod submit;

pub use consolidator::Consolidator;
pub use locks::{LockReason, UtxoLock, UtxoLockTable};
pub use manager::UtxoManager;
pub use submit::{classify_submit_error, extract_transaction_id, SubmitErrorKind, TransactionBuilder};
