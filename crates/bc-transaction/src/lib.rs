pub mod envelope;
pub mod error;
pub mod message;
pub mod transaction;
pub mod transaction_type;

pub use envelope::{SignedEnvelope, WirePayload};
pub use error::TransactionError;
pub use message::{MessageKind, WireMessage};
pub use transaction::{NodeId, Transaction};
pub use transaction_type::TransactionKind;
