pub mod block;
pub mod chain_store;
pub mod engine;
pub mod error;
pub mod mempool;
pub mod outputs;

pub use block::{Block, BlockPayload};
pub use chain_store::{AppendOutcome, ChainStore};
pub use engine::{Engine, EngineConfig};
pub use error::ChainError;
pub use mempool::Mempool;
pub use outputs::{select_inputs, unspent_outputs_for, Output, Selection};
