//! Host-independent protocol logic. Instruction handlers load accounts, call
//! into these functions and then move lamports and emit events.

pub mod admin;
pub mod inbound;
pub mod outbound;
pub mod relayers;

pub use inbound::{BatchMember, BatchOutcome, BatchResult, InboundEnv, InboundOutcome, MessageExecutor};
pub use outbound::{FeeSource, SendRequest};
