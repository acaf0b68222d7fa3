pub mod authority;
pub mod bridge;
pub mod chain;
pub mod fees;
pub mod message;
pub mod outbound;
pub mod receipt;
pub mod relayer;
pub mod sponsor;

pub use authority::*;
pub use bridge::*;
pub use chain::*;
pub use fees::*;
pub use message::*;
pub use outbound::*;
pub use receipt::*;
pub use relayer::*;
pub use sponsor::*;
