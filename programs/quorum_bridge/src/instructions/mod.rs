pub mod admin;
pub mod initialize;
pub mod outbound_status;
pub mod process_batch;
pub mod process_message;
pub mod receipts;
pub mod relayer;
pub mod send_message;
pub mod sponsor;

pub use admin::*;
pub use initialize::*;
pub use outbound_status::*;
pub use process_batch::*;
pub use process_message::*;
pub use receipts::*;
pub use relayer::*;
pub use send_message::*;
pub use sponsor::*;
