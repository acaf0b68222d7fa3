pub mod execution;
pub mod hash;
pub mod lamports;
pub mod signature;
