//! Providers Module - External Data Sources
//!
//! Ledger RPC plus the reputation ports. Pure I/O, no scoring logic.

pub mod ledger;
pub mod reputation;
pub mod rpc;

pub use ledger::*;
pub use reputation::*;
pub use rpc::*;
