//! Swap client library
//!
//! Client for the peer-to-peer token swap escrow program: deterministic
//! address derivation, Make/Take/Refund transaction composition with native
//! SOL wrap/unwrap sequencing, and reconciliation of on-chain escrow records
//! into a displayable offer list.

pub mod config;
pub mod error;
pub mod instructions;
pub mod pda;
pub mod service;
pub mod state;
pub mod tokens;
pub mod watch;
pub mod wrap;

// Re-export public types for convenience
pub use config::SwapConfig;
pub use error::{Phase, SwapError};
pub use instructions::{
    InstructionPlan, MakeAccounts, RefundAccounts, TakeAccounts,
};
pub use service::SwapService;
pub use state::{Escrow, Offer, VaultRead};
pub use tokens::{TokenInfo, TokenRegistry};
pub use watch::OfferWatcher;
