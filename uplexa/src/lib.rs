//! Client library for the uPlexa wallet daemon.
//!
//! The entry point is [`Wallet`], opened over one of two backends:
//! [`backend::jsonrpc::JsonRpcBackend`] for a running `uplexa-wallet-rpc`
//! daemon, or [`backend::offline::OfflineBackend`] for local subaddress
//! derivation from a secret view key.
//!
//! ```no_run
//! use std::sync::Arc;
//! use uplexa::{backend::jsonrpc::{JsonRpcBackend, RpcConfig}, Wallet};
//!
//! # fn main() -> uplexa::Result<()> {
//! let backend = JsonRpcBackend::new(&RpcConfig::default())?;
//! let wallet = Wallet::open(Arc::new(backend))?;
//! println!("{}", wallet.address());
//! println!("{} atomic units", wallet.balance()?);
//! # Ok(())
//! # }
//! ```
//!
//! All amounts cross the API as `u64` atomic units; [`amount`] converts
//! to and from decimal strings. All calls are synchronous and never
//! retried.

pub mod account;
pub mod address;
pub mod amount;
pub mod backend;
pub mod base58;
pub mod error;
pub mod wallet;

pub use account::Account;
pub use address::{Address, AddressError, Network, PrimaryAddress, SubAddress, SubaddressIndex};
pub use backend::{
    AccountSummary, KeyImageImport, Priority, SignedKeyImage, Transfer, TransferOptions,
    WalletBackend,
};
pub use error::{Result, WalletError};
pub use wallet::Wallet;

/// Ring size used by every uPlexa transaction. Fixed by the protocol;
/// the daemon applies it and the API offers no way to change it.
pub const RING_SIZE: u32 = 11;
