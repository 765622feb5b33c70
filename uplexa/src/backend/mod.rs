//! Wallet backends.
//!
//! A backend answers account, address, balance and transfer requests on
//! behalf of [`Wallet`](crate::Wallet). Two implementations exist:
//! [`jsonrpc::JsonRpcBackend`] talks to a running `uplexa-wallet-rpc`
//! daemon, and [`offline::OfflineBackend`] derives subaddresses locally
//! from a secret view key without touching the network.

pub mod jsonrpc;
pub mod offline;

use crate::address::{Address, SubAddress};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One account as reported by the backend during wallet refresh.
#[derive(Clone, Debug)]
pub struct AccountSummary {
    /// Major index, assigned sequentially by the daemon.
    pub index: u32,
    /// The account's primary address (a subaddress for every account but
    /// the first).
    pub base_address: Address,
    /// Daemon-side label, if any.
    pub label: Option<String>,
}

/// Transaction priority, which the daemon turns into a fee level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Priority {
    Unimportant,
    #[default]
    Normal,
    Elevated,
    Priority,
}

impl Priority {
    pub(crate) fn as_u32(self) -> u32 {
        match self {
            Priority::Unimportant => 1,
            Priority::Normal => 2,
            Priority::Elevated => 3,
            Priority::Priority => 4,
        }
    }
}

/// Options shared by all transfer operations.
///
/// Ring size is a fixed protocol constant ([`crate::RING_SIZE`]) chosen by
/// the daemon; it is deliberately absent here.
#[derive(Clone, Debug)]
pub struct TransferOptions {
    pub priority: Priority,
    /// Payment ID as 16 or 64 hex characters.
    pub payment_id: Option<String>,
    /// Extra unlock delay, in blocks.
    pub unlock_time: u64,
    /// When false, the daemon constructs and returns the transactions but
    /// does not broadcast them.
    pub relay: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions {
            priority: Priority::default(),
            payment_id: None,
            unlock_time: 0,
            relay: true,
        }
    }
}

/// A key image together with the signature proving it, as exported by
/// the daemon for cold-signing round trips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedKeyImage {
    pub key_image: String,
    pub signature: String,
}

/// Result of importing signed key images back into a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyImageImport {
    /// Height the daemon scanned up to while applying the images.
    pub height: u64,
    /// Total spent, in atomic units.
    pub spent: u64,
    /// Total unspent, in atomic units.
    pub unspent: u64,
}

/// One transaction resulting from a transfer.
#[derive(Clone, Debug)]
pub struct Transfer {
    pub hash: String,
    /// Transaction secret key, when the daemon returned one.
    pub key: Option<String>,
    /// Amount sent, in atomic units.
    pub amount: u64,
    /// Fee paid, in atomic units.
    pub fee: u64,
    /// Raw transaction hex, present when the transfer was not relayed.
    pub blob: Option<String>,
}

/// Operations a wallet delegates to its backend.
///
/// Every call is synchronous and atomic: it either fully succeeds or
/// fails without side effects the caller can observe. There is no retry
/// logic at this layer. A single backend instance is shared by all
/// accounts of one wallet; callers serialize concurrent use themselves.
pub trait WalletBackend: Send + Sync {
    /// All accounts currently known to the backend, ordered by index.
    fn accounts(&self) -> Result<Vec<AccountSummary>>;

    /// All addresses of one account, in creation order.
    fn addresses(&self, account_index: u32) -> Result<Vec<Address>>;

    /// Create the next subaddress of an account. The returned address
    /// carries its (major, minor) pair.
    fn create_address(&self, account_index: u32, label: Option<&str>) -> Result<SubAddress>;

    /// Create the next account.
    fn create_account(&self, label: Option<&str>) -> Result<AccountSummary>;

    /// Resolve a single (major, minor) pair to an address.
    fn get_address(&self, major: u32, minor: u32) -> Result<Address>;

    /// (total, unlocked) balance of an account, in atomic units.
    fn balances(&self, account_index: u32) -> Result<(u64, u64)>;

    /// Current wallet blockchain height.
    fn height(&self) -> Result<u64>;

    /// Secret view key, hex encoded.
    fn view_key(&self) -> Result<String>;

    /// Secret spend key, hex encoded. View-only wallets report all zeros.
    fn spend_key(&self) -> Result<String>;

    /// Mnemonic seed phrase.
    fn seed(&self) -> Result<String>;

    /// Wallet outputs as a hex blob, for import into a cold wallet.
    fn export_outputs(&self) -> Result<String>;

    /// Import an outputs hex blob, returning how many were imported.
    fn import_outputs(&self, outputs_hex: &str) -> Result<u64>;

    /// Signed key images for every output the wallet has seen.
    fn export_key_images(&self) -> Result<Vec<SignedKeyImage>>;

    /// Import signed key images, returning the resulting spent/unspent
    /// totals.
    fn import_key_images(&self, key_images: &[SignedKeyImage]) -> Result<KeyImageImport>;

    /// Send from one account to one or more destinations, returning the
    /// resulting transactions.
    fn transfer(
        &self,
        account_index: u32,
        destinations: &[(Address, u64)],
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>>;
}
