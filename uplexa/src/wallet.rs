//! Wallet facade.
//!
//! A [`Wallet`] owns one backend and the accounts discovered through it.
//! Account 0 always exists, so the single-account operations everyone
//! uses day to day are available directly on the wallet and delegate to
//! account 0.

use crate::account::Account;
use crate::address::Address;
use crate::backend::{KeyImageImport, SignedKeyImage, Transfer, TransferOptions, WalletBackend};
use crate::error::{Result, WalletError};
use std::sync::Arc;
use tracing::debug;

const ZERO_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub struct Wallet {
    backend: Arc<dyn WalletBackend>,
    accounts: Vec<Account>,
}

impl Wallet {
    /// Open a wallet over a backend, loading all visible accounts.
    pub fn open(backend: Arc<dyn WalletBackend>) -> Result<Wallet> {
        let mut wallet = Wallet {
            backend,
            accounts: Vec::new(),
        };
        wallet.refresh()?;
        if wallet.accounts.is_empty() {
            return Err(WalletError::Decode(
                "backend reported no accounts, expected at least account 0".into(),
            ));
        }
        Ok(wallet)
    }

    /// Re-query the backend for accounts, appending any that appeared
    /// since the last refresh. Existing account handles are kept.
    pub fn refresh(&mut self) -> Result<()> {
        let summaries = self.backend.accounts()?;
        for summary in summaries.into_iter().skip(self.accounts.len()) {
            let account =
                Account::load(Arc::clone(&self.backend), summary.index, summary.label)?;
            self.accounts.push(account);
        }
        debug!(accounts = self.accounts.len(), "wallet refreshed");
        Ok(())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut [Account] {
        &mut self.accounts
    }

    /// Look up an account by its major index. Resolution goes through
    /// [`Account::index`], not list position, so a daemon reporting a gap
    /// in its index sequence cannot shift lookups onto the wrong account.
    pub fn account(&self, index: u32) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.index() == index)
    }

    pub fn account_mut(&mut self, index: u32) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|acc| acc.index() == index)
    }

    /// Create the next account. The local list grows only if the daemon
    /// assigned the index this wallet expected.
    pub fn new_account(&mut self, label: Option<&str>) -> Result<&Account> {
        let expected = self.accounts.len() as u32;
        let summary = self.backend.create_account(label)?;
        if summary.index != expected {
            return Err(WalletError::Decode(format!(
                "daemon created account {} but {} accounts were known",
                summary.index, expected
            )));
        }
        let account = Account::load(Arc::clone(&self.backend), summary.index, summary.label)?;
        self.accounts.push(account);
        Ok(&self.accounts[expected as usize])
    }

    /// Resolve any (major, minor) pair to an address, whether or not it
    /// has been created on the daemon.
    pub fn get_address(&self, major: u32, minor: u32) -> Result<Address> {
        self.backend.get_address(major, minor)
    }

    /// Current wallet blockchain height.
    pub fn height(&self) -> Result<u64> {
        self.backend.height()
    }

    /// Secret view key, hex encoded.
    pub fn view_key(&self) -> Result<String> {
        self.backend.view_key()
    }

    /// Secret spend key. `None` for view-only wallets, which report an
    /// all-zero key.
    pub fn spend_key(&self) -> Result<Option<String>> {
        let key = self.backend.spend_key()?;
        Ok((key != ZERO_KEY).then_some(key))
    }

    /// Mnemonic seed phrase.
    pub fn seed(&self) -> Result<String> {
        self.backend.seed()
    }

    /// Confirmations a transaction mined at `tx_height` has accumulated.
    /// `None` (still in the mempool) counts as zero, as does a height
    /// above the current tip.
    pub fn confirmations(&self, tx_height: Option<u64>) -> Result<u64> {
        match tx_height {
            Some(mined_at) => Ok(self.height()?.saturating_sub(mined_at)),
            None => Ok(0),
        }
    }

    /// Wallet outputs as a hex blob, for import into a cold wallet.
    pub fn export_outputs(&self) -> Result<String> {
        self.backend.export_outputs()
    }

    /// Import an outputs hex blob, returning how many were imported.
    pub fn import_outputs(&self, outputs_hex: &str) -> Result<u64> {
        self.backend.import_outputs(outputs_hex)
    }

    /// Signed key images for every output the wallet has seen.
    pub fn export_key_images(&self) -> Result<Vec<SignedKeyImage>> {
        self.backend.export_key_images()
    }

    /// Import signed key images, returning the resulting spent/unspent
    /// totals.
    pub fn import_key_images(&self, key_images: &[SignedKeyImage]) -> Result<KeyImageImport> {
        self.backend.import_key_images(key_images)
    }

    // Account 0 sugar.

    /// The master address.
    pub fn address(&self) -> &Address {
        self.accounts[0].address()
    }

    /// Addresses of account 0.
    pub fn addresses(&self) -> &[Address] {
        self.accounts[0].addresses()
    }

    /// Create the next subaddress of account 0.
    pub fn new_address(&mut self, label: Option<&str>) -> Result<Address> {
        self.accounts[0].new_address(label)
    }

    /// Total balance of account 0, in atomic units.
    pub fn balance(&self) -> Result<u64> {
        self.accounts[0].balance()
    }

    /// (total, unlocked) balance of account 0, in atomic units.
    pub fn balances(&self) -> Result<(u64, u64)> {
        self.accounts[0].balances()
    }

    /// Send from account 0 to a single destination.
    pub fn transfer(
        &self,
        destination: &Address,
        amount: u64,
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>> {
        self.accounts[0].transfer(destination, amount, options)
    }

    /// Send from account 0 to several destinations.
    pub fn transfer_multiple(
        &self,
        destinations: &[(Address, u64)],
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>> {
        self.accounts[0].transfer_multiple(destinations, options)
    }
}
