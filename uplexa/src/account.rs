//! Account handle.
//!
//! An [`Account`] is a view on one major index of the wallet. It caches
//! the account's address list and forwards balances and transfers to the
//! shared backend. The cache only changes after the backend has accepted
//! the corresponding operation.

use crate::address::Address;
use crate::backend::{Transfer, TransferOptions, WalletBackend};
use crate::error::{Result, WalletError};
use std::sync::Arc;
use tracing::debug;

pub struct Account {
    backend: Arc<dyn WalletBackend>,
    index: u32,
    addresses: Vec<Address>,
    label: Option<String>,
}

impl Account {
    /// Load an account, fetching its current address list.
    pub(crate) fn load(
        backend: Arc<dyn WalletBackend>,
        index: u32,
        label: Option<String>,
    ) -> Result<Account> {
        let addresses = backend.addresses(index)?;
        if addresses.is_empty() {
            return Err(WalletError::Decode(format!(
                "account {index} has no addresses"
            )));
        }
        debug!(index, count = addresses.len(), "loaded account addresses");
        Ok(Account {
            backend,
            index,
            addresses,
            label,
        })
    }

    /// Major index of this account.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The account's base address (minor index 0).
    pub fn address(&self) -> &Address {
        &self.addresses[0]
    }

    /// All known addresses of this account, in creation order.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Create the next subaddress. The cached list grows only after the
    /// backend reports success.
    pub fn new_address(&mut self, label: Option<&str>) -> Result<Address> {
        let sub = self.backend.create_address(self.index, label)?;
        let expected_minor = self.addresses.len() as u32;
        match sub.index() {
            Some(idx) if idx.minor == expected_minor => {}
            Some(idx) => {
                return Err(WalletError::Decode(format!(
                    "daemon created address {}/{} but {} addresses were known",
                    idx.major,
                    idx.minor,
                    self.addresses.len()
                )))
            }
            None => {
                return Err(WalletError::Decode(
                    "created address came back without an index".into(),
                ))
            }
        }
        let address = Address::Sub(sub);
        self.addresses.push(address.clone());
        Ok(address)
    }

    /// Total balance, in atomic units.
    pub fn balance(&self) -> Result<u64> {
        Ok(self.balances()?.0)
    }

    /// (total, unlocked) balance, in atomic units.
    pub fn balances(&self) -> Result<(u64, u64)> {
        self.backend.balances(self.index)
    }

    /// Send to a single destination.
    pub fn transfer(
        &self,
        destination: &Address,
        amount: u64,
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>> {
        self.backend
            .transfer(self.index, &[(destination.clone(), amount)], options)
    }

    /// Send to several destinations in one transaction set.
    pub fn transfer_multiple(
        &self,
        destinations: &[(Address, u64)],
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>> {
        self.backend.transfer(self.index, destinations, options)
    }
}
