//! Wallet facade behavior over an in-memory backend.
//!
//! The backend below keeps daemon-side wallet state (accounts, created
//! addresses) in a mutex and uses the offline deriver to hand out real,
//! checksum-valid address strings.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uplexa::backend::offline::OfflineBackend;
use uplexa::{
    AccountSummary, Address, KeyImageImport, SignedKeyImage, SubAddress, Transfer,
    TransferOptions, Wallet, WalletBackend, WalletError,
};

const MASTER: &str =
    "47ewoP19TN7JEEnFKUJHAYhGxkeTRH82sf36giEp9AcNfDBfkAtRLX7A6rZz18bbNHPNV7ex6WYbMN3aKisFRJZ8Ebsmgef";
const VIEW_KEY: &str = "6d9056aa2c096bfcd2f272759555e5764ba204dd362604a983fa3e0aafd35901";
const ZERO_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000000";

struct DaemonState {
    /// Addresses per account, in creation order.
    accounts: Vec<Vec<Address>>,
    labels: Vec<Option<String>>,
}

struct InMemoryBackend {
    deriver: OfflineBackend,
    state: Mutex<DaemonState>,
    fail_writes: AtomicBool,
    skew_next_index: AtomicBool,
}

impl InMemoryBackend {
    fn new() -> InMemoryBackend {
        let deriver = OfflineBackend::new(MASTER, VIEW_KEY).unwrap();
        let master = deriver.get_address(0, 0).unwrap();
        InMemoryBackend {
            deriver,
            state: Mutex::new(DaemonState {
                accounts: vec![vec![master]],
                labels: vec![None],
            }),
            fail_writes: AtomicBool::new(false),
            skew_next_index: AtomicBool::new(false),
        }
    }

    fn check_writable(&self) -> Result<(), WalletError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WalletError::Rpc {
                method: "mock".into(),
                code: -1,
                message: "daemon rejected the write".into(),
            });
        }
        Ok(())
    }
}

impl WalletBackend for InMemoryBackend {
    fn accounts(&self) -> Result<Vec<AccountSummary>, WalletError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .enumerate()
            .map(|(i, addresses)| AccountSummary {
                index: i as u32,
                base_address: addresses[0].clone(),
                label: state.labels[i].clone(),
            })
            .collect())
    }

    fn addresses(&self, account_index: u32) -> Result<Vec<Address>, WalletError> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .get(account_index as usize)
            .cloned()
            .ok_or(WalletError::Rpc {
                method: "get_address".into(),
                code: -1,
                message: "no such account".into(),
            })
    }

    fn create_address(
        &self,
        account_index: u32,
        _label: Option<&str>,
    ) -> Result<SubAddress, WalletError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let addresses = &mut state.accounts[account_index as usize];
        let mut minor = addresses.len() as u32;
        if self.skew_next_index.swap(false, Ordering::SeqCst) {
            minor += 7;
        }
        let address = self.deriver.get_address(account_index, minor)?;
        match &address {
            Address::Sub(sub) => {
                addresses.push(address.clone());
                Ok(sub.clone())
            }
            Address::Primary(_) => unreachable!("minor index is never zero here"),
        }
    }

    fn create_account(&self, label: Option<&str>) -> Result<AccountSummary, WalletError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let index = state.accounts.len() as u32;
        let base = self.deriver.get_address(index, 0)?;
        state.accounts.push(vec![base.clone()]);
        state.labels.push(label.map(str::to_owned));
        Ok(AccountSummary {
            index,
            base_address: base,
            label: label.map(str::to_owned),
        })
    }

    fn get_address(&self, major: u32, minor: u32) -> Result<Address, WalletError> {
        self.deriver.get_address(major, minor)
    }

    fn balances(&self, _account_index: u32) -> Result<(u64, u64), WalletError> {
        Ok((5_000_000_000_000, 3_000_000_000_000))
    }

    fn height(&self) -> Result<u64, WalletError> {
        Ok(424_242)
    }

    fn view_key(&self) -> Result<String, WalletError> {
        Ok(VIEW_KEY.to_owned())
    }

    fn spend_key(&self) -> Result<String, WalletError> {
        Ok(ZERO_KEY.to_owned())
    }

    fn seed(&self) -> Result<String, WalletError> {
        Ok("sequence of seed words".to_owned())
    }

    fn export_outputs(&self) -> Result<String, WalletError> {
        Ok("6f7574707574".to_owned())
    }

    fn import_outputs(&self, outputs_hex: &str) -> Result<u64, WalletError> {
        self.check_writable()?;
        Ok((outputs_hex.len() / 2) as u64)
    }

    fn export_key_images(&self) -> Result<Vec<SignedKeyImage>, WalletError> {
        Ok(vec![SignedKeyImage {
            key_image: "aa".into(),
            signature: "bb".into(),
        }])
    }

    fn import_key_images(
        &self,
        key_images: &[SignedKeyImage],
    ) -> Result<KeyImageImport, WalletError> {
        self.check_writable()?;
        Ok(KeyImageImport {
            height: 424_242,
            spent: key_images.len() as u64 * 100,
            unspent: 0,
        })
    }

    fn transfer(
        &self,
        _account_index: u32,
        destinations: &[(Address, u64)],
        _options: &TransferOptions,
    ) -> Result<Vec<Transfer>, WalletError> {
        self.check_writable()?;
        Ok(vec![Transfer {
            hash: "deadbeef".into(),
            key: Some("cafe".into()),
            amount: destinations.iter().map(|(_, amount)| amount).sum(),
            fee: 7,
            blob: None,
        }])
    }
}

/// Delegates to the in-memory backend but hides account 1, so the
/// reported index sequence has a gap.
struct GappedBackend(InMemoryBackend);

impl WalletBackend for GappedBackend {
    fn accounts(&self) -> Result<Vec<AccountSummary>, WalletError> {
        Ok(self
            .0
            .accounts()?
            .into_iter()
            .filter(|summary| summary.index != 1)
            .collect())
    }

    fn addresses(&self, account_index: u32) -> Result<Vec<Address>, WalletError> {
        self.0.addresses(account_index)
    }

    fn create_address(
        &self,
        account_index: u32,
        label: Option<&str>,
    ) -> Result<SubAddress, WalletError> {
        self.0.create_address(account_index, label)
    }

    fn create_account(&self, label: Option<&str>) -> Result<AccountSummary, WalletError> {
        self.0.create_account(label)
    }

    fn get_address(&self, major: u32, minor: u32) -> Result<Address, WalletError> {
        self.0.get_address(major, minor)
    }

    fn balances(&self, account_index: u32) -> Result<(u64, u64), WalletError> {
        self.0.balances(account_index)
    }

    fn height(&self) -> Result<u64, WalletError> {
        self.0.height()
    }

    fn view_key(&self) -> Result<String, WalletError> {
        self.0.view_key()
    }

    fn spend_key(&self) -> Result<String, WalletError> {
        self.0.spend_key()
    }

    fn seed(&self) -> Result<String, WalletError> {
        self.0.seed()
    }

    fn export_outputs(&self) -> Result<String, WalletError> {
        self.0.export_outputs()
    }

    fn import_outputs(&self, outputs_hex: &str) -> Result<u64, WalletError> {
        self.0.import_outputs(outputs_hex)
    }

    fn export_key_images(&self) -> Result<Vec<SignedKeyImage>, WalletError> {
        self.0.export_key_images()
    }

    fn import_key_images(
        &self,
        key_images: &[SignedKeyImage],
    ) -> Result<KeyImageImport, WalletError> {
        self.0.import_key_images(key_images)
    }

    fn transfer(
        &self,
        account_index: u32,
        destinations: &[(Address, u64)],
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>, WalletError> {
        self.0.transfer(account_index, destinations, options)
    }
}

fn open_wallet() -> (Arc<InMemoryBackend>, Wallet) {
    let backend = Arc::new(InMemoryBackend::new());
    let wallet = Wallet::open(Arc::clone(&backend) as Arc<dyn WalletBackend>).unwrap();
    (backend, wallet)
}

#[test]
fn opens_with_the_master_address_on_account_zero() {
    let (_backend, wallet) = open_wallet();
    assert_eq!(wallet.accounts().len(), 1);
    assert_eq!(wallet.accounts()[0].index(), 0);
    assert!(wallet.address().is_primary());
    assert_eq!(wallet.address().as_str(), MASTER);
    assert_eq!(wallet.addresses().len(), 1);
}

#[test]
fn wallet_sugar_matches_account_zero() {
    let (_backend, mut wallet) = open_wallet();
    assert_eq!(wallet.balance().unwrap(), 5_000_000_000_000);
    assert_eq!(wallet.balances().unwrap(), (5_000_000_000_000, 3_000_000_000_000));

    let created = wallet.new_address(Some("rent")).unwrap();
    let account = &wallet.accounts()[0];
    assert_eq!(account.addresses().len(), 2);
    assert_eq!(&created, &account.addresses()[1]);
    assert!(!created.is_primary());
    let idx = created.subaddress_index().unwrap();
    assert_eq!((idx.major, idx.minor), (0, 1));
}

#[test]
fn new_addresses_take_sequential_minor_indices() {
    let (_backend, mut wallet) = open_wallet();
    for expected_minor in 1..=3u32 {
        let created = wallet.new_address(None).unwrap();
        let idx = created.subaddress_index().unwrap();
        assert_eq!(idx.minor, expected_minor);
        assert_eq!(wallet.addresses().len(), expected_minor as usize + 1);
    }
}

#[test]
fn new_account_gets_the_next_major_index() {
    let (_backend, mut wallet) = open_wallet();
    let account = wallet.new_account(Some("savings")).unwrap();
    assert_eq!(account.index(), 1);
    assert_eq!(account.label(), Some("savings"));
    assert!(!account.address().is_primary());
    assert_eq!(wallet.accounts().len(), 2);
}

#[test]
fn failed_creation_leaves_the_wallet_unchanged() {
    let (backend, mut wallet) = open_wallet();
    backend.fail_writes.store(true, Ordering::SeqCst);

    assert!(matches!(
        wallet.new_address(None),
        Err(WalletError::Rpc { .. })
    ));
    assert_eq!(wallet.addresses().len(), 1);

    assert!(matches!(
        wallet.new_account(None),
        Err(WalletError::Rpc { .. })
    ));
    assert_eq!(wallet.accounts().len(), 1);
}

#[test]
fn unexpected_daemon_index_is_rejected_without_caching() {
    let (backend, mut wallet) = open_wallet();
    backend.skew_next_index.store(true, Ordering::SeqCst);

    assert!(matches!(
        wallet.new_address(None),
        Err(WalletError::Decode(_))
    ));
    // the skewed address stays out of the local cache
    assert_eq!(wallet.addresses().len(), 1);
}

#[test]
fn refresh_picks_up_accounts_created_elsewhere() {
    let (backend, mut wallet) = open_wallet();
    backend.create_account(Some("from another client")).unwrap();
    assert_eq!(wallet.accounts().len(), 1);

    wallet.refresh().unwrap();
    assert_eq!(wallet.accounts().len(), 2);
    assert_eq!(
        wallet.accounts()[1].label(),
        Some("from another client")
    );
}

#[test]
fn zero_spend_key_reads_as_view_only() {
    let (_backend, wallet) = open_wallet();
    assert_eq!(wallet.view_key().unwrap(), VIEW_KEY);
    assert_eq!(wallet.spend_key().unwrap(), None);
}

#[test]
fn get_address_derives_through_the_backend() {
    let (_backend, wallet) = open_wallet();
    let addr = wallet.get_address(100, 37847).unwrap();
    assert_eq!(
        addr.as_str(),
        "883Gcsq65iqh4UL3fJTWLxY45skXyFVNQJZ4bdw4TJcqd8vafvtpX4p6HNmawqFMQ6TwJP7adzyLT1fbU6z1n9dqB9bJrfn"
    );
}

#[test]
fn confirmations_count_from_the_current_tip() {
    // the backend's height is fixed at 424_242
    let (_backend, wallet) = open_wallet();
    assert_eq!(wallet.confirmations(Some(424_240)).unwrap(), 2);
    assert_eq!(wallet.confirmations(Some(424_242)).unwrap(), 0);
    // a height past the tip never goes negative
    assert_eq!(wallet.confirmations(Some(500_000)).unwrap(), 0);
    // still in the mempool
    assert_eq!(wallet.confirmations(None).unwrap(), 0);
}

#[test]
fn cold_signing_round_trip_passes_through() {
    let (_backend, wallet) = open_wallet();
    let outputs = wallet.export_outputs().unwrap();
    assert_eq!(wallet.import_outputs(&outputs).unwrap(), 6);

    let images = wallet.export_key_images().unwrap();
    assert_eq!(images.len(), 1);
    let import = wallet.import_key_images(&images).unwrap();
    assert_eq!(
        import,
        KeyImageImport {
            height: 424_242,
            spent: 100,
            unspent: 0
        }
    );
}

#[test]
fn account_lookup_follows_indices_across_gaps() {
    let inner = InMemoryBackend::new();
    inner.create_account(Some("hidden")).unwrap();
    inner.create_account(Some("visible")).unwrap();

    let wallet = Wallet::open(Arc::new(GappedBackend(inner))).unwrap();
    assert_eq!(wallet.accounts().len(), 2);
    // index 1 is not reported, so it must not resolve to the account
    // sitting at list position 1
    assert!(wallet.account(1).is_none());
    let visible = wallet.account(2).unwrap();
    assert_eq!(visible.index(), 2);
    assert_eq!(visible.label(), Some("visible"));
}

#[test]
fn transfers_flow_through_account_zero() {
    let (_backend, wallet) = open_wallet();
    let dest = wallet.get_address(0, 5).unwrap();
    let transfers = wallet
        .transfer(&dest, 1_000, &TransferOptions::default())
        .unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].amount, 1_000);

    let multi = wallet
        .transfer_multiple(
            &[(dest.clone(), 600), (wallet.get_address(0, 6).unwrap(), 400)],
            &TransferOptions::default(),
        )
        .unwrap();
    assert_eq!(multi[0].amount, 1_000);
}
