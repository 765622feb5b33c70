//! Offline backend.
//!
//! Derives subaddresses locally from the master address and the secret
//! view key. No daemon is contacted; every operation that needs wallet
//! state on the daemon side fails with [`WalletError::Unsupported`].

use crate::address::{Address, AddressBody, PrimaryAddress, SubAddress, SubaddressIndex};
use crate::backend::{
    AccountSummary, KeyImageImport, SignedKeyImage, Transfer, TransferOptions, WalletBackend,
};
use crate::error::{Result, WalletError};
use curve25519_dalek::{
    constants::ED25519_BASEPOINT_TABLE,
    edwards::{CompressedEdwardsY, EdwardsPoint},
    Scalar,
};
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

#[derive(Debug)]
pub struct OfflineBackend {
    master: PrimaryAddress,
    view_key: Zeroizing<[u8; 32]>,
    spend_public: EdwardsPoint,
}

impl OfflineBackend {
    /// Build a backend from master address text and the secret view key
    /// as 64 hex characters.
    pub fn new(address: &str, view_key: &str) -> Result<OfflineBackend> {
        let master = match Address::parse(address)? {
            Address::Primary(primary) => primary,
            Address::Sub(_) => {
                return Err(WalletError::Validation(
                    "a master address is required, got a subaddress".into(),
                ))
            }
        };
        let key_bytes = hex::decode(view_key)
            .map_err(|_| WalletError::Validation("view key is not valid hex".into()))?;
        let view_key: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| WalletError::Validation("view key must be 32 bytes".into()))?;
        let spend_public = CompressedEdwardsY(master.body.spend_public)
            .decompress()
            .ok_or_else(|| {
                WalletError::Validation("master address spend key is not a valid point".into())
            })?;
        Ok(OfflineBackend {
            master,
            view_key: Zeroizing::new(view_key),
            spend_public,
        })
    }

    /// m = Hs("SubAddr\0" ‖ view_key ‖ LE32(major) ‖ LE32(minor))
    fn derivation_scalar(&self, major: u32, minor: u32) -> Scalar {
        let mut data = Zeroizing::new(Vec::with_capacity(8 + 32 + 8));
        data.extend_from_slice(b"SubAddr\0");
        data.extend_from_slice(self.view_key.as_slice());
        data.extend_from_slice(&major.to_le_bytes());
        data.extend_from_slice(&minor.to_le_bytes());
        let digest: [u8; 32] = Keccak256::digest(data.as_slice()).into();
        Scalar::from_bytes_mod_order(digest)
    }
}

impl WalletBackend for OfflineBackend {
    fn accounts(&self) -> Result<Vec<AccountSummary>> {
        Ok(vec![AccountSummary {
            index: 0,
            base_address: Address::Primary(self.master.clone()),
            label: None,
        }])
    }

    fn addresses(&self, account_index: u32) -> Result<Vec<Address>> {
        // without a wallet file there is no record of created indices;
        // only the master address is known to exist
        if account_index != 0 {
            return Err(WalletError::Unsupported("get_address"));
        }
        Ok(vec![Address::Primary(self.master.clone())])
    }

    fn create_address(&self, _account_index: u32, _label: Option<&str>) -> Result<SubAddress> {
        Err(WalletError::Unsupported("create_address"))
    }

    fn create_account(&self, _label: Option<&str>) -> Result<AccountSummary> {
        Err(WalletError::Unsupported("create_account"))
    }

    fn get_address(&self, major: u32, minor: u32) -> Result<Address> {
        if major == 0 && minor == 0 {
            return Ok(Address::Primary(self.master.clone()));
        }
        let m = self.derivation_scalar(major, minor);
        // D = B_spend + m·G, C = a·D
        let spend = self.spend_public + (&m * ED25519_BASEPOINT_TABLE);
        let view_scalar = Scalar::from_bytes_mod_order(*self.view_key);
        let view = view_scalar * spend;
        let network = self.master.network();
        let body = AddressBody::assemble(
            network,
            network.subaddress_byte(),
            spend.compress().to_bytes(),
            view.compress().to_bytes(),
        );
        Ok(Address::Sub(SubAddress {
            body,
            index: Some(SubaddressIndex { major, minor }),
        }))
    }

    fn balances(&self, _account_index: u32) -> Result<(u64, u64)> {
        Err(WalletError::Unsupported("get_balance"))
    }

    fn height(&self) -> Result<u64> {
        Err(WalletError::Unsupported("get_height"))
    }

    fn view_key(&self) -> Result<String> {
        Ok(hex::encode(self.view_key.as_slice()))
    }

    fn spend_key(&self) -> Result<String> {
        Err(WalletError::Unsupported("query_key"))
    }

    fn seed(&self) -> Result<String> {
        Err(WalletError::Unsupported("query_key"))
    }

    fn export_outputs(&self) -> Result<String> {
        Err(WalletError::Unsupported("export_outputs"))
    }

    fn import_outputs(&self, _outputs_hex: &str) -> Result<u64> {
        Err(WalletError::Unsupported("import_outputs"))
    }

    fn export_key_images(&self) -> Result<Vec<SignedKeyImage>> {
        Err(WalletError::Unsupported("export_key_images"))
    }

    fn import_key_images(&self, _key_images: &[SignedKeyImage]) -> Result<KeyImageImport> {
        Err(WalletError::Unsupported("import_key_images"))
    }

    fn transfer(
        &self,
        _account_index: u32,
        _destinations: &[(Address, u64)],
        _options: &TransferOptions,
    ) -> Result<Vec<Transfer>> {
        Err(WalletError::Unsupported("transfer_split"))
    }
}
