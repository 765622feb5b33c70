//! JSON-RPC backend.
//!
//! Minimal, blocking HTTP client for `uplexa-wallet-rpc`. Every backend
//! operation is a single POST to `/json_rpc` with a JSON-RPC 2.0
//! envelope; there is no retry or failover logic. Method names and
//! parameter shapes belong to the daemon and are treated as a versioned
//! external contract.
//!
//! Methods used: `get_accounts`, `create_account`, `get_address`,
//! `create_address`, `get_balance`, `get_height`, `query_key`,
//! `transfer_split`, `export_outputs`, `import_outputs`,
//! `export_key_images`, `import_key_images`.

use crate::address::{Address, SubAddress, SubaddressIndex};
use crate::backend::{
    AccountSummary, KeyImageImport, SignedKeyImage, Transfer, TransferOptions, WalletBackend,
};
use crate::error::{Result, WalletError};
use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Connection parameters for a wallet daemon.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    /// Optional HTTP Basic credentials.
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        RpcConfig {
            host: "127.0.0.1".into(),
            port: 21065,
            user: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct JsonRpcBackend {
    endpoint: Url,
    client: Client,
    auth_header: Option<HeaderValue>,
}

impl JsonRpcBackend {
    pub fn new(config: &RpcConfig) -> Result<JsonRpcBackend> {
        let endpoint = Url::parse(&format!("http://{}:{}/json_rpc", config.host, config.port))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let auth_header = match &config.user {
            Some(user) => {
                let password = config.password.as_deref().unwrap_or("");
                let token = general_purpose::STANDARD.encode(format!("{user}:{password}"));
                let value = HeaderValue::from_str(&format!("Basic {token}"))
                    .map_err(|e| WalletError::Decode(format!("auth header encode: {e}")))?;
                Some(value)
            }
            None => None,
        };

        Ok(JsonRpcBackend {
            endpoint,
            client,
            auth_header,
        })
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth) = &self.auth_header {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        headers
    }

    fn call<P, R>(&self, method: &str, params: Option<&P>) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        #[derive(Serialize)]
        struct Request<'a, T> {
            jsonrpc: &'a str,
            id: &'a str,
            method: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            params: Option<&'a T>,
        }

        #[derive(Deserialize)]
        struct Envelope<T> {
            result: Option<T>,
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            code: i64,
            message: String,
        }

        let request = Request {
            jsonrpc: "2.0",
            id: "0",
            method,
            params,
        };
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.auth_headers())
            .json(&request)
            .send()?
            .error_for_status()?;
        let envelope: Envelope<R> = response.json()?;
        debug!(method, elapsed_ms = start.elapsed().as_millis() as u64, "wallet rpc call");

        if let Some(err) = envelope.error {
            warn!(method, code = err.code, message = %err.message, "wallet rpc error");
            return Err(WalletError::Rpc {
                method: method.to_owned(),
                code: err.code,
                message: err.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| WalletError::Decode(format!("{method} missing result")))
    }

    fn query_key(&self, key_type: &'static str) -> Result<String> {
        #[derive(Serialize)]
        struct Params {
            key_type: &'static str,
        }
        #[derive(Deserialize)]
        struct KeyResult {
            key: String,
        }
        let result: KeyResult = self.call("query_key", Some(&Params { key_type }))?;
        Ok(result.key)
    }
}

// Wire shapes owned by the daemon.

#[derive(Deserialize)]
struct SubaddressAccount {
    account_index: u32,
    base_address: String,
    #[serde(default)]
    label: String,
}

#[derive(Deserialize)]
struct GetAccountsResult {
    #[serde(default)]
    subaddress_accounts: Vec<SubaddressAccount>,
}

#[derive(Serialize)]
struct GetAddressParams {
    account_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_index: Option<Vec<u32>>,
}

#[derive(Deserialize)]
struct AddressEntry {
    address: String,
    address_index: u32,
}

#[derive(Deserialize)]
struct GetAddressResult {
    #[serde(default)]
    addresses: Vec<AddressEntry>,
}

#[derive(Serialize)]
struct CreateAddressParams<'a> {
    account_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreateAddressResult {
    address: String,
    address_index: u32,
}

#[derive(Serialize)]
struct CreateAccountParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreateAccountResult {
    account_index: u32,
    address: String,
}

#[derive(Serialize)]
struct GetBalanceParams {
    account_index: u32,
}

#[derive(Deserialize)]
struct GetBalanceResult {
    balance: u64,
    unlocked_balance: u64,
}

#[derive(Deserialize)]
struct GetHeightResult {
    height: u64,
}

#[derive(Serialize)]
struct WireDestination {
    amount: u64,
    address: String,
}

/// `transfer_split` parameters. Ring size is fixed by the protocol and is
/// intentionally not part of this struct.
#[derive(Serialize)]
struct TransferSplitParams {
    destinations: Vec<WireDestination>,
    account_index: u32,
    priority: u32,
    unlock_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_id: Option<String>,
    do_not_relay: bool,
    get_tx_keys: bool,
    get_tx_hex: bool,
}

#[derive(Deserialize)]
struct ExportOutputsResult {
    outputs_data_hex: String,
}

#[derive(Serialize)]
struct ImportOutputsParams<'a> {
    outputs_data_hex: &'a str,
}

#[derive(Deserialize)]
struct ImportOutputsResult {
    num_imported: u64,
}

#[derive(Deserialize)]
struct ExportKeyImagesResult {
    #[serde(default)]
    signed_key_images: Vec<SignedKeyImage>,
}

#[derive(Serialize)]
struct ImportKeyImagesParams<'a> {
    signed_key_images: &'a [SignedKeyImage],
}

#[derive(Deserialize)]
struct ImportKeyImagesResult {
    height: u64,
    spent: u64,
    unspent: u64,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct TransferSplitResult {
    tx_hash_list: Vec<String>,
    tx_key_list: Vec<String>,
    amount_list: Vec<u64>,
    fee_list: Vec<u64>,
    tx_blob_list: Vec<String>,
}

fn parse_listed_address(text: &str, major: u32, minor: u32) -> Result<Address> {
    let address = Address::parse(text)?;
    Ok(match address {
        Address::Sub(sub) => Address::Sub(SubAddress {
            index: Some(SubaddressIndex { major, minor }),
            ..sub
        }),
        primary => primary,
    })
}

fn validate_payment_id(payment_id: &str) -> Result<()> {
    let valid_len = payment_id.len() == 16 || payment_id.len() == 64;
    if !valid_len || !payment_id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(WalletError::Validation(format!(
            "payment id must be 16 or 64 hex characters, got {payment_id:?}"
        )));
    }
    Ok(())
}

impl WalletBackend for JsonRpcBackend {
    fn accounts(&self) -> Result<Vec<AccountSummary>> {
        let result: GetAccountsResult = self.call("get_accounts", None::<&()>)?;
        let mut accounts = result.subaddress_accounts;
        accounts.sort_by_key(|acc| acc.account_index);
        accounts
            .into_iter()
            .map(|acc| {
                Ok(AccountSummary {
                    index: acc.account_index,
                    base_address: parse_listed_address(&acc.base_address, acc.account_index, 0)?,
                    label: (!acc.label.is_empty()).then_some(acc.label),
                })
            })
            .collect()
    }

    fn addresses(&self, account_index: u32) -> Result<Vec<Address>> {
        let params = GetAddressParams {
            account_index,
            address_index: None,
        };
        let result: GetAddressResult = self.call("get_address", Some(&params))?;
        result
            .addresses
            .into_iter()
            .map(|entry| parse_listed_address(&entry.address, account_index, entry.address_index))
            .collect()
    }

    fn create_address(&self, account_index: u32, label: Option<&str>) -> Result<SubAddress> {
        let params = CreateAddressParams {
            account_index,
            label,
        };
        let result: CreateAddressResult = self.call("create_address", Some(&params))?;
        match Address::parse(&result.address)? {
            Address::Sub(sub) => Ok(SubAddress {
                index: Some(SubaddressIndex {
                    major: account_index,
                    minor: result.address_index,
                }),
                ..sub
            }),
            Address::Primary(_) => Err(WalletError::Decode(
                "create_address returned a master address".into(),
            )),
        }
    }

    fn create_account(&self, label: Option<&str>) -> Result<AccountSummary> {
        let result: CreateAccountResult =
            self.call("create_account", Some(&CreateAccountParams { label }))?;
        Ok(AccountSummary {
            index: result.account_index,
            base_address: parse_listed_address(&result.address, result.account_index, 0)?,
            label: label.map(str::to_owned),
        })
    }

    fn get_address(&self, major: u32, minor: u32) -> Result<Address> {
        let params = GetAddressParams {
            account_index: major,
            address_index: Some(vec![minor]),
        };
        let result: GetAddressResult = self.call("get_address", Some(&params))?;
        let entry = result.addresses.into_iter().next().ok_or_else(|| {
            WalletError::Decode(format!("get_address returned nothing for {major}/{minor}"))
        })?;
        parse_listed_address(&entry.address, major, minor)
    }

    fn balances(&self, account_index: u32) -> Result<(u64, u64)> {
        let result: GetBalanceResult =
            self.call("get_balance", Some(&GetBalanceParams { account_index }))?;
        Ok((result.balance, result.unlocked_balance))
    }

    fn height(&self) -> Result<u64> {
        let result: GetHeightResult = self.call("get_height", None::<&()>)?;
        Ok(result.height)
    }

    fn view_key(&self) -> Result<String> {
        self.query_key("view_key")
    }

    fn spend_key(&self) -> Result<String> {
        self.query_key("spend_key")
    }

    fn seed(&self) -> Result<String> {
        self.query_key("mnemonic")
    }

    fn export_outputs(&self) -> Result<String> {
        let result: ExportOutputsResult = self.call("export_outputs", None::<&()>)?;
        Ok(result.outputs_data_hex)
    }

    fn import_outputs(&self, outputs_hex: &str) -> Result<u64> {
        let params = ImportOutputsParams {
            outputs_data_hex: outputs_hex,
        };
        let result: ImportOutputsResult = self.call("import_outputs", Some(&params))?;
        Ok(result.num_imported)
    }

    fn export_key_images(&self) -> Result<Vec<SignedKeyImage>> {
        let result: ExportKeyImagesResult = self.call("export_key_images", None::<&()>)?;
        Ok(result.signed_key_images)
    }

    fn import_key_images(&self, key_images: &[SignedKeyImage]) -> Result<KeyImageImport> {
        if key_images.is_empty() {
            return Err(WalletError::Validation(
                "at least one signed key image is required".into(),
            ));
        }
        let params = ImportKeyImagesParams {
            signed_key_images: key_images,
        };
        let result: ImportKeyImagesResult = self.call("import_key_images", Some(&params))?;
        Ok(KeyImageImport {
            height: result.height,
            spent: result.spent,
            unspent: result.unspent,
        })
    }

    fn transfer(
        &self,
        account_index: u32,
        destinations: &[(Address, u64)],
        options: &TransferOptions,
    ) -> Result<Vec<Transfer>> {
        if destinations.is_empty() {
            return Err(WalletError::Validation(
                "at least one destination is required".into(),
            ));
        }
        for (address, amount) in destinations {
            if *amount == 0 {
                return Err(WalletError::Validation(format!(
                    "amount for {address} is zero"
                )));
            }
        }
        if let Some(payment_id) = &options.payment_id {
            validate_payment_id(payment_id)?;
        }

        let params = TransferSplitParams {
            destinations: destinations
                .iter()
                .map(|(address, amount)| WireDestination {
                    amount: *amount,
                    address: address.as_str().to_owned(),
                })
                .collect(),
            account_index,
            priority: options.priority.as_u32(),
            unlock_time: options.unlock_time,
            payment_id: options.payment_id.clone(),
            do_not_relay: !options.relay,
            get_tx_keys: true,
            get_tx_hex: !options.relay,
        };
        let result: TransferSplitResult = self.call("transfer_split", Some(&params))?;

        if result.tx_hash_list.len() != result.amount_list.len()
            || result.tx_hash_list.len() != result.fee_list.len()
        {
            return Err(WalletError::Decode(
                "transfer_split returned mismatched result lists".into(),
            ));
        }
        let keys = result.tx_key_list;
        let blobs = result.tx_blob_list;
        Ok(result
            .tx_hash_list
            .into_iter()
            .zip(result.amount_list)
            .zip(result.fee_list)
            .enumerate()
            .map(|(i, ((hash, amount), fee))| Transfer {
                hash,
                key: keys.get(i).filter(|k| !k.is_empty()).cloned(),
                amount,
                fee,
                blob: blobs.get(i).filter(|b| !b.is_empty()).cloned(),
            })
            .collect())
    }
}
