//! uPlexa address types.
//!
//! A wallet has exactly one master address (account 0, index 0) and any
//! number of subaddresses identified by a (major, minor) index pair. The
//! two are textually indistinguishable base58 strings of the same shape,
//! so they are kept as distinct variants of [`Address`]: an is-master
//! check compares the variant tag, never the string.

use crate::base58::{self, Base58Error};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// netbyte ‖ spend_pub(32) ‖ view_pub(32) ‖ checksum(4)
const DECODED_LEN: usize = 69;
const CHECKSUM_LEN: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error(transparent)]
    Base58(#[from] Base58Error),
    #[error("decoded address is {0} bytes, expected {DECODED_LEN}")]
    InvalidLength(usize),
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("unknown network byte {0}")]
    UnknownNetworkByte(u8),
}

/// Network a given address belongs to, recovered from its leading byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Stagenet,
}

impl Network {
    pub(crate) fn subaddress_byte(self) -> u8 {
        match self {
            Network::Mainnet => 42,
            Network::Testnet => 63,
            Network::Stagenet => 36,
        }
    }

    /// Classify a leading network byte as (network, is-subaddress).
    fn classify(byte: u8) -> Result<(Network, bool), AddressError> {
        match byte {
            18 => Ok((Network::Mainnet, false)),
            53 => Ok((Network::Testnet, false)),
            24 => Ok((Network::Stagenet, false)),
            42 => Ok((Network::Mainnet, true)),
            63 => Ok((Network::Testnet, true)),
            36 => Ok((Network::Stagenet, true)),
            other => Err(AddressError::UnknownNetworkByte(other)),
        }
    }
}

/// (major, minor) pair identifying a subaddress within a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubaddressIndex {
    /// Account index.
    pub major: u32,
    /// Address index within the account.
    pub minor: u32,
}

/// Decoded payload common to both address kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AddressBody {
    pub(crate) network: Network,
    pub(crate) spend_public: [u8; 32],
    pub(crate) view_public: [u8; 32],
    pub(crate) encoded: String,
}

impl AddressBody {
    /// Assemble the canonical base58 text for a key pair under `netbyte`.
    pub(crate) fn assemble(
        network: Network,
        netbyte: u8,
        spend_public: [u8; 32],
        view_public: [u8; 32],
    ) -> AddressBody {
        let mut data = Vec::with_capacity(DECODED_LEN);
        data.push(netbyte);
        data.extend_from_slice(&spend_public);
        data.extend_from_slice(&view_public);
        let checksum: [u8; 32] = Keccak256::digest(&data).into();
        data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
        AddressBody {
            network,
            spend_public,
            view_public,
            encoded: base58::encode(&data),
        }
    }
}

/// The wallet's master address (account 0, address 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryAddress {
    pub(crate) body: AddressBody,
}

/// A derived address for any other (major, minor) pair.
///
/// The index pair is known when the address was derived locally or
/// created through the RPC API, and absent when the address was merely
/// parsed from text. Equality ignores it: two subaddresses are the same
/// address if they decode to the same keys on the same network.
#[derive(Clone, Debug, Eq)]
pub struct SubAddress {
    pub(crate) body: AddressBody,
    pub(crate) index: Option<SubaddressIndex>,
}

impl PartialEq for SubAddress {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    /// Master address.
    Primary(PrimaryAddress),
    /// Subaddress.
    Sub(SubAddress),
}

impl Address {
    /// Parse base58 address text, verifying length, checksum and network
    /// byte. The network byte alone decides which variant comes back.
    pub fn parse(text: &str) -> Result<Address, AddressError> {
        let raw = base58::decode(text)?;
        if raw.len() != DECODED_LEN {
            return Err(AddressError::InvalidLength(raw.len()));
        }
        let (data, checksum) = raw.split_at(DECODED_LEN - CHECKSUM_LEN);
        let digest: [u8; 32] = Keccak256::digest(data).into();
        if checksum != &digest[..CHECKSUM_LEN] {
            return Err(AddressError::ChecksumMismatch);
        }
        let (network, is_sub) = Network::classify(data[0])?;
        let mut spend_public = [0u8; 32];
        let mut view_public = [0u8; 32];
        spend_public.copy_from_slice(&data[1..33]);
        view_public.copy_from_slice(&data[33..65]);
        let body = AddressBody {
            network,
            spend_public,
            view_public,
            encoded: text.to_owned(),
        };
        Ok(if is_sub {
            Address::Sub(SubAddress { body, index: None })
        } else {
            Address::Primary(PrimaryAddress { body })
        })
    }

    pub fn as_str(&self) -> &str {
        &self.body().encoded
    }

    pub fn network(&self) -> Network {
        self.body().network
    }

    /// Public spend key bytes (the subaddress spend key `D` for
    /// subaddresses).
    pub fn spend_public(&self) -> &[u8; 32] {
        &self.body().spend_public
    }

    /// Public view key bytes.
    pub fn view_public(&self) -> &[u8; 32] {
        &self.body().view_public
    }

    /// True only for the master address variant. A subaddress that
    /// happens to render to an equal string never matches.
    pub fn is_primary(&self) -> bool {
        matches!(self, Address::Primary(_))
    }

    /// Known (major, minor) pair, if any.
    pub fn subaddress_index(&self) -> Option<SubaddressIndex> {
        match self {
            Address::Primary(_) => Some(SubaddressIndex { major: 0, minor: 0 }),
            Address::Sub(sub) => sub.index,
        }
    }

    fn body(&self) -> &AddressBody {
        match self {
            Address::Primary(primary) => &primary.body,
            Address::Sub(sub) => &sub.body,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl fmt::Display for PrimaryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body.encoded)
    }
}

impl fmt::Display for SubAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body.encoded)
    }
}

impl PrimaryAddress {
    pub fn as_str(&self) -> &str {
        &self.body.encoded
    }

    pub fn network(&self) -> Network {
        self.body.network
    }
}

impl SubAddress {
    pub fn as_str(&self) -> &str {
        &self.body.encoded
    }

    pub fn network(&self) -> Network {
        self.body.network
    }

    pub fn index(&self) -> Option<SubaddressIndex> {
        self.index
    }
}
