//! CryptoNote-style base58 codec.
//!
//! Unlike Bitcoin base58, CryptoNote encodes in fixed blocks: every 8 raw
//! bytes become exactly 11 symbols, and a trailing partial block maps
//! through a fixed size table. This keeps encoded addresses a constant
//! length for a constant payload length.

use thiserror::Error;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const FULL_BLOCK_SIZE: usize = 8;
const FULL_ENCODED_BLOCK_SIZE: usize = 11;

/// Encoded length for a partial trailing block of N raw bytes.
const ENCODED_BLOCK_SIZES: [usize; 9] = [0, 2, 3, 5, 6, 7, 9, 10, 11];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base58Error {
    #[error("symbol {0:?} is not in the base58 alphabet")]
    InvalidSymbol(char),
    #[error("encoded length {0} cannot be produced by block base58")]
    InvalidLength(usize),
    #[error("encoded block overflows its byte width")]
    Overflow,
}

fn symbol_value(symbol: char) -> Result<u128, Base58Error> {
    ALPHABET
        .iter()
        .position(|&a| a as char == symbol)
        .map(|v| v as u128)
        .ok_or(Base58Error::InvalidSymbol(symbol))
}

fn encode_block(block: &[u8], out: &mut String) {
    let mut num = block.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let size = ENCODED_BLOCK_SIZES[block.len()];
    let mut symbols = [0u8; FULL_ENCODED_BLOCK_SIZE];
    for slot in symbols[..size].iter_mut().rev() {
        *slot = ALPHABET[(num % 58) as usize];
        num /= 58;
    }
    for &s in &symbols[..size] {
        out.push(s as char);
    }
}

fn decode_block(block: &str, out: &mut Vec<u8>) -> Result<(), Base58Error> {
    let byte_len = ENCODED_BLOCK_SIZES
        .iter()
        .position(|&s| s == block.len())
        .ok_or(Base58Error::InvalidLength(block.len()))?;
    let mut num: u128 = 0;
    for symbol in block.chars() {
        num = num * 58 + symbol_value(symbol)?;
    }
    if byte_len < 16 && num >> (8 * byte_len) != 0 {
        return Err(Base58Error::Overflow);
    }
    out.extend_from_slice(&num.to_be_bytes()[16 - byte_len..]);
    Ok(())
}

/// Encode raw bytes as block base58.
pub fn encode(data: &[u8]) -> String {
    let full_blocks = data.len() / FULL_BLOCK_SIZE;
    let mut out = String::with_capacity(
        full_blocks * FULL_ENCODED_BLOCK_SIZE + ENCODED_BLOCK_SIZES[data.len() % FULL_BLOCK_SIZE],
    );
    for block in data.chunks(FULL_BLOCK_SIZE) {
        encode_block(block, &mut out);
    }
    out
}

/// Decode block base58 back to raw bytes.
pub fn decode(encoded: &str) -> Result<Vec<u8>, Base58Error> {
    // block boundaries are byte offsets, so bail out early on anything
    // that is not plain ASCII (no alphabet symbol is multi-byte)
    if let Some(offending) = encoded.chars().find(|c| !c.is_ascii()) {
        return Err(Base58Error::InvalidSymbol(offending));
    }
    let full_blocks = encoded.len() / FULL_ENCODED_BLOCK_SIZE;
    let tail = encoded.len() % FULL_ENCODED_BLOCK_SIZE;
    let mut out = Vec::with_capacity(full_blocks * FULL_BLOCK_SIZE + FULL_BLOCK_SIZE);
    for i in 0..full_blocks {
        let block = &encoded[i * FULL_ENCODED_BLOCK_SIZE..(i + 1) * FULL_ENCODED_BLOCK_SIZE];
        decode_block(block, &mut out)?;
    }
    if tail != 0 {
        decode_block(&encoded[full_blocks * FULL_ENCODED_BLOCK_SIZE..], &mut out)?;
    }
    Ok(out)
}
