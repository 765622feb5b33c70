//! Atomic-unit amount conversions.
//!
//! All RPC amounts are integers in atomic units; 1 UPX is 10^12 of them.
//! Conversions go through decimal strings, never floats, so display
//! values survive a round trip exactly.

use crate::error::WalletError;

/// Atomic units per whole UPX.
pub const ATOMIC_UNITS: u64 = 1_000_000_000_000;

const DECIMAL_PLACES: usize = 12;

/// Parse a decimal string like `"1.000000000001"` into atomic units.
///
/// Digits beyond twelve decimal places are truncated. Anything else that
/// is not a plain unsigned decimal number is rejected.
pub fn to_atomic(value: &str) -> Result<u64, WalletError> {
    let invalid = || WalletError::Validation(format!("{value:?} is not a valid UPX amount"));
    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (value, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut frac_atomic: u64 = 0;
    for digit in frac.bytes().take(DECIMAL_PLACES) {
        frac_atomic = frac_atomic * 10 + u64::from(digit - b'0');
    }
    for _ in frac.len()..DECIMAL_PLACES {
        frac_atomic *= 10;
    }
    whole
        .checked_mul(ATOMIC_UNITS)
        .and_then(|units| units.checked_add(frac_atomic))
        .ok_or_else(|| WalletError::Validation(format!("amount {value} is out of range")))
}

/// Render atomic units as a decimal string with trailing zeros trimmed.
pub fn from_atomic(atomic: u64) -> String {
    let whole = atomic / ATOMIC_UNITS;
    let frac = atomic % ATOMIC_UNITS;
    if frac == 0 {
        return whole.to_string();
    }
    let mut out = format!("{whole}.{frac:012}");
    while out.ends_with('0') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_numbers() {
        assert_eq!(to_atomic("0").unwrap(), 0);
        assert_eq!(from_atomic(0), "0");
        assert_eq!(to_atomic("1").unwrap(), 1_000_000_000_000);
        assert_eq!(from_atomic(1_000_000_000_000), "1");
        assert_eq!(to_atomic("0.000000000001").unwrap(), 1);
        assert_eq!(from_atomic(1), "0.000000000001");
    }

    #[test]
    fn sub_atomic_digits_are_truncated() {
        assert_eq!(to_atomic("1.0000000000004").unwrap(), 1_000_000_000_000);
        assert_eq!(to_atomic("1.0000000000014").unwrap(), 1_000_000_000_001);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", ".", "1.2.3", "-1", "1e3", " 1", "abc"] {
            assert!(to_atomic(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn round_trips() {
        for atomic in [0u64, 1, 999, 1_000_000_000_000, 2_500_000_000_000, u64::MAX] {
            assert_eq!(to_atomic(&from_atomic(atomic)).unwrap(), atomic);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(to_atomic("18446744.073709551616").is_err());
        assert!(to_atomic("99999999999999999999").is_err());
        assert_eq!(to_atomic("18446744.073709551615").unwrap(), u64::MAX);
    }
}
