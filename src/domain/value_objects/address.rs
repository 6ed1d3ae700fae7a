//! # Account Addresses
//!
//! Validation of user-supplied EVM addresses.
//!
//! An address is accepted when it is 40 hex digits, optionally prefixed by
//! `0x`. All lowercase and all uppercase digits are accepted as-is; mixed
//! case must match the EIP-55 checksum.

use ethers::types::Address;
use ethers::utils::to_checksum;
use thiserror::Error;

/// Error returned for malformed addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Empty input.
    #[error("address is empty")]
    Empty,

    /// Wrong length or non-hex characters.
    #[error("malformed address: {0}")]
    Malformed(String),

    /// Mixed-case input that fails the EIP-55 checksum.
    #[error("address checksum mismatch: {0}")]
    Checksum(String),
}

/// Parses and validates an address string.
///
/// # Errors
///
/// Returns an [`AddressError`] describing why the input was rejected.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::Malformed(input.to_string()));
    }

    let address: Address = digits
        .parse()
        .map_err(|_| AddressError::Malformed(input.to_string()))?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = to_checksum(&address, None);
        if expected.get(2..) != Some(digits) {
            return Err(AddressError::Checksum(input.to_string()));
        }
    }

    Ok(address)
}

/// Returns true if `input` is a well-formed address.
#[must_use]
pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}

/// Formats an address in its EIP-55 checksummed form.
#[must_use]
pub fn format_address(address: &Address) -> String {
    to_checksum(address, None)
}
