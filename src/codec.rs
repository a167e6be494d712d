//! Textual address and CIDR conversion.
//!
//! Addresses are converted to and from the family's fixed-width integer.
//! CIDR grammar is `<address>["/"<length>]`; an omitted length means the
//! full bit width of the family.

use crate::error::{FinderError, Result};
use crate::family::AddressFamily;

/// Parse a textual address into its integer value.
pub fn parse_address<F: AddressFamily>(text: &str) -> Result<F::Value> {
    text.parse::<F::Addr>()
        .map(Into::into)
        .map_err(|e| FinderError::Format(format!("{} address '{}': {}", F::NAME, text, e)))
}

/// Format an integer value as a textual address.
pub fn format_address<F: AddressFamily>(value: F::Value) -> String {
    F::Addr::from(value).to_string()
}

/// Parse `address[/length]` into the raw address value and prefix length.
///
/// The address is returned as written; host bits are not cleared here.
pub fn parse_cidr<F: AddressFamily>(text: &str) -> Result<(F::Value, u8)> {
    let (address, length) = match text.split_once('/') {
        Some((address, length)) => (address, Some(length)),
        None => (text, None),
    };

    let value = parse_address::<F>(address)?;
    let length = match length {
        Some(length) => parse_prefix_length::<F>(length, text)?,
        None => F::BITS,
    };

    Ok((value, length))
}

/// Check that `length` lies within `[0, BITS]` for the family.
pub fn validate_prefix_length<F: AddressFamily>(length: u32) -> Result<u8> {
    if length > u32::from(F::BITS) {
        return Err(FinderError::InvalidPrefixLength {
            length,
            bits: F::BITS,
        });
    }
    Ok(length as u8)
}

fn parse_prefix_length<F: AddressFamily>(text: &str, cidr: &str) -> Result<u8> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FinderError::Format(format!(
            "{} CIDR '{}': invalid prefix length '{}'",
            F::NAME,
            cidr,
            text
        )));
    }

    // All digits, so the only parse failure left is overflow.
    let length = text.parse::<u32>().unwrap_or(u32::MAX);
    validate_prefix_length::<F>(length)
}
