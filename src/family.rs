//! Address families.
//!
//! IPv4 and IPv6 differ only in bit width, so every network type in this
//! crate is generic over an [`AddressFamily`] marker. Mixing families is a
//! type error rather than a runtime comparison.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::net::{AddrParseError, Ipv4Addr, Ipv6Addr};
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::error::{FinderError, Result};

/// A fixed-width address family.
pub trait AddressFamily: Copy + Debug + Default + Eq + Hash + Send + Sync + 'static {
    /// Unsigned integer holding one address.
    type Value: Copy
        + Ord
        + Hash
        + Debug
        + Display
        + Send
        + Sync
        + BitAnd<Output = Self::Value>
        + BitOr<Output = Self::Value>
        + Not<Output = Self::Value>
        + 'static;

    /// Standard library address type for this family.
    type Addr: Copy
        + Debug
        + Display
        + FromStr<Err = AddrParseError>
        + From<Self::Value>
        + Into<Self::Value>;

    /// Address width in bits.
    const BITS: u8;

    /// Human readable family name, used in error messages.
    const NAME: &'static str;

    /// Mask with the high `length` bits set. `length` must be `<= BITS`.
    fn prefix_mask(length: u8) -> Self::Value;

    /// Convert validated bounds into an `ipnet` network.
    fn to_ipnet(network: Self::Value, length: u8) -> Result<IpNet>;
}

/// 32-bit address family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ipv4;

/// 128-bit address family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ipv6;

impl AddressFamily for Ipv4 {
    type Value = u32;
    type Addr = Ipv4Addr;

    const BITS: u8 = 32;
    const NAME: &'static str = "IPv4";

    fn prefix_mask(length: u8) -> u32 {
        // A zero-length prefix would shift by the full width.
        u32::MAX
            .checked_shl(u32::from(Self::BITS - length))
            .unwrap_or(0)
    }

    fn to_ipnet(network: u32, length: u8) -> Result<IpNet> {
        Ipv4Net::new(Ipv4Addr::from(network), length)
            .map(IpNet::V4)
            .map_err(|_| FinderError::InvalidPrefixLength {
                length: u32::from(length),
                bits: Self::BITS,
            })
    }
}

impl AddressFamily for Ipv6 {
    type Value = u128;
    type Addr = Ipv6Addr;

    const BITS: u8 = 128;
    const NAME: &'static str = "IPv6";

    fn prefix_mask(length: u8) -> u128 {
        u128::MAX
            .checked_shl(u32::from(Self::BITS - length))
            .unwrap_or(0)
    }

    fn to_ipnet(network: u128, length: u8) -> Result<IpNet> {
        Ipv6Net::new(Ipv6Addr::from(network), length)
            .map(IpNet::V6)
            .map_err(|_| FinderError::InvalidPrefixLength {
                length: u32::from(length),
                bits: Self::BITS,
            })
    }
}
