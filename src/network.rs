use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde_json::Value;

use crate::codec::{format_address, parse_cidr, validate_prefix_length};
use crate::error::{FinderError, Result};
use crate::family::{AddressFamily, Ipv4, Ipv6};
use crate::metadata::Metadata;

/// One CIDR network: its first and last address, prefix length, and
/// optional metadata.
///
/// Bounds are fixed at construction. Equality, ordering and hashing use the
/// network value and prefix length only; metadata never takes part.
#[derive(Debug, Clone)]
pub struct Network<F: AddressFamily> {
    network: F::Value,
    broadcast: F::Value,
    length: u8,
    metadata: Option<Metadata>,
}

/// 32-bit network
pub type Ipv4Network = Network<Ipv4>;

/// 128-bit network
pub type Ipv6Network = Network<Ipv6>;

impl<F: AddressFamily> Network<F> {
    /// Create a network from a raw address and prefix length.
    ///
    /// Host bits of `address` are cleared.
    pub fn new(address: F::Value, length: u8) -> Result<Self> {
        let length = validate_prefix_length::<F>(u32::from(length))?;
        let mask = F::prefix_mask(length);
        let network = address & mask;
        Ok(Self {
            network,
            broadcast: network | !mask,
            length,
            metadata: None,
        })
    }

    /// Create a host network (full-width prefix) for one address.
    pub fn host(address: F::Value) -> Self {
        Self {
            network: address,
            broadcast: address,
            length: F::BITS,
            metadata: None,
        }
    }

    /// Attach metadata, rejecting keys that shadow a fixed field.
    pub fn with_metadata(mut self, metadata: Metadata) -> Result<Self> {
        metadata.validate_keys()?;
        self.metadata = Some(metadata);
        Ok(self)
    }

    /// First address of the range as an integer
    pub fn network_value(&self) -> F::Value {
        self.network
    }

    /// Last address of the range as an integer
    pub fn broadcast_value(&self) -> F::Value {
        self.broadcast
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn network_address(&self) -> F::Addr {
        F::Addr::from(self.network)
    }

    pub fn broadcast_address(&self) -> F::Addr {
        F::Addr::from(self.broadcast)
    }

    /// Returns true if `other` lies entirely within this network.
    pub fn contains(&self, other: &Network<F>) -> bool {
        self.network <= other.network && other.broadcast <= self.broadcast
    }

    /// Returns true if the single address `value` lies within this network.
    pub fn contains_value(&self, value: F::Value) -> bool {
        self.network <= value && value <= self.broadcast
    }

    pub fn to_ipnet(&self) -> Result<IpNet> {
        F::to_ipnet(self.network, self.length)
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Mutable metadata, created empty on first access.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Metadata::new)
    }

    /// Read one metadata value.
    pub fn attr(&self, key: &str) -> Result<&Value> {
        match &self.metadata {
            Some(metadata) => metadata.get(key),
            None => Err(FinderError::MissingAttribute(key.to_string())),
        }
    }

    /// Write one metadata value, returning the previous one.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.metadata_mut().insert(key, value)
    }

    /// Merge metadata into this network; colliding keys are overwritten.
    pub(crate) fn merge_metadata(&mut self, metadata: Option<Metadata>) {
        if let Some(metadata) = metadata {
            match &mut self.metadata {
                Some(existing) => existing.merge(metadata),
                None => self.metadata = Some(metadata),
            }
        }
    }

    /// Detach the metadata, leaving the network without any.
    pub(crate) fn take_metadata(&mut self) -> Option<Metadata> {
        self.metadata.take()
    }

    /// Copy of the bounds without metadata.
    pub(crate) fn key(&self) -> Self {
        Self {
            network: self.network,
            broadcast: self.broadcast,
            length: self.length,
            metadata: None,
        }
    }
}

impl<F: AddressFamily> PartialEq for Network<F> {
    fn eq(&self, other: &Self) -> bool {
        self.network == other.network && self.length == other.length
    }
}

impl<F: AddressFamily> Eq for Network<F> {}

impl<F: AddressFamily> Hash for Network<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.network.hash(state);
        self.length.hash(state);
    }
}

impl<F: AddressFamily> Ord for Network<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.network
            .cmp(&other.network)
            .then(self.length.cmp(&other.length))
    }
}

impl<F: AddressFamily> PartialOrd for Network<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: AddressFamily> fmt::Display for Network<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", format_address::<F>(self.network), self.length)
    }
}

impl<F: AddressFamily> FromStr for Network<F> {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        let (address, length) = parse_cidr::<F>(s)?;
        Network::new(address, length)
    }
}

/// Anything that can describe a network of family `F`.
pub trait IntoNetwork<F: AddressFamily> {
    fn into_network(self) -> Result<Network<F>>;
}

impl<F: AddressFamily> IntoNetwork<F> for &str {
    fn into_network(self) -> Result<Network<F>> {
        self.parse()
    }
}

impl<F: AddressFamily> IntoNetwork<F> for &String {
    fn into_network(self) -> Result<Network<F>> {
        self.parse()
    }
}

impl<F: AddressFamily> IntoNetwork<F> for String {
    fn into_network(self) -> Result<Network<F>> {
        self.parse()
    }
}

impl<F: AddressFamily> IntoNetwork<F> for Network<F> {
    fn into_network(self) -> Result<Network<F>> {
        Ok(self)
    }
}

impl<F: AddressFamily> IntoNetwork<F> for &Network<F> {
    fn into_network(self) -> Result<Network<F>> {
        Ok(self.key())
    }
}

impl IntoNetwork<Ipv4> for (u32, u8) {
    fn into_network(self) -> Result<Ipv4Network> {
        Network::new(self.0, self.1)
    }
}

impl IntoNetwork<Ipv6> for (u128, u8) {
    fn into_network(self) -> Result<Ipv6Network> {
        Network::new(self.0, self.1)
    }
}

impl IntoNetwork<Ipv4> for Ipv4Addr {
    fn into_network(self) -> Result<Ipv4Network> {
        Ok(Ipv4Network::host(u32::from(self)))
    }
}

impl IntoNetwork<Ipv6> for Ipv6Addr {
    fn into_network(self) -> Result<Ipv6Network> {
        Ok(Ipv6Network::host(u128::from(self)))
    }
}

impl IntoNetwork<Ipv4> for Ipv4Net {
    fn into_network(self) -> Result<Ipv4Network> {
        Ipv4Network::new(u32::from(self.addr()), self.prefix_len())
    }
}

impl IntoNetwork<Ipv6> for Ipv6Net {
    fn into_network(self) -> Result<Ipv6Network> {
        Ipv6Network::new(u128::from(self.addr()), self.prefix_len())
    }
}
