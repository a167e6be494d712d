//! Sorted network index.
//!
//! Networks are kept in one vector ordered by (network value, prefix length)
//! with no duplicates. Every query locates its position with a binary search
//! and then walks neighbouring entries.

use std::path::Path;
use std::slice;

use tracing::{debug, trace};

use crate::error::{FinderError, Result};
use crate::family::{AddressFamily, Ipv4, Ipv6};
use crate::metadata::Metadata;
use crate::network::{IntoNetwork, Network};
use crate::parser::{parse_networks, parse_networks_from_file, NetworkEntry};

/// Ordered collection of networks for one address family.
#[derive(Debug, Clone)]
pub struct NetworkFinder<F: AddressFamily> {
    networks: Vec<Network<F>>,
}

/// 32-bit network finder
pub type Ipv4Finder = NetworkFinder<Ipv4>;

/// 128-bit network finder
pub type Ipv6Finder = NetworkFinder<Ipv6>;

impl<F: AddressFamily> Default for NetworkFinder<F> {
    fn default() -> Self {
        Self {
            networks: Vec::new(),
        }
    }
}

impl<F: AddressFamily> NetworkFinder<F> {
    /// Create an empty finder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a finder from a network list (see [`parse_networks`]).
    pub fn from_text(text: &str) -> Result<Self> {
        let entries = parse_networks(text)?;
        let mut finder = Self::new();
        finder.extend_entries(&entries)?;
        Ok(finder)
    }

    /// Build a finder from a network list file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let entries = parse_networks_from_file(path)?;
        let mut finder = Self::new();
        finder.extend_entries(&entries)?;
        Ok(finder)
    }

    /// Add every parsed entry. Returns the number of entries processed.
    ///
    /// Entries are validated before any of them is inserted, so a bad entry
    /// leaves the finder unchanged.
    pub fn extend_entries(&mut self, entries: &[NetworkEntry]) -> Result<usize> {
        let mut networks = Vec::with_capacity(entries.len());
        for entry in entries {
            let network: Network<F> = entry.cidr.parse()?;
            let metadata = if entry.metadata.is_empty() {
                None
            } else {
                entry.metadata.validate_keys()?;
                Some(entry.metadata.clone())
            };
            networks.push((network, metadata));
        }

        for (network, metadata) in networks {
            self.insert(network, metadata);
        }
        debug!(count = entries.len(), total = self.len(), "loaded network entries");
        Ok(entries.len())
    }

    /// Insert a network.
    ///
    /// Metadata already carried by `network` is combined with `metadata`,
    /// the argument winning on key collisions. If an equal network is already
    /// stored, the combined metadata is merged into it (new values win) and
    /// the stored network is returned. Otherwise the network is inserted at
    /// its sorted position.
    pub fn add(
        &mut self,
        network: impl IntoNetwork<F>,
        metadata: Option<Metadata>,
    ) -> Result<&mut Network<F>> {
        let mut network = network.into_network()?;
        network.merge_metadata(metadata);
        let metadata = network.take_metadata();
        if let Some(metadata) = &metadata {
            metadata.validate_keys()?;
        }
        Ok(self.insert(network, metadata))
    }

    fn insert(&mut self, mut network: Network<F>, metadata: Option<Metadata>) -> &mut Network<F> {
        let i = self.upper_bound(&network);
        if i > 0 && self.networks[i - 1] == network {
            debug!(network = %network, "network already present, merging metadata");
            let existing = &mut self.networks[i - 1];
            existing.merge_metadata(network.take_metadata());
            existing.merge_metadata(metadata);
            return existing;
        }

        debug!(network = %network, index = i, "inserting network");
        network.merge_metadata(metadata);
        self.networks.insert(i, network);
        &mut self.networks[i]
    }

    /// Remove the stored network equal to `network`.
    pub fn delete(&mut self, network: impl IntoNetwork<F>) -> Result<Network<F>> {
        let network = network.into_network()?;
        match self.exact_index(&network) {
            Some(i) => {
                debug!(network = %network, "deleting network");
                Ok(self.networks.remove(i))
            }
            None => Err(FinderError::NotFound(network.to_string())),
        }
    }

    /// Find the stored network equal to `network`.
    pub fn search_exact(&self, network: impl IntoNetwork<F>) -> Result<Option<&Network<F>>> {
        let network = network.into_network()?;
        trace!(network = %network, "search_exact");
        Ok(self.exact_index(&network).map(|i| &self.networks[i]))
    }

    /// Like [`search_exact`](Self::search_exact), for updating metadata in place.
    pub fn search_exact_mut(
        &mut self,
        network: impl IntoNetwork<F>,
    ) -> Result<Option<&mut Network<F>>> {
        let network = network.into_network()?;
        match self.exact_index(&network) {
            Some(i) => Ok(Some(&mut self.networks[i])),
            None => Ok(None),
        }
    }

    /// Find the stored network with the longest prefix containing `network`.
    pub fn search_best(&self, network: impl IntoNetwork<F>) -> Result<Option<&Network<F>>> {
        let network = network.into_network()?;
        trace!(network = %network, "search_best");
        Ok(self.covering(&network).next())
    }

    /// Find the stored network with the shortest prefix containing `network`.
    pub fn search_worst(&self, network: impl IntoNetwork<F>) -> Result<Option<&Network<F>>> {
        let network = network.into_network()?;
        trace!(network = %network, "search_worst");
        Ok(self.covering(&network).last())
    }

    /// Find every stored network contained by `network`, in sorted order.
    pub fn search_covered(&self, network: impl IntoNetwork<F>) -> Result<Vec<&Network<F>>> {
        let network = network.into_network()?;
        trace!(network = %network, "search_covered");
        let start = self.lower_bound(&network);
        Ok(self.networks[start..]
            .iter()
            .take_while(|found| found.network_value() <= network.broadcast_value())
            .filter(|found| network.contains(found))
            .collect())
    }

    /// Find every stored network containing `network`, most specific first.
    pub fn search_covering(&self, network: impl IntoNetwork<F>) -> Result<Vec<&Network<F>>> {
        let network = network.into_network()?;
        trace!(network = %network, "search_covering");
        Ok(self.covering(&network).collect())
    }

    /// Networks in sorted order
    pub fn networks(&self) -> &[Network<F>] {
        &self.networks
    }

    pub fn iter(&self) -> slice::Iter<'_, Network<F>> {
        self.networks.iter()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn clear(&mut self) {
        self.networks.clear();
    }

    /// Stored networks containing `network`, walking backward from its
    /// insertion point. Entries after the insertion point sort above the
    /// query and so cannot contain it.
    fn covering(&self, network: &Network<F>) -> impl Iterator<Item = &Network<F>> + '_ {
        let end = self.upper_bound(network);
        let query = network.key();
        self.networks[..end]
            .iter()
            .rev()
            .filter(move |found| found.contains(&query))
    }

    fn exact_index(&self, network: &Network<F>) -> Option<usize> {
        let i = self.upper_bound(network);
        (i > 0 && self.networks[i - 1] == *network).then(|| i - 1)
    }

    /// Index of the first entry greater than `network`.
    fn upper_bound(&self, network: &Network<F>) -> usize {
        self.networks.partition_point(|found| found <= network)
    }

    /// Index of the first entry not less than `network`.
    fn lower_bound(&self, network: &Network<F>) -> usize {
        self.networks.partition_point(|found| found < network)
    }
}

impl<'a, F: AddressFamily> IntoIterator for &'a NetworkFinder<F> {
    type Item = &'a Network<F>;
    type IntoIter = slice::Iter<'a, Network<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.networks.iter()
    }
}
