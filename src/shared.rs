//! Finder shared between threads.
//!
//! The index has a single total order and no natural partitioning, so one
//! mutex guards all of it. Each call holds the lock for the whole operation.

use parking_lot::Mutex;

use crate::error::Result;
use crate::family::AddressFamily;
use crate::finder::NetworkFinder;
use crate::metadata::Metadata;
use crate::network::{IntoNetwork, Network};

/// A [`NetworkFinder`] behind a mutex.
///
/// Results are returned as owned copies since references cannot outlive
/// the lock. Use [`with`](Self::with) or [`with_mut`](Self::with_mut) to
/// run several operations under one lock.
#[derive(Debug, Default)]
pub struct SharedNetworkFinder<F: AddressFamily> {
    inner: Mutex<NetworkFinder<F>>,
}

impl<F: AddressFamily> SharedNetworkFinder<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_finder(finder: NetworkFinder<F>) -> Self {
        Self {
            inner: Mutex::new(finder),
        }
    }

    pub fn add(&self, network: impl IntoNetwork<F>, metadata: Option<Metadata>) -> Result<Network<F>> {
        let mut finder = self.inner.lock();
        finder.add(network, metadata).map(|n| n.clone())
    }

    pub fn delete(&self, network: impl IntoNetwork<F>) -> Result<Network<F>> {
        self.inner.lock().delete(network)
    }

    pub fn search_exact(&self, network: impl IntoNetwork<F>) -> Result<Option<Network<F>>> {
        let finder = self.inner.lock();
        Ok(finder.search_exact(network)?.cloned())
    }

    pub fn search_best(&self, network: impl IntoNetwork<F>) -> Result<Option<Network<F>>> {
        let finder = self.inner.lock();
        Ok(finder.search_best(network)?.cloned())
    }

    pub fn search_worst(&self, network: impl IntoNetwork<F>) -> Result<Option<Network<F>>> {
        let finder = self.inner.lock();
        Ok(finder.search_worst(network)?.cloned())
    }

    pub fn search_covered(&self, network: impl IntoNetwork<F>) -> Result<Vec<Network<F>>> {
        let finder = self.inner.lock();
        Ok(finder
            .search_covered(network)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn search_covering(&self, network: impl IntoNetwork<F>) -> Result<Vec<Network<F>>> {
        let finder = self.inner.lock();
        Ok(finder
            .search_covering(network)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Run `f` with shared access under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&NetworkFinder<F>) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access under the lock.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut NetworkFinder<F>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> NetworkFinder<F> {
        self.inner.into_inner()
    }
}

impl<F: AddressFamily> From<NetworkFinder<F>> for SharedNetworkFinder<F> {
    fn from(finder: NetworkFinder<F>) -> Self {
        Self::from_finder(finder)
    }
}
