// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cluster-chain traversal: starting from a cluster number, follow HLAT
//! successor pointers and yield the chain in allocation order. A lazy
//! iterator rather than a materialized `Vec`, so `read_file` and the table
//! readers can stream instead of buffering a whole chain up front.

use hyrax_ds::DataStorage;
use log::warn;

use crate::{hlat, superblock::Superblock, Result};

/// Hard bound on chain length. A malformed image with a self-referential
/// successor pointer must not hang the reader; this is the mandatory
/// fallback even when a caller also tracks visited clusters.
pub const MAX_CHAIN_LENGTH: usize = 100_000;

/// Lazily walks the HLAT chain starting at `start`, yielding cluster
/// numbers in file order. Stops on any sentinel (free/end/bad), on an
/// underlying device error, or after [`MAX_CHAIN_LENGTH`] clusters.
pub struct ClusterChain<'fs, DS: DataStorage> {
    data_storage: &'fs DS,
    superblock: &'fs Superblock,
    next: Option<u64>,
    emitted: usize,
    failed: bool,
}

impl<'fs, DS: DataStorage> ClusterChain<'fs, DS> {
    pub fn new(data_storage: &'fs DS, superblock: &'fs Superblock, start: u64) -> Self {
        Self {
            data_storage,
            superblock,
            next: Some(start),
            emitted: 0,
            failed: false,
        }
    }
}

impl<'fs, DS: DataStorage> Iterator for ClusterChain<'fs, DS> {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let cluster = self.next?;
        match hlat::classify(cluster) {
            hlat::ClusterLink::Free | hlat::ClusterLink::End | hlat::ClusterLink::Bad => {
                self.next = None;
                return None;
            }
            hlat::ClusterLink::Valid(_) => {}
        }

        if self.emitted >= MAX_CHAIN_LENGTH {
            warn!("chain starting before cluster {cluster} exceeded {MAX_CHAIN_LENGTH} clusters, truncating");
            self.next = None;
            return None;
        }

        let entry = match hlat::resolve(self.data_storage, self.superblock, cluster) {
            Ok(entry) => entry,
            Err(error) => {
                self.failed = true;
                return Some(Err(error));
            }
        };

        self.emitted += 1;
        self.next = Some(entry.next_cluster);
        Some(Ok(cluster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryDevice;

    #[test]
    fn chain_from_end_sentinel_is_empty() {
        let (device, superblock) = MemoryDevice::new_blank();
        let clusters: Vec<_> = ClusterChain::new(&device, &superblock, hlat::END).collect();
        assert!(clusters.is_empty());
    }

    #[test]
    fn chain_from_free_sentinel_is_empty() {
        let (device, superblock) = MemoryDevice::new_blank();
        let clusters: Vec<_> = ClusterChain::new(&device, &superblock, 0).collect();
        assert!(clusters.is_empty());
    }

    #[test]
    fn single_cluster_chain() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(200, hlat::END);
        let clusters: Vec<_> = ClusterChain::new(&device, &superblock, 200)
            .map(|c| c.unwrap())
            .collect();
        assert_eq!(clusters, vec![200]);
    }

    #[test]
    fn two_cluster_chain_in_order() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(200, 201);
        device.link(201, hlat::END);
        let clusters: Vec<_> = ClusterChain::new(&device, &superblock, 200)
            .map(|c| c.unwrap())
            .collect();
        assert_eq!(clusters, vec![200, 201]);
    }

    #[test]
    fn self_referential_chain_is_bounded() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(200, 200);
        let clusters: Vec<_> = ClusterChain::new(&device, &superblock, 200)
            .map(|c| c.unwrap())
            .collect();
        assert!(clusters.len() <= MAX_CHAIN_LENGTH);
        assert_eq!(clusters.len(), MAX_CHAIN_LENGTH);
    }
}
