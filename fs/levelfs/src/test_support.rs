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

//! An in-memory `DataStorage` double used only by this crate's tests. It
//! backs a sparse, cluster-addressed volume: clusters are allocated on
//! first touch, and [`MemoryDevice::link`] builds the LIT/LAB entries a
//! real HLAT-formatted volume would carry so the resolver and chain
//! walker under test see exactly what they would on disk.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use hyrax_ds::{DataStorage, Result as DsResult};

use crate::{
    hlat,
    records::{DIR_ENTRY_SIZE, LEVEL_DESCRIPTOR_SIZE, VERSION_ENTRY_SIZE},
    superblock::Superblock,
    CLUSTER_SIZE,
};

/// First LAB cluster handed out by [`MemoryDevice::link`]; chosen far past
/// any cluster number a test names directly so the two never collide.
const LAB_POOL_START: u64 = 1_000_000;

pub(crate) struct MemoryDevice {
    clusters: RefCell<HashMap<u64, [u8; CLUSTER_SIZE as usize]>>,
    lit_start_cluster: u64,
    lit_index_to_lab: RefCell<HashMap<u64, u64>>,
    next_lab_cluster: Cell<u64>,
}

impl MemoryDevice {
    /// A device with a generous `total_clusters` and an empty HLAT: every
    /// cluster resolves to synthetic FREE until [`link`](Self::link) wires
    /// it up.
    pub(crate) fn new_blank() -> (Self, Superblock) {
        let lit_start_cluster = 1;
        let device = Self {
            clusters: RefCell::new(HashMap::new()),
            lit_start_cluster,
            lit_index_to_lab: RefCell::new(HashMap::new()),
            next_lab_cluster: Cell::new(LAB_POOL_START),
        };
        let superblock = Superblock {
            total_sectors: 0,
            cluster_size: CLUSTER_SIZE,
            total_clusters: 10_000_000,
            lit_start_cluster,
            lit_clusters: 0,
            lab_pool_start: 0,
            lab_pool_clusters: 0,
            next_free_lab: 0,
            level_registry_cluster: 0,
            level_registry_clusters: 0,
            journal_start_cluster: 0,
            journal_sectors: 0,
            last_tx_id: 0,
            next_level_id: 0,
            total_levels: 0,
            root_level_id: 0,
            root_dir_cluster: 0,
            backup_sb_cluster: 0,
            free_cluster_hint: 0,
            total_free_clusters: 0,
            lat_start_cluster: 0,
            lat_sectors: 0,
            volume_name: String::new(),
        };
        (device, superblock)
    }

    fn modify_cluster(&self, cluster: u64, f: impl FnOnce(&mut [u8])) {
        let mut clusters = self.clusters.borrow_mut();
        let buf = clusters
            .entry(cluster)
            .or_insert_with(|| [0u8; CLUSTER_SIZE as usize]);
        f(buf);
    }

    /// Points `cluster`'s LAB entry at `next_cluster`, creating whatever
    /// LIT/LAB clusters are needed along the way.
    pub(crate) fn link(&self, cluster: u64, next_cluster: u64) {
        self.link_with_level(cluster, next_cluster, 0);
    }

    pub(crate) fn link_with_level(&self, cluster: u64, next_cluster: u64, level_id: u32) {
        let lit_index = cluster / hlat::CLUSTERS_PER_LIT_ENTRY;
        let lab_cluster = {
            let mut map = self.lit_index_to_lab.borrow_mut();
            if let Some(&existing) = map.get(&lit_index) {
                existing
            } else {
                let allocated = self.next_lab_cluster.get();
                self.next_lab_cluster.set(allocated + 1);
                map.insert(lit_index, allocated);
                allocated
            }
        };

        let lit_cluster_idx = lit_index / hlat::LIT_ENTRIES_PER_CLUSTER;
        let lit_entry_idx = (lit_index % hlat::LIT_ENTRIES_PER_CLUSTER) as usize;
        let lit_cluster = self.lit_start_cluster + lit_cluster_idx;
        self.modify_cluster(lit_cluster, |buf| {
            let offset = lit_entry_idx * 24;
            hlat::write_lit_entry(&mut buf[offset..offset + 24], lab_cluster);
        });

        let lab_offset = (cluster % hlat::LAB_ENTRIES_PER_CLUSTER) as usize;
        self.modify_cluster(lab_cluster, |buf| {
            let offset = lab_offset * 16;
            hlat::write_lab_entry(&mut buf[offset..offset + 16], next_cluster, level_id);
        });
    }

    /// Fills an entire cluster with a repeating byte, for `read_file`
    /// payload fixtures.
    pub(crate) fn fill_cluster(&self, cluster: u64, byte: u8) {
        self.modify_cluster(cluster, |buf| buf.fill(byte));
    }

    pub(crate) fn write_version_entry(
        &self,
        cluster: u64,
        index: usize,
        name: &str,
        content_cluster: u64,
        level_id: u64,
        parent_level_id: u64,
        is_active: bool,
    ) {
        self.modify_cluster(cluster, |buf| {
            let offset = index * VERSION_ENTRY_SIZE;
            let record = &mut buf[offset..offset + VERSION_ENTRY_SIZE];
            record.fill(0);
            let name_bytes = name.as_bytes();
            let n = name_bytes.len().min(32);
            record[..n].copy_from_slice(&name_bytes[..n]);
            record[32..40].copy_from_slice(&content_cluster.to_le_bytes());
            record[40..48].copy_from_slice(&level_id.to_le_bytes());
            record[48..56].copy_from_slice(&parent_level_id.to_le_bytes());
            record[60] = u8::from(is_active);
        });
    }

    pub(crate) fn write_dir_entry(
        &self,
        cluster: u64,
        index: usize,
        name: &str,
        entry_type: u8,
        start_cluster: u64,
        size: u64,
    ) {
        self.modify_cluster(cluster, |buf| {
            let offset = index * DIR_ENTRY_SIZE;
            let record = &mut buf[offset..offset + DIR_ENTRY_SIZE];
            record.fill(0);
            let name_bytes = name.as_bytes();
            let n = name_bytes.len().min(32);
            record[..n].copy_from_slice(&name_bytes[..n]);
            record[32] = entry_type;
            record[33..41].copy_from_slice(&start_cluster.to_le_bytes());
            record[41..49].copy_from_slice(&size.to_le_bytes());
        });
    }

    pub(crate) fn write_level_descriptor(
        &self,
        cluster: u64,
        index: usize,
        name: &str,
        level_id: u64,
        root_content_cluster: u64,
        flags: u32,
    ) {
        self.modify_cluster(cluster, |buf| {
            let offset = index * LEVEL_DESCRIPTOR_SIZE;
            let record = &mut buf[offset..offset + LEVEL_DESCRIPTOR_SIZE];
            record.fill(0);
            let name_bytes = name.as_bytes();
            let n = name_bytes.len().min(32);
            record[..n].copy_from_slice(&name_bytes[..n]);
            record[32..40].copy_from_slice(&level_id.to_le_bytes());
            record[48..56].copy_from_slice(&root_content_cluster.to_le_bytes());
            record[72..76].copy_from_slice(&flags.to_le_bytes());
        });
    }
}

impl DataStorage for MemoryDevice {
    fn read(&self, offset: u64, buffer: &mut [u8]) -> DsResult<()> {
        let mut written = 0usize;
        while written < buffer.len() {
            let pos = offset + written as u64;
            let cluster = pos / CLUSTER_SIZE as u64;
            let in_cluster = (pos % CLUSTER_SIZE as u64) as usize;
            let take = (buffer.len() - written).min(CLUSTER_SIZE as usize - in_cluster);

            let clusters = self.clusters.borrow();
            match clusters.get(&cluster) {
                Some(data) => buffer[written..written + take]
                    .copy_from_slice(&data[in_cluster..in_cluster + take]),
                None => buffer[written..written + take].fill(0),
            }
            written += take;
        }
        Ok(())
    }

    fn write(&self, offset: u64, buffer: &[u8]) -> DsResult<()> {
        let mut read = 0usize;
        while read < buffer.len() {
            let pos = offset + read as u64;
            let cluster = pos / CLUSTER_SIZE as u64;
            let in_cluster = (pos % CLUSTER_SIZE as u64) as usize;
            let take = (buffer.len() - read).min(CLUSTER_SIZE as usize - in_cluster);

            self.modify_cluster(cluster, |data| {
                data[in_cluster..in_cluster + take].copy_from_slice(&buffer[read..read + take]);
            });
            read += take;
        }
        Ok(())
    }
}
