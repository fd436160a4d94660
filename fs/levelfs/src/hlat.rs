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

//! The Hierarchical Level Allocation Table: a two-tier sparse index from a
//! cluster number to its successor in an allocation chain. First tier
//! (LIT) maps a 256-cluster stripe to the LAB cluster holding that
//! stripe's successor pointers; second tier (LAB) holds the pointers
//! themselves, 256 per cluster.

use hyrax_ds::DataStorage;
use log::warn;
use zerocopy::{
    little_endian::{U16, U32, U64},
    FromBytes, Immutable, IntoBytes, KnownLayout,
};

use crate::{superblock::Superblock, Result, CLUSTER_SIZE};

/// Clusters a single LIT entry's LAB cluster describes.
pub const CLUSTERS_PER_LIT_ENTRY: u64 = 256;
/// Successor pointers packed into a single LAB cluster.
pub const LAB_ENTRIES_PER_CLUSTER: u64 = 256;
/// LIT entries packed into a single LIT cluster (4096 / 24 = 170.67,
/// trailing 16 bytes of each LIT cluster are padding).
pub const LIT_ENTRIES_PER_CLUSTER: u64 = (CLUSTER_SIZE as u64) / RawLitEntry::SIZE;

pub const FREE: u64 = 0;
pub const END: u64 = u64::MAX;
pub const BAD: u64 = u64::MAX - 1;

/// What a successor pointer actually means, replacing magic-number
/// comparisons scattered through callers with one place that classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLink {
    Free,
    Valid(u64),
    End,
    Bad,
}

pub fn classify(value: u64) -> ClusterLink {
    match value {
        FREE => ClusterLink::Free,
        END => ClusterLink::End,
        BAD => ClusterLink::Bad,
        c => ClusterLink::Valid(c),
    }
}

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawLitEntry {
    lab_cluster: U64,
    base_cluster: U64,
    allocated_count: U32,
    flags: U32,
}

impl RawLitEntry {
    const SIZE: u64 = 24;
}

const _: () = assert!(std::mem::size_of::<RawLitEntry>() == RawLitEntry::SIZE as usize);

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawLabEntry {
    next_cluster: U64,
    level_id: U32,
    flags: U16,
    ref_count: U16,
}

const _: () = assert!(std::mem::size_of::<RawLabEntry>() == 16);

/// A decoded LAB entry: the successor of the cluster that was resolved,
/// plus the bookkeeping fields carried alongside it.
#[derive(Debug, Clone, Copy)]
pub struct LabEntry {
    pub next_cluster: u64,
    pub level_id: u32,
    pub flags: u16,
    pub ref_count: u16,
}

impl LabEntry {
    const SYNTHETIC_FREE: Self = Self {
        next_cluster: FREE,
        level_id: 0,
        flags: 0,
        ref_count: 0,
    };

    pub fn link(&self) -> ClusterLink {
        classify(self.next_cluster)
    }
}

/// Resolves `cluster`'s LAB entry by walking LIT then LAB. Out-of-range
/// input and unindexed (entirely free) stripes both resolve to a
/// synthetic FREE entry rather than an error (the defensive sentinel
/// path callers rely on to treat such clusters as chain terminators).
pub fn resolve<DS: DataStorage>(
    data_storage: &DS,
    superblock: &Superblock,
    cluster: u64,
) -> Result<LabEntry> {
    if !superblock.is_valid_cluster(cluster) {
        return Ok(LabEntry::SYNTHETIC_FREE);
    }

    let lit_index = cluster / CLUSTERS_PER_LIT_ENTRY;
    let lab_offset = cluster % CLUSTERS_PER_LIT_ENTRY;

    let lit_cluster_idx = lit_index / LIT_ENTRIES_PER_CLUSTER;
    let lit_entry_idx = lit_index % LIT_ENTRIES_PER_CLUSTER;

    let mut lit_cluster_buf = [0u8; CLUSTER_SIZE as usize];
    let lit_cluster = superblock.lit_start_cluster + lit_cluster_idx;
    data_storage.read(lit_cluster * CLUSTER_SIZE as u64, &mut lit_cluster_buf)?;

    let lit_entry_offset = (lit_entry_idx * RawLitEntry::SIZE) as usize;
    let lit_entry = RawLitEntry::ref_from_bytes(
        &lit_cluster_buf[lit_entry_offset..lit_entry_offset + RawLitEntry::SIZE as usize],
    )
    .expect("slice is exactly one RawLitEntry wide");

    let lab_cluster = lit_entry.lab_cluster.get();
    if lab_cluster == 0 {
        return Ok(LabEntry::SYNTHETIC_FREE);
    }
    if lab_cluster >= superblock.total_clusters {
        warn!("LIT entry {lit_index} points at out-of-range LAB cluster {lab_cluster}");
        return Ok(LabEntry::SYNTHETIC_FREE);
    }

    let mut lab_cluster_buf = [0u8; CLUSTER_SIZE as usize];
    data_storage.read(lab_cluster * CLUSTER_SIZE as u64, &mut lab_cluster_buf)?;

    let lab_entry_offset = (lab_offset * 16) as usize;
    let lab_entry =
        RawLabEntry::ref_from_bytes(&lab_cluster_buf[lab_entry_offset..lab_entry_offset + 16])
            .expect("slice is exactly one RawLabEntry wide");

    Ok(LabEntry {
        next_cluster: lab_entry.next_cluster.get(),
        level_id: lab_entry.level_id.get(),
        flags: lab_entry.flags.get(),
        ref_count: lab_entry.ref_count.get(),
    })
}

#[cfg(test)]
pub(crate) fn write_lit_entry(buf: &mut [u8], lab_cluster: u64) {
    let entry = RawLitEntry {
        lab_cluster: lab_cluster.into(),
        base_cluster: 0u64.into(),
        allocated_count: 0u32.into(),
        flags: 0u32.into(),
    };
    buf.copy_from_slice(entry.as_bytes());
}

#[cfg(test)]
pub(crate) fn write_lab_entry(buf: &mut [u8], next_cluster: u64, level_id: u32) {
    let entry = RawLabEntry {
        next_cluster: next_cluster.into(),
        level_id: level_id.into(),
        flags: 0u16.into(),
        ref_count: 0u16.into(),
    };
    buf.copy_from_slice(entry.as_bytes());
}
