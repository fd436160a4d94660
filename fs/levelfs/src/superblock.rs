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

use hyrax_ds::DataStorage;
use zerocopy::{
    little_endian::{U32, U64},
    FromBytes, Immutable, IntoBytes, KnownLayout,
};

use crate::{Error, InvalidHeaderError, Result, SECTOR_SIZE};

/// Magic value "LFS2" stored little-endian in the superblock's first four
/// bytes.
pub const MAGIC: u32 = 0x4C46_5332;
/// Only revision this core understands. The older flat-LAT format
/// (magic `0x4C564C46`) is a distinct, unsupported on-disk layout.
pub const VERSION: u32 = 2;

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawSuperblock {
    magic: U32,
    version: U32,
    total_sectors: U64,
    cluster_size: U32,
    total_clusters: U64,
    lit_start_cluster: U64,
    lit_clusters: U64,
    lab_pool_start: U64,
    lab_pool_clusters: U64,
    next_free_lab: U64,
    level_registry_cluster: U64,
    level_registry_clusters: U64,
    journal_start_cluster: U64,
    journal_sectors: U64,
    last_tx_id: U64,
    next_level_id: U64,
    total_levels: U64,
    root_level_id: U64,
    root_dir_cluster: U64,
    backup_sb_cluster: U64,
    free_cluster_hint: U64,
    total_free_clusters: U64,
    lat_start_cluster: U64,
    lat_sectors: U64,
    volume_name: [u8; 32],
    pad: [u8; 300],
}

const _: () = assert!(size_of::<RawSuperblock>() == SECTOR_SIZE as usize);

/// The parsed, validated volume header. Every field the read-only core
/// needs is copied out of the raw 512-byte sector at construction time, so
/// callers never hold a borrow into device-backed memory.
#[derive(Debug, Clone)]
pub struct Superblock {
    pub total_sectors: u64,
    pub cluster_size: u32,
    pub total_clusters: u64,
    pub lit_start_cluster: u64,
    pub lit_clusters: u64,
    pub lab_pool_start: u64,
    pub lab_pool_clusters: u64,
    pub next_free_lab: u64,
    pub level_registry_cluster: u64,
    pub level_registry_clusters: u64,
    pub journal_start_cluster: u64,
    pub journal_sectors: u64,
    pub last_tx_id: u64,
    pub next_level_id: u64,
    pub total_levels: u64,
    pub root_level_id: u64,
    pub root_dir_cluster: u64,
    pub backup_sb_cluster: u64,
    pub free_cluster_hint: u64,
    pub total_free_clusters: u64,
    pub lat_start_cluster: u64,
    pub lat_sectors: u64,
    pub volume_name: String,
}

impl Superblock {
    /// Validates magic and version; every other field is accepted as-is,
    /// matching the "no heuristic recovery" stance for a non-LevelFS image.
    pub fn parse(bytes: &[u8]) -> core::result::Result<Self, InvalidHeaderError> {
        if bytes.len() < SECTOR_SIZE as usize {
            return Err(InvalidHeaderError::TooShort(bytes.len()));
        }
        let raw = RawSuperblock::ref_from_bytes(&bytes[..SECTOR_SIZE as usize])
            .expect("slice length checked above matches RawSuperblock size");

        let magic = raw.magic.get();
        if magic != MAGIC {
            return Err(InvalidHeaderError::BadMagic(magic));
        }
        let version = raw.version.get();
        if version != VERSION {
            return Err(InvalidHeaderError::UnsupportedVersion(version));
        }

        let nul = raw
            .volume_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(raw.volume_name.len());
        let volume_name = String::from_utf8_lossy(&raw.volume_name[..nul]).into_owned();

        Ok(Self {
            total_sectors: raw.total_sectors.get(),
            cluster_size: raw.cluster_size.get(),
            total_clusters: raw.total_clusters.get(),
            lit_start_cluster: raw.lit_start_cluster.get(),
            lit_clusters: raw.lit_clusters.get(),
            lab_pool_start: raw.lab_pool_start.get(),
            lab_pool_clusters: raw.lab_pool_clusters.get(),
            next_free_lab: raw.next_free_lab.get(),
            level_registry_cluster: raw.level_registry_cluster.get(),
            level_registry_clusters: raw.level_registry_clusters.get(),
            journal_start_cluster: raw.journal_start_cluster.get(),
            journal_sectors: raw.journal_sectors.get(),
            last_tx_id: raw.last_tx_id.get(),
            next_level_id: raw.next_level_id.get(),
            total_levels: raw.total_levels.get(),
            root_level_id: raw.root_level_id.get(),
            root_dir_cluster: raw.root_dir_cluster.get(),
            backup_sb_cluster: raw.backup_sb_cluster.get(),
            free_cluster_hint: raw.free_cluster_hint.get(),
            total_free_clusters: raw.total_free_clusters.get(),
            lat_start_cluster: raw.lat_start_cluster.get(),
            lat_sectors: raw.lat_sectors.get(),
            volume_name,
        })
    }

    /// Reads and parses the superblock from sector 0 of `data_storage`.
    pub fn read_from<DS: DataStorage>(data_storage: &DS) -> Result<Self> {
        let mut raw = RawSuperblock::new_zeroed();
        data_storage.read(0, raw.as_mut_bytes())?;
        Self::parse(raw.as_bytes()).map_err(Error::InvalidHeader)
    }

    /// Number of whole clusters the volume claims to span; used to bound
    /// cluster-number validity (invariant 1: `0 < c < total_clusters`).
    pub fn is_valid_cluster(&self, cluster: u64) -> bool {
        cluster > 0 && cluster < self.total_clusters
    }
}

#[cfg(test)]
pub(crate) fn raw_bytes_for_test(
    magic: u32,
    version: u32,
    total_clusters: u64,
    lit_start_cluster: u64,
    root_dir_cluster: u64,
    level_registry_cluster: u64,
    volume_name: &str,
) -> [u8; SECTOR_SIZE as usize] {
    let mut raw = RawSuperblock::new_zeroed();
    raw.magic = magic.into();
    raw.version = version.into();
    raw.cluster_size = 4096u32.into();
    raw.total_clusters = total_clusters.into();
    raw.lit_start_cluster = lit_start_cluster.into();
    raw.root_dir_cluster = root_dir_cluster.into();
    raw.level_registry_cluster = level_registry_cluster.into();
    let name_bytes = volume_name.as_bytes();
    let n = name_bytes.len().min(32);
    raw.volume_name[..n].copy_from_slice(&name_bytes[..n]);

    let mut out = [0u8; SECTOR_SIZE as usize];
    out.copy_from_slice(raw.as_bytes());
    out
}
