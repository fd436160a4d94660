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

//! LevelFS v2: a read-only driver for a filesystem whose directories own
//! independently-rooted "levels" (versions), one of which is selected on
//! entry. This crate covers the format core only (superblock parsing,
//! the two-tier HLAT cluster index, chain traversal, and record decoding),
//! composed into [`FileSystemServer`]. Disk discovery, the explorer UI,
//! and any write path live outside this crate.

pub mod chain;
mod error;
pub mod hlat;
pub mod records;
mod superblock;
#[cfg(test)]
mod test_support;

pub use error::{Error, InvalidHeaderError, Result};
pub use superblock::Superblock;

use hyrax_ds::DataStorage;
use log::warn;

use chain::ClusterChain;
use records::{DirEntry, LevelDescriptor, VersionEntry};

/// Bytes in one sector: the unit the block device reads.
pub const SECTOR_SIZE: u64 = 512;
/// Bytes in one cluster: the unit every higher layer addresses.
pub const CLUSTER_SIZE: u32 = 4096;
/// Sectors per cluster (`CLUSTER_SIZE / SECTOR_SIZE`).
pub const SECTORS_PER_CLUSTER: u64 = (CLUSTER_SIZE as u64) / SECTOR_SIZE;

/// Conventional name of the fallback level expected (not required) in a
/// root or per-directory version table; invariant 4 in the data model.
pub const DEFAULT_VERSION_NAME: &str = "master";

/// A mounted LevelFS v2 volume. Owns the device handle and the parsed
/// superblock; every other structure (LIT/LAB clusters, version tables,
/// directory chains, the level registry) is read on demand and never
/// cached across calls.
pub struct FileSystemServer<DS: DataStorage> {
    data_storage: DS,
    superblock: Superblock,
}

impl<DS: DataStorage> FileSystemServer<DS> {
    /// Mounts `data_storage`: reads sector 0 and validates it as a
    /// LevelFS v2 superblock. Fails only on a short read, a device error,
    /// a magic mismatch, or an unsupported version (the four conditions
    /// spec'd as fatal for mount). Every other operation on the returned
    /// server degrades gracefully instead of failing.
    pub fn new(data_storage: DS) -> Result<Self> {
        let superblock = Superblock::read_from(&data_storage)?;
        Ok(Self {
            data_storage,
            superblock,
        })
    }

    /// Read-only access to the parsed superblock, for free-space and
    /// volume-name readouts.
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// Used and total byte counts derived from the superblock's free-space
    /// accounting fields. Not part of the distilled operation table, but
    /// present on the original driver and computable read-only from
    /// fields the core already parses.
    pub fn usage(&self) -> (u64, u64) {
        let total = self.superblock.total_clusters * self.superblock.cluster_size as u64;
        let used = (self.superblock.total_clusters - self.superblock.total_free_clusters)
            * self.superblock.cluster_size as u64;
        (used, total)
    }

    /// The `VersionEntry` records of the table rooted at `cluster` (either
    /// the root version table or a `LEVELED_DIR`'s own table), in file
    /// order. Never fails; a bad cluster number yields an empty list.
    pub fn list_versions(&self, cluster: u64) -> Vec<VersionEntry> {
        records::read_versions(&self.data_storage, &self.superblock, cluster)
    }

    /// The `DirEntry` records of the directory content chain rooted at
    /// `content_cluster`, in file order. Never fails.
    pub fn list_dir(&self, content_cluster: u64) -> Vec<DirEntry> {
        records::read_dir(&self.data_storage, &self.superblock, content_cluster)
    }

    /// Every live `LevelDescriptor` in the global level registry.
    pub fn list_levels(&self) -> Vec<LevelDescriptor> {
        records::read_levels(
            &self.data_storage,
            &self.superblock,
            self.superblock.level_registry_cluster,
        )
    }

    /// Looks up a level by id in the global registry. `None` stands in
    /// for the spec's distinguishable "not found" result rather than an
    /// error (§7 point 4).
    pub fn find_level(&self, level_id: u64) -> Option<LevelDescriptor> {
        self.list_levels()
            .into_iter()
            .find(|level| level.level_id == level_id)
    }

    /// Reads up to `size` bytes starting at cluster `start`, concatenating
    /// clusters in chain order. Stops at `size` even if the chain extends
    /// further, and returns fewer than `size` bytes if the chain ends
    /// (or degrades) early.
    pub fn read_file(&self, start: u64, size: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity(size.min(1 << 24) as usize);
        for cluster in ClusterChain::new(&self.data_storage, &self.superblock, start) {
            if out.len() as u64 >= size {
                break;
            }
            let cluster = match cluster {
                Ok(cluster) => cluster,
                Err(error) => {
                    warn!("read_file stopped early: {error}");
                    break;
                }
            };
            let mut buffer = vec![0u8; CLUSTER_SIZE as usize];
            if let Err(error) = self
                .data_storage
                .read(cluster * CLUSTER_SIZE as u64, &mut buffer)
            {
                warn!("read_file stopped early: {error}");
                break;
            }
            let remaining = (size - out.len() as u64) as usize;
            let take = remaining.min(buffer.len());
            out.extend_from_slice(&buffer[..take]);
        }
        out
    }

    /// The UTF-8 symlink target stored starting at `cluster`, up to the
    /// first NUL. `None` if `cluster == 0` (no target) or if the payload
    /// contains no NUL-terminated valid prefix within the chain's bound.
    pub fn read_symlink_target(&self, cluster: u64) -> Option<String> {
        if cluster == 0 {
            return None;
        }

        let mut payload = Vec::with_capacity(CLUSTER_SIZE as usize);
        for c in ClusterChain::new(&self.data_storage, &self.superblock, cluster) {
            let c = match c {
                Ok(c) => c,
                Err(error) => {
                    warn!("read_symlink_target stopped early: {error}");
                    break;
                }
            };
            let mut buffer = vec![0u8; CLUSTER_SIZE as usize];
            if let Err(error) = self.data_storage.read(c * CLUSTER_SIZE as u64, &mut buffer) {
                warn!("read_symlink_target stopped early: {error}");
                break;
            }
            let had_nul = buffer.iter().any(|&b| b == 0);
            payload.extend_from_slice(&buffer);
            if had_nul {
                break;
            }
        }

        let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
        Some(String::from_utf8_lossy(&payload[..end]).into_owned())
    }

    /// The root version table's fallback: the entry named
    /// [`DEFAULT_VERSION_NAME`] if present, otherwise the first active
    /// entry (invariant 4). `None` if the root table has no active
    /// entries at all.
    pub fn default_version(&self) -> Option<VersionEntry> {
        let versions = self.list_versions(self.superblock.root_dir_cluster);
        versions
            .iter()
            .find(|v| v.name == DEFAULT_VERSION_NAME)
            .cloned()
            .or_else(|| versions.into_iter().next())
    }
}

/// Minimal conformance to the workspace-wide, index-based `FileSystem`
/// trait. LevelFS's level-table navigation (picking a version, entering a
/// leveled directory) has no equivalent in that generic, single-index
/// surface, so (like `fs/cdfs` and `fs/ntfs` in this workspace) the
/// trait methods are left unimplemented; callers that need LevelFS's
/// actual read surface use the inherent methods above instead.
impl<DS: DataStorage> hyrax_fs::FileSystem for FileSystemServer<DS> {
    fn stat(&self, _index: u64, _offset: u64, _buffer: &mut [u8]) -> hyrax_fs::Result<u64> {
        Err(hyrax_fs::Error::Unimplemented)
    }

    fn read(&self, _index: u64, _offset: u64, _buffer: &mut [u8]) -> hyrax_fs::Result<()> {
        Err(hyrax_fs::Error::Unimplemented)
    }

    fn write(&self, _index: u64, _offset: u64, _buffer: &[u8]) -> hyrax_fs::Result<()> {
        Err(hyrax_fs::Error::Unimplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DirEntryType;
    use crate::superblock::raw_bytes_for_test;
    use crate::test_support::MemoryDevice;

    fn mount(bytes: &[u8; 512]) -> Result<FileSystemServer<MemoryDevice>> {
        let (device, _) = MemoryDevice::new_blank();
        DataStorage::write(&device, 0, bytes).unwrap();
        FileSystemServer::new(device)
    }

    #[test]
    fn mount_rejects_foreign_volume() {
        let mut bytes = [0u8; 512];
        bytes[0..4].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        let result = mount(&bytes);
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn mount_accepts_valid_v2() {
        let bytes = raw_bytes_for_test(
            crate::superblock::MAGIC,
            crate::superblock::VERSION,
            4096,
            1,
            100,
            0,
            "LEVELFS",
        );
        let fs = mount(&bytes).expect("valid v2 superblock mounts");
        assert_eq!(fs.superblock().volume_name, "LEVELFS");
        assert_eq!(fs.superblock().total_clusters, 4096);
        assert_eq!(fs.superblock().root_dir_cluster, 100);
    }

    #[test]
    fn single_cluster_chain_read() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(200, hlat::END);
        device.fill_cluster(200, 0x41);

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };
        let bytes = fs.read_file(200, 10);
        assert_eq!(bytes, vec![0x41u8; 10]);
    }

    #[test]
    fn two_cluster_chain_truncated_by_size() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(200, 201);
        device.link(201, hlat::END);
        device.fill_cluster(200, 0x41);
        device.fill_cluster(201, 0x42);

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };
        let bytes = fs.read_file(200, 4100);
        assert_eq!(bytes.len(), 4100);
        assert!(bytes[..4096].iter().all(|&b| b == 0x41));
        assert!(bytes[4096..].iter().all(|&b| b == 0x42));
    }

    #[test]
    fn leveled_directory_navigation() {
        let (device, mut superblock) = MemoryDevice::new_blank();
        superblock.root_dir_cluster = 300;

        device.link(300, hlat::END);
        device.write_version_entry(300, 0, "master", 350, 1, 0, true);

        device.link(350, hlat::END);
        device.write_dir_entry(350, 0, "docs", DirEntryType::LEVELED_DIR, 400, 0);

        device.link(400, hlat::END);
        device.write_version_entry(400, 0, "master", 500, 10, 1, true);
        device.write_version_entry(400, 1, "draft", 600, 11, 1, true);

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };

        let root_versions = fs.list_versions(fs.superblock().root_dir_cluster);
        assert_eq!(root_versions.len(), 1);
        assert_eq!(root_versions[0].name, "master");

        let docs = fs.list_dir(root_versions[0].content_cluster);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "docs");
        assert_eq!(docs[0].entry_type, DirEntryType::LeveledDir);

        let versions = fs.list_versions(docs[0].start_cluster);
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].name, "master");
        assert_eq!(versions[1].name, "draft");
    }

    #[test]
    fn cycle_defense_does_not_hang() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(200, 200);
        device.fill_cluster(200, 0x41);

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };
        // A self-referential chain would spin forever without the bound in
        // `ClusterChain`; asking for far more than one cluster's worth of
        // bytes still returns promptly, truncated by the chain's own cap
        // rather than by `size`.
        let bytes = fs.read_file(200, (CLUSTER_SIZE as u64) * 10);
        assert_eq!(bytes.len(), (CLUSTER_SIZE as usize) * 10);
        assert!(bytes.iter().all(|&b| b == 0x41));
    }

    #[test]
    fn find_level_reports_not_found_as_none() {
        let (device, mut superblock) = MemoryDevice::new_blank();
        superblock.level_registry_cluster = 700;
        device.link(700, hlat::END);
        device.write_level_descriptor(700, 0, "main", 1, 800, 0x0001);

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };
        assert!(fs.find_level(1).is_some());
        assert!(fs.find_level(2).is_none());
    }

    #[test]
    fn read_symlink_target_stops_at_nul() {
        let (device, superblock) = MemoryDevice::new_blank();
        device.link(900, hlat::END);
        let target = b"/docs/readme.txt";
        DataStorage::write(&device, 900 * CLUSTER_SIZE as u64, target).unwrap();

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };
        assert_eq!(
            fs.read_symlink_target(900).as_deref(),
            Some("/docs/readme.txt")
        );
        assert_eq!(fs.read_symlink_target(0), None);
    }

    #[test]
    fn default_version_falls_back_to_first_active() {
        let (device, mut superblock) = MemoryDevice::new_blank();
        superblock.root_dir_cluster = 300;
        device.link(300, hlat::END);
        device.write_version_entry(300, 0, "trunk", 400, 1, 0, true);

        let fs = FileSystemServer {
            data_storage: device,
            superblock,
        };
        let default = fs.default_version().expect("one active version exists");
        assert_eq!(default.name, "trunk");
    }
}
