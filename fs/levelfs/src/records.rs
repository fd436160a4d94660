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

//! Fixed-size on-disk records and the table reader that turns a chain of
//! clusters into a filtered, ordered `Vec` of them. Layout and behavior are
//! kept apart: each record is a plain value type decoded by a free
//! function, and the table reader is a single generic that every schema
//! shares.

use hyrax_ds::DataStorage;
use log::warn;
use zerocopy::{
    little_endian::{U32, U64},
    FromBytes, Immutable, IntoBytes, KnownLayout,
};

use crate::{chain::ClusterChain, superblock::Superblock, CLUSTER_SIZE};

/// Decodes a 32-byte name field as UTF-8, stopping at the first NUL.
/// Invalid byte sequences are replaced with the Unicode replacement
/// character rather than rejected.
fn decode_name(bytes: &[u8; 32]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Reads every cluster of the chain starting at `start`, slices each into
/// `record_size`-wide chunks (discarding any trailing slice shorter than a
/// full record), and keeps whatever `decode` accepts. Never fails: a
/// device error or a chain that exceeds the safety bound simply truncates
/// the table, matching the facade's "never fails, returns what's intact"
/// contract.
fn read_table<DS: DataStorage, T>(
    data_storage: &DS,
    superblock: &Superblock,
    start: u64,
    record_size: usize,
    decode: impl Fn(&[u8]) -> Option<T>,
) -> Vec<T> {
    let mut records = Vec::new();
    let mut buffer = vec![0u8; CLUSTER_SIZE as usize];
    for cluster in ClusterChain::new(data_storage, superblock, start) {
        let cluster = match cluster {
            Ok(cluster) => cluster,
            Err(error) => {
                warn!("table read stopped early: {error}");
                break;
            }
        };
        if let Err(error) = data_storage.read(cluster * CLUSTER_SIZE as u64, &mut buffer) {
            warn!("table read stopped early: {error}");
            break;
        }
        for chunk in buffer.chunks(record_size) {
            if chunk.len() < record_size {
                continue;
            }
            if let Some(record) = decode(chunk) {
                records.push(record);
            }
        }
    }
    records
}

// --- VersionEntry ------------------------------------------------------

pub const VERSION_ENTRY_SIZE: usize = 68;

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawVersionEntry {
    name: [u8; 32],
    content_cluster: U64,
    level_id: U64,
    parent_level_id: U64,
    flags: U32,
    is_active: u8,
    pad: [u8; 7],
}

const _: () = assert!(size_of::<RawVersionEntry>() == VERSION_ENTRY_SIZE);

/// A named, independently-rooted level attached to a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub name: String,
    pub content_cluster: u64,
    pub level_id: u64,
    pub parent_level_id: u64,
    pub flags: u32,
    pub is_active: bool,
}

fn decode_version_entry(bytes: &[u8]) -> Option<VersionEntry> {
    let raw = RawVersionEntry::ref_from_bytes(bytes).expect("caller sliced an exact record");
    if raw.is_active == 0 || raw.name[0] == 0 {
        return None;
    }
    Some(VersionEntry {
        name: decode_name(&raw.name),
        content_cluster: raw.content_cluster.get(),
        level_id: raw.level_id.get(),
        parent_level_id: raw.parent_level_id.get(),
        flags: raw.flags.get(),
        is_active: true,
    })
}

/// Reads the chain of `VersionEntry` records rooted at `start` (the root
/// version table, or a `LEVELED_DIR` entry's `start_cluster`).
pub fn read_versions<DS: DataStorage>(
    data_storage: &DS,
    superblock: &Superblock,
    start: u64,
) -> Vec<VersionEntry> {
    read_table(
        data_storage,
        superblock,
        start,
        VERSION_ENTRY_SIZE,
        decode_version_entry,
    )
}

// --- DirEntry ------------------------------------------------------------

pub const DIR_ENTRY_SIZE: usize = 64;

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawDirEntry {
    name: [u8; 32],
    entry_type: u8,
    start_cluster: U64,
    size: U64,
    attributes: U32,
    create_time: U32,
    mod_time: U32,
    pad: [u8; 3],
}

const _: () = assert!(size_of::<RawDirEntry>() == DIR_ENTRY_SIZE);

/// `DirEntry::type`. `LevelMount` is decoded but never traversed here: its
/// content-resolution semantics are undefined by this core, so it is
/// surfaced as an opaque node (open question in the design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryType {
    File,
    LeveledDir,
    Symlink,
    Hardlink,
    LevelMount,
    /// Any value outside the known schema; preserved rather than dropped
    /// so a caller can at least see that an entry exists.
    Unknown(u8),
}

impl DirEntryType {
    pub(crate) const FREE: u8 = 0;
    pub(crate) const FILE: u8 = 1;
    pub(crate) const LEVELED_DIR: u8 = 2;
    pub(crate) const SYMLINK: u8 = 3;
    pub(crate) const HARDLINK: u8 = 4;
    pub(crate) const LEVEL_MOUNT: u8 = 5;

    fn from_raw(value: u8) -> Option<Self> {
        match value {
            Self::FREE => None,
            Self::FILE => Some(Self::File),
            Self::LEVELED_DIR => Some(Self::LeveledDir),
            Self::SYMLINK => Some(Self::Symlink),
            Self::HARDLINK => Some(Self::Hardlink),
            Self::LEVEL_MOUNT => Some(Self::LevelMount),
            other => Some(Self::Unknown(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub entry_type: DirEntryType,
    pub start_cluster: u64,
    pub size: u64,
    pub attributes: u32,
    pub create_time: u32,
    pub mod_time: u32,
}

fn decode_dir_entry(bytes: &[u8]) -> Option<DirEntry> {
    let raw = RawDirEntry::ref_from_bytes(bytes).expect("caller sliced an exact record");
    if raw.name[0] == 0 {
        return None;
    }
    let entry_type = DirEntryType::from_raw(raw.entry_type)?;
    Some(DirEntry {
        name: decode_name(&raw.name),
        entry_type,
        start_cluster: raw.start_cluster.get(),
        size: raw.size.get(),
        attributes: raw.attributes.get(),
        create_time: raw.create_time.get(),
        mod_time: raw.mod_time.get(),
    })
}

/// Reads the `DirEntry` records making up one directory content chain.
pub fn read_dir<DS: DataStorage>(
    data_storage: &DS,
    superblock: &Superblock,
    content_cluster: u64,
) -> Vec<DirEntry> {
    read_table(
        data_storage,
        superblock,
        content_cluster,
        DIR_ENTRY_SIZE,
        decode_dir_entry,
    )
}

// --- LevelDescriptor -------------------------------------------------------

pub const LEVEL_DESCRIPTOR_SIZE: usize = 104;

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawLevelDescriptor {
    name: [u8; 32],
    level_id: U64,
    parent_level_id: U64,
    root_content_cluster: U64,
    create_time: U64,
    mod_time: U64,
    flags: U32,
    ref_count: U32,
    child_count: U64,
    total_size: U64,
    pad: [u8; 8],
}

const _: () = assert!(size_of::<RawLevelDescriptor>() == LEVEL_DESCRIPTOR_SIZE);

/// A registry entry for one level, global across the whole volume
/// (contrast `VersionEntry`, which is scoped to a single directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDescriptor {
    pub name: String,
    pub level_id: u64,
    pub parent_level_id: u64,
    pub root_content_cluster: u64,
    pub create_time: u64,
    pub mod_time: u64,
    pub flags: u32,
    pub ref_count: u32,
    pub child_count: u64,
    pub total_size: u64,
}

const LEVEL_DESCRIPTOR_LIVE: u32 = 0x0001;

fn decode_level_descriptor(bytes: &[u8]) -> Option<LevelDescriptor> {
    let raw = RawLevelDescriptor::ref_from_bytes(bytes).expect("caller sliced an exact record");
    let level_id = raw.level_id.get();
    let flags = raw.flags.get();
    if level_id == 0 || flags & LEVEL_DESCRIPTOR_LIVE == 0 {
        return None;
    }
    Some(LevelDescriptor {
        name: decode_name(&raw.name),
        level_id,
        parent_level_id: raw.parent_level_id.get(),
        root_content_cluster: raw.root_content_cluster.get(),
        create_time: raw.create_time.get(),
        mod_time: raw.mod_time.get(),
        flags,
        ref_count: raw.ref_count.get(),
        child_count: raw.child_count.get(),
        total_size: raw.total_size.get(),
    })
}

/// Reads the global level registry chain rooted at
/// `Superblock::level_registry_cluster`.
pub fn read_levels<DS: DataStorage>(
    data_storage: &DS,
    superblock: &Superblock,
    start: u64,
) -> Vec<LevelDescriptor> {
    read_table(
        data_storage,
        superblock,
        start,
        LEVEL_DESCRIPTOR_SIZE,
        decode_level_descriptor,
    )
}
