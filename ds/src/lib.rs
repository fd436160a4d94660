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

//! The byte-source boundary every file system server in this workspace is
//! generic over: open-for-read, a positioned read/write of `n` bytes at
//! offset `o`. Implementations decide what "close" means (on drop, usually).

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("read of {length} bytes at offset {offset} failed: {source}")]
    Read {
        offset: u64,
        length: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("write of {length} bytes at offset {offset} failed: {source}")]
    Write {
        offset: u64,
        length: usize,
        #[source]
        source: std::io::Error,
    },
}

/// A positioned, shareable byte source. Implementations are not required to
/// be unbuffered, but callers on raw-device backends should assume reads may
/// need to be sector-aligned.
pub trait DataStorage {
    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()>;

    fn write(&self, offset: u64, buffer: &[u8]) -> Result<()>;
}
