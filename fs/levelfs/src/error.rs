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

use thiserror::Error as ThisError;

pub type Result<T> = core::result::Result<T, Error>;

/// Fatal errors. Mounting a foreign volume, or losing the underlying
/// device mid-read, are the only conditions this core treats as hard
/// failures; everything else (a bent chain, a malformed record, an
/// out-of-range cluster number) degrades gracefully at the call site
/// instead of propagating here.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("device read failed: {0}")]
    Device(#[from] hyrax_ds::Error),
    #[error("invalid superblock: {0}")]
    InvalidHeader(#[from] InvalidHeaderError),
}

#[derive(ThisError, Debug)]
pub enum InvalidHeaderError {
    #[error("superblock too short: got {0} bytes, need 512")]
    TooShort(usize),
    #[error("bad magic: expected 0x4c465332, got {0:#010x}")]
    BadMagic(u32),
    #[error("unsupported version: {0} (only version 2 is supported)")]
    UnsupportedVersion(u32),
}
