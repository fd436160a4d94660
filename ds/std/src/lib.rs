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

use std::{fs::File, io, os::unix::fs::FileExt, path::Path};

use hyrax_ds::{DataStorage, Error, Result};

/// Opens a plain file (or, on unix, a block device node) read-write and
/// serves positioned reads/writes over it via `pread`/`pwrite`.
pub struct DataStorageServer {
    file: File,
}

impl DataStorageServer {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            file: File::options().read(true).write(true).open(path)?,
        })
    }

    /// Opens strictly for reading; write calls on the returned server fail
    /// at the OS level rather than at the type level.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }
}

impl DataStorage for DataStorageServer {
    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
        self.file
            .read_exact_at(buffer, offset)
            .map_err(|source| Error::Read {
                offset,
                length: buffer.len(),
                source,
            })
    }

    fn write(&self, offset: u64, buffer: &[u8]) -> Result<()> {
        self.file
            .write_all_at(buffer, offset)
            .map_err(|source| Error::Write {
                offset,
                length: buffer.len(),
                source,
            })
    }
}
