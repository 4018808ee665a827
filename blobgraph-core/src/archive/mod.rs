// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Container codecs: pack named blobs into one archive and read them back.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::Error;

mod pack;
#[cfg(feature = "zip")]
mod zip;

pub use pack::{PackReader, PackWriter, PACK_MAGIC};
#[cfg(feature = "zip")]
pub use self::zip::{ZipSink, ZipSource};

/// Opaque handle to one entry of a [`BlobSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryToken(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobEntry {
    pub path: String,
    pub token: EntryToken,
}

/// Write side of a container. Paths must be unique.
pub trait BlobSink {
    fn add(&mut self, path: &str, data: Vec<u8>) -> Result<(), Error>;
    /// Finalizes the archive and returns its bytes.
    fn close(&mut self) -> Result<Vec<u8>, Error>;
}

/// Read side of a container.
pub trait BlobSource {
    fn entries(&self) -> &[BlobEntry];
    fn read(&self, token: EntryToken) -> Result<Cow<'_, [u8]>, Error>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// The built-in binary container.
    #[default]
    Pack,
    /// Standard ZIP archive.
    #[cfg(feature = "zip")]
    Zip,
}

pub fn new_sink(format: ArchiveFormat) -> Box<dyn BlobSink> {
    match format {
        ArchiveFormat::Pack => Box::new(PackWriter::new()),
        #[cfg(feature = "zip")]
        ArchiveFormat::Zip => Box::new(ZipSink::new()),
    }
}

/// Opens `bytes` with whichever codec its leading magic belongs to.
pub fn open_source(bytes: &[u8]) -> Result<Box<dyn BlobSource + '_>, Error> {
    if bytes.starts_with(PACK_MAGIC) {
        return Ok(Box::new(PackReader::new(bytes)?));
    }
    #[cfg(feature = "zip")]
    {
        if bytes.starts_with(b"PK") {
            return Ok(Box::new(ZipSource::new(bytes)?));
        }
    }
    Err(Error::archive("unrecognized container format"))
}

/// In-memory archive that is both a sink and a source, handy for inspecting the blobs
/// of a graph without packing them.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    blobs: BTreeMap<String, Vec<u8>>,
    entries: Vec<BlobEntry>,
    order: Vec<String>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.blobs.get(path).map(|v| v.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        let removed = self.blobs.remove(path)?;
        self.order.retain(|p| p != path);
        self.reindex();
        Some(removed)
    }

    pub fn insert(&mut self, path: &str, data: Vec<u8>) -> Option<Vec<u8>> {
        let old = self.blobs.insert(path.to_string(), data);
        if old.is_none() {
            self.entries.push(BlobEntry {
                path: path.to_string(),
                token: EntryToken(self.order.len()),
            });
            self.order.push(path.to_string());
        }
        old
    }

    fn reindex(&mut self) {
        self.entries = self
            .order
            .iter()
            .enumerate()
            .map(|(i, p)| BlobEntry {
                path: p.clone(),
                token: EntryToken(i),
            })
            .collect();
    }
}

impl BlobSink for MemoryArchive {
    fn add(&mut self, path: &str, data: Vec<u8>) -> Result<(), Error> {
        if self.blobs.contains_key(path) {
            return Err(Error::archive(format!("duplicate entry `{path}`")));
        }
        self.insert(path, data);
        Ok(())
    }

    fn close(&mut self) -> Result<Vec<u8>, Error> {
        let mut writer = PackWriter::new();
        for path in &self.order {
            if let Some(data) = self.blobs.get(path) {
                writer.add(path, data.clone())?;
            }
        }
        writer.close()
    }
}

impl BlobSource for MemoryArchive {
    fn entries(&self) -> &[BlobEntry] {
        &self.entries
    }

    fn read(&self, token: EntryToken) -> Result<Cow<'_, [u8]>, Error> {
        let path = self
            .order
            .get(token.0)
            .ok_or_else(|| Error::archive(format!("no entry with token {}", token.0)))?;
        self.blobs
            .get(path)
            .map(|v| Cow::Borrowed(v.as_slice()))
            .ok_or_else(|| Error::missing_entry(path.clone()))
    }
}
