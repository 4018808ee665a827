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

//! The built-in binary container.
//!
//! ```text
//! magic "BGPK" | version u8 | entry count varuint32 |
//! { path (varuint32 len + utf8) | data len u64 | data }*
//! ```

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::debug;

use super::{BlobEntry, BlobSink, BlobSource, EntryToken};
use crate::buffer::{Reader, Writer};
use crate::error::Error;

pub const PACK_MAGIC: &[u8; 4] = b"BGPK";
const PACK_VERSION: u8 = 1;

#[derive(Default)]
pub struct PackWriter {
    entries: Vec<(String, Vec<u8>)>,
    seen: HashSet<String>,
}

impl PackWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobSink for PackWriter {
    fn add(&mut self, path: &str, data: Vec<u8>) -> Result<(), Error> {
        if !self.seen.insert(path.to_string()) {
            return Err(Error::archive(format!("duplicate entry `{path}`")));
        }
        self.entries.push((path.to_string(), data));
        Ok(())
    }

    fn close(&mut self) -> Result<Vec<u8>, Error> {
        let payload: usize = self.entries.iter().map(|(p, d)| p.len() + d.len() + 13).sum();
        let mut writer = Writer::with_capacity(payload + 16);
        writer.write_bytes(PACK_MAGIC);
        writer.write_u8(PACK_VERSION);
        let count = u32::try_from(self.entries.len())
            .map_err(|_| Error::archive("too many entries for a pack container"))?;
        writer.write_varuint32(count);
        for (path, data) in self.entries.drain(..) {
            writer.write_str(&path);
            writer.write_u64(data.len() as u64);
            writer.write_bytes(&data);
        }
        self.seen.clear();
        debug!(entries = count, bytes = writer.len(), "pack container closed");
        Ok(writer.into_inner())
    }
}

pub struct PackReader<'a> {
    bf: &'a [u8],
    entries: Vec<BlobEntry>,
    spans: Vec<(usize, usize)>,
}

impl<'a> PackReader<'a> {
    pub fn new(bf: &'a [u8]) -> Result<PackReader<'a>, Error> {
        let mut reader = Reader::new(bf);
        let magic = reader.read_bytes(PACK_MAGIC.len())?;
        if magic != PACK_MAGIC {
            return Err(Error::archive("not a pack container"));
        }
        let version = reader.read_u8()?;
        if version != PACK_VERSION {
            return Err(Error::archive(format!(
                "unsupported pack container version {version}"
            )));
        }
        let count = reader.read_varuint32()? as usize;
        let mut entries = Vec::with_capacity(count.min(4096));
        let mut spans = Vec::with_capacity(count.min(4096));
        let mut seen = HashSet::new();
        for i in 0..count {
            let path = reader.read_str()?;
            if !seen.insert(path) {
                return Err(Error::archive(format!("duplicate entry `{path}`")));
            }
            let len = usize::try_from(reader.read_u64()?)
                .map_err(|_| Error::archive("entry too large"))?;
            let start = reader.get_cursor();
            reader.skip(len)?;
            entries.push(BlobEntry {
                path: path.to_string(),
                token: EntryToken(i),
            });
            spans.push((start, len));
        }
        if reader.remaining() != 0 {
            return Err(Error::archive("trailing bytes after pack entries"));
        }
        Ok(PackReader { bf, entries, spans })
    }
}

impl BlobSource for PackReader<'_> {
    fn entries(&self) -> &[BlobEntry] {
        &self.entries
    }

    fn read(&self, token: EntryToken) -> Result<Cow<'_, [u8]>, Error> {
        let (start, len) = *self
            .spans
            .get(token.0)
            .ok_or_else(|| Error::archive(format!("no entry with token {}", token.0)))?;
        Ok(Cow::Borrowed(&self.bf[start..start + len]))
    }
}
