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

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};

use parking_lot::Mutex;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{BlobEntry, BlobSink, BlobSource, EntryToken};
use crate::error::Error;

/// Largest buffer reserved up front from an entry's declared size. Longer entries grow as
/// they are read.
const MAX_PREALLOCATION: usize = 1 << 20;

fn zip_error(e: impl std::fmt::Display) -> Error {
    Error::archive(format!("zip: {e}"))
}

/// ZIP64-capable sink backed by the `zip` crate.
pub struct ZipSink {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    seen: HashSet<String>,
}

impl ZipSink {
    pub fn new() -> Self {
        ZipSink {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            seen: HashSet::new(),
        }
    }
}

impl Default for ZipSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobSink for ZipSink {
    fn add(&mut self, path: &str, data: Vec<u8>) -> Result<(), Error> {
        if !self.seen.insert(path.to_string()) {
            return Err(Error::archive(format!("duplicate entry `{path}`")));
        }
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(data.len() as u64 >= u32::MAX as u64);
        self.writer.start_file(path, options).map_err(zip_error)?;
        self.writer.write_all(&data).map_err(zip_error)?;
        Ok(())
    }

    fn close(&mut self) -> Result<Vec<u8>, Error> {
        let cursor = self.writer.finish().map_err(zip_error)?;
        Ok(cursor.into_inner())
    }
}

pub struct ZipSource<'a> {
    archive: Mutex<ZipArchive<Cursor<&'a [u8]>>>,
    entries: Vec<BlobEntry>,
}

impl<'a> ZipSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<ZipSource<'a>, Error> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(zip_error)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index(i).map_err(zip_error)?;
            entries.push(BlobEntry {
                path: file.name().to_string(),
                token: EntryToken(i),
            });
        }
        Ok(ZipSource {
            archive: Mutex::new(archive),
            entries,
        })
    }
}

impl BlobSource for ZipSource<'_> {
    fn entries(&self) -> &[BlobEntry] {
        &self.entries
    }

    fn read(&self, token: EntryToken) -> Result<Cow<'_, [u8]>, Error> {
        let mut archive = self.archive.lock();
        let mut file = archive.by_index(token.0).map_err(zip_error)?;
        let declared = usize::try_from(file.size()).unwrap_or(usize::MAX);
        let mut data = Vec::with_capacity(declared.min(MAX_PREALLOCATION));
        file.read_to_end(&mut data).map_err(zip_error)?;
        Ok(Cow::Owned(data))
    }
}
