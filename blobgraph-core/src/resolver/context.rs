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

use crate::archive::{BlobSink, BlobSource, EntryToken};
use crate::config::Config;
use crate::error::Error;
use crate::meta::{InfoCodec, MetaRecord};
use crate::path::{BlobKind, NodePath};
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::type_resolver::TypeRegistry;
use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

/// Position in a [`WriteContext`] that can be returned to when an optional member fails.
#[derive(Clone, Copy, Debug)]
pub struct WriteCheckpoint {
    blobs: usize,
    refs: usize,
}

pub struct WriteContext<'se> {
    config: &'se Config,
    registry: &'se TypeRegistry,
    codec: &'se dyn InfoCodec,
    blobs: Vec<(String, Vec<u8>)>,
    pub ref_writer: RefWriter,
    current_depth: u32,
}

impl<'se> WriteContext<'se> {
    pub fn new(
        config: &'se Config,
        registry: &'se TypeRegistry,
        codec: &'se dyn InfoCodec,
    ) -> WriteContext<'se> {
        WriteContext {
            config,
            registry,
            codec,
            blobs: Vec::new(),
            ref_writer: RefWriter::new(),
            current_depth: 0,
        }
    }

    pub fn get_config(&self) -> &'se Config {
        self.config
    }

    pub fn get_registry(&self) -> &'se TypeRegistry {
        self.registry
    }

    /// Buffers one blob; nothing reaches the container until [`WriteContext::finish`].
    pub fn add_blob(&mut self, name: String, data: Vec<u8>) {
        self.blobs.push((name, data));
    }

    pub fn write_meta(&mut self, path: &NodePath, meta: &MetaRecord) -> Result<(), Error> {
        let bytes = self.codec.serialize_info(meta);
        self.add_blob(path.blob(BlobKind::Info), bytes);
        Ok(())
    }

    pub fn write_null(&mut self, path: &NodePath) -> Result<(), Error> {
        self.write_meta(path, &MetaRecord::null())
    }

    pub fn write_pointer(&mut self, path: &NodePath, target: &NodePath) -> Result<(), Error> {
        self.write_meta(path, &MetaRecord::pointer(target.as_str()))
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    pub fn checkpoint(&self) -> WriteCheckpoint {
        WriteCheckpoint {
            blobs: self.blobs.len(),
            refs: self.ref_writer.checkpoint(),
        }
    }

    /// Drops every blob and identity recorded after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: WriteCheckpoint) {
        self.blobs.truncate(checkpoint.blobs);
        self.ref_writer.rollback(checkpoint.refs);
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.config.max_depth {
            return Err(Error::depth_exceed(format!(
                "Maximum graph nesting depth ({}) exceeded while writing. \
                Consider increasing max_depth if this is expected.",
                self.config.max_depth
            )));
        }
        Ok(())
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// Hands the buffered blobs to `sink` in emission order and returns their total size.
    pub fn finish(self, sink: &mut dyn BlobSink) -> Result<usize, Error> {
        let mut total = 0;
        for (name, data) in self.blobs {
            total += data.len();
            sink.add(&name, data)?;
        }
        Ok(total)
    }
}

pub struct ReadContext<'de> {
    config: &'de Config,
    registry: &'de TypeRegistry,
    codec: &'de dyn InfoCodec,
    source: &'de dyn BlobSource,
    index: HashMap<&'de str, EntryToken>,
    meta_cache: HashMap<NodePath, Rc<MetaRecord>>,
    pub ref_reader: RefReader,
    current_depth: u32,
}

impl<'de> ReadContext<'de> {
    pub fn new(
        config: &'de Config,
        registry: &'de TypeRegistry,
        codec: &'de dyn InfoCodec,
        source: &'de dyn BlobSource,
    ) -> ReadContext<'de> {
        let index = source
            .entries()
            .iter()
            .map(|e| (e.path.as_str(), e.token))
            .collect();
        ReadContext {
            config,
            registry,
            codec,
            source,
            index,
            meta_cache: HashMap::new(),
            ref_reader: RefReader::new(),
            current_depth: 0,
        }
    }

    pub fn get_config(&self) -> &'de Config {
        self.config
    }

    pub fn get_registry(&self) -> &'de TypeRegistry {
        self.registry
    }

    pub fn has_blob(&self, path: &NodePath, kind: BlobKind) -> bool {
        self.index.contains_key(path.blob(kind).as_str())
    }

    pub fn blob(&self, path: &NodePath, kind: BlobKind) -> Result<Cow<'de, [u8]>, Error> {
        let name = path.blob(kind);
        let token = *self
            .index
            .get(name.as_str())
            .ok_or_else(|| Error::missing_entry(name))?;
        let source = self.source;
        source.read(token)
    }

    pub fn blob_text(&self, path: &NodePath, kind: BlobKind) -> Result<String, Error> {
        let bytes = self.blob(path, kind)?;
        String::from_utf8(bytes.into_owned()).map_err(|e| {
            Error::invalid_data(format!(
                "blob `{}` is not utf8: {e}",
                path.blob(kind)
            ))
        })
    }

    /// Parsed metadata of the node at `path`, cached for the rest of the call.
    pub fn meta(&mut self, path: &NodePath) -> Result<Rc<MetaRecord>, Error> {
        if let Some(meta) = self.meta_cache.get(path) {
            return Ok(meta.clone());
        }
        let bytes = self.blob(path, BlobKind::Info)?;
        let meta = Rc::new(self.codec.deserialize_info(&bytes)?);
        self.meta_cache.insert(path.clone(), meta.clone());
        Ok(meta)
    }

    pub fn checkpoint(&self) -> usize {
        self.ref_reader.checkpoint()
    }

    /// Forgets every shared node materialized after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        self.ref_reader.rollback(checkpoint);
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.config.max_depth {
            return Err(Error::depth_exceed(format!(
                "Maximum graph nesting depth ({}) exceeded while reading. \
                This may indicate a corrupt pointer chain or an overly deep object graph.",
                self.config.max_depth
            )));
        }
        Ok(())
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}
