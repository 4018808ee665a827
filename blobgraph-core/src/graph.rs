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

use crate::archive::{new_sink, open_source, ArchiveFormat, BlobSink, BlobSource};
use crate::config::Config;
use crate::error::Error;
use crate::meta::{InfoCodec, XmlInfoCodec};
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::{TypeLoader, TypeRegistry};
use crate::serializer::{read_node, write_node, Formattable, Record};
use std::any::type_name;
use std::sync::Arc;
use tracing::{debug, warn};

/// The graph serialization engine.
///
/// `GraphSerializer` turns a value, including shared and cyclic sub-graphs, into a set of
/// named blobs addressed by path, and packs them with the configured container codec.
/// The engine is stateless between calls: concurrent `serialize` and `deserialize` calls
/// on one instance are safe, and only wait while the type registry is loading.
///
/// # Examples
///
/// ```rust
/// use blobgraph_core::GraphSerializer;
/// use std::collections::BTreeMap;
///
/// let graph = GraphSerializer::default();
/// let mut scores = BTreeMap::new();
/// scores.insert("alice".to_string(), 3i32);
/// let bytes = graph.serialize(&scores).unwrap();
/// let back: BTreeMap<String, i32> = graph.deserialize(&bytes).unwrap();
/// assert_eq!(back, scores);
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use blobgraph_core::GraphSerializer;
///
/// let graph = GraphSerializer::default()
///     .max_depth(64)
///     .strict_optional(true);
/// assert_eq!(graph.get_config().max_depth(), 64);
/// ```
pub struct GraphSerializer {
    config: Config,
    registry: Arc<TypeRegistry>,
    codec: Arc<dyn InfoCodec>,
}

impl Default for GraphSerializer {
    fn default() -> Self {
        GraphSerializer {
            config: Config::default(),
            registry: Arc::new(TypeRegistry::new()),
            codec: Arc::new(XmlInfoCodec),
        }
    }
}

impl GraphSerializer {
    /// Sets the maximum nesting depth. Deeper graphs fail with [`Error::DepthExceed`]
    /// instead of overflowing the stack, provided the calling thread has the stack for
    /// the chosen depth; see [`DEFAULT_MAX_DEPTH`](crate::config::DEFAULT_MAX_DEPTH).
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// When set, failures on optional members are reported instead of dropped.
    pub fn strict_optional(mut self, strict: bool) -> Self {
        self.config.strict_optional = strict;
        self
    }

    /// Container format produced by [`GraphSerializer::serialize`]. Reading detects the
    /// format on its own.
    pub fn archive(mut self, format: ArchiveFormat) -> Self {
        self.config.archive = format;
        self
    }

    /// Shares `registry` with other serializers built from the same handle.
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the metadata codec.
    pub fn with_codec(mut self, codec: Arc<dyn InfoCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Registers a record type under its declared class name.
    ///
    /// ```rust, ignore
    /// #[derive(Formattable, Default)]
    /// struct User { name: String, age: u32 }
    ///
    /// let graph = GraphSerializer::default();
    /// graph.register::<User>()?;
    /// ```
    pub fn register<T: Record>(&self) -> Result<(), Error> {
        self.registry.register::<T>()
    }

    /// Registers a record type under an explicit class name.
    pub fn register_as<T: Record>(&self, class_name: &str) -> Result<(), Error> {
        self.registry.register_as::<T>(class_name)
    }

    /// Registers several types as one load; every call on this registry waits until it
    /// completes.
    pub fn load<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut TypeLoader) -> Result<(), Error>,
    {
        self.registry.load(f)
    }

    /// Serializes `value` into a container of the configured format.
    pub fn serialize<T: Formattable>(&self, value: &T) -> Result<Vec<u8>, Error> {
        let mut sink = new_sink(self.config.archive());
        self.serialize_into(value, sink.as_mut())?;
        sink.close()
    }

    /// Writes the blobs of `value` into `sink`. Nothing reaches the sink unless the whole
    /// graph was written successfully.
    pub fn serialize_into<T: Formattable>(
        &self,
        value: &T,
        sink: &mut dyn BlobSink,
    ) -> Result<(), Error> {
        self.registry.wait_ready();
        let mut context = WriteContext::new(&self.config, &self.registry, self.codec.as_ref());
        write_node(value, &mut context, &NodePath::root())?;
        let blobs = context.blob_count();
        let nodes = context.ref_writer.len();
        let bytes = context.finish(sink)?;
        debug!(
            ty = type_name::<T>(),
            blobs,
            shared = nodes,
            bytes,
            "graph serialized"
        );
        Ok(())
    }

    /// Reads a value from a container produced by [`GraphSerializer::serialize`].
    pub fn deserialize<T: Formattable>(&self, bytes: &[u8]) -> Result<T, Error> {
        let source = open_source(bytes)?;
        self.deserialize_from(source.as_ref())
    }

    /// Reads the graph rooted at the empty path of `source`.
    ///
    /// A null root yields `T::graph_default()` unless `T` is itself nullable.
    pub fn deserialize_from<T: Formattable>(&self, source: &dyn BlobSource) -> Result<T, Error> {
        self.registry.wait_ready();
        let mut context =
            ReadContext::new(&self.config, &self.registry, self.codec.as_ref(), source);
        let root = NodePath::root();
        if !T::graph_is_nullable() && context.meta(&root)?.is_null() {
            return Ok(T::graph_default());
        }
        let value = read_node::<T>(&mut context, &root)?;
        debug!(
            ty = type_name::<T>(),
            entries = source.entries().len(),
            "graph deserialized"
        );
        Ok(value)
    }

    /// Sentinel form of [`GraphSerializer::serialize`]: any failure yields `None`.
    pub fn serialize_or_none<T: Formattable>(&self, value: &T) -> Option<Vec<u8>> {
        match self.serialize(value) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(ty = type_name::<T>(), error = %err, "serialization failed");
                None
            }
        }
    }

    /// Sentinel form of [`GraphSerializer::deserialize`]: any failure yields the default.
    pub fn deserialize_or_default<T: Formattable>(&self, bytes: &[u8]) -> T {
        match self.deserialize(bytes) {
            Ok(value) => value,
            Err(err) => {
                warn!(ty = type_name::<T>(), error = %err, "deserialization failed");
                T::graph_default()
            }
        }
    }
}
