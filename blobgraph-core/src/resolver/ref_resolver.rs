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

use crate::error::Error;
use crate::path::NodePath;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

/// Reference writer for tracking shared nodes during serialization.
///
/// RefWriter maps the address of every `Rc`/`Arc` allocation to the path where it was
/// first written. A second encounter yields that path so the caller can emit a pointer
/// record instead of serializing the node again. Value types never pass through here.
///
/// # Examples
///
/// ```rust
/// use blobgraph_core::path::NodePath;
/// use blobgraph_core::resolver::ref_resolver::RefWriter;
/// use std::rc::Rc;
///
/// let mut ref_writer = RefWriter::new();
/// let rc = Rc::new(42);
/// let first = NodePath::root().child("A");
///
/// // First encounter - the node is recorded and must be serialized
/// assert!(ref_writer.try_write_rc_ref(&rc, &first).is_none());
///
/// // Second encounter - the first path is returned
/// let again = ref_writer.try_write_rc_ref(&rc.clone(), &NodePath::root().child("B"));
/// assert_eq!(again, Some(first));
/// ```
#[derive(Default)]
pub struct RefWriter {
    /// Maps pointer addresses to first-seen paths
    refs: HashMap<usize, NodePath>,
    /// Insertion order, used to roll back abandoned subtrees
    log: Vec<usize>,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_write_addr(&mut self, addr: usize, path: &NodePath) -> Option<NodePath> {
        if let Some(first) = self.refs.get(&addr) {
            return Some(first.clone());
        }
        self.refs.insert(addr, path.clone());
        self.log.push(addr);
        None
    }

    /// Returns the first path of `rc` if it was seen before, otherwise records `path`.
    pub fn try_write_rc_ref<T: ?Sized>(&mut self, rc: &Rc<T>, path: &NodePath) -> Option<NodePath> {
        self.try_write_addr(Rc::as_ptr(rc) as *const () as usize, path)
    }

    /// Same as [`RefWriter::try_write_rc_ref`] for `Arc`.
    pub fn try_write_arc_ref<T: ?Sized>(
        &mut self,
        arc: &Arc<T>,
        path: &NodePath,
    ) -> Option<NodePath> {
        self.try_write_addr(Arc::as_ptr(arc) as *const () as usize, path)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn checkpoint(&self) -> usize {
        self.log.len()
    }

    /// Forgets every node recorded after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        for addr in self.log.drain(checkpoint..) {
            self.refs.remove(&addr);
        }
    }
}

/// Reference reader for resolving shared nodes during deserialization.
///
/// RefReader maps a node path to the `Rc`/`Arc` materialized there. Shared nodes are
/// stored as soon as they are allocated, before their content is read, so a cycle that
/// leads back to a node under construction finds it here.
///
/// # Examples
///
/// ```rust
/// use blobgraph_core::path::NodePath;
/// use blobgraph_core::resolver::ref_resolver::RefReader;
/// use std::rc::Rc;
///
/// let mut ref_reader = RefReader::new();
/// let path = NodePath::root();
/// let rc = Rc::new(42);
/// ref_reader.store(&path, rc.clone());
///
/// let retrieved = ref_reader.get::<Rc<i32>>(&path).unwrap().unwrap();
/// assert!(Rc::ptr_eq(&rc, &retrieved));
/// ```
#[derive(Default)]
pub struct RefReader {
    refs: HashMap<NodePath, Box<dyn Any>>,
    log: Vec<NodePath>,
    /// Shared nodes whose content is being read and that have no handle yet
    pending: HashSet<NodePath>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a shared handle for `path`, replacing any previous one.
    pub fn store<T: 'static>(&mut self, path: &NodePath, handle: T) {
        if self.refs.insert(path.clone(), Box::new(handle)).is_none() {
            self.log.push(path.clone());
        }
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.refs.contains_key(path)
    }

    /// Returns a clone of the handle materialized at `path`.
    ///
    /// A node of another type at that path means the pointer record is corrupt.
    pub fn get<T: Clone + 'static>(&self, path: &NodePath) -> Result<Option<T>, Error> {
        match self.refs.get(path) {
            None => Ok(None),
            Some(any) => any.downcast_ref::<T>().cloned().map(Some).ok_or_else(|| {
                Error::invalid_ref(format!(
                    "node at `{path}` is not a {}",
                    std::any::type_name::<T>()
                ))
            }),
        }
    }

    /// Marks `path` as under construction. Returns false if it already was.
    pub fn begin(&mut self, path: &NodePath) -> bool {
        self.pending.insert(path.clone())
    }

    pub fn end(&mut self, path: &NodePath) {
        self.pending.remove(path);
    }

    pub fn is_pending(&self, path: &NodePath) -> bool {
        self.pending.contains(path)
    }

    pub fn checkpoint(&self) -> usize {
        self.log.len()
    }

    /// Forgets every node stored after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        for path in self.log.drain(checkpoint..) {
            self.refs.remove(&path);
        }
    }
}
