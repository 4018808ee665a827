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

//! Node paths and the blob names derived from them.
//!
//! Every node of a graph is addressed by a slash separated path. The root is the empty
//! path, and every non-root path ends with the separator, so blob names are formed by
//! plain concatenation: the root metadata lives in `Info`, the third element of the
//! `Items` member lives in `Items/2/Info`.

use std::fmt;

pub const SEPARATOR: char = '/';

/// Segment used for the key side of a dictionary entry.
pub const KEY_SEGMENT: &str = "Key";
/// Segment used for the value side of dictionary entries and multi-array cells.
pub const VALUE_SEGMENT: &str = "Value";
/// Segment holding the index tuple of a multi-array cell.
pub const INDICES_SEGMENT: &str = "Indices";

/// The kinds of blob a node can own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobKind {
    /// Metadata record (class name + attribute map).
    Info,
    /// Bulk primitive lines of a collection or multi-array.
    Data,
    /// Bulk primitive keys of a dictionary.
    Keys,
    /// Bulk primitive values of a dictionary.
    Values,
}

impl BlobKind {
    pub const fn suffix(self) -> &'static str {
        match self {
            BlobKind::Info => "Info",
            BlobKind::Data => "Data",
            BlobKind::Keys => "Keys",
            BlobKind::Values => "Values",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    pub fn root() -> NodePath {
        NodePath(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of segments between the root and this node.
    pub fn depth(&self) -> usize {
        self.0.matches(SEPARATOR).count()
    }

    /// Path of a named member, or of a positional element when given an index.
    pub fn child<S: fmt::Display>(&self, segment: S) -> NodePath {
        use fmt::Write;
        let mut s = String::with_capacity(self.0.len() + 8);
        s.push_str(&self.0);
        let _ = write!(s, "{segment}");
        debug_assert!(
            !s[self.0.len()..].contains(SEPARATOR),
            "path segment must not contain the separator"
        );
        s.push(SEPARATOR);
        NodePath(s)
    }

    pub fn element(&self, index: usize) -> NodePath {
        self.child(index)
    }

    pub fn entry_key(&self, index: usize) -> NodePath {
        self.element(index).child(KEY_SEGMENT)
    }

    pub fn entry_value(&self, index: usize) -> NodePath {
        self.element(index).child(VALUE_SEGMENT)
    }

    pub fn cell_indices(&self, index: usize) -> NodePath {
        self.element(index).child(INDICES_SEGMENT)
    }

    pub fn cell_value(&self, index: usize) -> NodePath {
        self.element(index).child(VALUE_SEGMENT)
    }

    /// Full entry name of one of this node's blobs.
    pub fn blob(&self, kind: BlobKind) -> String {
        let mut s = String::with_capacity(self.0.len() + 6);
        s.push_str(&self.0);
        s.push_str(kind.suffix());
        s
    }

    /// Rebuilds a path from the text stored in a points-to attribute.
    ///
    /// Pointer targets are produced by this crate, so anything that is not empty
    /// and does not end with the separator is corrupt.
    pub fn parse(text: &str) -> Option<NodePath> {
        if text.is_empty() || text.ends_with(SEPARATOR) {
            Some(NodePath(text.to_string()))
        } else {
            None
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// True if `segment` can be used as a member key.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(SEPARATOR)
}
