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

use crate::archive::ArchiveFormat;

/// Default nesting limit of [`Config::max_depth`].
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Configuration for graph serialization.
///
/// This struct holds the options that control how a [`GraphSerializer`](crate::GraphSerializer)
/// walks a graph. It is shared between the serializer and the
/// `WriteContext`/`ReadContext` so both directions agree.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of nested nodes entered before the walk is aborted.
    ///
    /// Every level is a few native frames of recursion. The default stays well inside a
    /// 2 MiB thread stack, the size spawned threads and test threads get. Raise it only
    /// together with the stack of the calling thread.
    pub max_depth: u32,
    /// When set, failures on members marked optional are reported instead of dropped.
    pub strict_optional: bool,
    /// Container format produced by `serialize`.
    pub archive: ArchiveFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_optional: false,
            archive: ArchiveFormat::Pack,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get maximum nesting depth.
    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Check if optional-member failures are escalated.
    #[inline(always)]
    pub fn is_strict_optional(&self) -> bool {
        self.strict_optional
    }

    #[inline(always)]
    pub fn archive(&self) -> ArchiveFormat {
        self.archive
    }
}
