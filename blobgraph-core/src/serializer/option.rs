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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Formattable;
use crate::types::{Category, TypeDescriptor};

/// `None` is the null node. `Some` is written exactly like the inner value, at the same path.
impl<T: Formattable> Formattable for Option<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        T::graph_category()
    }

    fn graph_runtime_category(&self) -> Category {
        match self {
            Some(v) => v.graph_runtime_category(),
            None => T::graph_category(),
        }
    }

    fn graph_descriptor() -> TypeDescriptor {
        T::graph_descriptor()
    }

    #[inline(always)]
    fn graph_is_shared() -> bool {
        T::graph_is_shared()
    }

    #[inline(always)]
    fn graph_is_nullable() -> bool {
        true
    }

    fn graph_default() -> Self {
        None
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        match self {
            Some(v) => v.graph_write(context, path),
            None => context.write_null(path),
        }
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let meta = context.meta(path)?;
        if meta.is_null() {
            return Ok(None);
        }
        T::graph_read(context, path).map(Some)
    }

    fn graph_to_text(&self) -> Result<Option<String>, Error> {
        match self {
            Some(v) => v.graph_to_text(),
            None => Ok(None),
        }
    }

    fn graph_from_text(text: Option<&str>) -> Result<Self, Error> {
        match text {
            Some(_) => T::graph_from_text(text).map(Some),
            None => Ok(None),
        }
    }
}
