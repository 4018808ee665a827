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
use crate::serializer::rc::read_shared;
use crate::serializer::Formattable;
use crate::types::{Category, TypeDescriptor};
use std::sync::Arc;

impl<T: Formattable> Formattable for Arc<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        T::graph_category()
    }

    fn graph_runtime_category(&self) -> Category {
        (**self).graph_runtime_category()
    }

    fn graph_descriptor() -> TypeDescriptor {
        T::graph_descriptor()
    }

    #[inline(always)]
    fn graph_is_shared() -> bool {
        true
    }

    fn graph_default() -> Self {
        Arc::new(T::graph_default())
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        match context.ref_writer.try_write_arc_ref(self, path) {
            Some(first) => context.write_pointer(path, &first),
            None => T::graph_write(self.as_ref(), context, path),
        }
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        read_shared::<Self, T>(context, path)
    }
}
