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

//! `Mutex<T>` and `RwLock<T>` are transparent like `RefCell<T>`, for graphs shared
//! through `Arc`.
//!
//! Writing holds the lock for the duration of the subtree. A node reached again through
//! its `Arc` becomes a pointer record and is not locked twice. Serialize in a quiescent
//! state: a lock held by another thread blocks the call.

use crate::error::Error;
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Formattable;
use crate::types::{Category, TypeDescriptor};
use std::any::type_name;
use std::sync::{Mutex, RwLock};

#[cold]
fn poisoned<T: ?Sized>() -> Error {
    Error::invalid_data(format!("{} is poisoned", type_name::<T>()))
}

impl<T: Formattable> Formattable for Mutex<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        T::graph_category()
    }

    fn graph_descriptor() -> TypeDescriptor {
        T::graph_descriptor()
    }

    fn graph_default() -> Self {
        Mutex::new(T::graph_default())
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let guard = self.lock().map_err(|_| poisoned::<Self>())?;
        guard.graph_write(context, path)
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        T::graph_read(context, path).map(Mutex::new)
    }

    fn graph_to_text(&self) -> Result<Option<String>, Error> {
        self.lock().map_err(|_| poisoned::<Self>())?.graph_to_text()
    }

    fn graph_from_text(text: Option<&str>) -> Result<Self, Error> {
        T::graph_from_text(text).map(Mutex::new)
    }

    #[inline(always)]
    fn graph_is_cell() -> bool {
        true
    }

    fn graph_fill(&self, context: &mut ReadContext<'_>, path: &NodePath) -> Result<(), Error> {
        let value = T::graph_read(context, path)?;
        *self.lock().map_err(|_| poisoned::<Self>())? = value;
        Ok(())
    }
}

impl<T: Formattable> Formattable for RwLock<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        T::graph_category()
    }

    fn graph_descriptor() -> TypeDescriptor {
        T::graph_descriptor()
    }

    fn graph_default() -> Self {
        RwLock::new(T::graph_default())
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let guard = self.read().map_err(|_| poisoned::<Self>())?;
        guard.graph_write(context, path)
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        T::graph_read(context, path).map(RwLock::new)
    }

    fn graph_to_text(&self) -> Result<Option<String>, Error> {
        self.read().map_err(|_| poisoned::<Self>())?.graph_to_text()
    }

    fn graph_from_text(text: Option<&str>) -> Result<Self, Error> {
        T::graph_from_text(text).map(RwLock::new)
    }

    #[inline(always)]
    fn graph_is_cell() -> bool {
        true
    }

    fn graph_fill(&self, context: &mut ReadContext<'_>, path: &NodePath) -> Result<(), Error> {
        let value = T::graph_read(context, path)?;
        *self.write().map_err(|_| poisoned::<Self>())? = value;
        Ok(())
    }
}
