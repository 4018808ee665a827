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

//! `RefCell<T>` is transparent: it writes and reads exactly like `T`.
//!
//! Inside an `Rc` it is what makes a cycle readable. The shared handle is allocated with
//! a default value, published at its path, and only then filled, so nodes reached while
//! reading the content can point back to it.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Node {
//!     next: Option<Rc<RefCell<Node>>>,
//! }
//! let a = Rc::new(RefCell::new(Node { next: None }));
//! a.borrow_mut().next = Some(a.clone());
//! ```
use crate::error::Error;
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Formattable;
use crate::types::{Category, TypeDescriptor};
use std::any::type_name;
use std::cell::RefCell;

#[cold]
fn borrowed<T: ?Sized>(path: Option<&NodePath>) -> Error {
    match path {
        Some(path) => Error::invalid_data(format!(
            "{} at `{path}` is already borrowed",
            type_name::<T>()
        )),
        None => Error::invalid_data(format!("{} is already borrowed", type_name::<T>())),
    }
}

impl<T: Formattable> Formattable for RefCell<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        T::graph_category()
    }

    fn graph_runtime_category(&self) -> Category {
        match self.try_borrow() {
            Ok(inner) => inner.graph_runtime_category(),
            Err(_) => T::graph_category(),
        }
    }

    fn graph_descriptor() -> TypeDescriptor {
        T::graph_descriptor()
    }

    fn graph_default() -> Self {
        RefCell::new(T::graph_default())
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let inner = self.try_borrow().map_err(|_| borrowed::<Self>(Some(path)))?;
        inner.graph_write(context, path)
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        T::graph_read(context, path).map(RefCell::new)
    }

    fn graph_to_text(&self) -> Result<Option<String>, Error> {
        let inner = self.try_borrow().map_err(|_| borrowed::<Self>(None))?;
        inner.graph_to_text()
    }

    fn graph_from_text(text: Option<&str>) -> Result<Self, Error> {
        T::graph_from_text(text).map(RefCell::new)
    }

    #[inline(always)]
    fn graph_is_cell() -> bool {
        true
    }

    fn graph_fill(&self, context: &mut ReadContext<'_>, path: &NodePath) -> Result<(), Error> {
        let value = T::graph_read(context, path)?;
        *self.try_borrow_mut().map_err(|_| borrowed::<Self>(Some(path)))? = value;
        Ok(())
    }
}
