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

//! Polymorphic record slots.
//!
//! A `Box<dyn AnyRecord>` member holds any registered record. It is written under the
//! class name of the concrete record and read back by looking that name up in the
//! registry, so the slot must be filled with a record that was registered.

use crate::error::Error;
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{expect_value_node, Formattable, Record};
use crate::types::{resolve_slot, Category, InterfaceKind};
use std::any::{type_name, Any};
use std::fmt;

/// Object-safe view of a record.
pub trait AnyRecord: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn record_type_name(&self) -> &'static str;

    fn write_erased(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error>;
}

impl<R: Record> AnyRecord for R {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn record_type_name(&self) -> &'static str {
        type_name::<R>()
    }

    fn write_erased(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        self.graph_write(context, path)
    }
}

/// Content of a polymorphic slot that was never assigned.
struct Unset;

impl AnyRecord for Unset {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn record_type_name(&self) -> &'static str {
        "<unset>"
    }

    fn write_erased(&self, _context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        Err(Error::invalid_data(format!(
            "polymorphic record slot at `{path}` holds no record"
        )))
    }
}

impl dyn AnyRecord {
    pub fn is<R: Record>(&self) -> bool {
        self.as_any().is::<R>()
    }

    pub fn downcast_ref<R: Record>(&self) -> Option<&R> {
        self.as_any().downcast_ref::<R>()
    }

    pub fn downcast_mut<R: Record>(&mut self) -> Option<&mut R> {
        self.as_any_mut().downcast_mut::<R>()
    }

    /// Recovers the concrete record. Fails with [`Error::TypeMismatch`] if the slot holds
    /// another type.
    pub fn downcast<R: Record>(self: Box<Self>) -> Result<Box<R>, Error> {
        let held = self.record_type_name();
        self.into_any()
            .downcast::<R>()
            .map_err(|_| Error::type_mismatch(type_name::<R>(), held))
    }
}

impl fmt::Debug for dyn AnyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyRecord({})", self.record_type_name())
    }
}

impl Formattable for Box<dyn AnyRecord> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Interface(InterfaceKind::Record)
    }

    fn graph_runtime_category(&self) -> Category {
        Category::Record
    }

    fn graph_default() -> Self {
        Box::new(Unset)
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        (**self).write_erased(context, path)
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let meta = context.meta(path)?;
        expect_value_node(&meta, path, InterfaceKind::Record.identifier())?;
        resolve_slot(Self::graph_category(), meta.class_name())?;
        let candidates = context.get_registry().by_name(meta.class_name());
        let descriptor = candidates
            .first()
            .ok_or_else(|| Error::unknown_class(meta.class_name().to_string()))?;
        let read_any = descriptor.harness().get_read_any_fn();
        read_any(context, path)
    }
}
