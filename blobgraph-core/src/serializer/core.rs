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
use crate::meta::{FormattableValue, MetaRecord};
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::types::{keys, Category, TypeDescriptor};
use std::any::type_name;
use tracing::trace;

/// Per-type entry point of the graph engine.
///
/// Every value that can appear in a graph implements this trait. The category is static:
/// an empty `Vec` and a full one classify the same way. Implementations for primitives,
/// std containers, shared handles and interior-mutable cells ship with this crate;
/// records and unit enums get theirs from `#[derive(Formattable)]`.
pub trait Formattable: 'static {
    /// Structural category of the declared type.
    fn graph_category() -> Category;

    /// Concrete category of this value. Interface slots report the kind they hold.
    fn graph_runtime_category(&self) -> Category
    where
        Self: Sized,
    {
        Self::graph_category()
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::leaf(type_name::<Self>(), Self::graph_category())
    }

    /// Shared handles are tracked by identity and always get a node of their own.
    fn graph_is_shared() -> bool {
        false
    }

    /// True for `Option`, whose `None` is written as a null node.
    fn graph_is_nullable() -> bool {
        false
    }

    /// Value used for a null root, for placeholders, and for dropped optional members.
    fn graph_default() -> Self
    where
        Self: Sized;

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error>;

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error>
    where
        Self: Sized;

    /// Text form used in bulk blobs and attribute maps. Only primitives have one.
    fn graph_to_text(&self) -> Result<Option<String>, Error> {
        Err(Error::unsupported(format!(
            "{} has no text form",
            type_name::<Self>()
        )))
    }

    fn graph_from_text(_text: Option<&str>) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Err(Error::unsupported(format!(
            "{} has no text form",
            type_name::<Self>()
        )))
    }

    /// Interior-mutable wrappers can be allocated first and filled later, which lets a
    /// shared node be published before its content is read.
    fn graph_is_cell() -> bool {
        false
    }

    fn graph_fill(&self, _context: &mut ReadContext<'_>, _path: &NodePath) -> Result<(), Error> {
        Err(Error::unsupported(format!(
            "{} cannot be filled in place",
            type_name::<Self>()
        )))
    }
}

/// Lifecycle hooks of a record. All default to no-ops.
pub trait RecordHooks: Sized {
    fn on_serializing(&self) {}

    fn on_serialized(&self) {}

    fn on_deserializing(&mut self) {}

    fn on_deserialized(&mut self) {}

    /// Invoked once after a record is read. The returned value replaces the record
    /// wherever it is referenced, including at its own path.
    fn substitute(self) -> Self {
        self
    }
}

/// A user type with named members, implemented by `#[derive(Formattable)]`.
pub trait Record: Formattable + RecordHooks {
    /// Identifies the type definition shared by all instantiations of a generic record.
    fn graph_definition() -> &'static str;

    /// Class identifier used when the type is registered without an explicit name.
    fn graph_class_name() -> &'static str;

    /// Member descriptors in declaration order, base members first.
    fn graph_values() -> Vec<FormattableValue<Self>>;

    /// Construction strategy: the designated factory, or `Default`.
    fn graph_factory() -> Self;
}

/// Whether values of `T` are stored as text in their parent instead of as child nodes.
#[inline(always)]
pub fn is_inline<T: Formattable>() -> bool {
    T::graph_category().is_primitive() && !T::graph_is_shared()
}

/// Writes `value` as the node at `path`, guarding the nesting depth.
pub fn write_node<T: Formattable>(
    value: &T,
    context: &mut WriteContext<'_>,
    path: &NodePath,
) -> Result<(), Error> {
    context.inc_depth()?;
    trace!(path = %path, ty = type_name::<T>(), "write node");
    let result = value.graph_write(context, path);
    context.dec_depth();
    result
}

/// Reads the node at `path` as a `T`, guarding the nesting depth.
pub fn read_node<T: Formattable>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
) -> Result<T, Error> {
    context.inc_depth()?;
    trace!(path = %path, ty = type_name::<T>(), "read node");
    let result = T::graph_read(context, path);
    context.dec_depth();
    result
}

/// Class identifier of the concrete kind held by `value`.
///
/// Interface slots report the kind they hold through
/// [`Formattable::graph_runtime_category`]; the identifier written is that of the
/// concrete kind, never the interface's own.
pub fn runtime_class<T: Formattable>(value: &T) -> Result<&'static str, Error> {
    let runtime = value.graph_runtime_category();
    if let Category::Interface(interface) = T::graph_category() {
        if !interface.accepts(runtime) {
            return Err(Error::type_mismatch(
                interface.identifier(),
                runtime.describe(),
            ));
        }
    }
    match runtime {
        Category::Record | Category::Interface(_) => Err(Error::unsupported(format!(
            "{} has no engine class identifier",
            type_name::<T>()
        ))),
        other => Ok(other.describe()),
    }
}

/// Rejects null and pointer records where a value of `declared` must be stored.
pub fn expect_value_node(
    meta: &MetaRecord,
    path: &NodePath,
    declared: &str,
) -> Result<(), Error> {
    if meta.is_null() {
        return Err(Error::invalid_data(format!(
            "null stored at `{path}` for non-nullable {declared}"
        )));
    }
    if let Some(target) = meta.points_to() {
        return Err(Error::invalid_ref(format!(
            "pointer at `{path}` to `{target}` cannot fill value type {declared}"
        )));
    }
    Ok(())
}

/// Writes a primitive as a node of its own.
pub fn write_primitive<T: Formattable>(
    value: &T,
    context: &mut WriteContext<'_>,
    path: &NodePath,
) -> Result<(), Error> {
    let mut meta = MetaRecord::new(T::graph_category().describe());
    meta.insert(keys::VALUE, value.graph_to_text()?);
    context.write_meta(path, &meta)
}

pub fn read_primitive<T: Formattable>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
) -> Result<T, Error> {
    let meta = context.meta(path)?;
    let expected = T::graph_category().describe();
    expect_value_node(&meta, path, expected)?;
    if meta.class_name() != expected {
        return Err(Error::type_mismatch(expected, meta.class_name().to_string()));
    }
    match meta.get(keys::VALUE) {
        Some(text) => T::graph_from_text(text).map_err(|e| e.at_path(path.as_str())),
        None => Err(Error::invalid_data(format!(
            "primitive node at `{path}` has no value"
        ))),
    }
}
