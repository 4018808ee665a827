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

//! # Blobgraph Derive
//!
//! `#[derive(Formattable)]` generates the member descriptors the graph engine uses to
//! walk a type.
//!
//! ## Records
//!
//! On a struct with named fields the macro implements `Formattable`, `Record` and, unless
//! `#[graph(hooks)]` is given, an empty `RecordHooks`. Each field becomes a member whose
//! key is the field name:
//!
//! ```rust, ignore
//! use blobgraph::Formattable;
//!
//! #[derive(Formattable, Default)]
//! #[graph(name = "Person")]
//! struct Person {
//!     #[graph(order = 1)]
//!     name: String,
//!     #[graph(rename = "Age", order = 2)]
//!     age: u32,
//!     #[graph(optional)]
//!     nickname: Option<String>,
//!     #[graph(skip)]
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! A field marked `#[graph(base)]` embeds another record whose members are inherited
//! ahead of the struct's own; on a key conflict the base member is kept. Without
//! `#[graph(factory = "path")]` the type must implement `Default`.
//!
//! ## Enums
//!
//! Unit-only enums become primitives written as their variant name, or as the
//! `#[graph(rename = "..")]` of the variant. The first variant is the default.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derive macro implementing `Formattable` for records and unit-only enums.
///
/// # Example
///
/// ```rust, ignore
/// use blobgraph::Formattable;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// #[derive(Formattable, Default)]
/// struct Node {
///     label: String,
///     next: Option<Rc<RefCell<Node>>>,
/// }
/// ```
#[proc_macro_derive(Formattable, attributes(graph))]
pub fn proc_macro_derive_formattable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match object::derive_formattable(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => util::compile_error(err),
    }
}
