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

use syn::{parse_quote, Generics};

/// Same rule the engine applies to path segments.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('/')
}

/// Adds `T: Formattable` to every type parameter of `generics`.
pub fn add_formattable_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::blobgraph_core::serializer::Formattable));
    }
    generics
}

pub fn compile_error(err: syn::Error) -> proc_macro::TokenStream {
    err.to_compile_error().into()
}
