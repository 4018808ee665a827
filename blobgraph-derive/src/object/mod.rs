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

mod derive_enum;
mod field_meta;
mod serializer;

use proc_macro2::TokenStream;
use syn::{Data, DeriveInput};

pub fn derive_formattable(ast: &DeriveInput) -> syn::Result<TokenStream> {
    match &ast.data {
        Data::Struct(data) => serializer::derive_record(ast, data),
        Data::Enum(data) => derive_enum::derive_enum(ast, data),
        Data::Union(_) => Err(syn::Error::new(
            ast.ident.span(),
            "Formattable cannot be derived for unions",
        )),
    }
}
