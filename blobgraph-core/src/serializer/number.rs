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
use crate::serializer::parse_failure;
use crate::types::PrimitiveKind;

pub(crate) const MIN_VALUE: &str = "MinValue";
pub(crate) const MAX_VALUE: &str = "MaxValue";
const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

macro_rules! impl_int_primitive {
    (@one $ty:ty, $kind:expr) => {
        const _: () = {
            fn to_text(v: &$ty) -> Result<String, Error> {
                Ok(v.to_string())
            }

            fn from_text(text: &str) -> Result<$ty, Error> {
                text.trim()
                    .parse::<$ty>()
                    .map_err(|e| parse_failure::<$ty>(text, e))
            }

            impl_primitive!($ty, $kind, 0, to_text, from_text);
        };
    };
    ($kind:expr, $($ty:ty),+) => {
        $(
            impl_int_primitive!(@one $ty, $kind);
        )+
    };
}

impl_int_primitive!(PrimitiveKind::Int, i8, i16, i32, i64, i128, isize);
impl_int_primitive!(PrimitiveKind::UInt, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float_primitive {
    ($ty:ident) => {
        const _: () = {
            fn to_text(v: &$ty) -> Result<String, Error> {
                Ok(float_text!($ty, *v))
            }

            fn from_text(text: &str) -> Result<$ty, Error> {
                float_parse!($ty, text)
            }

            impl_primitive!($ty, PrimitiveKind::Float, 0.0, to_text, from_text);
        };
    };
}

/// Text form of a float: range sentinels and non-finite names are spelled out, every
/// other value uses the shortest text that parses back to the same bits.
macro_rules! float_text {
    ($ty:ident, $v:expr) => {{
        let v: $ty = $v;
        if v.is_nan() {
            NAN.to_string()
        } else if v == $ty::INFINITY {
            INFINITY.to_string()
        } else if v == $ty::NEG_INFINITY {
            NEG_INFINITY.to_string()
        } else if v == $ty::MIN {
            MIN_VALUE.to_string()
        } else if v == $ty::MAX {
            MAX_VALUE.to_string()
        } else {
            format!("{:?}", v)
        }
    }};
}

macro_rules! float_parse {
    ($ty:ident, $text:expr) => {{
        let text: &str = $text;
        match text.trim() {
            MIN_VALUE => Ok($ty::MIN),
            MAX_VALUE => Ok($ty::MAX),
            NAN => Ok($ty::NAN),
            INFINITY => Ok($ty::INFINITY),
            NEG_INFINITY => Ok($ty::NEG_INFINITY),
            other => other
                .parse::<$ty>()
                .map_err(|e| parse_failure::<$ty>(text, e)),
        }
    }};
}

pub(crate) fn f64_text(v: f64) -> String {
    float_text!(f64, v)
}

pub(crate) fn f64_parse(text: &str) -> Result<f64, Error> {
    float_parse!(f64, text)
}

pub(crate) fn f32_text(v: f32) -> String {
    float_text!(f32, v)
}

pub(crate) fn f32_parse(text: &str) -> Result<f32, Error> {
    float_parse!(f32, text)
}

impl_float_primitive!(f32);
impl_float_primitive!(f64);
