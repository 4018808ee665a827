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
use crate::serializer::number::{f32_parse, f32_text, f64_parse, f64_text, MAX_VALUE, MIN_VALUE};
use crate::serializer::parse_failure;
use crate::types::PrimitiveKind;
use num_complex::Complex;
use rust_decimal::Decimal;
use std::str::FromStr;

fn decimal_to_text(v: &Decimal) -> Result<String, Error> {
    Ok(if *v == Decimal::MIN {
        MIN_VALUE.to_string()
    } else if *v == Decimal::MAX {
        MAX_VALUE.to_string()
    } else {
        v.to_string()
    })
}

fn decimal_from_text(text: &str) -> Result<Decimal, Error> {
    match text.trim() {
        MIN_VALUE => Ok(Decimal::MIN),
        MAX_VALUE => Ok(Decimal::MAX),
        other => Decimal::from_str(other).map_err(|e| parse_failure::<Decimal>(text, e)),
    }
}

impl_primitive!(
    Decimal,
    PrimitiveKind::Decimal,
    Decimal::ZERO,
    decimal_to_text,
    decimal_from_text
);

const PART_SEPARATOR: char = ';';

fn split_parts<T>(text: &str) -> Result<(&str, &str), Error> {
    text.split_once(PART_SEPARATOR)
        .ok_or_else(|| parse_failure::<T>(text, "expected `re;im`"))
}

fn complex64_to_text(v: &Complex<f64>) -> Result<String, Error> {
    Ok(format!("{}{PART_SEPARATOR}{}", f64_text(v.re), f64_text(v.im)))
}

fn complex64_from_text(text: &str) -> Result<Complex<f64>, Error> {
    let (re, im) = split_parts::<Complex<f64>>(text)?;
    Ok(Complex::new(f64_parse(re)?, f64_parse(im)?))
}

impl_primitive!(
    Complex<f64>,
    PrimitiveKind::Complex,
    Complex::new(0.0, 0.0),
    complex64_to_text,
    complex64_from_text
);

fn complex32_to_text(v: &Complex<f32>) -> Result<String, Error> {
    Ok(format!("{}{PART_SEPARATOR}{}", f32_text(v.re), f32_text(v.im)))
}

fn complex32_from_text(text: &str) -> Result<Complex<f32>, Error> {
    let (re, im) = split_parts::<Complex<f32>>(text)?;
    Ok(Complex::new(f32_parse(re)?, f32_parse(im)?))
}

impl_primitive!(
    Complex<f32>,
    PrimitiveKind::Complex,
    Complex::new(0.0, 0.0),
    complex32_to_text,
    complex32_from_text
);
