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

//! Line-oriented text escaping for bulk primitive blobs.
//!
//! Bulk blobs hold one value per line, and multi-array blobs separate index columns with
//! tabs, so every value is escaped character by character before it is joined:
//! backslash, CR, LF and TAB become `\\`, `\r`, `\n` and `\t`. A null value is written as
//! [`NULL_TOKEN`], which no escaped text can produce.

use std::borrow::Cow;

use crate::error::Error;

pub const NULL_TOKEN: &str = "\\N";
pub const LINE_SEPARATOR: char = '\n';
pub const FIELD_SEPARATOR: char = '\t';

pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.contains(['\\', '\r', '\n', '\t']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

pub fn unescape_text(s: &str) -> Result<Cow<'_, str>, Error> {
    if !s.contains('\\') {
        return Ok(Cow::Borrowed(s));
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                return Err(Error::invalid_data(format!(
                    "unknown escape sequence `\\{other}`"
                )))
            }
            None => return Err(Error::invalid_data("dangling escape at end of line")),
        }
    }
    Ok(Cow::Owned(out))
}

/// Encodes one possibly-null value as a blob line.
pub fn encode_line(value: Option<&str>) -> Cow<'_, str> {
    match value {
        Some(s) => escape_text(s),
        None => Cow::Borrowed(NULL_TOKEN),
    }
}

pub fn decode_line(line: &str) -> Result<Option<Cow<'_, str>>, Error> {
    if line == NULL_TOKEN {
        return Ok(None);
    }
    unescape_text(line).map(Some)
}

/// Accumulates escaped lines into one blob.
#[derive(Default)]
pub struct LineWriter {
    buf: String,
    lines: usize,
}

impl LineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_line(&mut self) {
        if self.lines > 0 {
            self.buf.push(LINE_SEPARATOR);
        }
        self.lines += 1;
    }

    pub fn push(&mut self, value: Option<&str>) {
        self.start_line();
        self.buf.push_str(&encode_line(value));
    }

    /// Pushes a line made of raw index fields followed by one escaped value.
    pub fn push_fields(&mut self, fields: &[usize], value: Option<&str>) {
        use std::fmt::Write;
        self.start_line();
        for f in fields {
            let _ = write!(self.buf, "{f}{FIELD_SEPARATOR}");
        }
        self.buf.push_str(&encode_line(value));
    }

    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }
}

/// Splits a blob into exactly `expected` lines.
pub fn split_lines(blob: &str, expected: usize) -> Result<Vec<&str>, Error> {
    let lines: Vec<&str> = blob.split(LINE_SEPARATOR).collect();
    if lines.len() != expected {
        return Err(Error::invalid_data(format!(
            "expected {expected} lines in bulk blob, found {}",
            lines.len()
        )));
    }
    Ok(lines)
}

/// Splits a multi-array line into `rank` indices and the raw value field.
pub fn split_fields(line: &str, rank: usize) -> Result<(Vec<usize>, &str), Error> {
    let mut parts = line.splitn(rank + 1, FIELD_SEPARATOR);
    let mut indices = Vec::with_capacity(rank);
    for _ in 0..rank {
        let field = parts
            .next()
            .ok_or_else(|| Error::invalid_data("multi-array line has too few fields"))?;
        let index = field
            .parse::<usize>()
            .map_err(|e| Error::parse_error(format!("bad multi-array index `{field}`: {e}")))?;
        indices.push(index);
    }
    let value = parts
        .next()
        .ok_or_else(|| Error::invalid_data("multi-array line has no value field"))?;
    Ok((indices, value))
}
