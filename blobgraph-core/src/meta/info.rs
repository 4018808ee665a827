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

//! Per-node metadata records and the XML codec that stores them.

use crate::error::Error;
use crate::types::{keys, NULL_CLASS, REFERENCE_CLASS};

/// Class name plus an ordered attribute map. An attribute that is absent differs from one
/// that is present with a null value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaRecord {
    class_name: String,
    values: Vec<(String, Option<String>)>,
}

impl MetaRecord {
    pub fn new<S: Into<String>>(class_name: S) -> Self {
        MetaRecord {
            class_name: class_name.into(),
            values: Vec::new(),
        }
    }

    pub fn null() -> Self {
        Self::new(NULL_CLASS)
    }

    pub fn pointer(target: &str) -> Self {
        let mut record = Self::new(REFERENCE_CLASS);
        record.insert(keys::POINTS_TO, Some(target.to_string()));
        record
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_null(&self) -> bool {
        self.class_name == NULL_CLASS
    }

    /// Target of a pointer record. Other classes never point, whatever their members.
    pub fn points_to(&self) -> Option<&str> {
        if self.class_name != REFERENCE_CLASS {
            return None;
        }
        self.get(keys::POINTS_TO).flatten()
    }

    /// Inserts or replaces an attribute, keeping first-insertion order.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Option<String>) {
        let key = key.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
    }

    pub fn insert_display<K: Into<String>, V: std::fmt::Display>(&mut self, key: K, value: V) {
        self.insert(key, Some(value.to_string()));
    }

    /// `None` when the attribute is absent, `Some(None)` when it is present but null.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-null attribute the engine itself wrote.
    pub fn require(&self, key: &str) -> Result<&str, Error> {
        match self.get(key) {
            Some(Some(v)) => Ok(v),
            Some(None) => Err(Error::invalid_data(format!(
                "attribute `{key}` of `{}` is null",
                self.class_name
            ))),
            None => Err(Error::invalid_data(format!(
                "attribute `{key}` missing from `{}`",
                self.class_name
            ))),
        }
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, Error> {
        match self.require(key)? {
            "True" => Ok(true),
            "False" => Ok(false),
            other => Err(Error::parse_error(format!(
                "attribute `{key}` is not a boolean: `{other}`"
            ))),
        }
    }

    pub fn require_usize(&self, key: &str) -> Result<usize, Error> {
        let text = self.require(key)?;
        text.parse::<usize>()
            .map_err(|e| Error::parse_error(format!("attribute `{key}` = `{text}`: {e}")))
    }
}

pub fn bool_text(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

/// Encodes metadata records into blobs and back.
pub trait InfoCodec: Send + Sync {
    fn serialize_info(&self, record: &MetaRecord) -> Vec<u8>;
    fn deserialize_info(&self, bytes: &[u8]) -> Result<MetaRecord, Error>;
}

/// Minimal XML dialect:
/// `<Info class="Node"><V k="Name">Ada</V><V k="Next" null="true"/></Info>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlInfoCodec;

impl InfoCodec for XmlInfoCodec {
    fn serialize_info(&self, record: &MetaRecord) -> Vec<u8> {
        let mut out = String::with_capacity(32 + record.values.len() * 24);
        out.push_str("<Info class=\"");
        escape_xml(&record.class_name, &mut out);
        out.push_str("\">");
        for (k, v) in &record.values {
            out.push_str("<V k=\"");
            escape_xml(k, &mut out);
            out.push('"');
            match v {
                Some(v) => {
                    out.push('>');
                    escape_xml(v, &mut out);
                    out.push_str("</V>");
                }
                None => out.push_str(" null=\"true\"/>"),
            }
        }
        out.push_str("</Info>");
        out.into_bytes()
    }

    fn deserialize_info(&self, bytes: &[u8]) -> Result<MetaRecord, Error> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::invalid_data(format!("metadata is not utf8: {e}")))?;
        XmlCursor { src: text, pos: 0 }.parse_info()
    }
}

fn escape_xml(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
}

fn unescape_xml(s: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let semi = tail
            .find(';')
            .ok_or_else(|| Error::invalid_data("unterminated xml entity"))?;
        let entity = &tail[..semi];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                let c = code.and_then(char::from_u32).ok_or_else(|| {
                    Error::invalid_data(format!("unknown xml entity `&{entity};`"))
                })?;
                out.push(c);
            }
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

struct XmlCursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> XmlCursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), Error> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(Error::invalid_data(format!(
                "malformed metadata: expected `{token}` at offset {}",
                self.pos
            )))
        }
    }

    /// Reads `name="value"` and returns the unescaped value.
    fn attribute(&mut self, name: &str) -> Result<String, Error> {
        self.skip_ws();
        self.expect(name)?;
        self.expect("=\"")?;
        let rest = self.rest();
        let end = rest
            .find('"')
            .ok_or_else(|| Error::invalid_data("unterminated xml attribute"))?;
        self.pos += end + 1;
        unescape_xml(&rest[..end])
    }

    fn parse_info(&mut self) -> Result<MetaRecord, Error> {
        self.skip_ws();
        if self.eat("<?xml") {
            let end = self
                .rest()
                .find("?>")
                .ok_or_else(|| Error::invalid_data("unterminated xml declaration"))?;
            self.pos += end + 2;
        }
        self.skip_ws();
        self.expect("<Info")?;
        let class_name = self.attribute("class")?;
        self.skip_ws();
        let mut record = MetaRecord::new(class_name);
        if self.eat("/>") {
            return Ok(record);
        }
        self.expect(">")?;
        loop {
            self.skip_ws();
            if self.eat("</Info>") {
                break;
            }
            self.expect("<V")?;
            let key = self.attribute("k")?;
            self.skip_ws();
            if self.rest().starts_with("null") {
                let flag = self.attribute("null")?;
                if flag != "true" {
                    return Err(Error::invalid_data(format!(
                        "unexpected null flag `{flag}` on `{key}`"
                    )));
                }
                self.skip_ws();
                self.expect("/>")?;
                record.insert(key, None);
            } else if self.eat("/>") {
                record.insert(key, Some(String::new()));
            } else {
                self.expect(">")?;
                let rest = self.rest();
                let end = rest
                    .find('<')
                    .ok_or_else(|| Error::invalid_data("unterminated metadata value"))?;
                let value = unescape_xml(&rest[..end])?;
                self.pos += end;
                self.expect("</V>")?;
                record.insert(key, Some(value));
            }
        }
        self.skip_ws();
        if !self.rest().is_empty() {
            return Err(Error::invalid_data("trailing content after metadata"));
        }
        Ok(record)
    }
}
