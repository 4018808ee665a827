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
use byteorder::{ByteOrder, LittleEndian};

/// Growable little-endian byte sink used by the pack container.
#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut b = [0u8; 8];
        LittleEndian::write_u64(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    pub fn write_varuint32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.write_u8(((value as u8) & 0x7F) | 0x80);
            value >>= 7;
        }
        self.write_u8(value as u8);
    }

    /// Writes a length-prefixed utf8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_varuint32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }
}

/// Cursor over a borrowed byte slice, the read-side twin of [`Writer`].
pub struct Reader<'a> {
    pub(crate) bf: &'a [u8],
    pub(crate) cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    #[inline(always)]
    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.cursor.checked_add(n).map_or(true, |end| end > self.bf.len()) {
            return Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()));
        }
        Ok(())
    }

    #[inline(always)]
    fn move_next(&mut self, additional: usize) {
        self.cursor += additional;
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.check_bound(1)?;
        let result = self.bf[self.cursor];
        self.move_next(1);
        Ok(result)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.check_bound(4)?;
        let result = LittleEndian::read_u32(&self.bf[self.cursor..]);
        self.move_next(4);
        Ok(result)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.check_bound(8)?;
        let result = LittleEndian::read_u64(&self.bf[self.cursor..]);
        self.move_next(8);
        Ok(result)
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let mut result: u32 = 0;
        let mut shift = 0;
        loop {
            let b = self.read_u8()?;
            if shift == 28 && b > 0x0F {
                return Err(Error::invalid_data("varuint32 overflows 32 bits"));
            }
            result |= ((b & 0x7F) as u32) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.check_bound(len)?;
        let result = &self.bf[self.cursor..self.cursor + len];
        self.move_next(len);
        Ok(result)
    }

    pub fn read_str(&mut self) -> Result<&'a str, Error> {
        let len = self.read_varuint32()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|e| Error::invalid_data(format!("invalid utf8: {e}")))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.check_bound(len)?;
        self.move_next(len);
        Ok(())
    }
}
