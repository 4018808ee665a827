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

//! Rectangular arrays of rank two or more.
//!
//! Metadata carries `{Rank, Lengths, Count, IsPrimitive}`. Primitive cells are written to
//! the `Data` blob, one line per cell holding the tab-separated indices followed by the
//! escaped value. Other cells become two child nodes: `<path><i>/Indices/` holds the
//! coordinates as an array and `<path><i>/Value/` holds the value, where `i` is the
//! row-major position of the cell.

use crate::error::Error;
use crate::meta::{bool_text, decode_line, split_fields, split_lines, LineWriter, MetaRecord};
use crate::path::{BlobKind, NodePath};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{check_inline, MAX_PREALLOCATION};
use crate::serializer::{expect_value_node, is_inline, read_node, write_node, Formattable};
use crate::types::{keys, resolve_slot, Category, TypeDescriptor, MULTI_ARRAY_CLASS};
use std::any::type_name;

/// A dense row-major array with a fixed shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MultiArray<T> {
    lengths: Vec<usize>,
    data: Vec<T>,
}

fn element_count(lengths: &[usize]) -> Result<usize, Error> {
    if lengths.len() < 2 {
        return Err(Error::invalid_data(format!(
            "multi-array rank must be at least 2, got {}",
            lengths.len()
        )));
    }
    lengths.iter().try_fold(1usize, |acc, &n| {
        acc.checked_mul(n)
            .ok_or_else(|| Error::invalid_data("multi-array shape overflows usize"))
    })
}

impl<T> MultiArray<T> {
    /// Builds an array of the given shape with every cell set to `value`.
    pub fn filled(lengths: &[usize], value: T) -> Result<Self, Error>
    where
        T: Clone,
    {
        let count = element_count(lengths)?;
        Ok(MultiArray {
            lengths: lengths.to_vec(),
            data: vec![value; count],
        })
    }

    /// Wraps row-major `data`; its length must equal the product of `lengths`.
    pub fn from_vec(lengths: &[usize], data: Vec<T>) -> Result<Self, Error> {
        let count = element_count(lengths)?;
        if data.len() != count {
            return Err(Error::invalid_data(format!(
                "multi-array of shape {lengths:?} needs {count} cells, got {}",
                data.len()
            )));
        }
        Ok(MultiArray {
            lengths: lengths.to_vec(),
            data,
        })
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.lengths.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&i, &n) in indices.iter().zip(&self.lengths) {
            if i >= n {
                return None;
            }
            offset = offset * n + i;
        }
        Some(offset)
    }

    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.offset(indices).map(|o| &self.data[o])
    }

    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut T> {
        self.offset(indices).map(move |o| &mut self.data[o])
    }

    /// Replaces one cell, returning the previous value.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<T, Error> {
        match self.get_mut(indices) {
            Some(cell) => Ok(std::mem::replace(cell, value)),
            None => Err(Error::invalid_data(format!(
                "indices {indices:?} out of bounds for shape {:?}",
                self.lengths
            ))),
        }
    }

    /// Every coordinate of the array in lexicographic (row-major) order.
    pub fn indices(&self) -> Indices<'_> {
        Indices {
            lengths: &self.lengths,
            next: if self.data.is_empty() {
                None
            } else {
                Some(vec![0; self.lengths.len()])
            },
        }
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

pub struct Indices<'a> {
    lengths: &'a [usize],
    next: Option<Vec<usize>>,
}

impl Iterator for Indices<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for axis in (0..following.len()).rev() {
            following[axis] += 1;
            if following[axis] < self.lengths[axis] {
                self.next = Some(following);
                break;
            }
            following[axis] = 0;
        }
        Some(current)
    }
}

fn lengths_text(lengths: &[usize]) -> String {
    lengths
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_lengths(text: &str, rank: usize) -> Result<Vec<usize>, Error> {
    let lengths = text
        .split(',')
        .map(|n| {
            n.trim()
                .parse::<usize>()
                .map_err(|e| Error::parse_error(format!("bad multi-array length `{n}`: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if lengths.len() != rank {
        return Err(Error::invalid_data(format!(
            "multi-array declares rank {rank} but lists {} lengths",
            lengths.len()
        )));
    }
    Ok(lengths)
}

/// Orders decoded cells and checks that each position appears exactly once.
fn assemble<T>(
    lengths: Vec<usize>,
    count: usize,
    mut cells: Vec<(usize, T)>,
    path: &NodePath,
) -> Result<MultiArray<T>, Error> {
    cells.sort_by_key(|(offset, _)| *offset);
    for (expected, (offset, _)) in cells.iter().enumerate() {
        if *offset != expected {
            return Err(Error::invalid_data(format!(
                "multi-array at `{path}` has a missing or repeated cell at position {expected}"
            )));
        }
    }
    if cells.len() != count {
        return Err(Error::invalid_data(format!(
            "multi-array at `{path}` has {} cells, expected {count}",
            cells.len()
        )));
    }
    Ok(MultiArray {
        lengths,
        data: cells.into_iter().map(|(_, v)| v).collect(),
    })
}

impl<T: Formattable> Formattable for MultiArray<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::MultiArray
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Category::MultiArray,
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        MultiArray {
            lengths: vec![0, 0],
            data: Vec::new(),
        }
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let inline = is_inline::<T>();
        let mut meta = MetaRecord::new(MULTI_ARRAY_CLASS);
        meta.insert_display(keys::RANK, self.rank());
        meta.insert(keys::LENGTHS, Some(lengths_text(&self.lengths)));
        meta.insert_display(keys::COUNT, self.len());
        meta.insert(keys::IS_PRIMITIVE, Some(bool_text(inline).to_string()));
        context.write_meta(path, &meta)?;

        if inline {
            if self.is_empty() {
                return Ok(());
            }
            let mut lines = LineWriter::new();
            for (indices, value) in self.indices().zip(self.iter()) {
                let text = value.graph_to_text()?;
                lines.push_fields(&indices, text.as_deref());
            }
            context.add_blob(path.blob(BlobKind::Data), lines.into_bytes());
        } else {
            for (i, (indices, value)) in self.indices().zip(self.iter()).enumerate() {
                let indices = indices.into_boxed_slice();
                write_node(&indices, context, &path.cell_indices(i))?;
                write_node(value, context, &path.cell_value(i))?;
            }
        }
        Ok(())
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let meta = context.meta(path)?;
        expect_value_node(&meta, path, MULTI_ARRAY_CLASS)?;
        resolve_slot(Category::MultiArray, meta.class_name())?;
        let rank = meta.require_usize(keys::RANK)?;
        let lengths = parse_lengths(meta.require(keys::LENGTHS)?, rank)?;
        let count = element_count(&lengths)?;
        let inline = meta.require_bool(keys::IS_PRIMITIVE)?;
        check_inline::<T>(inline, path)?;
        if count == 0 {
            return Ok(MultiArray {
                lengths,
                data: Vec::new(),
            });
        }

        let shape = MultiArray::<()> {
            lengths: lengths.clone(),
            data: Vec::new(),
        };
        let locate = |indices: &[usize]| {
            shape.offset(indices).ok_or_else(|| {
                Error::invalid_data(format!(
                    "cell {indices:?} at `{path}` is outside shape {lengths:?}"
                ))
            })
        };

        let mut cells = Vec::with_capacity(count.min(MAX_PREALLOCATION));
        if inline {
            let blob = context.blob_text(path, BlobKind::Data)?;
            for line in split_lines(&blob, count).map_err(|e| e.at_path(path.as_str()))? {
                let (indices, raw) = split_fields(line, rank)?;
                let text = decode_line(raw)?;
                let value = T::graph_from_text(text.as_deref())
                    .map_err(|e| e.at_path(path.as_str()))?;
                cells.push((locate(&indices)?, value));
            }
        } else {
            for i in 0..count {
                let indices = read_node::<Box<[usize]>>(context, &path.cell_indices(i))?;
                let value = read_node::<T>(context, &path.cell_value(i))?;
                cells.push((locate(&indices)?, value));
            }
        }
        assemble(lengths, count, cells, path)
    }
}
