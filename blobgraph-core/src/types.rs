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

//! Structural categories and the type classifier.
//!
//! Rust types state their category statically through
//! [`Formattable::graph_category`](crate::Formattable::graph_category); this module owns
//! the closed set of categories, the class identifiers written to metadata, and the
//! functions that map a recorded identifier back onto a declared slot.

use crate::error::Error;

/// Class name of a null node.
pub const NULL_CLASS: &str = "Null";
/// Class name of a pointer record.
pub const REFERENCE_CLASS: &str = "Reference";
/// Class name of a one-dimensional array.
pub const ARRAY_CLASS: &str = "Array";
/// Class name of a multi-dimensional array.
pub const MULTI_ARRAY_CLASS: &str = "MultiArray";

/// Metadata keys written by the engine.
pub mod keys {
    pub const POINTS_TO: &str = "PointsTo";
    pub const IS_PRIMITIVE: &str = "IsPrimitive";
    pub const IS_PRIMITIVE_KEY: &str = "IsPrimitiveKey";
    pub const IS_PRIMITIVE_VALUE: &str = "IsPrimitiveValue";
    pub const COUNT: &str = "Count";
    pub const RANK: &str = "Rank";
    pub const LENGTHS: &str = "Lengths";
    pub const VALUE: &str = "Value";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int,
    UInt,
    Float,
    Decimal,
    Complex,
    Char,
    String,
    DateTime,
    Date,
    Span,
    Enum,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 12] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Int,
        PrimitiveKind::UInt,
        PrimitiveKind::Float,
        PrimitiveKind::Decimal,
        PrimitiveKind::Complex,
        PrimitiveKind::Char,
        PrimitiveKind::String,
        PrimitiveKind::DateTime,
        PrimitiveKind::Date,
        PrimitiveKind::Span,
        PrimitiveKind::Enum,
    ];

    pub const fn identifier(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "Boolean",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::UInt => "Unsigned",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::Complex => "Complex",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::String => "String",
            PrimitiveKind::DateTime => "DateTime",
            PrimitiveKind::Date => "Date",
            PrimitiveKind::Span => "Span",
            PrimitiveKind::Enum => "Enum",
        }
    }

    pub fn from_identifier(id: &str) -> Option<PrimitiveKind> {
        Self::ALL.into_iter().find(|k| k.identifier() == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// `Vec<T>`
    List,
    /// `LinkedList<T>`
    LinkedList,
    /// `HashSet<T>`
    HashSet,
    /// `BTreeSet<T>`
    SortedSet,
    /// Last-in first-out sequence, enumerated from the top.
    Stack,
    /// `VecDeque<T>`
    Queue,
    /// `DashSet<T>`
    ConcurrentSet,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 7] = [
        CollectionKind::List,
        CollectionKind::LinkedList,
        CollectionKind::HashSet,
        CollectionKind::SortedSet,
        CollectionKind::Stack,
        CollectionKind::Queue,
        CollectionKind::ConcurrentSet,
    ];

    pub const fn identifier(self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::LinkedList => "LinkedList",
            CollectionKind::HashSet => "HashSet",
            CollectionKind::SortedSet => "SortedSet",
            CollectionKind::Stack => "Stack",
            CollectionKind::Queue => "Queue",
            CollectionKind::ConcurrentSet => "ConcurrentSet",
        }
    }

    pub fn from_identifier(id: &str) -> Option<CollectionKind> {
        Self::ALL.into_iter().find(|k| k.identifier() == id)
    }

    /// Set-like kinds have no meaningful enumeration order.
    pub const fn is_set(self) -> bool {
        matches!(
            self,
            CollectionKind::HashSet | CollectionKind::SortedSet | CollectionKind::ConcurrentSet
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DictionaryKind {
    /// `HashMap<K, V>`
    HashMap,
    /// `BTreeMap<K, V>`
    SortedMap,
    /// Key-sorted vector of pairs.
    SortedList,
    /// `DashMap<K, V>`
    ConcurrentMap,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 4] = [
        DictionaryKind::HashMap,
        DictionaryKind::SortedMap,
        DictionaryKind::SortedList,
        DictionaryKind::ConcurrentMap,
    ];

    pub const fn identifier(self) -> &'static str {
        match self {
            DictionaryKind::HashMap => "HashMap",
            DictionaryKind::SortedMap => "SortedMap",
            DictionaryKind::SortedList => "SortedList",
            DictionaryKind::ConcurrentMap => "ConcurrentMap",
        }
    }

    pub fn from_identifier(id: &str) -> Option<DictionaryKind> {
        Self::ALL.into_iter().find(|k| k.identifier() == id)
    }
}

/// Declared slots that accept more than one concrete category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    /// Any ordered, non-set collection.
    Sequence,
    /// Any set-like collection.
    Set,
    /// Any dictionary.
    Map,
    /// Any registered record.
    Record,
}

impl InterfaceKind {
    pub const fn identifier(self) -> &'static str {
        match self {
            InterfaceKind::Sequence => "AnySequence",
            InterfaceKind::Set => "AnySet",
            InterfaceKind::Map => "AnyMap",
            InterfaceKind::Record => "AnyRecord",
        }
    }

    /// Whether a value of the concrete `category` can fill a slot of this interface.
    pub fn accepts(self, category: Category) -> bool {
        match (self, category) {
            (InterfaceKind::Sequence, Category::Collection(kind)) => !kind.is_set(),
            (InterfaceKind::Set, Category::Collection(kind)) => kind.is_set(),
            (InterfaceKind::Map, Category::Dictionary(_)) => true,
            (InterfaceKind::Record, Category::Record) => true,
            _ => false,
        }
    }
}

/// The closed set of shapes a non-null value can take. Null is `Option::None` and is
/// handled before a category is consulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Primitive(PrimitiveKind),
    Array,
    Collection(CollectionKind),
    Dictionary(DictionaryKind),
    MultiArray,
    Record,
    Interface(InterfaceKind),
}

impl Category {
    /// The class identifier written for this category, if the engine owns one.
    /// Records are named by their registration instead.
    pub const fn identifier(self) -> Option<&'static str> {
        match self {
            Category::Primitive(kind) => Some(kind.identifier()),
            Category::Array => Some(ARRAY_CLASS),
            Category::Collection(kind) => Some(kind.identifier()),
            Category::Dictionary(kind) => Some(kind.identifier()),
            Category::MultiArray => Some(MULTI_ARRAY_CLASS),
            Category::Record => None,
            Category::Interface(kind) => Some(kind.identifier()),
        }
    }

    pub const fn is_primitive(self) -> bool {
        matches!(self, Category::Primitive(_))
    }

    pub fn describe(self) -> &'static str {
        self.identifier().unwrap_or("Record")
    }
}

/// Maps a recorded class identifier to an engine-owned category.
///
/// Checks run collection, dictionary, multi-array in that order, with arrays folded into
/// the collection check. Dictionary identifiers are checked against the dictionary table
/// before any collection fallback could claim them, so a map is never read back as a
/// sequence of pairs. `None` means the identifier names a record (or nothing).
pub fn classify_identifier(id: &str) -> Option<Category> {
    if DictionaryKind::from_identifier(id).is_none() {
        if id == ARRAY_CLASS {
            return Some(Category::Array);
        }
        if let Some(kind) = CollectionKind::from_identifier(id) {
            return Some(Category::Collection(kind));
        }
    }
    if let Some(kind) = DictionaryKind::from_identifier(id) {
        return Some(Category::Dictionary(kind));
    }
    if id == MULTI_ARRAY_CLASS {
        return Some(Category::MultiArray);
    }
    PrimitiveKind::from_identifier(id).map(Category::Primitive)
}

/// Decides which concrete category fills a declared slot, given the class recorded in
/// the metadata. The exact identifier wins; interface slots then accept any concrete
/// kind they can hold.
pub fn resolve_slot(declared: Category, recorded: &str) -> Result<Category, Error> {
    if declared.identifier() == Some(recorded) {
        if let Category::Interface(_) = declared {
            return Err(Error::invalid_data(format!(
                "interface identifier `{recorded}` cannot be recorded as a class"
            )));
        }
        return Ok(declared);
    }
    if let Category::Interface(interface) = declared {
        if let Some(concrete) = classify_identifier(recorded) {
            if interface.accepts(concrete) {
                return Ok(concrete);
            }
        } else if interface == InterfaceKind::Record && !is_reserved_class_name(recorded) {
            return Ok(Category::Record);
        }
    }
    Err(Error::type_mismatch(declared.describe(), recorded.to_string()))
}

/// True for names the engine writes itself; records may not register under them.
pub fn is_reserved_class_name(name: &str) -> bool {
    name == NULL_CLASS
        || name == REFERENCE_CLASS
        || classify_identifier(name).is_some()
        || [
            InterfaceKind::Sequence,
            InterfaceKind::Set,
            InterfaceKind::Map,
            InterfaceKind::Record,
        ]
        .iter()
        .any(|k| k.identifier() == name)
}

/// Static description of a type used in diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub category: Category,
    /// Element types: one for arrays and collections, key then value for dictionaries.
    pub elements: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn leaf(name: &'static str, category: Category) -> Self {
        TypeDescriptor {
            name,
            category,
            elements: Vec::new(),
        }
    }

    pub fn with_elements(name: &'static str, category: Category, elements: Vec<Self>) -> Self {
        TypeDescriptor {
            name,
            category,
            elements,
        }
    }
}
