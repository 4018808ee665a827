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

use blobgraph::{
    Category, CollectionKind, Error, Formattable, GraphSerializer, PrimitiveKind, RecordHooks,
};
use blobgraph_core::{InfoCodec, MetaRecord, XmlInfoCodec};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

mod test_helpers;
use test_helpers::{blob_text, init_tracing, test_roundtrip, write_blobs};

#[derive(Formattable, Debug, Default, PartialEq)]
struct Address {
    street: String,
    zip: u32,
}

#[derive(Formattable, Debug, Default, PartialEq)]
struct Person {
    name: String,
    age: u8,
    tags: Vec<String>,
    home: Option<Address>,
    scores: BTreeMap<String, f64>,
}

fn person() -> Person {
    Person {
        name: "Ada".to_string(),
        age: 36,
        tags: vec!["math".to_string(), "engines".to_string()],
        home: Some(Address {
            street: "St James's Square".to_string(),
            zip: 1815,
        }),
        scores: BTreeMap::from([("analysis".to_string(), 9.5)]),
    }
}

fn graph_with_person() -> GraphSerializer {
    let graph = GraphSerializer::default();
    graph
        .load(|loader| {
            loader.register::<Address>()?;
            loader.register::<Person>()
        })
        .unwrap();
    graph
}

#[test]
fn test_record_roundtrip() {
    let graph = graph_with_person();
    test_roundtrip(&graph, person());
    test_roundtrip(&graph, Person::default());
    test_roundtrip(&graph, vec![person(), Person::default()]);
}

#[test]
fn test_record_layout() {
    let graph = graph_with_person();
    let archive = write_blobs(&graph, &person());
    assert_eq!(
        blob_text(&archive, "Info"),
        r#"<Info class="Person"><V k="name">Ada</V><V k="age">36</V></Info>"#
    );
    assert_eq!(blob_text(&archive, "tags/Data"), "math\nengines");
    assert_eq!(
        blob_text(&archive, "home/Info"),
        r#"<Info class="Address"><V k="street">St James&apos;s Square</V><V k="zip">1815</V></Info>"#
    );
    assert_eq!(blob_text(&archive, "scores/Keys"), "analysis");
    // members are emitted before the record's own metadata
    assert_eq!(archive.paths().last(), Some("Info"));
}

#[test]
fn test_null_member() {
    let graph = graph_with_person();
    let mut value = person();
    value.home = None;
    let archive = write_blobs(&graph, &value);
    assert_eq!(
        blob_text(&archive, "home/Info"),
        r#"<Info class="Null"></Info>"#
    );
    test_roundtrip(&graph, value);
}

#[test]
fn test_control_characters_in_metadata() {
    let graph = graph_with_person();
    let mut value = person();
    value.name = "tab\there\r\nand <xml> & \"quotes\"".to_string();
    let archive = write_blobs(&graph, &value);
    let info = blob_text(&archive, "Info");
    assert!(info.contains("&#9;"), "{info}");
    assert!(info.contains("&#13;&#10;"), "{info}");
    assert!(!info.contains('\t'));
    test_roundtrip(&graph, value);
}

#[derive(Formattable, Debug, Default, PartialEq)]
#[graph(name = "Item")]
struct Item {
    #[graph(order = 2)]
    id: u32,
    #[graph(rename = "Label", order = 1)]
    label: String,
    #[graph(skip)]
    cached_len: usize,
}

#[test]
fn test_rename_order_and_skip() {
    let graph = GraphSerializer::default();
    graph.register::<Item>().unwrap();
    let item = Item {
        id: 7,
        label: "seven".to_string(),
        cached_len: 5,
    };
    let archive = write_blobs(&graph, &item);
    assert_eq!(
        blob_text(&archive, "Info"),
        r#"<Info class="Item"><V k="Label">seven</V><V k="id">7</V></Info>"#
    );
    let bytes = graph.serialize(&item).unwrap();
    let restored: Item = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored.label, "seven");
    assert_eq!(restored.id, 7);
    assert_eq!(restored.cached_len, 0);
}

#[derive(Formattable, Debug, Default, PartialEq)]
struct Animal {
    name: String,
    legs: u8,
}

#[derive(Formattable, Debug, Default, PartialEq)]
struct Dog {
    breed: String,
    #[graph(base)]
    animal: Animal,
}

#[derive(Formattable, Debug, Default, PartialEq)]
struct Parrot {
    #[graph(base)]
    animal: Animal,
    #[graph(rename = "name")]
    nickname: String,
    words: u16,
}

#[test]
fn test_base_members() {
    let graph = GraphSerializer::default();
    graph.register::<Dog>().unwrap();
    let dog = Dog {
        breed: "collie".to_string(),
        animal: Animal {
            name: "Lassie".to_string(),
            legs: 4,
        },
    };
    let archive = write_blobs(&graph, &dog);
    assert_eq!(
        blob_text(&archive, "Info"),
        r#"<Info class="Dog"><V k="name">Lassie</V><V k="legs">4</V><V k="breed">collie</V></Info>"#
    );
    test_roundtrip(&graph, dog);
}

#[test]
fn test_base_declaration_wins_key_conflict() {
    let graph = GraphSerializer::default();
    graph.register::<Parrot>().unwrap();
    let parrot = Parrot {
        animal: Animal {
            name: "Polly".to_string(),
            legs: 2,
        },
        nickname: "Pol".to_string(),
        words: 40,
    };
    let bytes = graph.serialize(&parrot).unwrap();
    let restored: Parrot = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored.animal.name, "Polly");
    assert_eq!(restored.nickname, "");
    assert_eq!(restored.words, 40);
}

#[derive(Formattable, Debug, Default, PartialEq)]
#[graph(name = "Account")]
struct AccountV1 {
    owner: String,
}

#[derive(Formattable, Debug, Default, PartialEq)]
#[graph(name = "Account")]
struct AccountV2 {
    owner: String,
    balance: i64,
}

#[derive(Formattable, Debug, Default, PartialEq)]
#[graph(name = "Account")]
struct AccountV3 {
    owner: String,
    #[graph(optional)]
    balance: i64,
    #[graph(optional)]
    history: Vec<i64>,
}

fn account_graph() -> GraphSerializer {
    let graph = GraphSerializer::default();
    graph
        .load(|loader| {
            loader.register::<AccountV1>()?;
            loader.register::<AccountV2>()?;
            loader.register::<AccountV3>()
        })
        .unwrap();
    graph
}

#[test]
fn test_missing_required_member() {
    let graph = account_graph();
    let bytes = graph
        .serialize(&AccountV1 {
            owner: "ann".to_string(),
        })
        .unwrap();
    let err = graph.deserialize::<AccountV2>(&bytes).unwrap_err();
    match err {
        Error::MissingField(field, _) => assert_eq!(field, "balance"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_missing_optional_member_is_tolerated() {
    init_tracing();
    let graph = account_graph();
    let bytes = graph
        .serialize(&AccountV1 {
            owner: "ann".to_string(),
        })
        .unwrap();
    let restored: AccountV3 = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored.owner, "ann");
    assert_eq!(restored.balance, 0);
    assert!(restored.history.is_empty());

    let strict = account_graph().strict_optional(true);
    let err = strict.deserialize::<AccountV3>(&bytes).unwrap_err();
    assert!(matches!(err, Error::MissingField(_, _)), "{err}");
}

#[test]
fn test_unparsable_optional_member_is_tolerated() {
    let graph = account_graph();
    let mut archive = write_blobs(
        &graph,
        &AccountV3 {
            owner: "bo".to_string(),
            balance: 12,
            history: vec![1, 2],
        },
    );
    archive.insert(
        "Info",
        br#"<Info class="Account"><V k="owner">bo</V><V k="balance">twelve</V></Info>"#.to_vec(),
    );
    let restored: AccountV3 = graph.deserialize_from(&archive).unwrap();
    assert_eq!(restored.balance, 0);
    assert_eq!(restored.history, vec![1, 2]);

    let err = graph.deserialize_from::<AccountV2>(&archive).unwrap_err();
    assert!(matches!(err, Error::ParseError(_)), "{err}");
}

#[derive(Formattable, Debug, Default)]
struct Snapshot {
    label: String,
    #[graph(optional)]
    cache: Rc<RefCell<Vec<i32>>>,
}

#[derive(Formattable, Debug, Default)]
struct StrictSnapshot {
    label: String,
    cache: Rc<RefCell<Vec<i32>>>,
}

#[test]
fn test_failed_optional_member_is_dropped_on_write() {
    let graph = GraphSerializer::default();
    graph
        .load(|loader| {
            loader.register::<Snapshot>()?;
            loader.register::<StrictSnapshot>()
        })
        .unwrap();
    let cache = Rc::new(RefCell::new(vec![1, 2, 3]));
    let snapshot = Snapshot {
        label: "busy".to_string(),
        cache: cache.clone(),
    };
    let guard = cache.borrow_mut();
    let archive = write_blobs(&graph, &snapshot);
    assert!(!archive.contains("cache/Info"));
    assert!(!archive.contains("cache/Data"));

    let strict = StrictSnapshot {
        label: "busy".to_string(),
        cache: cache.clone(),
    };
    assert!(graph.serialize(&strict).is_err());
    drop(guard);

    let restored: Snapshot = graph.deserialize_from(&archive).unwrap();
    assert_eq!(restored.label, "busy");
    assert!(restored.cache.borrow().is_empty());
}

#[derive(Formattable, Debug, Default, PartialEq)]
struct Pair<T> {
    left: T,
    right: T,
}

#[test]
fn test_generic_record_instantiations() {
    let graph = GraphSerializer::default();
    graph.register::<Pair<i32>>().unwrap();
    let descriptor = graph.get_registry().descriptor_for::<Pair<i32>>().unwrap();
    // registration builds the layout of the registered instantiation
    assert_eq!(descriptor.built_layouts(), 1);

    for _ in 0..2 {
        test_roundtrip(&graph, Pair { left: 1, right: 2 });
    }
    assert_eq!(descriptor.built_layouts(), 1);

    for _ in 0..2 {
        test_roundtrip(
            &graph,
            Pair {
                left: "l".to_string(),
                right: "r".to_string(),
            },
        );
        assert_eq!(descriptor.built_layouts(), 2);
    }
    for _ in 0..2 {
        test_roundtrip(
            &graph,
            Pair {
                left: vec![1u8],
                right: vec![2, 3],
            },
        );
        assert_eq!(descriptor.built_layouts(), 3);
    }

    // unregistered instantiations share the registration of their definition
    let shared = graph.get_registry().descriptor_for::<Pair<String>>().unwrap();
    assert!(Arc::ptr_eq(&shared, &descriptor));

    let ints = descriptor.layout::<Pair<i32>>().unwrap();
    assert!(Arc::ptr_eq(&ints, &descriptor.layout::<Pair<i32>>().unwrap()));
    let lists = descriptor.layout::<Pair<Vec<u8>>>().unwrap();
    assert_eq!(descriptor.built_layouts(), 3);
    assert!(ints.values()[0].access().is_inline());
    assert!(!lists.values()[0].access().is_inline());
    assert_ne!(ints.describe(), lists.describe());
    assert_eq!(
        ints.describe()[1].descriptor.category,
        Category::Primitive(PrimitiveKind::Int)
    );
    assert_eq!(
        lists.describe()[1].descriptor.category,
        Category::Collection(CollectionKind::List)
    );
}

static SERIALIZING: AtomicUsize = AtomicUsize::new(0);
static SERIALIZED: AtomicUsize = AtomicUsize::new(0);

#[derive(Formattable, Debug, PartialEq)]
#[graph(hooks, factory = "Ticket::blank")]
struct Ticket {
    code: String,
    #[graph(skip)]
    phase: Vec<&'static str>,
}

impl Ticket {
    fn blank() -> Self {
        Ticket {
            code: "NONE".to_string(),
            phase: vec!["created"],
        }
    }
}

impl RecordHooks for Ticket {
    fn on_serializing(&self) {
        SERIALIZING.fetch_add(1, Ordering::SeqCst);
    }

    fn on_serialized(&self) {
        SERIALIZED.fetch_add(1, Ordering::SeqCst);
    }

    fn on_deserializing(&mut self) {
        self.phase.push("deserializing");
    }

    fn on_deserialized(&mut self) {
        self.phase.push("deserialized");
    }

    fn substitute(mut self) -> Self {
        self.code = self.code.to_uppercase();
        self
    }
}

#[test]
fn test_hooks_factory_and_substitution() {
    let graph = GraphSerializer::default();
    graph.register::<Ticket>().unwrap();
    let ticket = Ticket {
        code: "ab-12".to_string(),
        phase: Vec::new(),
    };
    let bytes = graph.serialize(&ticket).unwrap();
    assert_eq!(SERIALIZING.load(Ordering::SeqCst), 1);
    assert_eq!(SERIALIZED.load(Ordering::SeqCst), 1);

    let restored: Ticket = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored.code, "AB-12");
    assert_eq!(restored.phase, vec!["created", "deserializing", "deserialized"]);
    assert_eq!(Ticket::graph_default().code, "NONE");
}

#[derive(Formattable, Default)]
#[graph(hooks)]
struct Alias {
    name: String,
    owner: Option<Rc<RefCell<Alias>>>,
}

impl RecordHooks for Alias {
    fn substitute(mut self) -> Self {
        self.name.push('!');
        self
    }
}

#[derive(Formattable, Default)]
struct Directory {
    primary: Rc<RefCell<Alias>>,
    backup: Rc<RefCell<Alias>>,
    all: Vec<Rc<RefCell<Alias>>>,
}

#[test]
fn test_substitution_of_shared_node() {
    let graph = GraphSerializer::default();
    graph
        .load(|loader| {
            loader.register::<Alias>()?;
            loader.register::<Directory>()
        })
        .unwrap();
    let alias = Rc::new(RefCell::new(Alias {
        name: "root".to_string(),
        owner: None,
    }));
    alias.borrow_mut().owner = Some(alias.clone());
    let directory = Directory {
        primary: alias.clone(),
        backup: alias.clone(),
        all: vec![alias.clone()],
    };

    let bytes = graph.serialize(&directory).unwrap();
    let restored: Directory = graph.deserialize(&bytes).unwrap();
    assert!(Rc::ptr_eq(&restored.primary, &restored.backup));
    assert!(Rc::ptr_eq(&restored.primary, &restored.all[0]));
    // substituted once, and seen through every holder including the cycle
    assert_eq!(restored.primary.borrow().name, "root!");
    assert_eq!(restored.backup.borrow().name, "root!");
    let owner = restored.all[0].borrow().owner.clone().unwrap();
    assert!(Rc::ptr_eq(&owner, &restored.primary));
    assert_eq!(owner.borrow().name, "root!");

    alias.borrow_mut().owner = None;
    restored.primary.borrow_mut().owner = None;
}

thread_local! {
    static RECEIPT_EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn log_event(event: String) {
    RECEIPT_EVENTS.with(|events| events.borrow_mut().push(event));
}

#[derive(Formattable, Debug, Default, PartialEq)]
#[graph(hooks)]
struct Receipt {
    total: u32,
    lines: Vec<String>,
}

impl RecordHooks for Receipt {
    fn on_serializing(&self) {
        log_event("serializing".to_string());
    }

    fn on_serialized(&self) {
        log_event("serialized".to_string());
    }
}

/// Records the class of every metadata blob it encodes.
struct LoggingCodec;

impl InfoCodec for LoggingCodec {
    fn serialize_info(&self, record: &MetaRecord) -> Vec<u8> {
        log_event(format!("info {}", record.class_name()));
        XmlInfoCodec.serialize_info(record)
    }

    fn deserialize_info(&self, bytes: &[u8]) -> Result<MetaRecord, Error> {
        XmlInfoCodec.deserialize_info(bytes)
    }
}

#[test]
fn test_serialized_hook_runs_before_record_metadata() {
    let graph = GraphSerializer::default().with_codec(Arc::new(LoggingCodec));
    graph.register::<Receipt>().unwrap();
    let receipt = Receipt {
        total: 12,
        lines: vec!["tea".to_string()],
    };
    RECEIPT_EVENTS.with(|events| events.borrow_mut().clear());
    let bytes = graph.serialize(&receipt).unwrap();
    let events = RECEIPT_EVENTS.with(|events| events.borrow().clone());
    assert_eq!(
        events,
        ["serializing", "info List", "serialized", "info Receipt"]
    );
    assert_eq!(graph.deserialize::<Receipt>(&bytes).unwrap(), receipt);
}

#[test]
fn test_unregistered_record() {
    let graph = GraphSerializer::default();
    let err = graph.serialize(&Address::default()).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err}");

    let bytes = graph_with_person().serialize(&Address::default()).unwrap();
    let err = graph.deserialize::<Address>(&bytes).unwrap_err();
    assert!(matches!(err, Error::UnknownClass(_)), "{err}");
}

#[test]
fn test_record_class_mismatch() {
    let graph = graph_with_person();
    let bytes = graph.serialize(&Address::default()).unwrap();
    let err = graph.deserialize::<Person>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
}
