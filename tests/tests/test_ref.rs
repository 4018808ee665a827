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

use blobgraph::{Error, Formattable, GraphSerializer, MemoryArchive, DEFAULT_MAX_DEPTH};
use blobgraph_core::{InfoCodec, MetaRecord, XmlInfoCodec};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

mod test_helpers;
use test_helpers::{blob_text, write_blobs};

#[derive(Formattable, Debug, Default, PartialEq)]
struct Badge {
    title: String,
}

#[derive(Formattable, Debug, Default)]
struct Team {
    lead: Rc<Badge>,
    members: Vec<Rc<Badge>>,
}

#[derive(Formattable, Default)]
struct Node {
    name: String,
    next: Option<Rc<RefCell<Node>>>,
}

#[derive(Formattable, Default)]
struct SyncNode {
    name: String,
    peers: Vec<Arc<Mutex<SyncNode>>>,
}

#[derive(Formattable, Default)]
struct Folder {
    title: String,
    parent: Option<Arc<RwLock<Folder>>>,
    children: Vec<Arc<RwLock<Folder>>>,
}

#[derive(Formattable, Debug, Default)]
struct Chain {
    label: String,
    next: Option<Rc<Chain>>,
}

fn graph() -> GraphSerializer {
    let graph = GraphSerializer::default();
    graph
        .load(|loader| {
            loader.register::<Badge>()?;
            loader.register::<Team>()?;
            loader.register::<Node>()?;
            loader.register::<SyncNode>()?;
            loader.register::<Folder>()?;
            loader.register::<Chain>()
        })
        .unwrap();
    graph
}

fn info(meta: &MetaRecord) -> Vec<u8> {
    XmlInfoCodec.serialize_info(meta)
}

#[test]
fn test_shared_primitive_nodes() {
    let graph = graph();
    let shared = Rc::new("x".to_string());
    let values = vec![shared.clone(), shared, Rc::new("y".to_string())];
    let archive = write_blobs(&graph, &values);
    assert!(blob_text(&archive, "Info").contains(r#"<V k="IsPrimitive">False</V>"#));
    assert_eq!(
        blob_text(&archive, "0/Info"),
        r#"<Info class="String"><V k="Value">x</V></Info>"#
    );
    assert_eq!(
        blob_text(&archive, "1/Info"),
        r#"<Info class="Reference"><V k="PointsTo">0/</V></Info>"#
    );

    let restored: Vec<Rc<String>> = graph.deserialize_from(&archive).unwrap();
    assert_eq!(restored.len(), 3);
    assert!(Rc::ptr_eq(&restored[0], &restored[1]));
    assert!(!Rc::ptr_eq(&restored[0], &restored[2]));
    assert_eq!(*restored[2], "y");
}

#[test]
fn test_shared_records() {
    let graph = graph();
    let lead = Rc::new(Badge {
        title: "captain".to_string(),
    });
    let team = Team {
        lead: lead.clone(),
        members: vec![
            Rc::new(Badge {
                title: "rookie".to_string(),
            }),
            lead,
        ],
    };
    let archive = write_blobs(&graph, &team);
    assert_eq!(
        blob_text(&archive, "members/1/Info"),
        r#"<Info class="Reference"><V k="PointsTo">lead/</V></Info>"#
    );

    let restored: Team = graph.deserialize_from(&archive).unwrap();
    assert_eq!(restored.lead.title, "captain");
    assert!(Rc::ptr_eq(&restored.lead, &restored.members[1]));
    assert_eq!(restored.members[0].title, "rookie");
}

#[test]
fn test_shared_arc() {
    let graph = graph();
    let shared = Arc::new(vec![1i32, 2, 3]);
    let bytes = graph
        .serialize(&vec![shared.clone(), shared.clone(), shared])
        .unwrap();
    let restored: Vec<Arc<Vec<i32>>> = graph.deserialize(&bytes).unwrap();
    assert_eq!(*restored[0], vec![1, 2, 3]);
    assert!(Arc::ptr_eq(&restored[0], &restored[1]));
    assert!(Arc::ptr_eq(&restored[1], &restored[2]));
}

#[test]
fn test_shared_mutable_list() {
    let graph = graph();
    let list = Rc::new(RefCell::new(vec![1i32]));
    let bytes = graph.serialize(&vec![list.clone(), list]).unwrap();
    let restored: Vec<Rc<RefCell<Vec<i32>>>> = graph.deserialize(&bytes).unwrap();
    restored[0].borrow_mut().push(2);
    assert_eq!(*restored[1].borrow(), vec![1, 2]);
}

#[test]
fn test_self_cycle() {
    let graph = graph();
    let node = Rc::new(RefCell::new(Node {
        name: "loop".to_string(),
        next: None,
    }));
    node.borrow_mut().next = Some(node.clone());

    let archive = write_blobs(&graph, &node);
    assert_eq!(
        blob_text(&archive, "next/Info"),
        r#"<Info class="Reference"><V k="PointsTo"></V></Info>"#
    );

    let restored: Rc<RefCell<Node>> = graph.deserialize_from(&archive).unwrap();
    assert_eq!(restored.borrow().name, "loop");
    let next = restored.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&restored, &next));

    node.borrow_mut().next = None;
    restored.borrow_mut().next = None;
}

#[test]
fn test_mutual_cycle() {
    let graph = graph();
    let a = Rc::new(RefCell::new(Node {
        name: "a".to_string(),
        next: None,
    }));
    let b = Rc::new(RefCell::new(Node {
        name: "b".to_string(),
        next: Some(a.clone()),
    }));
    a.borrow_mut().next = Some(b.clone());

    let bytes = graph.serialize(&a).unwrap();
    let restored: Rc<RefCell<Node>> = graph.deserialize(&bytes).unwrap();
    let restored_b = restored.borrow().next.clone().unwrap();
    assert_eq!(restored_b.borrow().name, "b");
    let back = restored_b.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&restored, &back));

    a.borrow_mut().next = None;
    restored.borrow_mut().next = None;
}

#[test]
fn test_mutex_cycle() {
    let graph = graph();
    let hub = Arc::new(Mutex::new(SyncNode {
        name: "hub".to_string(),
        peers: Vec::new(),
    }));
    let spoke = Arc::new(Mutex::new(SyncNode {
        name: "spoke".to_string(),
        peers: vec![hub.clone()],
    }));
    hub.lock().unwrap().peers = vec![spoke.clone(), hub.clone()];

    let bytes = graph.serialize(&hub).unwrap();
    let restored: Arc<Mutex<SyncNode>> = graph.deserialize(&bytes).unwrap();
    let peers = restored.lock().unwrap().peers.clone();
    assert_eq!(peers.len(), 2);
    assert!(Arc::ptr_eq(&peers[1], &restored));
    let spoke_peers = peers[0].lock().unwrap().peers.clone();
    assert_eq!(peers[0].lock().unwrap().name, "spoke");
    assert!(Arc::ptr_eq(&spoke_peers[0], &restored));

    hub.lock().unwrap().peers.clear();
    restored.lock().unwrap().peers.clear();
}

#[test]
fn test_rwlock_tree_with_parent_links() {
    let graph = graph();
    let root = Arc::new(RwLock::new(Folder {
        title: "root".to_string(),
        ..Default::default()
    }));
    for title in ["docs", "src"] {
        let child = Arc::new(RwLock::new(Folder {
            title: title.to_string(),
            parent: Some(root.clone()),
            children: Vec::new(),
        }));
        root.write().unwrap().children.push(child);
    }

    let bytes = graph.serialize(&root).unwrap();
    let restored: Arc<RwLock<Folder>> = graph.deserialize(&bytes).unwrap();
    let children = restored.read().unwrap().children.clone();
    let titles: Vec<String> = children
        .iter()
        .map(|c| c.read().unwrap().title.clone())
        .collect();
    assert_eq!(titles, vec!["docs", "src"]);
    for child in &children {
        let parent = child.read().unwrap().parent.clone().unwrap();
        assert!(Arc::ptr_eq(&parent, &restored));
    }

    root.write().unwrap().children.clear();
    restored.write().unwrap().children.clear();
}

#[test]
fn test_cycle_without_cell_is_rejected() {
    let graph = graph();
    let mut archive = MemoryArchive::new();
    archive.insert("next/Info", info(&MetaRecord::pointer("")));
    let mut chain = MetaRecord::new("Chain");
    chain.insert("label", Some("x".to_string()));
    archive.insert("Info", info(&chain));

    let err = graph.deserialize_from::<Rc<Chain>>(&archive).unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)), "{err}");
}

#[test]
fn test_pointer_to_node_not_yet_read() {
    let graph = graph();
    let mut archive = MemoryArchive::new();
    let mut list = MetaRecord::new("List");
    list.insert("IsPrimitive", Some("False".to_string()));
    list.insert("Count", Some("2".to_string()));
    archive.insert("Info", info(&list));
    archive.insert("0/Info", info(&MetaRecord::pointer("1/")));
    let mut text = MetaRecord::new("String");
    text.insert("Value", Some("later".to_string()));
    archive.insert("1/Info", info(&text));

    let restored: Vec<Rc<String>> = graph.deserialize_from(&archive).unwrap();
    assert_eq!(*restored[0], "later");
    assert!(Rc::ptr_eq(&restored[0], &restored[1]));
}

#[test]
fn test_bad_pointers() {
    let graph = graph();
    let mut archive = MemoryArchive::new();
    archive.insert("next/Info", info(&MetaRecord::pointer("nowhere")));
    let mut chain = MetaRecord::new("Chain");
    chain.insert("label", Some("x".to_string()));
    archive.insert("Info", info(&chain));
    let err = graph.deserialize_from::<Chain>(&archive).unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)), "{err}");

    // a pointer cannot stand in for an unshared value
    let mut archive = MemoryArchive::new();
    archive.insert("lead/Info", info(&MetaRecord::pointer("")));
    archive.insert("members/Info", info(&MetaRecord::new("List")));
    archive.insert("Info", info(&MetaRecord::new("Team")));
    let err = graph.deserialize_from::<Badge>(&archive).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
    let err = graph.deserialize_from::<Rc<Team>>(&archive).unwrap_err();
    assert!(err.is_data_error(), "{err}");
}

#[test]
fn test_pointer_in_value_slot() {
    let graph = graph();
    let mut archive = MemoryArchive::new();
    let mut badge = MetaRecord::new("Badge");
    badge.insert("title", Some("t".to_string()));
    archive.insert("lead/Info", info(&badge));
    archive.insert("Info", info(&MetaRecord::pointer("lead/")));
    let err = graph.deserialize_from::<Badge>(&archive).unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)), "{err}");
    let shared: Rc<Badge> = graph.deserialize_from(&archive).unwrap();
    assert_eq!(shared.title, "t");
}

fn node_chain(len: usize) -> Rc<RefCell<Node>> {
    let mut head = None;
    for i in (0..len).rev() {
        head = Some(Rc::new(RefCell::new(Node {
            name: format!("n{i}"),
            next: head,
        })));
    }
    head.expect("chain needs at least one node")
}

fn chain_len(head: &Rc<RefCell<Node>>) -> usize {
    let mut len = 1;
    let mut current = head.clone();
    loop {
        let next = current.borrow().next.clone();
        match next {
            Some(node) => {
                len += 1;
                current = node;
            }
            None => return len,
        }
    }
}

#[test]
fn test_deep_chain_stops_at_depth_limit() {
    let graph = graph();
    let limit = graph.get_config().max_depth() as usize;
    assert_eq!(limit, DEFAULT_MAX_DEPTH as usize);

    // the `None` after the last node sits one level below it
    let bytes = graph.serialize(&node_chain(limit - 1)).unwrap();
    let restored: Rc<RefCell<Node>> = graph.deserialize(&bytes).unwrap();
    assert_eq!(chain_len(&restored), limit - 1);
    assert_eq!(restored.borrow().name, "n0");

    let err = graph.serialize(&node_chain(limit)).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{err}");
    assert!(graph.serialize_or_none(&node_chain(limit * 3)).is_none());

    // a raised limit runs on a thread with a stack to match
    let deep_bytes = std::thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(move || {
            let deep = self::graph().max_depth(DEFAULT_MAX_DEPTH * 4);
            let bytes = deep.serialize(&node_chain(limit * 3)).unwrap();
            let restored: Rc<RefCell<Node>> = deep.deserialize(&bytes).unwrap();
            assert_eq!(chain_len(&restored), limit * 3);
            bytes
        })
        .unwrap()
        .join()
        .unwrap();
    let Err(err) = graph.deserialize::<Rc<RefCell<Node>>>(&deep_bytes) else {
        panic!("chain deeper than the limit was read");
    };
    assert!(matches!(err, Error::DepthExceed(_)), "{err}");
}
