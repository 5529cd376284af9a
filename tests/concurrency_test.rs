//! Concurrent use of one graph from several threads

use propgraph::{DefaultSchema, GraphRead, GraphStore, Label, PropertyAccess, PropertyValue, ReadOnlyGraph, VertexId};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_concurrent_vertex_insertion() {
    init_logging();
    let graph = Arc::new(GraphStore::with_defaults());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let graph = graph.clone();
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| {
                        graph
                            .add_vertex_with(None, |v| {
                                v.set_property("thread", t as i64)?;
                                v.set_property("seq", i as i64)?;
                                Ok(())
                            })
                            .unwrap()
                            .id()
                            .as_u64()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "id {} handed out twice", id);
        }
    }

    assert_eq!(ids.len(), THREADS * PER_THREAD);
    assert_eq!(graph.vertex_count(), THREADS * PER_THREAD);
    // Sequential generator: ids are exactly 1..=n
    assert_eq!(ids.iter().min().copied(), Some(1));
    assert_eq!(ids.iter().max().copied(), Some((THREADS * PER_THREAD) as u64));
}

#[test]
fn test_concurrent_edges_keep_adjacency_symmetric() {
    init_logging();
    let graph = Arc::new(GraphStore::with_defaults());
    let hubs: Vec<_> = (0..4).map(|_| graph.add_vertex(None).unwrap()).collect();
    let hubs = Arc::new(hubs);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let graph = graph.clone();
            let hubs = hubs.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let from = &hubs[(t + i) % hubs.len()];
                    let to = &hubs[(t + i + 1) % hubs.len()];
                    graph.add_edge(from, to, None, Label::new("link")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = THREADS * PER_THREAD;
    assert_eq!(graph.edge_count(), total);
    let out: usize = hubs.iter().map(|v| v.out_degree(&[])).sum();
    let incoming: usize = hubs.iter().map(|v| v.in_degree(&[])).sum();
    assert_eq!(out, total);
    assert_eq!(incoming, total);

    for edge in graph.edges(None) {
        let tail = edge.out_vertex().unwrap();
        assert!(tail.out_edges(&[]).iter().any(|e| e.id() == edge.id()));
    }
}

#[test]
fn test_concurrent_add_and_remove() {
    init_logging();
    let graph: Arc<GraphStore<DefaultSchema>> = Arc::new(GraphStore::with_defaults());
    let center = graph.add_vertex(Some(VertexId::new(1_000_000))).unwrap();

    let writers: Vec<_> = (0..THREADS / 2)
        .map(|_| {
            let graph = graph.clone();
            let center = center.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    let leaf = graph.add_vertex(None).unwrap();
                    graph.add_edge(&center, &leaf, None, Label::new("spoke")).unwrap();
                }
            })
        })
        .collect();

    let removers: Vec<_> = (0..THREADS / 2)
        .map(|_| {
            let graph = graph.clone();
            thread::spawn(move || {
                let mut removed = 0;
                for vertex in graph.vertices(None) {
                    if vertex.id() != &VertexId::new(1_000_000) && graph.remove_vertex(vertex.id()).is_some() {
                        removed += 1;
                    }
                }
                removed
            })
        })
        .collect();

    for handle in writers {
        handle.join().unwrap();
    }
    for handle in removers {
        handle.join().unwrap();
    }

    // The center's adjacency matches the edge registry exactly
    let registered: HashSet<_> = graph.edges(None).map(|edge| *edge.id()).collect();
    let adjacent: HashSet<_> = center.out_edges(&[]).iter().map(|edge| *edge.id()).collect();
    assert_eq!(registered, adjacent);
    assert!(graph.contains_vertex(center.id()));
}

#[test]
fn test_snapshot_shared_across_readers() {
    init_logging();
    let graph = GraphStore::with_defaults();
    for i in 0..100i64 {
        graph
            .add_vertex_with(None, |v| {
                v.set_property("n", i)?;
                Ok(())
            })
            .unwrap();
    }
    let snapshot = Arc::new(ReadOnlyGraph::new(&graph).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let snapshot = snapshot.clone();
            thread::spawn(move || {
                snapshot
                    .vertices(None)
                    .filter_map(|v| v.get_property("n").and_then(|n| n.as_integer()))
                    .sum::<i64>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (0..100).sum::<i64>());
    }
    assert_eq!(
        snapshot.vertex(&VertexId::new(43)).unwrap().get_property("n"),
        Some(PropertyValue::Integer(42))
    );
}

#[test]
fn test_concurrent_writes_keep_index_consistent() {
    init_logging();
    for _ in 0..50 {
        let graph: Arc<GraphStore<DefaultSchema>> = Arc::new(GraphStore::with_defaults());
        graph.create_vertex_index("by_k", "k".to_string()).unwrap();
        let vertex = graph.add_vertex(None).unwrap();

        let handles: Vec<_> = (0..4i64)
            .map(|t| {
                let vertex = vertex.clone();
                thread::spawn(move || {
                    for i in 0..50i64 {
                        vertex.set_property("k", t * 100 + i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = vertex.get_property("k").unwrap();
        let registry = graph.indices().vertices();
        assert_eq!(registry.lookup("by_k", &stored).unwrap(), vec![*vertex.id()]);
        let info = registry.indices(None);
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].entries, 1);
    }
}
