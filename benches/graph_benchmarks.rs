use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use propgraph::{
    DefaultSchema, Direction, GraphRead, GraphStore, Label, PropertyAccess, ReadOnlyGraph, ReadOnlyVertex,
    SnapshotOptions, SyncedIds, VertexId,
};

/// Graph of `size` vertices, each linked to the next two with alternating labels
fn ring(size: usize) -> GraphStore<DefaultSchema> {
    let graph = GraphStore::with_defaults();
    let vertices: Vec<_> = (0..size)
        .map(|i| {
            graph
                .add_vertex_with(None, |v| {
                    v.set_property("name", format!("Person{}", i))?;
                    v.set_property("age", (i % 100) as i64)?;
                    Ok(())
                })
                .unwrap()
        })
        .collect();

    let knows = Label::new("KNOWS");
    let follows = Label::new("FOLLOWS");
    for i in 0..size {
        let from = &vertices[i];
        graph.add_edge(from, &vertices[(i + 1) % size], None, knows.clone()).unwrap();
        graph.add_edge(from, &vertices[(i + 2) % size], None, follows.clone()).unwrap();
    }
    graph
}

/// Benchmark vertex insertion throughput
fn bench_vertex_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let graph = GraphStore::with_defaults();
                for i in 0..size {
                    graph
                        .add_vertex_with(None, |v| {
                            v.set_property("name", format!("Person{}", i))?;
                            v.set_property("age", (i % 100) as i64)?;
                            Ok(())
                        })
                        .unwrap();
                }
            });
        });
    }
    group.finish();
}

/// Benchmark label-filtered out-edge traversal on the mutable graph
fn bench_label_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_traversal");
    let knows = [Label::new("KNOWS")];

    for size in [100, 1000, 10_000].iter() {
        let graph = ring(*size);
        let start = graph.get_vertex(&VertexId::new(1)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                // 10 hops along KNOWS
                let mut current = start.clone();
                for _ in 0..10 {
                    current = current.adjacent_vertices(Direction::Out, &knows)[0].clone();
                }
                criterion::black_box(current.id());
            });
        });
    }
    group.finish();
}

/// Benchmark snapshot construction, indexed and synced
fn bench_snapshot_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_build");
    let synced = SnapshotOptions::<DefaultSchema>::new().with_synced_ids(SyncedIds::all());

    for size in [1000, 10_000].iter() {
        let graph = ring(*size);

        group.bench_with_input(BenchmarkId::new("indexed", size), size, |b, _| {
            b.iter(|| criterion::black_box(ReadOnlyGraph::new(&graph).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("synced", size), size, |b, _| {
            b.iter(|| criterion::black_box(ReadOnlyGraph::with_options(&graph, &synced).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark filtered scans: snapshot against the live graph
fn bench_filtered_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered_scan");

    for size in [1000, 10_000].iter() {
        let graph = ring(*size);
        let snapshot = ReadOnlyGraph::new(&graph).unwrap();

        group.bench_with_input(BenchmarkId::new("graph", size), size, |b, _| {
            b.iter(|| {
                let adult = |v: &propgraph::Vertex<DefaultSchema>| {
                    v.get_property("age").and_then(|a| a.as_integer()).map_or(false, |a| a > 30)
                };
                criterion::black_box(graph.number_of_vertices(Some(&adult)));
            });
        });
        group.bench_with_input(BenchmarkId::new("snapshot", size), size, |b, _| {
            b.iter(|| {
                let adult = |v: &ReadOnlyVertex<DefaultSchema>| {
                    v.get_property("age").and_then(|a| a.as_integer()).map_or(false, |a| a > 30)
                };
                criterion::black_box(snapshot.number_of_vertices(Some(&adult)));
            });
        });
        group.bench_with_input(BenchmarkId::new("snapshot_count", size), size, |b, _| {
            b.iter(|| criterion::black_box(snapshot.number_of_edges(None)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_vertex_insertion,
    bench_label_traversal,
    bench_snapshot_build,
    bench_filtered_scan,
);
criterion_main!(benches);
