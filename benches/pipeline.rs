#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tastegraph::data_generator::{DataGenerator, GeneratorOptions};
use tastegraph::pipeline::{symmetrize, OpinionIndex};
use tastegraph::sqlite_adapter::SqliteReference;
use tastegraph::{Pipeline, PipelineOptions, Relations};

const SEED: u64 = 0x5eed;

fn dataset(people: usize) -> Relations {
    let opts = GeneratorOptions {
        people,
        artists: 500,
        avg_friends: 10,
        avg_likes: 15,
        avg_dislikes: 5,
        conflict_rate: 0.01,
    };
    DataGenerator::new(SEED)
        .generate(&opts)
        .expect("generate dataset")
}

fn pipeline_partitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/partitions");
    group.sample_size(20);

    let relations = dataset(5_000);
    group.throughput(Throughput::Elements(relations.row_count() as u64));
    for partitions in [1usize, 2, 4, 8] {
        let pipeline = Pipeline::new(PipelineOptions::default().partitions(partitions));
        group.bench_with_input(
            BenchmarkId::from_parameter(partitions),
            &relations,
            |b, relations| {
                b.iter(|| black_box(pipeline.run(relations).recommendations.len()));
            },
        );
    }
    group.finish();
}

fn pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/stages");
    group.sample_size(30);

    let relations = dataset(2_000);
    group.bench_function("symmetrize", |b| {
        b.iter(|| black_box(symmetrize(&relations.friends).0.edge_count()));
    });
    group.bench_function("opinion_index", |b| {
        b.iter(|| black_box(OpinionIndex::build(&relations).person_count()));
    });
    group.finish();
}

fn sqlite_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/sqlite_reference");
    group.sample_size(10);

    let relations = dataset(1_000);
    let mut db = SqliteReference::open_in_memory().expect("open sqlite");
    db.load(&relations).expect("load sqlite");
    group.bench_function("query", |b| {
        b.iter(|| black_box(db.recommendations().expect("query").len()));
    });
    group.finish();
}

criterion_group!(benches, pipeline_partitions, pipeline_stages, sqlite_reference);
criterion_main!(benches);
