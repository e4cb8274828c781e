#![allow(missing_docs)]

use tastegraph::data_generator::{DataGenerator, GeneratorOptions};
use tastegraph::sqlite_adapter::{cross_check, SqliteReference};
use tastegraph::{recommend, PipelineOptions, Relations};

fn generated(seed: u64, conflict_rate: f64) -> Relations {
    let opts = GeneratorOptions {
        people: 120,
        artists: 40,
        avg_friends: 4,
        avg_likes: 5,
        avg_dislikes: 3,
        conflict_rate,
    };
    DataGenerator::new(seed).generate(&opts).expect("generate")
}

#[test]
fn generated_datasets_agree_with_sqlite() {
    for seed in [1u64, 2, 3, 42, 1_337] {
        let rel = generated(seed, 0.0);
        let report = cross_check(&rel, &PipelineOptions::default()).expect("cross check");
        assert!(report.matches, "seed {seed}: {report:?}");
        assert!(report.pipeline_count > 0, "seed {seed} produced nothing");
    }
}

#[test]
fn conflicting_inputs_agree_with_sqlite() {
    for seed in [5u64, 6] {
        let rel = generated(seed, 0.5);
        let report = cross_check(&rel, &PipelineOptions::default().partitions(4))
            .expect("cross check");
        assert!(report.matches, "seed {seed}: {report:?}");
    }
}

#[test]
fn dirty_rows_agree_with_sqlite() {
    let mut rel = generated(9, 0.1);
    // self loops, reversed duplicates and repeated preferences
    rel = rel.friend(3, 3).friend(7, 7);
    let extra_friends: Vec<_> = rel.friends.iter().take(20).map(|f| (f.b.0, f.a.0)).collect();
    for (a, b) in extra_friends {
        rel = rel.friend(a, b);
    }
    let extra_likes: Vec<_> = rel.likes.iter().take(20).copied().collect();
    rel.likes.extend(extra_likes);

    let report = cross_check(&rel, &PipelineOptions::default()).expect("cross check");
    assert!(report.matches, "{report:?}");
}

#[test]
fn sqlite_reference_returns_sorted_output() {
    let rel = generated(11, 0.0);
    let mut db = SqliteReference::open_in_memory().expect("open");
    db.load(&rel).expect("load");
    let sqlite = db.recommendations().expect("query");
    let mut sorted = sqlite.clone();
    sorted.sort();
    assert_eq!(sqlite, sorted);
    assert_eq!(sqlite, recommend(&rel));
}
