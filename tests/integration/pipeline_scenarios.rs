#![allow(missing_docs)]

use tastegraph::pipeline::{aggregate, explain, propagate, symmetrize, OpinionIndex, Verdict};
use tastegraph::{
    recommend, ArtistId, Pipeline, PipelineOptions, PersonId, Polarity, Recommendation, Relations,
};

#[test]
fn single_friend_like_is_recommended() {
    let rel = Relations::new().friend(1, 2).like(2, 100);
    assert_eq!(recommend(&rel), vec![Recommendation::new(1, 100)]);
}

#[test]
fn one_dislike_suppresses_any_number_of_likes() {
    let rel = Relations::new()
        .friend(1, 2)
        .friend(1, 3)
        .like(2, 100)
        .dislike(3, 100);
    assert!(!recommend(&rel).contains(&Recommendation::new(1, 100)));

    let exp = explain(&rel, PersonId(1), ArtistId(100));
    assert_eq!(exp.verdict, Verdict::SuppressedByDislike);
    assert_eq!(exp.liked_by, vec![PersonId(2)]);
    assert_eq!(exp.disliked_by, vec![PersonId(3)]);
}

#[test]
fn own_like_overrides_friend_signal() {
    let rel = Relations::new().friend(1, 2).like(1, 100).like(2, 100);
    assert!(!recommend(&rel).contains(&Recommendation::new(1, 100)));
}

#[test]
fn friendship_propagates_in_both_directions() {
    let rel = Relations::new().friend(2, 1).like(1, 7).like(2, 8);
    assert_eq!(
        recommend(&rel),
        vec![Recommendation::new(1, 8), Recommendation::new(2, 7)]
    );
}

#[test]
fn reversed_duplicate_friendship_adds_no_edges() {
    let once = Relations::new().friend(1, 2).like(2, 5);
    let twice = Relations::new().friend(1, 2).friend(2, 1).like(2, 5);

    let (g1, _) = symmetrize(&once.friends);
    let (g2, _) = symmetrize(&twice.friends);
    assert_eq!(g1.edge_count(), 2);
    assert_eq!(g2.edge_count(), 2);
    assert_eq!(recommend(&once), recommend(&twice));
}

#[test]
fn duplicate_rows_are_idempotent() {
    let base = Relations::new()
        .friend(1, 2)
        .friend(1, 3)
        .like(2, 10)
        .like(3, 11)
        .dislike(2, 11);
    let mut doubled = base.clone();
    doubled.likes.extend(base.likes.clone());
    doubled.dislikes.extend(base.dislikes.clone());
    doubled.friends.extend(base.friends.clone());
    assert_eq!(recommend(&base), recommend(&doubled));
}

#[test]
fn repeated_runs_agree() {
    let rel = Relations::new()
        .friend(1, 2)
        .friend(2, 3)
        .friend(3, 1)
        .like(1, 10)
        .like(2, 11)
        .dislike(3, 10)
        .like(3, 12);
    for partitions in [1, 4] {
        let pipeline = Pipeline::new(PipelineOptions::default().partitions(partitions));
        let first = pipeline.run(&rel);
        let second = pipeline.run(&rel);
        assert!(!first.recommendations.is_empty());
        assert_eq!(first.recommendations, second.recommendations);
        assert_eq!(first.aggregates, second.aggregates);
    }
}

#[test]
fn recommendations_never_include_opinions_or_disliked_pairs() {
    let rel = Relations::new()
        .friend(1, 2)
        .friend(2, 3)
        .friend(3, 4)
        .friend(4, 1)
        .like(1, 1)
        .like(2, 2)
        .like(3, 3)
        .like(4, 4)
        .dislike(2, 4)
        .dislike(1, 3)
        .like(3, 1);

    let index = OpinionIndex::build(&rel);
    let (graph, _) = symmetrize(&rel.friends);
    let aggregates = aggregate(&propagate(&graph, &index));
    for rec in recommend(&rel) {
        assert!(!index.has_opinion(rec.person, rec.artist), "{rec:?}");
        assert!(!aggregates.should_dislike.contains(&(rec.person, rec.artist)));
        assert!(aggregates.should_like.contains(&(rec.person, rec.artist)));
    }
}

#[test]
fn only_direct_friends_contribute() {
    // 1 - 2 - 3: person 3's taste does not reach person 1
    let rel = Relations::new().friend(1, 2).friend(2, 3).like(3, 9);
    assert_eq!(recommend(&rel), vec![Recommendation::new(2, 9)]);
}

#[test]
fn conflicting_friend_suppresses_its_own_like() {
    let rel = Relations::new().friend(1, 2).like(2, 50).dislike(2, 50);
    assert!(recommend(&rel).is_empty());
    assert_eq!(
        explain(&rel, PersonId(1), ArtistId(50)).verdict,
        Verdict::SuppressedByDislike
    );
}

#[test]
fn self_friendship_contributes_nothing() {
    let rel = Relations::new().friend(4, 4).like(4, 1);
    let out = Pipeline::new(PipelineOptions::default()).run(&rel);
    assert!(out.recommendations.is_empty());
    assert_eq!(out.stats.symmetrize.self_loops_dropped, 1);
}

#[test]
fn trace_reports_every_propagated_opinion() {
    let rel = Relations::new()
        .friend(1, 2)
        .friend(1, 3)
        .like(2, 100)
        .dislike(3, 100)
        .dislike(3, 200);
    let out = Pipeline::new(PipelineOptions::default().keep_trace(true)).run(&rel);
    let trace = out.trace.expect("trace requested");
    assert_eq!(trace.of(Polarity::Like).len(), 1);
    // person 3 dislikes 100 and 200, both reach person 1; person 2 holds no opinion on them
    assert_eq!(trace.of(Polarity::Dislike).len(), 2);
    assert_eq!(out.stats.suppressed, 1);
    assert!(out.recommendations.is_empty());
}

#[test]
fn partition_count_does_not_change_output() {
    let rel = Relations::new()
        .friend(1, 2)
        .friend(2, 3)
        .friend(3, 4)
        .friend(5, 1)
        .like(2, 1)
        .like(3, 2)
        .like(4, 3)
        .dislike(5, 2)
        .like(-6, 4)
        .friend(-6, 5);
    let expected = Pipeline::new(PipelineOptions::default()).run(&rel).recommendations;
    for partitions in [0, 2, 3, 7, 64] {
        let got = Pipeline::new(PipelineOptions::default().partitions(partitions))
            .run(&rel)
            .recommendations;
        assert_eq!(got, expected, "partitions={partitions}");
    }
}

#[test]
fn empty_input_yields_nothing() {
    assert!(recommend(&Relations::new()).is_empty());
}
