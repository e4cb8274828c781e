#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use tastegraph::cli::import_export::{
    load_relations, write_recommendations, write_relations, ExportOptions, ImportConfig,
    RelationSource,
};
use tastegraph::{recommend, Recommendation, Relations, TasteError};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn loads_directory_with_default_names() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "likes.csv", "person,artist\n2,100\n2,101\n");
    write(dir.path(), "dislikes.csv", "person,artist\n3,101\n");
    write(dir.path(), "friends.csv", "person1,person2\n1,2\n3,1\n");

    let (rel, summary) = load_relations(&ImportConfig::in_dir(dir.path())).expect("load");
    assert_eq!(summary.like_rows, 2);
    assert_eq!(summary.dislike_rows, 1);
    assert_eq!(summary.friend_rows, 2);
    assert_eq!(recommend(&rel), vec![Recommendation::new(1, 100)]);
}

#[test]
fn header_lookup_ignores_case_and_column_order() {
    let dir = TempDir::new().expect("tempdir");
    let likes = write(dir.path(), "l.csv", "Artist, PERSON\n100, 2\n");
    let dislikes = write(dir.path(), "d.csv", "person,artist\n");
    let friends = write(dir.path(), "f.csv", "person2,person1\n2,1\n");

    let cfg = ImportConfig {
        likes: RelationSource::likes(likes),
        dislikes: RelationSource::dislikes(dislikes),
        friends: RelationSource::friends(friends),
    };
    let (rel, _) = load_relations(&cfg).expect("load");
    assert_eq!(rel, Relations::new().friend(1, 2).like(2, 100));
}

#[test]
fn headerless_tab_separated_input() {
    let dir = TempDir::new().expect("tempdir");
    let likes = write(dir.path(), "l.tsv", "2\t100\n\n4\t100\n");
    let dislikes = write(dir.path(), "d.tsv", "4\t7\n");
    let friends = write(dir.path(), "f.tsv", "1\t2\n");

    let cfg = ImportConfig {
        likes: RelationSource::likes(likes)
            .with_headers(false)
            .with_delimiter(b'\t'),
        dislikes: RelationSource::dislikes(dislikes)
            .with_headers(false)
            .with_delimiter(b'\t'),
        friends: RelationSource::friends(friends)
            .with_headers(false)
            .with_delimiter(b'\t'),
    };
    let (rel, summary) = load_relations(&cfg).expect("load");
    assert_eq!(summary.like_rows, 2);
    assert_eq!(rel.dislikes.len(), 1);
    assert_eq!(recommend(&rel), vec![Recommendation::new(1, 100)]);
}

#[test]
fn custom_column_names() {
    let dir = TempDir::new().expect("tempdir");
    let likes = write(dir.path(), "l.csv", "user,band\n2,9\n");
    let dislikes = write(dir.path(), "d.csv", "user,band\n");
    let friends = write(dir.path(), "f.csv", "a,b\n1,2\n");
    let cfg = ImportConfig {
        likes: RelationSource::likes(likes).with_columns("user", "band"),
        dislikes: RelationSource::dislikes(dislikes).with_columns("user", "band"),
        friends: RelationSource::friends(friends).with_columns("a", "b"),
    };
    let (rel, _) = load_relations(&cfg).expect("load");
    assert_eq!(recommend(&rel), vec![Recommendation::new(1, 9)]);
}

#[test]
fn non_integer_cell_reports_file_and_row() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "likes.csv", "person,artist\n1,2\n3,abc\n");
    write(dir.path(), "dislikes.csv", "person,artist\n");
    write(dir.path(), "friends.csv", "person1,person2\n");

    let err = load_relations(&ImportConfig::in_dir(dir.path())).unwrap_err();
    match err {
        TasteError::InvalidRow { path, row, .. } => {
            assert!(path.ends_with("likes.csv"));
            assert_eq!(row, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_column_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "likes.csv", "person,song\n1,2\n");
    write(dir.path(), "dislikes.csv", "person,artist\n");
    write(dir.path(), "friends.csv", "person1,person2\n");
    assert!(load_relations(&ImportConfig::in_dir(dir.path())).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    assert!(load_relations(&ImportConfig::in_dir(dir.path())).is_err());
}

#[test]
fn relations_written_then_loaded_give_same_recommendations() {
    let dir = TempDir::new().expect("tempdir");
    let rel = Relations::new()
        .friend(1, 2)
        .friend(2, 3)
        .like(2, 10)
        .like(3, 11)
        .dislike(1, 11);
    let cfg = write_relations(dir.path().join("data"), &rel).expect("write");
    let (loaded, _) = load_relations(&cfg).expect("load");
    assert_eq!(loaded, rel);
}

#[test]
fn recommendations_file_has_header_and_sorted_rows() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("nested/out.csv");
    let recs = vec![Recommendation::new(1, 5), Recommendation::new(2, 3)];
    let rows = write_recommendations(&out, &recs, &ExportOptions::default()).expect("write");
    assert_eq!(rows, 2);
    let text = fs::read_to_string(&out).expect("read back");
    assert_eq!(text, "person,artist\n1,5\n2,3\n");

    let bare = ExportOptions {
        header: false,
        ..ExportOptions::default()
    };
    write_recommendations(&out, &recs, &bare).expect("rewrite");
    assert_eq!(fs::read_to_string(&out).expect("read"), "1,5\n2,3\n");
}
