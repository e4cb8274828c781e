#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

struct Dataset {
    dir: TempDir,
}

impl Dataset {
    fn new(likes: &str, dislikes: &str, friends: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("likes.csv"), format!("person,artist\n{likes}")).expect("likes");
        fs::write(
            dir.path().join("dislikes.csv"),
            format!("person,artist\n{dislikes}"),
        )
        .expect("dislikes");
        fs::write(
            dir.path().join("friends.csv"),
            format!("person1,person2\n{friends}"),
        )
        .expect("friends");
        Self { dir }
    }

    fn basic() -> Self {
        Self::new("2,100\n2,101\n", "3,101\n", "1,2\n1,3\n")
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("cli.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("tastegraph");
        cmd.env("TASTEGRAPH_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("valid json")
}

#[test]
fn recommend_writes_csv_to_stdout() {
    let data = Dataset::basic();
    data.cmd()
        .arg("recommend")
        .arg("--dir")
        .arg(data.path())
        .assert()
        .success()
        .stdout("person,artist\n1,100\n");
}

#[test]
fn recommend_writes_file_with_partitions() {
    let data = Dataset::basic();
    let out = data.path().join("out/recs.csv");
    data.cmd()
        .args(["recommend", "--partitions", "4", "--no-header", "--dir"])
        .arg(data.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&out).expect("output file"), "1,100\n");
}

#[test]
fn recommend_json_includes_stats() {
    let data = Dataset::basic();
    let json = json_stdout(
        data.cmd()
            .args(["--format", "json", "recommend", "--dir"])
            .arg(data.path()),
    );
    assert_eq!(json["recommendations"][0]["person"], 1);
    assert_eq!(json["recommendations"][0]["artist"], 100);
    assert_eq!(json["stats"]["suppressed"], 1);
    assert_eq!(json["stats"]["symmetrize"]["directed_edges"], 4);
}

#[test]
fn explicit_files_override_directory() {
    let data = Dataset::basic();
    let likes = data.path().join("other_likes.csv");
    fs::write(&likes, "person,artist\n3,7\n").expect("likes");
    data.cmd()
        .arg("recommend")
        .arg("--dir")
        .arg(data.path())
        .arg("--likes")
        .arg(&likes)
        .assert()
        .success()
        .stdout("person,artist\n1,7\n");
}

#[test]
fn explain_single_pair() {
    let data = Dataset::basic();
    let json = json_stdout(
        data.cmd()
            .args(["--format", "json", "explain", "--person", "1", "--artist", "101", "--dir"])
            .arg(data.path()),
    );
    assert_eq!(json[0]["verdict"], "suppressed_by_dislike");
    assert_eq!(json[0]["liked_by"][0], 2);
    assert_eq!(json[0]["disliked_by"][0], 3);
}

#[test]
fn explain_person_lists_every_signal() {
    let data = Dataset::basic();
    let json = json_stdout(
        data.cmd()
            .args(["--format", "json", "explain", "--person", "1", "--dir"])
            .arg(data.path()),
    );
    let verdicts: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .map(|e| e["verdict"].as_str().expect("verdict"))
        .collect();
    assert_eq!(verdicts, ["recommended", "suppressed_by_dislike"]);
}

#[test]
fn stats_reports_sections() {
    let data = Dataset::basic();
    let json = json_stdout(
        data.cmd()
            .args(["--format", "json", "stats", "--dir"])
            .arg(data.path()),
    );
    assert_eq!(json["likes"]["rows"], 2);
    assert_eq!(json["friends"]["rows"], 2);
    assert_eq!(json["pipeline"]["recommendations"], 1);
    assert!(json["universe"]["persons"].is_number());
}

#[test]
fn verify_succeeds_on_clean_input() {
    let data = Dataset::basic();
    let json = json_stdout(
        data.cmd()
            .args(["--format", "json", "verify", "--dir"])
            .arg(data.path()),
    );
    assert!(json["success"].as_bool().unwrap_or(false));
}

#[test]
fn verify_strict_fails_on_self_friendship() {
    let data = Dataset::new("2,100\n", "3,101\n", "1,2\n4,4\n");
    data.cmd()
        .args(["verify", "--dir"])
        .arg(data.path())
        .assert()
        .success();
    data.cmd()
        .args(["verify", "--strict", "--dir"])
        .arg(data.path())
        .assert()
        .code(2);
}

#[test]
fn verify_fails_on_empty_input() {
    let data = Dataset::new("", "", "");
    data.cmd()
        .args(["verify", "--dir"])
        .arg(data.path())
        .assert()
        .code(2);
}

#[test]
fn check_agrees_with_sqlite() {
    let data = Dataset::basic();
    let json = json_stdout(
        data.cmd()
            .args(["--format", "json", "check", "--partitions", "2", "--dir"])
            .arg(data.path()),
    );
    assert_eq!(json["matches"], true);
    assert_eq!(json["pipeline_count"], 1);
}

#[test]
fn generate_then_check() {
    let data = Dataset::basic();
    let out_dir = data.path().join("generated");
    data.cmd()
        .args([
            "generate",
            "--seed",
            "7",
            "--people",
            "60",
            "--artists",
            "20",
        ])
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();
    assert!(out_dir.join("likes.csv").exists());
    data.cmd()
        .args(["check", "--dir"])
        .arg(&out_dir)
        .assert()
        .success();
}

#[test]
fn oversized_numbers_fail_cleanly() {
    let data = Dataset::basic();
    data.cmd()
        .args(["recommend", "--partitions", "18446744073709551615", "--dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout("person,artist\n1,100\n");

    let stderr = failure_stderr(
        data.cmd()
            .args(["generate", "--avg-friends", "18446744073709551615", "--out-dir"])
            .arg(data.path().join("generated")),
    );
    assert!(stderr.contains("average friends"), "{stderr}");
}

#[test]
fn missing_input_is_an_error() {
    let data = Dataset::basic();
    let stderr = failure_stderr(data.cmd().arg("recommend"));
    assert!(stderr.contains("no likes file"), "{stderr}");
}

#[test]
fn bad_row_reports_location() {
    let data = Dataset::new("1,x\n", "", "");
    let stderr = failure_stderr(data.cmd().args(["recommend", "--dir"]).arg(data.path()));
    assert!(stderr.contains("likes.csv"), "{stderr}");
}

#[test]
fn saved_default_profile_supplies_inputs() {
    let data = Dataset::basic();
    data.cmd()
        .args(["profile", "save", "basic", "--default", "--partitions", "3", "--dir"])
        .arg(data.path())
        .assert()
        .success();
    assert!(data.config_path().exists());

    data.cmd()
        .arg("recommend")
        .assert()
        .success()
        .stdout("person,artist\n1,100\n");

    let json = json_stdout(data.cmd().args(["--format", "json", "profile", "list"]));
    assert_eq!(json[0]["name"], "basic");
    assert_eq!(json[0]["default"], true);
    assert_eq!(json[0]["partitions"], 3);

    data.cmd()
        .args(["profile", "delete", "basic"])
        .assert()
        .success();
    data.cmd().arg("recommend").assert().code(1);
}

#[test]
fn unknown_profile_is_an_error() {
    let data = Dataset::basic();
    let stderr = failure_stderr(data.cmd().args(["--profile", "nope", "stats"]));
    assert!(stderr.contains("profile 'nope' not found"), "{stderr}");
}

#[test]
fn completions_are_generated() {
    let data = Dataset::basic();
    let output = data
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("tastegraph"));
}

fn failure_stderr(cmd: &mut Command) -> String {
    let output = cmd.assert().code(1).get_output().stderr.clone();
    String::from_utf8_lossy(&output).into_owned()
}
