//! CLI tests for `mapgate gen-srg` and `mapgate status`.
//!
//! Spawns the mapgate binary and verifies exit codes and the skip behavior
//! across repeated runs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use mapgate::exit_codes;
use mapgate::test_support::{read, write_fixture};

fn mapgate(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mapgate"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("spawn mapgate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn init_writes_config_used_by_gen_srg() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fixture(temp.path());

    let init = mapgate(temp.path(), &["init"]);
    assert_eq!(init.status.code(), Some(exit_codes::OK));
    let config = read(&temp.path().join("mapgate.toml"));
    assert!(config.contains("in_srg = \"conf/joined.srg\""), "{config}");

    let again = mapgate(temp.path(), &["init"]);
    assert!(stdout(&again).contains("pass --force"));

    let run = mapgate(temp.path(), &["gen-srg"]);
    assert_eq!(run.status.code(), Some(exit_codes::OK));
    assert!(temp.path().join("build/srgs/mcp-srg.srg").exists());
}

#[test]
fn second_gen_srg_is_skipped() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fixture(temp.path());

    let first = mapgate(temp.path(), &["gen-srg"]);
    assert_eq!(first.status.code(), Some(exit_codes::OK));
    assert!(stdout(&first).starts_with("gen-srg: ran ("));
    assert!(temp.path().join("build/srgs/notch-mcp.srg.sha256").exists());

    let second = mapgate(temp.path(), &["gen-srg"]);
    assert_eq!(second.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&second).trim(), "gen-srg: up-to-date");
}

#[test]
fn status_reports_stale_then_up_to_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fixture(temp.path());

    let before = mapgate(temp.path(), &["status"]);
    assert_eq!(before.status.code(), Some(exit_codes::STALE));

    mapgate(temp.path(), &["gen-srg"]);
    let after = mapgate(temp.path(), &["status", "--json"]);
    assert_eq!(after.status.code(), Some(exit_codes::OK));
    let report: serde_json::Value = serde_json::from_slice(&after.stdout).expect("json");
    assert_eq!(report["decision"], "up_to_date");
    assert_eq!(report["should_run"], false);
}

#[test]
fn edited_dictionary_triggers_rerun() {
    let temp = tempfile::tempdir().expect("tempdir");
    let item = write_fixture(temp.path());
    mapgate(temp.path(), &["gen-srg"]);

    let mut methods = read(&item.dictionaries.methods_csv);
    methods.push_str("func_70030_z,onEntityUpdate,2,\n");
    fs::write(&item.dictionaries.methods_csv, methods).expect("edit methods");

    let rerun = mapgate(temp.path(), &["gen-srg"]);
    assert_eq!(rerun.status.code(), Some(exit_codes::OK));
    assert!(stdout(&rerun).starts_with("gen-srg: ran ("));
    assert!(read(&item.notch_to_mcp).contains("MD: a/e ()V net/minecraft/src/Entity/onEntityUpdate ()V"));
}

#[test]
fn no_cache_runs_every_time_without_sidecars() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fixture(temp.path());

    for _ in 0..2 {
        let output = mapgate(temp.path(), &["gen-srg", "--no-cache"]);
        assert_eq!(output.status.code(), Some(exit_codes::OK));
        assert!(stdout(&output).contains("caching disabled"));
    }
    assert!(!temp.path().join("build/srgs/notch-mcp.srg.sha256").exists());
}

#[test]
fn malformed_table_exits_invalid_with_location() {
    let temp = tempfile::tempdir().expect("tempdir");
    let item = write_fixture(temp.path());
    fs::write(&item.in_srg, "CL: a net/a\nXX: what\n").expect("write table");

    let output = mapgate(temp.path(), &["gen-srg"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("joined.srg:2"), "stderr: {stderr}");
}

#[test]
fn invalid_config_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fixture(temp.path());
    fs::write(
        temp.path().join("mapgate.toml"),
        "[gen_srg]\nmcp_to_srg = \"build/srgs/notch-mcp.srg\"\n",
    )
    .expect("write config");

    let output = mapgate(temp.path(), &["gen-srg"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn hash_prints_one_token_per_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fixture(temp.path());

    let output = mapgate(temp.path(), &["hash", &temp.path().join("conf").display().to_string()]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let tokens: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|token| token.len() == 64));
}
