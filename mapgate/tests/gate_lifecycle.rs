//! Gate behavior against a real gen-srg project: sidecar loss, input edits
//! and tampered outputs.

use std::fs;

use mapgate::core::descriptor::WorkItem;
use mapgate::gen_srg::GenSrg;
use mapgate::io::gate::{CacheGate, CacheOptions, GateDecision};
use mapgate::run::run_cached;
use mapgate::test_support::{read, write_fixture};

fn built(root: &std::path::Path) -> (GenSrg, CacheGate<GenSrg>) {
    let item = write_fixture(root);
    let gate = CacheGate::new();
    run_cached(&item, &gate, &CacheOptions::default()).expect("initial run");
    (item, gate)
}

#[test]
fn committed_outputs_are_up_to_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (item, gate) = built(temp.path());

    assert!(!gate.should_run(&item, &CacheOptions::default()));
    for output in GenSrg::descriptor().outputs() {
        let sidecar = output.path(&item).with_extension("srg.sha256");
        assert_eq!(read(&sidecar).lines().count(), 4, "output + three inputs");
    }
}

#[test]
fn deleted_sidecar_removes_orphaned_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (item, gate) = built(temp.path());
    fs::remove_file(item.mcp_to_srg.with_extension("srg.sha256")).expect("remove sidecar");

    let decision = gate.decide(&item, &CacheOptions::default());
    assert!(matches!(
        decision,
        GateDecision::MissingSidecar { output: "mcp_to_srg", .. }
    ));
    assert!(!item.mcp_to_srg.exists());
}

#[test]
fn one_byte_input_change_forces_rerun() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (item, gate) = built(temp.path());

    let mut bytes = fs::read(&item.in_srg).expect("read table");
    bytes.push(b'\n');
    fs::write(&item.in_srg, bytes).expect("write table");

    let decision = gate.decide(&item, &CacheOptions::default());
    assert!(matches!(decision, GateDecision::Corrupted { .. }));
    assert!(!item.notch_to_mcp.exists());
    assert!(!item.notch_to_mcp.with_extension("srg.sha256").exists());
}

#[test]
fn tampered_output_forces_rerun_and_is_regenerated() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (item, gate) = built(temp.path());
    let original = read(&item.mcp_to_notch);
    fs::write(&item.mcp_to_notch, "CL: hand/edited x\n").expect("tamper");

    let outcome = run_cached(&item, &gate, &CacheOptions::default()).expect("rerun");
    assert!(outcome.ran());
    assert_eq!(read(&item.mcp_to_notch), original);
    assert!(!gate.should_run(&item, &CacheOptions::default()));
}

#[test]
fn missing_dictionary_is_reported_not_trusted() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (item, gate) = built(temp.path());
    fs::remove_file(&item.dictionaries.fields_csv).expect("remove fields");

    let decision = gate.decide(&item, &CacheOptions::default());
    assert!(matches!(decision, GateDecision::Failed { .. }));
    assert!(decision.should_run());
}

#[test]
fn disabled_options_always_run() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (item, gate) = built(temp.path());
    assert_eq!(
        gate.decide(&item, &CacheOptions::disabled()),
        GateDecision::Disabled
    );
}
