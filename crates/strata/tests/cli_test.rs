use assert_cmd::Command;
use predicates::prelude::*;

fn strata() -> Command {
    Command::cargo_bin("strata").unwrap()
}

#[test]
fn help_lists_subcommands() {
    strata()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("diff"));
}

#[test]
fn order_prints_network_before_server() {
    let output = strata().arg("order").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let network = stdout.find("network").expect("network listed");
    let server = stdout.find("server").expect("server listed");
    assert!(network < server);
}

#[test]
fn synth_writes_one_artifact_per_stack() {
    let dir = tempfile::tempdir().unwrap();
    strata()
        .arg("synth")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synthesis complete"));

    assert!(dir.path().join("manifest.json").exists());
    assert!(dir.path().join("network.json").exists());
    assert!(dir.path().join("server.json").exists());
}

#[test]
fn repeated_synth_is_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    strata()
        .arg("synth")
        .arg("--out-dir")
        .arg(first.path())
        .assert()
        .success();
    strata()
        .arg("synth")
        .arg("--out-dir")
        .arg(second.path())
        .assert()
        .success();

    for file in ["manifest.json", "network.json", "server.json"] {
        let a = std::fs::read(first.path().join(file)).unwrap();
        let b = std::fs::read(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}

#[test]
fn server_artifact_is_fully_resolved() {
    let dir = tempfile::tempdir().unwrap();
    strata()
        .arg("synth")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();

    let server: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("server.json")).unwrap())
            .unwrap();
    let rendered = server.to_string();
    assert!(rendered.contains("subnet-network-publicsubnet-az1"));
    // Symbolic handles never reach the artifact.
    assert!(!rendered.contains("#vpc_id"));
}

#[test]
fn diff_against_fresh_synthesis_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    strata()
        .arg("synth")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();
    strata()
        .arg("diff")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 to create, 0 to update, 0 to delete"));
}

#[test]
fn diff_without_previous_assembly_plans_creates() {
    let dir = tempfile::tempdir().unwrap();
    strata()
        .arg("diff")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("planning from scratch"))
        .stdout(predicate::str::contains("0 to delete, 0 unchanged"));
}
