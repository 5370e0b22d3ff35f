use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const HEX: &str = "3e5f49798de239da5d8f80b4dc300204d37613e4203a3f7b877c04a88c81856b";
const TONCX: &str = "https://ton.cx/tx/47670702000009:Pl9JeY3iOdpdj4C03DACBNN2E+QgOj97h3wEqIyBhWs=:EQDa4VOnTYlLvDJ0gZjNYm5PXfSmmtL6Vs6A_CZEtXCNICq_";

const VM_LOG: &str = "\
code cell hash: 00 offset: 0
stack: [ ]
execute SETCP 0
stack: [ ]
execute PUSHINT 1000000000
stack: [ 1000000000 ]
execute NULL
stack: [ 1000000000 () ]
";

fn ton_replay() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("ton-replay").unwrap();
    cmd.env_remove("TON_EMULATOR_BIN")
        .env_remove("TON_REPLAY_ON_HASH_MISMATCH")
        .env_remove("RUST_LOG");
    cmd
}

fn vm_log_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(VM_LOG.as_bytes()).unwrap();
    file
}

#[test]
fn test_help_lists_subcommands() {
    ton_replay()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("links"))
        .stdout(predicate::str::contains("trace"));
}

#[test]
fn test_trace_json_output() {
    let file = vm_log_file();
    let output = ton_replay()
        .arg("--json")
        .arg("trace")
        .arg(file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["instruction"], "SETCP 0");
    assert_eq!(entries[1]["instruction"], "PUSHINT 1000000000");
    assert_eq!(entries[1]["stack_after"][0]["type"], "int");
    assert_eq!(entries[2]["stack_after"][1]["type"], "null");
}

#[test]
fn test_trace_human_output() {
    let file = vm_log_file();
    ton_replay()
        .arg("trace")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Trace: 3 instructions"))
        .stdout(predicate::str::contains("PUSHINT 1000000000"));
}

#[test]
fn test_trace_missing_file() {
    ton_replay()
        .args(["trace", "/nonexistent/vm.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_replay_requires_emulator() {
    ton_replay()
        .args(["replay", HEX])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TON_EMULATOR_BIN"));
}

#[test]
fn test_replay_error_as_json() {
    let output = ton_replay()
        .args(["--json", "replay", HEX])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    let stderr = String::from_utf8(output).unwrap();
    let start = stderr.find('{').unwrap();
    let json: serde_json::Value = serde_json::from_str(&stderr[start..]).unwrap();
    assert_eq!(json["kind"], "emulator");
}

#[test]
fn test_replay_rejects_unknown_policy() {
    ton_replay()
        .args(["replay", HEX, "--on-hash-mismatch", "ignore"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("continue"));
}

#[test]
fn test_links_for_complete_reference_work_offline() {
    ton_replay()
        .args(["links", TONCX])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "https://tonviewer.com/transaction/{}",
            HEX
        )))
        .stdout(predicate::str::contains(
            "0:dae153a74d894bbc32748198cd626e4f5df4a69ad2fa56ce80fc2644b5708d20",
        ));
}

#[test]
fn test_links_testnet() {
    let output = ton_replay()
        .args(["--testnet", "--json", "links", TONCX])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["identity"]["lt"], 47670702000009u64);
    assert!(json["links"]["tonviewer"]
        .as_str()
        .unwrap()
        .starts_with("https://testnet.tonviewer.com/"));
}

#[test]
fn test_unrecognized_reference() {
    ton_replay()
        .args(["links", "definitely not a transaction"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
