use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("attrbox_cli"))
}

#[test]
fn build_then_inspect() {
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("evt.attr");
    let out = out.to_str().unwrap();

    cli_cmd()
        .args([
            "build", "--tag", "evt", "--set", "code:int=404", "--set", "msg:string=not found",
            "--set", "blob:bytearray=00ff10", "--out", out,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    cli_cmd()
        .args(["info", out])
        .assert()
        .success()
        .stdout(predicate::str::contains("tag       : evt"))
        .stdout(predicate::str::contains("attributes: 3"));

    cli_cmd()
        .args(["get", out, "--key", "code", "--as", "int"])
        .assert()
        .success()
        .stdout("404\n");

    cli_cmd()
        .args(["get", out, "--key", "missing", "--as", "int"])
        .assert()
        .success()
        .stdout("0\n");

    cli_cmd()
        .args(["get", out, "--key", "blob", "--as", "bytearray"])
        .assert()
        .success()
        .stdout("00ff10\n");

    cli_cmd()
        .args(["dump", out])
        .assert()
        .success()
        .stdout(predicate::str::contains("msg (string): \"not found\""));

    cli_cmd()
        .args(["dump", out, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key\": \"code\""))
        .stdout(predicate::str::contains("\"value\": \"00ff10\""));
}

#[test]
fn flagged_readonly_container() {
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("ro.attr");
    let out = out.to_str().unwrap();

    cli_cmd()
        .args(["build", "--tag", "cfg", "--set", "x:bool=true", "--readonly", "--flagged", "--out", out])
        .assert()
        .success();

    cli_cmd()
        .args(["info", out, "--flagged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("readonly  : true"));

    // without --flagged the prefix is read as a length field
    cli_cmd().args(["info", out]).assert().failure();
}

#[test]
fn readonly_build_writes_flag_bytes() {
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("ro.attr");
    let out = out.to_str().unwrap();

    cli_cmd()
        .args(["build", "--tag", "cfg", "--set", "x:bool=true", "--readonly", "--out", out])
        .assert()
        .success();

    cli_cmd()
        .args(["info", out, "--flagged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("readonly  : true"));
}

#[test]
fn build_with_config_and_bad_input() {
    let tmp = tempdir().expect("tempdir");
    let cfg = tmp.path().join("cfg.json");
    std::fs::write(&cfg, r#"{"growth":"amortized","initial_capacity":128}"#).unwrap();
    let out = tmp.path().join("c.attr");

    cli_cmd()
        .args(["build", "--tag", "t", "--set", "n:uint16=8080"])
        .arg("--config")
        .arg(&cfg)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    cli_cmd()
        .args(["build", "--tag", "t", "--set", "n:byte=999"])
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad value"));
}
