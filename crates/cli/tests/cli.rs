use assert_cmd::Command;

#[test]
fn help_runs() {
    Command::cargo_bin("shelf-cli")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn serve_help_runs() {
    Command::cargo_bin("shelf-cli")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}
