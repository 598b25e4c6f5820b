use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn run_dispatches_a_registered_route() {
    cargo_bin_cmd!("routeforge")
        .args(["run", "git", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to commit"));
}

#[test]
fn run_on_unrecognized_command_exits_two() {
    cargo_bin_cmd!("routeforge")
        .args(["run", "frobnicate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no match: unknown command"));
}

#[test]
fn run_with_unknown_option_exits_two_with_reason() {
    cargo_bin_cmd!("routeforge")
        .args(["run", "git", "status", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no match"));
}

#[test]
fn routes_subcommand_lists_every_pattern_with_its_description() {
    cargo_bin_cmd!("routeforge")
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy {env}"))
        .stdout(predicate::str::contains("git status"));
}

#[test]
fn deploy_binds_positional_and_option_parameters() {
    cargo_bin_cmd!("routeforge")
        .args([
            "run", "deploy", "prod", "-f", "--replicas", "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"));
}

#[test]
fn catch_all_forwards_everything_after_end_of_options() {
    cargo_bin_cmd!("routeforge")
        .args(["run", "exec", "--", "--flag", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--flag"));
}
