//! End-to-end CLI behaviour tests for `rpmship`.
//!
//! These scenarios run the binary with a CI-style environment. Only
//! `--dry-run` and configuration failures are exercised, so no packaging
//! tools need to be installed.

mod support;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::collections::HashMap;
use std::process::{Command, Output};
use support::Sandbox;

/// Variables the binary reads; all are cleared before each run.
const CI_VARS: [&str; 7] = [
    "WORKSPACE",
    "HOME",
    "RELEASEVERSION",
    "PACKAGEPREFIX",
    "PACKAGEDIST",
    "RPMSHIP_PUBLISH_DIR",
    "RPMSHIP_CONFIG",
];

#[derive(Default)]
struct CliWorld {
    sandbox: Option<Sandbox>,
    env: HashMap<String, String>,
    output: Option<Output>,
}

#[fixture]
fn cli_world() -> CliWorld {
    CliWorld::default()
}

fn stderr(cli_world: &CliWorld) -> String {
    let output = cli_world.output.as_ref().expect("output not set");
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn run_rpmship(cli_world: &mut CliWorld, args: &[&str]) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rpmship"));
    for var in CI_VARS {
        cmd.env_remove(var);
    }
    cmd.envs(&cli_world.env);
    cmd.args(args);
    let output = cmd.output().expect("failed to run rpmship");
    cli_world.output = Some(output);
}

#[given("a CI environment for project \"{project}\" declaring version \"{version}\"")]
fn given_ci_environment(cli_world: &mut CliWorld, project: String, version: String) {
    let sandbox = Sandbox::new(&project, &version);
    cli_world.env = HashMap::from([
        ("WORKSPACE".to_owned(), sandbox.workspace.to_string()),
        ("HOME".to_owned(), sandbox.home.to_string()),
        ("RELEASEVERSION".to_owned(), "42".to_owned()),
        (
            "RPMSHIP_PUBLISH_DIR".to_owned(),
            sandbox.publish_dir.to_string(),
        ),
    ]);
    cli_world.sandbox = Some(sandbox);
}

#[given("RELEASEVERSION is unset")]
fn given_release_unset(cli_world: &mut CliWorld) {
    cli_world.env.remove("RELEASEVERSION");
}

#[given("WORKSPACE is \"{value}\"")]
fn given_workspace_value(cli_world: &mut CliWorld, value: String) {
    cli_world.env.insert("WORKSPACE".to_owned(), value);
}

#[when("rpmship is run with \"{flag}\"")]
fn when_run_with(cli_world: &mut CliWorld, flag: String) {
    let project = cli_world
        .sandbox
        .as_ref()
        .expect("sandbox not set")
        .project
        .clone();
    run_rpmship(cli_world, &[&project, &flag]);
}

#[when("rpmship is run for spec \"{spec}\" with \"{flag}\"")]
fn when_run_for_spec(cli_world: &mut CliWorld, spec: String, flag: String) {
    run_rpmship(cli_world, &[&spec, &flag]);
}

#[then("the CLI exits successfully")]
fn then_cli_exits_successfully(cli_world: &mut CliWorld) {
    let output = cli_world.output.as_ref().expect("output not set");
    assert!(
        output.status.success(),
        "expected success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[then("the CLI exits with an error")]
fn then_cli_exits_with_error(cli_world: &mut CliWorld) {
    let output = cli_world.output.as_ref().expect("output not set");
    assert_eq!(
        output.status.code(),
        Some(1),
        "expected exit code 1, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[then("stderr contains \"{text}\"")]
fn then_stderr_contains(cli_world: &mut CliWorld, text: String) {
    let captured = stderr(cli_world);
    assert!(captured.contains(&text), "unexpected stderr: {captured}");
}

#[then("no rpmbuild tree was created")]
fn then_no_rpmbuild_tree(cli_world: &mut CliWorld) {
    let sandbox = cli_world.sandbox.as_ref().expect("sandbox not set");
    assert!(!sandbox.rpmbuild_dir().exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/cli.feature",
    name = "Dry run lists the expected packages"
)]
fn scenario_dry_run(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "A missing release identifier is a configuration error"
)]
fn scenario_missing_release(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "A workspace at the filesystem root is refused"
)]
fn scenario_root_workspace(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "A missing spec file is reported"
)]
fn scenario_missing_spec(cli_world: CliWorld) {
    let _ = cli_world;
}
