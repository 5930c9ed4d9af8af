use assert_cmd::Command;
use predicates::prelude::*;

fn zima() -> Command {
    Command::cargo_bin("zima").unwrap()
}

#[test]
fn version_prints_package_and_version() {
    zima()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zima_cli"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_subcommands() {
    zima()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("license"))
        .stdout(predicate::str::contains("account"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn license_create_requires_owner() {
    zima()
        .args(["license", "create", "--scope", "read"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--owner"));
}

#[test]
fn unknown_role_is_rejected_before_connecting() {
    zima()
        .args(["account", "set-role", "a@x.com", "root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role 'root'"));
}

#[test]
fn unknown_plan_is_rejected_before_connecting() {
    zima()
        .args(["license", "create", "--owner", "b@x.com", "--plan", "enterprise"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown plan 'enterprise'"));
}

#[test]
fn license_days_follow_the_server_default_variable() {
    zima()
        .args(["license", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LICENSE_DEFAULT_TTL_DAYS"));

    zima()
        .args(["license", "create", "--owner", "b@x.com"])
        .env("LICENSE_DEFAULT_TTL_DAYS", "soon")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--days"));
}

#[test]
fn unreachable_database_fails_cleanly() {
    zima()
        .args(["license", "list", "--database-url", "postgres://127.0.0.1:1/zima"])
        .env_remove("DATABASE_URL")
        .assert()
        .failure()
        .code(1);
}
