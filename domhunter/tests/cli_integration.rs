// domhunter/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CREDENTIAL_VARS: [&str; 4] = [
    "INTERNETBS_API_KEY",
    "INTERNETBS_PASSWORD",
    "GOOGLE_API_KEY",
    "GOOGLE_CX",
];

const DH_VARS: [&str; 8] = [
    "DH_CONCURRENCY",
    "DH_MAX_ARCHIVES",
    "DH_SNAPSHOT_LIMIT",
    "DH_TIMEOUT",
    "DH_DOWNLOAD_DELAY_MS",
    "DH_OVERWRITE",
    "DH_NO_WWW",
    "DH_CONFIG",
];

/// A command isolated from the caller's credentials, config files and `.env`.
fn isolated_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("domhunter").unwrap();
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env_remove("RUST_LOG");
    for var in CREDENTIAL_VARS.iter().chain(DH_VARS.iter()) {
        cmd.env_remove(var);
    }
    cmd
}

fn with_dummy_credentials(cmd: &mut Command) -> &mut Command {
    for var in CREDENTIAL_VARS {
        cmd.env(var, "dummy");
    }
    cmd
}

fn write_domains(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("domains.txt");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("domhunter").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--domains"))
        .stdout(predicate::str::contains("--max-archives"))
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--no-www"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("domhunter").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_domains_flag_is_required() {
    let dir = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--domains"));
}

#[test]
fn test_missing_credentials_exit_code() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");

    let mut cmd = isolated_cmd(dir.path());
    cmd.env("GOOGLE_CX", "engine")
        .args(["--domains", &domains]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("INTERNETBS_API_KEY"))
        .stderr(predicate::str::contains("GOOGLE_API_KEY"))
        .stderr(predicate::str::contains("GOOGLE_CX").not());
}

#[test]
fn test_blank_credentials_count_as_missing() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd)
        .env("GOOGLE_CX", "   ")
        .args(["--domains", &domains]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("GOOGLE_CX"));
}

#[test]
fn test_credentials_from_dotenv_file() {
    let dir = TempDir::new().unwrap();
    // Credentials satisfied by .env; the missing input file is the next failure
    fs::write(
        dir.path().join(".env"),
        "INTERNETBS_API_KEY=k\nINTERNETBS_PASSWORD=p\nGOOGLE_API_KEY=g\nGOOGLE_CX=c\n",
    )
    .unwrap();

    let mut cmd = isolated_cmd(dir.path());
    cmd.args(["--domains", "missing.txt"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_missing_domains_file() {
    let dir = TempDir::new().unwrap();

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd).args(["--domains", "does-not-exist.txt"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist.txt"));
}

#[test]
fn test_domains_file_without_valid_entries() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "# nothing here\n\n   \nnot_a_domain\n");

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd).args(["--domains", &domains]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("No valid domains"));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[defaults]\nconcurrency = 500\n").unwrap();

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd).args([
        "--domains",
        &domains,
        "--config",
        &config.to_string_lossy(),
    ]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Concurrency must be between 1 and 100"));
}

#[test]
fn test_invalid_discovered_config_file() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");
    fs::write(dir.path().join("domhunter.toml"), "[defaults\n").unwrap();

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd).args(["--domains", &domains]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("TOML"));
}

#[test]
fn test_config_path_from_environment() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd)
        .env("DH_CONFIG", dir.path().join("absent.toml"))
        .args(["--domains", &domains]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_invalid_timeout_flag() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");

    let mut cmd = isolated_cmd(dir.path());
    with_dummy_credentials(&mut cmd).args(["--domains", &domains, "--timeout", "soon"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid timeout"));
}

#[test]
fn test_concurrency_out_of_range_rejected() {
    let dir = TempDir::new().unwrap();
    let domains = write_domains(&dir, "example.com\n");

    let mut cmd = isolated_cmd(dir.path());
    cmd.args(["--domains", &domains, "--concurrency", "0"]);

    cmd.assert().failure();
}
