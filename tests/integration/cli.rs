//! The `breadcrumbs` binary end to end

use assert_cmd::Command;
use breadcrumbs_cli::test_utils::fixtures::{CENTOS7_CONFIG_TOML, CENTOS7_TEMPLATE};
use breadcrumbs_cli::utils::hash_bytes;
use predicates::prelude::*;

use crate::common::TestProject;

fn centos7_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_file("centos7.json", CENTOS7_TEMPLATE).unwrap();
    project.write_file("breadcrumbs.toml", CENTOS7_CONFIG_TOML).unwrap();
    project
}

#[test]
fn test_manifest_from_config_file() {
    let project = centos7_project();
    let head = project.commit_all("init").unwrap();

    let output = project.run_breadcrumbs(&["--config", "breadcrumbs.toml", "manifest"]).unwrap();
    output.assert_success();

    let manifest: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(manifest["git_revision"], head.as_str());
    assert_eq!(manifest["packer_build_name"], "centos7");
    assert_eq!(manifest["packer_user_variables"]["version"], "0.0.1");
    assert_eq!(manifest["found_files"].as_array().unwrap().len(), 6);
    assert!(manifest.get("os_name").is_none());
}

#[test]
fn test_flags_override_config_file() {
    let project = centos7_project();
    project.commit_all("init").unwrap();

    let output = project
        .run_breadcrumbs(&[
            "--config",
            "breadcrumbs.toml",
            "--suffix",
            ".sh",
            "--var",
            "version=2.0",
            "--build-name",
            "override",
            "manifest",
        ])
        .unwrap();
    output.assert_success();

    let manifest: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(manifest["packer_build_name"], "override");
    assert_eq!(manifest["packer_user_variables"]["version"], "2.0");
    assert_eq!(manifest["include_suffixes"], serde_json::json!([".sh"]));
    assert_eq!(manifest["found_files"].as_array().unwrap().len(), 3);
}

#[test]
fn test_config_prints_validated_configuration() {
    let project = centos7_project();

    Command::cargo_bin("breadcrumbs")
        .unwrap()
        .current_dir(project.project_path())
        .env_remove("BREADCRUMBS_CONFIG")
        .args(["--config", "breadcrumbs.toml", "config"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n    \""))
        .stdout(predicate::str::contains("\"upload_dir_path\": \"/\""))
        .stdout(predicate::str::contains("\"save_file_size_bytes\": 100000"))
        .stdout(predicate::str::ends_with("}\n"));
}

#[test]
fn test_config_path_from_environment() {
    let project = centos7_project();

    Command::cargo_bin("breadcrumbs")
        .unwrap()
        .current_dir(project.project_path())
        .env("BREADCRUMBS_CONFIG", "breadcrumbs.toml")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"packer_build_name\": \"centos7\""));
}

#[test]
fn test_create_writes_breadcrumbs() {
    let project = TestProject::new().unwrap();
    project.write_file("http/ks.ks", "kickstart").unwrap();
    project.write_file("scripts/setup.sh", "#!/bin/sh\n").unwrap();
    project
        .write_file(
            "packer.json",
            "{\n  \"ks\": \"http/ks.ks\",\n  \"scripts\": [\"scripts/setup.sh\"]\n}\n",
        )
        .unwrap();
    project.commit_all("init").unwrap();

    let out = project.output_path().join("crumbs");
    let out_arg = out.to_string_lossy().into_owned();
    let output = project
        .run_breadcrumbs(&[
            "--template",
            "packer.json",
            "-s",
            ".ks",
            "-s",
            ".sh",
            "create",
            "--output",
            &out_arg,
        ])
        .unwrap();
    output.assert_success();

    assert_eq!(output.stdout.trim(), out_arg);
    assert!(out.join("breadcrumbs.json").is_file());
    assert!(out.join(hash_bytes(b"packer.json")).is_file());
    assert_eq!(std::fs::read_to_string(out.join(hash_bytes(b"http/ks.ks"))).unwrap(), "kickstart");
    assert_eq!(
        std::fs::read_to_string(out.join(hash_bytes(b"scripts/setup.sh"))).unwrap(),
        "#!/bin/sh\n"
    );
}

#[test]
fn test_create_fails_on_oversized_file() {
    let project = TestProject::new().unwrap();
    project.write_file("big.ks", &"x".repeat(64)).unwrap();
    project.write_file("packer.json", "{\"ks\": \"big.ks\"}").unwrap();
    project.commit_all("init").unwrap();

    let out = project.output_path().join("crumbs");
    let out_arg = out.to_string_lossy().into_owned();
    project
        .run_breadcrumbs(&[
            "--template",
            "packer.json",
            "--suffix",
            ".ks",
            "--save-file-size-bytes",
            "32",
            "create",
            "--output",
            &out_arg,
        ])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("File 'big.ks' exceeds maximum size of 32 byte(s)")
        .assert_stderr_contains("save_file_size_bytes");
}

#[test]
fn test_missing_template_path_is_reported() {
    let project = TestProject::new().unwrap();

    project
        .run_breadcrumbs(&["--suffix", ".ks", "config"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Configuration error");
}

#[test]
fn test_template_over_size_limit() {
    let project = centos7_project();
    project.commit_all("init").unwrap();

    project
        .run_breadcrumbs(&["--config", "breadcrumbs.toml", "--template-size-bytes", "10", "manifest"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("size exceeds maximum size of 10 byte(s)");
}

#[cfg(unix)]
#[test]
fn test_provision_into_target_root() {
    let project = TestProject::new().unwrap();
    project.write_file("http/ks.ks", "kickstart").unwrap();
    project.write_file("packer.json", "{\"ks\": \"http/ks.ks\"}").unwrap();
    project.commit_all("init").unwrap();

    let target = project.output_path().join("target");
    let target_arg = target.to_string_lossy().into_owned();
    project
        .run_breadcrumbs(&[
            "--template",
            "packer.json",
            "--suffix",
            ".ks",
            "--upload-dir",
            "/var/lib",
            "provision",
            "--target-root",
            &target_arg,
        ])
        .unwrap()
        .assert_success();

    let uploaded = target.join("var/lib/breadcrumbs");
    assert!(uploaded.join("breadcrumbs.json").is_file());
    assert_eq!(std::fs::read_to_string(uploaded.join(hash_bytes(b"http/ks.ks"))).unwrap(), "kickstart");
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("breadcrumbs")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("provision"));
}

#[test]
fn test_locator_tie_is_logged_by_default() {
    let project = TestProject::new().unwrap();
    project.write_file("a/ks.ks", "first").unwrap();
    project.write_file("b/ks.ks", "second").unwrap();
    project.write_file("packer.json", "{\"ks\": \"{{ user `x` }}/ks.ks\"}").unwrap();
    project.commit_all("init").unwrap();

    let output = project
        .run_breadcrumbs(&["--template", "packer.json", "--suffix", ".ks", "manifest"])
        .unwrap();
    output
        .assert_success()
        .assert_stderr_contains("WARN")
        .assert_stderr_contains("Found 2 files named 'ks.ks'");

    let manifest: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(manifest["found_files"][0]["found_at_path"], "a/ks.ks");
}

#[test]
fn test_create_logs_milestone_by_default() {
    let project = TestProject::new().unwrap();
    project.write_file("a.ks", "ks").unwrap();
    project.write_file("packer.json", "{\"ks\": \"a.ks\"}").unwrap();
    project.commit_all("init").unwrap();

    let out = project.output_path().join("crumbs");
    let out_arg = out.to_string_lossy().into_owned();
    project
        .run_breadcrumbs(&["-t", "packer.json", "-s", ".ks", "create", "--output", &out_arg])
        .unwrap()
        .assert_success()
        .assert_stderr_contains("Created 1 breadcrumb(s)");
}

#[test]
fn test_verbose_shows_scanner_decisions() {
    let project = TestProject::new().unwrap();
    project.write_file("packer.json", "{\"ks\": \"a.ks\"}").unwrap();
    project.commit_all("init").unwrap();

    project
        .run_breadcrumbs(&["-v", "-t", "packer.json", "-s", ".ks", "manifest"])
        .unwrap()
        .assert_success()
        .assert_stderr_contains("Found reference 'a.ks'");
}
