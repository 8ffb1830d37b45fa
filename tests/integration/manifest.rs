//! Building manifests from templates inside real git repositories

use breadcrumbs_cli::config::PluginConfig;
use breadcrumbs_cli::core::BreadcrumbsError;
use breadcrumbs_cli::git::GitRevision;
use breadcrumbs_cli::manifest::{FileSource, Manifest, OptionalManifestFields};
use breadcrumbs_cli::test_utils::fixtures::{self, CENTOS7_TEMPLATE};
use breadcrumbs_cli::utils::hash_bytes;

use crate::common::TestProject;

fn centos7_config(project: &TestProject) -> PluginConfig {
    let template = project.write_file("centos7.json", CENTOS7_TEMPLATE).unwrap();
    let mut config = fixtures::plugin_config(&template, &[".ks", ".sh"]);
    config.packer_build_name = "centos7".to_string();
    config.packer_builder_type = "virtualbox-iso".to_string();
    config.validate().unwrap();
    config
}

#[tokio::test]
async fn test_centos7_manifest() {
    let project = TestProject::new().unwrap();
    let config = centos7_config(&project);
    let head = project.commit_all("add template").unwrap();

    let manifest = Manifest::build(&config, &GitRevision, OptionalManifestFields::default())
        .await
        .unwrap();

    assert_eq!(manifest.git_revision, head);
    assert_eq!(manifest.plugin_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(manifest.packer_build_name, "centos7");
    assert_eq!(manifest.packer_build_type, "virtualbox-iso");
    assert_eq!(manifest.packer_template_path, hash_bytes(b"centos7.json"));
    assert_eq!(manifest.template_raw(), CENTOS7_TEMPLATE.as_bytes());

    let found: Vec<&str> = manifest.found_files.iter().map(|f| f.found_at_path.as_str()).collect();
    assert_eq!(
        found,
        [
            "https://cool.com/centos/7/packer-generic.ks",
            "abc-generic.ks",
            "/path/to/file/centos/7/def-generic.ks",
            "scripts/install-basic-utils.sh",
            "scripts/install-cloud-init.sh",
            "scripts/cleanup.sh",
        ]
    );
    assert_eq!(manifest.found_files[0].source, FileSource::HttpsHost);
    assert!(manifest.found_files[1..].iter().all(|f| f.source == FileSource::LocalStorage));
}

#[tokio::test]
async fn test_manifest_json_shape() {
    let project = TestProject::new().unwrap();
    let config = centos7_config(&project);
    project.commit_all("add template").unwrap();

    let optional = OptionalManifestFields {
        os_name: Some("centos".to_string()),
        os_version: Some("7.6.1810".to_string()),
    };
    let manifest = Manifest::build(&config, &GitRevision, optional).await.unwrap();
    let json = manifest.to_json().unwrap();

    assert!(json.starts_with("{\n    \"plugin_version\": "));
    assert!(json.ends_with("}\n"));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["os_name"], "centos");
    assert_eq!(value["os_version"], "7.6.1810");
    assert_eq!(value["include_suffixes"], serde_json::json!([".ks", ".sh"]));
    assert_eq!(value["found_files"][0]["name"], "packer-generic.ks");
    assert_eq!(value["found_files"][0]["source"], "https_host");

    let parsed: Manifest = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.found_files, manifest.found_files);
}

#[tokio::test]
async fn test_special_variable_located_in_project() {
    let project = TestProject::new().unwrap();
    project.write_file("http/centos-7.ks", "install").unwrap();
    let template = project
        .write_file(
            "packer.json",
            "{\n  \"boot_command\": \"ks=http://{{ .HTTPIP }}:{{ .HTTPPort }}/centos-7.ks\"\n}\n",
        )
        .unwrap();
    project.commit_all("init").unwrap();

    let mut config = fixtures::plugin_config(&template, &[".ks"]);
    config.validate().unwrap();
    let manifest = Manifest::build(&config, &GitRevision, OptionalManifestFields::default())
        .await
        .unwrap();

    assert_eq!(manifest.found_files.len(), 1);
    assert_eq!(manifest.found_files[0].found_at_path, "http/centos-7.ks");
    assert_eq!(manifest.found_files[0].source, FileSource::LocalStorage);
}

#[tokio::test]
async fn test_template_over_size_limit() {
    let project = TestProject::new().unwrap();
    let mut config = centos7_config(&project);
    project.commit_all("init").unwrap();
    config.template_size_bytes = 100;

    let err = Manifest::build(&config, &GitRevision, OptionalManifestFields::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BreadcrumbsError>(),
        Some(BreadcrumbsError::TemplateTooLarge { limit: 100, .. })
    ));
}

#[tokio::test]
async fn test_repository_without_commits() {
    let project = TestProject::new().unwrap();
    let config = centos7_config(&project);

    let err = Manifest::build(&config, &GitRevision, OptionalManifestFields::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BreadcrumbsError>(),
        Some(BreadcrumbsError::GitCommandError { .. })
    ));
}
