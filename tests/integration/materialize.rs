//! Materializing HTTP references against an in-process server

use breadcrumbs_cli::config::PluginConfig;
use breadcrumbs_cli::core::BreadcrumbsError;
use breadcrumbs_cli::manifest::{FileSource, Manifest, OptionalManifestFields};
use breadcrumbs_cli::materializer::materialize;
use breadcrumbs_cli::test_utils::{StaticRevision, fixtures};
use breadcrumbs_cli::utils::hash_bytes;
use std::path::Path;
use tempfile::TempDir;

use crate::common::{Route, TestServer, routes};

async fn manifest_for(dir: &Path, template: &str) -> Manifest {
    let template_path = dir.join("template.json");
    std::fs::write(&template_path, template).unwrap();

    let mut config: PluginConfig = fixtures::plugin_config(&template_path, &[".ks"]);
    config.validate().unwrap();
    Manifest::build(&config, &StaticRevision::new("rev"), OptionalManifestFields::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_downloads_http_reference() {
    let server = TestServer::start(routes([("/centos/ks.ks", Route::ok("install\n"))])).await.unwrap();
    let url = server.url("/centos/ks.ks");

    let project = TempDir::new().unwrap();
    let manifest = manifest_for(project.path(), &format!(r#"{{"ks": "{url}"}}"#)).await;
    assert_eq!(manifest.found_files[0].source, FileSource::HttpHost);

    let out = TempDir::new().unwrap();
    materialize(out.path(), &manifest, 100).await.unwrap();

    let stored = out.path().join(hash_bytes(url.as_bytes()));
    assert_eq!(std::fs::read_to_string(stored).unwrap(), "install\n");
}

#[tokio::test]
async fn test_non_200_status_fails() {
    let server = TestServer::start(routes([])).await.unwrap();
    let url = server.url("/missing.ks");

    let project = TempDir::new().unwrap();
    let manifest = manifest_for(project.path(), &format!(r#"{{"ks": "{url}"}}"#)).await;

    let out = TempDir::new().unwrap();
    let err = materialize(out.path(), &manifest, 100).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BreadcrumbsError>(),
        Some(BreadcrumbsError::FetchFailed { status: 404, .. })
    ));
    assert_eq!(
        err.to_string(),
        format!("Failed to GET http file '{url}' - got status code 404")
    );
}

#[tokio::test]
async fn test_server_error_status_fails() {
    let server = TestServer::start(routes([("/a.ks", Route::status(500))])).await.unwrap();
    let url = server.url("/a.ks");

    let project = TempDir::new().unwrap();
    let manifest = manifest_for(project.path(), &format!(r#"{{"ks": "{url}"}}"#)).await;

    let out = TempDir::new().unwrap();
    let err = materialize(out.path(), &manifest, 100).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BreadcrumbsError>(),
        Some(BreadcrumbsError::FetchFailed { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_declared_length_over_limit_creates_no_file() {
    let server = TestServer::start(routes([("/big.ks", Route::ok(vec![b'x'; 11]))])).await.unwrap();
    let url = server.url("/big.ks");

    let project = TempDir::new().unwrap();
    let manifest = manifest_for(project.path(), &format!(r#"{{"ks": "{url}"}}"#)).await;

    let out = TempDir::new().unwrap();
    let err = materialize(out.path(), &manifest, 10).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BreadcrumbsError>(),
        Some(BreadcrumbsError::FileTooLarge { limit: 10, source_path }) if *source_path == url
    ));
    assert!(!out.path().join(hash_bytes(url.as_bytes())).exists());
}

#[tokio::test]
async fn test_streamed_body_over_limit_is_removed() {
    let server =
        TestServer::start(routes([("/big.ks", Route::ok(vec![b'x'; 4096]).without_length())]))
            .await
            .unwrap();
    let url = server.url("/big.ks");

    let project = TempDir::new().unwrap();
    let manifest = manifest_for(project.path(), &format!(r#"{{"ks": "{url}"}}"#)).await;

    let out = TempDir::new().unwrap();
    let err = materialize(out.path(), &manifest, 100).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BreadcrumbsError>(),
        Some(BreadcrumbsError::FileTooLarge { limit: 100, .. })
    ));
    assert!(!out.path().join(hash_bytes(url.as_bytes())).exists());
}

#[tokio::test]
async fn test_body_exactly_at_limit_is_stored() {
    let server = TestServer::start(routes([
        ("/exact.ks", Route::ok(vec![b'x'; 10])),
        ("/streamed.ks", Route::ok(vec![b'y'; 10]).without_length()),
    ]))
    .await
    .unwrap();
    let exact = server.url("/exact.ks");
    let streamed = server.url("/streamed.ks");

    let project = TempDir::new().unwrap();
    let manifest =
        manifest_for(project.path(), &format!(r#"{{"a": "{exact}", "b": "{streamed}"}}"#)).await;
    assert_eq!(manifest.found_files.len(), 2);

    let out = TempDir::new().unwrap();
    materialize(out.path(), &manifest, 10).await.unwrap();

    assert_eq!(std::fs::read(out.path().join(hash_bytes(exact.as_bytes()))).unwrap().len(), 10);
    assert_eq!(std::fs::read(out.path().join(hash_bytes(streamed.as_bytes()))).unwrap().len(), 10);
}

#[tokio::test]
async fn test_mixed_local_and_http_references() {
    let server = TestServer::start(routes([("/remote.ks", Route::ok("remote"))])).await.unwrap();
    let url = server.url("/remote.ks");

    let project = TempDir::new().unwrap();
    std::fs::create_dir_all(project.path().join("http")).unwrap();
    std::fs::write(project.path().join("http/local.ks"), "local").unwrap();
    let manifest =
        manifest_for(project.path(), &format!(r#"{{"a": "http/local.ks", "b": "{url}"}}"#)).await;

    let out = TempDir::new().unwrap();
    let root = out.path().join("breadcrumbs");
    materialize(&root, &manifest, 100).await.unwrap();

    assert_eq!(std::fs::read_to_string(root.join(hash_bytes(b"http/local.ks"))).unwrap(), "local");
    assert_eq!(std::fs::read_to_string(root.join(hash_bytes(url.as_bytes()))).unwrap(), "remote");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("breadcrumbs.json")).unwrap()).unwrap();
    assert_eq!(json["found_files"][0]["source"], "local_storage");
    assert_eq!(json["found_files"][1]["source"], "http_host");
}
