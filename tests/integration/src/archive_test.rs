//! End-to-end test for archive ingestion: upload -> extract -> load ->
//! install.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use ext_manager::{
    Error, ExtensionManager, ExtensionRegistrar, InMemoryPackageRecords, ManagerConfig,
    NullExtension, NullHooks, NullMigrationRunner,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn build_archive(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn manager_at(tmp: &TempDir, ids: &[&str]) -> ExtensionManager {
    let mut registrar = ExtensionRegistrar::new();
    for id in ids {
        registrar.register(*id, || Box::new(NullExtension));
    }
    ExtensionManager::initialize(
        ManagerConfig::new(
            tmp.path().join("extensions"),
            tmp.path().join("installed.json"),
        ),
        registrar,
        Box::new(NullMigrationRunner),
        Box::new(InMemoryPackageRecords::default()),
    )
    .unwrap()
}

fn upload(tmp: &TempDir, entries: &[(&str, &str)]) -> PathBuf {
    let path = tmp.path().join("upload.zip");
    build_archive(&path, entries);
    path
}

#[test]
fn test_upload_extract_load_install() {
    let tmp = TempDir::new().unwrap();
    let zip = upload(
        &tmp,
        &[
            (
                "cart-release/extension.json",
                r#"{"code": "acme.cart", "name": "Acme Cart", "version": "3.0.0"}"#,
            ),
            ("cart-release/routes.json", "{}"),
            ("cart-release/language/en/default.json", "{}"),
        ],
    );

    let mut manager = manager_at(&tmp, &["acme.cart"]);

    let code = manager.extract_archive(&zip).unwrap();
    assert_eq!(code, "acme.cart");
    // Content lands at the code-derived path, not the archive folder name.
    let pkg = tmp.path().join("extensions/acme/cart");
    assert!(pkg.join("extension.json").is_file());
    assert!(pkg.join("language/en/default.json").is_file());

    let descriptor = manager.load(&code).unwrap().unwrap();
    assert_eq!(descriptor.identifier, "acme.cart");
    assert_eq!(descriptor.version(), Some("3.0.0"));

    let mut hooks = NullHooks;
    manager.install(&mut hooks, "acme.cart", None).unwrap();
    assert!(!manager.is_disabled("acme.cart"));
}

#[test]
fn test_extracted_package_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let zip = upload(
        &tmp,
        &[("pkg/extension.json", r#"{"code": "acme.menu", "version": "1.0.0"}"#)],
    );

    {
        let mut manager = manager_at(&tmp, &["acme.menu"]);
        let code = manager.extract_archive(&zip).unwrap();
        manager.load(&code).unwrap();
        let mut hooks = NullHooks;
        manager.install(&mut hooks, &code, None).unwrap();
    }

    // A fresh manager discovers the extracted package from disk.
    let manager = manager_at(&tmp, &["acme.menu"]);
    assert!(manager.has("acme.menu"));
    assert!(!manager.is_disabled("acme.menu"));
}

#[test]
fn test_archive_without_manifest_rejected() {
    let tmp = TempDir::new().unwrap();
    let zip = upload(&tmp, &[("pkg/readme.md", "no manifest here")]);

    let manager = manager_at(&tmp, &[]);
    let err = manager.extract_archive(&zip).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }));
    // Nothing was written under the root.
    assert!(!tmp.path().join("extensions/pkg").exists());
}

#[test]
fn test_archive_with_flat_layout_rejected() {
    let tmp = TempDir::new().unwrap();
    // No top-level folder: files at the archive root.
    let zip = upload(
        &tmp,
        &[
            ("extension.json", r#"{"code": "acme.cart"}"#),
            ("other/readme.md", "x"),
        ],
    );

    let manager = manager_at(&tmp, &[]);
    let err = manager.extract_archive(&zip).unwrap_err();
    assert!(matches!(err, Error::MalformedArchive { .. }));
}

#[test]
fn test_deleted_package_directory_is_recreatable_by_extract() {
    let tmp = TempDir::new().unwrap();
    let zip = upload(
        &tmp,
        &[("pkg/extension.json", r#"{"code": "acme.cart", "version": "1.0.0"}"#)],
    );

    let mut manager = manager_at(&tmp, &["acme.cart"]);
    manager.extract_archive(&zip).unwrap();
    manager.load("acme.cart").unwrap();
    manager.delete("acme.cart", false).unwrap();
    assert!(!tmp.path().join("extensions/acme").exists());

    // Re-uploading the same archive restores the package.
    manager.extract_archive(&zip).unwrap();
    assert!(
        fs::read_to_string(tmp.path().join("extensions/acme/cart/extension.json"))
            .unwrap()
            .contains("acme.cart")
    );
}
