//! End-to-end test for the extension workflow: discovery -> dependency
//! resolution -> register/boot -> install/uninstall/delete.

use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use ext_manager::{
    Extension, ExtensionManager, ExtensionRegistrar, FrameworkHooks, InMemoryPackageRecords,
    ManagerConfig, NullExtension, NullMigrationRunner,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct CountingExtension {
    registered: Rc<Cell<u32>>,
    booted: Rc<Cell<u32>>,
}

impl Extension for CountingExtension {
    fn register(&self) {
        self.registered.set(self.registered.get() + 1);
    }

    fn boot(&self) {
        self.booted.set(self.booted.get() + 1);
    }
}

#[derive(Default)]
struct RecordingHooks {
    locales: Vec<String>,
    routes: Vec<String>,
}

impl FrameworkHooks for RecordingHooks {
    fn add_locale_namespace(&mut self, namespace: &str, _path: &Path) {
        self.locales.push(namespace.to_string());
    }

    fn register_autoload(&mut self, _path: &Path) {}

    fn merge_config_namespace(&mut self, _namespace: &str, _path: &Path) {}

    fn add_view_namespace(&mut self, _namespace: &str, _path: &Path) {}

    fn load_routes(&mut self, identifier: &str, _path: &Path) {
        self.routes.push(identifier.to_string());
    }
}

fn mkpkg(root: &Path, vendor: &str, name: &str, manifest: serde_json::Value) {
    let dir = root.join(vendor).join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("extension.json"), manifest.to_string()).unwrap();
}

/// A storefront-style package tree: payments has no dependencies, cart
/// requires payments, kitchen requires a package that does not exist.
fn setup_tree(tmp: &TempDir) {
    let root = tmp.path().join("extensions");
    mkpkg(
        &root,
        "acme",
        "payments",
        serde_json::json!({"code": "acme.payments", "version": "1.0.0"}),
    );
    mkpkg(
        &root,
        "acme",
        "cart",
        serde_json::json!({
            "code": "acme.cart",
            "version": "2.1.0",
            "require": ["acme.payments"]
        }),
    );
    mkpkg(
        &root,
        "bistro",
        "kitchen",
        serde_json::json!({"code": "bistro.kitchen", "require": ["bistro.printer"]}),
    );
}

fn initialize(
    tmp: &TempDir,
    registrar: ExtensionRegistrar,
) -> ext_manager::Result<ExtensionManager> {
    ExtensionManager::initialize(
        ManagerConfig::new(
            tmp.path().join("extensions"),
            tmp.path().join("installed.json"),
        ),
        registrar,
        Box::new(NullMigrationRunner),
        Box::new(InMemoryPackageRecords::default()),
    )
}

fn null_registrar(ids: &[&str]) -> ExtensionRegistrar {
    let mut registrar = ExtensionRegistrar::new();
    for id in ids {
        registrar.register(*id, || Box::new(NullExtension));
    }
    registrar
}

const ALL: &[&str] = &["acme.cart", "acme.payments", "bistro.kitchen"];

#[test]
fn test_discovery_and_unmet_dependency_sweep() {
    let tmp = TempDir::new().unwrap();
    setup_tree(&tmp);
    fs::write(
        tmp.path().join("installed.json"),
        r#"{"acme.cart": true, "acme.payments": true, "bistro.kitchen": true}"#,
    )
    .unwrap();

    let manager = initialize(&tmp, null_registrar(ALL)).unwrap();

    assert_eq!(
        manager.identifiers(),
        vec!["acme.cart", "acme.payments", "bistro.kitchen"]
    );
    // kitchen's dependency does not exist, so the sweep disabled it.
    assert!(manager.is_disabled("bistro.kitchen"));
    assert!(!manager.is_disabled("acme.cart"));

    let missing = manager.find_missing_dependencies();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing["bistro.kitchen"], vec!["bistro.printer"]);

    // The sweep persisted its verdict.
    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("installed.json")).unwrap())
            .unwrap();
    assert_eq!(state["bistro.kitchen"], serde_json::json!(false));
}

#[test]
fn test_dependency_ordering_puts_payments_before_cart() {
    let tmp = TempDir::new().unwrap();
    setup_tree(&tmp);
    fs::write(
        tmp.path().join("installed.json"),
        r#"{"acme.cart": true, "acme.payments": true}"#,
    )
    .unwrap();

    let manager = initialize(&tmp, null_registrar(ALL)).unwrap();

    let order = manager.ordered_by_dependencies(None).unwrap();
    assert_eq!(order, vec!["acme.payments", "acme.cart"]);
}

#[test]
fn test_register_boot_lifecycle() {
    let tmp = TempDir::new().unwrap();
    setup_tree(&tmp);
    // cart is enabled, payments is enabled, kitchen never installed.
    fs::write(
        tmp.path().join("installed.json"),
        r#"{"acme.cart": true, "acme.payments": true}"#,
    )
    .unwrap();
    // Give kitchen a language dir so its locale registration is observable
    // despite it being disabled.
    fs::create_dir_all(tmp.path().join("extensions/bistro/kitchen/language")).unwrap();
    fs::write(
        tmp.path().join("extensions/acme/cart/routes.json"),
        "{}",
    )
    .unwrap();

    let registered = Rc::new(Cell::new(0));
    let booted = Rc::new(Cell::new(0));
    let mut registrar = null_registrar(&["acme.payments", "bistro.kitchen"]);
    {
        let registered = Rc::clone(&registered);
        let booted = Rc::clone(&booted);
        registrar.register("acme.cart", move || {
            Box::new(CountingExtension {
                registered: Rc::clone(&registered),
                booted: Rc::clone(&booted),
            })
        });
    }

    let mut manager = initialize(&tmp, registrar).unwrap();
    let mut hooks = RecordingHooks::default();

    manager.register_all(&mut hooks);
    manager.boot_all();
    // Repeat calls are no-ops.
    manager.register_all(&mut hooks);
    manager.boot_all();

    assert_eq!(registered.get(), 1);
    assert_eq!(booted.get(), 1);
    // Disabled kitchen still got its locale namespace wired.
    assert!(hooks.locales.contains(&"bistro.kitchen".to_string()));
    assert_eq!(hooks.routes, vec!["acme.cart"]);
}

#[test]
fn test_install_uninstall_delete_round_trip() {
    let tmp = TempDir::new().unwrap();
    setup_tree(&tmp);

    let mut manager = initialize(&tmp, null_registrar(ALL)).unwrap();
    let mut hooks = RecordingHooks::default();

    // Fresh tree: nothing installed, everything disabled.
    assert!(manager.is_disabled("acme.payments"));

    manager.install(&mut hooks, "acme.payments", None).unwrap();
    assert!(!manager.is_disabled("acme.payments"));

    manager.uninstall("acme.payments", false).unwrap();
    assert!(manager.is_disabled("acme.payments"));
    // Uninstall keeps the files.
    assert!(tmp.path().join("extensions/acme/payments").is_dir());

    manager.install(&mut hooks, "acme.payments", None).unwrap();
    manager.delete("acme.payments", true).unwrap();
    assert!(!tmp.path().join("extensions/acme/payments").exists());
    // The sibling cart package keeps the vendor directory alive.
    assert!(tmp.path().join("extensions/acme/cart").is_dir());

    // Deleted means the state entry is gone, as if never installed.
    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("installed.json")).unwrap())
            .unwrap();
    assert!(state.get("acme.payments").is_none());
}

#[test]
fn test_installed_state_survives_reinitialization() {
    let tmp = TempDir::new().unwrap();
    setup_tree(&tmp);

    {
        let mut manager = initialize(&tmp, null_registrar(ALL)).unwrap();
        let mut hooks = RecordingHooks::default();
        manager.install(&mut hooks, "acme.payments", None).unwrap();
        manager.install(&mut hooks, "acme.cart", None).unwrap();
    }

    let manager = initialize(&tmp, null_registrar(ALL)).unwrap();
    assert!(!manager.is_disabled("acme.cart"));
    assert!(!manager.is_disabled("acme.payments"));
    assert!(manager.is_disabled("bistro.kitchen"));
}

#[test]
fn test_install_records_explicit_version_over_manifest() {
    struct VersionCheck(InMemoryPackageRecords);
    impl ext_manager::PackageRecords for VersionCheck {
        fn find_or_create(&mut self, id: &str) -> ext_manager::Result<ext_manager::PackageRecord> {
            self.0.find_or_create(id)
        }
        fn save(&mut self, record: &ext_manager::PackageRecord) -> ext_manager::Result<()> {
            assert_eq!(record.version.as_deref(), Some("9.9.9"));
            self.0.save(record)
        }
        fn delete(&mut self, id: &str) -> ext_manager::Result<()> {
            self.0.delete(id)
        }
    }

    let tmp = TempDir::new().unwrap();
    setup_tree(&tmp);
    let mut manager = ExtensionManager::initialize(
        ManagerConfig::new(
            tmp.path().join("extensions"),
            tmp.path().join("installed.json"),
        ),
        null_registrar(ALL),
        Box::new(NullMigrationRunner),
        Box::new(VersionCheck(InMemoryPackageRecords::default())),
    )
    .unwrap();

    let mut hooks = RecordingHooks::default();
    manager
        .install(&mut hooks, "acme.cart", Some("9.9.9"))
        .unwrap();
}

#[test]
fn test_malformed_vendor_directory_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("extensions");
    mkpkg(&root, "_hidden", "pkg", serde_json::json!({}));
    mkpkg(&root, "acme", "cart", serde_json::json!({}));

    let manager = initialize(&tmp, null_registrar(&["acme.cart", "_hidden.pkg"])).unwrap();

    assert_eq!(manager.identifiers(), vec!["acme.cart"]);
    assert!(!manager.has("_hidden.pkg"));
}
