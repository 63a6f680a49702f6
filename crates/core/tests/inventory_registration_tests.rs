//! Integration tests for build-time type registration
//!
//! Types are submitted through `inventory` the way an application would
//! declare them, then discovered through `InventoryUniverse`.

use autoresolve_core::inventory;
use autoresolve_core::{
    AutoResolveConfig, AutoResolveExt, AutoResolver, InventoryUniverse, Marker, ModuleRegistration,
    ResolveSingleton, ResolveTransient, ServiceCollection, TypeDescriptor, TypeKey,
    TypeRegistration,
};

trait ResolveThisAsTransient: ResolveTransient + Send + Sync {
    fn message(&self) -> String;
}

#[derive(Default)]
struct ResolvedClass;

impl ResolveTransient for ResolvedClass {}

impl ResolveThisAsTransient for ResolvedClass {
    fn message(&self) -> String {
        "resolved through its marker interface".to_string()
    }
}

struct ResolveAsSingleton {
    value: String,
}

impl Default for ResolveAsSingleton {
    fn default() -> Self {
        Self {
            value: "one instance per provider".to_string(),
        }
    }
}

impl ResolveSingleton for ResolveAsSingleton {}

#[derive(Default)]
struct PluginService;

impl ResolveSingleton for PluginService {}

inventory::submit! {
    ModuleRegistration { name: "demo", references: &["plugins", "telemetry"] }
}

inventory::submit! {
    TypeRegistration {
        module: "demo",
        describe: |module| TypeDescriptor::interface::<dyn ResolveThisAsTransient>(module).marked(Marker::Transient),
    }
}

inventory::submit! {
    TypeRegistration {
        module: "demo",
        describe: |module| {
            TypeDescriptor::class::<ResolvedClass>(module)
                .default_activated()
                .implements::<dyn ResolveThisAsTransient>(|it| it)
                .build()
        },
    }
}

inventory::submit! {
    TypeRegistration {
        module: "demo",
        describe: |module| {
            TypeDescriptor::class::<ResolveAsSingleton>(module)
                .default_activated()
                .marked(Marker::Singleton)
                .build()
        },
    }
}

inventory::submit! {
    TypeRegistration {
        module: "plugins",
        describe: |module| {
            TypeDescriptor::class::<PluginService>(module)
                .default_activated()
                .marked(Marker::Singleton)
                .build()
        },
    }
}

#[test]
fn test_inventory_types_are_resolvable() {
    let mut services = ServiceCollection::new();
    services
        .add_auto_resolver(&InventoryUniverse::new("demo"))
        .unwrap();
    let provider = services.build_provider();

    let transient = provider.resolve::<dyn ResolveThisAsTransient>().unwrap();
    assert_eq!(transient.message(), "resolved through its marker interface");

    let singleton = provider.resolve::<ResolveAsSingleton>().unwrap();
    assert_eq!(singleton.value, "one instance per provider");
}

#[test]
fn test_referenced_modules_are_scanned_and_missing_ones_reported() {
    let report = AutoResolver::default()
        .scan(&InventoryUniverse::new("demo"))
        .unwrap();

    assert_eq!(report.modules, vec!["demo", "plugins"]);
    assert!(report.binding(&TypeKey::of::<PluginService>()).is_some());
    assert_eq!(report.unresolved_modules.len(), 1);
    assert_eq!(report.unresolved_modules[0].module, "telemetry");
    assert_eq!(report.unresolved_modules[0].referenced_by, "demo");
}

#[test]
fn test_unreferenced_module_is_not_scanned() {
    let report = AutoResolver::default()
        .scan(&InventoryUniverse::new("plugins"))
        .unwrap();

    assert_eq!(report.modules, vec!["plugins"]);
    assert_eq!(report.bindings.len(), 1);
    assert!(report.bindings_for(Marker::Transient).next().is_none());
}

#[test]
fn test_strict_config_fails_on_missing_module() {
    let mut services = ServiceCollection::new();
    let result = services.add_auto_resolver_with(&InventoryUniverse::new("demo"), &AutoResolveConfig::strict());

    assert!(result.is_err());
}
