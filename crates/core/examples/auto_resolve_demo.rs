//! Auto-resolve demo
//!
//! Declares one transient service trait and one directly marked singleton,
//! registers them through `inventory`, and resolves both after a scan.
//!
//! Run with `RUST_LOG=debug` to see the classification trace.

use autoresolve_core::inventory;
use autoresolve_core::{
    AutoResolveConfig, AutoResolveExt, CoreError, InventoryUniverse, Marker, ModuleRegistration,
    ResolveSingleton, ResolveTransient, ServiceCollection, TypeDescriptor, TypeRegistration,
};
use tracing_subscriber::EnvFilter;

trait ResolveThisAsTransient: ResolveTransient + Send + Sync {
    fn message(&self) -> String;
}

#[derive(Default)]
struct MessageService;

impl ResolveTransient for MessageService {}

impl ResolveThisAsTransient for MessageService {
    fn message(&self) -> String {
        "Hello from a transient service".to_string()
    }
}

struct ResolveAsSingleton {
    singleton_value: u64,
}

impl Default for ResolveAsSingleton {
    fn default() -> Self {
        Self {
            singleton_value: 42,
        }
    }
}

impl ResolveSingleton for ResolveAsSingleton {}

inventory::submit! {
    ModuleRegistration { name: "demo", references: &[] }
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
            TypeDescriptor::class::<MessageService>(module)
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

fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AutoResolveConfig::from_env()?;
    let mut services = ServiceCollection::new();
    services.add_auto_resolver_with(&InventoryUniverse::new("demo"), &config)?;

    let provider = services.build_provider();
    let transient = provider.resolve::<dyn ResolveThisAsTransient>()?;
    let singleton = provider.resolve::<ResolveAsSingleton>()?;

    println!("Text from resolved interface: {}", transient.message());
    println!(
        "Value from singleton resolved class: {}",
        singleton.singleton_value
    );

    Ok(())
}
