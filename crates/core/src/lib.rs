//! Convention-based service registration.
//!
//! Types opt into a lifetime by carrying one of the marker capabilities
//! ([`ResolveTransient`], [`ResolveScoped`], [`ResolveSingleton`]), either
//! directly or through a service trait that carries it. A scan over a
//! [`TypeUniverse`] classifies them and registers each concrete type with a
//! container, under its marker-carrying trait when it has exactly one, or
//! under itself otherwise. Registrations already present are kept.
//!
//! ```ignore
//! use autoresolve_core::{AutoResolveExt, InventoryUniverse, ServiceCollection};
//!
//! let mut services = ServiceCollection::new();
//! services.add_auto_resolver(&InventoryUniverse::new("app"))?;
//! let provider = services.build_provider();
//! let mailer = provider.resolve::<dyn Mailer>()?;
//! ```

pub mod config;
pub mod container;
pub mod discovery;
pub mod errors;
pub mod foundation;

pub use config::{AutoResolveConfig, ConfigError, ConfigSource};
pub use container::{
    AutoResolveExt, AutoResolver, EmitSummary, ServiceBinder, ServiceCollection, ServiceDescriptor,
    ServiceProvider, ServiceScope, ServiceScopeHandle,
};
pub use discovery::{
    Classification, Classifier, InventoryUniverse, LoadedUniverse, ModuleCatalog, ModuleDefinition,
    ModuleRegistration, RegistrationBinding, ScanReport, Strictness, TypeDescriptor, TypeKey,
    TypeKind, TypeRegistration, TypeUniverse, UnresolvedModule,
};
pub use errors::{CoreError, Diagnostic};
pub use foundation::{Marker, ResolveScoped, ResolveSingleton, ResolveTransient};

// Re-exported so registrations can be submitted without a direct dependency
pub use inventory;
