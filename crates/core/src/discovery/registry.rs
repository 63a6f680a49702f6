//! Build-time type registry.
//!
//! Types and modules are submitted from anywhere in the final binary with
//! `inventory::submit!` and folded into a [`ModuleCatalog`] at scan time:
//!
//! ```ignore
//! use autoresolve_core::discovery::{ModuleRegistration, TypeRegistration};
//! use autoresolve_core::{Marker, TypeDescriptor};
//!
//! inventory::submit! {
//!     ModuleRegistration { name: "app", references: &["billing"] }
//! }
//!
//! inventory::submit! {
//!     TypeRegistration {
//!         module: "app",
//!         describe: |module| TypeDescriptor::interface::<dyn Mailer>(module).marked(Marker::Transient),
//!     }
//! }
//! ```

use crate::discovery::descriptor::TypeDescriptor;
use crate::discovery::universe::{LoadedUniverse, ModuleCatalog, ModuleDefinition, TypeUniverse};
use crate::errors::CoreError;

/// A module and the modules it references
#[derive(Debug)]
pub struct ModuleRegistration {
    pub name: &'static str,
    pub references: &'static [&'static str],
}

/// A type declared by a module
pub struct TypeRegistration {
    pub module: &'static str,
    pub describe: fn(&'static str) -> TypeDescriptor,
}

inventory::collect!(ModuleRegistration);
inventory::collect!(TypeRegistration);

/// Universe backed by every registration linked into the binary
#[derive(Debug, Clone)]
pub struct InventoryUniverse {
    calling_module: String,
}

impl InventoryUniverse {
    pub fn new(calling_module: impl Into<String>) -> Self {
        Self {
            calling_module: calling_module.into(),
        }
    }

    /// Fold the registrations into a catalog rooted at the calling module.
    ///
    /// A module that only appears through [`TypeRegistration`] entries is
    /// registered without references.
    pub fn catalog(&self) -> ModuleCatalog {
        let mut catalog = ModuleCatalog::new(self.calling_module.clone());

        for registration in inventory::iter::<ModuleRegistration> {
            let mut module = ModuleDefinition::new(registration.name)
                .with_loader(move || Ok(types_of(registration.name)));
            for reference in registration.references {
                module = module.references(*reference);
            }
            catalog.register(module);
        }

        for registration in inventory::iter::<TypeRegistration> {
            if !catalog.has_module(registration.module) {
                let name = registration.module;
                catalog.register(ModuleDefinition::new(name).with_loader(move || Ok(types_of(name))));
            }
        }

        catalog
    }
}

impl TypeUniverse for InventoryUniverse {
    fn load(&self) -> Result<LoadedUniverse, CoreError> {
        self.catalog().load()
    }
}

fn types_of(module: &'static str) -> Vec<TypeDescriptor> {
    inventory::iter::<TypeRegistration>
        .into_iter()
        .filter(|registration| registration.module == module)
        .map(|registration| (registration.describe)(registration.module))
        .collect()
}
