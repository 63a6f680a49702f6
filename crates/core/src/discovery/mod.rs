pub mod classifier;
pub mod descriptor;
pub mod registry;
pub mod report;
pub mod universe;

pub use classifier::{Classification, Classifier, RegistrationBinding, Strictness};
pub use descriptor::{Activation, Activator, ClassBuilder, Instance, TypeDescriptor, TypeKey, TypeKind, Upcast};
pub use registry::{InventoryUniverse, ModuleRegistration, TypeRegistration};
pub use report::ScanReport;
pub use universe::{LoadedUniverse, ModuleCatalog, ModuleDefinition, TypeUniverse, UnresolvedModule};
