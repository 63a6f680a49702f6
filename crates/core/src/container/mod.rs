#[allow(clippy::module_inception)]
pub mod container;
pub mod binding;
pub mod conventions;
pub mod descriptor;
pub mod registry;
pub mod scope;

pub use binding::ServiceBinder;
pub use container::{ServiceProvider, ServiceScopeHandle};
pub use conventions::{AutoResolveExt, AutoResolver, EmitSummary};
pub use descriptor::ServiceDescriptor;
pub use registry::ServiceCollection;
pub use scope::{ScopedServiceManager, ServiceScope};
