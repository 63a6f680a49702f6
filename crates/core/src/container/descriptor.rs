use crate::container::scope::ServiceScope;
use crate::discovery::classifier::RegistrationBinding;
use crate::discovery::descriptor::{Activation, Instance, TypeKey};
use std::any::Any;
use std::sync::Arc;

/// A registration held by a service collection
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// Key the service is resolved by
    pub service: TypeKey,
    /// Concrete type behind the service
    pub implementation: TypeKey,
    /// Service lifetime/scope
    pub lifetime: ServiceScope,
    /// How instances are created; `None` for descriptor-only registrations
    pub activation: Option<Activation>,
}

impl ServiceDescriptor {
    /// Descriptor without activation support
    pub fn new(
        service: impl Into<TypeKey>,
        implementation: impl Into<TypeKey>,
        lifetime: ServiceScope,
    ) -> Self {
        Self {
            service: service.into(),
            implementation: implementation.into(),
            lifetime,
            activation: None,
        }
    }

    /// Register `TImpl` under `TService`, built by `factory`
    pub fn factory<TService, TImpl, F>(
        lifetime: ServiceScope,
        factory: F,
        cast: fn(Arc<TImpl>) -> Arc<TService>,
    ) -> Self
    where
        TService: ?Sized + Send + Sync + 'static,
        TImpl: Send + Sync + 'static,
        F: Fn() -> TImpl + Send + Sync + 'static,
    {
        let activation = Activation {
            activator: Arc::new(move || Arc::new(factory()) as Instance),
            upcast: Arc::new(move |instance: Instance| {
                let concrete = instance.downcast::<TImpl>().ok()?;
                Some(Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
            }),
        };

        Self {
            service: TypeKey::of::<TService>(),
            implementation: TypeKey::of::<TImpl>(),
            lifetime,
            activation: Some(activation),
        }
    }

    /// Register a concrete type under itself
    pub fn concrete<T, F>(lifetime: ServiceScope, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::factory::<T, T, F>(lifetime, factory, |it| it)
    }

    /// Descriptor for a discovered binding
    pub fn from_binding(binding: &RegistrationBinding) -> Self {
        Self {
            service: binding.key.clone(),
            implementation: binding.implementation.clone(),
            lifetime: binding.lifetime(),
            activation: binding.activation.clone(),
        }
    }

    /// Create a new implementation instance
    pub(crate) fn create_instance(&self) -> Option<Instance> {
        let activation = self.activation.as_ref()?;
        Some((activation.activator)())
    }

    /// Expose an implementation instance as `Arc<Service>` boxed in `Any`
    pub(crate) fn expose(&self, instance: Instance) -> Option<Box<dyn Any + Send + Sync>> {
        let activation = self.activation.as_ref()?;
        (activation.upcast)(instance)
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .field("activation", &self.activation)
            .finish()
    }
}
