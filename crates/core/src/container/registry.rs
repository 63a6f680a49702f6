use crate::container::binding::ServiceBinder;
use crate::container::container::ServiceProvider;
use crate::container::descriptor::ServiceDescriptor;
use crate::container::scope::ServiceScope;
use crate::discovery::descriptor::TypeKey;
use std::collections::HashMap;
use std::sync::Arc;

/// Mutable set of service registrations, one per service key
#[derive(Debug, Default, Clone)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    index: HashMap<TypeKey, usize>,
}

impl ServiceCollection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any registration for the same key
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        match self.index.get(&descriptor.service) {
            Some(&i) => {
                tracing::debug!("Replacing registration for '{}'", descriptor.service);
                self.descriptors[i] = descriptor;
            }
            None => {
                self.index
                    .insert(descriptor.service.clone(), self.descriptors.len());
                self.descriptors.push(descriptor);
            }
        }
        self
    }

    /// Register `TImpl` under `TService` with an explicit lifetime
    pub fn add_factory<TService, TImpl, F>(
        &mut self,
        lifetime: ServiceScope,
        factory: F,
        cast: fn(Arc<TImpl>) -> Arc<TService>,
    ) -> &mut Self
    where
        TService: ?Sized + Send + Sync + 'static,
        TImpl: Send + Sync + 'static,
        F: Fn() -> TImpl + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::factory::<TService, TImpl, F>(
            lifetime, factory, cast,
        ))
    }

    /// Register a pre-created instance as a singleton
    pub fn add_instance<T>(&mut self, instance: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::concrete::<T, _>(
            ServiceScope::Singleton,
            move || instance.clone(),
        ))
    }

    /// Registration for `service`
    pub fn get(&self, service: &TypeKey) -> Option<&ServiceDescriptor> {
        self.index.get(service).map(|&i| &self.descriptors[i])
    }

    /// Registrations in insertion order
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Get the number of registered services
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registrations into a provider
    pub fn build_provider(&self) -> ServiceProvider {
        ServiceProvider::new(self.descriptors.iter().cloned())
    }
}

impl ServiceBinder for ServiceCollection {
    fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.index.contains_key(&descriptor.service) {
            return false;
        }
        self.add(descriptor);
        true
    }

    fn contains(&self, service: &TypeKey) -> bool {
        self.index.contains_key(service)
    }
}
