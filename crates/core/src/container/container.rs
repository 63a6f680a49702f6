use crate::container::descriptor::ServiceDescriptor;
use crate::container::scope::{ScopedServiceManager, ServiceScope};
use crate::discovery::descriptor::{Instance, TypeKey};
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Resolves services from a frozen set of registrations
pub struct ServiceProvider {
    descriptors: Arc<HashMap<TypeKey, ServiceDescriptor>>,
    singletons: Arc<RwLock<HashMap<TypeKey, Instance>>>,
    root_scope: Mutex<ScopedServiceManager>,
}

impl ServiceProvider {
    /// Create a provider over `descriptors`; later descriptors win on duplicate keys
    pub fn new(descriptors: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        let descriptors = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.service.clone(), descriptor))
            .collect();

        Self {
            descriptors: Arc::new(descriptors),
            singletons: Arc::new(RwLock::new(HashMap::new())),
            root_scope: Mutex::new(ScopedServiceManager::new()),
        }
    }

    /// Resolve a service registered under the key of `T`
    pub fn resolve<T>(&self) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_as::<T>(&TypeKey::of::<T>())
    }

    /// Resolve the service registered under `key` as `Arc<T>`
    pub fn resolve_as<T>(&self, key: &TypeKey) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        resolve_in(self, key, &self.root_scope)
    }

    /// Try to resolve a service, returning None if it cannot be resolved
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().ok()
    }

    /// Resolve the raw implementation instance registered under `key`
    pub fn resolve_instance(&self, key: &TypeKey) -> Result<Instance, CoreError> {
        let descriptor = self.descriptor(key)?;
        self.instance_for(descriptor, &self.root_scope)
    }

    /// Check if a service is registered
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// Registration for `key`
    pub fn descriptor(&self, key: &TypeKey) -> Result<&ServiceDescriptor, CoreError> {
        self.descriptors
            .get(key)
            .ok_or_else(|| CoreError::service_not_found(key.as_str()))
    }

    /// Get the number of registered services
    pub fn service_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Open a scope with its own scoped instances
    pub fn create_scope(&self) -> ServiceScopeHandle<'_> {
        let services = ScopedServiceManager::new();
        ServiceScopeHandle {
            provider: self,
            scope_id: services.scope_id(),
            services: Mutex::new(services),
        }
    }

    fn instance_for(
        &self,
        descriptor: &ServiceDescriptor,
        scope: &Mutex<ScopedServiceManager>,
    ) -> Result<Instance, CoreError> {
        let key = &descriptor.service;
        match descriptor.lifetime {
            ServiceScope::Transient => self.create(descriptor),
            ServiceScope::Singleton => {
                if let Some(instance) = self
                    .singletons
                    .read()
                    .map_err(|_| CoreError::lock_error("singleton_cache"))?
                    .get(key)
                {
                    return Ok(instance.clone());
                }

                let mut singletons = self
                    .singletons
                    .write()
                    .map_err(|_| CoreError::lock_error("singleton_cache"))?;
                if let Some(instance) = singletons.get(key) {
                    return Ok(instance.clone());
                }
                let instance = self.create(descriptor)?;
                singletons.insert(key.clone(), instance.clone());
                Ok(instance)
            }
            ServiceScope::Scoped => {
                let mut services = scope
                    .lock()
                    .map_err(|_| CoreError::lock_error("scoped_services"))?;
                if let Some(instance) = services.get_service(key) {
                    return Ok(instance);
                }
                let instance = self.create(descriptor)?;
                services.add_service(key.clone(), instance.clone());
                Ok(instance)
            }
        }
    }

    fn create(&self, descriptor: &ServiceDescriptor) -> Result<Instance, CoreError> {
        descriptor
            .create_instance()
            .ok_or_else(|| {
                CoreError::activation_failed(
                    descriptor.service.as_str(),
                    descriptor.implementation.as_str(),
                )
            })
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("service_count", &self.service_count())
            .finish()
    }
}

/// A unit of work owning its scoped instances
pub struct ServiceScopeHandle<'p> {
    provider: &'p ServiceProvider,
    scope_id: uuid::Uuid,
    services: Mutex<ScopedServiceManager>,
}

impl ServiceScopeHandle<'_> {
    /// Resolve a service registered under the key of `T`
    pub fn resolve<T>(&self) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_as::<T>(&TypeKey::of::<T>())
    }

    /// Resolve the service registered under `key` as `Arc<T>`
    pub fn resolve_as<T>(&self, key: &TypeKey) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        resolve_in(self.provider, key, &self.services)
    }

    /// Get the scope ID
    pub fn scope_id(&self) -> uuid::Uuid {
        self.scope_id
    }
}

fn resolve_in<T>(
    provider: &ServiceProvider,
    key: &TypeKey,
    scope: &Mutex<ScopedServiceManager>,
) -> Result<Arc<T>, CoreError>
where
    T: ?Sized + Send + Sync + 'static,
{
    let descriptor = provider.descriptor(key)?;
    let instance = provider.instance_for(descriptor, scope)?;
    let mismatch = || CoreError::ServiceTypeMismatch {
        service_type: key.to_string(),
        requested: std::any::type_name::<T>().to_string(),
    };

    let exposed = descriptor.expose(instance).ok_or_else(mismatch)?;
    exposed
        .downcast::<Arc<T>>()
        .map(|service| *service)
        .map_err(|_| mismatch())
}
