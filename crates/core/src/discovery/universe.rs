use crate::discovery::descriptor::{TypeDescriptor, TypeKey};
use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Supplies the type descriptors visible to a scan
pub trait TypeUniverse {
    /// Load every type the scan may classify, plus diagnostics for modules that failed to load
    fn load(&self) -> Result<LoadedUniverse, CoreError>;
}

/// A referenced module whose types could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedModule {
    pub module: String,
    pub referenced_by: String,
    pub reason: String,
}

impl UnresolvedModule {
    pub fn to_error(&self) -> CoreError {
        CoreError::unresolvable_module(&self.module, &self.referenced_by, &self.reason)
    }
}

/// Immutable snapshot of the types a scan works over
#[derive(Debug, Clone, Default)]
pub struct LoadedUniverse {
    types: Vec<TypeDescriptor>,
    index: HashMap<TypeKey, usize>,
    modules: Vec<String>,
    unresolved: Vec<UnresolvedModule>,
}

impl LoadedUniverse {
    /// Build a universe from descriptors; the first descriptor for a key wins
    pub fn from_types(types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut universe = Self::default();
        universe.extend(types);
        universe
    }

    fn extend(&mut self, types: impl IntoIterator<Item = TypeDescriptor>) {
        for descriptor in types {
            if self.index.contains_key(descriptor.key()) {
                tracing::debug!(
                    "Ignoring duplicate descriptor for '{}' from module '{}'",
                    descriptor.key(),
                    descriptor.module()
                );
                continue;
            }
            self.index.insert(descriptor.key().clone(), self.types.len());
            self.types.push(descriptor);
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.index.get(key).map(|&i| &self.types[i])
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Descriptors in load order
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of the modules whose types were loaded, in visit order
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn unresolved(&self) -> &[UnresolvedModule] {
        &self.unresolved
    }
}

impl TypeUniverse for LoadedUniverse {
    fn load(&self) -> Result<LoadedUniverse, CoreError> {
        Ok(self.clone())
    }
}

impl TypeUniverse for Vec<TypeDescriptor> {
    fn load(&self) -> Result<LoadedUniverse, CoreError> {
        Ok(LoadedUniverse::from_types(self.iter().cloned()))
    }
}

/// Loader producing the types declared by one module
pub type TypeLoaderFn = Box<dyn Fn() -> Result<Vec<TypeDescriptor>, String> + Send + Sync>;

/// A named unit of types and the modules it references
pub struct ModuleDefinition {
    name: String,
    references: Vec<String>,
    loader: TypeLoaderFn,
}

impl ModuleDefinition {
    /// Create a module with no types and no references
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
            loader: Box::new(|| Ok(Vec::new())),
        }
    }

    /// Add a referenced module
    pub fn references(mut self, module: impl Into<String>) -> Self {
        self.references.push(module.into());
        self
    }

    /// Serve a fixed set of types
    pub fn with_types(mut self, types: Vec<TypeDescriptor>) -> Self {
        self.loader = Box::new(move || Ok(types.clone()));
        self
    }

    /// Serve types through a fallible loader
    pub fn with_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn() -> Result<Vec<TypeDescriptor>, String> + Send + Sync + 'static,
    {
        self.loader = Box::new(loader);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn referenced_modules(&self) -> &[String] {
        &self.references
    }
}

impl std::fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("name", &self.name)
            .field("references", &self.references)
            .finish()
    }
}

/// Type universe rooted at a calling module.
///
/// Loading visits the calling module and every module it references,
/// transitively, breadth-first in declaration order. A referenced module that
/// is not registered or whose loader fails is recorded as an
/// [`UnresolvedModule`] and the walk continues with the rest. The calling
/// module itself must load.
#[derive(Debug)]
pub struct ModuleCatalog {
    calling_module: String,
    modules: HashMap<String, ModuleDefinition>,
}

impl ModuleCatalog {
    pub fn new(calling_module: impl Into<String>) -> Self {
        Self {
            calling_module: calling_module.into(),
            modules: HashMap::new(),
        }
    }

    /// Register a module, replacing any previous module of the same name
    pub fn register(&mut self, module: ModuleDefinition) -> &mut Self {
        self.modules.insert(module.name.clone(), module);
        self
    }

    /// Builder-style variant of [`ModuleCatalog::register`]
    pub fn with_module(mut self, module: ModuleDefinition) -> Self {
        self.register(module);
        self
    }

    pub fn calling_module(&self) -> &str {
        &self.calling_module
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl TypeUniverse for ModuleCatalog {
    fn load(&self) -> Result<LoadedUniverse, CoreError> {
        let entry = self.modules.get(&self.calling_module).ok_or_else(|| {
            CoreError::unresolvable_module(
                &self.calling_module,
                &self.calling_module,
                "calling module is not registered",
            )
        })?;

        let mut universe = LoadedUniverse::default();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&ModuleDefinition, &str)> = VecDeque::new();
        visited.insert(entry.name());
        queue.push_back((entry, entry.name()));

        while let Some((module, referenced_by)) = queue.pop_front() {
            match (module.loader)() {
                Ok(types) => {
                    tracing::debug!("Loaded {} types from module '{}'", types.len(), module.name());
                    universe.modules.push(module.name.clone());
                    universe.extend(types);
                }
                Err(reason) if module.name() == self.calling_module => {
                    return Err(CoreError::unresolvable_module(
                        &self.calling_module,
                        &self.calling_module,
                        reason,
                    ));
                }
                Err(reason) => {
                    tracing::warn!(
                        "Skipping module '{}' referenced by '{}': {}",
                        module.name(),
                        referenced_by,
                        reason
                    );
                    universe.unresolved.push(UnresolvedModule {
                        module: module.name.clone(),
                        referenced_by: referenced_by.to_string(),
                        reason,
                    });
                    continue;
                }
            }

            for reference in &module.references {
                if !visited.insert(reference.as_str()) {
                    continue;
                }
                match self.modules.get(reference) {
                    Some(next) => queue.push_back((next, module.name())),
                    None => {
                        tracing::warn!(
                            "Module '{}' referenced by '{}' is not registered",
                            reference,
                            module.name()
                        );
                        universe.unresolved.push(UnresolvedModule {
                            module: reference.clone(),
                            referenced_by: module.name.clone(),
                            reason: "module is not registered".to_string(),
                        });
                    }
                }
            }
        }

        Ok(universe)
    }
}
