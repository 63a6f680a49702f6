use crate::foundation::Marker;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased service instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Factory producing a fresh implementation instance
pub type Activator = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Converts an implementation instance into a boxed `Arc<Service>` for one registration key
pub type Upcast = Arc<dyn Fn(Instance) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Identity of a type known to the universe (its qualified name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Create a key from a qualified type name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Key of a Rust type, trait objects included
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Structural kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Interface,
    Class { is_abstract: bool },
}

/// How a concrete class is instantiated and exposed under a registration key
#[derive(Clone)]
pub struct Activation {
    pub activator: Activator,
    pub upcast: Upcast,
}

impl std::fmt::Debug for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Activation(<activator>)")
    }
}

/// Read-only description of a type visible to a scan
#[derive(Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    module: String,
    supertypes: Vec<TypeKey>,
    activator: Option<Activator>,
    upcasts: HashMap<TypeKey, Upcast>,
}

impl TypeDescriptor {
    /// Describe a type by name only, without activation support
    pub fn named(key: impl Into<TypeKey>, kind: TypeKind, module: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            module: module.into(),
            supertypes: Vec::new(),
            activator: None,
            upcasts: HashMap::new(),
        }
    }

    /// Describe a trait (usually `dyn Trait`) as an interface
    pub fn interface<I: ?Sized + 'static>(module: impl Into<String>) -> Self {
        Self::named(TypeKey::of::<I>(), TypeKind::Interface, module)
    }

    /// Describe a type that must never be instantiated directly
    pub fn abstract_class<T: ?Sized + 'static>(module: impl Into<String>) -> Self {
        Self::named(
            TypeKey::of::<T>(),
            TypeKind::Class { is_abstract: true },
            module,
        )
    }

    /// Start describing a concrete, activatable type
    pub fn class<T: Send + Sync + 'static>(module: impl Into<String>) -> ClassBuilder<T> {
        ClassBuilder::new(module)
    }

    /// Add a direct supertype (base class or implemented interface)
    pub fn extends<S: ?Sized + 'static>(self) -> Self {
        self.extends_key(TypeKey::of::<S>())
    }

    /// Add a direct supertype by key
    pub fn extends_key(mut self, key: impl Into<TypeKey>) -> Self {
        let key = key.into();
        if !self.supertypes.contains(&key) {
            self.supertypes.push(key);
        }
        self
    }

    /// Attach a marker capability directly
    pub fn marked(self, marker: Marker) -> Self {
        self.extends_key(marker.key())
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn supertypes(&self) -> &[TypeKey] {
        &self.supertypes
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class { .. })
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Class { is_abstract: true })
    }

    /// Non-abstract class, eligible as an implementation
    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, TypeKind::Class { is_abstract: false })
    }

    /// Has an activator, so the container can instantiate it
    pub fn is_activatable(&self) -> bool {
        self.activator.is_some()
    }

    /// Activation for exposing this type under `key`, if it can be instantiated that way
    pub fn activation_for(&self, key: &TypeKey) -> Option<Activation> {
        let activator = self.activator.clone()?;
        let upcast = self.upcasts.get(key)?.clone();
        Some(Activation { activator, upcast })
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("module", &self.module)
            .field("supertypes", &self.supertypes)
            .field("activatable", &self.activator.is_some())
            .finish()
    }
}

/// Builder for concrete class descriptors with typed activation
pub struct ClassBuilder<T> {
    descriptor: TypeDescriptor,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ClassBuilder<T> {
    fn new(module: impl Into<String>) -> Self {
        let mut descriptor = TypeDescriptor::named(
            TypeKey::of::<T>(),
            TypeKind::Class { is_abstract: false },
            module,
        );
        let self_upcast: Upcast = Arc::new(|instance: Instance| {
            let concrete = instance.downcast::<T>().ok()?;
            Some(Box::new(concrete) as Box<dyn Any + Send + Sync>)
        });
        descriptor.upcasts.insert(TypeKey::of::<T>(), self_upcast);

        Self {
            descriptor,
            _phantom: PhantomData,
        }
    }

    /// Use `factory` to create instances
    pub fn activated_by<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.descriptor.activator = Some(Arc::new(move || Arc::new(factory()) as Instance));
        self
    }

    /// Create instances through `Default`
    pub fn default_activated(self) -> Self
    where
        T: Default,
    {
        self.activated_by(T::default)
    }

    /// Declare an implemented interface together with the coercion to it
    pub fn implements<I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<I>();
        let upcast: Upcast = Arc::new(move |instance: Instance| {
            let concrete = instance.downcast::<T>().ok()?;
            Some(Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
        });
        self.descriptor.upcasts.insert(key.clone(), upcast);
        self.descriptor = self.descriptor.extends_key(key);
        self
    }

    /// Declare a base type that carries no activation of its own
    pub fn extends<S: ?Sized + 'static>(mut self) -> Self {
        self.descriptor = self.descriptor.extends::<S>();
        self
    }

    /// Attach a marker capability directly to the class
    pub fn marked(mut self, marker: Marker) -> Self {
        self.descriptor = self.descriptor.marked(marker);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

impl<T: Send + Sync + 'static> From<ClassBuilder<T>> for TypeDescriptor {
    fn from(builder: ClassBuilder<T>) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Default)]
    struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_type_kind_queries() {
        let interface = TypeDescriptor::interface::<dyn Greeter>("app");
        assert!(interface.is_interface());
        assert!(!interface.is_class());
        assert!(!interface.is_concrete());

        let base = TypeDescriptor::named("app::BaseGreeter", TypeKind::Class { is_abstract: true }, "app");
        assert!(base.is_class());
        assert!(base.is_abstract());
        assert!(!base.is_concrete());
    }

    #[test]
    fn test_extends_deduplicates_supertypes() {
        let descriptor = TypeDescriptor::named("app::IFoo", TypeKind::Interface, "app")
            .marked(Marker::Transient)
            .marked(Marker::Transient)
            .extends_key("app::IBar");

        assert_eq!(descriptor.supertypes().len(), 2);
        assert_eq!(descriptor.supertypes()[0], Marker::Transient.key());
    }

    #[test]
    fn test_class_builder_upcasts_to_interface() {
        let descriptor = TypeDescriptor::class::<EnglishGreeter>("app")
            .default_activated()
            .implements::<dyn Greeter>(|it| it)
            .build();

        assert!(descriptor.is_concrete());
        assert_eq!(descriptor.supertypes(), &[TypeKey::of::<dyn Greeter>()]);

        let activation = descriptor
            .activation_for(&TypeKey::of::<dyn Greeter>())
            .unwrap();
        let boxed = (activation.upcast)((activation.activator)()).unwrap();
        let greeter = boxed.downcast::<Arc<dyn Greeter>>().unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn test_named_descriptor_has_no_activation() {
        let descriptor = TypeDescriptor::named("app::Foo", TypeKind::Class { is_abstract: false }, "app");
        assert!(descriptor.activation_for(&TypeKey::new("app::Foo")).is_none());
    }
}
