use crate::container::scope::ServiceScope;
use crate::discovery::descriptor::{Activation, TypeDescriptor, TypeKey};
use crate::discovery::universe::LoadedUniverse;
use crate::errors::{CoreError, Diagnostic};
use crate::foundation::Marker;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// How a class implementing several marker interfaces for one marker is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Abort the scan with [`CoreError::AmbiguousMarkerImplementation`]
    #[default]
    Strict,
    /// Register under the lowest candidate key and record a diagnostic
    Lenient,
}

impl std::str::FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Strictness::Strict),
            "lenient" => Ok(Strictness::Lenient),
            _ => Err(s.to_string()),
        }
    }
}

/// A (key, implementation, lifetime) triple discovered for one marker
#[derive(Clone, Serialize)]
pub struct RegistrationBinding {
    pub key: TypeKey,
    pub implementation: TypeKey,
    pub marker: Marker,
    #[serde(skip)]
    pub activation: Option<Activation>,
}

impl RegistrationBinding {
    pub fn lifetime(&self) -> ServiceScope {
        self.marker.lifetime()
    }

    /// Registered under the implementation itself rather than an interface
    pub fn is_self_bound(&self) -> bool {
        self.key == self.implementation
    }
}

impl std::fmt::Debug for RegistrationBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationBinding")
            .field("key", &self.key)
            .field("implementation", &self.implementation)
            .field("marker", &self.marker)
            .field("activatable", &self.activation.is_some())
            .finish()
    }
}

/// Result of classifying the universe for one marker
#[derive(Debug, Clone)]
pub struct Classification {
    pub marker: Marker,
    pub bindings: Vec<RegistrationBinding>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Finds the types carrying a marker and the key each one registers under
pub struct Classifier<'u> {
    universe: &'u LoadedUniverse,
    strictness: Strictness,
}

impl<'u> Classifier<'u> {
    pub fn new(universe: &'u LoadedUniverse, strictness: Strictness) -> Self {
        Self {
            universe,
            strictness,
        }
    }

    /// Classify every concrete class of the universe for `marker`.
    ///
    /// A class implementing exactly one interface that carries the marker is
    /// registered under that interface. A class carrying the marker without
    /// such an interface is registered under itself. An activatable class
    /// that cannot be exposed under its key is rejected here rather than at
    /// resolution.
    pub fn classify(&self, marker: Marker) -> Result<Classification, CoreError> {
        let marker_key = marker.key();
        let marker_interfaces = self.marker_interfaces(&marker_key);
        let mut classification = Classification {
            marker,
            bindings: Vec::new(),
            diagnostics: Vec::new(),
        };

        for descriptor in self.universe.types().iter().filter(|d| d.is_concrete()) {
            let ancestors = self.ancestors(descriptor);

            let mut candidates: Vec<&TypeKey> = ancestors
                .iter()
                .filter(|key| marker_interfaces.contains(*key))
                .collect();

            let key = match candidates.len() {
                0 if ancestors.contains(&marker_key) => descriptor.key().clone(),
                0 => continue,
                1 => candidates[0].clone(),
                _ => {
                    candidates.sort();
                    let names: Vec<String> = candidates.iter().map(|k| k.to_string()).collect();
                    let error = CoreError::ambiguous(descriptor.key().as_str(), marker.as_str(), names);
                    match self.strictness {
                        Strictness::Strict => return Err(error),
                        Strictness::Lenient => {
                            tracing::warn!("{}; registering under '{}'", error, candidates[0]);
                            classification.diagnostics.push(Diagnostic::from(&error));
                            candidates[0].clone()
                        }
                    }
                }
            };

            let activation = descriptor.activation_for(&key);
            if activation.is_none() && descriptor.is_activatable() {
                // reaches `key` only through `extends`, without a typed upcast
                let error = CoreError::activation_failed(key.as_str(), descriptor.key().as_str());
                match self.strictness {
                    Strictness::Strict => return Err(error),
                    Strictness::Lenient => {
                        tracing::warn!("{}; skipping binding", error);
                        classification.diagnostics.push(Diagnostic::from(&error));
                        continue;
                    }
                }
            }

            tracing::debug!(
                "Classified '{}' as {} under '{}'",
                descriptor.key(),
                marker,
                key
            );
            classification.bindings.push(RegistrationBinding {
                activation,
                implementation: descriptor.key().clone(),
                key,
                marker,
            });
        }

        Ok(classification)
    }

    /// Interfaces the marker is assignable to, excluding the marker itself
    fn marker_interfaces(&self, marker_key: &TypeKey) -> HashSet<TypeKey> {
        self.universe
            .types()
            .iter()
            .filter(|d| d.is_interface() && d.key() != marker_key)
            .filter(|d| self.ancestors(d).contains(marker_key))
            .map(|d| d.key().clone())
            .collect()
    }

    /// Transitive supertypes of `descriptor`, breadth-first, without duplicates.
    ///
    /// Keys missing from the universe are kept as leaves.
    pub fn ancestors(&self, descriptor: &TypeDescriptor) -> Vec<TypeKey> {
        let mut seen: HashSet<&TypeKey> = HashSet::new();
        let mut ordered = Vec::new();
        let mut queue: VecDeque<&TypeKey> = descriptor.supertypes().iter().collect();
        seen.insert(descriptor.key());

        while let Some(key) = queue.pop_front() {
            if !seen.insert(key) {
                continue;
            }
            ordered.push(key.clone());
            if let Some(supertype) = self.universe.get(key) {
                queue.extend(supertype.supertypes());
            }
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::descriptor::TypeKind;

    fn interface(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(name, TypeKind::Interface, "app")
    }

    fn class(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(name, TypeKind::Class { is_abstract: false }, "app")
    }

    fn abstract_class(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(name, TypeKind::Class { is_abstract: true }, "app")
    }

    fn pairs(classification: &Classification) -> Vec<(String, String)> {
        classification
            .bindings
            .iter()
            .map(|b| (b.key.to_string(), b.implementation.to_string()))
            .collect()
    }

    fn classify(types: Vec<TypeDescriptor>, marker: Marker) -> Result<Classification, CoreError> {
        let universe = LoadedUniverse::from_types(types);
        Classifier::new(&universe, Strictness::Strict).classify(marker)
    }

    #[test]
    fn test_interface_mediated_binding() {
        let result = classify(
            vec![
                interface("app::IFoo").marked(Marker::Transient),
                class("app::Foo").extends_key("app::IFoo"),
            ],
            Marker::Transient,
        )
        .unwrap();

        assert_eq!(pairs(&result), vec![("app::IFoo".to_string(), "app::Foo".to_string())]);
        assert_eq!(result.bindings[0].lifetime(), ServiceScope::Transient);
        assert!(!result.bindings[0].is_self_bound());
    }

    #[test]
    fn test_direct_marker_binds_class_to_itself() {
        let result = classify(vec![class("app::Bar").marked(Marker::Singleton)], Marker::Singleton).unwrap();

        assert_eq!(pairs(&result), vec![("app::Bar".to_string(), "app::Bar".to_string())]);
        assert!(result.bindings[0].is_self_bound());
    }

    #[test]
    fn test_abstract_base_is_skipped_but_subclass_is_bound() {
        let result = classify(
            vec![
                interface("app::IBaz").marked(Marker::Scoped),
                abstract_class("app::BaseBaz").extends_key("app::IBaz"),
                class("app::Baz").extends_key("app::BaseBaz"),
            ],
            Marker::Scoped,
        )
        .unwrap();

        assert_eq!(pairs(&result), vec![("app::IBaz".to_string(), "app::Baz".to_string())]);
    }

    #[test]
    fn test_class_marked_both_ways_is_bound_once_under_interface() {
        let result = classify(
            vec![
                interface("app::IFoo").marked(Marker::Transient),
                class("app::Foo").extends_key("app::IFoo").marked(Marker::Transient),
            ],
            Marker::Transient,
        )
        .unwrap();

        assert_eq!(pairs(&result), vec![("app::IFoo".to_string(), "app::Foo".to_string())]);
    }

    #[test]
    fn test_marker_inherited_through_interface_chain() {
        let result = classify(
            vec![
                interface("app::IRepository").marked(Marker::Scoped),
                interface("app::IUserRepository").extends_key("app::IRepository"),
                class("app::SqlUserRepository").extends_key("app::IUserRepository"),
            ],
            Marker::Scoped,
        );

        // Both interfaces carry the marker, so the class is ambiguous.
        let error = result.unwrap_err();
        match error {
            CoreError::AmbiguousMarkerImplementation { candidates, .. } => {
                assert_eq!(candidates, vec!["app::IRepository", "app::IUserRepository"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ambiguity_lenient_picks_lowest_key() {
        let universe = LoadedUniverse::from_types(vec![
            interface("app::ISend").marked(Marker::Transient),
            interface("app::INotify").marked(Marker::Transient),
            class("app::Mailer").extends_key("app::ISend").extends_key("app::INotify"),
        ]);

        let result = Classifier::new(&universe, Strictness::Lenient)
            .classify(Marker::Transient)
            .unwrap();

        assert_eq!(pairs(&result), vec![("app::INotify".to_string(), "app::Mailer".to_string())]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "AMBIGUOUS_MARKER_IMPLEMENTATION");
    }

    #[test]
    fn test_markers_are_isolated() {
        let types = vec![
            interface("app::IClock").marked(Marker::Transient),
            class("app::Clock").extends_key("app::IClock"),
            class("app::Cache").marked(Marker::Singleton),
        ];

        let scoped = classify(types.clone(), Marker::Scoped).unwrap();
        let singleton = classify(types.clone(), Marker::Singleton).unwrap();
        let transient = classify(types, Marker::Transient).unwrap();

        assert!(scoped.bindings.is_empty());
        assert_eq!(pairs(&singleton), vec![("app::Cache".to_string(), "app::Cache".to_string())]);
        assert_eq!(pairs(&transient), vec![("app::IClock".to_string(), "app::Clock".to_string())]);
    }

    #[test]
    fn test_marker_definition_itself_is_not_a_marker_interface() {
        let result = classify(
            vec![
                TypeDescriptor::named(Marker::Transient.key(), TypeKind::Interface, "autoresolve"),
                class("app::Foo").marked(Marker::Transient),
            ],
            Marker::Transient,
        )
        .unwrap();

        assert_eq!(pairs(&result), vec![("app::Foo".to_string(), "app::Foo".to_string())]);
    }

    #[test]
    fn test_unmarked_interface_is_ignored() {
        let result = classify(
            vec![
                interface("app::IPlain"),
                interface("app::IFoo").marked(Marker::Transient),
                class("app::Foo").extends_key("app::IPlain").extends_key("app::IFoo"),
                class("app::Plain").extends_key("app::IPlain"),
            ],
            Marker::Transient,
        )
        .unwrap();

        assert_eq!(pairs(&result), vec![("app::IFoo".to_string(), "app::Foo".to_string())]);
    }

    #[test]
    fn test_supertype_cycles_terminate() {
        let universe = LoadedUniverse::from_types(vec![
            interface("app::IA").extends_key("app::IB"),
            interface("app::IB").extends_key("app::IA"),
        ]);
        let classifier = Classifier::new(&universe, Strictness::Strict);

        let ancestors = classifier.ancestors(universe.get(&TypeKey::new("app::IA")).unwrap());
        assert_eq!(ancestors, vec![TypeKey::new("app::IB")]);
        assert!(classifier.classify(Marker::Scoped).unwrap().bindings.is_empty());
    }

    trait Repository: crate::foundation::ResolveScoped + Send + Sync {}

    struct BaseRepository;

    #[derive(Default)]
    struct SqlRepository;

    impl crate::foundation::ResolveScoped for SqlRepository {}
    impl Repository for SqlRepository {}

    fn repository_types(with_upcast: bool) -> Vec<TypeDescriptor> {
        let class = TypeDescriptor::class::<SqlRepository>("app")
            .default_activated()
            .extends::<BaseRepository>();
        let class = if with_upcast {
            class.implements::<dyn Repository>(|it| it)
        } else {
            class
        };

        vec![
            TypeDescriptor::interface::<dyn Repository>("app").marked(Marker::Scoped),
            TypeDescriptor::abstract_class::<BaseRepository>("app").extends::<dyn Repository>(),
            class.build(),
        ]
    }

    #[test]
    fn test_activatable_class_without_upcast_is_rejected() {
        let error = classify(repository_types(false), Marker::Scoped).unwrap_err();

        assert!(matches!(
            error,
            CoreError::ServiceActivationFailed { ref service_type, ref implementation }
                if service_type == TypeKey::of::<dyn Repository>().as_str()
                    && implementation == TypeKey::of::<SqlRepository>().as_str()
        ));
        assert!(error.is_discovery());
    }

    #[test]
    fn test_activatable_class_without_upcast_is_skipped_when_lenient() {
        let universe = LoadedUniverse::from_types(repository_types(false));
        let result = Classifier::new(&universe, Strictness::Lenient)
            .classify(Marker::Scoped)
            .unwrap();

        assert!(result.bindings.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "SERVICE_ACTIVATION_FAILED");
    }

    #[test]
    fn test_activatable_class_through_abstract_base_with_upcast() {
        let result = classify(repository_types(true), Marker::Scoped).unwrap();

        assert_eq!(result.bindings.len(), 1);
        assert_eq!(result.bindings[0].key, TypeKey::of::<dyn Repository>());
        assert!(result.bindings[0].activation.is_some());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_strictness_from_str() {
        assert_eq!("STRICT".parse::<Strictness>().unwrap(), Strictness::Strict);
        assert_eq!("lenient".parse::<Strictness>().unwrap(), Strictness::Lenient);
        assert!("loose".parse::<Strictness>().is_err());
    }
}
