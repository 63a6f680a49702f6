use crate::container::scope::ServiceScope;
use crate::discovery::descriptor::TypeKey;
use crate::foundation::traits::{ResolveScoped, ResolveSingleton, ResolveTransient};
use serde::{Deserialize, Serialize};

/// Lifetime marker capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Transient,
    Scoped,
    Singleton,
}

impl Marker {
    /// All markers, in emission order
    pub const ALL: [Marker; 3] = [Marker::Transient, Marker::Scoped, Marker::Singleton];

    /// Identity of the marker trait itself
    pub fn key(&self) -> TypeKey {
        match self {
            Marker::Transient => TypeKey::of::<dyn ResolveTransient>(),
            Marker::Scoped => TypeKey::of::<dyn ResolveScoped>(),
            Marker::Singleton => TypeKey::of::<dyn ResolveSingleton>(),
        }
    }

    /// Container lifetime a binding carrying this marker is registered with
    pub fn lifetime(&self) -> ServiceScope {
        match self {
            Marker::Transient => ServiceScope::Transient,
            Marker::Scoped => ServiceScope::Scoped,
            Marker::Singleton => ServiceScope::Singleton,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.lifetime().as_str()
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Marker> for ServiceScope {
    fn from(marker: Marker) -> Self {
        marker.lifetime()
    }
}
