//! Marker capabilities that opt a type into auto-resolution.
//!
//! The traits carry no behavior. Application code attaches them to its own
//! service traits (`trait Mailer: ResolveTransient {}`) or to concrete types
//! (`impl ResolveSingleton for Clock {}`), and the type universe records that
//! relationship as a supertype edge pointing at the marker's key.

/// Marker for services that get a new instance per resolution
pub trait ResolveTransient {}

/// Marker for services that get one instance per scope
pub trait ResolveScoped {}

/// Marker for services that get one instance per provider
pub trait ResolveSingleton {}
